// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module contains the [`ProjectSource`] trait, through which project
//! records are read from storage, and the [`ProjectSnapshot`] they are
//! evaluated from.

use serde::{Deserialize, Serialize};

use crate::compliance::{check_feeder_compliance, FeederViolation};
use crate::impact::{ChangeImpact, ProposedLoad};
use crate::utilization::{service_utilization, DATA_UNAVAILABLE};
use crate::{
    capacity, CapacityPolicy, CapacityVerdict, CircuitRecord, DistributionGraph, Error,
    FeederSpec, GraphConfig, LoadAggregation, PanelSchedule, PanelSpec, ServiceSpec,
};

/**
This trait needs to be implemented by the storage layer that holds project
records.

The engine doesn't know how or where projects are stored.  Lookups that fail,
or find nothing, are reported as `None` or as an empty list, and the engine
surfaces them as missing data.

<details>
<summary>Example implementation over an in-memory store:</summary>

```ignore
struct Store {
    services: HashMap<String, ServiceSpec>,
    panels: HashMap<String, Vec<PanelSpec>>,
    circuits: HashMap<u64, Vec<CircuitRecord>>,
    feeders: HashMap<String, Vec<FeederSpec>>,
}

impl electrical_capacity_graph::ProjectSource for Store {
    fn service(&self, project_id: &str) -> Option<ServiceSpec> {
        self.services.get(project_id).cloned()
    }

    fn panels(&self, project_id: &str) -> Vec<PanelSpec> {
        self.panels.get(project_id).cloned().unwrap_or_default()
    }

    fn circuits(&self, panel_id: u64) -> Vec<CircuitRecord> {
        self.circuits.get(&panel_id).cloned().unwrap_or_default()
    }

    fn feeders(&self, project_id: &str) -> Vec<FeederSpec> {
        self.feeders.get(project_id).cloned().unwrap_or_default()
    }
}
```

</details>
*/
pub trait ProjectSource {
    /// Returns the service entrance of the project, if recorded.
    fn service(&self, project_id: &str) -> Option<ServiceSpec>;

    /// Returns the panels of the project.
    fn panels(&self, project_id: &str) -> Vec<PanelSpec>;

    /// Returns the circuits of the panel with the given id.
    fn circuits(&self, panel_id: u64) -> Vec<CircuitRecord>;

    /// Returns the feeders of the project.
    fn feeders(&self, project_id: &str) -> Vec<FeederSpec>;
}

/// The records of a project, read at one point in time.
///
/// Evaluations always start from a fresh snapshot, so that changes to the
/// records between requests are picked up.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectSnapshot {
    pub service: Option<ServiceSpec>,
    pub schedules: Vec<PanelSchedule>,
    pub feeders: Vec<FeederSpec>,
}

impl ProjectSnapshot {
    /// Reads all records of the project with the given id from `source`.
    pub fn fetch(source: &impl ProjectSource, project_id: &str) -> Self {
        let service = source.service(project_id);
        let schedules = source
            .panels(project_id)
            .into_iter()
            .map(|panel| {
                let circuits = source.circuits(panel.id);
                PanelSchedule::new(panel, circuits)
            })
            .collect::<Vec<_>>();
        let feeders = source.feeders(project_id);

        tracing::debug!(
            "Fetched project {project_id}: {} panels, {} feeders, service recorded: {}.",
            schedules.len(),
            feeders.len(),
            service.is_some()
        );

        Self {
            service,
            schedules,
            feeders,
        }
    }

    /// Builds the distribution graph of the project.
    ///
    /// Returns a `DataUnavailable` error when the project has no service
    /// record.
    pub fn graph(&self, config: GraphConfig) -> Result<DistributionGraph, Error> {
        DistributionGraph::try_new(self.recorded_service()?, self.schedules.clone(), config)
    }

    /// Checks whether the project's service can take `additional_load_amps`
    /// more.
    ///
    /// With [`LoadAggregation::Flat`] the feeds between panels play no role,
    /// so the check doesn't depend on them being consistent.
    pub fn check_capacity(
        &self,
        additional_load_amps: f64,
        config: GraphConfig,
    ) -> Result<CapacityVerdict, Error> {
        match config.aggregation {
            LoadAggregation::Flat => {
                config.policy.validate()?;
                let service =
                    service_utilization(self.service.as_ref(), &self.schedules, &config.policy)?;
                capacity::check_capacity(&service, additional_load_amps, &config.policy)
            }
            LoadAggregation::Hierarchical => {
                self.graph(config)?.check_capacity(additional_load_amps)
            }
        }
    }

    /// Estimates the impact of adding the given `loads` to the project.
    ///
    /// With [`LoadAggregation::Flat`] every panel is evaluated as fed from
    /// the service, so inconsistent feeds between panels are ignored.
    pub fn analyze_change(
        &self,
        loads: &[ProposedLoad],
        config: GraphConfig,
    ) -> Result<ChangeImpact, Error> {
        let graph = match config.aggregation {
            LoadAggregation::Flat => {
                let schedules = self.schedules.iter().cloned().map(|mut schedule| {
                    schedule.panel.fed_from = None;
                    schedule
                });
                DistributionGraph::try_new(self.recorded_service()?, schedules, config)?
            }
            LoadAggregation::Hierarchical => self.graph(config)?,
        };
        graph.analyze_change(loads, &self.feeders)
    }

    fn recorded_service(&self) -> Result<ServiceSpec, Error> {
        self.service.clone().ok_or_else(|| {
            tracing::warn!("No service record, project can't be evaluated.");
            Error::data_unavailable(DATA_UNAVAILABLE)
        })
    }

    /// Returns the project's feeders whose recorded voltage drop is over the
    /// limit.
    pub fn feeder_violations(&self, policy: &CapacityPolicy) -> Vec<FeederViolation> {
        check_feeder_compliance(&self.feeders, policy)
    }
}
