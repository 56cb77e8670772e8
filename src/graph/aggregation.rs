// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Methods for aggregating panel loads into panel and service utilization,
//! according to the configured [`LoadAggregation`].

use petgraph::graph::NodeIndex;
use petgraph::Direction;

use crate::compliance::{check_panel_compliance, PanelCompliance};
use crate::utilization::{PanelUtilization, UtilizationResult};
use crate::{capacity, CapacityVerdict, DistributionGraph, Error, LoadAggregation};

impl DistributionGraph {
    /// Returns the load carried by the panel with the given `panel_id`, in
    /// volt-amps.
    ///
    /// With [`LoadAggregation::Flat`] this is the panel's own connected load.
    /// With [`LoadAggregation::Hierarchical`] it also includes everything fed
    /// from the panel, in place of the panel's subfeed breakers.
    pub fn panel_load_va(&self, panel_id: u64) -> Result<f64, Error> {
        let index = self.index_of(panel_id)?;
        Ok(match self.config.aggregation {
            LoadAggregation::Flat => self
                .schedule_at(index)
                .map(|s| s.connected_load_va())
                .unwrap_or_default(),
            LoadAggregation::Hierarchical => self.rolled_up_load_va(index),
        })
    }

    /// Returns the total load seen by the service, in volt-amps.
    pub fn service_load_va(&self) -> f64 {
        match self.config.aggregation {
            LoadAggregation::Flat => self.panels().map(|s| s.connected_load_va()).sum(),
            LoadAggregation::Hierarchical => self.rolled_up_load_va(self.root),
        }
    }

    /// Returns the present utilization of the service.
    pub fn service_utilization(&self) -> UtilizationResult {
        UtilizationResult::evaluate(
            self.service_load_va(),
            self.service.amps,
            self.service.voltage,
            self.service.phase,
            &self.config.policy,
        )
    }

    /// Returns the present utilization of the panel with the given
    /// `panel_id`.
    pub fn panel_utilization(&self, panel_id: u64) -> Result<PanelUtilization, Error> {
        let schedule = self.panel(panel_id)?;
        Ok(PanelUtilization::evaluate(
            &schedule.panel,
            &schedule.circuits,
            self.panel_load_va(panel_id)?,
            &self.config.policy,
        ))
    }

    /// Checks whether the service can take `additional_load_amps` more.
    pub fn check_capacity(&self, additional_load_amps: f64) -> Result<CapacityVerdict, Error> {
        capacity::check_capacity(
            &self.service_utilization(),
            additional_load_amps,
            &self.config.policy,
        )
    }

    /// Checks every panel against its code limits.
    pub fn panel_compliance(&self) -> Vec<PanelCompliance> {
        self.panels()
            .map(|s| check_panel_compliance(s, &self.config.policy))
            .collect()
    }

    /// Load at the given node, excluding subfeed breakers, plus the rolled
    /// up load of every panel fed from it.
    fn rolled_up_load_va(&self, index: NodeIndex) -> f64 {
        let own_load: f64 = self
            .schedule_at(index)
            .map(|s| {
                s.circuits
                    .iter()
                    .filter(|c| !c.load_type.is_subfeed())
                    .map(|c| c.resolved_load_va())
                    .sum()
            })
            .unwrap_or_default();

        own_load
            + self
                .graph
                .neighbors_directed(index, Direction::Outgoing)
                .map(|fed| self.rolled_up_load_va(fed))
                .sum::<f64>()
    }
}
