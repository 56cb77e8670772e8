// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Types describing a proposed change to the electrical system and its
//! impact on the service, panels and feeders.
//!
//! The impact is computed by
//! [`DistributionGraph::analyze_change`][crate::DistributionGraph::analyze_change].

use serde::{Deserialize, Serialize};

use crate::{Error, LoadType, PanelSchedule, UtilizationStatus};

/// Breaker rating from which a circuit counts as a large load.
pub const DEFAULT_LARGE_LOAD_AMPS: u32 = 20;

fn default_quantity() -> u32 {
    1
}

/// A load that is proposed to be added.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProposedLoad {
    #[serde(default, alias = "type")]
    pub load_type: LoadType,

    /// Current drawn by a single unit, in amps.
    pub amps: f64,

    #[serde(default = "default_quantity")]
    pub quantity: u32,

    /// The panel the load would be connected to, if known.
    #[serde(default)]
    pub panel: Option<u64>,
}

impl ProposedLoad {
    pub fn new(load_type: LoadType, amps: f64, quantity: u32) -> Self {
        Self {
            load_type,
            amps,
            quantity,
            panel: None,
        }
    }

    /// Marks the load as connected to the panel with the given id.
    pub fn on_panel(mut self, panel_id: u64) -> Self {
        self.panel = Some(panel_id);
        self
    }

    /// Returns the current drawn by all units together.
    pub fn total_amps(&self) -> f64 {
        self.amps * f64::from(self.quantity)
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !self.amps.is_finite() || self.amps < 0.0 {
            return Err(Error::invalid_input(format!(
                "Proposed {} load can't be negative, got {}A.",
                self.load_type, self.amps
            )));
        }
        Ok(())
    }
}

/// Returns the current drawn by all the given loads together.
pub fn total_additional_amps(loads: &[ProposedLoad]) -> f64 {
    loads.iter().map(|l| l.total_amps()).sum()
}

/// The impact of a change on the service entrance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ServiceImpact {
    pub upgrade_needed: bool,
    pub current_size: u32,
    pub required_size: Option<u32>,
    pub utilization_before: f64,
    pub utilization_after: f64,
    pub reason: String,
}

/// The impact of a change on a single panel.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PanelImpact {
    pub panel_id: u64,
    pub panel_name: String,
    pub additional_amps: f64,
    pub utilization_before: f64,
    pub utilization_after: f64,
    /// The continuous-load threshold the panel is checked against.
    pub threshold_percent: f64,
    pub status_after: UtilizationStatus,
    pub exceeds_threshold: bool,
    pub spaces_available: i64,
}

/// The impact of a change on the voltage drop of a feeder.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VoltageDropIssue {
    pub feeder_id: u64,
    pub feeder_name: String,
    /// The recorded voltage drop before the change, in percent.
    pub current_drop: f64,
    /// The voltage drop at the panel's load after the change, in percent.
    pub new_drop: f64,
    pub limit_percent: f64,
    pub compliant: bool,
}

/// The impact of a change on the ampacity of a feeder.
///
/// A feeder may carry continuous load up to the continuous-load share of its
/// rated ampacity.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeederImpact {
    pub feeder_id: u64,
    pub feeder_name: String,
    /// Conductor size and material, e.g. `"#2/0 Cu"`.
    pub current_size: String,
    pub ampacity: u32,
    /// Current through the feeder after the change.
    pub load_amps: f64,
    pub upgrade_needed: bool,
    /// The smallest ampacity that carries `load_amps` continuously.  Only
    /// set when an upgrade is needed.
    pub required_ampacity: Option<u32>,
    pub reason: String,
}

/// The structured impact of a proposed change.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ChangeImpact {
    pub can_accommodate: bool,
    pub total_additional_amps: f64,
    pub service_impact: ServiceImpact,
    pub panel_impacts: Vec<PanelImpact>,
    pub feeder_impacts: Vec<FeederImpact>,
    pub voltage_drop_issues: Vec<VoltageDropIssue>,
}

/// A circuit with a large breaker.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LargeLoad {
    pub panel_id: u64,
    pub description: String,
    pub breaker_rating: u32,
    pub load_va: f64,
    pub load_type: LoadType,
}

/// Returns all circuits with a breaker rating of at least
/// `min_breaker_amps`, largest breakers first.
pub fn large_loads<'a>(
    schedules: impl IntoIterator<Item = &'a PanelSchedule>,
    min_breaker_amps: u32,
) -> Vec<LargeLoad> {
    let mut loads = schedules
        .into_iter()
        .flat_map(|s| {
            s.circuits
                .iter()
                .filter(|c| c.breaker_rating >= min_breaker_amps)
                .map(|c| LargeLoad {
                    panel_id: s.panel_id(),
                    description: c.description.clone(),
                    breaker_rating: c.breaker_rating,
                    load_va: c.resolved_load_va(),
                    load_type: c.load_type,
                })
        })
        .collect::<Vec<_>>();
    loads.sort_by(|a, b| b.breaker_rating.cmp(&a.breaker_rating));
    loads
}
