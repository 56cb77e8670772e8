// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Code compliance checks on recorded feeder voltage drops and panel loading.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::records::{FeederSpec, PanelSchedule};
use crate::utilization::panel_utilization;
use crate::CapacityPolicy;

/// Code reference for the feeder voltage drop limit.
pub const FEEDER_VOLTAGE_DROP_ARTICLE: &str = "NEC 210.19(A) / 215.2(A)(1)";

/// Code reference for the maximum number of circuits in a panel.
pub const PANEL_CIRCUIT_LIMIT_ARTICLE: &str = "NEC 408.36";

/// Code reference for the continuous load limit of a panel.
pub const PANEL_CONTINUOUS_LOAD_ARTICLE: &str = "NEC 408.30";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Medium,
    High,
}

impl Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Medium => write!(f, "Medium"),
            Severity::High => write!(f, "High"),
        }
    }
}

/// A feeder whose recorded voltage drop exceeds the limit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FeederViolation {
    pub feeder: String,
    pub voltage_drop_percent: f64,
    pub limit_percent: f64,
    pub article: String,
    pub severity: Severity,
}

/// Returns a violation for every feeder whose recorded voltage drop exceeds
/// the feeder limit.
///
/// Feeders at or below the limit are not reported.
pub fn check_feeder_compliance(
    feeders: &[FeederSpec],
    policy: &CapacityPolicy,
) -> Vec<FeederViolation> {
    feeders
        .iter()
        .filter(|f| f.voltage_drop_percent > policy.feeder_voltage_drop_limit_percent)
        .map(|f| FeederViolation {
            feeder: f.name.clone(),
            voltage_drop_percent: f.voltage_drop_percent,
            limit_percent: policy.feeder_voltage_drop_limit_percent,
            article: FEEDER_VOLTAGE_DROP_ARTICLE.to_string(),
            severity: if f.voltage_drop_percent > policy.feeder_voltage_drop_high_percent {
                Severity::High
            } else {
                Severity::Medium
            },
        })
        .collect()
}

/// A way in which a panel fails its code checks.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PanelViolation {
    TooManyCircuits { circuit_count: usize, limit: usize },
    ContinuousLoadExceeded { utilization_percent: f64, limit_percent: f64 },
}

impl PanelViolation {
    pub fn article(&self) -> &'static str {
        match self {
            PanelViolation::TooManyCircuits { .. } => PANEL_CIRCUIT_LIMIT_ARTICLE,
            PanelViolation::ContinuousLoadExceeded { .. } => PANEL_CONTINUOUS_LOAD_ARTICLE,
        }
    }
}

impl Display for PanelViolation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PanelViolation::TooManyCircuits {
                circuit_count,
                limit,
            } => write!(
                f,
                "Exceeds {limit} circuit maximum ({}): {circuit_count} circuits",
                self.article()
            ),
            PanelViolation::ContinuousLoadExceeded {
                utilization_percent,
                limit_percent,
            } => write!(
                f,
                "Exceeds {limit_percent}% continuous load limit ({}): {utilization_percent:.1}%",
                self.article()
            ),
        }
    }
}

/// The result of checking a panel against its code limits.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PanelCompliance {
    pub panel_id: u64,
    pub panel_name: String,
    pub circuit_count: usize,
    pub utilization_percent: f64,
    pub bus_rating: u32,
    pub compliant: bool,
    pub violations: Vec<PanelViolation>,
}

/// Checks a panel's circuit count and continuous loading.
pub fn check_panel_compliance(schedule: &PanelSchedule, policy: &CapacityPolicy) -> PanelCompliance {
    let utilization = panel_utilization(&schedule.panel, &schedule.circuits, policy);
    let utilization_percent = utilization.utilization.utilization_percent;
    let circuit_count = schedule.circuits.len();

    let mut violations = vec![];
    if circuit_count > policy.max_panel_circuits {
        violations.push(PanelViolation::TooManyCircuits {
            circuit_count,
            limit: policy.max_panel_circuits,
        });
    }
    if utilization_percent > policy.continuous_load_percent {
        violations.push(PanelViolation::ContinuousLoadExceeded {
            utilization_percent,
            limit_percent: policy.continuous_load_percent,
        });
    }

    PanelCompliance {
        panel_id: schedule.panel.id,
        panel_name: schedule.panel.name.clone(),
        circuit_count,
        utilization_percent,
        bus_rating: schedule.panel.bus_rating,
        compliant: violations.is_empty(),
        violations,
    }
}
