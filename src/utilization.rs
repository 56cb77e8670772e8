// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Present-state utilization of panels and of the service.
//!
//! These are computed fresh from the records on every call, since the records
//! may change between calls.  All comparisons use unrounded values; use
//! [`UtilizationResult::rounded`] for presentation.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::records::{capacity_va, CircuitRecord, PanelSchedule, PanelSpec, Phase, ServiceSpec};
use crate::{CapacityPolicy, Error};

/// The soft-failure message returned when service data is missing.
pub const DATA_UNAVAILABLE: &str = "Project data unavailable.";

/// Rounds `value` to the given number of decimal places.
pub(crate) fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Qualitative loading of a panel or service.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UtilizationStatus {
    Ok,
    Warning,
    Overloaded,
}

impl UtilizationStatus {
    /// Classifies a utilization percentage.
    ///
    /// Below the continuous-load threshold is `Ok`, from there up to the
    /// overload threshold is `Warning`, and anything at or above the overload
    /// threshold is `Overloaded`.
    pub fn classify(utilization_percent: f64, policy: &CapacityPolicy) -> Self {
        if utilization_percent < policy.continuous_load_percent {
            UtilizationStatus::Ok
        } else if utilization_percent < policy.overload_percent {
            UtilizationStatus::Warning
        } else {
            UtilizationStatus::Overloaded
        }
    }
}

impl Display for UtilizationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UtilizationStatus::Ok => write!(f, "OK"),
            UtilizationStatus::Warning => write!(f, "WARNING"),
            UtilizationStatus::Overloaded => write!(f, "OVERLOADED"),
        }
    }
}

/// The present load of a panel or service, relative to its rating.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UtilizationResult {
    /// Rated current, i.e. the service size or the panel bus rating.
    pub capacity_amps: u32,
    pub voltage: u32,
    pub phase: Phase,
    pub capacity_va: f64,
    pub current_load_va: f64,
    pub current_load_amps: f64,
    /// Headroom left before the rating is reached.  Negative when overloaded.
    pub available_amps: f64,
    pub utilization_percent: f64,
    pub status: UtilizationStatus,
    /// Whether load can be added while staying under the continuous-load
    /// threshold.
    pub can_add_load: bool,
    /// Set when the record has no usable voltage, in which case the load in
    /// amps is reported as 0.
    pub incomplete: bool,
}

impl UtilizationResult {
    pub(crate) fn evaluate(
        load_va: f64,
        capacity_amps: u32,
        voltage: u32,
        phase: Phase,
        policy: &CapacityPolicy,
    ) -> Self {
        let capacity_va = capacity_va(capacity_amps, voltage, phase);

        let incomplete = voltage == 0;
        if incomplete {
            tracing::warn!("Record rated {capacity_amps}A has no voltage, reporting 0A of load.");
        }

        let current_load_amps = if incomplete {
            0.0
        } else {
            load_va / f64::from(voltage)
        };
        let utilization_percent = if capacity_va > 0.0 {
            load_va / capacity_va * 100.0
        } else {
            0.0
        };

        Self {
            capacity_amps,
            voltage,
            phase,
            capacity_va,
            current_load_va: load_va,
            current_load_amps,
            available_amps: f64::from(capacity_amps) - current_load_amps,
            utilization_percent,
            status: UtilizationStatus::classify(utilization_percent, policy),
            can_add_load: utilization_percent < policy.continuous_load_percent,
            incomplete,
        }
    }

    /// Returns a copy with amps and percentages rounded to one decimal place.
    pub fn rounded(&self) -> Self {
        Self {
            current_load_amps: round_to(self.current_load_amps, 1),
            available_amps: round_to(self.available_amps, 1),
            utilization_percent: round_to(self.utilization_percent, 1),
            ..self.clone()
        }
    }
}

/// The utilization of a single panel, including its space usage.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PanelUtilization {
    pub panel_id: u64,
    pub panel_name: String,
    #[serde(flatten)]
    pub utilization: UtilizationResult,
    pub total_spaces: u32,
    pub spaces_used: u32,
    /// Negative when the circuits take more poles than the panel has.
    pub spaces_available: i64,
    pub circuit_count: usize,
}

impl PanelUtilization {
    pub(crate) fn evaluate(
        panel: &PanelSpec,
        circuits: &[CircuitRecord],
        load_va: f64,
        policy: &CapacityPolicy,
    ) -> Self {
        let spaces_used: u32 = circuits.iter().map(|c| u32::from(c.poles)).sum();
        Self {
            panel_id: panel.id,
            panel_name: panel.name.clone(),
            utilization: UtilizationResult::evaluate(
                load_va,
                panel.bus_rating,
                panel.voltage,
                panel.phase,
                policy,
            ),
            total_spaces: panel.spaces,
            spaces_used,
            spaces_available: i64::from(panel.spaces) - i64::from(spaces_used),
            circuit_count: circuits.len(),
        }
    }
}

/// Computes the utilization of a panel from its own circuits.
pub fn panel_utilization(
    panel: &PanelSpec,
    circuits: &[CircuitRecord],
    policy: &CapacityPolicy,
) -> PanelUtilization {
    let load_va = circuits.iter().map(|c| c.resolved_load_va()).sum();
    PanelUtilization::evaluate(panel, circuits, load_va, policy)
}

/// Computes the utilization of the service, counting the circuits of every
/// panel directly against the service.
///
/// Returns a `DataUnavailable` error when there is no service record, which
/// callers are expected to surface instead of failing.
pub fn service_utilization(
    service: Option<&ServiceSpec>,
    schedules: &[PanelSchedule],
    policy: &CapacityPolicy,
) -> Result<UtilizationResult, Error> {
    let Some(service) = service else {
        tracing::warn!("No service record, service utilization unavailable.");
        return Err(Error::data_unavailable(DATA_UNAVAILABLE));
    };

    let load_va = schedules.iter().map(|s| s.connected_load_va()).sum();
    Ok(UtilizationResult::evaluate(
        load_va,
        service.amps,
        service.voltage,
        service.phase,
        policy,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn circuits(loads: &[f64]) -> Vec<CircuitRecord> {
        loads
            .iter()
            .enumerate()
            .map(|(i, va)| CircuitRecord::new(format!("Circuit {}", i + 1), *va, 20))
            .collect()
    }

    #[test]
    fn test_status_boundaries() {
        let policy = CapacityPolicy::default();
        assert_eq!(
            UtilizationStatus::classify(79.99, &policy),
            UtilizationStatus::Ok
        );
        assert_eq!(
            UtilizationStatus::classify(80.0, &policy),
            UtilizationStatus::Warning
        );
        assert_eq!(
            UtilizationStatus::classify(99.99, &policy),
            UtilizationStatus::Warning
        );
        assert_eq!(
            UtilizationStatus::classify(100.0, &policy),
            UtilizationStatus::Overloaded
        );
        assert_eq!(UtilizationStatus::Overloaded.to_string(), "OVERLOADED");
    }

    #[test]
    fn test_panel_utilization() {
        let policy = CapacityPolicy::default();
        let panel = PanelSpec::new(1, "LP-1", 100);
        let mut circuits = circuits(&[6000.0, 4000.0, 5000.0, 3000.0]);
        circuits[0].poles = 2;

        let result = panel_utilization(&panel, &circuits, &policy);
        assert_eq!(result.panel_name, "LP-1");
        assert_eq!(result.utilization.current_load_va, 18_000.0);
        assert_eq!(result.utilization.current_load_amps, 75.0);
        assert_eq!(result.utilization.available_amps, 25.0);
        assert_eq!(result.utilization.capacity_va, 24_000.0);
        assert_eq!(result.utilization.utilization_percent, 75.0);
        assert_eq!(result.utilization.status, UtilizationStatus::Ok);
        assert!(result.utilization.can_add_load);
        assert!(!result.utilization.incomplete);
        assert_eq!(result.total_spaces, 42);
        assert_eq!(result.spaces_used, 5);
        assert_eq!(result.spaces_available, 37);
        assert_eq!(result.circuit_count, 4);
    }

    #[test]
    fn test_panel_at_continuous_limit() {
        let policy = CapacityPolicy::default();
        let panel = PanelSpec::new(5, "LP-5", 100);

        let result = panel_utilization(&panel, &circuits(&[12_000.0, 7_200.0]), &policy);
        assert_eq!(result.utilization.utilization_percent, 80.0);
        assert_eq!(result.utilization.status, UtilizationStatus::Warning);
        assert!(!result.utilization.can_add_load);

        let result = panel_utilization(&panel, &circuits(&[12_000.0, 7_199.0]), &policy);
        assert_eq!(result.utilization.status, UtilizationStatus::Ok);
        assert!(result.utilization.can_add_load);
    }

    #[test]
    fn test_panel_watts_fallback_and_overload() {
        let policy = CapacityPolicy::default();
        let panel = PanelSpec::new(2, "LP-2", 60).with_spaces(2);
        let mut circuits = circuits(&[10_000.0, 0.0, 5_000.0]);
        circuits[1].load_va = None;
        circuits[1].load_watts = Some(1_000.0);

        let result = panel_utilization(&panel, &circuits, &policy);
        assert_eq!(result.utilization.current_load_va, 16_000.0);
        assert_eq!(result.utilization.status, UtilizationStatus::Overloaded);
        assert!(!result.utilization.can_add_load);
        assert!(result.utilization.available_amps < 0.0);
        assert_eq!(result.spaces_available, -1);
    }

    #[test]
    fn test_panel_without_voltage() {
        let policy = CapacityPolicy::default();
        let panel = PanelSpec::new(3, "LP-3", 100).with_voltage(0);
        let result = panel_utilization(&panel, &circuits(&[1000.0]), &policy);
        assert!(result.utilization.incomplete);
        assert_eq!(result.utilization.current_load_amps, 0.0);
        assert_eq!(result.utilization.utilization_percent, 0.0);
        assert_eq!(result.utilization.capacity_va, 0.0);
    }

    #[test]
    fn test_three_phase_panel() {
        let policy = CapacityPolicy::default();
        let panel = PanelSpec::new(4, "MDP", 400)
            .with_voltage(208)
            .with_phase(Phase::Three);
        let result = panel_utilization(&panel, &circuits(&[72_000.0]), &policy).utilization;
        assert!((result.utilization_percent - 49.96).abs() < 0.01);
        assert!((result.current_load_amps - 346.15).abs() < 0.01);
    }

    #[test]
    fn test_service_utilization() -> Result<(), Error> {
        let policy = CapacityPolicy::default();
        let service = ServiceSpec::try_new(200, 240, Phase::Single)?;
        let schedules = vec![
            PanelSchedule::new(PanelSpec::new(1, "LP-1", 125), circuits(&[20_000.0, 1_280.0])),
            PanelSchedule::new(
                PanelSpec::new(2, "LP-2", 100).fed_from(1),
                circuits(&[20_000.0]),
            ),
        ];

        let result = service_utilization(Some(&service), &schedules, &policy)?;
        assert_eq!(result.current_load_va, 41_280.0);
        assert_eq!(result.current_load_amps, 172.0);
        assert_eq!(result.capacity_va, 48_000.0);
        assert_eq!(result.utilization_percent, 86.0);
        assert_eq!(result.status, UtilizationStatus::Warning);
        assert!(!result.can_add_load);

        let empty = service_utilization(Some(&service), &[], &policy)?;
        assert_eq!(empty.utilization_percent, 0.0);
        assert_eq!(empty.available_amps, 200.0);

        Ok(())
    }

    #[test]
    fn test_missing_service() {
        let policy = CapacityPolicy::default();
        let result = service_utilization(None, &[], &policy);
        assert!(result.is_err_and(|e| e.is_data_unavailable()
            && e.description() == "Project data unavailable."));
    }

    #[test]
    fn test_rounded() -> Result<(), Error> {
        let policy = CapacityPolicy::default();
        let service = ServiceSpec::try_new(200, 240, Phase::Single)?;
        let schedules = vec![PanelSchedule::new(
            PanelSpec::new(1, "LP-1", 200),
            circuits(&[10_000.0]),
        )];
        let result = service_utilization(Some(&service), &schedules, &policy)?;
        assert!((result.utilization_percent - 20.8333).abs() < 1e-3);

        let rounded = result.rounded();
        assert_eq!(rounded.utilization_percent, 20.8);
        assert_eq!(rounded.current_load_amps, 41.7);
        assert_eq!(rounded.available_amps, 158.3);
        assert_eq!(rounded.status, result.status);
        Ok(())
    }
}
