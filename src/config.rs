// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module contains the policy thresholds used by the capacity engine,
//! and the configuration options for the `DistributionGraph`.

use serde::{Deserialize, Serialize};

use crate::Error;

/// The thresholds that decide whether a service or panel can take more load.
///
/// The defaults follow the NEC: 80% continuous loading, a 3% feeder voltage
/// drop limit, and at most 42 circuits per panel.  Jurisdictions with
/// different limits can override individual fields, for example from a TOML
/// file with [`from_toml_str`][CapacityPolicy::from_toml_str].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CapacityPolicy {
    /// Utilization percentage up to which load can be added without caveat.
    pub continuous_load_percent: f64,

    /// Utilization percentage above which a service upgrade is required.
    pub overload_percent: f64,

    /// Utilization percentage above which an approval comes with a caution.
    pub caution_percent: f64,

    /// Recorded feeder voltage drop, in percent, above which a feeder is
    /// reported as non-compliant.
    pub feeder_voltage_drop_limit_percent: f64,

    /// Voltage drop, in percent, above which a violation is of high severity.
    pub feeder_voltage_drop_high_percent: f64,

    /// Maximum number of circuits in a single panel.
    pub max_panel_circuits: usize,

    /// Standard service sizes in amps, in ascending order.
    pub standard_service_sizes: Vec<u32>,
}

impl Default for CapacityPolicy {
    fn default() -> Self {
        Self {
            continuous_load_percent: 80.0,
            overload_percent: 100.0,
            caution_percent: 60.0,
            feeder_voltage_drop_limit_percent: 3.0,
            feeder_voltage_drop_high_percent: 5.0,
            max_panel_circuits: 42,
            standard_service_sizes: vec![100, 125, 150, 200, 225, 320, 400, 600, 800, 1000, 1200],
        }
    }
}

impl CapacityPolicy {
    /// Parses a policy from a TOML document, falling back to the defaults for
    /// any missing fields, and validates it.
    pub fn from_toml_str(source: &str) -> Result<Self, Error> {
        let policy: Self = toml::from_str(source)
            .map_err(|e| Error::invalid_config(format!("Unable to parse policy: {e}")))?;
        policy.validate()?;
        Ok(policy)
    }

    /// Checks that the thresholds are ordered and that the service size
    /// ladder is usable.
    pub fn validate(&self) -> Result<(), Error> {
        let percents = [
            ("caution_percent", self.caution_percent),
            ("continuous_load_percent", self.continuous_load_percent),
            ("overload_percent", self.overload_percent),
        ];
        for (name, value) in percents {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::invalid_config(format!(
                    "{name} must be a positive number, got {value}."
                )));
            }
        }
        if !(self.caution_percent <= self.continuous_load_percent
            && self.continuous_load_percent <= self.overload_percent)
        {
            return Err(Error::invalid_config(format!(
                "Thresholds must satisfy caution <= continuous <= overload, got {} / {} / {}.",
                self.caution_percent, self.continuous_load_percent, self.overload_percent
            )));
        }
        if !(self.feeder_voltage_drop_limit_percent > 0.0
            && self.feeder_voltage_drop_limit_percent <= self.feeder_voltage_drop_high_percent)
        {
            return Err(Error::invalid_config(format!(
                "Voltage drop limits must satisfy 0 < limit <= high, got {} / {}.",
                self.feeder_voltage_drop_limit_percent, self.feeder_voltage_drop_high_percent
            )));
        }
        if self.standard_service_sizes.is_empty() {
            return Err(Error::invalid_config(
                "At least one standard service size is required.",
            ));
        }
        if self
            .standard_service_sizes
            .windows(2)
            .any(|pair| pair[0] >= pair[1])
        {
            return Err(Error::invalid_config(format!(
                "Standard service sizes must be strictly ascending, got {:?}.",
                self.standard_service_sizes
            )));
        }
        Ok(())
    }

    /// The fraction of rated capacity a service may carry continuously.
    pub fn continuous_load_factor(&self) -> f64 {
        self.continuous_load_percent / 100.0
    }
}

/// How panel loads are rolled up into the load seen by the service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadAggregation {
    /// Every panel's own circuits count directly against the service,
    /// regardless of where the panel sits in the distribution tree.
    #[default]
    Flat,

    /// Loads are routed through the distribution tree: a panel carries its
    /// own circuits plus everything fed from it, and breakers feeding a
    /// sub-panel are replaced by the sub-panel's actual load.
    Hierarchical,
}

/// Configuration options for the `DistributionGraph`.
#[derive(Clone, Default, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GraphConfig {
    /// The capacity thresholds to evaluate against.
    pub policy: CapacityPolicy,

    /// How panel loads are aggregated into service load.
    pub aggregation: LoadAggregation,
}
