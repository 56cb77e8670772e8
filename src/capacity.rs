// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! The capacity policy: deciding whether a service can take an additional
//! load, and which standard service size to upgrade to when it can't.
//!
//! A verdict carries three flags that are mutually exclusive:
//!
//! - `can_proceed`: the new utilization stays at or below the continuous-load
//!   threshold, so the load can be added without caveat.
//! - `warning`: the new utilization is above the continuous-load threshold
//!   but at or below the overload threshold.  The load physically fits, but
//!   is not admitted without review.
//! - `requires_service_upgrade`: the new utilization is above the overload
//!   threshold.
//!
//! Exactly one of them is set for every verdict.

use serde::{Deserialize, Serialize};
use std::fmt::Display;

use crate::utilization::round_to;
use crate::{CapacityPolicy, Error, UtilizationResult};

/// The category of a capacity verdict, from most to least permissive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerdictCategory {
    Approve,
    ApproveWithCaution,
    Warning,
    Reject,
}

impl VerdictCategory {
    /// Classifies a projected utilization percentage.
    pub fn classify(utilization_percent: f64, policy: &CapacityPolicy) -> Self {
        if utilization_percent > policy.overload_percent {
            VerdictCategory::Reject
        } else if utilization_percent > policy.continuous_load_percent {
            VerdictCategory::Warning
        } else if utilization_percent > policy.caution_percent {
            VerdictCategory::ApproveWithCaution
        } else {
            VerdictCategory::Approve
        }
    }

    /// Returns true for the categories that admit the load without review.
    pub fn is_admitted(&self) -> bool {
        matches!(
            self,
            VerdictCategory::Approve | VerdictCategory::ApproveWithCaution
        )
    }
}

impl Display for VerdictCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerdictCategory::Approve => write!(f, "APPROVE"),
            VerdictCategory::ApproveWithCaution => write!(f, "APPROVE WITH CAUTION"),
            VerdictCategory::Warning => write!(f, "WARNING"),
            VerdictCategory::Reject => write!(f, "REJECT"),
        }
    }
}

/// The outcome of checking whether a service can take an additional load.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CapacityVerdict {
    pub can_proceed: bool,
    pub requires_service_upgrade: bool,
    pub warning: bool,
    pub category: VerdictCategory,
    pub service_size_amps: u32,
    pub current_load_amps: f64,
    pub proposed_additional_amps: f64,
    pub new_total_amps: f64,
    pub available_before_change_amps: f64,
    /// Negative when the service would be overloaded.
    pub remaining_after_change_amps: f64,
    pub current_utilization_percent: f64,
    pub new_utilization_percent: f64,
    /// The smallest standard service size that keeps the new load under the
    /// continuous-load threshold.  Only set when an upgrade is required.
    pub recommended_service_size: Option<u32>,
    pub verdict: String,
}

impl CapacityVerdict {
    /// Returns a copy with the computed amps and percentages rounded to one
    /// decimal place.  The proposed load is kept as given.
    pub fn rounded(&self) -> Self {
        Self {
            current_load_amps: round_to(self.current_load_amps, 1),
            new_total_amps: round_to(self.new_total_amps, 1),
            available_before_change_amps: round_to(self.available_before_change_amps, 1),
            remaining_after_change_amps: round_to(self.remaining_after_change_amps, 1),
            current_utilization_percent: round_to(self.current_utilization_percent, 1),
            new_utilization_percent: round_to(self.new_utilization_percent, 1),
            ..self.clone()
        }
    }
}

/// Checks whether a service with the given present utilization can take
/// `additional_load_amps` more.
///
/// Returns an error if the additional load is negative or not finite.
pub fn check_capacity(
    service: &UtilizationResult,
    additional_load_amps: f64,
    policy: &CapacityPolicy,
) -> Result<CapacityVerdict, Error> {
    if !additional_load_amps.is_finite() || additional_load_amps < 0.0 {
        return Err(Error::invalid_input(format!(
            "Additional load can't be negative, got {additional_load_amps}A."
        )));
    }

    let voltage = f64::from(service.voltage);
    let current_load_amps = if voltage > 0.0 {
        service.current_load_va / voltage
    } else {
        0.0
    };

    let additional_load_va = additional_load_amps * voltage;
    let new_total_va = service.current_load_va + additional_load_va;
    let new_total_amps = current_load_amps + additional_load_amps;

    let new_utilization_percent = if service.capacity_va > 0.0 {
        new_total_va / service.capacity_va * 100.0
    } else {
        0.0
    };
    let service_size_amps = f64::from(service.capacity_amps);
    let remaining_after_change_amps = service_size_amps - new_total_amps;

    let category = VerdictCategory::classify(new_utilization_percent, policy);
    let requires_service_upgrade = category == VerdictCategory::Reject;
    let recommended_service_size =
        requires_service_upgrade.then(|| recommended_service_size(new_total_amps, policy));

    let verdict = CapacityVerdict {
        can_proceed: category.is_admitted(),
        requires_service_upgrade,
        warning: category == VerdictCategory::Warning,
        category,
        service_size_amps: service.capacity_amps,
        current_load_amps,
        proposed_additional_amps: additional_load_amps,
        new_total_amps,
        available_before_change_amps: service_size_amps - current_load_amps,
        remaining_after_change_amps,
        current_utilization_percent: service.utilization_percent,
        new_utilization_percent,
        recommended_service_size,
        verdict: verdict_text(category, new_utilization_percent, remaining_after_change_amps),
    };

    tracing::debug!(
        "Capacity check for +{additional_load_amps}A: {} ({:.1}% -> {:.1}%).",
        verdict.category,
        verdict.current_utilization_percent,
        verdict.new_utilization_percent
    );

    Ok(verdict)
}

/// Returns the smallest standard service size that can carry `load_amps`
/// within the continuous-load threshold.
///
/// When no standard size is large enough, the largest one is returned.
pub fn recommended_service_size(load_amps: f64, policy: &CapacityPolicy) -> u32 {
    let required_amps = load_amps / policy.continuous_load_factor();
    let ladder = &policy.standard_service_sizes;

    ladder
        .iter()
        .copied()
        .find(|size| f64::from(*size) >= required_amps)
        .or_else(|| ladder.last().copied())
        .unwrap_or_default()
}

fn verdict_text(category: VerdictCategory, utilization_percent: f64, remaining_amps: f64) -> String {
    match category {
        VerdictCategory::Reject => format!(
            "{category} - Service overloaded by {:.0}A. Service upgrade required.",
            remaining_amps.abs()
        ),
        VerdictCategory::Warning => format!(
            "{category} - Service at {utilization_percent:.0}% utilization. \
             Only {remaining_amps:.0}A margin remaining. Consider upgrade."
        ),
        VerdictCategory::ApproveWithCaution => format!(
            "{category} - Service at {utilization_percent:.0}% utilization. \
             {remaining_amps:.0}A remaining."
        ),
        VerdictCategory::Approve => format!(
            "{category} - Service has adequate capacity. \
             {remaining_amps:.0}A remaining after change."
        ),
    }
}
