// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Methods for estimating the impact of proposed loads on the service, the
//! panels they are connected to, and the feeders supplying those panels.

use std::collections::HashMap;

use crate::impact::{
    self, total_additional_amps, ChangeImpact, FeederImpact, LargeLoad, PanelImpact,
    ProposedLoad, ServiceImpact, VoltageDropIssue,
};
use crate::utilization::UtilizationResult;
use crate::{DistributionGraph, Error, FeederSpec, LoadAggregation};

impl DistributionGraph {
    /// Estimates the impact of adding the given `loads`.
    ///
    /// Loads that name a panel are added to that panel, and with
    /// [`LoadAggregation::Hierarchical`] also to every panel upstream of it.
    /// The `feeders` supplying a panel that receives load are checked for
    /// their ampacity and their voltage drop at the panel's new load.  Panels
    /// without a recorded voltage only take their share at the service.
    ///
    /// Returns an error if a load is negative or names an unknown panel, or
    /// if a feeder record is invalid.
    pub fn analyze_change(
        &self,
        loads: &[ProposedLoad],
        feeders: &[FeederSpec],
    ) -> Result<ChangeImpact, Error> {
        for load in loads {
            load.validate()?;
            if let Some(panel_id) = load.panel {
                self.index_of(panel_id)?;
            }
        }
        for feeder in feeders {
            feeder.validate()?;
        }

        let total_amps = total_additional_amps(loads);
        let verdict = self.check_capacity(total_amps)?;
        let service_impact = ServiceImpact {
            upgrade_needed: verdict.requires_service_upgrade,
            current_size: verdict.service_size_amps,
            required_size: verdict.recommended_service_size,
            utilization_before: verdict.current_utilization_percent,
            utilization_after: verdict.new_utilization_percent,
            reason: verdict.verdict.clone(),
        };

        let added_va = self.added_load_va(loads)?;
        let policy = &self.config.policy;

        let mut panel_impacts = vec![];
        let mut panel_load_amps = HashMap::new();
        for schedule in self.panels() {
            let panel = &schedule.panel;
            let Some(extra_va) = added_va.get(&panel.id).copied() else {
                continue;
            };

            let before = self.panel_utilization(panel.id)?;
            let after = UtilizationResult::evaluate(
                before.utilization.current_load_va + extra_va,
                panel.bus_rating,
                panel.voltage,
                panel.phase,
                policy,
            );
            panel_load_amps.insert(panel.id, (after.current_load_amps, panel.voltage));

            panel_impacts.push(PanelImpact {
                panel_id: panel.id,
                panel_name: panel.name.clone(),
                additional_amps: after.current_load_amps - before.utilization.current_load_amps,
                utilization_before: before.utilization.utilization_percent,
                utilization_after: after.utilization_percent,
                threshold_percent: policy.continuous_load_percent,
                status_after: after.status,
                exceeds_threshold: after.utilization_percent > policy.continuous_load_percent,
                spaces_available: before.spaces_available,
            });
        }

        let mut feeder_impacts = vec![];
        let mut voltage_drop_issues = vec![];
        for feeder in feeders {
            let Some((load_amps, voltage)) = feeder
                .destination_panel
                .and_then(|id| panel_load_amps.get(&id).copied())
            else {
                continue;
            };
            if voltage == 0 {
                continue;
            }

            if feeder.ampacity > 0 {
                feeder_impacts.push(feeder_impact(
                    feeder,
                    load_amps,
                    policy.continuous_load_factor(),
                ));
            } else {
                tracing::warn!(
                    "Feeder:{} has no recorded ampacity, skipping its ampacity check.",
                    feeder.id
                );
            }

            let new_drop = feeder.voltage_drop_at(load_amps, f64::from(voltage))?;
            let limit_percent = policy.feeder_voltage_drop_limit_percent;
            voltage_drop_issues.push(VoltageDropIssue {
                feeder_id: feeder.id,
                feeder_name: feeder.name.clone(),
                current_drop: feeder.voltage_drop_percent,
                new_drop,
                limit_percent,
                compliant: new_drop <= limit_percent,
            });
        }

        let can_accommodate = verdict.can_proceed
            && !panel_impacts.iter().any(|p| p.exceeds_threshold)
            && !feeder_impacts.iter().any(|f| f.upgrade_needed)
            && voltage_drop_issues.iter().all(|v| v.compliant);

        tracing::debug!(
            "Change of +{total_amps}A affects {} panels and {} feeders, can accommodate: {can_accommodate}.",
            panel_impacts.len(),
            voltage_drop_issues.len()
        );

        Ok(ChangeImpact {
            can_accommodate,
            total_additional_amps: total_amps,
            service_impact,
            panel_impacts,
            feeder_impacts,
            voltage_drop_issues,
        })
    }

    /// Returns every circuit in the graph with a breaker rating of at least
    /// `min_breaker_amps`, largest breakers first.
    pub fn large_loads(&self, min_breaker_amps: u32) -> Vec<LargeLoad> {
        impact::large_loads(self.panels(), min_breaker_amps)
    }

    /// Returns the volt-amps added to each panel by the given loads.
    fn added_load_va(&self, loads: &[ProposedLoad]) -> Result<HashMap<u64, f64>, Error> {
        let mut added = HashMap::new();
        for load in loads {
            let Some(panel_id) = load.panel else {
                continue;
            };
            let voltage = self.panel(panel_id)?.panel.voltage;
            if voltage == 0 {
                tracing::warn!(
                    "Panel:{panel_id} has no voltage, its share of the change is only counted at the service."
                );
                continue;
            }
            let va = load.total_amps() * f64::from(voltage);
            *added.entry(panel_id).or_default() += va;

            if self.config.aggregation == LoadAggregation::Hierarchical {
                for upstream in self.upstream_panels(panel_id)? {
                    *added.entry(upstream.panel_id()).or_default() += va;
                }
            }
        }
        Ok(added)
    }
}

fn feeder_impact(
    feeder: &FeederSpec,
    load_amps: f64,
    continuous_load_factor: f64,
) -> FeederImpact {
    let continuous_amps = f64::from(feeder.ampacity) * continuous_load_factor;
    let upgrade_needed = load_amps > continuous_amps;
    let reason = if upgrade_needed {
        format!(
            "{load_amps:.1}A exceeds the {continuous_amps:.1}A continuous rating of the {}A feeder.",
            feeder.ampacity
        )
    } else {
        format!(
            "{load_amps:.1}A is within the {continuous_amps:.1}A continuous rating of the {}A feeder.",
            feeder.ampacity
        )
    };

    FeederImpact {
        feeder_id: feeder.id,
        feeder_name: feeder.name.clone(),
        current_size: format!("{} {}", feeder.conductor_size, feeder.material),
        ampacity: feeder.ampacity,
        load_amps,
        upgrade_needed,
        required_ampacity: upgrade_needed
            .then(|| (load_amps / continuous_load_factor).ceil() as u32),
        reason,
    }
}
