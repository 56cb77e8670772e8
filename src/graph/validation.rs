// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Methods for validating a [`DistributionGraph`].

use petgraph::graph::NodeIndex;

use crate::Error;

use super::DistributionGraph;

impl DistributionGraph {
    pub(super) fn validate(&self) -> Result<(), Error> {
        self.validate_acyclicity()
    }

    /// Validates that following the feeds upstream from every panel reaches
    /// the service entrance.
    ///
    /// Since every panel has exactly one feeding point, this also ensures that
    /// all panels are connected to the service.  If a cycle is detected, an
    /// error is returned that lists the panels in the cycle, in the direction
    /// of the feeds.
    fn validate_acyclicity(&self) -> Result<(), Error> {
        for start in self.graph.node_indices().filter(|idx| *idx != self.root) {
            let mut chain: Vec<NodeIndex> = vec![];
            let mut current = start;

            while current != self.root {
                if let Some(first_occurrence) = chain.iter().position(|idx| *idx == current) {
                    return Err(Error::invalid_topology(format!(
                        "Cycle detected: {}",
                        self.describe_cycle(&chain[first_occurrence..])
                    )));
                }
                chain.push(current);

                let Some(feeding) = self.feeding_index(current) else {
                    return Err(Error::invalid_topology(format!(
                        "Panel:{} is not connected to the service.",
                        self.panel_id_at(current)
                    )));
                };
                current = feeding;
            }
        }
        Ok(())
    }

    /// Renders a cycle given as a chain of panels where each one is fed from
    /// the next, as `a -> b -> ... -> a` in the direction of the feeds.
    fn describe_cycle(&self, cycle: &[NodeIndex]) -> String {
        let Some((&first, rest)) = cycle.split_first() else {
            return String::new();
        };
        std::iter::once(first)
            .chain(rest.iter().rev().copied())
            .chain(std::iter::once(first))
            .map(|idx| self.panel_id_at(idx).to_string())
            .collect::<Vec<_>>()
            .join(" -> ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GraphConfig, PanelSchedule, PanelSpec, Phase, ServiceSpec};

    fn panel(id: u64, fed_from: Option<u64>) -> PanelSchedule {
        let mut spec = PanelSpec::new(id, format!("P-{id}"), 100);
        spec.fed_from = fed_from;
        PanelSchedule::new(spec, vec![])
    }

    fn try_build(schedules: Vec<PanelSchedule>) -> Result<DistributionGraph, Error> {
        DistributionGraph::try_new(
            ServiceSpec::try_new(400, 240, Phase::Single)?,
            schedules,
            GraphConfig::default(),
        )
    }

    #[test]
    fn test_acyclicity_validation() {
        let mut schedules = vec![
            panel(1, None),
            panel(2, Some(1)),
            panel(3, Some(2)),
            panel(4, Some(3)),
        ];
        assert!(try_build(schedules.clone()).is_ok());

        // 2 feeds 3, 3 feeds 2
        schedules[1] = panel(2, Some(3));
        assert!(try_build(schedules.clone())
            .is_err_and(|e| e == Error::invalid_topology("Cycle detected: 2 -> 3 -> 2")));

        // 2 feeds 3, 3 feeds 4, 4 feeds 2
        schedules[1] = panel(2, Some(4));
        assert!(try_build(schedules.clone())
            .is_err_and(|e| e == Error::invalid_topology("Cycle detected: 2 -> 3 -> 4 -> 2")));

        schedules[1] = panel(2, Some(1));
        assert!(try_build(schedules.clone()).is_ok());
    }

    #[test]
    fn test_panel_fed_from_cycle() {
        // 5 hangs off a 6 <-> 7 loop, and is reported through the loop.
        let schedules = vec![
            panel(1, None),
            panel(5, Some(6)),
            panel(6, Some(7)),
            panel(7, Some(6)),
        ];
        assert!(try_build(schedules)
            .is_err_and(|e| e == Error::invalid_topology("Cycle detected: 6 -> 7 -> 6")));
    }
}
