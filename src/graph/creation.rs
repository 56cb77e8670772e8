// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Methods for creating [`DistributionGraph`] instances from a service and
//! its panel schedules.

use petgraph::graph::{DiGraph, NodeIndex};

use crate::{Error, GraphConfig, PanelSchedule, ServiceSpec};

use super::{DistributionGraph, Node, NodeIndexMap};

/// `DistributionGraph` instantiation.
impl DistributionGraph {
    /// Creates a new [`DistributionGraph`] from the given service and panel
    /// schedules.
    ///
    /// Panels are connected according to their `fed_from` field.  Returns an
    /// error if any record, the policy, or the resulting topology is invalid.
    pub fn try_new<ScheduleIterator: IntoIterator<Item = PanelSchedule>>(
        service: ServiceSpec,
        schedules: ScheduleIterator,
        config: GraphConfig,
    ) -> Result<Self, Error> {
        service.validate()?;
        config.policy.validate()?;

        let (graph, node_indices, root) = Self::create_graph(schedules)?;

        let mut dg = Self {
            graph,
            node_indices,
            root,
            service,
            config,
        };
        dg.add_feeds()?;

        dg.validate()?;

        tracing::debug!(
            "Created distribution graph with {} panels on a {}A service.",
            dg.node_indices.len(),
            dg.service.amps
        );

        Ok(dg)
    }

    fn create_graph(
        schedules: impl IntoIterator<Item = PanelSchedule>,
    ) -> Result<(DiGraph<Node, ()>, NodeIndexMap, NodeIndex), Error> {
        let mut graph = DiGraph::new();
        let mut indices = NodeIndexMap::new();
        let root = graph.add_node(Node::ServiceEntrance);

        for schedule in schedules {
            let pid = schedule.panel_id();

            schedule.validate()?;
            if indices.contains_key(&pid) {
                return Err(Error::invalid_topology(format!(
                    "Duplicate panel ID found: {pid}"
                )));
            }

            let idx = graph.add_node(Node::Panel(schedule));
            indices.insert(pid, idx);
        }

        Ok((graph, indices, root))
    }

    fn add_feeds(&mut self) -> Result<(), Error> {
        let feeds = self
            .graph
            .node_indices()
            .filter_map(|idx| {
                self.graph[idx]
                    .as_panel()
                    .map(|s| (idx, s.panel.id, s.panel.fed_from))
            })
            .collect::<Vec<_>>();

        for (idx, pid, fed_from) in feeds {
            let source_idx = match fed_from {
                None => self.root,
                Some(sid) if sid == pid => {
                    return Err(Error::invalid_topology(format!(
                        "Panel:{pid} can't be fed from itself."
                    )));
                }
                Some(sid) => *self.node_indices.get(&sid).ok_or_else(|| {
                    Error::invalid_topology(format!(
                        "Panel:{pid} is fed from unknown panel {sid}."
                    ))
                })?,
            };
            self.graph.add_edge(source_idx, idx, ());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{CapacityPolicy, CircuitRecord, PanelSpec, Phase};

    fn service() -> ServiceSpec {
        ServiceSpec::try_new(200, 240, Phase::Single).unwrap()
    }

    fn schedules() -> Vec<PanelSchedule> {
        vec![
            PanelSchedule::new(PanelSpec::new(1, "MDP", 200), vec![]),
            PanelSchedule::new(PanelSpec::new(2, "LP-A", 100).fed_from(1), vec![]),
            PanelSchedule::new(PanelSpec::new(3, "LP-B", 100).fed_from(1), vec![]),
            PanelSchedule::new(PanelSpec::new(4, "Garage", 60).fed_from(3), vec![]),
        ]
    }

    #[test]
    fn test_panel_validation() {
        let config = GraphConfig::default();
        let mut schedules = schedules();

        assert!(DistributionGraph::try_new(service(), schedules.clone(), config.clone()).is_ok());

        schedules.push(PanelSchedule::new(PanelSpec::new(2, "LP-A2", 100), vec![]));
        assert!(
            DistributionGraph::try_new(service(), schedules.clone(), config.clone())
                .is_err_and(|e| e == Error::invalid_topology("Duplicate panel ID found: 2"))
        );

        schedules.pop();
        schedules.push(PanelSchedule::new(PanelSpec::new(5, "Bad", 0), vec![]));
        assert!(
            DistributionGraph::try_new(service(), schedules.clone(), config.clone())
                .is_err_and(|e| e == Error::invalid_record("Panel:5 bus rating must be positive."))
        );

        schedules.pop();
        schedules.push(PanelSchedule::new(
            PanelSpec::new(5, "Bad", 100),
            vec![CircuitRecord::new("Weird", 100.0, 15).with_poles(5)],
        ));
        assert!(
            DistributionGraph::try_new(service(), schedules.clone(), config.clone()).is_err_and(
                |e| e
                    == Error::invalid_record(
                        "Panel:5 Circuit \"Weird\" must have 1, 2 or 3 poles, got 5."
                    )
            )
        );

        schedules.pop();
        assert!(DistributionGraph::try_new(service(), schedules.clone(), config.clone()).is_ok());
    }

    #[test]
    fn test_feed_validation() {
        let config = GraphConfig::default();
        let mut schedules = schedules();

        schedules.push(PanelSchedule::new(PanelSpec::new(5, "Loop", 100).fed_from(5), vec![]));
        assert!(
            DistributionGraph::try_new(service(), schedules.clone(), config.clone())
                .is_err_and(|e| e == Error::invalid_topology("Panel:5 can't be fed from itself."))
        );

        schedules.pop();
        schedules.push(PanelSchedule::new(PanelSpec::new(5, "Orphan", 100).fed_from(9), vec![]));
        assert!(
            DistributionGraph::try_new(service(), schedules.clone(), config.clone())
                .is_err_and(|e| e == Error::invalid_topology("Panel:5 is fed from unknown panel 9."))
        );

        schedules.pop();
        assert!(DistributionGraph::try_new(service(), schedules.clone(), config.clone()).is_ok());
    }

    #[test]
    fn test_service_and_policy_validation() {
        let bad_service = ServiceSpec {
            amps: 0,
            voltage: 240,
            phase: Phase::Single,
        };
        assert!(
            DistributionGraph::try_new(bad_service, schedules(), GraphConfig::default())
                .is_err_and(|e| e == Error::invalid_record("Service size must be positive."))
        );

        let config = GraphConfig {
            policy: CapacityPolicy {
                standard_service_sizes: vec![],
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(DistributionGraph::try_new(service(), schedules(), config)
            .is_err_and(|e| e
                == Error::invalid_config("At least one standard service size is required.")));
    }

    #[test]
    fn test_empty_graph() -> Result<(), Error> {
        let graph = DistributionGraph::try_new(service(), vec![], GraphConfig::default())?;
        assert_eq!(graph.panels().count(), 0);
        assert_eq!(graph.service_load_va(), 0.0);
        Ok(())
    }
}
