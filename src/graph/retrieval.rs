// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Methods for retrieving the service, panels and feeds from a
//! [`DistributionGraph`].

use petgraph::graph::NodeIndex;
use petgraph::Direction;

use crate::iterators::{Neighbors, Panels};
use crate::{DistributionGraph, Error, GraphConfig, PanelSchedule, ServiceSpec};

/// Service and panel retrieval.
impl DistributionGraph {
    /// Returns the service entrance record.
    pub fn service(&self) -> &ServiceSpec {
        &self.service
    }

    /// Returns the configuration the graph was created with.
    pub fn config(&self) -> &GraphConfig {
        &self.config
    }

    /// Returns the panel with the given `panel_id`, if it exists.
    pub fn panel(&self, panel_id: u64) -> Result<&PanelSchedule, Error> {
        let idx = self.index_of(panel_id)?;
        self.schedule_at(idx)
            .ok_or_else(|| Error::panel_not_found(format!("Panel with id {panel_id} not found.")))
    }

    /// Returns an iterator over the panels in the graph.
    pub fn panels(&self) -> Panels {
        Panels {
            iter: self.graph.raw_nodes().iter(),
        }
    }

    /// Returns an iterator over the panels fed directly from the service.
    pub fn service_panels(&self) -> Neighbors {
        self.neighbors(self.root, Direction::Outgoing)
    }

    /// Returns an iterator over the panels fed directly from the panel with
    /// the given `panel_id`.
    ///
    /// Returns an error if the given `panel_id` does not exist.
    pub fn fed_panels(&self, panel_id: u64) -> Result<Neighbors, Error> {
        self.index_of(panel_id)
            .map(|idx| self.neighbors(idx, Direction::Outgoing))
    }

    /// Returns the panel that feeds the panel with the given `panel_id`, or
    /// `None` if it is fed directly from the service.
    ///
    /// Returns an error if the given `panel_id` does not exist.
    pub fn feeding_panel(&self, panel_id: u64) -> Result<Option<&PanelSchedule>, Error> {
        self.index_of(panel_id)
            .map(|idx| self.neighbors(idx, Direction::Incoming).next())
    }

    pub(crate) fn index_of(&self, panel_id: u64) -> Result<NodeIndex, Error> {
        self.node_indices
            .get(&panel_id)
            .copied()
            .ok_or_else(|| Error::panel_not_found(format!("Panel with id {panel_id} not found.")))
    }

    pub(crate) fn schedule_at(&self, idx: NodeIndex) -> Option<&PanelSchedule> {
        self.graph[idx].as_panel()
    }

    /// Returns the index of the node feeding the given node, which may be the
    /// service entrance.
    pub(crate) fn feeding_index(&self, idx: NodeIndex) -> Option<NodeIndex> {
        self.graph.neighbors_directed(idx, Direction::Incoming).next()
    }

    pub(crate) fn panel_id_at(&self, idx: NodeIndex) -> u64 {
        self.schedule_at(idx)
            .map(|s| s.panel_id())
            .unwrap_or_default()
    }

    fn neighbors(&self, idx: NodeIndex, direction: Direction) -> Neighbors {
        Neighbors {
            graph: &self.graph,
            iter: self.graph.neighbors_directed(idx, direction),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::test_utils::DistributionGraphBuilder;

    fn names<'a>(panels: impl Iterator<Item = &'a PanelSchedule>) -> Vec<&'a str> {
        let mut names = panels.map(|s| s.panel.name.as_str()).collect::<Vec<_>>();
        names.sort();
        names
    }

    #[test]
    fn test_panel() -> Result<(), Error> {
        let mut builder = DistributionGraphBuilder::new(200);
        let mdp = builder.panel("MDP", 200, &[1_000.0]);
        let graph = builder.build(None)?;

        assert_eq!(graph.panel(mdp.panel_id())?.panel.name, "MDP");
        assert_eq!(graph.service().amps, 200);
        assert_eq!(
            graph.panel(99),
            Err(Error::panel_not_found("Panel with id 99 not found."))
        );

        Ok(())
    }

    #[test]
    fn test_panels() -> Result<(), Error> {
        let mut builder = DistributionGraphBuilder::new(400);
        let mdp = builder.panel("MDP", 400, &[]);
        builder.sub_panel(mdp, "LP-A", 100, &[]);
        builder.panel("House", 200, &[]);
        let graph = builder.build(None)?;

        assert_eq!(
            graph
                .panels()
                .map(|s| s.panel.name.as_str())
                .collect::<Vec<_>>(),
            vec!["MDP", "LP-A", "House"]
        );

        Ok(())
    }

    #[test]
    fn test_neighbors() -> Result<(), Error> {
        let mut builder = DistributionGraphBuilder::new(400);
        let mdp = builder.panel("MDP", 400, &[]);
        let lp_a = builder.sub_panel(mdp, "LP-A", 100, &[]);
        builder.sub_panel(mdp, "LP-B", 100, &[]);
        let garage = builder.sub_panel(lp_a, "Garage", 60, &[]);
        builder.panel("House", 200, &[]);
        let graph = builder.build(None)?;

        assert_eq!(names(graph.service_panels()), vec!["House", "MDP"]);
        assert_eq!(names(graph.fed_panels(mdp.panel_id())?), vec!["LP-A", "LP-B"]);
        assert_eq!(names(graph.fed_panels(garage.panel_id())?), Vec::<&str>::new());

        assert_eq!(graph.feeding_panel(mdp.panel_id())?, None);
        assert_eq!(
            graph
                .feeding_panel(garage.panel_id())?
                .map(|s| s.panel.name.as_str()),
            Some("LP-A")
        );

        assert!(graph
            .fed_panels(32)
            .is_err_and(|e| e == Error::panel_not_found("Panel with id 32 not found.")));
        assert!(graph
            .feeding_panel(32)
            .is_err_and(|e| e == Error::panel_not_found("Panel with id 32 not found.")));

        Ok(())
    }
}
