// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! This module contains methods that help with graph traversal.

use petgraph::graph::NodeIndex;
use petgraph::Direction;

use crate::{DistributionGraph, Error, PanelSchedule};

/// Traversal methods.
impl DistributionGraph {
    fn find_all(&self, from: NodeIndex, direction: Direction) -> Vec<&PanelSchedule> {
        let mut stack = self
            .graph
            .neighbors_directed(from, direction)
            .collect::<Vec<_>>();
        let mut found = vec![];

        while let Some(index) = stack.pop() {
            if let Some(schedule) = self.schedule_at(index) {
                found.push(schedule);
            }

            let neighbors = self.graph.neighbors_directed(index, direction);
            stack.extend(neighbors);
        }

        found
    }

    /// Returns the panels between the panel with the given `panel_id` and the
    /// service, starting with the panel feeding it.
    pub fn upstream_panels(&self, panel_id: u64) -> Result<Vec<&PanelSchedule>, Error> {
        let index = self.index_of(panel_id)?;
        Ok(self.find_all(index, Direction::Incoming))
    }

    /// Returns all panels fed directly or indirectly from the panel with the
    /// given `panel_id`.
    pub fn downstream_panels(&self, panel_id: u64) -> Result<Vec<&PanelSchedule>, Error> {
        let index = self.index_of(panel_id)?;
        Ok(self.find_all(index, Direction::Outgoing))
    }
}
