// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! Iterators over panels in a `DistributionGraph`.

use petgraph::graph::DiGraph;

use crate::PanelSchedule;

use super::Node;

/// An iterator over the panels in a `DistributionGraph`, in the order they
/// were added.
pub struct Panels<'a> {
    pub(crate) iter: std::slice::Iter<'a, petgraph::graph::Node<Node>>,
}

impl<'a> Iterator for Panels<'a> {
    type Item = &'a PanelSchedule;

    fn next(&mut self) -> Option<Self::Item> {
        self.iter.by_ref().find_map(|n| n.weight.as_panel())
    }
}

/// An iterator over the panels adjacent to a point in a `DistributionGraph`.
///
/// The service entrance is not a panel, and is skipped.
pub struct Neighbors<'a> {
    pub(crate) graph: &'a DiGraph<Node, ()>,
    pub(crate) iter: petgraph::graph::Neighbors<'a, ()>,
}

impl<'a> Iterator for Neighbors<'a> {
    type Item = &'a PanelSchedule;

    fn next(&mut self) -> Option<Self::Item> {
        let graph = self.graph;
        self.iter.by_ref().find_map(|i| graph[i].as_panel())
    }
}
