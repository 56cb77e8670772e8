// License: MIT
// Copyright © 2024 Frequenz Energy-as-a-Service GmbH

//! A graph representation of a building's electrical distribution: the
//! service entrance, the panels, and which panel is fed from where.

mod aggregation;
mod change_impact;
mod creation;
mod retrieval;
mod traversal;
mod validation;

pub mod iterators;

#[cfg(test)]
mod test_utils;

use crate::{GraphConfig, PanelSchedule, ServiceSpec};
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// `Node`s stored in a `DiGraph` instance can be addressed with `NodeIndex`es.
///
/// `NodeIndexMap` stores the corresponding `NodeIndex` for any panel id, so
/// that panels in the `DiGraph` can be retrieved from their ids.
pub(crate) type NodeIndexMap = HashMap<u64, NodeIndex>;

/// A node of the distribution graph.
#[derive(Debug)]
pub(crate) enum Node {
    /// The root of the graph, where the service enters the building.
    ServiceEntrance,
    Panel(PanelSchedule),
}

impl Node {
    pub(crate) fn as_panel(&self) -> Option<&PanelSchedule> {
        match self {
            Node::ServiceEntrance => None,
            Node::Panel(schedule) => Some(schedule),
        }
    }
}

/// A graph of the panels of a building and the feeds between them, rooted at
/// the service entrance.
///
/// Every panel has exactly one feeding point: either the service, or another
/// panel.  Edges point from the feeding point to the fed panel.
#[derive(Debug)]
pub struct DistributionGraph {
    graph: DiGraph<Node, ()>,
    node_indices: NodeIndexMap,
    root: NodeIndex,
    service: ServiceSpec,
    config: GraphConfig,
}
