use std::collections::HashSet;

use crate::error::GraphError;
use crate::model::AdjacencyIndex;

mod hover;

pub use hover::{HoverState, PointerEvent};

/// Induced highlighted subgraph: the hovered node, its one-hop neighbors, and its incident edges.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Highlight {
    pub nodes: HashSet<String>,
    pub edges: HashSet<String>,
}

impl Highlight {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.nodes.contains(id)
    }

    pub fn contains_edge(&self, id: &str) -> bool {
        self.edges.contains(id)
    }
}

/// Pure and O(degree): only the hovered node's incidence list is read.
///
/// An id the adjacency index does not know yields `UnknownNode`; callers are expected to treat
/// that as "no highlight", since hover events may race node removal.
pub fn compute_highlight(
    hovered: Option<&str>,
    adjacency: &AdjacencyIndex,
) -> Result<Highlight, GraphError> {
    let Some(hovered) = hovered else {
        return Ok(Highlight::default());
    };

    let incident = adjacency
        .incident(hovered)
        .ok_or_else(|| GraphError::UnknownNode(hovered.to_owned()))?;

    let mut nodes = HashSet::with_capacity(incident.len() + 1);
    let mut edges = HashSet::with_capacity(incident.len());
    nodes.insert(hovered.to_owned());
    for incidence in incident {
        nodes.insert(incidence.neighbor.clone());
        edges.insert(incidence.edge.clone());
    }

    Ok(Highlight { nodes, edges })
}
