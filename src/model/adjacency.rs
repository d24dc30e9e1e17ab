use std::collections::HashMap;

use super::graph::{EdgeRecord, NodeRecord};

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Incidence {
    pub edge: String,
    pub neighbor: String,
}

/// Node id -> edges touching it. Every node has an entry, isolated nodes an empty one.
///
/// `incident(n)` lists edge `e` exactly when `e.source == n` or `e.target == n`; a self-loop
/// appears once with the node as its own neighbor.
#[derive(Clone, Debug, Default)]
pub struct AdjacencyIndex {
    incident: HashMap<String, Vec<Incidence>>,
}

impl AdjacencyIndex {
    pub fn build(nodes: &[NodeRecord], edges: &[EdgeRecord]) -> Self {
        let mut incident = nodes
            .iter()
            .map(|node| (node.id.clone(), Vec::new()))
            .collect::<HashMap<_, _>>();

        for edge in edges {
            if let Some(list) = incident.get_mut(&edge.source) {
                list.push(Incidence {
                    edge: edge.id.clone(),
                    neighbor: edge.target.clone(),
                });
            }

            if edge.source == edge.target {
                continue;
            }

            if let Some(list) = incident.get_mut(&edge.target) {
                list.push(Incidence {
                    edge: edge.id.clone(),
                    neighbor: edge.source.clone(),
                });
            }
        }

        Self { incident }
    }

    pub(super) fn insert_node(&mut self, id: &str) {
        self.incident.entry(id.to_owned()).or_default();
    }

    pub fn contains(&self, id: &str) -> bool {
        self.incident.contains_key(id)
    }

    pub fn incident(&self, id: &str) -> Option<&[Incidence]> {
        self.incident.get(id).map(Vec::as_slice)
    }

    pub fn degree(&self, id: &str) -> usize {
        self.incident.get(id).map_or(0, Vec::len)
    }

    pub fn len(&self) -> usize {
        self.incident.len()
    }

    pub fn is_empty(&self) -> bool {
        self.incident.is_empty()
    }
}
