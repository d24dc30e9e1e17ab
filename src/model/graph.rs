use std::collections::{HashMap, HashSet};

use eframe::egui::Vec2;

use crate::error::{ElementKind, GraphError};

use super::adjacency::AdjacencyIndex;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeAttrs {
    pub title: String,
    pub content: String,
    pub position: Option<Vec2>,
    pub radius: Option<f32>,
}

impl NodeAttrs {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    pub fn at(mut self, position: Vec2) -> Self {
        self.position = Some(position);
        self
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EdgeAttrs {
    pub label: Option<String>,
    pub reverse_label: Option<String>,
    pub rest_length: Option<f32>,
    pub stiffness: Option<f32>,
}

impl EdgeAttrs {
    pub fn labeled(label: impl Into<String>) -> Self {
        Self {
            label: Some(label.into()),
            ..Self::default()
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeRecord {
    pub id: String,
    pub title: String,
    pub content: String,
    /// Only authoritative once written by a layout run or a drag.
    pub position: Option<Vec2>,
    pub radius: Option<f32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeRecord {
    pub id: String,
    pub source: String,
    pub target: String,
    pub label: Option<String>,
    pub reverse_label: Option<String>,
    pub rest_length: Option<f32>,
    pub stiffness: Option<f32>,
}

impl EdgeRecord {
    pub fn touches(&self, node_id: &str) -> bool {
        self.source == node_id || self.target == node_id
    }
}

/// Node-link topology. Nodes and edges keep insertion order; no edge ever references a
/// missing node.
#[derive(Clone, Debug, Default)]
pub struct Graph {
    nodes: Vec<NodeRecord>,
    edges: Vec<EdgeRecord>,
    node_index: HashMap<String, usize>,
    edge_index: HashMap<String, usize>,
    adjacency: AdjacencyIndex,
    revision: u64,
}

impl Graph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bumped on every topology change; position writes do not count.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn nodes(&self) -> &[NodeRecord] {
        &self.nodes
    }

    pub fn edges(&self) -> &[EdgeRecord] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&NodeRecord> {
        self.node_index.get(id).map(|&index| &self.nodes[index])
    }

    pub fn edge(&self, id: &str) -> Option<&EdgeRecord> {
        self.edge_index.get(id).map(|&index| &self.edges[index])
    }

    pub fn contains_node(&self, id: &str) -> bool {
        self.node_index.contains_key(id)
    }

    pub fn contains_edge(&self, id: &str) -> bool {
        self.edge_index.contains_key(id)
    }

    pub fn adjacency(&self) -> &AdjacencyIndex {
        &self.adjacency
    }

    pub fn add_node(&mut self, id: impl Into<String>, attrs: NodeAttrs) -> Result<(), GraphError> {
        let id = id.into();
        if self.node_index.contains_key(&id) {
            return Err(GraphError::DuplicateId {
                kind: ElementKind::Node,
                id,
            });
        }

        self.node_index.insert(id.clone(), self.nodes.len());
        self.adjacency.insert_node(&id);
        self.nodes.push(NodeRecord {
            id,
            title: attrs.title,
            content: attrs.content,
            position: attrs.position,
            radius: attrs.radius,
        });
        self.revision += 1;
        Ok(())
    }

    pub fn add_edge(
        &mut self,
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        attrs: EdgeAttrs,
    ) -> Result<(), GraphError> {
        let id = id.into();
        let source = source.into();
        let target = target.into();

        for endpoint in [&source, &target] {
            if !self.node_index.contains_key(endpoint) {
                return Err(GraphError::UnknownNode(endpoint.clone()));
            }
        }
        if self.edge_index.contains_key(&id) {
            return Err(GraphError::DuplicateId {
                kind: ElementKind::Edge,
                id,
            });
        }

        self.edge_index.insert(id.clone(), self.edges.len());
        self.edges.push(EdgeRecord {
            id,
            source,
            target,
            label: attrs.label,
            reverse_label: attrs.reverse_label,
            rest_length: attrs.rest_length,
            stiffness: attrs.stiffness,
        });
        self.rebuild_adjacency();
        Ok(())
    }

    /// Adds an edge with a generated id, the way an interactive "connect" gesture does.
    pub fn connect(&mut self, source: &str, target: &str) -> Result<String, GraphError> {
        let mut next = self.edges.len() + 1;
        let mut id = next.to_string();
        while self.edge_index.contains_key(&id) {
            next += 1;
            id = next.to_string();
        }

        self.add_edge(id.clone(), source, target, EdgeAttrs::default())?;
        Ok(id)
    }

    /// Removes the node and every edge touching it.
    pub fn remove_node(&mut self, id: &str) -> Result<NodeRecord, GraphError> {
        let Some(index) = self.node_index.get(id).copied() else {
            return Err(GraphError::UnknownNode(id.to_owned()));
        };

        let removed = self.nodes.remove(index);
        self.edges.retain(|edge| !edge.touches(id));
        self.reindex_nodes();
        self.reindex_edges();
        self.rebuild_adjacency();
        Ok(removed)
    }

    pub fn remove_edge(&mut self, id: &str) -> Result<EdgeRecord, GraphError> {
        let Some(index) = self.edge_index.get(id).copied() else {
            return Err(GraphError::UnknownEdge(id.to_owned()));
        };

        let removed = self.edges.remove(index);
        self.reindex_edges();
        self.rebuild_adjacency();
        Ok(removed)
    }

    pub fn neighbors(&self, id: &str) -> Result<HashSet<&str>, GraphError> {
        let incident = self
            .adjacency
            .incident(id)
            .ok_or_else(|| GraphError::UnknownNode(id.to_owned()))?;

        Ok(incident
            .iter()
            .map(|incidence| incidence.neighbor.as_str())
            .collect())
    }

    pub fn set_position(&mut self, id: &str, position: Vec2) -> Result<(), GraphError> {
        let index = self
            .node_index
            .get(id)
            .copied()
            .ok_or_else(|| GraphError::UnknownNode(id.to_owned()))?;
        self.nodes[index].position = Some(position);
        Ok(())
    }

    fn reindex_nodes(&mut self) {
        self.node_index.clear();
        for (index, node) in self.nodes.iter().enumerate() {
            self.node_index.insert(node.id.clone(), index);
        }
    }

    fn reindex_edges(&mut self) {
        self.edge_index.clear();
        for (index, edge) in self.edges.iter().enumerate() {
            self.edge_index.insert(edge.id.clone(), index);
        }
    }

    fn rebuild_adjacency(&mut self) {
        self.adjacency = AdjacencyIndex::build(&self.nodes, &self.edges);
        self.revision += 1;
        log::debug!(
            "adjacency rebuilt: {} nodes / {} edges (revision {})",
            self.nodes.len(),
            self.edges.len(),
            self.revision
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Graph {
        let mut graph = Graph::new();
        for id in ["1", "2", "3", "4", "5"] {
            graph
                .add_node(id, NodeAttrs::titled(format!("Node {id}")))
                .unwrap();
        }
        graph.add_edge("1-2", "1", "2", EdgeAttrs::default()).unwrap();
        graph.add_edge("4-5", "4", "5", EdgeAttrs::default()).unwrap();
        graph.add_edge("1-3", "1", "3", EdgeAttrs::default()).unwrap();
        graph
    }

    #[test]
    fn duplicate_node_is_rejected() {
        let mut graph = sample();
        let error = graph.add_node("3", NodeAttrs::default()).unwrap_err();
        assert_eq!(
            error,
            GraphError::DuplicateId {
                kind: ElementKind::Node,
                id: "3".to_owned()
            }
        );
        assert_eq!(graph.node_count(), 5);
    }

    #[test]
    fn edge_needs_both_endpoints() {
        let mut graph = sample();
        assert_eq!(
            graph.add_edge("x", "1", "9", EdgeAttrs::default()),
            Err(GraphError::UnknownNode("9".to_owned()))
        );
        assert_eq!(
            graph.add_edge("1-2", "2", "3", EdgeAttrs::default()),
            Err(GraphError::DuplicateId {
                kind: ElementKind::Edge,
                id: "1-2".to_owned()
            })
        );
        assert_eq!(graph.edge_count(), 3);
    }

    #[test]
    fn remove_node_cascades_to_edges() {
        let mut graph = sample();
        let removed = graph.remove_node("2").unwrap();
        assert_eq!(removed.id, "2");

        let remaining = graph
            .edges()
            .iter()
            .map(|edge| edge.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(remaining, vec!["4-5", "1-3"]);
        assert!(graph.edges().iter().all(|edge| !edge.touches("2")));
        assert_eq!(graph.edge("1-3").map(|edge| edge.target.as_str()), Some("3"));
        assert!(graph.adjacency().incident("2").is_none());
    }

    #[test]
    fn removing_a_hub_leaves_no_dangling_edges() {
        let mut graph = sample();
        graph.add_edge("3-1", "3", "1", EdgeAttrs::default()).unwrap();
        graph.add_edge("1-1", "1", "1", EdgeAttrs::default()).unwrap();
        graph.remove_node("1").unwrap();

        assert!(graph.edges().iter().all(|edge| !edge.touches("1")));
        assert_eq!(graph.edge_count(), 1);
        assert_eq!(graph.neighbors("3").unwrap(), HashSet::new());
    }

    #[test]
    fn neighbors_follow_both_directions() {
        let graph = sample();
        assert_eq!(graph.neighbors("1").unwrap(), HashSet::from(["2", "3"]));
        assert_eq!(graph.neighbors("2").unwrap(), HashSet::from(["1"]));
        assert_eq!(
            graph.neighbors("9"),
            Err(GraphError::UnknownNode("9".to_owned()))
        );
    }

    #[test]
    fn isolated_node_has_no_neighbors() {
        let mut graph = sample();
        graph.add_node("6", NodeAttrs::default()).unwrap();
        assert!(graph.neighbors("6").unwrap().is_empty());
    }

    #[test]
    fn connect_generates_free_ids() {
        let mut graph = sample();
        graph.add_edge("4", "2", "3", EdgeAttrs::default()).unwrap();

        let id = graph.connect("3", "5").unwrap();
        assert_eq!(id, "5");
        assert_eq!(graph.edge("5").map(|edge| edge.source.as_str()), Some("3"));
        assert_eq!(
            graph.connect("3", "missing"),
            Err(GraphError::UnknownNode("missing".to_owned()))
        );
    }

    #[test]
    fn remove_edge_rebuilds_adjacency() {
        let mut graph = sample();
        graph.remove_edge("1-2").unwrap();
        assert_eq!(graph.neighbors("1").unwrap(), HashSet::from(["3"]));
        assert_eq!(
            graph.remove_edge("1-2"),
            Err(GraphError::UnknownEdge("1-2".to_owned()))
        );
    }

    #[test]
    fn revision_tracks_topology_only() {
        let mut graph = sample();
        let before = graph.revision();
        graph.set_position("1", Vec2::new(3.0, 4.0)).unwrap();
        assert_eq!(graph.revision(), before);
        assert_eq!(graph.node("1").and_then(|node| node.position), Some(Vec2::new(3.0, 4.0)));

        graph.connect("2", "3").unwrap();
        assert!(graph.revision() > before);
    }
}
