use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use eframe::egui::vec2;
use graph_spotlight::EngineConfig;
use graph_spotlight::model::{EdgeAttrs, Graph, NodeAttrs};
use serde::Deserialize;

const SAMPLE_GRAPH: &str = r#"{
    "nodes": [
        { "id": "1", "title": "Node 1", "content": "card content area", "position": [100, 10] },
        { "id": "2", "title": "Node 2", "content": "card content area", "position": [10, 200] },
        { "id": "3", "title": "Node 3", "content": "card content area", "position": [300, 300] },
        { "id": "4", "title": "Node 4", "content": "card content area", "position": [500, 100] },
        { "id": "5", "title": "Node 5", "content": "card content area", "position": [800, 300] }
    ],
    "edges": [
        { "id": "1-2", "source": "1", "target": "2", "label": "1 to 2", "reverseLabel": "2 to 1" },
        { "id": "4-5", "source": "4", "target": "5" },
        { "id": "1-3", "source": "1", "target": "3" }
    ]
}"#;

#[derive(Debug, Deserialize)]
struct GraphFile {
    #[serde(default)]
    nodes: Vec<RawNode>,
    #[serde(default)]
    edges: Vec<RawEdge>,
}

#[derive(Debug, Deserialize)]
struct RawNode {
    id: String,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: String,
    #[serde(default)]
    position: Option<[f32; 2]>,
    #[serde(default)]
    radius: Option<f32>,
}

#[derive(Debug, Deserialize)]
struct RawEdge {
    #[serde(default)]
    id: Option<String>,
    source: String,
    target: String,
    #[serde(default)]
    label: Option<String>,
    #[serde(default, rename = "reverseLabel", alias = "reverse_label")]
    reverse_label: Option<String>,
    #[serde(default, rename = "restLength", alias = "rest_length")]
    rest_length: Option<f32>,
    #[serde(default)]
    stiffness: Option<f32>,
}

pub(super) struct Scene {
    pub(super) graph: Graph,
    pub(super) config: EngineConfig,
    pub(super) source: String,
}

pub(super) fn parse_graph(raw: &str) -> Result<Graph> {
    let file: GraphFile = serde_json::from_str(raw).context("invalid graph JSON")?;
    let mut graph = Graph::new();

    for node in file.nodes {
        let attrs = NodeAttrs {
            title: node.title.unwrap_or_else(|| node.id.clone()),
            content: node.content,
            position: node.position.map(|[x, y]| vec2(x, y)),
            radius: node.radius,
        };
        graph
            .add_node(node.id, attrs)
            .context("invalid node in graph file")?;
    }

    for edge in file.edges {
        let id = edge
            .id
            .unwrap_or_else(|| format!("{}-{}", edge.source, edge.target));
        let attrs = EdgeAttrs {
            label: edge.label,
            reverse_label: edge.reverse_label,
            rest_length: edge.rest_length,
            stiffness: edge.stiffness,
        };
        graph
            .add_edge(id, edge.source, edge.target, attrs)
            .context("invalid edge in graph file")?;
    }

    Ok(graph)
}

fn load_config(path: Option<&Path>) -> Result<EngineConfig> {
    let Some(path) = path else {
        return Ok(EngineConfig::default());
    };
    let raw = fs::read_to_string(path)
        .with_context(|| format!("failed to read config {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("invalid config {}", path.display()))
}

pub(super) fn load_scene(graph_path: Option<&Path>, config_path: Option<&Path>) -> Result<Scene> {
    let config = load_config(config_path)?;
    let (graph, source) = match graph_path {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read graph {}", path.display()))?;
            let graph =
                parse_graph(&raw).with_context(|| format!("failed to load {}", path.display()))?;
            (graph, path.display().to_string())
        }
        None => (parse_graph(SAMPLE_GRAPH)?, "built-in sample".to_owned()),
    };

    log::info!(
        "loaded {} nodes / {} edges from {source}",
        graph.node_count(),
        graph.edge_count()
    );
    Ok(Scene {
        graph,
        config,
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sample_graph_parses() {
        let graph = parse_graph(SAMPLE_GRAPH).unwrap();
        assert_eq!(graph.node_count(), 5);
        assert_eq!(graph.edge_count(), 3);
        let edge = graph.edge("1-2").unwrap();
        assert_eq!(edge.reverse_label.as_deref(), Some("2 to 1"));
        assert_eq!(graph.node("3").and_then(|node| node.position), Some(vec2(300.0, 300.0)));
    }

    #[test]
    fn missing_edge_ids_are_derived_from_endpoints() {
        let graph = parse_graph(
            r#"{ "nodes": [{ "id": "a" }, { "id": "b" }], "edges": [{ "source": "a", "target": "b" }] }"#,
        )
        .unwrap();
        assert!(graph.contains_edge("a-b"));
        assert_eq!(graph.node("a").map(|node| node.title.as_str()), Some("a"));
    }

    #[test]
    fn topology_errors_are_reported() {
        let error = parse_graph(
            r#"{ "nodes": [{ "id": "a" }], "edges": [{ "source": "a", "target": "zz" }] }"#,
        )
        .unwrap_err();
        assert!(format!("{error:#}").contains("unknown node: zz"));

        let error = parse_graph(r#"{ "nodes": [{ "id": "a" }, { "id": "a" }] }"#).unwrap_err();
        assert!(format!("{error:#}").contains("duplicate node id: a"));
    }
}
