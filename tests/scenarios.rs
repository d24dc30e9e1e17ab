use std::collections::HashSet;

use eframe::egui::{Pos2, Rect, vec2};
use graph_spotlight::backend::ExternalLayoutBackend;
use graph_spotlight::highlight::{PointerEvent, compute_highlight};
use graph_spotlight::model::{EdgeAttrs, Graph, NodeAttrs};
use graph_spotlight::overlay::{OverlayFrame, VisualStyle};
use graph_spotlight::{EngineConfig, SyncEngine};

fn five_nodes() -> Graph {
    let mut graph = Graph::new();
    for id in ["1", "2", "3", "4", "5"] {
        graph.add_node(id, NodeAttrs::titled(format!("Node {id}"))).unwrap();
    }
    graph.add_edge("1-2", "1", "2", EdgeAttrs::default()).unwrap();
    graph.add_edge("4-5", "4", "5", EdgeAttrs::default()).unwrap();
    graph.add_edge("1-3", "1", "3", EdgeAttrs::default()).unwrap();
    graph
}

fn engine() -> SyncEngine<ExternalLayoutBackend> {
    let config = EngineConfig::default();
    let backend = ExternalLayoutBackend::new(
        config.overlay,
        Rect::from_min_size(Pos2::ZERO, vec2(1280.0, 800.0)),
    );
    let mut engine = SyncEngine::new(five_nodes(), backend, config);
    engine.update();
    engine
}

fn full_nodes(frame: &OverlayFrame) -> HashSet<&str> {
    frame
        .nodes
        .iter()
        .filter(|node| node.style == VisualStyle::FULL)
        .map(|node| node.id.as_str())
        .collect()
}

fn full_edges(frame: &OverlayFrame) -> HashSet<&str> {
    frame
        .edges
        .iter()
        .filter(|edge| edge.style == VisualStyle::FULL)
        .map(|edge| edge.id.as_str())
        .collect()
}

#[test]
fn hovering_node_one_highlights_its_neighborhood() {
    let mut engine = engine();
    engine.handle_pointer(&PointerEvent::Enter("1".into()));
    let frame = engine.update();

    assert_eq!(frame.nodes.len(), 5);
    assert_eq!(frame.edges.len(), 3);
    assert_eq!(full_nodes(frame), HashSet::from(["1", "2", "3"]));
    assert_eq!(full_edges(frame), HashSet::from(["1-2", "1-3"]));
    for id in ["4", "5"] {
        let node = frame.node(id).unwrap();
        assert!(node.style.is_faded());
        assert!(!node.highlighted);
    }
    assert!(frame.edge("1-2").unwrap().highlighted);
    assert!(!frame.edge("4-5").unwrap().highlighted);
}

#[test]
fn hovering_node_four_fades_everything_else() {
    let mut engine = engine();
    engine.handle_pointer(&PointerEvent::Enter("4".into()));
    let frame = engine.update();

    assert_eq!(full_nodes(frame), HashSet::from(["4", "5"]));
    assert_eq!(full_edges(frame), HashSet::from(["4-5"]));
    assert_eq!(frame.nodes.iter().filter(|node| node.style.is_faded()).count(), 3);
}

#[test]
fn clearing_hover_restores_every_element() {
    let mut engine = engine();
    engine.handle_pointer(&PointerEvent::Enter("1".into()));
    engine.update();
    engine.handle_pointer(&PointerEvent::Leave("1".into()));
    let frame = engine.update();

    assert_eq!(full_nodes(frame).len(), 5);
    assert_eq!(full_edges(frame).len(), 3);
    assert!(engine.highlight().is_empty());
}

#[test]
fn removing_node_two_drops_its_edge() {
    let mut engine = engine();
    engine.remove_node("2").unwrap();
    let frame = engine.update();

    let edges = frame.edges.iter().map(|edge| edge.id.as_str()).collect::<Vec<_>>();
    assert_eq!(edges, vec!["4-5", "1-3"]);
    assert!(frame.node("2").is_none());
    assert!(engine.graph().edges().iter().all(|edge| !edge.touches("2")));
}

#[test]
fn highlight_is_symmetric_across_every_edge() {
    let mut graph = five_nodes();
    graph.connect("3", "5").unwrap();
    graph.add_edge("loop", "2", "2", EdgeAttrs::default()).unwrap();

    for node in graph.nodes() {
        let highlight = compute_highlight(Some(node.id.as_str()), graph.adjacency()).unwrap();
        let mut expected = graph.neighbors(&node.id).unwrap();
        expected.insert(&node.id);
        let actual = highlight.nodes.iter().map(String::as_str).collect::<HashSet<_>>();
        assert_eq!(actual, expected);

        for other in &highlight.nodes {
            let back = compute_highlight(Some(other.as_str()), graph.adjacency()).unwrap();
            assert!(back.contains_node(&node.id), "{other} does not see {}", node.id);
        }
    }
}
