use eframe::egui::Vec2;

use crate::backend::RenderBackend;
use crate::config::{EngineConfig, LayoutConfig};
use crate::error::{GraphError, StaleReferenceWarning};
use crate::highlight::{Highlight, HoverState, PointerEvent, compute_highlight};
use crate::model::{EdgeAttrs, EdgeRecord, Graph, NodeAttrs, NodeRecord, PositionTable};
use crate::overlay::{OverlayFrame, OverlayRenderer};
use crate::physics::ForceLayout;

/// Owns the graph and wires it through a backend into overlay frames.
///
/// All mutation happens on the caller's thread, typically once per display refresh via
/// [`SyncEngine::update`].
pub struct SyncEngine<B> {
    graph: Graph,
    backend: B,
    hover: HoverState,
    overlay: OverlayRenderer,
    layout: LayoutConfig,
    topology_dirty: bool,
}

impl<B: RenderBackend> SyncEngine<B> {
    pub fn new(graph: Graph, backend: B, config: EngineConfig) -> Self {
        Self {
            graph,
            backend,
            hover: HoverState::default(),
            overlay: OverlayRenderer::new(config.overlay),
            layout: config.layout,
            topology_dirty: true,
        }
    }

    pub fn graph(&self) -> &Graph {
        &self.graph
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn hover(&self) -> &HoverState {
        &self.hover
    }

    pub fn overlay(&self) -> &OverlayRenderer {
        &self.overlay
    }

    /// The most recently reconciled frame.
    pub fn frame(&self) -> &OverlayFrame {
        self.overlay.frame()
    }

    /// Highlight for the current hover, empty when nothing valid is hovered.
    pub fn highlight(&self) -> Highlight {
        match compute_highlight(self.hover.hovered(), self.graph.adjacency()) {
            Ok(highlight) => highlight,
            Err(_) => {
                StaleReferenceWarning::new(self.hover.hovered().unwrap_or_default(), "highlight")
                    .emit();
                Highlight::default()
            }
        }
    }

    pub fn wants_frame(&self) -> bool {
        self.topology_dirty || self.backend.wants_frame()
    }

    pub fn add_node(&mut self, id: impl Into<String>, attrs: NodeAttrs) -> Result<(), GraphError> {
        self.graph.add_node(id, attrs)?;
        self.topology_dirty = true;
        Ok(())
    }

    pub fn add_edge(
        &mut self,
        id: impl Into<String>,
        source: impl Into<String>,
        target: impl Into<String>,
        attrs: EdgeAttrs,
    ) -> Result<(), GraphError> {
        self.graph.add_edge(id, source, target, attrs)?;
        self.topology_dirty = true;
        Ok(())
    }

    pub fn connect(&mut self, source: &str, target: &str) -> Result<String, GraphError> {
        let id = self.graph.connect(source, target)?;
        self.topology_dirty = true;
        Ok(id)
    }

    pub fn remove_node(&mut self, id: &str) -> Result<NodeRecord, GraphError> {
        let removed = self.graph.remove_node(id)?;
        if self.hover.hovered() == Some(id) {
            self.hover.clear();
        }
        self.topology_dirty = true;
        Ok(removed)
    }

    pub fn remove_edge(&mut self, id: &str) -> Result<EdgeRecord, GraphError> {
        let removed = self.graph.remove_edge(id)?;
        self.topology_dirty = true;
        Ok(removed)
    }

    /// Applies a pointer event reported by the host. Events naming unknown nodes are dropped.
    pub fn handle_pointer(&mut self, event: &PointerEvent) -> bool {
        if !self.graph.contains_node(event.node_id()) {
            StaleReferenceWarning::new(event.node_id(), "pointer event").emit();
            return false;
        }
        self.hover.apply(event)
    }

    pub fn clear_hover(&mut self) -> bool {
        self.hover.clear()
    }

    /// One frame: push topology if it changed, step the backend, take in pointer events and
    /// positions, then rebuild the overlay frame.
    pub fn update(&mut self) -> &OverlayFrame {
        if self.topology_dirty {
            self.push_topology();
        }

        self.backend.advance();
        for event in self.backend.drain_pointer_events() {
            self.handle_pointer(&event);
        }

        self.overlay.set_transform(self.backend.transform());
        if let Some(table) = self.backend.poll_positions() {
            self.apply_positions(&table);
        }
        self.overlay.reconcile(&self.graph, &self.hover)
    }

    fn push_topology(&mut self) {
        self.topology_dirty = false;
        self.backend.replace_elements(&self.graph);

        let Some(sink) = self.backend.position_sink() else {
            return;
        };
        let table = run_external_layout(&mut self.graph, &self.overlay, self.layout);
        sink.accept_positions(table);
    }

    fn apply_positions(&mut self, table: &PositionTable) {
        for (id, _) in table.iter() {
            if !self.graph.contains_node(id) {
                StaleReferenceWarning::new(id, "position table").emit();
            }
        }
        self.overlay.apply_positions(table);
    }
}

/// Batch layout for backends without physics: starts from wherever nodes were last shown, runs to
/// convergence (or the tick budget), and records the result on the graph.
fn run_external_layout(graph: &mut Graph, overlay: &OverlayRenderer, config: LayoutConfig) -> PositionTable {
    let shown = graph
        .nodes()
        .iter()
        .filter_map(|node| Some((node.id.clone(), overlay.last_known(&node.id)?)))
        .collect::<Vec<(String, Vec2)>>();
    for (id, position) in shown {
        if let Err(error) = graph.set_position(&id, position) {
            log::debug!("skipping last-known position: {error}");
        }
    }

    let mut layout = ForceLayout::new(graph, config);
    let outcome = layout.run();
    layout.write_back(graph);
    log::debug!(
        "external layout: {} nodes after {} ticks (settled: {})",
        graph.node_count(),
        outcome.ticks,
        outcome.settled
    );
    layout.positions()
}
