use eframe::egui::{Pos2, Rect, Vec2};

use crate::config::OverlayConfig;
use crate::highlight::PointerEvent;
use crate::model::{Graph, PositionTable};
use crate::overlay::ViewTransform;

use super::{
    Camera, ElementSink, Grab, InteractiveBackend, PointerSource, PointerTracker, PositionSink,
    PositionSource, RenderBackend,
};

/// A backend without physics of its own: it shows whatever positions it is handed and keeps
/// them frozen until a drag or the next hand-off.
pub struct ExternalLayoutBackend {
    table: PositionTable,
    revision: u64,
    changed: bool,
    camera: Camera,
    pointer: PointerTracker,
    card_size: Vec2,
    grab: Option<Grab>,
    fit_on_accept: bool,
}

impl ExternalLayoutBackend {
    pub fn new(overlay: OverlayConfig, viewport: Rect) -> Self {
        Self {
            table: PositionTable::default(),
            revision: 0,
            changed: false,
            camera: Camera::new(viewport),
            pointer: PointerTracker::new(overlay),
            card_size: overlay.card_size(),
            grab: None,
            fit_on_accept: true,
        }
    }

    pub fn positions(&self) -> &PositionTable {
        &self.table
    }

    fn bump(&mut self) {
        self.revision += 1;
        self.table.set_revision(self.revision);
        self.changed = true;
    }
}

impl InteractiveBackend for ExternalLayoutBackend {
    fn camera(&self) -> &Camera {
        &self.camera
    }

    fn set_viewport(&mut self, viewport: Rect) {
        self.camera.set_viewport(viewport);
    }

    fn pan_by(&mut self, delta: Vec2) {
        self.camera.pan_by(delta);
    }

    fn zoom_about(&mut self, pointer: Pos2, factor: f32) {
        self.camera.zoom_about(pointer, factor);
    }

    fn fit_view(&mut self) {
        self.camera.fit(&self.table, self.card_size * 0.5);
    }

    fn pointer_moved(&mut self, pointer: Option<Pos2>) {
        let Self {
            table,
            camera,
            pointer: tracker,
            ..
        } = self;
        tracker.moved(pointer, &camera.transform(), |id| table.get(id));
    }

    fn push_pointer_event(&mut self, event: PointerEvent) {
        self.pointer.push(event);
    }

    fn begin_drag(&mut self, pointer: Pos2) -> Option<String> {
        let transform = self.camera.transform();
        let id = self
            .pointer
            .hit(pointer, &transform, |id| self.table.get(id))?
            .to_owned();
        let center = self.table.get(&id)?;
        self.grab = Some(Grab {
            id: id.clone(),
            offset: center - transform.screen_to_world(pointer),
        });
        Some(id)
    }

    /// Writes the dragged node's position directly.
    fn drag_to(&mut self, pointer: Pos2) {
        let Some(grab) = &self.grab else {
            return;
        };
        let world = self.camera.transform().screen_to_world(pointer) + grab.offset;
        self.table.insert(grab.id.clone(), world);
        self.bump();
    }

    fn end_drag(&mut self) {
        self.grab = None;
    }

    fn dragging(&self) -> Option<&str> {
        self.grab.as_ref().map(|grab| grab.id.as_str())
    }
}

impl ElementSink for ExternalLayoutBackend {
    fn replace_elements(&mut self, graph: &Graph) {
        let stale = self
            .table
            .iter()
            .filter(|(id, _)| !graph.contains_node(id))
            .map(|(id, _)| id.to_owned())
            .collect::<Vec<_>>();
        for id in &stale {
            self.table.remove(id);
        }
        if !stale.is_empty() {
            self.bump();
        }

        self.pointer.set_order(graph);
        if self
            .grab
            .as_ref()
            .is_some_and(|grab| !graph.contains_node(&grab.id))
        {
            self.grab = None;
        }
    }
}

impl PositionSink for ExternalLayoutBackend {
    /// Tables are re-stamped on arrival, so a fresh layout run never looks older than a drag.
    fn accept_positions(&mut self, table: PositionTable) {
        self.table = table;
        self.bump();
        if self.fit_on_accept {
            self.fit_view();
            self.fit_on_accept = false;
        }
    }
}

impl PositionSource for ExternalLayoutBackend {
    fn poll_positions(&mut self) -> Option<PositionTable> {
        if !self.changed {
            return None;
        }
        self.changed = false;
        Some(self.table.clone())
    }

    fn transform(&self) -> ViewTransform {
        self.camera.transform()
    }
}

impl PointerSource for ExternalLayoutBackend {
    fn drain_pointer_events(&mut self) -> Vec<PointerEvent> {
        self.pointer.drain()
    }
}

impl RenderBackend for ExternalLayoutBackend {
    fn position_sink(&mut self) -> Option<&mut dyn PositionSink> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;

    fn viewport() -> Rect {
        Rect::from_min_size(Pos2::ZERO, vec2(800.0, 600.0))
    }

    #[test]
    fn accepted_tables_are_restamped_and_frozen() {
        let mut backend = ExternalLayoutBackend::new(OverlayConfig::default(), viewport());
        backend.accept_positions(PositionTable::new(40).with("a", vec2(1.0, 2.0)));
        backend.accept_positions(PositionTable::new(3).with("a", vec2(5.0, 6.0)));

        let table = backend.poll_positions().unwrap();
        assert_eq!(table.revision(), 2);
        assert_eq!(table.get("a"), Some(vec2(5.0, 6.0)));
        assert!(backend.poll_positions().is_none());
        assert!(!backend.advance());
    }

    #[test]
    fn drag_writes_positions_directly() {
        let mut backend = ExternalLayoutBackend::new(OverlayConfig::default(), viewport());
        let mut graph = Graph::new();
        graph.add_node("a", Default::default()).unwrap();
        backend.replace_elements(&graph);
        backend.accept_positions(PositionTable::new(1).with("a", vec2(0.0, 0.0)));
        backend.poll_positions();

        let start = backend.transform().world_to_screen(Vec2::ZERO);
        assert_eq!(backend.begin_drag(start).as_deref(), Some("a"));
        backend.drag_to(start + vec2(30.0, 0.0));
        backend.end_drag();

        let moved = backend.poll_positions().unwrap().get("a").unwrap();
        let zoom = backend.transform().zoom;
        assert!((moved - vec2(30.0 / zoom, 0.0)).length() < 1e-3);
    }

    #[test]
    fn removed_nodes_leave_the_table() {
        let mut backend = ExternalLayoutBackend::new(OverlayConfig::default(), viewport());
        backend.accept_positions(
            PositionTable::new(1)
                .with("a", Vec2::ZERO)
                .with("b", vec2(10.0, 0.0)),
        );
        let mut graph = Graph::new();
        graph.add_node("a", Default::default()).unwrap();
        backend.replace_elements(&graph);

        assert!(backend.positions().contains("a"));
        assert!(!backend.positions().contains("b"));
    }
}
