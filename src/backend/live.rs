use eframe::egui::{Pos2, Rect, Vec2};

use crate::config::{LayoutConfig, OverlayConfig};
use crate::highlight::PointerEvent;
use crate::model::{Graph, PositionTable};
use crate::overlay::ViewTransform;
use crate::physics::{ForceLayout, LiveLayout, LoopState};

use super::{
    Camera, ElementSink, Grab, InteractiveBackend, PointerSource, PointerTracker, PositionSource,
    RenderBackend,
};

/// A backend that runs its own force simulation, one step per frame, and lets the core poll it.
pub struct LiveBackend {
    live: LiveLayout,
    camera: Camera,
    pointer: PointerTracker,
    card_size: Vec2,
    grab: Option<Grab>,
    last_polled: Option<u64>,
    fitted: bool,
}

impl LiveBackend {
    pub fn new(layout: LayoutConfig, overlay: OverlayConfig, viewport: Rect) -> Self {
        Self {
            live: LiveLayout::new(ForceLayout::new(&Graph::new(), layout)),
            camera: Camera::new(viewport),
            pointer: PointerTracker::new(overlay),
            card_size: overlay.card_size(),
            grab: None,
            last_polled: None,
            fitted: false,
        }
    }

    pub fn layout(&self) -> &ForceLayout {
        self.live.layout()
    }

    pub fn loop_state(&self) -> LoopState {
        self.live.state()
    }
}

impl InteractiveBackend for LiveBackend {
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
        self.camera
            .fit(&self.live.layout().positions(), self.card_size * 0.5);
    }

    fn pointer_moved(&mut self, pointer: Option<Pos2>) {
        let Self {
            live,
            camera,
            pointer: tracker,
            ..
        } = self;
        tracker.moved(pointer, &camera.transform(), |id| live.layout().position(id));
    }

    fn push_pointer_event(&mut self, event: PointerEvent) {
        self.pointer.push(event);
    }

    /// Pins the grabbed node; the simulation keeps running around it.
    fn begin_drag(&mut self, pointer: Pos2) -> Option<String> {
        let transform = self.camera.transform();
        let layout = self.live.layout();
        let id = self
            .pointer
            .hit(pointer, &transform, |id| layout.position(id))?
            .to_owned();
        let center = layout.position(&id)?;

        let offset = center - transform.screen_to_world(pointer);
        self.live.layout_mut().pin(&id, center);
        self.live.wake();
        self.grab = Some(Grab {
            id: id.clone(),
            offset,
        });
        Some(id)
    }

    fn drag_to(&mut self, pointer: Pos2) {
        let Some(grab) = &self.grab else {
            return;
        };
        let world = self.camera.transform().screen_to_world(pointer) + grab.offset;
        if self.live.layout_mut().pin(&grab.id, world) {
            self.live.wake();
        } else {
            self.grab = None;
        }
    }

    fn end_drag(&mut self) {
        if let Some(grab) = self.grab.take() {
            self.live.layout_mut().release(&grab.id);
            self.live.wake();
        }
    }

    fn dragging(&self) -> Option<&str> {
        self.grab.as_ref().map(|grab| grab.id.as_str())
    }
}

impl ElementSink for LiveBackend {
    fn replace_elements(&mut self, graph: &Graph) {
        self.live.layout_mut().sync_topology(graph);
        self.live.wake();
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

impl PositionSource for LiveBackend {
    fn advance(&mut self) -> bool {
        let Some(report) = self.live.on_frame() else {
            return false;
        };
        if report.settled && !self.fitted {
            self.fit_view();
            self.fitted = true;
        }
        true
    }

    fn wants_frame(&self) -> bool {
        self.live.wants_frame()
    }

    fn cancel(&mut self) {
        self.live.cancel();
    }

    fn resume(&mut self) {
        self.live.resume();
    }

    fn poll_positions(&mut self) -> Option<PositionTable> {
        let revision = self.live.layout().revision();
        if self.last_polled == Some(revision) {
            return None;
        }
        self.last_polled = Some(revision);
        Some(self.live.layout().positions())
    }

    fn transform(&self) -> ViewTransform {
        self.camera.transform()
    }
}

impl PointerSource for LiveBackend {
    fn drain_pointer_events(&mut self) -> Vec<PointerEvent> {
        self.pointer.drain()
    }
}

impl RenderBackend for LiveBackend {}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;
    use crate::model::NodeAttrs;

    fn backend() -> LiveBackend {
        let mut graph = Graph::new();
        graph.add_node("a", NodeAttrs::default().at(vec2(-200.0, 0.0))).unwrap();
        graph.add_node("b", NodeAttrs::default().at(vec2(200.0, 0.0))).unwrap();
        let mut backend = LiveBackend::new(
            LayoutConfig::default(),
            OverlayConfig::default(),
            Rect::from_min_size(Pos2::ZERO, vec2(800.0, 600.0)),
        );
        backend.replace_elements(&graph);
        backend
    }

    #[test]
    fn polls_only_report_new_revisions() {
        let mut backend = backend();
        assert!(backend.poll_positions().is_some());
        assert!(backend.poll_positions().is_none());
        assert!(backend.advance());
        assert!(backend.poll_positions().is_some());
    }

    #[test]
    fn drag_pins_the_grabbed_node_under_the_pointer() {
        let mut backend = backend();
        let grab_point = backend.transform().world_to_screen(vec2(-200.0, 0.0)) + vec2(10.0, 0.0);
        assert_eq!(backend.begin_drag(grab_point).as_deref(), Some("a"));

        backend.drag_to(grab_point + vec2(0.0, 50.0));
        for _ in 0..5 {
            backend.advance();
        }
        assert_eq!(backend.layout().position("a"), Some(vec2(-200.0, 50.0)));

        backend.end_drag();
        assert!(backend.dragging().is_none());
        assert!(!backend.layout().bodies().iter().any(|body| body.pinned));
    }

    #[test]
    fn settling_zooms_to_fit_once() {
        let mut backend = backend();
        let initial = backend.transform();
        let mut frames = 0;
        while backend.wants_frame() && frames < 1000 {
            backend.advance();
            frames += 1;
        }
        assert_eq!(backend.loop_state(), LoopState::Settled);
        assert_ne!(backend.transform(), initial);

        let viewport = backend.camera().viewport();
        for body in backend.layout().bodies() {
            assert!(viewport.contains(backend.transform().world_to_screen(body.position)));
        }
    }

    #[test]
    fn pointer_motion_becomes_enter_and_leave() {
        let mut backend = backend();
        let over_b = backend.transform().world_to_screen(vec2(200.0, 0.0));
        backend.pointer_moved(Some(over_b));
        backend.pointer_moved(Some(pos2(400.0, 590.0)));
        assert_eq!(
            backend.drain_pointer_events(),
            vec![PointerEvent::Enter("b".into()), PointerEvent::Leave("b".into())]
        );
    }
}
