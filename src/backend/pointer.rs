use eframe::egui::{Pos2, Rect, Vec2};

use crate::config::OverlayConfig;
use crate::highlight::PointerEvent;
use crate::model::Graph;
use crate::overlay::ViewTransform;

/// Turns raw pointer positions into per-node enter/leave events by hit testing card rectangles.
///
/// Cards later in graph order are drawn on top, so they win overlapping hits.
#[derive(Clone, Debug)]
pub struct PointerTracker {
    overlay: OverlayConfig,
    order: Vec<String>,
    inside: Option<String>,
    pending: Vec<PointerEvent>,
}

impl PointerTracker {
    pub fn new(overlay: OverlayConfig) -> Self {
        Self {
            overlay,
            order: Vec::new(),
            inside: None,
            pending: Vec::new(),
        }
    }

    pub fn inside(&self) -> Option<&str> {
        self.inside.as_deref()
    }

    pub fn set_order(&mut self, graph: &Graph) {
        self.order = graph.nodes().iter().map(|node| node.id.clone()).collect();
        if self
            .inside
            .as_deref()
            .is_some_and(|id| !graph.contains_node(id))
        {
            self.inside = None;
        }
    }

    /// Queues an event reported directly by the host, e.g. from its own per-node callbacks.
    pub fn push(&mut self, event: PointerEvent) {
        self.pending.push(event);
    }

    pub fn hit<'a>(
        &'a self,
        point: Pos2,
        transform: &ViewTransform,
        position: impl Fn(&str) -> Option<Vec2>,
    ) -> Option<&'a str> {
        let size = self.overlay.card_size_at(transform.zoom);
        self.order
            .iter()
            .rev()
            .find(|id| {
                position(id.as_str()).is_some_and(|world| {
                    Rect::from_center_size(transform.world_to_screen(world), size).contains(point)
                })
            })
            .map(String::as_str)
    }

    /// `None` means the pointer left the surface.
    pub fn moved(
        &mut self,
        pointer: Option<Pos2>,
        transform: &ViewTransform,
        position: impl Fn(&str) -> Option<Vec2>,
    ) {
        let hit = pointer
            .and_then(|point| self.hit(point, transform, position))
            .map(str::to_owned);
        if hit == self.inside {
            return;
        }

        if let Some(previous) = self.inside.take() {
            self.pending.push(PointerEvent::Leave(previous));
        }
        if let Some(current) = &hit {
            self.pending.push(PointerEvent::Enter(current.clone()));
        }
        self.inside = hit;
    }

    pub fn drain(&mut self) -> Vec<PointerEvent> {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use eframe::egui::{pos2, vec2};

    use super::*;
    use crate::model::NodeAttrs;

    fn tracker() -> (PointerTracker, HashMap<&'static str, Vec2>) {
        let mut graph = Graph::new();
        graph.add_node("a", NodeAttrs::default()).unwrap();
        graph.add_node("b", NodeAttrs::default()).unwrap();
        let mut tracker = PointerTracker::new(OverlayConfig::default());
        tracker.set_order(&graph);
        let positions = HashMap::from([("a", vec2(0.0, 0.0)), ("b", vec2(150.0, 0.0))]);
        (tracker, positions)
    }

    #[test]
    fn moving_between_cards_emits_leave_then_enter() {
        let (mut tracker, positions) = tracker();
        let transform = ViewTransform::default();
        let lookup = |id: &str| positions.get(id).copied();

        tracker.moved(Some(pos2(-80.0, 0.0)), &transform, lookup);
        tracker.moved(Some(pos2(-70.0, 0.0)), &transform, lookup);
        tracker.moved(Some(pos2(200.0, 0.0)), &transform, lookup);
        tracker.moved(None, &transform, lookup);

        assert_eq!(
            tracker.drain(),
            vec![
                PointerEvent::Enter("a".into()),
                PointerEvent::Leave("a".into()),
                PointerEvent::Enter("b".into()),
                PointerEvent::Leave("b".into()),
            ]
        );
        assert!(tracker.drain().is_empty());
    }

    #[test]
    fn overlapping_cards_resolve_to_the_topmost() {
        let (tracker, positions) = tracker();
        let hit = tracker.hit(pos2(75.0, 0.0), &ViewTransform::default(), |id| {
            positions.get(id).copied()
        });
        assert_eq!(hit, Some("b"));
    }
}
