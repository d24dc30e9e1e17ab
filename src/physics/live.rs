use super::{ForceLayout, StepReport};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopState {
    Running,
    Settled,
    Cancelled,
}

/// Frame-driven stepping: whatever frame clock the host has calls `on_frame` once per refresh.
///
/// Cancelling only stops future steps; a step is never interrupted halfway.
pub struct LiveLayout {
    layout: ForceLayout,
    state: LoopState,
}

impl LiveLayout {
    pub fn new(layout: ForceLayout) -> Self {
        let state = if layout.is_settled() {
            LoopState::Settled
        } else {
            LoopState::Running
        };
        Self { layout, state }
    }

    pub fn layout(&self) -> &ForceLayout {
        &self.layout
    }

    /// Mutations that move bodies should be followed by `wake`.
    pub fn layout_mut(&mut self) -> &mut ForceLayout {
        &mut self.layout
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn wants_frame(&self) -> bool {
        self.state == LoopState::Running
    }

    /// Advances by exactly one tick while running.
    pub fn on_frame(&mut self) -> Option<StepReport> {
        if self.state != LoopState::Running {
            return None;
        }

        let report = self.layout.step();
        if report.settled {
            log::debug!("live layout settled at tick {}", report.tick);
            self.state = LoopState::Settled;
        }
        Some(report)
    }

    pub fn cancel(&mut self) {
        if self.state != LoopState::Cancelled {
            log::debug!("live layout cancelled at tick {}", self.layout.tick_count());
        }
        self.state = LoopState::Cancelled;
    }

    pub fn resume(&mut self) {
        self.layout.wake();
        self.state = LoopState::Running;
    }

    /// Restarts a settled loop; a cancelled loop stays cancelled.
    pub fn wake(&mut self) {
        if self.state == LoopState::Settled {
            self.layout.wake();
            self.state = LoopState::Running;
        }
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::vec2;

    use super::*;
    use crate::config::LayoutConfig;
    use crate::model::{Graph, NodeAttrs};

    fn live_pair() -> LiveLayout {
        let mut graph = Graph::new();
        graph.add_node("a", NodeAttrs::default().at(vec2(-50.0, 0.0))).unwrap();
        graph.add_node("b", NodeAttrs::default().at(vec2(50.0, 0.0))).unwrap();
        LiveLayout::new(ForceLayout::new(&graph, LayoutConfig::default()))
    }

    #[test]
    fn one_step_per_frame_until_settled() {
        let mut live = live_pair();
        assert!(live.wants_frame());

        let mut frames = 0;
        while live.on_frame().is_some() {
            frames += 1;
            assert_eq!(live.layout().tick_count(), frames);
            assert!(frames < 1000);
        }
        assert_eq!(live.state(), LoopState::Settled);
        assert!(!live.wants_frame());
    }

    #[test]
    fn cancel_stops_scheduling_and_keeps_last_positions() {
        let mut live = live_pair();
        live.on_frame();
        live.on_frame();
        let snapshot = live.layout().positions();

        live.cancel();
        assert!(live.on_frame().is_none());
        assert_eq!(live.layout().positions(), snapshot);
        assert_eq!(live.layout().tick_count(), 2);

        live.wake();
        assert_eq!(live.state(), LoopState::Cancelled);
        live.resume();
        assert!(live.on_frame().is_some());
    }

    #[test]
    fn empty_layout_starts_settled() {
        let live = LiveLayout::new(ForceLayout::new(&Graph::new(), LayoutConfig::default()));
        assert_eq!(live.state(), LoopState::Settled);
    }
}
