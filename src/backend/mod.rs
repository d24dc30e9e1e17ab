//! What the engine needs from a rendering backend, split into capabilities, plus two adapters.

mod external;
mod live;
mod pointer;

use eframe::egui::{Pos2, Rect, Vec2};

use crate::highlight::PointerEvent;
use crate::model::{Graph, PositionTable};
use crate::overlay::ViewTransform;

pub use external::ExternalLayoutBackend;
pub use live::LiveBackend;
pub use pointer::PointerTracker;

/// Screen pixels kept free around content when zooming to fit.
pub const FIT_PADDING: f32 = 40.0;

/// Registers or replaces the node and edge collections.
pub trait ElementSink {
    fn replace_elements(&mut self, graph: &Graph);
}

/// Positions the core can poll, together with the transform they are shown under.
pub trait PositionSource {
    /// Runs one scheduled step if the backend has one pending. Returns `true` when it stepped.
    fn advance(&mut self) -> bool {
        false
    }

    /// Whether another frame should be scheduled.
    fn wants_frame(&self) -> bool {
        false
    }

    /// Stops scheduling steps; the step in progress, if any, always completes.
    fn cancel(&mut self) {}

    fn resume(&mut self) {}

    /// The newest table, or `None` when nothing moved since the last poll.
    fn poll_positions(&mut self) -> Option<PositionTable>;

    fn transform(&self) -> ViewTransform;
}

/// Per-node pointer-enter/leave notifications.
pub trait PointerSource {
    fn drain_pointer_events(&mut self) -> Vec<PointerEvent>;
}

/// Accepts positions computed outside the backend.
pub trait PositionSink {
    fn accept_positions(&mut self, table: PositionTable);
}

/// The capability set every adapter provides. Adapters that take externally computed positions
/// also hand out their [`PositionSink`].
pub trait RenderBackend: ElementSink + PositionSource + PointerSource {
    fn position_sink(&mut self) -> Option<&mut dyn PositionSink> {
        None
    }
}

/// Host input an adapter accepts: viewport changes, pan/zoom, raw pointer motion and drags.
pub trait InteractiveBackend: RenderBackend {
    fn camera(&self) -> &Camera;

    fn set_viewport(&mut self, viewport: Rect);

    fn pan_by(&mut self, delta: Vec2);

    fn zoom_about(&mut self, pointer: Pos2, factor: f32);

    fn fit_view(&mut self);

    /// Raw pointer position; `None` once it leaves the surface.
    fn pointer_moved(&mut self, pointer: Option<Pos2>);

    /// For hosts that report enter/leave themselves.
    fn push_pointer_event(&mut self, event: PointerEvent);

    /// Grabs the topmost card under `pointer`. Returns the grabbed node id.
    fn begin_drag(&mut self, pointer: Pos2) -> Option<String>;

    fn drag_to(&mut self, pointer: Pos2);

    fn end_drag(&mut self);

    fn dragging(&self) -> Option<&str>;
}

/// Viewport rectangle plus the zoom/pan shown inside it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    viewport: Rect,
    transform: ViewTransform,
}

impl Camera {
    pub fn new(viewport: Rect) -> Self {
        Self {
            viewport,
            transform: ViewTransform::centered_in(viewport),
        }
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    /// Keeps pan and zoom; world origin follows the viewport center.
    pub fn set_viewport(&mut self, viewport: Rect) {
        self.viewport = viewport;
        self.transform.origin = viewport.center();
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.transform.pan_by(delta);
    }

    pub fn zoom_about(&mut self, pointer: Pos2, factor: f32) {
        self.transform.zoom_about(pointer, factor);
    }

    /// Fits every finite position in `table`; a no-op for an empty table.
    pub fn fit(&mut self, table: &PositionTable, margin: Vec2) {
        if let Some(bounds) = table.bounds() {
            self.transform = ViewTransform::fit(bounds, margin, self.viewport, FIT_PADDING);
            log::debug!("zoomed to fit: zoom {:.3}", self.transform.zoom);
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Grab {
    id: String,
    /// Node center minus the pointer's world position at grab time.
    offset: Vec2,
}
