use eframe::egui::{Pos2, Rect, Vec2};

/// Backend zoom/pan: `screen = origin + pan + world * zoom`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    /// Screen point that world `(0, 0)` maps to before panning, usually the viewport center.
    pub origin: Pos2,
    pub pan: Vec2,
    pub zoom: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            origin: Pos2::ZERO,
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl ViewTransform {
    pub const MIN_ZOOM: f32 = 0.05;
    pub const MAX_ZOOM: f32 = 6.0;

    pub fn centered_in(viewport: Rect) -> Self {
        Self {
            origin: viewport.center(),
            ..Self::default()
        }
    }

    pub fn world_to_screen(&self, world: Vec2) -> Pos2 {
        self.origin + self.pan + world * self.zoom
    }

    pub fn screen_to_world(&self, screen: Pos2) -> Vec2 {
        (screen - self.origin - self.pan) / self.zoom
    }

    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Zooms by `factor` while the world point under `pointer` stays put.
    pub fn zoom_about(&mut self, pointer: Pos2, factor: f32) {
        let anchor = self.screen_to_world(pointer);
        self.zoom = (self.zoom * factor).clamp(Self::MIN_ZOOM, Self::MAX_ZOOM);
        self.pan = pointer - self.origin - anchor * self.zoom;
    }

    /// Transform that fits `world_bounds` (grown by `margin` world units on every side)
    /// inside `viewport` with `padding` screen pixels to spare.
    pub fn fit(world_bounds: Rect, margin: Vec2, viewport: Rect, padding: f32) -> Self {
        let bounds = world_bounds.expand2(margin);
        let available = (viewport.size() - Vec2::splat(padding * 2.0)).max(Vec2::splat(1.0));
        let size = bounds.size().max(Vec2::splat(1.0));
        let zoom = (available.x / size.x)
            .min(available.y / size.y)
            .clamp(Self::MIN_ZOOM, Self::MAX_ZOOM);

        let origin = viewport.center();
        Self {
            origin,
            pan: -bounds.center().to_vec2() * zoom,
            zoom,
        }
    }
}
