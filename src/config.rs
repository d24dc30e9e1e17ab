use eframe::egui::{Vec2, vec2};
use serde::Deserialize;

/// Force simulation parameters. Units are world pixels and ticks.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct LayoutConfig {
    pub max_ticks: usize,
    pub settle_speed: f32,
    pub damping: f32,
    pub max_speed: f32,
    pub repulsion_strength: f32,
    pub repulsion_softening: f32,
    pub barnes_hut_theta: f32,
    pub center: [f32; 2],
    /// Zero lets disconnected components drift apart without bound.
    pub center_strength: f32,
    pub center_falloff: f32,
    pub link_distance: f32,
    pub link_stiffness: f32,
    pub link_damping: f32,
    pub collision_radius: f32,
    pub collision_strength: f32,
    pub initial_spacing: f32,
    pub seed: u64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            max_ticks: 300,
            settle_speed: 0.02,
            damping: 0.6,
            max_speed: 40.0,
            repulsion_strength: 3000.0,
            repulsion_softening: 100.0,
            barnes_hut_theta: 0.72,
            center: [0.0, 0.0],
            center_strength: 0.05,
            center_falloff: 800.0,
            link_distance: 260.0,
            link_stiffness: 0.1,
            link_damping: 0.1,
            collision_radius: 110.0,
            collision_strength: 0.7,
            initial_spacing: 140.0,
            seed: 0,
        }
    }
}

impl LayoutConfig {
    /// Copy with every parameter pulled into its usable range.
    pub fn sanitized(self) -> Self {
        Self {
            max_ticks: self.max_ticks.max(1),
            settle_speed: self.settle_speed.max(0.0),
            damping: self.damping.clamp(0.01, 0.99),
            max_speed: self.max_speed.max(0.1),
            repulsion_strength: self.repulsion_strength.max(0.0),
            repulsion_softening: self.repulsion_softening.max(0.0001),
            barnes_hut_theta: self.barnes_hut_theta.clamp(0.0, 2.0),
            center_strength: self.center_strength.max(0.0),
            center_falloff: self.center_falloff.max(1.0),
            link_distance: self.link_distance.max(0.0),
            link_stiffness: self.link_stiffness.clamp(0.0, 1.0),
            link_damping: self.link_damping.clamp(0.0, 1.0),
            collision_radius: self.collision_radius.max(0.0),
            collision_strength: self.collision_strength.clamp(0.0, 1.0),
            initial_spacing: self.initial_spacing.max(1.0),
            ..self
        }
    }

    pub fn center(&self) -> Vec2 {
        vec2(self.center[0], self.center[1])
    }
}

/// How overlay cards and labels are sized and faded.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct OverlayConfig {
    pub card_size: [f32; 2],
    pub label_size: [f32; 2],
    pub scale_with_zoom: bool,
    pub faded_node_opacity: f32,
    pub faded_node_blur: f32,
    pub faded_edge_opacity: f32,
    pub faded_edge_blur: f32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            card_size: [200.0, 120.0],
            label_size: [100.0, 20.0],
            scale_with_zoom: false,
            faded_node_opacity: 0.3,
            faded_node_blur: 2.0,
            faded_edge_opacity: 0.2,
            faded_edge_blur: 1.5,
        }
    }
}

impl OverlayConfig {
    pub fn card_size(&self) -> Vec2 {
        vec2(self.card_size[0].max(0.0), self.card_size[1].max(0.0))
    }

    /// On-screen card size at the given zoom.
    pub fn card_size_at(&self, zoom: f32) -> Vec2 {
        if self.scale_with_zoom {
            self.card_size() * zoom
        } else {
            self.card_size()
        }
    }

    pub fn label_size(&self) -> Vec2 {
        vec2(self.label_size[0].max(0.0), self.label_size[1].max(0.0))
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct EngineConfig {
    pub layout: LayoutConfig,
    pub overlay: OverlayConfig,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_json_keeps_defaults() {
        let config: EngineConfig =
            serde_json::from_str(r#"{ "layout": { "damping": 0.8 }, "overlay": { "scale_with_zoom": true } }"#)
                .unwrap();
        assert_eq!(config.layout.damping, 0.8);
        assert_eq!(config.layout.max_ticks, LayoutConfig::default().max_ticks);
        assert!(config.overlay.scale_with_zoom);
        assert_eq!(config.overlay.card_size, [200.0, 120.0]);
    }

    #[test]
    fn sanitized_keeps_damping_below_one() {
        let config = LayoutConfig {
            damping: 1.4,
            max_ticks: 0,
            ..LayoutConfig::default()
        }
        .sanitized();
        assert!(config.damping < 1.0);
        assert_eq!(config.max_ticks, 1);
    }
}
