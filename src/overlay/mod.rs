//! Keeps decoration-layer anchors locked to node positions owned by someone else.

mod transform;

use std::collections::HashMap;

use eframe::egui::{Pos2, Rect, Vec2};

use crate::config::OverlayConfig;
use crate::error::StaleReferenceWarning;
use crate::highlight::{Highlight, HoverState, compute_highlight};
use crate::model::{Graph, PositionTable};

pub use transform::ViewTransform;

/// Style record consumed by the decoration layer.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VisualStyle {
    /// In `[0, 1]`.
    pub opacity: f32,
    /// In pixels, never negative.
    pub blur_radius: f32,
}

impl VisualStyle {
    pub const FULL: Self = Self {
        opacity: 1.0,
        blur_radius: 0.0,
    };

    fn faded(opacity: f32, blur_radius: f32) -> Self {
        Self {
            opacity: opacity.clamp(0.0, 1.0),
            blur_radius: blur_radius.max(0.0),
        }
    }

    pub fn is_faded(&self) -> bool {
        *self != Self::FULL
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeOverlay {
    pub id: String,
    pub center: Pos2,
    /// Card rectangle; `anchor.min` is the top-left corner.
    pub anchor: Rect,
    pub style: VisualStyle,
    pub highlighted: bool,
    pub hovered: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeOverlay {
    pub id: String,
    pub source: String,
    pub target: String,
    pub from: Pos2,
    pub to: Pos2,
    pub midpoint: Pos2,
    /// Present when the edge carries a label.
    pub label_anchor: Option<Rect>,
    pub style: VisualStyle,
    pub highlighted: bool,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct OverlayFrame {
    pub nodes: Vec<NodeOverlay>,
    pub edges: Vec<EdgeOverlay>,
}

impl OverlayFrame {
    pub fn node(&self, id: &str) -> Option<&NodeOverlay> {
        self.nodes.iter().find(|node| node.id == id)
    }

    pub fn edge(&self, id: &str) -> Option<&EdgeOverlay> {
        self.edges.iter().find(|edge| edge.id == id)
    }

    /// Topmost card under `point`; later cards are drawn above earlier ones.
    pub fn node_at(&self, point: Pos2) -> Option<&NodeOverlay> {
        self.nodes.iter().rev().find(|node| node.anchor.contains(point))
    }
}

/// Reconciles last-known positions, the view transform and the hover state into an
/// [`OverlayFrame`]. Owns nothing but its own derived state.
pub struct OverlayRenderer {
    config: OverlayConfig,
    transform: ViewTransform,
    last_known: HashMap<String, Vec2>,
    last_revision: Option<u64>,
    frame: OverlayFrame,
}

impl OverlayRenderer {
    pub fn new(config: OverlayConfig) -> Self {
        Self {
            config,
            transform: ViewTransform::default(),
            last_known: HashMap::new(),
            last_revision: None,
            frame: OverlayFrame::default(),
        }
    }

    pub fn config(&self) -> &OverlayConfig {
        &self.config
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn set_transform(&mut self, transform: ViewTransform) {
        self.transform = transform;
    }

    pub fn frame(&self) -> &OverlayFrame {
        &self.frame
    }

    pub fn last_known(&self, id: &str) -> Option<Vec2> {
        self.last_known.get(id).copied()
    }

    /// Merges a position table into the last-known positions. Tables older than the newest
    /// one already applied are dropped; ids absent from the table keep their old position.
    pub fn apply_positions(&mut self, table: &PositionTable) -> bool {
        if self
            .last_revision
            .is_some_and(|revision| table.revision() < revision)
        {
            log::warn!(
                "ignoring out-of-order position table (revision {} < {})",
                table.revision(),
                self.last_revision.unwrap_or_default()
            );
            return false;
        }

        self.last_revision = Some(table.revision());
        for (id, position) in table.iter() {
            if position.x.is_finite() && position.y.is_finite() {
                self.last_known.insert(id.to_owned(), position);
            }
        }
        true
    }

    /// Rebuilds the frame from current state. Calling it twice with unchanged inputs yields
    /// the same frame.
    pub fn reconcile(&mut self, graph: &Graph, hover: &HoverState) -> &OverlayFrame {
        self.last_known.retain(|id, _| graph.contains_node(id));

        let highlight = match compute_highlight(hover.hovered(), graph.adjacency()) {
            Ok(highlight) => highlight,
            Err(_) => {
                StaleReferenceWarning::new(hover.hovered().unwrap_or_default(), "overlay hover")
                    .emit();
                Highlight::default()
            }
        };
        let active = !highlight.is_empty();

        let card_size = self.config.card_size_at(self.transform.zoom);
        let label_size = self.config.label_size();

        let mut nodes = Vec::with_capacity(graph.node_count());
        let mut centers = HashMap::with_capacity(graph.node_count());
        for node in graph.nodes() {
            let Some(world) = self.last_known.get(&node.id).copied() else {
                continue;
            };
            let center = self.transform.world_to_screen(world);
            let highlighted = highlight.contains_node(&node.id);
            centers.insert(node.id.as_str(), center);
            nodes.push(NodeOverlay {
                id: node.id.clone(),
                center,
                anchor: Rect::from_center_size(center, card_size),
                style: if active && !highlighted {
                    VisualStyle::faded(self.config.faded_node_opacity, self.config.faded_node_blur)
                } else {
                    VisualStyle::FULL
                },
                highlighted,
                hovered: hover.hovered() == Some(node.id.as_str()),
            });
        }

        let mut edges = Vec::with_capacity(graph.edge_count());
        for edge in graph.edges() {
            let (Some(&from), Some(&to)) = (
                centers.get(edge.source.as_str()),
                centers.get(edge.target.as_str()),
            ) else {
                continue;
            };
            let midpoint = from.lerp(to, 0.5);
            let highlighted = highlight.contains_edge(&edge.id);
            let has_label = edge.label.is_some() || edge.reverse_label.is_some();
            edges.push(EdgeOverlay {
                id: edge.id.clone(),
                source: edge.source.clone(),
                target: edge.target.clone(),
                from,
                to,
                midpoint,
                label_anchor: has_label.then(|| Rect::from_center_size(midpoint, label_size)),
                style: if active && !highlighted {
                    VisualStyle::faded(self.config.faded_edge_opacity, self.config.faded_edge_blur)
                } else {
                    VisualStyle::FULL
                },
                highlighted,
            });
        }

        self.frame = OverlayFrame { nodes, edges };
        &self.frame
    }
}
