//! Hover highlighting and position sync for force-directed node-link graphs.
//!
//! The [`engine::SyncEngine`] keeps a [`model::Graph`], feeds it to a rendering backend, and turns
//! the positions and pointer events it gets back into [`overlay::OverlayFrame`]s that a separate
//! decoration layer can draw.

pub mod backend;
pub mod config;
pub mod engine;
pub mod error;
pub mod highlight;
pub mod model;
pub mod overlay;
pub mod physics;
pub mod surface;
mod util;

pub use config::{EngineConfig, LayoutConfig, OverlayConfig};
pub use engine::SyncEngine;
pub use error::{GraphError, StaleReferenceWarning};
