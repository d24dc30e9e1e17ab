use std::fmt;

use thiserror::Error;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementKind {
    Node,
    Edge,
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Node => "node",
            Self::Edge => "edge",
        })
    }
}

/// Topology contract violations. Always surfaced to the caller.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("duplicate {kind} id: {id}")]
    DuplicateId { kind: ElementKind, id: String },
    #[error("unknown node: {0}")]
    UnknownNode(String),
    #[error("unknown edge: {0}")]
    UnknownEdge(String),
}

/// A hover or position event that names a node the graph no longer has.
///
/// Never fatal: the event is logged and dropped, and rendering continues from the last good state.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("stale reference to node `{id}` in {context}")]
pub struct StaleReferenceWarning {
    pub id: String,
    pub context: &'static str,
}

impl StaleReferenceWarning {
    pub fn new(id: impl Into<String>, context: &'static str) -> Self {
        Self {
            id: id.into(),
            context,
        }
    }

    pub fn emit(&self) {
        log::warn!("{self}");
    }
}
