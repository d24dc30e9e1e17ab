mod adjacency;
mod graph;
mod positions;

pub use adjacency::{AdjacencyIndex, Incidence};
pub use graph::{EdgeAttrs, EdgeRecord, Graph, NodeAttrs, NodeRecord};
pub use positions::PositionTable;
