mod graph;
mod weights;

pub use graph::NeighborGraph;
pub use weights::{normalize, SpatialWeights};
