mod adjacency;
mod grid;

pub use adjacency::{Adjacency, AdjacencyBuilder, AdjacencyMode, AdjacencyStrategy};
