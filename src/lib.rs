#![doc = "Densitas public API"]
mod cells;
mod classify;
mod common;
mod config;
mod density;
mod error;
mod geom;
mod graph;
mod overrides;
mod pipeline;

pub mod cli;
pub mod commands;
pub mod io;

#[doc(inline)]
pub use cells::{Cell, CellId};

#[doc(inline)]
pub use classify::{classify, round_half_up, Category, Thresholds, Tier};

#[doc(inline)]
pub use config::{Config, FieldNames};

#[doc(inline)]
pub use density::{aggregate, LocalMetrics};

#[doc(inline)]
pub use error::{Error, Result};

#[doc(inline)]
pub use geom::{Adjacency, AdjacencyBuilder, AdjacencyMode, AdjacencyStrategy, GeometryIssue};

#[doc(inline)]
pub use graph::{normalize, NeighborGraph, SpatialWeights};

#[doc(inline)]
pub use overrides::{apply_overrides, Applied, AttributeMatch, OverrideEngine, OverrideRule};

#[doc(inline)]
pub use pipeline::{CategoryTotals, CellRecord, Classification, Diagnostics, Pipeline};
