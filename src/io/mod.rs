//! Reading cells and writing classification results.
//!
//! # Formats
//!
//! - `geojson` - cell loader and labeled FeatureCollection export
//! - `csv` - tabular export and crosswalk tables (via polars)
//! - `crosswalk` - attribute join keyed by cell id

mod crosswalk;
mod csv;
mod geojson;

pub use crosswalk::Crosswalk;
pub use csv::{classification_to_dataframe, write_classification_csv};
pub use geojson::{classification_to_geojson, parse_cells, read_cells, write_classification_geojson};
