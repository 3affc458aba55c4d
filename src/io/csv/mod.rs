//! CSV format reading and writing operations.

mod read;
mod write;

pub(crate) use read::*;
pub use write::{classification_to_dataframe, write_classification_csv};
