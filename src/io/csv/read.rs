//! CSV reading operations.

use std::{fs::File, io::Cursor, path::Path};

use anyhow::{Context, Result};
use polars::{frame::DataFrame, io::SerReader, prelude::{CsvReadOptions, CsvReader}};

/// Options shared by every table read here: header row, and every column
/// kept as a string so ids like "0301" keep their leading zeros.
fn string_options() -> CsvReadOptions {
    CsvReadOptions::default()
        .with_has_header(true)
        .with_infer_schema_length(Some(0))
}

/// Reads a CSV file from `path` into a DataFrame of string columns.
pub(crate) fn read_csv_strings(path: &Path) -> Result<DataFrame> {
    let file = File::open(path)
        .with_context(|| format!("[io::csv::read] Failed to open CSV file: {}", path.display()))?;
    string_options()
        .into_reader_with_file_handle(file)
        .finish()
        .with_context(|| format!("[io::csv::read] Failed to read CSV from {:?}", path))
}

/// Reads a CSV string into a DataFrame of string columns.
pub(crate) fn read_csv_strings_from_str(csv: &str) -> Result<DataFrame> {
    CsvReader::new(Cursor::new(csv.as_bytes()))
        .with_options(string_options())
        .finish()
        .with_context(|| "[io::csv::read] Failed to read CSV from string")
}
