//! CSV writing operations.

use std::{collections::BTreeSet, fs::File, path::Path};

use anyhow::{Context, Result};
use polars::{frame::DataFrame, io::SerWriter, prelude::{Column, CsvWriter, NamedFrom}, series::Series};
use tracing::warn;

use crate::pipeline::{CellRecord, Classification};

/// Columns written ahead of the attribute columns, in order.
const FIXED_COLUMNS: [&str; 9] = [
    "id", "pop", "area_km2", "pop_local", "area_local", "density", "base_category", "category", "override_rule",
];

/// Write a DataFrame to a CSV file.
pub(crate) fn write_csv(df: &mut DataFrame, path: &Path) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("[io::csv::write] Failed to create CSV file: {}", path.display()))?;
    CsvWriter::new(file)
        .finish(df)
        .with_context(|| format!("[io::csv::write] Failed to write CSV to {:?}", path))
}

/// One row per classified cell. Metrics of degenerate cells and the rule
/// index of non-overridden cells are null. Attribute columns follow the fixed
/// columns, as the sorted union of attribute keys.
pub fn classification_to_dataframe(classification: &Classification) -> Result<DataFrame> {
    let records = classification.records();
    let column = |name: &str, f: fn(&CellRecord) -> Option<f64>| -> Column {
        Series::new(name.into(), records.iter().map(f).collect::<Vec<_>>()).into()
    };

    let mut columns = vec![
        Series::new("id".into(), records.iter().map(|r| r.id.as_str()).collect::<Vec<_>>()).into(),
        Series::new("pop".into(), records.iter().map(|r| r.pop).collect::<Vec<_>>()).into(),
        Series::new("area_km2".into(), records.iter().map(|r| r.area_km2).collect::<Vec<_>>()).into(),
        column("pop_local", CellRecord::pop_local),
        column("area_local", CellRecord::area_local),
        column("density", CellRecord::density),
        Series::new("base_category".into(), records.iter().map(|r| r.base_category.as_str()).collect::<Vec<_>>()).into(),
        Series::new("category".into(), records.iter().map(|r| r.category.as_str()).collect::<Vec<_>>()).into(),
        Series::new("override_rule".into(), records.iter().map(|r| r.override_rule.map(|i| i as u32)).collect::<Vec<_>>()).into(),
    ];

    let keys = records.iter()
        .flat_map(|r| r.attributes.keys())
        .map(String::as_str)
        .collect::<BTreeSet<_>>();
    for key in keys {
        if FIXED_COLUMNS.contains(&key) {
            warn!("[io::csv::write] attribute {key:?} shadows an output column; skipped");
            continue;
        }
        let values = records.iter()
            .map(|r| r.attributes.get(key).map(String::as_str))
            .collect::<Vec<_>>();
        columns.push(Series::new(key.into(), values).into());
    }

    DataFrame::new(columns).context("[io::csv::write] Failed to assemble classification table")
}

/// Write the classification table to a CSV file.
pub fn write_classification_csv(classification: &Classification, path: &Path) -> Result<()> {
    let mut df = classification_to_dataframe(classification)?;
    write_csv(&mut df, path)
}
