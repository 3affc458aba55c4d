use std::{collections::BTreeMap, path::Path};

use ahash::AHashMap;
use anyhow::{ensure, Context, Result};
use polars::frame::DataFrame;
use tracing::{debug, info};

use crate::{cells::Cell, io::csv::{read_csv_strings, read_csv_strings_from_str}};

/// Attribute table keyed by cell id, joined onto cells before classification
/// (e.g. region codes and names that override rules match on).
#[derive(Debug, Clone, Default)]
pub struct Crosswalk {
    rows: AHashMap<String, BTreeMap<String, String>>,
}

impl Crosswalk {
    /// Read a crosswalk CSV. `key` names the cell-id column.
    pub fn read(path: &Path, key: &str) -> Result<Self> {
        let df = read_csv_strings(path)?;
        Self::from_dataframe(&df, key)
            .with_context(|| format!("[io::crosswalk] Invalid crosswalk table: {}", path.display()))
    }

    /// Parse a crosswalk from CSV text.
    pub fn parse(csv: &str, key: &str) -> Result<Self> {
        Self::from_dataframe(&read_csv_strings_from_str(csv)?, key)
    }

    fn from_dataframe(df: &DataFrame, key: &str) -> Result<Self> {
        let ids = df.column(key)
            .with_context(|| format!("[io::crosswalk] Key column {key:?} not found"))?
            .str()?;
        let columns = df.get_columns().iter()
            .filter(|column| column.name().as_str() != key)
            .map(|column| Ok((column.name().to_string(), column.str()?)))
            .collect::<Result<Vec<_>>>()?;

        let mut rows = AHashMap::with_capacity(df.height());
        for (i, id) in ids.into_iter().enumerate() {
            let Some(id) = id else { continue };
            let values = columns.iter()
                .filter_map(|(name, values)| values.get(i).map(|value| (name.clone(), value.to_string())))
                .collect();
            ensure!(rows.insert(id.to_string(), values).is_none(), "[io::crosswalk] Duplicate key {id:?}");
        }

        debug!("[io::crosswalk] {} rows, {} attribute columns", rows.len(), columns.len());
        Ok(Self { rows })
    }

    #[inline] pub fn len(&self) -> usize { self.rows.len() }

    #[inline] pub fn is_empty(&self) -> bool { self.rows.is_empty() }

    /// Attributes for one cell id.
    pub fn get(&self, id: &str) -> Option<&BTreeMap<String, String>> { self.rows.get(id) }

    /// Merge each cell's row into its attributes, overwriting existing keys.
    /// Rows for unknown ids are ignored. Returns the number of cells joined.
    pub fn apply(&self, cells: &mut [Cell]) -> usize {
        let mut joined = 0;
        for cell in cells.iter_mut() {
            let Some(row) = self.rows.get(cell.id.as_str()) else { continue };
            cell.attributes.extend(row.iter().map(|(k, v)| (k.clone(), v.clone())));
            joined += 1;
        }
        if joined < cells.len() {
            info!("[io::crosswalk] {} of {} cells have no crosswalk row", cells.len() - joined, cells.len());
        }
        joined
    }
}

#[cfg(test)]
mod tests {
    use geo::MultiPolygon;

    use super::*;

    fn cell(id: &str) -> Cell {
        Cell::new(id, 1.0, 1.0, MultiPolygon::new(vec![])).with_attribute("region", "old")
    }

    #[test]
    fn joins_by_key_and_overwrites() {
        let crosswalk = Crosswalk::parse("cell,region,name\na,0301,Oslo\nzz,1,Nowhere\n", "cell").unwrap();
        let mut cells = vec![cell("a"), cell("b")];

        assert_eq!(crosswalk.len(), 2);
        assert_eq!(crosswalk.apply(&mut cells), 1);
        assert_eq!(cells[0].attribute("region"), Some("0301"));
        assert_eq!(cells[0].attribute("name"), Some("Oslo"));
        assert_eq!(cells[1].attribute("region"), Some("old"));
        assert_eq!(cells[1].attribute("name"), None);
    }

    #[test]
    fn missing_key_column_is_an_error() {
        assert!(Crosswalk::parse("id,region\na,1\n", "cell").is_err());
    }

    #[test]
    fn duplicate_keys_are_an_error() {
        assert!(Crosswalk::parse("id,region\na,1\na,2\n", "id").is_err());
    }
}
