use std::{fs, path::Path};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::{
    classify::{Thresholds, Tier},
    geom::{AdjacencyMode, AdjacencyStrategy},
    overrides::OverrideRule,
    pipeline::Pipeline,
};

/// Property names the GeoJSON loader reads id, population and area from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FieldNames {
    pub id: String,
    pub population: String,
    pub area: String,
}

impl Default for FieldNames {
    fn default() -> Self {
        Self { id: "id".into(), population: "pop".into(), area: "area_km2".into() }
    }
}

/// Run configuration. Every field has a default, so `{}` is a valid config file.
///
/// Deserializing only checks shape; [`Pipeline::new`](crate::Pipeline::new)
/// validates thresholds, rules and adjacency parameters before any cell is read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub adjacency_mode: AdjacencyMode,
    pub adjacency_strategy: AdjacencyStrategy,
    pub thresholds: Vec<Tier>,
    pub override_rules: Vec<OverrideRule>,
    /// Population value marking a no-data cell, in addition to null/NaN.
    pub no_data_value: Option<f64>,
    /// Treat a population of exactly zero (water, uninhabited land) as no data.
    pub zero_is_no_data: bool,
    pub fields: FieldNames,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            adjacency_mode: AdjacencyMode::default(),
            adjacency_strategy: AdjacencyStrategy::default(),
            thresholds: Thresholds::default().tiers().to_vec(),
            override_rules: Vec::new(),
            no_data_value: None,
            zero_is_no_data: true,
            fields: FieldNames::default(),
        }
    }
}

impl Config {
    /// Parse a config from a JSON string.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).context("[config] Failed to parse configuration JSON")
    }

    /// Read a config from a JSON file.
    pub fn read(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .with_context(|| format!("[config] Failed to read config file: {}", path.display()))?;
        Self::from_json(&json)
            .with_context(|| format!("[config] Invalid config file: {}", path.display()))
    }

    /// Compile thresholds, override rules and adjacency parameters, reporting
    /// the first problem found.
    pub fn validate(&self) -> crate::error::Result<()> {
        Pipeline::new(self).map(|_| ())
    }

    /// Serialize to pretty-printed JSON.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string_pretty(self).context("[config] Failed to serialize configuration")
    }
}
