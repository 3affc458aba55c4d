use std::fmt;

use serde::{Deserialize, Serialize};

/// Community-size category, ordered from largest to smallest settlement.
/// `Unknown` sorts last and marks cells whose density could not be classified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Metropolis,
    LargeUrban,
    SmallUrban,
    RuralTown,
    RuralVillage,
    Unknown,
}

impl Category {
    /// Machine-readable name, as used in configuration files.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Metropolis => "metropolis",
            Category::LargeUrban => "large_urban",
            Category::SmallUrban => "small_urban",
            Category::RuralTown => "rural_town",
            Category::RuralVillage => "rural_village",
            Category::Unknown => "unknown",
        }
    }

    /// Human-readable label for maps and reports.
    pub fn label(&self) -> &'static str {
        match self {
            Category::Metropolis => "Metropolis",
            Category::LargeUrban => "Large urban community",
            Category::SmallUrban => "Small urban community",
            Category::RuralTown => "Rural town",
            Category::RuralVillage => "Rural village",
            Category::Unknown => "Unknown",
        }
    }

    pub fn order() -> [Category; 6] {
        [
            Category::Metropolis,
            Category::LargeUrban,
            Category::SmallUrban,
            Category::RuralTown,
            Category::RuralVillage,
            Category::Unknown,
        ]
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
