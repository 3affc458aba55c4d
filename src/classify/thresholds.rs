use serde::{Deserialize, Serialize};

use crate::{classify::Category, error::{Error, Result}};

/// One row of the threshold table: densities at or above `lower_bound` map to `category`.
///
/// If `round_to` is set, the density is rounded half-up to that step before this
/// tier's comparison only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Tier {
    pub category: Category,
    pub lower_bound: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub round_to: Option<f64>,
}

impl Tier {
    pub fn new(category: Category, lower_bound: f64) -> Self {
        Self { category, lower_bound, round_to: None }
    }

    pub fn rounded(category: Category, lower_bound: f64, round_to: f64) -> Self {
        Self { category, lower_bound, round_to: Some(round_to) }
    }

    #[inline]
    fn admits(&self, density: f64) -> bool {
        let value = self.round_to.map_or(density, |step| round_half_up(density, step));
        value >= self.lower_bound
    }
}

/// Round to the nearest multiple of `step`, with ties going up (450 -> 500 for step 100).
#[inline]
pub fn round_half_up(value: f64, step: f64) -> f64 {
    (value / step + 0.5).floor() * step
}

/// A validated threshold table, evaluated high-to-low; the first admitting tier wins.
#[derive(Debug, Clone, PartialEq)]
pub struct Thresholds {
    tiers: Vec<Tier>,
}

impl Thresholds {
    /// Validate a threshold table: bounds finite and strictly descending,
    /// categories unique and known, and a catch-all last tier (bound <= 0).
    pub fn new(tiers: Vec<Tier>) -> Result<Self> {
        let Some(last) = tiers.last() else {
            return Err(Error::InvalidThresholdConfig("threshold table is empty".into()));
        };
        if last.lower_bound > 0.0 {
            return Err(Error::InvalidThresholdConfig(format!(
                "lowest tier ({}) must be a catch-all with lower_bound <= 0, got {}",
                last.category.as_str(), last.lower_bound,
            )));
        }

        for (i, tier) in tiers.iter().enumerate() {
            if tier.category == Category::Unknown {
                return Err(Error::InvalidThresholdConfig("'unknown' cannot be a threshold tier".into()));
            }
            if !tier.lower_bound.is_finite() {
                return Err(Error::InvalidThresholdConfig(format!(
                    "tier {} has a non-finite lower_bound", tier.category.as_str(),
                )));
            }
            if let Some(step) = tier.round_to.filter(|step| !(step.is_finite() && *step > 0.0)) {
                return Err(Error::InvalidThresholdConfig(format!(
                    "tier {} has round_to {step}; it must be finite and positive", tier.category.as_str(),
                )));
            }
            if tiers[..i].iter().any(|prev| prev.category == tier.category) {
                return Err(Error::InvalidThresholdConfig(format!(
                    "category {} appears more than once", tier.category.as_str(),
                )));
            }
            if i > 0 && tiers[i - 1].lower_bound <= tier.lower_bound {
                return Err(Error::InvalidThresholdConfig(format!(
                    "bounds must be strictly descending: {} ({}) follows {} ({})",
                    tier.category.as_str(), tier.lower_bound,
                    tiers[i - 1].category.as_str(), tiers[i - 1].lower_bound,
                )));
            }
        }

        Ok(Self { tiers })
    }

    #[inline] pub fn tiers(&self) -> &[Tier] { &self.tiers }

    /// Map a density (people/km²) to its category. Negative or non-finite
    /// densities are `Unknown`; every other density hits exactly one tier.
    pub fn classify(&self, density: f64) -> Category {
        if !density.is_finite() || density < 0.0 { return Category::Unknown }

        self.tiers.iter()
            .find(|tier| tier.admits(density))
            .map_or(Category::Unknown, |tier| tier.category)
    }
}

impl Default for Thresholds {
    /// People per km². The large-urban tier rounds to the nearest 100 before
    /// comparing; no other tier rounds.
    fn default() -> Self {
        Self {
            tiers: vec![
                Tier::new(Category::Metropolis, 1000.0),
                Tier::rounded(Category::LargeUrban, 500.0, 100.0),
                Tier::new(Category::SmallUrban, 100.0),
                Tier::new(Category::RuralTown, 10.0),
                Tier::new(Category::RuralVillage, 0.0),
            ],
        }
    }
}

/// Classify a density against a threshold table.
#[inline]
pub fn classify(density: f64, thresholds: &Thresholds) -> Category { thresholds.classify(density) }
