use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::{cells::Cell, classify::Category, error::{Error, Result}};

/// Exact equality on one named cell attribute.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AttributeMatch {
    pub attribute: String,
    pub value: String,
}

impl AttributeMatch {
    pub fn new(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        Self { attribute: attribute.into(), value: value.into() }
    }

    #[inline]
    pub fn matches(&self, cell: &Cell) -> bool {
        cell.attribute(&self.attribute) == Some(self.value.as_str())
    }
}

/// A manual reclassification: cells in `region` whose current category is one of
/// `categories` (and, if given, whose `name` matches) become `target`.
///
/// Rules only look at attributes and the current category, never at density or area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OverrideRule {
    pub region: AttributeMatch,
    pub categories: BTreeSet<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<AttributeMatch>,
    pub target: Category,
}

impl OverrideRule {
    pub fn new(region: AttributeMatch, categories: impl IntoIterator<Item = Category>, target: Category) -> Self {
        Self { region, categories: categories.into_iter().collect(), name: None, target }
    }

    /// Restrict the rule to cells whose `attribute` equals `value`.
    pub fn with_name(mut self, attribute: impl Into<String>, value: impl Into<String>) -> Self {
        self.name = Some(AttributeMatch::new(attribute, value));
        self
    }

    /// All conditions hold for this cell in its current category.
    pub fn matches(&self, cell: &Cell, current: Category) -> bool {
        self.region.matches(cell)
            && self.categories.contains(&current)
            && self.name.as_ref().is_none_or(|name| name.matches(cell))
    }

    /// Check that the predicate is well formed; `index` is the rule's position.
    pub(crate) fn validate(&self, index: usize) -> Result<()> {
        let invalid = |reason: &str| -> Result<()> { Err(Error::InvalidOverrideRule { index, reason: reason.into() }) };

        for condition in std::iter::once(&self.region).chain(self.name.as_ref()) {
            if condition.attribute.trim().is_empty() { return invalid("attribute name is empty") }
            if condition.value.is_empty() { return invalid("attribute value is empty") }
        }
        if self.categories.is_empty() { return invalid("category set is empty") }
        if self.categories.contains(&Category::Unknown) { return invalid("'unknown' cells cannot be overridden") }
        if self.target == Category::Unknown { return invalid("target cannot be 'unknown'") }

        Ok(())
    }
}
