use crate::{
    cells::Cell,
    classify::Category,
    error::Result,
    overrides::OverrideRule,
};

/// The category a cell ends up with, and which rule (by position) put it there.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Applied {
    pub category: Category,
    pub rule: Option<usize>,
}

/// An ordered, validated override rule table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OverrideEngine {
    rules: Vec<OverrideRule>,
}

impl OverrideEngine {
    /// Validate every rule up front; a malformed rule rejects the whole table.
    pub fn new(rules: Vec<OverrideRule>) -> Result<Self> {
        rules.iter().enumerate().try_for_each(|(i, rule)| rule.validate(i))?;
        Ok(Self { rules })
    }

    #[inline] pub fn rules(&self) -> &[OverrideRule] { &self.rules }

    #[inline] pub fn is_empty(&self) -> bool { self.rules.is_empty() }

    /// Evaluate the rules in order against the baseline category; the first match wins.
    pub fn apply(&self, cell: &Cell, base: Category) -> Applied {
        self.rules.iter()
            .position(|rule| rule.matches(cell, base))
            .map_or(Applied { category: base, rule: None }, |i| Applied { category: self.rules[i].target, rule: Some(i) })
    }
}

/// Relabel one cell with an ordered rule list; unmatched cells keep `base`.
pub fn apply_overrides(cell: &Cell, base: Category, rules: &[OverrideRule]) -> Category {
    rules.iter()
        .find(|rule| rule.matches(cell, base))
        .map_or(base, |rule| rule.target)
}

#[cfg(test)]
mod tests {
    use geo::MultiPolygon;

    use super::*;
    use crate::overrides::AttributeMatch;

    fn cell(county: &str, name: &str) -> Cell {
        Cell::new(name, 0.0, 1.0, MultiPolygon::new(vec![]))
            .with_attribute("county", county)
            .with_attribute("name", name)
    }

    fn rules() -> Vec<OverrideRule> {
        vec![
            OverrideRule::new(AttributeMatch::new("county", "05"), [Category::RuralTown], Category::SmallUrban)
                .with_name("name", "Ashford"),
            OverrideRule::new(AttributeMatch::new("county", "05"), [Category::RuralTown, Category::RuralVillage], Category::RuralVillage),
            OverrideRule::new(AttributeMatch::new("county", "05"), [Category::RuralTown], Category::Metropolis),
        ]
    }

    #[test]
    fn first_matching_rule_wins() {
        let engine = OverrideEngine::new(rules()).unwrap();

        assert_eq!(
            engine.apply(&cell("05", "Ashford"), Category::RuralTown),
            Applied { category: Category::SmallUrban, rule: Some(0) },
        );
        assert_eq!(
            engine.apply(&cell("05", "Barton"), Category::RuralTown),
            Applied { category: Category::RuralVillage, rule: Some(1) },
        );
    }

    #[test]
    fn unmatched_cells_keep_base_category() {
        let engine = OverrideEngine::new(rules()).unwrap();

        assert_eq!(
            engine.apply(&cell("06", "Ashford"), Category::RuralTown),
            Applied { category: Category::RuralTown, rule: None },
        );
        assert_eq!(engine.apply(&cell("05", "Ashford"), Category::Metropolis).category, Category::Metropolis);
    }

    #[test]
    fn rules_see_the_base_category_only() {
        // Rule 1 relabels to rural_village, which rule 1 itself also lists; it must not cascade.
        let engine = OverrideEngine::new(rules()).unwrap();
        let once = engine.apply(&cell("05", "Barton"), Category::RuralTown);
        assert_eq!(once.category, Category::RuralVillage);
        assert_eq!(apply_overrides(&cell("05", "Barton"), Category::RuralTown, &rules()), Category::RuralVillage);
    }

    #[test]
    fn unmatched_rule_set_is_idempotent() {
        let rules = rules();
        let cell = cell("09", "Carlow");
        let once = apply_overrides(&cell, Category::SmallUrban, &rules);
        let twice = apply_overrides(&cell, once, &rules);
        assert_eq!(once, Category::SmallUrban);
        assert_eq!(once, twice);
    }

    #[test]
    fn free_function_agrees_with_engine() {
        let engine = OverrideEngine::new(rules()).unwrap();
        for county in ["05", "06"] {
            for name in ["Ashford", "Barton"] {
                for base in Category::order() {
                    let cell = cell(county, name);
                    assert_eq!(engine.apply(&cell, base).category, apply_overrides(&cell, base, engine.rules()));
                }
            }
        }
    }

    #[test]
    fn malformed_rule_rejects_table() {
        let mut rules = rules();
        rules.push(OverrideRule::new(AttributeMatch::new("county", "05"), [], Category::Metropolis));
        assert!(OverrideEngine::new(rules).is_err());
        assert!(OverrideEngine::new(vec![]).unwrap().is_empty());
    }
}
