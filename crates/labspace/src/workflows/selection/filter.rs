use serde::{Deserialize, Serialize};

use super::domain::{Material, PropertyKind, RangeValue};

/// Comparison mode a user attaches to a filtered property.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparator {
    LessThan,
    GreaterThan,
    EqualWithinRange,
}

/// One active per-property condition. Conditions combine with logical AND.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FilterCondition {
    pub property: PropertyKind,
    pub comparator: Comparator,
    pub threshold: f64,
}

impl FilterCondition {
    pub fn new(property: PropertyKind, comparator: Comparator, threshold: f64) -> Self {
        Self {
            property,
            comparator,
            threshold,
        }
    }

    /// Lenient range semantics: `LessThan` passes when any part of the
    /// declared range could satisfy the bound (it compares the range's lower
    /// bound), `GreaterThan` symmetrically compares the upper bound.
    pub fn matches(&self, range: RangeValue) -> bool {
        match self.comparator {
            Comparator::LessThan => range.min <= self.threshold,
            Comparator::GreaterThan => range.max >= self.threshold,
            Comparator::EqualWithinRange => range.contains(self.threshold),
        }
    }
}

/// Whether a single material satisfies every condition. A material missing a
/// conditioned property fails immediately; since the conditions AND together
/// the short-circuit cannot change the verdict.
pub fn matches_all(material: &Material, conditions: &[FilterCondition]) -> bool {
    conditions.iter().all(|condition| {
        material
            .property(condition.property)
            .is_some_and(|range| condition.matches(range))
    })
}

/// Apply the conditions to an already pre-screened collection, preserving
/// store order.
pub fn apply(materials: &[Material], conditions: &[FilterCondition]) -> Vec<Material> {
    materials
        .iter()
        .filter(|material| matches_all(material, conditions))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn less_than_checks_the_lower_bound() {
        let condition = FilterCondition::new(PropertyKind::Cost, Comparator::LessThan, 15.0);
        assert!(condition.matches(RangeValue::new(10.0, 20.0)));
        assert!(!condition.matches(RangeValue::new(16.0, 20.0)));
    }

    #[test]
    fn greater_than_checks_the_upper_bound() {
        let condition =
            FilterCondition::new(PropertyKind::TensileStrength, Comparator::GreaterThan, 90.0);
        assert!(condition.matches(RangeValue::new(80.0, 95.0)));
        assert!(!condition.matches(RangeValue::new(70.0, 85.0)));
    }

    #[test]
    fn equal_within_range_checks_containment() {
        let condition =
            FilterCondition::new(PropertyKind::Density, Comparator::EqualWithinRange, 1300.0);
        assert!(condition.matches(RangeValue::new(1250.0, 1350.0)));
        assert!(!condition.matches(RangeValue::new(1400.0, 1500.0)));
    }

    #[test]
    fn missing_property_fails_the_material() {
        let material = Material::new("bare");
        let conditions = [FilterCondition::new(
            PropertyKind::Cost,
            Comparator::LessThan,
            100.0,
        )];
        assert!(!matches_all(&material, &conditions));
    }

    #[test]
    fn apply_preserves_store_order() {
        let cheap = Material::new("cheap").with(PropertyKind::Cost, 5.0, 10.0);
        let mid = Material::new("mid").with(PropertyKind::Cost, 12.0, 18.0);
        let dear = Material::new("dear").with(PropertyKind::Cost, 40.0, 60.0);
        let conditions = [FilterCondition::new(
            PropertyKind::Cost,
            Comparator::LessThan,
            15.0,
        )];

        let kept = apply(&[cheap, mid, dear], &conditions);
        let names: Vec<_> = kept.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, ["cheap", "mid"]);
    }

    #[test]
    fn no_conditions_keeps_everything() {
        let materials = [Material::new("a"), Material::new("b")];
        assert_eq!(apply(&materials, &[]).len(), 2);
    }
}
