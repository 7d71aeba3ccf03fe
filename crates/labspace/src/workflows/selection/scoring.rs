use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::domain::{Material, PropertyKind};
use super::filter::{Comparator, FilterCondition};

/// Small bonus awarded when a requested value matches a declared point range
/// or range center exactly. Totals can therefore slightly exceed 100; that is
/// intentional headroom for exact matches.
const EXACT_MATCH_BONUS: f64 = 1.05;

/// Importance weights per filtered property, in whole percent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightSet {
    pub weights: BTreeMap<PropertyKind, u32>,
}

impl WeightSet {
    pub fn new(weights: BTreeMap<PropertyKind, u32>) -> Self {
        Self { weights }
    }

    pub fn get(&self, kind: PropertyKind) -> u32 {
        self.weights.get(&kind).copied().unwrap_or(0)
    }

    pub fn sum(&self) -> u32 {
        self.weights.values().sum()
    }

    /// Scoring is withheld until the weights sum to exactly 100. This is a
    /// configuration-completeness gate, not a runtime fault.
    pub fn validate(&self) -> Result<(), WeightError> {
        let sum = self.sum();
        if sum == 100 {
            Ok(())
        } else {
            Err(WeightError::SumMismatch { sum })
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WeightError {
    #[error("importance weights must sum to exactly 100 (currently {sum})")]
    SumMismatch { sum: u32 },
}

/// Per-property suitability of a declared range `[lo, hi]` against the
/// requested value, in `[0, 1.05]`.
///
/// Values inside the range score close to 1 and decay linearly outside it,
/// floored at 0; an exact match on a point range or range center earns the
/// 1.05 bonus.
pub fn property_score(comparator: Comparator, user_val: f64, lo: f64, hi: f64) -> f64 {
    if lo == hi {
        if user_val == lo {
            return EXACT_MATCH_BONUS;
        }
        let divisor = if lo == 0.0 { 1.0 } else { lo.abs() };
        return (1.0 - (user_val - lo).abs() / divisor).max(0.0);
    }

    let range = hi - lo;
    let center = (lo + hi) / 2.0;

    match comparator {
        Comparator::LessThan => {
            if user_val <= lo {
                1.0
            } else if user_val > hi {
                (1.0 - (user_val - hi) / range).max(0.0)
            } else {
                1.0 - (user_val - lo) / range
            }
        }
        Comparator::GreaterThan => {
            if user_val >= hi {
                1.0
            } else if user_val < lo {
                (1.0 - (lo - user_val) / range).max(0.0)
            } else {
                1.0 - (hi - user_val) / range
            }
        }
        Comparator::EqualWithinRange => {
            let diff = (user_val - center).abs();
            if diff == 0.0 {
                EXACT_MATCH_BONUS
            } else {
                (1.0 - diff / range).max(0.0)
            }
        }
    }
}

/// Contribution of one property to a material's total, retained for the
/// breakdown visualization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreContribution {
    pub property: PropertyKind,
    pub score: f64,
    pub weight: u32,
    pub weighted: f64,
}

/// Ranked scoring result for one material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialScore {
    pub material: String,
    pub total: f64,
    pub components: Vec<ScoreContribution>,
}

/// Score the filtered materials against the active conditions and weights,
/// returning them ranked descending; ties keep store order.
pub fn rank(
    materials: &[Material],
    conditions: &[FilterCondition],
    weights: &WeightSet,
) -> Result<Vec<MaterialScore>, WeightError> {
    weights.validate()?;

    let mut scored: Vec<MaterialScore> = materials
        .iter()
        .map(|material| score_material(material, conditions, weights))
        .collect();

    scored.sort_by(|a, b| {
        b.total
            .partial_cmp(&a.total)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    Ok(scored)
}

fn score_material(
    material: &Material,
    conditions: &[FilterCondition],
    weights: &WeightSet,
) -> MaterialScore {
    let mut components = Vec::with_capacity(conditions.len());
    let mut total = 0.0;

    for condition in conditions {
        let weight = weights.get(condition.property);
        let score = match material.property(condition.property) {
            Some(range) => {
                property_score(condition.comparator, condition.threshold, range.min, range.max)
            }
            // Filtered materials always carry the property; scoring an
            // unfiltered collection treats the gap as a zero contribution.
            None => 0.0,
        };
        let weighted = score * f64::from(weight);
        total += score * f64::from(weight) / 100.0;
        components.push(ScoreContribution {
            property: condition.property,
            score,
            weight,
            weighted,
        });
    }

    MaterialScore {
        material: material.name.clone(),
        total: round2(total * 100.0),
        components,
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
