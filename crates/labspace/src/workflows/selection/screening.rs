use serde::{Deserialize, Serialize};

use super::domain::{Material, PropertyKind};

/// Reference CTE of the epoxy matrix in µm/m·°C.
const EPOXY_CTE_REFERENCE: f64 = 50.0;
/// Acceptable CTE band around the reference: ±60 %.
const CTE_BAND_LOW: f64 = 0.4;
const CTE_BAND_HIGH: f64 = 1.6;

/// Invar tooling baseline used for the cost rule.
const INVAR_COST_PER_KG: f64 = 70.0;
const INVAR_DENSITY: f64 = 8000.0;
/// Packing factor applied to cost-per-volume on both sides of the comparison.
const COST_VOLUME_FACTOR: f64 = 0.91;
/// A candidate must undercut Invar tooling cost by at least 30 %.
const COST_DISCOUNT_THRESHOLD: f64 = 0.70;

/// Minimum equivalent heat-deflection temperature for autoclave cycles, °C.
const AUTOCLAVE_MIN_HDT: f64 = 180.0;
/// HDT test loads in MPa, and the autoclave-equivalent load interpolated to.
const HDT_LOAD_HIGH: f64 = 1.8;
const HDT_LOAD_LOW: f64 = 0.46;
const AUTOCLAVE_LOAD: f64 = 0.7;

/// The three physical-compatibility rules applied before user filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScreeningRule {
    CteCompatibility,
    ToolingCost,
    AutoclaveDeformation,
}

impl ScreeningRule {
    pub const fn label(self) -> &'static str {
        match self {
            ScreeningRule::CteCompatibility => "CTE compatibility",
            ScreeningRule::ToolingCost => "tooling cost vs. Invar",
            ScreeningRule::AutoclaveDeformation => "autoclave deformation",
        }
    }
}

/// Per-rule audit entry so the UI can show why a material was rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleCheck {
    pub rule: ScreeningRule,
    pub passed: bool,
    pub notes: String,
}

/// Screening verdict for a single material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreeningOutcome {
    pub material: String,
    pub passed: bool,
    pub checks: Vec<RuleCheck>,
}

/// Evaluate all three rules for one material. The verdict depends only on the
/// material's own property values; missing data fails closed.
pub fn screen(material: &Material) -> ScreeningOutcome {
    let checks = vec![
        check_cte(material),
        check_cost(material),
        check_autoclave(material),
    ];
    let passed = checks.iter().all(|check| check.passed);

    ScreeningOutcome {
        material: material.name.clone(),
        passed,
        checks,
    }
}

/// Screen a whole collection, preserving store order.
pub fn screen_all(materials: &[Material]) -> Vec<ScreeningOutcome> {
    materials.iter().map(screen).collect()
}

/// Names of the materials that pass every rule, in store order.
pub fn passing_names(materials: &[Material]) -> Vec<String> {
    screen_all(materials)
        .into_iter()
        .filter(|outcome| outcome.passed)
        .map(|outcome| outcome.material)
        .collect()
}

fn check_cte(material: &Material) -> RuleCheck {
    let (passed, notes) = match material.mean_of(PropertyKind::Cte) {
        Some(avg) => {
            let lower = CTE_BAND_LOW * EPOXY_CTE_REFERENCE;
            let upper = CTE_BAND_HIGH * EPOXY_CTE_REFERENCE;
            let ok = avg.is_finite() && lower <= avg && avg <= upper;
            (
                ok,
                format!("mean CTE {avg:.1} vs. allowed [{lower:.0}, {upper:.0}] µm/m·°C"),
            )
        }
        None => (false, "CTE not declared".to_string()),
    };

    RuleCheck {
        rule: ScreeningRule::CteCompatibility,
        passed,
        notes,
    }
}

fn check_cost(material: &Material) -> RuleCheck {
    let cost = material.mean_of(PropertyKind::Cost);
    let density = material.mean_of(PropertyKind::Density);

    let (passed, notes) = match (cost, density) {
        (Some(cost), Some(density)) => {
            let candidate = cost * density * COST_VOLUME_FACTOR;
            let invar = INVAR_COST_PER_KG * INVAR_DENSITY * COST_VOLUME_FACTOR;
            let limit = COST_DISCOUNT_THRESHOLD * invar;
            (
                candidate.is_finite() && candidate <= limit,
                format!("{candidate:.0} USD/m³ vs. limit {limit:.0} USD/m³"),
            )
        }
        _ => (false, "cost or density not declared".to_string()),
    };

    RuleCheck {
        rule: ScreeningRule::ToolingCost,
        passed,
        notes,
    }
}

// The single-sided short-circuit (pass on either HDT point alone reaching
// 180 °C) is the canonical behavior; interpolation only runs when both
// points are present and neither clears the threshold on its own.
fn check_autoclave(material: &Material) -> RuleCheck {
    let high = material.mean_of(PropertyKind::HdtHighLoad);
    let low = material.mean_of(PropertyKind::HdtLowLoad);

    let (passed, notes) = match (high, low) {
        (Some(a), _) if a >= AUTOCLAVE_MIN_HDT => {
            (true, format!("HDT at {HDT_LOAD_HIGH} MPa is {a:.0} °C"))
        }
        (_, Some(b)) if b >= AUTOCLAVE_MIN_HDT => {
            (true, format!("HDT at {HDT_LOAD_LOW} MPa is {b:.0} °C"))
        }
        (Some(a), Some(b)) => {
            let fraction = (AUTOCLAVE_LOAD - HDT_LOAD_LOW) / (HDT_LOAD_HIGH - HDT_LOAD_LOW);
            let interpolated = b + fraction * (a - b);
            (
                interpolated >= AUTOCLAVE_MIN_HDT,
                format!("interpolated HDT at {AUTOCLAVE_LOAD} MPa is {interpolated:.1} °C"),
            )
        }
        _ => (false, "insufficient HDT data".to_string()),
    };

    RuleCheck {
        rule: ScreeningRule::AutoclaveDeformation,
        passed,
        notes,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compliant_material() -> Material {
        Material::new("M1")
            .with(PropertyKind::Cte, 20.0, 30.0)
            .with(PropertyKind::Cost, 10.0, 10.0)
            .with(PropertyKind::Density, 1000.0, 1000.0)
            .with(PropertyKind::HdtHighLoad, 200.0, 200.0)
            .with(PropertyKind::HdtLowLoad, 190.0, 190.0)
    }

    #[test]
    fn compliant_material_passes_all_rules() {
        let outcome = screen(&compliant_material());
        assert!(outcome.passed, "checks: {:?}", outcome.checks);
        assert!(outcome.checks.iter().all(|check| check.passed));
    }

    #[test]
    fn extreme_cte_fails_regardless_of_other_properties() {
        let material = compliant_material().with(PropertyKind::Cte, 200.0, 200.0);
        let outcome = screen(&material);
        assert!(!outcome.passed);
        let cte = &outcome.checks[0];
        assert_eq!(cte.rule, ScreeningRule::CteCompatibility);
        assert!(!cte.passed);
    }

    #[test]
    fn missing_cte_fails_closed() {
        let mut material = compliant_material();
        material.properties.remove(&PropertyKind::Cte);
        assert!(!screen(&material).passed);
    }

    #[test]
    fn expensive_material_fails_cost_rule() {
        // Invar limit is 0.7 * 70 * 8000 * 0.91 = 356720 USD/m³.
        let material = compliant_material()
            .with(PropertyKind::Cost, 100.0, 100.0)
            .with(PropertyKind::Density, 8000.0, 8000.0);
        let outcome = screen(&material);
        assert!(!outcome.checks[1].passed);
    }

    #[test]
    fn single_hdt_point_above_threshold_passes() {
        let mut material = compliant_material().with(PropertyKind::HdtLowLoad, 185.0, 185.0);
        material.properties.remove(&PropertyKind::HdtHighLoad);
        assert!(screen(&material).checks[2].passed);
    }

    #[test]
    fn interpolation_runs_when_neither_point_clears_alone() {
        // A = 170, B = 175: T* = 175 + (0.24/1.34)*(170-175) ≈ 174.1 -> fail.
        let material = compliant_material()
            .with(PropertyKind::HdtHighLoad, 170.0, 170.0)
            .with(PropertyKind::HdtLowLoad, 175.0, 175.0);
        assert!(!screen(&material).checks[2].passed);
    }

    #[test]
    fn missing_hdt_data_fails_closed() {
        let mut material = compliant_material();
        material.properties.remove(&PropertyKind::HdtHighLoad);
        material.properties.remove(&PropertyKind::HdtLowLoad);
        assert!(!screen(&material).passed);
    }

    #[test]
    fn screening_is_order_independent() {
        let a = compliant_material();
        let b = {
            let mut m = compliant_material();
            m.name = "M2".to_string();
            m.properties.insert(
                PropertyKind::Cte,
                crate::workflows::selection::domain::RangeValue::point(200.0),
            );
            m
        };

        let forward = passing_names(&[a.clone(), b.clone()]);
        let reverse = passing_names(&[b, a]);
        assert_eq!(forward, vec!["M1".to_string()]);
        assert_eq!(reverse, vec!["M1".to_string()]);
    }
}
