use serde::{Deserialize, Serialize};

use super::domain::{Material, PropertyKind};

/// Production cost estimate for molding one part from a candidate material.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MoldCostEstimate {
    pub material: String,
    /// Mean declared density, kg/m³.
    pub avg_density: f64,
    /// Mean declared cost, USD/kg.
    pub avg_cost: f64,
    /// volume × density, kg.
    pub estimated_mass_kg: f64,
    /// mass × cost, USD.
    pub estimated_cost_usd: f64,
}

/// Estimate the mold cost of each candidate for a part of the given volume
/// (m³, supplied by an external geometry component). Materials missing cost
/// or density are skipped; results sort ascending by estimated cost.
pub fn estimate(materials: &[Material], part_volume_m3: f64) -> Vec<MoldCostEstimate> {
    let mut estimates: Vec<MoldCostEstimate> = materials
        .iter()
        .filter_map(|material| {
            let avg_density = material.mean_of(PropertyKind::Density)?;
            let avg_cost = material.mean_of(PropertyKind::Cost)?;
            let estimated_mass_kg = part_volume_m3 * avg_density;
            let estimated_cost_usd = estimated_mass_kg * avg_cost;
            Some(MoldCostEstimate {
                material: material.name.clone(),
                avg_density,
                avg_cost,
                estimated_mass_kg,
                estimated_cost_usd,
            })
        })
        .collect();

    estimates.sort_by(|a, b| {
        a.estimated_cost_usd
            .partial_cmp(&b.estimated_cost_usd)
            .unwrap_or(std::cmp::Ordering::Equal)
    });

    estimates
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn estimates_sort_ascending_and_skip_incomplete_records() {
        let materials = vec![
            Material::new("dear")
                .with(PropertyKind::Density, 1500.0, 1500.0)
                .with(PropertyKind::Cost, 80.0, 80.0),
            Material::new("cheap")
                .with(PropertyKind::Density, 1000.0, 1000.0)
                .with(PropertyKind::Cost, 10.0, 10.0),
            Material::new("no-cost").with(PropertyKind::Density, 1200.0, 1200.0),
        ];

        let estimates = estimate(&materials, 0.002);

        assert_eq!(estimates.len(), 2);
        assert_eq!(estimates[0].material, "cheap");
        assert!((estimates[0].estimated_mass_kg - 2.0).abs() < 1e-12);
        assert!((estimates[0].estimated_cost_usd - 20.0).abs() < 1e-12);
        assert_eq!(estimates[1].material, "dear");
    }

    #[test]
    fn range_means_feed_the_estimate() {
        let materials = vec![Material::new("spread")
            .with(PropertyKind::Density, 1000.0, 1400.0)
            .with(PropertyKind::Cost, 10.0, 30.0)];

        let estimates = estimate(&materials, 1.0);
        assert_eq!(estimates[0].avg_density, 1200.0);
        assert_eq!(estimates[0].avg_cost, 20.0);
    }
}
