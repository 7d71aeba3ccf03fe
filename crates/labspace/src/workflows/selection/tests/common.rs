use std::collections::BTreeMap;
use std::sync::Arc;

use axum::response::Response;
use serde_json::Value;

use crate::workflows::selection::domain::{Material, PropertyKind};
use crate::workflows::selection::filter::{Comparator, FilterCondition};
use crate::workflows::selection::repository::InMemoryMaterialRepository;
use crate::workflows::selection::scoring::WeightSet;
use crate::workflows::selection::service::MaterialSelectionService;

/// A candidate that clears every pre-screening rule.
pub(super) fn compliant(name: &str) -> Material {
    Material::new(name)
        .with(PropertyKind::Cte, 20.0, 30.0)
        .with(PropertyKind::Cost, 10.0, 10.0)
        .with(PropertyKind::Density, 1000.0, 1000.0)
        .with(PropertyKind::HdtHighLoad, 200.0, 200.0)
        .with(PropertyKind::HdtLowLoad, 190.0, 190.0)
}

/// A candidate rejected by the CTE rule regardless of its other properties.
pub(super) fn cte_outlier(name: &str) -> Material {
    compliant(name).with(PropertyKind::Cte, 200.0, 200.0)
}

pub(super) fn seed_materials() -> Vec<Material> {
    vec![
        compliant("M1"),
        cte_outlier("M2"),
        compliant("M3")
            .with(PropertyKind::Cost, 16.0, 20.0)
            .with(PropertyKind::TensileStrength, 80.0, 95.0),
    ]
}

pub(super) fn build_service() -> (
    MaterialSelectionService<InMemoryMaterialRepository>,
    Arc<InMemoryMaterialRepository>,
) {
    let repository = Arc::new(InMemoryMaterialRepository::with_seed(seed_materials()));
    let service = MaterialSelectionService::new(repository.clone());
    (service, repository)
}

pub(super) fn cost_condition(threshold: f64) -> FilterCondition {
    FilterCondition::new(PropertyKind::Cost, Comparator::LessThan, threshold)
}

pub(super) fn cost_density_weights() -> WeightSet {
    let mut map = BTreeMap::new();
    map.insert(PropertyKind::Cost, 60);
    map.insert(PropertyKind::Density, 40);
    WeightSet::new(map)
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
