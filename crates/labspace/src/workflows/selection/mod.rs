//! Composite material screening, filtering, weighted scoring, and mold cost
//! estimation over the shared material catalog.

pub mod cost;
pub mod domain;
pub mod filter;
pub mod import;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod screening;
pub mod service;

#[cfg(test)]
mod tests;

pub use cost::MoldCostEstimate;
pub use domain::{Material, MaterialView, PropertyKind, RangeValue};
pub use filter::{Comparator, FilterCondition};
pub use import::{ImportOutcome, MaterialImportError, RowError};
pub use repository::{
    CsvMaterialRepository, InMemoryMaterialRepository, MaterialRepository, RepositoryError,
};
pub use router::selection_router;
pub use scoring::{MaterialScore, ScoreContribution, WeightError, WeightSet};
pub use screening::{RuleCheck, ScreeningOutcome, ScreeningRule};
pub use service::{ImportSummary, MaterialSelectionService, SelectionServiceError};
