use std::io::Read;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;

use super::cost::{self, MoldCostEstimate};
use super::domain::{Material, MaterialView};
use super::filter::{self, FilterCondition};
use super::import::{self, MaterialImportError, RowError};
use super::repository::{MaterialRepository, RepositoryError};
use super::scoring::{self, MaterialScore, WeightSet};
use super::screening::{self, ScreeningOutcome};

/// Service composing the catalog repository with the screening, filtering,
/// scoring, and cost engines. Every operation re-reads the store so results
/// always reflect the current catalog.
pub struct MaterialSelectionService<R> {
    repository: Arc<R>,
}

impl<R> MaterialSelectionService<R>
where
    R: MaterialRepository + 'static,
{
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Add or replace a single record.
    pub fn add(&self, material: Material) -> Result<MaterialView, SelectionServiceError> {
        let view = material.view();
        self.repository.upsert(material)?;
        Ok(view)
    }

    /// Bulk import; each parsed record replaces any existing record with the
    /// same name. Bad rows are reported, never fatal.
    pub fn import<Rd: Read>(&self, reader: Rd) -> Result<ImportSummary, SelectionServiceError> {
        let outcome = import::parse_csv(reader)?;
        let imported = outcome.materials.len();
        for material in outcome.materials {
            self.repository.upsert(material)?;
        }
        info!(imported, skipped = outcome.row_errors.len(), "material import complete");
        Ok(ImportSummary {
            imported,
            row_errors: outcome.row_errors,
        })
    }

    pub fn template(&self) -> String {
        import::template_csv()
    }

    pub fn export(&self) -> Result<String, SelectionServiceError> {
        let materials = self.repository.list()?;
        Ok(import::export_csv(&materials))
    }

    pub fn list(&self) -> Result<Vec<MaterialView>, SelectionServiceError> {
        let materials = self.repository.list()?;
        Ok(materials.iter().map(Material::view).collect())
    }

    pub fn remove(&self, name: &str) -> Result<(), SelectionServiceError> {
        self.repository.remove(name)?;
        Ok(())
    }

    /// Pre-screening verdicts for the whole catalog, in store order.
    pub fn screen(&self) -> Result<Vec<ScreeningOutcome>, SelectionServiceError> {
        let materials = self.repository.list()?;
        Ok(screening::screen_all(&materials))
    }

    /// Materials that pass pre-screening and every active condition.
    pub fn shortlist(
        &self,
        conditions: &[FilterCondition],
    ) -> Result<Vec<Material>, SelectionServiceError> {
        let materials = self.repository.list()?;
        let screened: Vec<Material> = materials
            .into_iter()
            .filter(|material| screening::screen(material).passed)
            .collect();
        Ok(filter::apply(&screened, conditions))
    }

    /// Full pipeline: screen, filter, then rank by the weighted score.
    pub fn score(
        &self,
        conditions: &[FilterCondition],
        weights: &WeightSet,
    ) -> Result<Vec<MaterialScore>, SelectionServiceError> {
        weights.validate()?;
        let shortlist = self.shortlist(conditions)?;
        let ranked = scoring::rank(&shortlist, conditions, weights)?;
        Ok(ranked)
    }

    /// Mold cost estimates for the current shortlist, ascending by cost.
    pub fn mold_cost(
        &self,
        part_volume_m3: f64,
        conditions: &[FilterCondition],
    ) -> Result<Vec<MoldCostEstimate>, SelectionServiceError> {
        let shortlist = self.shortlist(conditions)?;
        Ok(cost::estimate(&shortlist, part_volume_m3))
    }
}

/// Bulk import receipt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportSummary {
    pub imported: usize,
    pub row_errors: Vec<RowError>,
}

/// Error raised by the selection service.
#[derive(Debug, thiserror::Error)]
pub enum SelectionServiceError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error(transparent)]
    Import(#[from] MaterialImportError),
    #[error(transparent)]
    Weights(#[from] scoring::WeightError),
}
