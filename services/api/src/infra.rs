use labspace::workflows::library::{FileLibrary, FileRecord, InMemoryFileLibrary, LibraryError};
use labspace::workflows::selection::{Material, PropertyKind};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
    pub(crate) tensile_files: Arc<CurveStore>,
    pub(crate) dsc_files: Arc<CurveStore>,
}

/// One curve library: upload metadata plus the raw text content, kept side
/// by side so a stored file can be re-analyzed by name.
#[derive(Default)]
pub(crate) struct CurveStore {
    records: InMemoryFileLibrary,
    contents: Mutex<HashMap<String, String>>,
}

impl CurveStore {
    pub(crate) fn save(
        &self,
        record: FileRecord,
        content: String,
    ) -> Result<FileRecord, LibraryError> {
        let stored_name = record.stored_name.clone();
        self.records.save(record.clone())?;
        self.contents
            .lock()
            .expect("content mutex poisoned")
            .insert(stored_name, content);
        Ok(record)
    }

    pub(crate) fn content(&self, stored_name: &str) -> Result<String, LibraryError> {
        self.records.get(stored_name)?;
        self.contents
            .lock()
            .expect("content mutex poisoned")
            .get(stored_name)
            .cloned()
            .ok_or_else(|| LibraryError::NotFound(stored_name.to_string()))
    }

    pub(crate) fn remove(&self, stored_name: &str) -> Result<FileRecord, LibraryError> {
        let record = self.records.remove(stored_name)?;
        self.contents
            .lock()
            .expect("content mutex poisoned")
            .remove(stored_name);
        Ok(record)
    }

    pub(crate) fn list(&self) -> Result<Vec<FileRecord>, LibraryError> {
        self.records.list()
    }
}

/// Candidate catalog used by the demo command and the in-memory server mode:
/// a spread of high-temperature thermoplastics plus two metals that the
/// pre-screening rules reject.
pub(crate) fn seed_materials() -> Vec<Material> {
    vec![
        Material::new("PEKK-CF")
            .with(PropertyKind::Cte, 25.0, 35.0)
            .with(PropertyKind::Cost, 90.0, 120.0)
            .with(PropertyKind::Density, 1280.0, 1320.0)
            .with(PropertyKind::HdtHighLoad, 260.0, 280.0)
            .with(PropertyKind::TensileStrength, 100.0, 130.0)
            .with(PropertyKind::GlassTransition, 155.0, 165.0)
            .with(PropertyKind::MeltingTemperature, 330.0, 340.0),
        Material::new("PPS-GF40")
            .with(PropertyKind::Cte, 20.0, 30.0)
            .with(PropertyKind::Cost, 12.0, 18.0)
            .with(PropertyKind::Density, 1620.0, 1680.0)
            .with(PropertyKind::HdtHighLoad, 255.0, 270.0)
            .with(PropertyKind::TensileStrength, 150.0, 195.0)
            .with(PropertyKind::GlassTransition, 88.0, 93.0),
        Material::new("PESU")
            .with(PropertyKind::Cte, 49.0, 55.0)
            .with(PropertyKind::Cost, 20.0, 30.0)
            .with(PropertyKind::Density, 1360.0, 1380.0)
            .with(PropertyKind::HdtHighLoad, 204.0, 210.0)
            .with(PropertyKind::TensileStrength, 80.0, 90.0)
            .with(PropertyKind::GlassTransition, 220.0, 230.0),
        // Autoclave rule fails: no HDT data for a metal.
        Material::new("Aluminum 7075")
            .with(PropertyKind::Cte, 23.0, 24.0)
            .with(PropertyKind::Cost, 4.0, 6.0)
            .with(PropertyKind::Density, 2790.0, 2820.0)
            .with(PropertyKind::TensileStrength, 480.0, 540.0),
        // CTE far below the epoxy band; also over the cost ceiling.
        Material::new("Invar 36")
            .with(PropertyKind::Cte, 1.2, 2.0)
            .with(PropertyKind::Cost, 65.0, 75.0)
            .with(PropertyKind::Density, 8050.0, 8150.0)
            .with(PropertyKind::TensileStrength, 450.0, 490.0),
    ]
}
