use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::domain::Material;
use super::import;

/// Storage abstraction for the material catalog so the selection service can
/// be exercised in isolation. `list` must preserve insertion order: screening,
/// filtering, and ranking ties all resolve by store order.
pub trait MaterialRepository: Send + Sync {
    fn upsert(&self, material: Material) -> Result<(), RepositoryError>;
    fn remove(&self, name: &str) -> Result<(), RepositoryError>;
    fn get(&self, name: &str) -> Result<Option<Material>, RepositoryError>;
    fn list(&self) -> Result<Vec<Material>, RepositoryError>;
}

/// Error enumeration for repository failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Ordered in-memory catalog, the default for tests and the demo service.
#[derive(Debug, Default)]
pub struct InMemoryMaterialRepository {
    records: Mutex<Vec<Material>>,
}

impl InMemoryMaterialRepository {
    pub fn with_seed(materials: Vec<Material>) -> Self {
        Self {
            records: Mutex::new(materials),
        }
    }
}

impl MaterialRepository for InMemoryMaterialRepository {
    fn upsert(&self, material: Material) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("catalog mutex poisoned");
        match guard.iter_mut().find(|record| record.name == material.name) {
            Some(existing) => *existing = material,
            None => guard.push(material),
        }
        Ok(())
    }

    fn remove(&self, name: &str) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("catalog mutex poisoned");
        let before = guard.len();
        guard.retain(|record| record.name != name);
        if guard.len() == before {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    fn get(&self, name: &str) -> Result<Option<Material>, RepositoryError> {
        let guard = self.records.lock().expect("catalog mutex poisoned");
        Ok(guard.iter().find(|record| record.name == name).cloned())
    }

    fn list(&self) -> Result<Vec<Material>, RepositoryError> {
        let guard = self.records.lock().expect("catalog mutex poisoned");
        Ok(guard.clone())
    }
}

/// File-backed catalog persisting the whole table on every change, guarded by
/// a single writer lock. The on-disk format is the same CSV shape the bulk
/// import accepts, so the file can be edited or re-imported by hand.
#[derive(Debug)]
pub struct CsvMaterialRepository {
    path: PathBuf,
    records: Mutex<Vec<Material>>,
}

impl CsvMaterialRepository {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, RepositoryError> {
        let path = path.into();
        let records = if path.exists() {
            let raw = fs::read_to_string(&path)
                .map_err(|err| RepositoryError::Unavailable(err.to_string()))?;
            import::parse_csv(Cursor::new(raw))
                .map_err(|err| RepositoryError::Unavailable(err.to_string()))?
                .materials
        } else {
            Vec::new()
        };

        Ok(Self {
            path,
            records: Mutex::new(records),
        })
    }

    fn persist(&self, records: &[Material]) -> Result<(), RepositoryError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .map_err(|err| RepositoryError::Unavailable(err.to_string()))?;
            }
        }
        fs::write(&self.path, bounds_csv(records))
            .map_err(|err| RepositoryError::Unavailable(err.to_string()))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

/// Full-precision min/max table used as the persistence format.
fn bounds_csv(materials: &[Material]) -> String {
    use super::domain::PropertyKind;

    let mut writer = csv::Writer::from_writer(Vec::new());
    let mut header = Vec::with_capacity(1 + PropertyKind::ALL.len() * 2);
    header.push("Name".to_string());
    for kind in PropertyKind::ALL {
        header.push(format!("{} min", kind.label()));
        header.push(format!("{} max", kind.label()));
    }
    writer.write_record(&header).expect("in-memory write");

    for material in materials {
        let mut row = Vec::with_capacity(header.len());
        row.push(material.name.clone());
        for kind in PropertyKind::ALL {
            match material.property(kind) {
                Some(range) => {
                    row.push(range.min.to_string());
                    row.push(range.max.to_string());
                }
                None => {
                    row.push(String::new());
                    row.push(String::new());
                }
            }
        }
        writer.write_record(&row).expect("in-memory write");
    }

    let bytes = writer.into_inner().expect("in-memory flush");
    String::from_utf8(bytes).expect("utf8 table")
}

impl MaterialRepository for CsvMaterialRepository {
    fn upsert(&self, material: Material) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("catalog mutex poisoned");
        match guard.iter_mut().find(|record| record.name == material.name) {
            Some(existing) => *existing = material,
            None => guard.push(material),
        }
        self.persist(&guard)
    }

    fn remove(&self, name: &str) -> Result<(), RepositoryError> {
        let mut guard = self.records.lock().expect("catalog mutex poisoned");
        let before = guard.len();
        guard.retain(|record| record.name != name);
        if guard.len() == before {
            return Err(RepositoryError::NotFound);
        }
        self.persist(&guard)
    }

    fn get(&self, name: &str) -> Result<Option<Material>, RepositoryError> {
        let guard = self.records.lock().expect("catalog mutex poisoned");
        Ok(guard.iter().find(|record| record.name == name).cloned())
    }

    fn list(&self) -> Result<Vec<Material>, RepositoryError> {
        let guard = self.records.lock().expect("catalog mutex poisoned");
        Ok(guard.clone())
    }
}
