//! Metadata records for uploaded instrument files. Each curve library
//! (tensile, DSC) keeps one collection of these; the file content itself is
//! held by the caller alongside the record.

use std::sync::Mutex;

use chrono::{DateTime, Utc};

/// One uploaded file. `stored_name` is the sanitized on-disk identifier and
/// the collection key; `display_name` is what the uploader typed.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct FileRecord {
    pub stored_name: String,
    pub original_name: String,
    pub display_name: String,
    pub uploaded_by: String,
    pub uploaded_at: DateTime<Utc>,
}

impl FileRecord {
    /// Build a record for a fresh upload, stamping the current time. An empty
    /// display name falls back to the original file name.
    pub fn new(original_name: &str, display_name: &str, uploaded_by: &str) -> Self {
        let display = display_name.trim();
        Self {
            stored_name: safe_filename(original_name),
            original_name: original_name.to_string(),
            display_name: if display.is_empty() {
                original_name.to_string()
            } else {
                display.to_string()
            },
            uploaded_by: uploaded_by.to_string(),
            uploaded_at: Utc::now(),
        }
    }
}

/// Reduce an arbitrary upload name to a portable file name: path components
/// stripped, anything outside `[A-Za-z0-9._-]` replaced with `_`, empty
/// results named "upload".
pub fn safe_filename(name: &str) -> String {
    let base = name
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or(name);
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let trimmed = cleaned.trim_matches('.');
    if trimmed.is_empty() {
        "upload".to_string()
    } else {
        trimmed.to_string()
    }
}

#[derive(Debug, thiserror::Error)]
pub enum LibraryError {
    #[error("no record named '{0}'")]
    NotFound(String),
    #[error("library unavailable: {0}")]
    Unavailable(String),
}

/// Record collection for one curve library. Uploads with an existing stored
/// name replace the previous record; listing preserves upload order.
pub trait FileLibrary: Send + Sync {
    fn save(&self, record: FileRecord) -> Result<(), LibraryError>;
    fn remove(&self, stored_name: &str) -> Result<FileRecord, LibraryError>;
    fn get(&self, stored_name: &str) -> Result<FileRecord, LibraryError>;
    fn list(&self) -> Result<Vec<FileRecord>, LibraryError>;
}

#[derive(Debug, Default)]
pub struct InMemoryFileLibrary {
    records: Mutex<Vec<FileRecord>>,
}

impl InMemoryFileLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Vec<FileRecord>>, LibraryError> {
        self.records
            .lock()
            .map_err(|_| LibraryError::Unavailable("record store poisoned".to_string()))
    }
}

impl FileLibrary for InMemoryFileLibrary {
    fn save(&self, record: FileRecord) -> Result<(), LibraryError> {
        let mut records = self.lock()?;
        if let Some(existing) = records
            .iter_mut()
            .find(|r| r.stored_name == record.stored_name)
        {
            *existing = record;
        } else {
            records.push(record);
        }
        Ok(())
    }

    fn remove(&self, stored_name: &str) -> Result<FileRecord, LibraryError> {
        let mut records = self.lock()?;
        let position = records
            .iter()
            .position(|r| r.stored_name == stored_name)
            .ok_or_else(|| LibraryError::NotFound(stored_name.to_string()))?;
        Ok(records.remove(position))
    }

    fn get(&self, stored_name: &str) -> Result<FileRecord, LibraryError> {
        let records = self.lock()?;
        records
            .iter()
            .find(|r| r.stored_name == stored_name)
            .cloned()
            .ok_or_else(|| LibraryError::NotFound(stored_name.to_string()))
    }

    fn list(&self) -> Result<Vec<FileRecord>, LibraryError> {
        Ok(self.lock()?.clone())
    }
}
