use std::io::Read;

use serde::{Deserialize, Serialize};

use super::domain::{Material, PropertyKind, RangeValue};

/// Failure to process a bulk import as a whole. Individual bad rows never
/// raise this; they are collected as [`RowError`]s instead.
#[derive(Debug, thiserror::Error)]
pub enum MaterialImportError {
    #[error("import table is missing the 'Name' column")]
    MissingNameColumn,
    #[error("unreadable import table: {0}")]
    Csv(#[from] csv::Error),
}

/// Per-row problem surfaced with the offending row number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowError {
    pub row: usize,
    pub reason: String,
}

/// Result of a bulk import: parsed records plus the rows that were skipped.
#[derive(Debug, Clone, Default)]
pub struct ImportOutcome {
    pub materials: Vec<Material>,
    pub row_errors: Vec<RowError>,
}

#[derive(Debug, Clone, Copy)]
enum Bound {
    Min,
    Max,
}

fn parse_property_header(header: &str) -> Option<(PropertyKind, Bound)> {
    let trimmed = header.trim();
    let lower = trimmed.to_ascii_lowercase();
    if let Some(label) = lower.strip_suffix(" min") {
        let label = &trimmed[..label.len()];
        return PropertyKind::from_label(label).map(|kind| (kind, Bound::Min));
    }
    if let Some(label) = lower.strip_suffix(" max") {
        let label = &trimmed[..label.len()];
        return PropertyKind::from_label(label).map(|kind| (kind, Bound::Max));
    }
    None
}

/// Parse a bulk-import table. The expected header shape is `Name` plus
/// `"<property> min"` / `"<property> max"` per known property, exactly as the
/// template emits it. Unknown columns are ignored; unparsable numeric cells
/// leave the property bound absent; a row without a name is skipped and
/// reported.
pub fn parse_csv<R: Read>(reader: R) -> Result<ImportOutcome, MaterialImportError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);

    let headers = csv_reader.headers()?.clone();
    let name_idx = headers
        .iter()
        .position(|header| header.trim().eq_ignore_ascii_case("name"))
        .ok_or(MaterialImportError::MissingNameColumn)?;

    let columns: Vec<(usize, PropertyKind, Bound)> = headers
        .iter()
        .enumerate()
        .filter_map(|(idx, header)| {
            parse_property_header(header).map(|(kind, bound)| (idx, kind, bound))
        })
        .collect();

    let mut outcome = ImportOutcome::default();

    for (row_number, record) in csv_reader.records().enumerate() {
        // Row 1 is the header; report data rows with their sheet position.
        let row = row_number + 2;
        let record = match record {
            Ok(record) => record,
            Err(err) => {
                outcome.row_errors.push(RowError {
                    row,
                    reason: err.to_string(),
                });
                continue;
            }
        };

        let name = record.get(name_idx).unwrap_or("").trim();
        if name.is_empty() {
            outcome.row_errors.push(RowError {
                row,
                reason: "missing material name".to_string(),
            });
            continue;
        }

        let mut material = Material::new(name);
        for kind in PropertyKind::ALL {
            let mut min = None;
            let mut max = None;
            for (idx, column_kind, bound) in &columns {
                if *column_kind != kind {
                    continue;
                }
                let cell = record.get(*idx).unwrap_or("").trim();
                let value = cell.parse::<f64>().ok();
                match bound {
                    Bound::Min => min = value,
                    Bound::Max => max = value,
                }
            }
            let range = match (min, max) {
                (Some(min), Some(max)) => Some(RangeValue::new(min, max)),
                // A single declared bound is taken as a point value.
                (Some(only), None) | (None, Some(only)) => Some(RangeValue::point(only)),
                (None, None) => None,
            };
            if let Some(range) = range {
                material.properties.insert(kind, range);
            }
        }

        outcome.materials.push(material);
    }

    Ok(outcome)
}

/// Emit the import template: a single header row in exactly the shape
/// [`parse_csv`] accepts.
pub fn template_csv() -> String {
    let mut fields = Vec::with_capacity(1 + PropertyKind::ALL.len() * 2);
    fields.push("Name".to_string());
    for kind in PropertyKind::ALL {
        fields.push(format!("{} min", kind.label()));
        fields.push(format!("{} max", kind.label()));
    }

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(&fields).expect("in-memory write");
    let bytes = writer.into_inner().expect("in-memory flush");
    String::from_utf8(bytes).expect("ascii/utf8 header")
}

/// Export the current catalog as a display table: one rendered column per
/// property, absent values as "N/A".
pub fn export_csv(materials: &[Material]) -> String {
    let mut writer = csv::Writer::from_writer(Vec::new());

    let mut header = Vec::with_capacity(1 + PropertyKind::ALL.len());
    header.push("Name".to_string());
    for kind in PropertyKind::ALL {
        header.push(kind.label().to_string());
    }
    writer.write_record(&header).expect("in-memory write");

    for material in materials {
        let mut row = Vec::with_capacity(header.len());
        row.push(material.name.clone());
        for kind in PropertyKind::ALL {
            row.push(
                material
                    .property(kind)
                    .map(|range| range.display())
                    .unwrap_or_else(|| "N/A".to_string()),
            );
        }
        writer.write_record(&row).expect("in-memory write");
    }

    let bytes = writer.into_inner().expect("in-memory flush");
    String::from_utf8(bytes).expect("utf8 table")
}
