use std::io::Cursor;

/// Literal marker line that opens the data table in the instrument export.
pub const HEADER_MARKER: &str = "Time measurement";

/// Per-file parse failure. Batch analysis reports these alongside the file's
/// identifier and keeps going.
#[derive(Debug, thiserror::Error)]
pub enum CurveError {
    #[error("no '{HEADER_MARKER}' marker line found")]
    MarkerNotFound,
    #[error("could not resolve a {0} column")]
    ColumnUnresolved(&'static str),
    #[error("data table is empty")]
    EmptyTable,
    #[error("unreadable data table: {0}")]
    Csv(#[from] csv::Error),
}

/// Device column names mapped to the standard set.
const RENAME_MAP: [(&str, &str); 6] = [
    ("Time measurement", "Time_s"),
    ("Extension", "Extension_mm"),
    ("Force", "Force_N"),
    ("Strain 1", "Strain_1"),
    ("Strain 2", "Strain_2"),
    ("Stress", "Stress_MPa"),
];

/// Parsed table: named columns over rows of numeric cells, invalid entries
/// kept as missing. No cleaning or outlier removal happens here; values are
/// used exactly as read.
#[derive(Debug, Clone)]
pub struct CurveTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Option<f64>>>,
}

impl CurveTable {
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    pub fn column(&self, idx: usize) -> Vec<Option<f64>> {
        self.rows
            .iter()
            .map(|row| row.get(idx).copied().flatten())
            .collect()
    }
}

/// Scan for the marker line and parse the remainder as a delimited table.
/// The marker line itself is the header row; if the first data row repeats
/// the header it is promoted to column names and dropped.
pub fn parse(raw: &str) -> Result<CurveTable, CurveError> {
    let start = raw
        .lines()
        .position(|line| line.contains(HEADER_MARKER))
        .ok_or(CurveError::MarkerNotFound)?;

    let table_text: String = raw
        .lines()
        .skip(start)
        .map(|line| format!("{line}\n"))
        .collect();

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(Cursor::new(table_text));

    let mut columns: Vec<String> = reader
        .headers()?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut raw_rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        raw_rows.push(record.iter().map(|cell| cell.trim().to_string()).collect());
    }

    // Some device exports repeat the header as the first data row.
    if let Some(first) = raw_rows.first() {
        if first
            .iter()
            .any(|cell| cell.eq_ignore_ascii_case(HEADER_MARKER))
        {
            columns = first.clone();
            raw_rows.remove(0);
        }
    }

    for column in &mut columns {
        if let Some((_, standard)) = RENAME_MAP
            .iter()
            .find(|(device, _)| device.eq_ignore_ascii_case(column))
        {
            *column = (*standard).to_string();
        }
    }

    if raw_rows.is_empty() {
        return Err(CurveError::EmptyTable);
    }

    let rows = raw_rows
        .into_iter()
        .map(|row| row.iter().map(|cell| cell.parse::<f64>().ok()).collect())
        .collect();

    Ok(CurveTable { columns, rows })
}

/// Ordered candidate matchers for the plotted strain column: exact display
/// name, then the standard device name, then any name containing "strain".
pub fn resolve_strain_column(table: &CurveTable) -> Option<usize> {
    table
        .column_index("Strain (%)")
        .or_else(|| table.column_index("Strain_2"))
        .or_else(|| {
            table
                .columns
                .iter()
                .position(|c| c.to_ascii_lowercase().contains("strain"))
        })
}

/// Stress column resolution mirrors the strain matchers, preferring a column
/// mentioning "MPa" when several names contain "stress".
pub fn resolve_stress_column(table: &CurveTable) -> Option<usize> {
    if let Some(idx) = table
        .column_index("Stress (MPa)")
        .or_else(|| table.column_index("Stress_MPa"))
    {
        return Some(idx);
    }

    let stress_columns: Vec<usize> = table
        .columns
        .iter()
        .enumerate()
        .filter(|(_, c)| c.to_ascii_lowercase().contains("stress"))
        .map(|(idx, _)| idx)
        .collect();

    stress_columns
        .iter()
        .copied()
        .find(|&idx| table.columns[idx].to_ascii_lowercase().contains("mpa"))
        .or_else(|| stress_columns.first().copied())
}

/// The two-column stress-strain series the metrics operate on.
#[derive(Debug, Clone)]
pub struct StressStrainSeries {
    pub strain_column: String,
    pub stress_column: String,
    /// Per-row values, missing where the source cell was not numeric.
    pub strain: Vec<Option<f64>>,
    pub stress: Vec<Option<f64>>,
}

impl StressStrainSeries {
    /// Rows where both channels are present, in order.
    pub fn points(&self) -> Vec<(f64, f64)> {
        self.strain
            .iter()
            .zip(&self.stress)
            .filter_map(|(strain, stress)| Some(((*strain)?, (*stress)?)))
            .collect()
    }
}

/// Resolve the plotted columns of a parsed table.
pub fn extract_series(table: &CurveTable) -> Result<StressStrainSeries, CurveError> {
    let strain_idx =
        resolve_strain_column(table).ok_or(CurveError::ColumnUnresolved("strain"))?;
    let stress_idx =
        resolve_stress_column(table).ok_or(CurveError::ColumnUnresolved("stress"))?;

    Ok(StressStrainSeries {
        strain_column: table.columns[strain_idx].clone(),
        stress_column: table.columns[stress_idx].clone(),
        strain: table.column(strain_idx),
        stress: table.column(stress_idx),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Device: UTM-2000
Operator: lab

Time measurement,Extension,Force,Strain 1,Strain 2,Stress
0.0,0.00,0.0,0.00,0.00,0.0
0.1,0.02,12.0,0.05,0.05,12.5
0.2,0.04,30.0,0.10,0.11,30.2
";

    #[test]
    fn parser_skips_preamble_and_renames_columns() {
        let table = parse(SAMPLE).expect("parses");
        assert_eq!(
            table.columns,
            ["Time_s", "Extension_mm", "Force_N", "Strain_1", "Strain_2", "Stress_MPa"]
        );
        assert_eq!(table.rows.len(), 3);
        assert_eq!(table.rows[2][5], Some(30.2));
    }

    #[test]
    fn repeated_header_row_is_promoted_and_dropped() {
        let raw = "\
preamble
Time measurement,col,col,col,col,col
Time measurement,Extension,Force,Strain 1,Strain 2,Stress
0.0,0.0,0.0,0.0,0.5,10.0
";
        let table = parse(raw).expect("parses");
        assert_eq!(table.columns[4], "Strain_2");
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0][4], Some(0.5));
    }

    #[test]
    fn missing_marker_is_reported() {
        assert!(matches!(
            parse("just,a,csv\n1,2,3\n"),
            Err(CurveError::MarkerNotFound)
        ));
    }

    #[test]
    fn invalid_cells_become_missing() {
        let raw = "Time measurement,Stress,Strain 2\n0.0,oops,0.1\n0.1,20.0,0.2\n";
        let table = parse(raw).expect("parses");
        assert_eq!(table.rows[0][1], None);
        assert_eq!(table.rows[1][1], Some(20.0));
    }

    #[test]
    fn column_matchers_fall_back_by_substring() {
        let raw = "Time measurement,Eng. strain [%],Eng. stress [MPa],True stress\n0.0,0.1,5.0,5.1\n";
        let table = parse(raw).expect("parses");
        let series = extract_series(&table).expect("resolves");
        assert_eq!(series.strain_column, "Eng. strain [%]");
        // Prefers the column mentioning MPa over the other stress column.
        assert_eq!(series.stress_column, "Eng. stress [MPa]");
    }

    #[test]
    fn unresolvable_columns_fail_per_file() {
        let raw = "Time measurement,Extension,Force\n0.0,0.1,0.2\n";
        let table = parse(raw).expect("parses");
        assert!(matches!(
            extract_series(&table),
            Err(CurveError::ColumnUnresolved("strain"))
        ));
    }
}
