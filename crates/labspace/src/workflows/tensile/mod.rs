//! Tensile-test curve analysis: parse raw universal-testing-machine exports,
//! resolve the stress-strain channels, and derive the headline metrics
//! (ultimate strength, break elongation, 0.2% offset yield).

pub mod metrics;
pub mod parser;

pub use metrics::{CurveMetrics, YIELD_OFFSET_PERCENT};
pub use parser::{CurveError, CurveTable, StressStrainSeries, HEADER_MARKER};

/// Full analysis result for one specimen file.
#[derive(Debug, Clone, serde::Serialize)]
pub struct TensileReport {
    /// Caller-supplied identifier, usually the file name.
    pub specimen: String,
    pub strain_column: String,
    pub stress_column: String,
    /// Rows carrying both channels.
    pub point_count: usize,
    pub metrics: CurveMetrics,
}

/// Parse and analyze a single raw export.
pub fn analyze(specimen: &str, raw: &str) -> Result<TensileReport, CurveError> {
    let table = parser::parse(raw)?;
    let series = parser::extract_series(&table)?;
    let metrics = metrics::compute(&series);

    tracing::info!(
        specimen,
        points = series.points().len(),
        uts = ?metrics.ultimate_strength_mpa,
        "tensile curve analyzed"
    );

    Ok(TensileReport {
        specimen: specimen.to_string(),
        strain_column: series.strain_column.clone(),
        stress_column: series.stress_column.clone(),
        point_count: series.points().len(),
        metrics,
    })
}

/// Analyze a batch of exports. Each file succeeds or fails on its own; one
/// malformed upload never sinks the rest of the batch.
pub fn analyze_batch<'a, I>(files: I) -> Vec<(String, Result<TensileReport, CurveError>)>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    files
        .into_iter()
        .map(|(specimen, raw)| (specimen.to_string(), analyze(specimen, raw)))
        .collect()
}
