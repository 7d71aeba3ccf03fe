//! DSC curve analysis: parse raw calorimeter exports, segment the thermal
//! cycle into its ramps, and extract the transition events (Tg, Tc, Tm,
//! enthalpies, crystallinity) per segment.
//!
//! Heat flow is treated exotherm-up throughout: crystallization exotherms
//! point up, melting endotherms point down, and melting enthalpies are
//! negated so they report positive. Exotherm-down inputs are flipped on
//! entry via [`ExothermDirection`].

pub mod events;
pub mod parser;
pub mod segmentation;

pub use events::{ExothermDirection, PolymerClass, ThermalEvents};
pub use parser::{DscCurve, DscError, ThermalSample};
pub use segmentation::{SegmentLabel, ThermalSegment};

use crate::workflows::signal;

/// Analysis knobs. Mass and heating rate fall back to the file header and,
/// for the rate, to a regression over the opening ramp.
#[derive(Debug, Clone, Copy, serde::Deserialize)]
pub struct DscConfig {
    /// Sample mass in mg; overrides the header value.
    #[serde(default)]
    pub sample_mass_mg: Option<f64>,
    /// Ramp rate in °C/min; overrides the header value.
    #[serde(default)]
    pub heating_rate_c_per_min: Option<f64>,
    #[serde(default)]
    pub exotherm: ExothermDirection,
    #[serde(default)]
    pub polymer: Option<PolymerClass>,
    /// Whether the first heating is an amorphous-quenched run exhibiting
    /// cold crystallization. Off by default; the exotherm window overlaps
    /// the melting window, so it must be asked for.
    #[serde(default)]
    pub first_heating_cold_cryst: bool,
}

impl Default for DscConfig {
    fn default() -> Self {
        Self {
            sample_mass_mg: None,
            heating_rate_c_per_min: None,
            exotherm: ExothermDirection::Up,
            polymer: None,
            first_heating_cold_cryst: false,
        }
    }
}

/// Events of one labelled segment.
#[derive(Debug, Clone, serde::Serialize)]
pub struct SegmentReport {
    pub label: &'static str,
    pub sample_count: usize,
    pub temperature_start_c: f64,
    pub temperature_end_c: f64,
    pub events: ThermalEvents,
}

/// Full analysis result for one DSC file.
#[derive(Debug, Clone, serde::Serialize)]
pub struct ThermalReport {
    pub specimen: String,
    pub sample_count: usize,
    pub sample_mass_mg: f64,
    pub heating_rate_c_per_min: f64,
    pub segments: Vec<SegmentReport>,
}

/// Parse and analyze a raw DSC export end to end.
pub fn analyze(specimen: &str, raw: &str, config: &DscConfig) -> Result<ThermalReport, DscError> {
    let curve = parser::parse(raw)?;
    analyze_curve(specimen, &curve, config)
}

/// Analyze an already-parsed curve.
pub fn analyze_curve(
    specimen: &str,
    curve: &DscCurve,
    config: &DscConfig,
) -> Result<ThermalReport, DscError> {
    if curve.samples.len() < parser::MIN_SAMPLES {
        return Err(DscError::TooShort {
            samples: curve.samples.len(),
        });
    }

    let mass_mg = config
        .sample_mass_mg
        .or(curve.header_mass_mg)
        .ok_or(DscError::MassUnknown)?;
    let rate = config
        .heating_rate_c_per_min
        .or(curve.header_rate_c_per_min)
        .or_else(|| curve.estimated_rate_c_per_min().map(f64::abs))
        .ok_or(DscError::RateUnknown)?;

    let temperatures = curve.temperatures();
    let oriented = config.exotherm.orient(&curve.heat_flows());
    let smoothed = signal::savgol_filter(
        &oriented,
        signal::DEFAULT_SMOOTH_WINDOW,
        signal::DEFAULT_SMOOTH_ORDER,
    );

    let detector = events::EventDetector {
        temperatures: &temperatures,
        smoothed_heat_flow: &smoothed,
        beta_c_per_s: rate / 60.0,
        mass_g: mass_mg / 1000.0,
    };

    let segments: Vec<SegmentReport> = segmentation::segment(&curve.samples)
        .iter()
        .map(|segment| SegmentReport {
            label: segment.label.as_str(),
            sample_count: segment.range.len(),
            temperature_start_c: temperatures[segment.range.start],
            temperature_end_c: temperatures[segment.range.end - 1],
            events: detector.detect(segment, config.polymer, config.first_heating_cold_cryst),
        })
        .collect();

    tracing::info!(
        specimen,
        samples = curve.samples.len(),
        segments = segments.len(),
        mass_mg,
        rate,
        "dsc curve analyzed"
    );

    Ok(ThermalReport {
        specimen: specimen.to_string(),
        sample_count: curve.samples.len(),
        sample_mass_mg: mass_mg,
        heating_rate_c_per_min: rate,
        segments,
    })
}

/// Analyze a batch of exports, each succeeding or failing on its own.
pub fn analyze_batch<'a, I>(
    files: I,
    config: &DscConfig,
) -> Vec<(String, Result<ThermalReport, DscError>)>
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    files
        .into_iter()
        .map(|(specimen, raw)| (specimen.to_string(), analyze(specimen, raw, config)))
        .collect()
}
