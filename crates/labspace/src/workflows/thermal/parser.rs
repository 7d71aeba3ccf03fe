use crate::workflows::signal;

/// Fixed preamble length of the known instrument export format. Files whose
/// header is shorter fall back to scanning for the first data triple.
pub const HEADER_SKIP_LINES: usize = 56;

/// Minimum samples required before any event analysis is attempted.
pub const MIN_SAMPLES: usize = 5;

/// Minimum series length before the regression heating-rate fallback runs.
const RATE_REGRESSION_MIN_SAMPLES: usize = 50;

#[derive(Debug, thiserror::Error)]
pub enum DscError {
    #[error("no data triples found in file")]
    NoSamples,
    #[error("only {samples} samples, at least {MIN_SAMPLES} required")]
    TooShort { samples: usize },
    #[error("sample mass unknown: not in the header and not supplied")]
    MassUnknown,
    #[error("heating rate unknown: not in the header, not supplied, and too few samples to estimate")]
    RateUnknown,
}

/// One reading of the calorimeter: whitespace-separated triple of time,
/// temperature, and heat flow.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize)]
pub struct ThermalSample {
    pub time_min: f64,
    pub temperature_c: f64,
    pub heat_flow_mw: f64,
}

/// Parsed curve plus whatever the free-text header disclosed.
#[derive(Debug, Clone)]
pub struct DscCurve {
    pub samples: Vec<ThermalSample>,
    /// Sample mass in mg, when a header line stated it.
    pub header_mass_mg: Option<f64>,
    /// Heating rate in °C/min, when a header line stated it.
    pub header_rate_c_per_min: Option<f64>,
}

impl DscCurve {
    pub fn times(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.time_min).collect()
    }

    pub fn temperatures(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.temperature_c).collect()
    }

    pub fn heat_flows(&self) -> Vec<f64> {
        self.samples.iter().map(|s| s.heat_flow_mw).collect()
    }

    /// Heating rate estimated from the opening ramp: slope of the regression
    /// of temperature against time over the first 10% of samples. Needs a
    /// reasonably long series to be trustworthy.
    pub fn estimated_rate_c_per_min(&self) -> Option<f64> {
        if self.samples.len() < RATE_REGRESSION_MIN_SAMPLES {
            return None;
        }
        let take = (self.samples.len() / 10).max(RATE_REGRESSION_MIN_SAMPLES);
        let take = take.min(self.samples.len());
        let ts: Vec<f64> = self.samples[..take].iter().map(|s| s.time_min).collect();
        let temps: Vec<f64> = self.samples[..take]
            .iter()
            .map(|s| s.temperature_c)
            .collect();
        signal::linear_fit(&ts, &temps).map(|(_, slope)| slope)
    }
}

/// Parse a raw instrument text export. Data rows are lines splitting into
/// exactly three numeric tokens; everything above the first one is header.
/// The known format puts the table after a 56-line preamble, so parsing
/// starts there and rewinds to a full scan when that position yields nothing.
pub fn parse(raw: &str) -> Result<DscCurve, DscError> {
    let lines: Vec<&str> = raw.lines().collect();

    let mut samples = collect_samples(&lines, HEADER_SKIP_LINES.min(lines.len()));
    let mut data_start = HEADER_SKIP_LINES.min(lines.len());
    if samples.is_empty() {
        data_start = lines
            .iter()
            .position(|line| parse_triple(line).is_some())
            .ok_or(DscError::NoSamples)?;
        samples = collect_samples(&lines, data_start);
    }
    if samples.is_empty() {
        return Err(DscError::NoSamples);
    }

    let header = &lines[..data_start];
    Ok(DscCurve {
        samples,
        header_mass_mg: find_header_value(header, &["mass", "weight"]),
        header_rate_c_per_min: find_header_value(header, &["rate"]),
    })
}

fn collect_samples(lines: &[&str], from: usize) -> Vec<ThermalSample> {
    lines[from..]
        .iter()
        .filter_map(|line| parse_triple(line))
        .collect()
}

fn parse_triple(line: &str) -> Option<ThermalSample> {
    let mut tokens = line.split_whitespace();
    let time_min = tokens.next()?.parse().ok()?;
    let temperature_c = tokens.next()?.parse().ok()?;
    let heat_flow_mw = tokens.next()?.parse().ok()?;
    if tokens.next().is_some() {
        return None;
    }
    Some(ThermalSample {
        time_min,
        temperature_c,
        heat_flow_mw,
    })
}

/// First number on the first header line mentioning any of the keywords.
fn find_header_value(header: &[&str], keywords: &[&str]) -> Option<f64> {
    header.iter().find_map(|line| {
        let lower = line.to_ascii_lowercase();
        if keywords.iter().any(|k| lower.contains(k)) {
            first_number(line)
        } else {
            None
        }
    })
}

fn first_number(line: &str) -> Option<f64> {
    line.split_whitespace().find_map(|token| {
        let trimmed = token.trim_matches(|c: char| !c.is_ascii_digit() && c != '.' && c != '-');
        if trimmed.is_empty() {
            None
        } else {
            trimmed.parse::<f64>().ok()
        }
    })
}
