use std::ops::Range;

use crate::workflows::signal;

use super::parser::ThermalSample;

/// Slope threshold separating a ramp from an isothermal hold, °C/min.
pub const RAMP_SLOPE_THRESHOLD: f64 = 0.5;

/// Runs at or below this length are treated as transition noise and dropped.
pub const MIN_RUN_SAMPLES: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub enum SegmentLabel {
    Heating1,
    Cooling,
    Heating2,
}

impl SegmentLabel {
    pub fn as_str(self) -> &'static str {
        match self {
            SegmentLabel::Heating1 => "Heating 1",
            SegmentLabel::Cooling => "Cooling",
            SegmentLabel::Heating2 => "Heating 2",
        }
    }

    pub fn is_heating(self) -> bool {
        matches!(self, SegmentLabel::Heating1 | SegmentLabel::Heating2)
    }
}

/// Contiguous slice of the sample sequence with one dominant slope sign.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThermalSegment {
    pub label: SegmentLabel,
    pub range: Range<usize>,
}

/// Split a thermal cycle into its ramps. Per-sample slope of temperature
/// against time classifies each reading as heating, cooling, or isothermal;
/// isothermal stretches inherit the nearest ramp classification (forward-fill
/// then backward-fill) so every sample lands in a run. Runs longer than
/// [`MIN_RUN_SAMPLES`] become segments, labelled in cycle order: the first
/// heating run, the first cooling run, and a second heating run if present.
/// Further runs are ignored.
pub fn segment(samples: &[ThermalSample]) -> Vec<ThermalSegment> {
    if samples.len() < 2 {
        return Vec::new();
    }

    let times: Vec<f64> = samples.iter().map(|s| s.time_min).collect();
    let temps: Vec<f64> = samples.iter().map(|s| s.temperature_c).collect();
    let slopes = signal::gradient(&temps, &times);

    let mut classes: Vec<i8> = slopes
        .iter()
        .map(|&slope| {
            if slope > RAMP_SLOPE_THRESHOLD {
                1
            } else if slope < -RAMP_SLOPE_THRESHOLD {
                -1
            } else {
                0
            }
        })
        .collect();

    let mut last = 0;
    for class in classes.iter_mut() {
        if *class == 0 {
            *class = last;
        } else {
            last = *class;
        }
    }
    let mut next = 0;
    for class in classes.iter_mut().rev() {
        if *class == 0 {
            *class = next;
        } else {
            next = *class;
        }
    }

    let mut runs: Vec<(i8, Range<usize>)> = Vec::new();
    let mut start = 0;
    for i in 1..=classes.len() {
        if i == classes.len() || classes[i] != classes[start] {
            runs.push((classes[start], start..i));
            start = i;
        }
    }

    let mut segments = Vec::new();
    let mut heating_seen = 0;
    let mut cooling_seen = false;
    for (class, range) in runs {
        if range.len() <= MIN_RUN_SAMPLES {
            continue;
        }
        let label = match class {
            1 if heating_seen == 0 => {
                heating_seen += 1;
                SegmentLabel::Heating1
            }
            1 if heating_seen == 1 => {
                heating_seen += 1;
                SegmentLabel::Heating2
            }
            -1 if !cooling_seen => {
                cooling_seen = true;
                SegmentLabel::Cooling
            }
            _ => continue,
        };
        segments.push(ThermalSegment { label, range });
    }
    segments
}
