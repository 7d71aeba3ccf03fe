use crate::workflows::signal::{self, PeakParams};

use super::segmentation::{SegmentLabel, ThermalSegment};

/// Peak detection parameters shared by the Tc/Tm searches.
pub const PEAK_PARAMS: PeakParams = PeakParams {
    min_prominence: 0.01,
    min_distance: 50,
};

/// Event search windows, °C.
pub const TG_WINDOW: (f64, f64) = (80.0, 200.0);
pub const TC_WINDOW: (f64, f64) = (200.0, 360.0);
pub const TM_WINDOW: (f64, f64) = (330.0, 420.0);
/// Enthalpy integration windows, °C.
pub const DHCC_WINDOW: (f64, f64) = (80.0, 330.0);
pub const DHC_WINDOW: (f64, f64) = TC_WINDOW;
pub const DHM_WINDOW: (f64, f64) = TM_WINDOW;

/// Orientation of the heat-flow axis. The analysis is written exotherm-up;
/// exotherm-down inputs are negated on entry so one code path serves both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
pub enum ExothermDirection {
    #[default]
    Up,
    Down,
}

impl ExothermDirection {
    pub fn orient(self, heat_flow: &[f64]) -> Vec<f64> {
        match self {
            ExothermDirection::Up => heat_flow.to_vec(),
            ExothermDirection::Down => heat_flow.iter().map(|v| -v).collect(),
        }
    }
}

/// Polymer families with a tabulated reference enthalpy of fusion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum PolymerClass {
    Pekk,
    Peek,
    Pps,
    Pesu,
}

impl PolymerClass {
    /// ΔH°fus of the fully crystalline polymer, J/g. Amorphous PESU has none,
    /// so crystallinity is not computable for it.
    pub fn fusion_enthalpy_j_per_g(self) -> Option<f64> {
        match self {
            PolymerClass::Pekk | PolymerClass::Peek => Some(130.0),
            PolymerClass::Pps => Some(79.0),
            PolymerClass::Pesu => None,
        }
    }
}

/// Events extracted from one segment. Every field is optional: a transition
/// that does not occur inside its window is simply absent.
#[derive(Debug, Clone, Copy, Default, PartialEq, serde::Serialize)]
pub struct ThermalEvents {
    pub tg_c: Option<f64>,
    pub tc_c: Option<f64>,
    pub tm_c: Option<f64>,
    pub enthalpy_cold_cryst_j_per_g: Option<f64>,
    pub enthalpy_cryst_j_per_g: Option<f64>,
    pub enthalpy_melt_j_per_g: Option<f64>,
    pub crystallinity_pct: Option<f64>,
}

/// Per-segment event extraction over the smoothed, exotherm-up oriented heat
/// flow. `beta_c_per_s` is the ramp rate in °C/s and `mass_g` the sample mass
/// in grams; both scale the enthalpy integrals.
pub struct EventDetector<'a> {
    pub temperatures: &'a [f64],
    pub smoothed_heat_flow: &'a [f64],
    pub beta_c_per_s: f64,
    pub mass_g: f64,
}

impl EventDetector<'_> {
    /// All events applicable to the segment's phase. `with_cold_cryst` admits
    /// the cold-crystallization exotherm, which only a first heating of an
    /// amorphous-quenched sample exhibits.
    pub fn detect(
        &self,
        segment: &ThermalSegment,
        polymer: Option<PolymerClass>,
        with_cold_cryst: bool,
    ) -> ThermalEvents {
        let mut events = ThermalEvents::default();
        match segment.label {
            SegmentLabel::Heating1 | SegmentLabel::Heating2 => {
                events.tg_c = self.glass_transition(segment);
                events.tm_c = self.melting_peak(segment);
                if with_cold_cryst && segment.label == SegmentLabel::Heating1 {
                    events.enthalpy_cold_cryst_j_per_g = self.enthalpy(segment, DHCC_WINDOW);
                }
                // Endotherm integrates negative on an exotherm-up axis.
                events.enthalpy_melt_j_per_g =
                    self.enthalpy(segment, DHM_WINDOW).map(|dh| -dh);
                events.crystallinity_pct = crystallinity(
                    events.enthalpy_melt_j_per_g,
                    events.enthalpy_cold_cryst_j_per_g,
                    polymer,
                );
            }
            SegmentLabel::Cooling => {
                events.tc_c = self.crystallization_peak(segment);
                events.enthalpy_cryst_j_per_g = self.enthalpy(segment, DHC_WINDOW);
            }
        }
        events
    }

    /// Tg: temperature of the steepest change of heat flow inside the window.
    fn glass_transition(&self, segment: &ThermalSegment) -> Option<f64> {
        let temps = &self.temperatures[segment.range.clone()];
        let flows = &self.smoothed_heat_flow[segment.range.clone()];
        let gradient = signal::gradient(flows, temps);

        let (lo, hi) = TG_WINDOW;
        temps
            .iter()
            .zip(&gradient)
            .filter(|(&t, _)| t >= lo && t <= hi)
            .max_by(|(_, a), (_, b)| {
                a.abs()
                    .partial_cmp(&b.abs())
                    .unwrap_or(std::cmp::Ordering::Equal)
            })
            .map(|(&t, _)| t)
    }

    /// Tc: first exothermic peak inside the window.
    fn crystallization_peak(&self, segment: &ThermalSegment) -> Option<f64> {
        self.first_peak(segment, TC_WINDOW, 1.0)
    }

    /// Tm: first endothermic peak inside the window, found on the negated
    /// signal.
    fn melting_peak(&self, segment: &ThermalSegment) -> Option<f64> {
        self.first_peak(segment, TM_WINDOW, -1.0)
    }

    fn first_peak(&self, segment: &ThermalSegment, window: (f64, f64), sign: f64) -> Option<f64> {
        let (lo, hi) = window;
        let indices: Vec<usize> = segment
            .range
            .clone()
            .filter(|&i| self.temperatures[i] >= lo && self.temperatures[i] <= hi)
            .collect();
        if indices.is_empty() {
            return None;
        }
        let values: Vec<f64> = indices
            .iter()
            .map(|&i| sign * self.smoothed_heat_flow[i])
            .collect();
        let peaks = signal::find_peaks(&values, PEAK_PARAMS);
        peaks.first().map(|&p| self.temperatures[indices[p]])
    }

    /// Baseline-corrected integral of heat flow over temperature inside the
    /// window: join the window endpoints with a straight line, subtract it,
    /// integrate, then convert mW·°C to J/g via the ramp rate and mass.
    fn enthalpy(&self, segment: &ThermalSegment, window: (f64, f64)) -> Option<f64> {
        if self.beta_c_per_s <= 0.0 || self.mass_g <= 0.0 {
            return None;
        }
        let (lo, hi) = window;
        let indices: Vec<usize> = segment
            .range
            .clone()
            .filter(|&i| self.temperatures[i] >= lo && self.temperatures[i] <= hi)
            .collect();
        if indices.len() < 3 {
            return None;
        }

        let temps: Vec<f64> = indices.iter().map(|&i| self.temperatures[i]).collect();
        let flows: Vec<f64> = indices.iter().map(|&i| self.smoothed_heat_flow[i]).collect();

        let t0 = temps[0];
        let t1 = temps[temps.len() - 1];
        let y0 = flows[0];
        let y1 = flows[flows.len() - 1];
        let span = t1 - t0;
        let corrected: Vec<f64> = temps
            .iter()
            .zip(&flows)
            .map(|(&t, &y)| {
                let baseline = if span.abs() < f64::EPSILON {
                    y0
                } else {
                    y0 + (y1 - y0) * (t - t0) / span
                };
                y - baseline
            })
            .collect();

        // Integrate in the ascending-temperature direction; cooling segments
        // sweep the window downward and would otherwise flip the sign.
        let mut area_mj = signal::trapezoid(&corrected, &temps) / self.beta_c_per_s;
        if t1 < t0 {
            area_mj = -area_mj;
        }
        Some(area_mj / 1000.0 / self.mass_g)
    }
}

/// Degree of crystallinity from the melting and cold-crystallization
/// enthalpies, relative to the polymer's fully crystalline reference.
pub fn crystallinity(
    melt_j_per_g: Option<f64>,
    cold_cryst_j_per_g: Option<f64>,
    polymer: Option<PolymerClass>,
) -> Option<f64> {
    let reference = polymer?.fusion_enthalpy_j_per_g()?;
    let melt = melt_j_per_g?;
    let cold = cold_cryst_j_per_g.unwrap_or(0.0);
    Some((melt - cold) / reference * 100.0)
}
