use crate::workflows::signal;

use super::parser::StressStrainSeries;

/// Offset used for the proof-stress construction, in percent strain.
pub const YIELD_OFFSET_PERCENT: f64 = 0.2;
/// Elastic fit window, in percent strain.
const ELASTIC_STRAIN_LO: f64 = 0.05;
const ELASTIC_STRAIN_HI: f64 = 0.5;

/// Headline numbers extracted from a single stress-strain curve. Each metric
/// is independent: one failing leaves the others populated.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct CurveMetrics {
    /// Maximum stress observed anywhere on the curve, MPa.
    pub ultimate_strength_mpa: Option<f64>,
    /// Strain of the last recorded row, percent.
    pub elongation_at_break_pct: Option<f64>,
    /// 0.2% offset proof stress, MPa.
    pub yield_strength_mpa: Option<f64>,
    /// Slope of the elastic fit, MPa per percent strain.
    pub elastic_slope: Option<f64>,
}

pub fn compute(series: &StressStrainSeries) -> CurveMetrics {
    let points = series.points();
    let yield_point = offset_yield(&points);
    CurveMetrics {
        ultimate_strength_mpa: ultimate_strength(&points),
        elongation_at_break_pct: elongation_at_break(series),
        yield_strength_mpa: yield_point.map(|(_, stress)| stress),
        elastic_slope: elastic_fit(&points).map(|(_, slope)| slope),
    }
}

/// Maximum stress over the whole curve, not just before failure.
fn ultimate_strength(points: &[(f64, f64)]) -> Option<f64> {
    points
        .iter()
        .map(|&(_, stress)| stress)
        .fold(None, |max: Option<f64>, stress| {
            Some(max.map_or(stress, |m| m.max(stress)))
        })
}

/// Strain of the final recorded row, taken as the break elongation. A
/// malformed strain cell on that row leaves the metric absent.
fn elongation_at_break(series: &StressStrainSeries) -> Option<f64> {
    series.strain.last().copied().flatten()
}

/// Least-squares line through the elastic region. Prefers samples with
/// strain in [0.05, 0.5]%; falls back to the first 5% of points when the
/// window holds fewer than two samples.
fn elastic_fit(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    let window: Vec<(f64, f64)> = points
        .iter()
        .copied()
        .filter(|&(strain, _)| (ELASTIC_STRAIN_LO..=ELASTIC_STRAIN_HI).contains(&strain))
        .collect();

    let window = if window.len() >= 2 {
        window
    } else {
        let take = (points.len() / 20).max(2).min(points.len());
        points[..take].to_vec()
    };

    let xs: Vec<f64> = window.iter().map(|&(strain, _)| strain).collect();
    let ys: Vec<f64> = window.iter().map(|&(_, stress)| stress).collect();
    signal::linear_fit(&xs, &ys)
}

/// 0.2% offset proof stress: shift the elastic line right by 0.2% strain and
/// find where the measured curve first crosses it, interpolating between the
/// bracketing samples.
fn offset_yield(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    let (intercept, slope) = elastic_fit(points)?;
    if slope <= 0.0 {
        return None;
    }

    let offset_line = |strain: f64| intercept + slope * (strain - YIELD_OFFSET_PERCENT);

    let mut previous: Option<(f64, f64, f64)> = None;
    for &(strain, stress) in points {
        let residual = stress - offset_line(strain);
        if let Some((prev_strain, prev_stress, prev_residual)) = previous {
            if prev_residual > 0.0 && residual <= 0.0 {
                let span = prev_residual - residual;
                let t = if span.abs() < f64::EPSILON {
                    0.0
                } else {
                    prev_residual / span
                };
                let yield_strain = prev_strain + t * (strain - prev_strain);
                let yield_stress = prev_stress + t * (stress - prev_stress);
                return Some((yield_strain, yield_stress));
            }
        }
        previous = Some((strain, stress, residual));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn series(points: &[(f64, f64)]) -> StressStrainSeries {
        StressStrainSeries {
            strain_column: "Strain (%)".to_string(),
            stress_column: "Stress (MPa)".to_string(),
            strain: points.iter().map(|&(s, _)| Some(s)).collect(),
            stress: points.iter().map(|&(_, s)| Some(s)).collect(),
        }
    }

    /// Bilinear curve: elastic slope 100 MPa/% up to 1% strain, flat at
    /// 100 MPa afterwards. The offset line 100·(ε − 0.2) meets the plateau
    /// at 100 MPa.
    fn bilinear() -> StressStrainSeries {
        let mut points = Vec::new();
        for i in 0..=40 {
            let strain = i as f64 * 0.05;
            let stress = (strain * 100.0).min(100.0);
            points.push((strain, stress));
        }
        series(&points)
    }

    #[test]
    fn ultimate_strength_is_the_curve_maximum() {
        let metrics = compute(&series(&[(0.0, 0.0), (0.5, 80.0), (1.0, 60.0)]));
        assert_eq!(metrics.ultimate_strength_mpa, Some(80.0));
    }

    #[test]
    fn elongation_is_the_final_row_strain() {
        let metrics = compute(&series(&[(0.0, 0.0), (1.0, 50.0), (2.5, 40.0)]));
        assert_eq!(metrics.elongation_at_break_pct, Some(2.5));
    }

    #[test]
    fn malformed_final_strain_cell_leaves_elongation_absent() {
        let s = StressStrainSeries {
            strain_column: "Strain (%)".to_string(),
            stress_column: "Stress (MPa)".to_string(),
            strain: vec![Some(0.0), Some(1.0), Some(2.5), None],
            stress: vec![Some(0.0), Some(50.0), Some(40.0), Some(0.0)],
        };
        assert_eq!(compute(&s).elongation_at_break_pct, None);
    }

    #[test]
    fn offset_yield_on_a_bilinear_curve_hits_the_plateau() {
        let metrics = compute(&bilinear());
        let yield_strength = metrics.yield_strength_mpa.expect("yield found");
        assert!((yield_strength - 100.0).abs() < 1e-6, "{yield_strength}");
        let slope = metrics.elastic_slope.expect("slope fit");
        assert!((slope - 100.0).abs() < 1e-6);
    }

    #[test]
    fn purely_elastic_curves_have_no_yield() {
        let points: Vec<(f64, f64)> =
            (0..=20).map(|i| (i as f64 * 0.05, i as f64 * 5.0)).collect();
        let metrics = compute(&series(&points));
        assert_eq!(metrics.yield_strength_mpa, None);
        assert!(metrics.ultimate_strength_mpa.is_some());
    }

    #[test]
    fn empty_series_yields_empty_metrics() {
        let s = series(&[]);
        let metrics = compute(&s);
        assert_eq!(metrics.ultimate_strength_mpa, None);
        assert_eq!(metrics.elongation_at_break_pct, None);
        assert_eq!(metrics.yield_strength_mpa, None);
    }
}
