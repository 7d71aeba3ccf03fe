//! End-to-end tensile curve analysis over raw instrument text, from the
//! header-marker scan through the derived strength metrics.

use labspace::workflows::tensile::{self, CurveError};

fn export_with_preamble(rows: &[(f64, f64)]) -> String {
    let mut raw = String::from(
        "Universal Tester 3400\n\
         Operator, lab\n\
         \n\
         Time measurement,Extension,Force,Strain 1,Strain 2,Stress\n",
    );
    for (i, (strain, stress)) in rows.iter().enumerate() {
        raw.push_str(&format!("{:.1},0.0,0.0,0.0,{strain},{stress}\n", i as f64 * 0.1));
    }
    raw
}

/// Elastic slope 200 MPa/% up to 0.8 % strain, then a flat 160 MPa plateau.
fn bilinear_rows() -> Vec<(f64, f64)> {
    (0..=60)
        .map(|i| {
            let strain = i as f64 * 0.04;
            let stress = (strain * 200.0).min(160.0);
            (strain, stress)
        })
        .collect()
}

#[test]
fn headline_metrics_come_straight_from_the_table() {
    let raw = export_with_preamble(&[(0.0, 0.0), (0.4, 55.0), (0.9, 83.5), (1.4, 70.0)]);
    let report = tensile::analyze("S-01", &raw).expect("analyzes");

    assert_eq!(report.strain_column, "Strain_2");
    assert_eq!(report.stress_column, "Stress_MPa");
    assert_eq!(report.point_count, 4);
    assert_eq!(report.metrics.ultimate_strength_mpa, Some(83.5));
    assert_eq!(report.metrics.elongation_at_break_pct, Some(1.4));
}

#[test]
fn offset_yield_is_interpolated_on_a_bilinear_curve() {
    let raw = export_with_preamble(&bilinear_rows());
    let report = tensile::analyze("S-02", &raw).expect("analyzes");

    // The 0.2 % offset line meets the plateau at the plateau stress.
    let yield_strength = report
        .metrics
        .yield_strength_mpa
        .expect("plateau crossing found");
    assert!((yield_strength - 160.0).abs() < 1e-6, "{yield_strength}");

    let slope = report.metrics.elastic_slope.expect("elastic fit");
    assert!((slope - 200.0).abs() < 1e-6);
}

#[test]
fn batch_analysis_isolates_bad_files() {
    let good = export_with_preamble(&[(0.0, 0.0), (0.5, 40.0)]);
    let results = tensile::analyze_batch([
        ("good.csv", good.as_str()),
        ("empty.csv", ""),
        ("no-table.csv", "a file with no data section\n"),
    ]);

    assert_eq!(results.len(), 3);
    assert!(results[0].1.is_ok());
    assert!(matches!(results[1].1, Err(CurveError::MarkerNotFound)));
    assert!(matches!(results[2].1, Err(CurveError::MarkerNotFound)));
}

#[test]
fn unresolvable_channels_fail_that_file_only() {
    let raw = "Time measurement,Extension,Force\n0.0,0.1,5.0\n";
    assert!(matches!(
        tensile::analyze("forceless", raw),
        Err(CurveError::ColumnUnresolved("strain"))
    ));
}
