//! End-to-end DSC analysis over a synthetic three-ramp cycle: segmentation
//! into Heating 1 / Cooling / Heating 2, event windows, enthalpy signs, and
//! crystallinity.

use labspace::workflows::thermal::{self, DscConfig, PolymerClass};

const RATE_C_PER_MIN: f64 = 10.0;
const STEP_C: f64 = 0.05;
const MASS_MG: f64 = 5.0;

fn gaussian(t: f64, center: f64, width: f64, height: f64) -> f64 {
    height * (-((t - center) / width).powi(2)).exp()
}

/// Heat flow of a semi-crystalline heating ramp on an exotherm-up axis: a
/// glass-transition step near 160 °C and a melting endotherm at 370 °C.
fn heating_flow(temperature: f64) -> f64 {
    let step = -0.5 / (1.0 + (-(temperature - 160.0) / 2.0).exp());
    step - gaussian(temperature, 370.0, 6.0, 2.0)
}

/// Cooling ramp with the crystallization exotherm at 290 °C.
fn cooling_flow(temperature: f64) -> f64 {
    gaussian(temperature, 290.0, 6.0, 1.5)
}

/// Full synthetic export: a 56-line instrument preamble (with mass and rate
/// lines) followed by whitespace triples for heat / cool / heat ramps
/// between 25 and 450 °C.
fn synthetic_export() -> String {
    let mut raw = String::new();
    raw.push_str(&format!("Sample mass: {MASS_MG} mg\n"));
    raw.push_str(&format!("Heating rate: {RATE_C_PER_MIN} C/min\n"));
    for i in 0..54 {
        raw.push_str(&format!("instrument header {i}\n"));
    }

    let steps = ((450.0 - 25.0) / STEP_C) as usize;
    let time_step = STEP_C / RATE_C_PER_MIN;
    let mut time = 0.0;

    for i in 0..steps {
        let temperature = 25.0 + i as f64 * STEP_C;
        raw.push_str(&format!("{time:.6} {temperature:.4} {:.6}\n", heating_flow(temperature)));
        time += time_step;
    }
    for i in 0..steps {
        let temperature = 450.0 - i as f64 * STEP_C;
        raw.push_str(&format!("{time:.6} {temperature:.4} {:.6}\n", cooling_flow(temperature)));
        time += time_step;
    }
    for i in 0..=steps {
        let temperature = 25.0 + i as f64 * STEP_C;
        raw.push_str(&format!("{time:.6} {temperature:.4} {:.6}\n", heating_flow(temperature)));
        time += time_step;
    }
    raw
}

fn config() -> DscConfig {
    DscConfig {
        polymer: Some(PolymerClass::Pekk),
        ..DscConfig::default()
    }
}

#[test]
fn three_ramp_cycle_segments_in_order() {
    let report = thermal::analyze("cycle", &synthetic_export(), &config()).expect("analyzes");

    let labels: Vec<&str> = report.segments.iter().map(|s| s.label).collect();
    assert_eq!(labels, ["Heating 1", "Cooling", "Heating 2"]);

    // Mass and rate were read from the header lines.
    assert_eq!(report.sample_mass_mg, MASS_MG);
    assert_eq!(report.heating_rate_c_per_min, RATE_C_PER_MIN);
}

#[test]
fn events_land_in_their_windows() {
    let report = thermal::analyze("cycle", &synthetic_export(), &config()).expect("analyzes");

    let heating = &report.segments[0].events;
    let tg = heating.tg_c.expect("glass transition found");
    assert!((tg - 160.0).abs() < 2.0, "{tg}");
    let tm = heating.tm_c.expect("melting found");
    assert!((tm - 370.0).abs() < 2.0, "{tm}");
    assert_eq!(heating.tc_c, None);

    let cooling = &report.segments[1].events;
    let tc = cooling.tc_c.expect("crystallization found");
    assert!((tc - 290.0).abs() < 2.0, "{tc}");
    assert_eq!(cooling.tg_c, None);
    assert_eq!(cooling.tm_c, None);
}

#[test]
fn enthalpies_report_positive_for_both_transition_kinds() {
    let report = thermal::analyze("cycle", &synthetic_export(), &config()).expect("analyzes");

    // Melting endotherm, height 2 mW and width 6 °C:
    // 2 * 6 * sqrt(pi) mW·°C / (10/60 °C/s) / 5 mg ≈ 25.5 J/g.
    let melt = report.segments[0]
        .events
        .enthalpy_melt_j_per_g
        .expect("melting integrates");
    assert!((melt - 25.5).abs() < 2.0, "{melt}");

    let cryst = report.segments[1]
        .events
        .enthalpy_cryst_j_per_g
        .expect("crystallization integrates");
    assert!(cryst > 0.0, "{cryst}");
    assert!((cryst - 19.1).abs() < 2.0, "{cryst}");
}

#[test]
fn crystallinity_follows_the_polymer_reference() {
    let report = thermal::analyze("cycle", &synthetic_export(), &config()).expect("analyzes");

    let heating = &report.segments[0].events;
    let melt = heating.enthalpy_melt_j_per_g.expect("melting integrates");
    let xc = heating.crystallinity_pct.expect("PEKK reference known");
    assert!((xc - melt / 130.0 * 100.0).abs() < 1e-9);

    // Without a polymer class there is no reference to divide by.
    let plain = thermal::analyze("cycle", &synthetic_export(), &DscConfig::default())
        .expect("analyzes");
    assert_eq!(plain.segments[0].events.crystallinity_pct, None);
}

#[test]
fn cold_crystallization_is_opt_in() {
    let without = thermal::analyze("cycle", &synthetic_export(), &config()).expect("analyzes");
    assert_eq!(
        without.segments[0].events.enthalpy_cold_cryst_j_per_g,
        None
    );

    let with = thermal::analyze(
        "cycle",
        &synthetic_export(),
        &DscConfig {
            first_heating_cold_cryst: true,
            ..config()
        },
    )
    .expect("analyzes");
    // The window integrates even when the synthetic curve has no cold
    // crystallization exotherm; only the first heating reports it.
    assert!(with.segments[0].events.enthalpy_cold_cryst_j_per_g.is_some());
    assert_eq!(with.segments[2].events.enthalpy_cold_cryst_j_per_g, None);
}
