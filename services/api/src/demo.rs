use crate::infra::seed_materials;
use clap::Args;
use labspace::error::AppError;
use labspace::workflows::selection::{
    Comparator, FilterCondition, InMemoryMaterialRepository, MaterialSelectionService,
    PropertyKind, WeightSet,
};
use labspace::workflows::tensile;
use labspace::workflows::thermal::{self, DscConfig, ExothermDirection, PolymerClass};
use std::collections::BTreeMap;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Part volume for the mold cost estimate, in m³
    #[arg(long, default_value_t = 0.001)]
    pub(crate) part_volume_m3: f64,
    /// Print the per-property score breakdown for each ranked material
    #[arg(long)]
    pub(crate) breakdown: bool,
}

#[derive(Args, Debug)]
pub(crate) struct CurveFileArgs {
    /// Raw instrument export to analyze
    pub(crate) path: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct DscFileArgs {
    /// Raw instrument export to analyze
    pub(crate) path: PathBuf,
    /// Sample mass in mg (overrides the file header)
    #[arg(long)]
    pub(crate) mass_mg: Option<f64>,
    /// Heating rate in °C/min (overrides the file header)
    #[arg(long)]
    pub(crate) rate: Option<f64>,
    /// Polymer class for the crystallinity reference (pekk, peek, pps, pesu)
    #[arg(long, value_parser = parse_polymer)]
    pub(crate) polymer: Option<PolymerClass>,
    /// Treat the heat-flow axis as exotherm-down
    #[arg(long)]
    pub(crate) exotherm_down: bool,
    /// Integrate the cold-crystallization exotherm on the first heating
    #[arg(long)]
    pub(crate) cold_cryst: bool,
}

fn parse_polymer(raw: &str) -> Result<PolymerClass, String> {
    match raw.to_ascii_lowercase().as_str() {
        "pekk" => Ok(PolymerClass::Pekk),
        "peek" => Ok(PolymerClass::Peek),
        "pps" => Ok(PolymerClass::Pps),
        "pesu" => Ok(PolymerClass::Pesu),
        other => Err(format!("unknown polymer class '{other}'")),
    }
}

pub(crate) fn run_tensile_analyze(args: CurveFileArgs) -> Result<(), AppError> {
    let raw = std::fs::read_to_string(&args.path)?;
    let name = args.path.display().to_string();
    let report = tensile::analyze(&name, &raw)?;

    println!("Tensile analysis: {}", report.specimen);
    println!(
        "Columns: strain '{}' | stress '{}' | {} usable rows",
        report.strain_column, report.stress_column, report.point_count
    );
    print_metric("UTS", report.metrics.ultimate_strength_mpa, "MPa");
    print_metric(
        "Elongation at break",
        report.metrics.elongation_at_break_pct,
        "%",
    );
    print_metric("Yield strength (0.2%)", report.metrics.yield_strength_mpa, "MPa");
    Ok(())
}

pub(crate) fn run_dsc_analyze(args: DscFileArgs) -> Result<(), AppError> {
    let raw = std::fs::read_to_string(&args.path)?;
    let name = args.path.display().to_string();
    let config = DscConfig {
        sample_mass_mg: args.mass_mg,
        heating_rate_c_per_min: args.rate,
        exotherm: if args.exotherm_down {
            ExothermDirection::Down
        } else {
            ExothermDirection::Up
        },
        polymer: args.polymer,
        first_heating_cold_cryst: args.cold_cryst,
    };
    let report = thermal::analyze(&name, &raw, &config)?;

    println!("DSC analysis: {}", report.specimen);
    println!(
        "{} samples | mass {} mg | rate {} °C/min",
        report.sample_count, report.sample_mass_mg, report.heating_rate_c_per_min
    );
    for segment in &report.segments {
        println!(
            "\n{} ({} samples, {:.1} -> {:.1} °C)",
            segment.label,
            segment.sample_count,
            segment.temperature_start_c,
            segment.temperature_end_c
        );
        print_metric("  Tg", segment.events.tg_c, "°C");
        print_metric("  Tc", segment.events.tc_c, "°C");
        print_metric("  Tm", segment.events.tm_c, "°C");
        print_metric(
            "  ΔH (cold crystallization)",
            segment.events.enthalpy_cold_cryst_j_per_g,
            "J/g",
        );
        print_metric("  ΔH (crystallization)", segment.events.enthalpy_cryst_j_per_g, "J/g");
        print_metric("  ΔH (melting)", segment.events.enthalpy_melt_j_per_g, "J/g");
        print_metric("  Crystallinity", segment.events.crystallinity_pct, "%");
    }
    Ok(())
}

fn print_metric(label: &str, value: Option<f64>, unit: &str) {
    match value {
        Some(value) => println!("{label}: {value:.2} {unit}"),
        None => println!("{label}: —"),
    }
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let repository = Arc::new(InMemoryMaterialRepository::with_seed(seed_materials()));
    let service = MaterialSelectionService::new(repository);

    println!("Material selection demo (seeded catalog)");

    println!("\nPre-screening");
    let outcomes = service.screen().map_err(AppError::from)?;
    for outcome in &outcomes {
        let verdict = if outcome.passed { "pass" } else { "fail" };
        println!("- {}: {}", outcome.material, verdict);
        for check in &outcome.checks {
            println!("    {:?}: {}", check.rule, check.notes);
        }
    }

    let conditions = vec![
        FilterCondition::new(PropertyKind::Cost, Comparator::LessThan, 50.0),
        FilterCondition::new(PropertyKind::Density, Comparator::LessThan, 1700.0),
        FilterCondition::new(PropertyKind::TensileStrength, Comparator::GreaterThan, 80.0),
    ];

    println!("\nShortlist (cost < 50 USD/kg, density < 1700 kg/m³, tensile strength > 80 MPa)");
    let shortlist = service.shortlist(&conditions).map_err(AppError::from)?;
    if shortlist.is_empty() {
        println!("- no candidates survive the filter");
        return Ok(());
    }
    for material in &shortlist {
        println!("- {}", material.name);
    }

    let mut weights = BTreeMap::new();
    weights.insert(PropertyKind::Cost, 40);
    weights.insert(PropertyKind::Density, 20);
    weights.insert(PropertyKind::TensileStrength, 40);
    let weights = WeightSet::new(weights);

    println!("\nRanking (cost 40 / density 20 / tensile strength 40)");
    let ranked = service.score(&conditions, &weights).map_err(AppError::from)?;
    for (position, entry) in ranked.iter().enumerate() {
        println!("{}. {}: {:.2}", position + 1, entry.material, entry.total);
        if args.breakdown {
            for component in &entry.components {
                println!(
                    "     {}: score {:.3} × weight {} = {:.2}",
                    component.property.label(),
                    component.score,
                    component.weight,
                    component.weighted
                );
            }
        }
    }

    println!("\nMold cost for a {} m³ part (ascending)", args.part_volume_m3);
    let estimates = service
        .mold_cost(args.part_volume_m3, &conditions)
        .map_err(AppError::from)?;
    for estimate in &estimates {
        println!(
            "- {}: {:.2} kg -> {:.2} USD",
            estimate.material, estimate.estimated_mass_kg, estimate.estimated_cost_usd
        );
    }

    Ok(())
}
