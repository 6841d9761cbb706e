//! Example: service-level sweep and staffing optimisation.
//!
//! This example demonstrates how to:
//! 1. Build a grid of daily loads and trauma fractions (or load one from TOML)
//! 2. Run every scenario's replications in parallel
//! 3. Report per-station waits with confidence intervals and verdicts
//! 4. Search for the leanest passing staffing at one load
//! 5. Export results to JSON/CSV
//!
//! Pass a sweep TOML path as the first argument to override the built-in grid.
//! Set `RUST_LOG=clinic_experiments=debug` for per-replication logs.

use clinic_experiments::{
    export_to_csv, export_to_json, find_cheapest_passing_index, optimize_staffing,
    run_sweep_with_progress, OptimizerOptions, ScenarioConfig, SweepConfig, SweepControl, SweepSpace,
};
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let sweep = match std::env::args().nth(1) {
        Some(path) => SweepConfig::from_toml_file(path)?,
        None => SweepConfig {
            show_progress: true,
            space: SweepSpace::grid()
                .loads(vec![75, 150, 225])
                .trauma_fractions(vec![0.10, 0.12]),
            ..SweepConfig::default()
        },
    };

    let scenarios = sweep.scenarios()?;
    println!("Running {} scenarios...", scenarios.len());
    let results = run_sweep_with_progress(
        &scenarios,
        sweep.num_threads,
        sweep.show_progress,
        &SweepControl::new(),
    )?;

    for result in &results {
        println!(
            "\n=== {} ({:?}, {} replications) ===",
            result.label, result.status, result.replications_used
        );
        println!("Staffing: {}", result.staffing);
        for station in &result.stations {
            println!(
                "  {:<13} wait {:>6.2} ± {:<6.2} min  util {:>5.1}%  max queue {:>3}  {:?}",
                station.station.to_string(),
                station.wait.mean,
                station.wait.half_width,
                station.utilization.mean * 100.0,
                station.max_queue_length,
                station.verdict
            );
        }
        println!(
            "  time in system {:.1} ± {:.1} min",
            result.time_in_system.mean, result.time_in_system.half_width
        );
    }

    if let Some(index) = find_cheapest_passing_index(&results) {
        println!("\nCheapest passing scenario: {}", results[index].label);
    }

    let heavy = scenarios
        .iter()
        .find(|scenario| scenario.label.starts_with("load=225"))
        .cloned()
        .unwrap_or_else(ScenarioConfig::default);
    match optimize_staffing(&heavy, &OptimizerOptions::default().with_trial_replications(20)) {
        Ok(outcome) => println!(
            "\nOptimised staffing for {}: {} ({} servers saved, {} plans evaluated)",
            heavy.label,
            outcome.best,
            outcome.servers_saved(),
            outcome.trail.len()
        ),
        Err(error) => println!("\nStaffing optimisation skipped: {error}"),
    }

    export_to_json(&results, "clinic_sweep.json")?;
    export_to_csv(&results, "clinic_sweep.csv")?;
    println!("\nResults written to clinic_sweep.json and clinic_sweep.csv");

    Ok(())
}
