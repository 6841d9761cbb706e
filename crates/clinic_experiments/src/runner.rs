//! Parallel replication and scenario execution using rayon.
//!
//! Replication `r` of a scenario always reads the same slice of every random
//! stream, so results do not depend on which worker ran it or in which order.
//! Replications are collected back in index order before aggregation.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use clinic_core::scenario::ClinicParams;
use clinic_core::{run_replication, ReplicationSummary, SimError};
use indicatif::{ProgressBar, ProgressStyle};
use rayon::prelude::*;

use crate::config::{FailurePolicy, ScenarioConfig};
use crate::error::ExperimentError;
use crate::metrics::{aggregate, ReplicationFailure, ScenarioResult};

/// Cooperative cancellation shared between a caller and a running sweep.
///
/// Checked before each replication starts; a replication already running
/// finishes normally.
#[derive(Debug, Clone, Default)]
pub struct SweepControl {
    aborted: Arc<AtomicBool>,
}

impl SweepControl {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }
}

/// Run every replication of one scenario and aggregate the results.
///
/// # Errors
///
/// * `Config` - the scenario failed validation; nothing ran
/// * `ReplicationFailed` - a replication failed under [FailurePolicy::AbortScenario]
///
/// An engine invariant violation is not an error here: the scenario comes
/// back with [ScenarioStatus::Invalid](crate::metrics::ScenarioStatus::Invalid).
pub fn run_scenario(config: &ScenarioConfig) -> Result<ScenarioResult, ExperimentError> {
    run_scenario_using(config, &SweepControl::new(), run_replication)
}

/// Like [run_scenario], with an abort flag and a custom replication function.
pub fn run_scenario_using<F>(
    config: &ScenarioConfig,
    control: &SweepControl,
    replicate: F,
) -> Result<ScenarioResult, ExperimentError>
where
    F: Fn(&ClinicParams, u64) -> Result<ReplicationSummary, SimError> + Sync,
{
    execute_scenario(config, control, None, &replicate)
}

fn execute_scenario<F>(
    config: &ScenarioConfig,
    control: &SweepControl,
    progress: Option<&ProgressBar>,
    replicate: &F,
) -> Result<ScenarioResult, ExperimentError>
where
    F: Fn(&ClinicParams, u64) -> Result<ReplicationSummary, SimError> + Sync,
{
    config.validate()?;

    // None marks a replication skipped because the sweep was aborted.
    let outcomes: Vec<Option<Result<ReplicationSummary, SimError>>> = (0..u64::from(config.replications))
        .into_par_iter()
        .map(|replication| {
            if control.is_aborted() {
                return None;
            }
            let outcome = replicate(&config.params, replication);
            if let Some(progress_bar) = progress {
                progress_bar.inc(1);
            }
            Some(outcome)
        })
        .collect();

    if outcomes.iter().any(Option::is_none) {
        tracing::warn!(scenario = %config.label, "scenario aborted");
        return Err(ExperimentError::Aborted);
    }

    let mut summaries = Vec::with_capacity(outcomes.len());
    let mut errors = Vec::new();
    for (replication, outcome) in outcomes.into_iter().flatten().enumerate() {
        match outcome {
            Ok(summary) => summaries.push(summary),
            Err(error) => errors.push((replication as u64, error)),
        }
    }

    let invalid = errors.iter().any(|(_, error)| error.is_invariant_violation());
    if invalid {
        tracing::warn!(
            scenario = %config.label,
            failed = errors.len(),
            "engine invariant violated; scenario is invalid"
        );
    } else if let Some((replication, error)) = errors.first() {
        match config.failure_policy {
            FailurePolicy::AbortScenario => {
                return Err(ExperimentError::ReplicationFailed {
                    replication: *replication,
                    source: error.clone(),
                });
            }
            FailurePolicy::DiscardFailed => {
                tracing::warn!(
                    scenario = %config.label,
                    discarded = errors.len(),
                    remaining = summaries.len(),
                    "discarded failed replications"
                );
            }
        }
    }

    let failures = errors
        .iter()
        .map(|(replication, error)| ReplicationFailure::new(*replication, error))
        .collect();
    let result = aggregate(config, &summaries, failures);
    tracing::info!(
        scenario = %result.label,
        status = ?result.status,
        replications = result.replications_used,
        all_pass = result.all_pass,
        "scenario complete"
    );
    Ok(result)
}

/// Runs every scenario on a dedicated worker pool, showing a progress bar.
///
/// `num_threads` sizes the pool; `None` sizes it to the machine. Results come
/// back one per scenario in the order the scenarios were given.
pub fn run_sweep(
    scenarios: &[ScenarioConfig],
    num_threads: Option<usize>,
) -> Result<Vec<ScenarioResult>, ExperimentError> {
    run_sweep_with_progress(scenarios, num_threads, true, &SweepControl::new())
}

/// Run many scenarios in parallel with optional progress bar and abort flag.
///
/// The progress bar counts replications across all scenarios. The first
/// failing scenario (in input order) determines the returned error.
pub fn run_sweep_with_progress(
    scenarios: &[ScenarioConfig],
    num_threads: Option<usize>,
    show_progress: bool,
    control: &SweepControl,
) -> Result<Vec<ScenarioResult>, ExperimentError> {
    let total: u64 = scenarios
        .iter()
        .map(|scenario| u64::from(scenario.replications))
        .sum();
    let pb = if show_progress && total > 0 {
        let bar = ProgressBar::new(total);
        if let Ok(style) = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})")
        {
            bar.set_style(style.progress_chars("#>-"));
        }
        Some(bar)
    } else {
        None
    };

    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(threads) = num_threads {
        builder = builder.num_threads(threads);
    }
    let pool = builder
        .build()
        .map_err(|error| ExperimentError::config(format!("failed to create thread pool: {error}")))?;

    tracing::info!(scenarios = scenarios.len(), replications = total, "starting sweep");
    let outcomes: Vec<Result<ScenarioResult, ExperimentError>> = pool.install(|| {
        scenarios
            .par_iter()
            .map(|scenario| execute_scenario(scenario, control, pb.as_ref(), &run_replication))
            .collect()
    });

    if let Some(ref progress_bar) = pb {
        progress_bar.finish_with_message("Completed");
    }

    outcomes.into_iter().collect()
}
