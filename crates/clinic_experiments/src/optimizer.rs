//! Greedy staffing reduction.
//!
//! Starting from a baseline plan that meets every service level, remove one
//! server at a time from each station (never below one) and keep any removal
//! that still passes. Rounds repeat until a full round keeps nothing, so the
//! returned plan always passes and no single further removal does.

use std::collections::HashSet;

use clinic_core::scenario::StaffingPlan;
use clinic_core::station::StationKind;
use serde::Serialize;

use crate::config::ScenarioConfig;
use crate::error::ExperimentError;
use crate::metrics::{ScenarioResult, ScenarioStatus};
use crate::runner::run_scenario;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct OptimizerOptions {
    /// Replications per candidate plan; the baseline's count when unset.
    pub trial_replications: Option<u32>,
}

impl OptimizerOptions {
    pub fn with_trial_replications(mut self, replications: u32) -> Self {
        self.trial_replications = Some(replications);
        self
    }
}

/// One evaluated plan.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StaffingTrial {
    pub staffing: StaffingPlan,
    pub total_servers: u32,
    pub passed: bool,
    pub status: ScenarioStatus,
}

impl StaffingTrial {
    fn from_result(result: &ScenarioResult) -> Self {
        Self {
            staffing: result.staffing,
            total_servers: result.staffing.total_servers(),
            passed: result.all_pass,
            status: result.status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OptimizationOutcome {
    pub baseline: StaffingPlan,
    pub best: StaffingPlan,
    pub best_result: ScenarioResult,
    /// Every plan evaluated, baseline first.
    pub trail: Vec<StaffingTrial>,
}

impl OptimizationOutcome {
    pub fn servers_saved(&self) -> u32 {
        self.baseline
            .total_servers()
            .saturating_sub(self.best.total_servers())
    }
}

/// Find the smallest passing plan reachable from `baseline` by single-server removals.
///
/// # Errors
///
/// `InfeasibleBaseline` when the baseline itself misses a service level, plus
/// anything [run_scenario] returns.
pub fn optimize_staffing(
    baseline: &ScenarioConfig,
    options: &OptimizerOptions,
) -> Result<OptimizationOutcome, ExperimentError> {
    optimize_staffing_with(baseline, options, run_scenario)
}

/// [optimize_staffing] with a custom scenario evaluator.
pub fn optimize_staffing_with<E>(
    baseline: &ScenarioConfig,
    options: &OptimizerOptions,
    mut evaluate: E,
) -> Result<OptimizationOutcome, ExperimentError>
where
    E: FnMut(&ScenarioConfig) -> Result<ScenarioResult, ExperimentError>,
{
    let baseline_plan = baseline.params.staffing;
    let baseline_result = evaluate(baseline)?;
    let mut trail = vec![StaffingTrial::from_result(&baseline_result)];
    if !baseline_result.all_pass {
        tracing::warn!(
            scenario = %baseline.label,
            staffing = %baseline_plan,
            failing = ?baseline_result.failing_stations(),
            "baseline staffing misses service levels; nothing to optimise"
        );
        return Err(ExperimentError::InfeasibleBaseline {
            staffing: baseline_plan.to_string(),
        });
    }

    let trial_replications = options.trial_replications.unwrap_or(baseline.replications);
    let mut best = baseline_plan;
    let mut best_result = baseline_result;
    let mut evaluated = HashSet::from([baseline_plan]);

    loop {
        let mut improved = false;
        for station in StationKind::ALL {
            let servers = best.capacity(station);
            if servers <= 1 {
                continue;
            }
            let candidate = best.with_capacity(station, servers - 1);
            if !evaluated.insert(candidate) {
                continue;
            }

            let trial = baseline
                .clone()
                .with_label(format!("{} [{candidate}]", baseline.label))
                .with_params(baseline.params.clone().with_staffing(candidate))
                .with_replications(trial_replications);
            let result = evaluate(&trial)?;
            trail.push(StaffingTrial::from_result(&result));

            if result.all_pass {
                tracing::debug!(%station, staffing = %candidate, "removal kept");
                best = candidate;
                best_result = result;
                improved = true;
            } else {
                tracing::debug!(%station, staffing = %candidate, "removal rejected");
            }
        }
        if !improved {
            break;
        }
    }

    tracing::info!(
        scenario = %baseline.label,
        baseline = %baseline_plan,
        best = %best,
        evaluated = trail.len(),
        "staffing optimised"
    );
    Ok(OptimizationOutcome {
        baseline: baseline_plan,
        best,
        best_result,
        trail,
    })
}
