//! Scenario-level metrics aggregated across replications.

use clinic_core::distributions::ArrivalProfile;
use clinic_core::scenario::StaffingPlan;
use clinic_core::station::StationKind;
use clinic_core::{ReplicationSummary, SimError};
use serde::Serialize;

use crate::config::ScenarioConfig;
use crate::confidence::Estimate;
use crate::service_levels::{evaluate, ServiceLevelVerdict, Threshold, VerdictBasis};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioStatus {
    /// Every replication ran.
    Complete,
    /// Some replications were discarded; estimates use fewer samples.
    Degraded,
    /// An engine invariant broke; nothing in the result is trustworthy.
    Invalid,
}

/// A replication that did not produce a summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplicationFailure {
    pub replication: u64,
    pub invariant_violation: bool,
    pub message: String,
}

impl ReplicationFailure {
    pub fn new(replication: u64, error: &SimError) -> Self {
        Self {
            replication,
            invariant_violation: error.is_invariant_violation(),
            message: error.to_string(),
        }
    }
}

/// One station's waits, load and verdict across replications.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationResult {
    pub station: StationKind,
    pub capacity: u32,
    /// Replication mean waits, minutes; one sample per replication used.
    pub wait: Estimate,
    /// Longest single wait in any replication, minutes.
    pub max_wait_minutes: f64,
    pub utilization: Estimate,
    pub avg_queue_length: Estimate,
    /// Longest queue in any replication.
    pub max_queue_length: usize,
    pub threshold: Threshold,
    pub verdict: ServiceLevelVerdict,
}

/// Aggregate of all replications of one scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioResult {
    pub label: String,
    pub arrival_profile: ArrivalProfile,
    pub trauma_fraction: f64,
    pub staffing: StaffingPlan,
    pub confidence: f64,
    pub verdict_basis: VerdictBasis,
    pub replications_requested: u32,
    pub replications_used: usize,
    pub failures: Vec<ReplicationFailure>,
    pub status: ScenarioStatus,
    pub stations: Vec<StationResult>,
    pub arrivals: Estimate,
    pub discharged: Estimate,
    /// Mean time from arrival to discharge, minutes.
    pub time_in_system: Estimate,
    pub trauma_share: Estimate,
    pub direct_discharge_share: Estimate,
    /// Valid result and no station failed its service level.
    pub all_pass: bool,
}

impl ScenarioResult {
    pub fn station(&self, kind: StationKind) -> Option<&StationResult> {
        self.stations.iter().find(|result| result.station == kind)
    }

    /// Daily load for stationary scenarios.
    pub fn patients_per_day(&self) -> Option<u32> {
        match self.arrival_profile {
            ArrivalProfile::Stationary { patients_per_day } => Some(patients_per_day),
            ArrivalProfile::Hourly { .. } => None,
        }
    }

    pub fn replications_failed(&self) -> usize {
        self.failures.len()
    }

    pub fn is_valid(&self) -> bool {
        self.status != ScenarioStatus::Invalid
    }

    /// Stations whose verdict is `Fail`.
    pub fn failing_stations(&self) -> Vec<StationKind> {
        self.stations
            .iter()
            .filter(|result| result.verdict == ServiceLevelVerdict::Fail)
            .map(|result| result.station)
            .collect()
    }
}

/// Aggregates replication summaries (in replication order) into a scenario result.
pub fn aggregate(
    config: &ScenarioConfig,
    summaries: &[ReplicationSummary],
    failures: Vec<ReplicationFailure>,
) -> ScenarioResult {
    let status = if failures.iter().any(|failure| failure.invariant_violation) {
        ScenarioStatus::Invalid
    } else if failures.is_empty() {
        ScenarioStatus::Complete
    } else {
        ScenarioStatus::Degraded
    };
    let confidence = config.confidence;

    let stations: Vec<StationResult> = StationKind::ALL
        .into_iter()
        .map(|kind| {
            let observed: Vec<_> = summaries
                .iter()
                .filter_map(|summary| summary.station(kind))
                .collect();
            // A replication where nobody waited contributes its empty mean of zero.
            let waits: Vec<f64> = observed.iter().map(|station| station.mean_wait_min).collect();
            let wait = Estimate::from_samples(&waits, confidence);
            let threshold = config.thresholds.for_station(kind);
            let verdict = if status == ScenarioStatus::Invalid {
                ServiceLevelVerdict::Fail
            } else {
                evaluate(threshold, &wait, config.verdict_basis)
            };
            let utilization: Vec<f64> = observed.iter().map(|s| s.utilization).collect();
            let queue: Vec<f64> = observed.iter().map(|s| s.avg_queue_length).collect();

            StationResult {
                station: kind,
                capacity: config.params.staffing.capacity(kind),
                wait,
                max_wait_minutes: observed
                    .iter()
                    .map(|s| s.max_wait_min)
                    .fold(0.0, f64::max),
                utilization: Estimate::from_samples(&utilization, confidence),
                avg_queue_length: Estimate::from_samples(&queue, confidence),
                max_queue_length: observed
                    .iter()
                    .map(|s| s.max_queue_length)
                    .max()
                    .unwrap_or(0),
                threshold,
                verdict,
            }
        })
        .collect();

    let all_pass = status != ScenarioStatus::Invalid
        && !summaries.is_empty()
        && stations.iter().all(|station| station.verdict.is_acceptable());

    ScenarioResult {
        label: config.label.clone(),
        arrival_profile: config.params.arrivals.clone(),
        trauma_fraction: config.params.trauma_fraction,
        staffing: config.params.staffing,
        confidence,
        verdict_basis: config.verdict_basis,
        replications_requested: config.replications,
        replications_used: summaries.len(),
        failures,
        status,
        arrivals: estimate_over(summaries, confidence, |s| s.arrivals as f64),
        discharged: estimate_over(summaries, confidence, |s| s.discharged as f64),
        time_in_system: estimate_over(summaries, confidence, |s| s.mean_time_in_system_min),
        trauma_share: estimate_over(summaries, confidence, ReplicationSummary::trauma_share),
        direct_discharge_share: estimate_over(summaries, confidence, ReplicationSummary::direct_discharge_share),
        stations,
        all_pass,
    }
}

fn estimate_over(
    summaries: &[ReplicationSummary],
    confidence: f64,
    extract: impl Fn(&ReplicationSummary) -> f64,
) -> Estimate {
    let samples: Vec<f64> = summaries.iter().map(extract).collect();
    Estimate::from_samples(&samples, confidence)
}
