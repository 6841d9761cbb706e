//! One replication end to end: build, run to drain, summarise.

use bevy_ecs::prelude::World;
use serde::Serialize;

use crate::clock::{ms_to_minutes, SimulationClock};
use crate::error::SimError;
use crate::runner::{initialize_simulation, run_until_drained, simulation_schedule};
use crate::scenario::{build_replication, ClinicParams};
use crate::station::{StationKind, StationSummary, Stations};
use crate::telemetry::ClinicTelemetry;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplicationSummary {
    pub replication: u64,
    pub arrivals: u64,
    pub discharged: u64,
    pub trauma: u64,
    pub non_trauma: u64,
    pub discharged_after_examination: u64,
    pub discharged_after_treatment: u64,
    pub mean_time_in_system_min: f64,
    /// Time of the last event, in minutes since open.
    pub duration_min: f64,
    pub events_processed: u64,
    pub stations: Vec<StationSummary>,
}

impl ReplicationSummary {
    pub fn station(&self, kind: StationKind) -> Option<&StationSummary> {
        self.stations.iter().find(|summary| summary.station == kind)
    }

    pub fn trauma_share(&self) -> f64 {
        if self.arrivals == 0 {
            0.0
        } else {
            self.trauma as f64 / self.arrivals as f64
        }
    }

    /// Share of non-trauma patients sent home straight from examination.
    pub fn direct_discharge_share(&self) -> f64 {
        if self.non_trauma == 0 {
            0.0
        } else {
            self.discharged_after_examination as f64 / self.non_trauma as f64
        }
    }
}

/// Runs replication `replication` of `params` in a fresh world.
pub fn run_replication(
    params: &ClinicParams,
    replication: u64,
) -> Result<ReplicationSummary, SimError> {
    let mut world = World::new();
    build_replication(&mut world, params, replication)?;
    initialize_simulation(&mut world)?;

    let mut schedule = simulation_schedule();
    let steps = run_until_drained(&mut world, &mut schedule, params.max_steps)?;

    let summary = summarize(&world, replication)?;
    tracing::debug!(
        replication,
        steps,
        arrivals = summary.arrivals,
        duration_min = summary.duration_min,
        "replication drained"
    );
    Ok(summary)
}

/// Builds the summary from a drained world and checks patient conservation.
pub fn summarize(world: &World, replication: u64) -> Result<ReplicationSummary, SimError> {
    let telemetry = world
        .get_resource::<ClinicTelemetry>()
        .ok_or_else(|| SimError::config("replication resources are not built"))?;
    let stations = world
        .get_resource::<Stations>()
        .ok_or_else(|| SimError::config("replication resources are not built"))?;

    if telemetry.discharged != telemetry.arrivals {
        return Err(SimError::invariant(format!(
            "{} arrivals but {} discharges",
            telemetry.arrivals, telemetry.discharged
        )));
    }
    if telemetry.trauma + telemetry.non_trauma != telemetry.arrivals {
        return Err(SimError::invariant(format!(
            "{} arrivals but {} acuity assessments",
            telemetry.arrivals,
            telemetry.trauma + telemetry.non_trauma
        )));
    }

    let end_ms = world
        .get_resource::<SimulationClock>()
        .map(SimulationClock::now)
        .unwrap_or(0);
    Ok(ReplicationSummary {
        replication,
        arrivals: telemetry.arrivals,
        discharged: telemetry.discharged,
        trauma: telemetry.trauma,
        non_trauma: telemetry.non_trauma,
        discharged_after_examination: telemetry.discharged_after_examination,
        discharged_after_treatment: telemetry.discharged_after_treatment,
        mean_time_in_system_min: telemetry.time_in_system.mean(),
        duration_min: ms_to_minutes(end_ms),
        events_processed: telemetry.events_processed(),
        stations: stations.summaries(end_ms),
    })
}
