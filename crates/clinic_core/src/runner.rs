//! Simulation runner: advances the clock and routes events into the ECS.
//!
//! Clock progression and event routing happen here, outside systems. Each step
//! pops the next event from [SimulationClock], inserts it as [CurrentEvent],
//! runs the schedule, then surfaces any [EngineFault] and re-checks the
//! station invariants.

use bevy_ecs::prelude::{Mut, Res, Schedule, World};
use bevy_ecs::schedule::{apply_deferred, ExecutorKind, IntoSystemConfigs};

use crate::clock::{CurrentEvent, Event, EventKind, SimulationClock};
use crate::error::{EngineFault, SimError};
use crate::scenario::ArrivalSchedule;
use crate::station::Stations;
use crate::streams::RandomStreams;
use crate::systems::{
    arrival::{arrival_system, schedule_next_arrival},
    end_of_arrivals::end_of_arrivals_system,
    service_complete::service_complete_system,
    station_arrival::station_arrival_system,
};
use crate::telemetry::ClinicTelemetry;

fn is_arrival(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::Arrival)
        .unwrap_or(false)
}

fn is_station_arrival(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::StationArrival)
        .unwrap_or(false)
}

fn is_service_complete(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::ServiceComplete)
        .unwrap_or(false)
}

fn is_end_of_arrivals(event: Option<Res<CurrentEvent>>) -> bool {
    event
        .map(|e| e.0.kind == EventKind::EndOfArrivals)
        .unwrap_or(false)
}

/// Builds the clinic schedule: one handler per [EventKind], then [apply_deferred]
/// so spawned and despawned patients are visible to the next event.
pub fn simulation_schedule() -> Schedule {
    let mut schedule = Schedule::default();
    schedule.set_executor_kind(ExecutorKind::SingleThreaded);
    schedule.add_systems(
        (
            arrival_system.run_if(is_arrival),
            station_arrival_system.run_if(is_station_arrival),
            service_complete_system.run_if(is_service_complete),
            end_of_arrivals_system.run_if(is_end_of_arrivals),
            apply_deferred,
        )
            .chain(),
    );
    schedule
}

/// Schedules the end of arrivals at the cutoff and the first arrival.
/// Call after [crate::scenario::build_replication].
pub fn initialize_simulation(world: &mut World) -> Result<(), SimError> {
    let Some(arrivals) = world.get_resource::<ArrivalSchedule>().cloned() else {
        return Err(SimError::config("replication resources are not built"));
    };
    if !world.contains_resource::<RandomStreams>() || !world.contains_resource::<SimulationClock>()
    {
        return Err(SimError::config("replication resources are not built"));
    }

    world.resource_scope(|world, mut streams: Mut<RandomStreams>| {
        let mut clock = world.resource_mut::<SimulationClock>();
        clock.schedule_at(arrivals.cutoff_ms, EventKind::EndOfArrivals, None)?;
        schedule_next_arrival(&mut clock, &mut streams, &arrivals)?;
        Ok(())
    })
}

/// Runs one simulation step. Returns `Ok(false)` when the calendar is empty.
pub fn run_next_event(world: &mut World, schedule: &mut Schedule) -> Result<bool, SimError> {
    run_next_event_with_hook(world, schedule, |_, _| {})
}

/// Runs one simulation step and invokes `hook` after the schedule completes.
pub fn run_next_event_with_hook<F>(
    world: &mut World,
    schedule: &mut Schedule,
    mut hook: F,
) -> Result<bool, SimError>
where
    F: FnMut(&World, &Event),
{
    let event = match world.resource_mut::<SimulationClock>().pop_next()? {
        Some(e) => e,
        None => return Ok(false),
    };
    world.insert_resource(CurrentEvent(event));

    if let Some(mut telemetry) = world.get_resource_mut::<ClinicTelemetry>() {
        telemetry.record_event(event.kind);
    }

    schedule.run(world);

    if let Some(error) = world
        .get_resource_mut::<EngineFault>()
        .and_then(|mut fault| fault.take())
    {
        return Err(error);
    }
    if let Some(stations) = world.get_resource::<Stations>() {
        stations.check_invariants()?;
    }

    hook(world, &event);
    Ok(true)
}

/// Runs until the calendar is empty and every patient has been discharged.
/// Returns the number of events processed.
pub fn run_until_drained(
    world: &mut World,
    schedule: &mut Schedule,
    max_steps: usize,
) -> Result<usize, SimError> {
    run_until_drained_with_hook(world, schedule, max_steps, |_, _| {})
}

/// Like [run_until_drained], invoking `hook` after every event.
pub fn run_until_drained_with_hook<F>(
    world: &mut World,
    schedule: &mut Schedule,
    max_steps: usize,
    mut hook: F,
) -> Result<usize, SimError>
where
    F: FnMut(&World, &Event),
{
    let mut steps = 0;
    loop {
        if steps >= max_steps && !world.resource::<SimulationClock>().is_empty() {
            return Err(SimError::invariant(format!(
                "replication did not drain within {max_steps} events"
            )));
        }
        if !run_next_event_with_hook(world, schedule, &mut hook)? {
            break;
        }
        steps += 1;
    }

    let in_system = world
        .get_resource::<ClinicTelemetry>()
        .map(ClinicTelemetry::in_system)
        .unwrap_or(0);
    if in_system > 0 {
        return Err(SimError::invariant(format!(
            "calendar empty with {in_system} patients still in the clinic"
        )));
    }
    Ok(steps)
}
