use bevy_ecs::prelude::World;

use crate::clock::SimulationClock;
use crate::error::{EngineFault, SimError};
use crate::scenario::params::{ArrivalSchedule, ClinicParams};
use crate::station::{Station, StationKind, Stations};
use crate::streams::RandomStreams;
use crate::telemetry::ClinicTelemetry;

/// Inserts fresh per-replication resources into `world`: clock, stations,
/// streams for `replication`, routing, arrival schedule and telemetry.
/// Existing patients are not touched; use a new [World] per replication.
pub fn build_replication(
    world: &mut World,
    params: &ClinicParams,
    replication: u64,
) -> Result<(), SimError> {
    params.validate()?;

    let stations = Stations::new(StationKind::ALL.map(|kind| {
        Station::new(
            kind,
            params.staffing.capacity(kind),
            params.service_times.profile(kind),
        )
    }))?;

    world.insert_resource(SimulationClock::default());
    world.insert_resource(stations);
    world.insert_resource(RandomStreams::for_replication(params.seed, replication));
    world.insert_resource(params.routing());
    world.insert_resource(ArrivalSchedule::from_params(params));
    world.insert_resource(ClinicTelemetry::default());
    world.insert_resource(EngineFault::default());
    Ok(())
}
