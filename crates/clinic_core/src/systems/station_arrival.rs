//! StationArrival system: a patient reaches a station and either seizes a
//! free server or joins the back of the queue.

use bevy_ecs::prelude::{Entity, Query, Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::ecs::Patient;
use crate::error::{EngineFault, SimError};
use crate::station::{StationKind, Stations};
use crate::streams::RandomStreams;
use crate::systems::{begin_service, patient_mut};

pub fn station_arrival_system(
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    mut stations: ResMut<Stations>,
    mut streams: ResMut<RandomStreams>,
    mut patients: Query<&mut Patient>,
    mut fault: ResMut<EngineFault>,
) {
    if event.0.kind != EventKind::StationArrival {
        return;
    }
    let Some((entity, station)) = event.0.visit() else {
        fault.raise(SimError::invariant("station arrival without a patient"));
        return;
    };

    if let Err(error) = arrive(
        entity,
        station,
        &mut clock,
        &mut stations,
        &mut streams,
        &mut patients,
    ) {
        fault.raise(error);
    }
}

fn arrive(
    entity: Entity,
    kind: StationKind,
    clock: &mut SimulationClock,
    stations: &mut Stations,
    streams: &mut RandomStreams,
    patients: &mut Query<&mut Patient>,
) -> Result<(), SimError> {
    let now = clock.now();
    let mut patient = patient_mut(patients, entity)?;
    patient.enter(kind, now);

    let station = stations.get_mut(kind);
    if station.has_free_server() {
        begin_service(station, entity, &mut patient, clock, streams)
    } else {
        station.enqueue(entity, now)
    }
}
