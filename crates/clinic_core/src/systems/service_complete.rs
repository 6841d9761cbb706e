//! ServiceComplete system: record the finished wait, free the server, start the
//! next queued patient, then route the finished patient onward or discharge them.

use bevy_ecs::prelude::{Commands, Entity, Query, Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, EventSubject, SimulationClock};
use crate::ecs::{Patient, PatientState};
use crate::error::{EngineFault, SimError};
use crate::routing::{Route, RoutingTable};
use crate::station::{StationKind, Stations};
use crate::streams::RandomStreams;
use crate::systems::{begin_service, patient_mut};
use crate::telemetry::ClinicTelemetry;

#[allow(clippy::too_many_arguments)]
pub fn service_complete_system(
    mut commands: Commands,
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    mut stations: ResMut<Stations>,
    mut streams: ResMut<RandomStreams>,
    routing: Res<RoutingTable>,
    mut telemetry: ResMut<ClinicTelemetry>,
    mut patients: Query<&mut Patient>,
    mut fault: ResMut<EngineFault>,
) {
    if event.0.kind != EventKind::ServiceComplete {
        return;
    }
    let Some((entity, station)) = event.0.visit() else {
        fault.raise(SimError::invariant("service completion without a patient"));
        return;
    };

    let outcome = complete(
        entity,
        station,
        &mut clock,
        &mut stations,
        &mut streams,
        &routing,
        &mut telemetry,
        &mut patients,
    );
    match outcome {
        Ok(Route::Discharge) => commands.entity(entity).despawn(),
        Ok(Route::To(_)) => {}
        Err(error) => fault.raise(error),
    }
}

#[allow(clippy::too_many_arguments)]
fn complete(
    entity: Entity,
    kind: StationKind,
    clock: &mut SimulationClock,
    stations: &mut Stations,
    streams: &mut RandomStreams,
    routing: &RoutingTable,
    telemetry: &mut ClinicTelemetry,
    patients: &mut Query<&mut Patient>,
) -> Result<Route, SimError> {
    let now = clock.now();
    let station = stations.get_mut(kind);

    let wait_ms = {
        let mut patient = patient_mut(patients, entity)?;
        let visit = patient
            .current_visit_mut()
            .filter(|visit| visit.station == kind && visit.exited_at.is_none())
            .ok_or_else(|| {
                SimError::invariant(format!("patient {entity:?} is not in service at {kind}"))
            })?;
        visit.exited_at = Some(now);
        visit.wait_ms().ok_or_else(|| {
            SimError::invariant(format!("patient {entity:?} finished {kind} without seizing"))
        })?
    };
    station.record_wait(wait_ms);
    station.release(now)?;

    if let Some(next) = station.dequeue(now) {
        let mut next_patient = patient_mut(patients, next)?;
        begin_service(station, next, &mut next_patient, clock, streams)?;
    }

    let mut patient = patient_mut(patients, entity)?;
    let route = routing.next(kind, &mut patient, streams)?;
    if kind == StationKind::Triage {
        if let Some(acuity) = patient.acuity {
            telemetry.record_acuity(acuity);
        }
    }

    match route {
        Route::To(next_station) => {
            clock.schedule_in(
                0,
                EventKind::StationArrival,
                Some(EventSubject::Visit {
                    patient: entity,
                    station: next_station,
                }),
            );
        }
        Route::Discharge => {
            let path = RoutingTable::discharge_path(kind, &patient).ok_or_else(|| {
                SimError::invariant(format!("patient {entity:?} cannot be discharged from {kind}"))
            })?;
            patient.state = PatientState::Discharged;
            telemetry.record_discharge(&patient, path, now);
        }
    }
    Ok(route)
}
