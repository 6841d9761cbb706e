pub mod arrival;
pub mod end_of_arrivals;
pub mod service_complete;
pub mod station_arrival;

use bevy_ecs::prelude::{Entity, Mut, Query};

use crate::clock::{minutes_to_ms, EventKind, EventSubject, SimulationClock};
use crate::ecs::Patient;
use crate::error::SimError;
use crate::station::Station;
use crate::streams::RandomStreams;

pub(crate) fn patient_mut<'a>(
    patients: &'a mut Query<&mut Patient>,
    entity: Entity,
) -> Result<Mut<'a, Patient>, SimError> {
    patients
        .get_mut(entity)
        .map_err(|_| SimError::invariant(format!("event refers to missing patient {entity:?}")))
}

/// Seizes a server at `station` for `entity`, draws its service time and
/// schedules the completion.
pub(crate) fn begin_service(
    station: &mut Station,
    entity: Entity,
    patient: &mut Patient,
    clock: &mut SimulationClock,
    streams: &mut RandomStreams,
) -> Result<(), SimError> {
    let now = clock.now();
    let kind = station.kind();
    let visit = patient
        .current_visit_mut()
        .filter(|visit| visit.station == kind && visit.seized_at.is_none())
        .ok_or_else(|| {
            SimError::invariant(format!("patient {entity:?} is not waiting at {kind}"))
        })?;

    station.seize(now)?;
    visit.seized_at = Some(now);
    let wait_ms = visit.wait_ms().unwrap_or(0);
    patient.total_wait_ms += wait_ms;

    let distribution = *station.service().distribution_for(patient.acuity);
    let minutes = streams.draw(kind.service_stream(), &distribution)?;
    clock.schedule_in(
        minutes_to_ms(minutes),
        EventKind::ServiceComplete,
        Some(EventSubject::Visit {
            patient: entity,
            station: kind,
        }),
    );
    Ok(())
}
