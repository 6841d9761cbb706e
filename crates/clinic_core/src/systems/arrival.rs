//! Arrival system: admit a new patient, send them to triage and draw the next arrival.

use bevy_ecs::prelude::{Commands, Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, EventSubject, SimulationClock};
use crate::ecs::Patient;
use crate::error::{EngineFault, SimError};
use crate::scenario::ArrivalSchedule;
use crate::station::StationKind;
use crate::streams::RandomStreams;
use crate::telemetry::ClinicTelemetry;

pub fn arrival_system(
    mut commands: Commands,
    event: Res<CurrentEvent>,
    mut clock: ResMut<SimulationClock>,
    mut streams: ResMut<RandomStreams>,
    schedule: Res<ArrivalSchedule>,
    mut telemetry: ResMut<ClinicTelemetry>,
    mut fault: ResMut<EngineFault>,
) {
    if event.0.kind != EventKind::Arrival {
        return;
    }

    let now = clock.now();
    let id = telemetry.admit();
    let patient = commands.spawn(Patient::new(id, now)).id();
    clock.schedule_in(
        0,
        EventKind::StationArrival,
        Some(EventSubject::Visit {
            patient,
            station: StationKind::Triage,
        }),
    );

    if let Err(error) = schedule_next_arrival(&mut clock, &mut streams, &schedule) {
        fault.raise(error);
    }
}

/// Draws the next arrival from the arrivals stream and schedules it if it
/// falls strictly before the cutoff.
pub fn schedule_next_arrival(
    clock: &mut SimulationClock,
    streams: &mut RandomStreams,
    schedule: &ArrivalSchedule,
) -> Result<bool, SimError> {
    let now = clock.now();
    match streams.next_arrival_ms(&schedule.process, now) {
        Some(next) if schedule.admits(next) => {
            clock.schedule_at(next, EventKind::Arrival, None)?;
            Ok(true)
        }
        _ => Ok(false),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy_ecs::prelude::{Schedule, World};

    use crate::clock::ONE_MIN_MS;
    use crate::scenario::{build_replication, ClinicParams};

    fn world_at_arrival(params: &ClinicParams, at_ms: u64) -> World {
        let mut world = World::new();
        build_replication(&mut world, params, 0).expect("build");
        let event = {
            let mut clock = world.resource_mut::<SimulationClock>();
            clock.schedule_at(at_ms, EventKind::Arrival, None).expect("schedule");
            clock.pop_next().unwrap().expect("arrival")
        };
        world.insert_resource(CurrentEvent(event));
        world
    }

    #[test]
    fn arrival_spawns_patient_and_sends_to_triage() {
        let mut world = world_at_arrival(&ClinicParams::default(), 5 * ONE_MIN_MS);
        let mut schedule = Schedule::default();
        schedule.add_systems(arrival_system);
        schedule.run(&mut world);

        let patient = world.query::<&Patient>().single(&world);
        assert_eq!(patient.id, 0);
        assert_eq!(patient.arrived_at, 5 * ONE_MIN_MS);
        assert_eq!(patient.acuity, None);

        let mut clock = world.resource_mut::<SimulationClock>();
        let triage = clock.pop_next().unwrap().expect("station arrival");
        assert_eq!(triage.kind, EventKind::StationArrival);
        assert_eq!(triage.timestamp, 5 * ONE_MIN_MS);
        assert_eq!(triage.visit().map(|(_, station)| station), Some(StationKind::Triage));

        let next = clock.pop_next().unwrap().expect("next arrival");
        assert_eq!(next.kind, EventKind::Arrival);
        assert!(next.timestamp >= 5 * ONE_MIN_MS);
    }

    #[test]
    fn no_arrival_is_scheduled_at_or_past_the_cutoff() {
        let params = ClinicParams::default().with_arrivals_cutoff_minutes(10.0);
        let mut world = world_at_arrival(&params, 10 * ONE_MIN_MS - 1);
        let mut schedule = Schedule::default();
        schedule.add_systems(arrival_system);
        schedule.run(&mut world);

        let mut clock = world.resource_mut::<SimulationClock>();
        let kinds: Vec<_> = std::iter::from_fn(|| clock.pop_next().unwrap())
            .map(|event| event.kind)
            .collect();
        assert_eq!(kinds, vec![EventKind::StationArrival]);
    }
}
