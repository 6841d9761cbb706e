use bevy_ecs::prelude::{Res, ResMut};

use crate::clock::{CurrentEvent, EventKind, SimulationClock};
use crate::scenario::ArrivalSchedule;
use crate::telemetry::ClinicTelemetry;

/// Closes the doors. Patients already inside keep flowing until discharged.
pub fn end_of_arrivals_system(
    event: Res<CurrentEvent>,
    clock: Res<SimulationClock>,
    mut schedule: ResMut<ArrivalSchedule>,
    telemetry: Res<ClinicTelemetry>,
) {
    if event.0.kind != EventKind::EndOfArrivals {
        return;
    }
    schedule.open = false;
    tracing::debug!(
        at_ms = clock.now(),
        admitted = telemetry.arrivals,
        in_system = telemetry.in_system(),
        "arrivals closed"
    );
}
