//! Test helpers for common test setup and utilities.
//!
//! Shared by unit tests and the integration tests under `tests/`.

use bevy_ecs::prelude::{Entity, World};

use crate::ecs::{Acuity, Patient};
use crate::scenario::{build_replication, ClinicParams, StaffingPlan};
use crate::station::{StationKind, Stations};

/// Seed used by fixtures so every test sees the same sample path.
pub const TEST_SEED: u64 = 0x5eed_c11c;

/// Light load with the default staffing; drains in a few thousand events.
pub fn quiet_params() -> ClinicParams {
    ClinicParams::default()
        .with_daily_load(30)
        .with_seed(TEST_SEED)
}

/// One server everywhere, so queues form quickly.
pub fn single_server_staffing() -> StaffingPlan {
    StaffingPlan::new([1; 5])
}

/// Create a world with every replication resource for `params`, replication 0.
///
/// # Panics
///
/// Panics if `params` are invalid.
pub fn create_test_world(params: &ClinicParams) -> World {
    let mut world = World::new();
    build_replication(&mut world, params, 0).expect("test params should be valid");
    world
}

/// Spawns a patient who seized a server at `station` at `seized_at` after
/// joining at `entered_at`.
///
/// # Panics
///
/// Panics if the station has no free server.
pub fn spawn_in_service(
    world: &mut World,
    id: u64,
    station: StationKind,
    acuity: Option<Acuity>,
    entered_at: u64,
    seized_at: u64,
) -> Entity {
    let mut patient = Patient::new(id, entered_at);
    patient.acuity = acuity;
    patient.enter(station, entered_at);
    if let Some(visit) = patient.current_visit_mut() {
        visit.seized_at = Some(seized_at);
    }
    patient.total_wait_ms = seized_at.saturating_sub(entered_at);
    world
        .resource_mut::<Stations>()
        .get_mut(station)
        .seize(seized_at)
        .expect("station should have a free server");
    world.spawn(patient).id()
}
