#![allow(dead_code)]

use bevy_ecs::prelude::World;
use clinic_core::clock::SimulationClock;
use clinic_core::runner::initialize_simulation;
use clinic_core::scenario::{build_replication, ClinicParams};
use clinic_core::test_helpers::quiet_params;

/// Helper that builds a replication world ready to run.
#[derive(Debug, Clone)]
pub struct TestWorldBuilder {
    params: ClinicParams,
    replication: u64,
    initialize: bool,
}

impl Default for TestWorldBuilder {
    fn default() -> Self {
        Self {
            params: quiet_params(),
            replication: 0,
            initialize: true,
        }
    }
}

impl TestWorldBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_params(mut self, params: ClinicParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_replication(mut self, replication: u64) -> Self {
        self.replication = replication;
        self
    }

    /// Leave the calendar empty so tests can schedule their own events.
    pub fn without_initial_events(mut self) -> Self {
        self.initialize = false;
        self
    }

    pub fn params(&self) -> &ClinicParams {
        &self.params
    }

    pub fn build(self) -> World {
        let mut world = World::new();
        build_replication(&mut world, &self.params, self.replication).expect("valid params");
        if self.initialize {
            initialize_simulation(&mut world).expect("initialize");
        } else {
            assert!(world.resource::<SimulationClock>().is_empty());
        }
        world
    }
}
