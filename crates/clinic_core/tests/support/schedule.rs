#![allow(dead_code)]

use bevy_ecs::prelude::World;
use bevy_ecs::schedule::Schedule;
use clinic_core::clock::Event;
use clinic_core::error::SimError;
use clinic_core::runner::{
    run_next_event, run_until_drained, run_until_drained_with_hook, simulation_schedule,
};
use clinic_core::scenario::DEFAULT_MAX_STEPS;

/// Helper that owns a reusable `Schedule` so tests can step or drain the calendar.
pub struct ScheduleRunner {
    schedule: Schedule,
}

impl Default for ScheduleRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl ScheduleRunner {
    pub fn new() -> Self {
        Self {
            schedule: simulation_schedule(),
        }
    }

    /// Run a single event (returns `true` if an event was processed).
    pub fn run_one(&mut self, world: &mut World) -> bool {
        run_next_event(world, &mut self.schedule).expect("event")
    }

    pub fn try_drain(&mut self, world: &mut World) -> Result<usize, SimError> {
        run_until_drained(world, &mut self.schedule, DEFAULT_MAX_STEPS)
    }

    /// Drain the replication, panicking on any engine fault.
    pub fn drain(&mut self, world: &mut World) -> usize {
        self.try_drain(world).expect("replication should drain")
    }

    pub fn drain_with_hook<F>(&mut self, world: &mut World, hook: F) -> usize
    where
        F: FnMut(&World, &Event),
    {
        run_until_drained_with_hook(world, &mut self.schedule, DEFAULT_MAX_STEPS, hook)
            .expect("replication should drain")
    }
}
