//! Discrete-event simulation of patient flow through a five-station walk-in clinic.
//!
//! A replication runs on a `bevy_ecs` [World](bevy_ecs::prelude::World): patients
//! are entities, stations/streams/calendar are resources, and each event kind
//! has one system. [replication::run_replication] is the usual entry point.

pub mod clock;
pub mod distributions;
pub mod ecs;
pub mod error;
pub mod replication;
pub mod routing;
pub mod runner;
pub mod scenario;
pub mod station;
pub mod statistics;
pub mod streams;
pub mod systems;
pub mod telemetry;

#[cfg(any(test, feature = "test-helpers"))]
pub mod test_helpers;

pub use error::SimError;
pub use replication::{run_replication, ReplicationSummary};
pub use scenario::{ClinicParams, StaffingPlan};
