//! Scenario setup: replication parameters and world construction.
//!
//! A replication is fully described by [ClinicParams] plus its replication
//! index; [build_replication] turns that into fresh ECS resources.

mod build;
mod params;

pub use build::build_replication;
pub use params::{
    ArrivalSchedule, ClinicParams, ServiceTimes, StaffingPlan, DEFAULT_ARRIVALS_CUTOFF_MIN,
    DEFAULT_MAX_STEPS,
};
