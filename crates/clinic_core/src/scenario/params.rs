use bevy_ecs::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::clock::minutes_to_ms;
use crate::distributions::{ArrivalProcess, ArrivalProfile, ServiceTimeDistribution};
use crate::error::SimError;
use crate::routing::{RoutingTable, DEFAULT_DIRECT_DISCHARGE_PROBABILITY};
use crate::station::{ServiceProfile, StationKind};

/// Default arrivals window: 18 operating hours, in minutes.
pub const DEFAULT_ARRIVALS_CUTOFF_MIN: f64 = 18.0 * 60.0;

/// Default step ceiling for one replication.
pub const DEFAULT_MAX_STEPS: usize = 5_000_000;

/// Servers per station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StaffingPlan {
    pub triage: u32,
    pub registration: u32,
    pub examination: u32,
    pub trauma: u32,
    pub treatment: u32,
}

impl StaffingPlan {
    /// Capacities in [StationKind::ALL] order.
    pub fn new([triage, registration, examination, trauma, treatment]: [u32; 5]) -> Self {
        Self {
            triage,
            registration,
            examination,
            trauma,
            treatment,
        }
    }

    pub fn capacity(&self, station: StationKind) -> u32 {
        match station {
            StationKind::Triage => self.triage,
            StationKind::Registration => self.registration,
            StationKind::Examination => self.examination,
            StationKind::Trauma => self.trauma,
            StationKind::Treatment => self.treatment,
        }
    }

    pub fn with_capacity(mut self, station: StationKind, servers: u32) -> Self {
        let slot = match station {
            StationKind::Triage => &mut self.triage,
            StationKind::Registration => &mut self.registration,
            StationKind::Examination => &mut self.examination,
            StationKind::Trauma => &mut self.trauma,
            StationKind::Treatment => &mut self.treatment,
        };
        *slot = servers;
        self
    }

    pub fn total_servers(&self) -> u32 {
        self.iter().map(|(_, servers)| servers).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = (StationKind, u32)> + '_ {
        StationKind::ALL
            .into_iter()
            .map(move |station| (station, self.capacity(station)))
    }

    pub fn validate(&self) -> Result<(), SimError> {
        for (station, servers) in self.iter() {
            if servers == 0 {
                return Err(SimError::config(format!(
                    "{station} needs at least one server"
                )));
            }
        }
        Ok(())
    }
}

impl Default for StaffingPlan {
    /// Baseline staffing for 75 patients/day.
    fn default() -> Self {
        Self::new([2, 2, 3, 2, 3])
    }
}

impl std::fmt::Display for StaffingPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(station, servers)| format!("{station}={servers}"))
            .collect();
        f.write_str(&parts.join(","))
    }
}

/// Service-time distributions per station, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceTimes {
    pub triage: ServiceTimeDistribution,
    pub registration: ServiceTimeDistribution,
    pub examination: ServiceTimeDistribution,
    pub trauma: ServiceTimeDistribution,
    pub treatment: ServiceTimeDistribution,
    /// Treatment for patients coming from the trauma station.
    pub trauma_treatment: ServiceTimeDistribution,
}

impl Default for ServiceTimes {
    fn default() -> Self {
        Self {
            triage: ServiceTimeDistribution::exponential(3.0),
            registration: ServiceTimeDistribution::lognormal(5.0, 2.0),
            examination: ServiceTimeDistribution::normal(16.0, 3.0),
            trauma: ServiceTimeDistribution::exponential(90.0),
            treatment: ServiceTimeDistribution::lognormal(13.3, 2.0),
            trauma_treatment: ServiceTimeDistribution::lognormal(30.0, 4.0),
        }
    }
}

impl ServiceTimes {
    pub fn profile(&self, station: StationKind) -> ServiceProfile {
        match station {
            StationKind::Triage => ServiceProfile::uniform(self.triage),
            StationKind::Registration => ServiceProfile::uniform(self.registration),
            StationKind::Examination => ServiceProfile::uniform(self.examination),
            StationKind::Trauma => ServiceProfile::uniform(self.trauma),
            StationKind::Treatment => ServiceProfile {
                standard: self.treatment,
                trauma: Some(self.trauma_treatment),
            },
        }
    }

    pub fn validate(&self) -> Result<(), SimError> {
        [
            self.triage,
            self.registration,
            self.examination,
            self.trauma,
            self.treatment,
            self.trauma_treatment,
        ]
        .iter()
        .try_for_each(ServiceTimeDistribution::validate)
    }
}

/// Everything one replication needs. Plain value; replications share nothing else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicParams {
    pub arrivals: ArrivalProfile,
    /// Probability a patient is assessed as trauma at triage.
    pub trauma_fraction: f64,
    pub direct_discharge_probability: f64,
    pub staffing: StaffingPlan,
    pub service_times: ServiceTimes,
    /// No new arrivals at or after this time (minutes since open).
    pub arrivals_cutoff_minutes: f64,
    /// Base seed; replication `r` reads its own slice of every stream.
    pub seed: u64,
    pub max_steps: usize,
}

impl Default for ClinicParams {
    fn default() -> Self {
        Self {
            arrivals: ArrivalProfile::Stationary {
                patients_per_day: 75,
            },
            trauma_fraction: 0.10,
            direct_discharge_probability: DEFAULT_DIRECT_DISCHARGE_PROBABILITY,
            staffing: StaffingPlan::default(),
            service_times: ServiceTimes::default(),
            arrivals_cutoff_minutes: DEFAULT_ARRIVALS_CUTOFF_MIN,
            seed: 2025,
            max_steps: DEFAULT_MAX_STEPS,
        }
    }
}

impl ClinicParams {
    /// Stationary arrivals at `patients_per_day` over the operating window.
    pub fn with_daily_load(mut self, patients_per_day: u32) -> Self {
        self.arrivals = ArrivalProfile::Stationary { patients_per_day };
        self
    }

    /// Non-stationary arrivals from an hourly rate profile.
    pub fn with_hourly_arrivals(mut self, patients_per_hour: Vec<f64>) -> Self {
        self.arrivals = ArrivalProfile::Hourly { patients_per_hour };
        self
    }

    pub fn with_trauma_fraction(mut self, fraction: f64) -> Self {
        self.trauma_fraction = fraction;
        self
    }

    pub fn with_direct_discharge_probability(mut self, probability: f64) -> Self {
        self.direct_discharge_probability = probability;
        self
    }

    pub fn with_staffing(mut self, staffing: StaffingPlan) -> Self {
        self.staffing = staffing;
        self
    }

    pub fn with_service_times(mut self, service_times: ServiceTimes) -> Self {
        self.service_times = service_times;
        self
    }

    pub fn with_arrivals_cutoff_minutes(mut self, minutes: f64) -> Self {
        self.arrivals_cutoff_minutes = minutes;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn with_max_steps(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn routing(&self) -> RoutingTable {
        RoutingTable {
            trauma_fraction: self.trauma_fraction,
            direct_discharge_probability: self.direct_discharge_probability,
        }
    }

    /// Checks every parameter; nothing is simulated when this fails.
    pub fn validate(&self) -> Result<(), SimError> {
        self.arrivals.validate()?;
        self.routing().validate()?;
        self.staffing.validate()?;
        self.service_times.validate()?;
        if !self.arrivals_cutoff_minutes.is_finite() || self.arrivals_cutoff_minutes <= 0.0 {
            return Err(SimError::config(format!(
                "arrivals cutoff must be positive, got {} minutes",
                self.arrivals_cutoff_minutes
            )));
        }
        if self.max_steps == 0 {
            return Err(SimError::config("step limit must be positive"));
        }
        Ok(())
    }
}

/// Arrival generator state for the running replication.
#[derive(Debug, Clone, Resource)]
pub struct ArrivalSchedule {
    pub process: ArrivalProcess,
    pub cutoff_ms: u64,
    /// Cleared by the EndOfArrivals event.
    pub open: bool,
}

impl ArrivalSchedule {
    pub fn from_params(params: &ClinicParams) -> Self {
        Self {
            process: ArrivalProcess::from_profile(&params.arrivals, params.arrivals_cutoff_minutes),
            cutoff_ms: minutes_to_ms(params.arrivals_cutoff_minutes),
            open: true,
        }
    }

    /// True if an arrival at `time_ms` is still admitted.
    pub fn admits(&self, time_ms: u64) -> bool {
        self.open && time_ms < self.cutoff_ms
    }
}
