//! Resource stations: a FIFO queue in front of a fixed pool of servers.

use std::collections::VecDeque;

use bevy_ecs::prelude::{Entity, Resource};
use serde::{Deserialize, Serialize};

use crate::clock::ms_to_minutes;
use crate::distributions::ServiceTimeDistribution;
use crate::ecs::Acuity;
use crate::error::SimError;
use crate::statistics::{Collector, ContinuousStat, DiscreteStat};
use crate::streams::StreamRole;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StationKind {
    #[serde(alias = "sign_in_triage")]
    Triage,
    Registration,
    Examination,
    Trauma,
    Treatment,
}

impl StationKind {
    pub const ALL: [StationKind; 5] = [
        StationKind::Triage,
        StationKind::Registration,
        StationKind::Examination,
        StationKind::Trauma,
        StationKind::Treatment,
    ];

    pub fn index(self) -> usize {
        match self {
            StationKind::Triage => 0,
            StationKind::Registration => 1,
            StationKind::Examination => 2,
            StationKind::Trauma => 3,
            StationKind::Treatment => 4,
        }
    }

    /// The random stream this station's service times come from.
    pub fn service_stream(self) -> StreamRole {
        match self {
            StationKind::Triage => StreamRole::TriageService,
            StationKind::Registration => StreamRole::RegistrationService,
            StationKind::Examination => StreamRole::ExaminationService,
            StationKind::Trauma => StreamRole::TraumaService,
            StationKind::Treatment => StreamRole::TreatmentService,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            StationKind::Triage => "triage",
            StationKind::Registration => "registration",
            StationKind::Examination => "examination",
            StationKind::Trauma => "trauma",
            StationKind::Treatment => "treatment",
        }
    }
}

impl std::fmt::Display for StationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Service-time distributions for a station; trauma patients may use their own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServiceProfile {
    pub standard: ServiceTimeDistribution,
    pub trauma: Option<ServiceTimeDistribution>,
}

impl ServiceProfile {
    pub fn uniform(distribution: ServiceTimeDistribution) -> Self {
        Self {
            standard: distribution,
            trauma: None,
        }
    }

    pub fn distribution_for(&self, acuity: Option<Acuity>) -> &ServiceTimeDistribution {
        match (acuity, &self.trauma) {
            (Some(Acuity::Trauma), Some(trauma)) => trauma,
            _ => &self.standard,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Station {
    kind: StationKind,
    capacity: u32,
    busy: u32,
    queue: VecDeque<Entity>,
    service: ServiceProfile,
    served: u64,
    wait: DiscreteStat,
    queue_length: ContinuousStat,
    busy_servers: ContinuousStat,
}

impl Station {
    pub fn new(kind: StationKind, capacity: u32, service: ServiceProfile) -> Self {
        Self {
            kind,
            capacity,
            busy: 0,
            queue: VecDeque::new(),
            service,
            served: 0,
            wait: DiscreteStat::default(),
            queue_length: ContinuousStat::starting_at(0, 0.0),
            busy_servers: ContinuousStat::starting_at(0, 0.0),
        }
    }

    pub fn kind(&self) -> StationKind {
        self.kind
    }

    pub fn capacity(&self) -> u32 {
        self.capacity
    }

    pub fn busy(&self) -> u32 {
        self.busy
    }

    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub fn has_free_server(&self) -> bool {
        self.busy < self.capacity
    }

    pub fn service(&self) -> &ServiceProfile {
        &self.service
    }

    pub fn wait_stat(&self) -> &DiscreteStat {
        &self.wait
    }

    /// Takes one server. Fails if every server is already busy.
    pub fn seize(&mut self, now: u64) -> Result<(), SimError> {
        if !self.has_free_server() {
            return Err(SimError::invariant(format!(
                "{} seized beyond capacity {}",
                self.kind, self.capacity
            )));
        }
        self.busy += 1;
        self.busy_servers.observe((self.busy as f64, now));
        Ok(())
    }

    /// Returns one server to the pool.
    pub fn release(&mut self, now: u64) -> Result<(), SimError> {
        if self.busy == 0 {
            return Err(SimError::invariant(format!(
                "{} released a server while none were busy",
                self.kind
            )));
        }
        self.busy -= 1;
        self.served += 1;
        self.busy_servers.observe((self.busy as f64, now));
        Ok(())
    }

    /// Appends a patient to the FIFO queue. Only legal while every server is busy.
    pub fn enqueue(&mut self, patient: Entity, now: u64) -> Result<(), SimError> {
        if self.has_free_server() {
            return Err(SimError::invariant(format!(
                "{} queued a patient with {} of {} servers busy",
                self.kind, self.busy, self.capacity
            )));
        }
        self.queue.push_back(patient);
        self.queue_length.observe((self.queue.len() as f64, now));
        Ok(())
    }

    pub fn dequeue(&mut self, now: u64) -> Option<Entity> {
        let patient = self.queue.pop_front()?;
        self.queue_length.observe((self.queue.len() as f64, now));
        Some(patient)
    }

    /// Records a completed wait, in milliseconds.
    pub fn record_wait(&mut self, wait_ms: u64) {
        self.wait.observe(ms_to_minutes(wait_ms));
    }

    pub fn check_invariants(&self) -> Result<(), SimError> {
        if self.busy > self.capacity {
            return Err(SimError::invariant(format!(
                "{} has {} busy servers but capacity {}",
                self.kind, self.busy, self.capacity
            )));
        }
        if !self.queue.is_empty() && self.busy != self.capacity {
            return Err(SimError::invariant(format!(
                "{} has {} queued with only {} of {} servers busy",
                self.kind,
                self.queue.len(),
                self.busy,
                self.capacity
            )));
        }
        Ok(())
    }

    pub fn summary(&self, end_ms: u64) -> StationSummary {
        let busy = self.busy_servers.time_average(end_ms);
        let queue = self.queue_length.time_average(end_ms);
        StationSummary {
            station: self.kind,
            capacity: self.capacity,
            served: self.served,
            waits_recorded: self.wait.count(),
            mean_wait_min: self.wait.mean(),
            wait_variance: self.wait.variance(),
            max_wait_min: self.wait.max(),
            avg_busy_servers: busy.value,
            utilization: busy.value / self.capacity.max(1) as f64,
            avg_queue_length: queue.value,
            max_queue_length: self.queue_length.max() as usize,
            degenerate: busy.degenerate || queue.degenerate,
        }
    }
}

/// Per-station statistics at the end of a replication.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StationSummary {
    pub station: StationKind,
    pub capacity: u32,
    pub served: u64,
    pub waits_recorded: u64,
    pub mean_wait_min: f64,
    pub wait_variance: f64,
    pub max_wait_min: f64,
    pub avg_busy_servers: f64,
    /// Time-averaged fraction of servers busy.
    pub utilization: f64,
    pub avg_queue_length: f64,
    pub max_queue_length: usize,
    /// Zero-length replication; averages are placeholders.
    pub degenerate: bool,
}

/// All five clinic stations, indexed by [StationKind].
#[derive(Debug, Clone, Resource)]
pub struct Stations {
    stations: [Station; 5],
}

impl Stations {
    pub fn new(stations: [Station; 5]) -> Result<Self, SimError> {
        for (station, kind) in stations.iter().zip(StationKind::ALL) {
            if station.kind != kind {
                return Err(SimError::config(format!(
                    "station slot {kind} holds {}",
                    station.kind
                )));
            }
            if station.capacity == 0 {
                return Err(SimError::config(format!("{kind} needs at least one server")));
            }
        }
        Ok(Self { stations })
    }

    pub fn get(&self, kind: StationKind) -> &Station {
        &self.stations[kind.index()]
    }

    pub fn get_mut(&mut self, kind: StationKind) -> &mut Station {
        &mut self.stations[kind.index()]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Station> {
        self.stations.iter()
    }

    pub fn check_invariants(&self) -> Result<(), SimError> {
        self.stations.iter().try_for_each(Station::check_invariants)
    }

    pub fn summaries(&self, end_ms: u64) -> Vec<StationSummary> {
        self.stations.iter().map(|s| s.summary(end_ms)).collect()
    }
}
