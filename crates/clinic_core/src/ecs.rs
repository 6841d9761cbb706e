use bevy_ecs::prelude::Component;
use serde::Serialize;

use crate::station::StationKind;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Acuity {
    Trauma,
    NonTrauma,
}

/// Where a patient is in the clinic. `At` covers both queueing and service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PatientState {
    Arrived,
    At(StationKind),
    Discharged,
}

/// One pass through a station.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StationVisit {
    pub station: StationKind,
    pub entered_at: u64,
    /// Set when a server is seized.
    pub seized_at: Option<u64>,
    /// Set when service completes.
    pub exited_at: Option<u64>,
}

impl StationVisit {
    /// Time from joining the station to seizing a server.
    pub fn wait_ms(&self) -> Option<u64> {
        self.seized_at.map(|seized| seized.saturating_sub(self.entered_at))
    }
}

#[derive(Debug, Clone, PartialEq, Component)]
pub struct Patient {
    pub id: u64,
    pub arrived_at: u64,
    /// Unknown until triage completes.
    pub acuity: Option<Acuity>,
    pub state: PatientState,
    pub visits: Vec<StationVisit>,
    pub total_wait_ms: u64,
}

impl Patient {
    pub fn new(id: u64, arrived_at: u64) -> Self {
        Self {
            id,
            arrived_at,
            acuity: None,
            state: PatientState::Arrived,
            visits: Vec::with_capacity(4),
            total_wait_ms: 0,
        }
    }

    pub fn is_trauma(&self) -> bool {
        self.acuity == Some(Acuity::Trauma)
    }

    pub fn current_visit(&self) -> Option<&StationVisit> {
        self.visits.last()
    }

    pub fn current_visit_mut(&mut self) -> Option<&mut StationVisit> {
        self.visits.last_mut()
    }

    /// Records joining `station` at `now`.
    pub fn enter(&mut self, station: StationKind, now: u64) {
        self.state = PatientState::At(station);
        self.visits.push(StationVisit {
            station,
            entered_at: now,
            seized_at: None,
            exited_at: None,
        });
    }
}
