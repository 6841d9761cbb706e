//! Telemetry: patient counts, discharge records and event counters for one replication.

use std::collections::BTreeMap;

use bevy_ecs::prelude::Resource;
use serde::Serialize;

use crate::clock::{ms_to_minutes, EventKind};
use crate::ecs::{Acuity, Patient};
use crate::routing::DischargePath;
use crate::statistics::{Collector, DiscreteStat};

/// One discharged patient, archived when the entity is despawned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DischargeRecord {
    pub patient_id: u64,
    pub acuity: Acuity,
    pub path: DischargePath,
    pub arrived_at: u64,
    pub discharged_at: u64,
    pub total_wait_ms: u64,
    pub stations_visited: usize,
}

impl DischargeRecord {
    pub fn time_in_system_ms(&self) -> u64 {
        self.discharged_at.saturating_sub(self.arrived_at)
    }
}

#[derive(Debug, Default, Resource)]
pub struct ClinicTelemetry {
    next_patient_id: u64,
    pub arrivals: u64,
    pub trauma: u64,
    pub non_trauma: u64,
    pub discharged: u64,
    pub discharged_after_examination: u64,
    pub discharged_after_treatment: u64,
    pub discharges: Vec<DischargeRecord>,
    pub time_in_system: DiscreteStat,
    pub events_by_kind: BTreeMap<EventKind, u64>,
}

impl ClinicTelemetry {
    /// Registers a new arrival and returns its patient id.
    pub fn admit(&mut self) -> u64 {
        let id = self.next_patient_id;
        self.next_patient_id += 1;
        self.arrivals += 1;
        id
    }

    pub fn record_acuity(&mut self, acuity: Acuity) {
        match acuity {
            Acuity::Trauma => self.trauma += 1,
            Acuity::NonTrauma => self.non_trauma += 1,
        }
    }

    pub fn record_discharge(&mut self, patient: &Patient, path: DischargePath, now: u64) {
        self.discharged += 1;
        match path {
            DischargePath::AfterExamination => self.discharged_after_examination += 1,
            DischargePath::AfterTreatment | DischargePath::TraumaAfterTreatment => {
                self.discharged_after_treatment += 1
            }
        }
        let record = DischargeRecord {
            patient_id: patient.id,
            acuity: match path {
                DischargePath::TraumaAfterTreatment => Acuity::Trauma,
                _ => Acuity::NonTrauma,
            },
            path,
            arrived_at: patient.arrived_at,
            discharged_at: now,
            total_wait_ms: patient.total_wait_ms,
            stations_visited: patient.visits.len(),
        };
        self.time_in_system
            .observe(ms_to_minutes(record.time_in_system_ms()));
        self.discharges.push(record);
    }

    pub fn record_event(&mut self, kind: EventKind) {
        *self.events_by_kind.entry(kind).or_insert(0) += 1;
    }

    pub fn events_processed(&self) -> u64 {
        self.events_by_kind.values().sum()
    }

    /// Patients admitted and not yet discharged.
    pub fn in_system(&self) -> u64 {
        self.arrivals.saturating_sub(self.discharged)
    }
}
