//! Patient routing between stations.
//!
//! Triage → (Trauma | Registration). Registration → Examination.
//! Examination → (Discharge | Treatment). Trauma → Treatment → Discharge.
//! The two branch points each draw from their own stream.

use bevy_ecs::prelude::Resource;
use serde::Serialize;

use crate::ecs::{Acuity, Patient};
use crate::error::SimError;
use crate::station::StationKind;
use crate::streams::{RandomStreams, StreamRole};

/// Probability of discharge straight after examination.
pub const DEFAULT_DIRECT_DISCHARGE_PROBABILITY: f64 = 0.40;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    To(StationKind),
    Discharge,
}

/// How a patient left the clinic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DischargePath {
    /// Non-trauma, discharged straight from examination.
    AfterExamination,
    /// Non-trauma, discharged after treatment.
    AfterTreatment,
    /// Trauma, discharged after treatment.
    TraumaAfterTreatment,
}

#[derive(Debug, Clone, Copy, PartialEq, Resource)]
pub struct RoutingTable {
    pub trauma_fraction: f64,
    pub direct_discharge_probability: f64,
}

impl Default for RoutingTable {
    fn default() -> Self {
        Self {
            trauma_fraction: 0.10,
            direct_discharge_probability: DEFAULT_DIRECT_DISCHARGE_PROBABILITY,
        }
    }
}

impl RoutingTable {
    pub fn new(trauma_fraction: f64, direct_discharge_probability: f64) -> Result<Self, SimError> {
        let table = Self {
            trauma_fraction,
            direct_discharge_probability,
        };
        table.validate()?;
        Ok(table)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        let probability = |name: &str, value: f64| {
            if (0.0..=1.0).contains(&value) {
                Ok(())
            } else {
                Err(SimError::config(format!("{name} must be within [0, 1], got {value}")))
            }
        };
        probability("trauma fraction", self.trauma_fraction)?;
        probability("direct discharge probability", self.direct_discharge_probability)
    }

    /// Decides where `patient` goes after finishing at `from`. Acuity is
    /// assessed (and stored on the patient) when triage completes.
    pub fn next(
        &self,
        from: StationKind,
        patient: &mut Patient,
        streams: &mut RandomStreams,
    ) -> Result<Route, SimError> {
        let route = match from {
            StationKind::Triage => {
                let acuity = if streams.bernoulli(StreamRole::AcuityDecision, self.trauma_fraction) {
                    Acuity::Trauma
                } else {
                    Acuity::NonTrauma
                };
                patient.acuity = Some(acuity);
                match acuity {
                    Acuity::Trauma => Route::To(StationKind::Trauma),
                    Acuity::NonTrauma => Route::To(StationKind::Registration),
                }
            }
            StationKind::Registration => Route::To(StationKind::Examination),
            StationKind::Examination => {
                if streams.bernoulli(
                    StreamRole::DischargeDecision,
                    self.direct_discharge_probability,
                ) {
                    Route::Discharge
                } else {
                    Route::To(StationKind::Treatment)
                }
            }
            StationKind::Trauma => Route::To(StationKind::Treatment),
            StationKind::Treatment => Route::Discharge,
        };

        if patient.acuity.is_none() {
            return Err(SimError::invariant(format!(
                "patient {} left {from} without an acuity assessment",
                patient.id
            )));
        }
        Ok(route)
    }

    /// Discharge path implied by the station a patient leaves from.
    pub fn discharge_path(from: StationKind, patient: &Patient) -> Option<DischargePath> {
        match (from, patient.acuity) {
            (StationKind::Examination, Some(Acuity::NonTrauma)) => {
                Some(DischargePath::AfterExamination)
            }
            (StationKind::Treatment, Some(Acuity::NonTrauma)) => Some(DischargePath::AfterTreatment),
            (StationKind::Treatment, Some(Acuity::Trauma)) => {
                Some(DischargePath::TraumaAfterTreatment)
            }
            _ => None,
        }
    }
}
