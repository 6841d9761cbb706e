//! Service-level thresholds and per-station verdicts.
//!
//! A station passes when its mean wait (or the upper end of the wait
//! confidence interval) is inside the station's threshold.

use clinic_core::station::StationKind;
use serde::{Deserialize, Serialize};

use crate::confidence::Estimate;

/// How a wait is compared with its limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Comparison {
    StrictlyBelow,
    AtMost,
}

/// Wait limit for one station, in minutes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Threshold {
    pub limit_minutes: f64,
    pub comparison: Comparison,
}

impl Threshold {
    pub fn below(limit_minutes: f64) -> Self {
        Self {
            limit_minutes,
            comparison: Comparison::StrictlyBelow,
        }
    }

    pub fn at_most(limit_minutes: f64) -> Self {
        Self {
            limit_minutes,
            comparison: Comparison::AtMost,
        }
    }

    pub fn is_met_by(&self, wait_minutes: f64) -> bool {
        match self.comparison {
            Comparison::StrictlyBelow => wait_minutes < self.limit_minutes,
            Comparison::AtMost => wait_minutes <= self.limit_minutes,
        }
    }
}

/// Per-station wait limits.
///
/// # Defaults
///
/// - Triage: under 2 minutes
/// - Trauma: under 5 minutes
/// - Registration, Examination, Treatment: at most 20 minutes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceLevelThresholds {
    pub triage: Threshold,
    pub registration: Threshold,
    pub examination: Threshold,
    pub trauma: Threshold,
    pub treatment: Threshold,
}

impl Default for ServiceLevelThresholds {
    fn default() -> Self {
        Self {
            triage: Threshold::below(2.0),
            registration: Threshold::at_most(20.0),
            examination: Threshold::at_most(20.0),
            trauma: Threshold::below(5.0),
            treatment: Threshold::at_most(20.0),
        }
    }
}

impl ServiceLevelThresholds {
    pub fn for_station(&self, station: StationKind) -> Threshold {
        match station {
            StationKind::Triage => self.triage,
            StationKind::Registration => self.registration,
            StationKind::Examination => self.examination,
            StationKind::Trauma => self.trauma,
            StationKind::Treatment => self.treatment,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        for station in StationKind::ALL {
            let limit = self.for_station(station).limit_minutes;
            if !limit.is_finite() || limit < 0.0 {
                return Err(format!("{station} wait limit must be finite and non-negative"));
            }
        }
        Ok(())
    }
}

/// Which side of the wait estimate is held against the threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerdictBasis {
    /// Upper confidence bound: the level is met with the configured confidence.
    #[default]
    UpperBound,
    Mean,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ServiceLevelVerdict {
    Pass,
    Fail,
    /// No replication observed a wait at this station.
    NoData,
}

impl ServiceLevelVerdict {
    /// `NoData` does not count against a scenario.
    pub fn is_acceptable(self) -> bool {
        !matches!(self, ServiceLevelVerdict::Fail)
    }
}

/// Judges one station's wait estimate.
pub fn evaluate(threshold: Threshold, wait: &Estimate, basis: VerdictBasis) -> ServiceLevelVerdict {
    if wait.is_empty() {
        return ServiceLevelVerdict::NoData;
    }
    let value = match basis {
        VerdictBasis::UpperBound => wait.upper,
        VerdictBasis::Mean => wait.mean,
    };
    if threshold.is_met_by(value) {
        ServiceLevelVerdict::Pass
    } else {
        ServiceLevelVerdict::Fail
    }
}
