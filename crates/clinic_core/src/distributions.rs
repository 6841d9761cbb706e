//! Probability distributions for service times and patient inter-arrival times.
//!
//! Service times are drawn in minutes and must be strictly positive; normal and
//! lognormal draws that come out non-positive are resampled a bounded number of
//! times. Inter-arrival distributions produce absolute arrival times in
//! simulation milliseconds.

use rand::{Rng, RngCore};
use serde::{Deserialize, Serialize};

use crate::clock::{minutes_to_ms, ONE_HOUR_MS, ONE_MIN_MS};
use crate::error::SimError;
use crate::streams::StreamRole;

/// Resample budget for non-positive normal/lognormal draws.
pub const MAX_RESAMPLE_ATTEMPTS: u32 = 100;

/// Service-time distribution family and parameters, in minutes.
///
/// `variance` is the variance of the resulting service time (not of the
/// underlying normal for the lognormal family).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "family", rename_all = "snake_case")]
pub enum ServiceTimeDistribution {
    Exponential { mean: f64 },
    Lognormal { mean: f64, variance: f64 },
    Normal { mean: f64, variance: f64 },
}

impl ServiceTimeDistribution {
    pub fn exponential(mean: f64) -> Self {
        ServiceTimeDistribution::Exponential { mean }
    }

    pub fn lognormal(mean: f64, variance: f64) -> Self {
        ServiceTimeDistribution::Lognormal { mean, variance }
    }

    pub fn normal(mean: f64, variance: f64) -> Self {
        ServiceTimeDistribution::Normal { mean, variance }
    }

    pub fn mean(&self) -> f64 {
        match *self {
            ServiceTimeDistribution::Exponential { mean }
            | ServiceTimeDistribution::Lognormal { mean, .. }
            | ServiceTimeDistribution::Normal { mean, .. } => mean,
        }
    }

    pub fn validate(&self) -> Result<(), SimError> {
        let positive = |name: &str, value: f64| {
            if value.is_finite() && value > 0.0 {
                Ok(())
            } else {
                Err(SimError::config(format!(
                    "{name} must be positive and finite, got {value} ({self:?})"
                )))
            }
        };
        match *self {
            ServiceTimeDistribution::Exponential { mean } => positive("mean", mean),
            ServiceTimeDistribution::Lognormal { mean, variance }
            | ServiceTimeDistribution::Normal { mean, variance } => {
                positive("mean", mean)?;
                positive("variance", variance)
            }
        }
    }

    /// Draws a strictly positive service time in minutes.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R, role: StreamRole) -> Result<f64, SimError> {
        self.validate()?;
        first_positive(role, || self.sample_raw(rng))
    }

    fn sample_raw<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        match *self {
            ServiceTimeDistribution::Exponential { mean } => exponential(rng, mean),
            ServiceTimeDistribution::Normal { mean, variance } => {
                mean + variance.sqrt() * standard_normal(rng)
            }
            ServiceTimeDistribution::Lognormal { mean, variance } => {
                let sigma_sq = (1.0 + variance / (mean * mean)).ln();
                let mu = mean.ln() - sigma_sq / 2.0;
                (mu + sigma_sq.sqrt() * standard_normal(rng)).exp()
            }
        }
    }
}

fn first_positive(role: StreamRole, mut draw: impl FnMut() -> f64) -> Result<f64, SimError> {
    for _ in 0..MAX_RESAMPLE_ATTEMPTS {
        let value = draw();
        if value > 0.0 && value.is_finite() {
            return Ok(value);
        }
    }
    Err(SimError::Distribution {
        role,
        attempts: MAX_RESAMPLE_ATTEMPTS,
    })
}

/// Exponential variate by inverse transform: -ln(U) * mean.
pub fn exponential<R: Rng + ?Sized>(rng: &mut R, mean: f64) -> f64 {
    let u: f64 = rng.gen();
    let u = u.max(1e-300); // Avoid ln(0)
    -u.ln() * mean
}

/// Standard normal variate via Box-Muller (one of the pair is discarded so
/// each call consumes exactly two uniforms).
pub fn standard_normal<R: Rng + ?Sized>(rng: &mut R) -> f64 {
    let u1: f64 = rng.gen();
    let u2: f64 = rng.gen();
    let u1 = u1.max(1e-300);
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// Produces patient arrival times.
pub trait InterArrivalDistribution: Send + Sync + std::fmt::Debug {
    /// Absolute time (ms) of the next arrival after `current_time_ms`, or `None`
    /// when the process produces no further arrivals.
    fn next_arrival_ms(&self, rng: &mut dyn RngCore, current_time_ms: u64) -> Option<u64>;
}

/// Homogeneous Poisson arrivals spread evenly over the operating day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StationaryArrivals {
    /// Mean gap between arrivals, in minutes.
    pub mean_interarrival_min: f64,
}

impl StationaryArrivals {
    /// `patients_per_day` arrivals expected over `operating_minutes`.
    pub fn from_daily_load(patients_per_day: u32, operating_minutes: f64) -> Self {
        Self {
            mean_interarrival_min: operating_minutes / patients_per_day.max(1) as f64,
        }
    }
}

impl InterArrivalDistribution for StationaryArrivals {
    fn next_arrival_ms(&self, rng: &mut dyn RngCore, current_time_ms: u64) -> Option<u64> {
        let gap = exponential(rng, self.mean_interarrival_min);
        Some(current_time_ms.saturating_add(minutes_to_ms(gap)))
    }
}

/// Non-stationary Poisson arrivals with a piecewise-constant hourly rate,
/// sampled by thinning against the peak hourly rate.
#[derive(Debug, Clone, PartialEq)]
pub struct HourlyArrivals {
    /// Expected arrivals per hour, one entry per operating hour from open.
    pub patients_per_hour: Vec<f64>,
    peak_per_hour: f64,
}

impl HourlyArrivals {
    pub fn new(patients_per_hour: Vec<f64>) -> Self {
        let peak_per_hour = patients_per_hour.iter().copied().fold(0.0, f64::max);
        Self {
            patients_per_hour,
            peak_per_hour,
        }
    }

    pub fn rate_at(&self, time_ms: u64) -> f64 {
        let hour = (time_ms / ONE_HOUR_MS) as usize;
        self.patients_per_hour.get(hour).copied().unwrap_or(0.0)
    }

    pub fn expected_daily_arrivals(&self) -> f64 {
        self.patients_per_hour.iter().sum()
    }

    fn horizon_ms(&self) -> u64 {
        self.patients_per_hour.len() as u64 * ONE_HOUR_MS
    }
}

impl InterArrivalDistribution for HourlyArrivals {
    fn next_arrival_ms(&self, rng: &mut dyn RngCore, current_time_ms: u64) -> Option<u64> {
        if self.peak_per_hour <= 0.0 {
            return None;
        }
        let mean_gap_min = 60.0 / self.peak_per_hour;
        let horizon = self.horizon_ms();
        let mut t = current_time_ms;
        loop {
            t = t.saturating_add(minutes_to_ms(exponential(rng, mean_gap_min)).max(1));
            if t >= horizon {
                return None;
            }
            let accept: f64 = rng.gen();
            if accept * self.peak_per_hour < self.rate_at(t) {
                return Some(t);
            }
        }
    }
}

/// Arrival process configuration for a replication.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArrivalProfile {
    /// Constant rate: `patients_per_day` over the operating window.
    Stationary { patients_per_day: u32 },
    /// Hourly rates (patients/hour) starting at clinic open.
    Hourly { patients_per_hour: Vec<f64> },
}

impl ArrivalProfile {
    pub fn validate(&self) -> Result<(), SimError> {
        match self {
            ArrivalProfile::Stationary { patients_per_day } => {
                if *patients_per_day == 0 {
                    return Err(SimError::config("daily patient load must be positive"));
                }
            }
            ArrivalProfile::Hourly { patients_per_hour } => {
                if patients_per_hour.is_empty() {
                    return Err(SimError::config("hourly arrival profile is empty"));
                }
                if let Some(bad) = patients_per_hour
                    .iter()
                    .find(|rate| !rate.is_finite() || **rate < 0.0)
                {
                    return Err(SimError::config(format!(
                        "hourly arrival rate must be finite and non-negative, got {bad}"
                    )));
                }
                if patients_per_hour.iter().all(|rate| *rate == 0.0) {
                    return Err(SimError::config("hourly arrival profile has no arrivals"));
                }
            }
        }
        Ok(())
    }

    /// Expected arrivals over `operating_minutes`.
    pub fn expected_arrivals(&self, operating_minutes: f64) -> f64 {
        match self {
            ArrivalProfile::Stationary { patients_per_day } => *patients_per_day as f64,
            ArrivalProfile::Hourly { patients_per_hour } => patients_per_hour
                .iter()
                .take((operating_minutes * ONE_MIN_MS as f64 / ONE_HOUR_MS as f64).ceil() as usize)
                .sum(),
        }
    }
}

/// Concrete arrival process built from an [ArrivalProfile].
#[derive(Debug, Clone, PartialEq)]
pub enum ArrivalProcess {
    Stationary(StationaryArrivals),
    Hourly(HourlyArrivals),
}

impl ArrivalProcess {
    pub fn from_profile(profile: &ArrivalProfile, operating_minutes: f64) -> Self {
        match profile {
            ArrivalProfile::Stationary { patients_per_day } => ArrivalProcess::Stationary(
                StationaryArrivals::from_daily_load(*patients_per_day, operating_minutes),
            ),
            ArrivalProfile::Hourly { patients_per_hour } => {
                ArrivalProcess::Hourly(HourlyArrivals::new(patients_per_hour.clone()))
            }
        }
    }

    fn as_distribution(&self) -> &dyn InterArrivalDistribution {
        match self {
            ArrivalProcess::Stationary(process) => process,
            ArrivalProcess::Hourly(process) => process,
        }
    }

    pub fn next_arrival_ms(&self, rng: &mut dyn RngCore, current_time_ms: u64) -> Option<u64> {
        self.as_distribution().next_arrival_ms(rng, current_time_ms)
    }
}
