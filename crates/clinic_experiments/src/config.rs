//! Scenario and sweep configuration.
//!
//! Configs are plain values built with `with_*` methods or loaded from TOML.

use std::path::Path;

use clinic_core::scenario::ClinicParams;
use serde::{Deserialize, Serialize};

use crate::error::ExperimentError;
use crate::parameters::SweepSpace;
use crate::service_levels::{ServiceLevelThresholds, VerdictBasis};

/// Default number of replications per scenario.
pub const DEFAULT_REPLICATIONS: u32 = 30;

/// Default two-sided confidence level.
pub const DEFAULT_CONFIDENCE: f64 = 0.95;

/// What to do when a replication fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Any failed replication fails the whole scenario.
    #[default]
    AbortScenario,
    /// Drop failed replications and report the reduced sample size.
    DiscardFailed,
}

/// One experimental condition, replicated `replications` times.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub label: String,
    pub params: ClinicParams,
    pub replications: u32,
    pub confidence: f64,
    pub thresholds: ServiceLevelThresholds,
    pub verdict_basis: VerdictBasis,
    pub failure_policy: FailurePolicy,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            label: "baseline".to_string(),
            params: ClinicParams::default(),
            replications: DEFAULT_REPLICATIONS,
            confidence: DEFAULT_CONFIDENCE,
            thresholds: ServiceLevelThresholds::default(),
            verdict_basis: VerdictBasis::default(),
            failure_policy: FailurePolicy::default(),
        }
    }
}

impl ScenarioConfig {
    pub fn new(params: ClinicParams) -> Self {
        Self {
            params,
            ..Self::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    pub fn with_params(mut self, params: ClinicParams) -> Self {
        self.params = params;
        self
    }

    pub fn with_replications(mut self, replications: u32) -> Self {
        self.replications = replications;
        self
    }

    pub fn with_confidence(mut self, confidence: f64) -> Self {
        self.confidence = confidence;
        self
    }

    pub fn with_thresholds(mut self, thresholds: ServiceLevelThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    pub fn with_verdict_basis(mut self, basis: VerdictBasis) -> Self {
        self.verdict_basis = basis;
        self
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Rejects the scenario before anything is simulated.
    pub fn validate(&self) -> Result<(), ExperimentError> {
        self.params
            .validate()
            .map_err(ExperimentError::invalid_params)?;
        if self.replications == 0 {
            return Err(ExperimentError::config(format!(
                "scenario '{}' needs at least one replication",
                self.label
            )));
        }
        if !(self.confidence > 0.0 && self.confidence < 1.0) {
            return Err(ExperimentError::config(format!(
                "confidence must be in (0, 1), got {}",
                self.confidence
            )));
        }
        self.thresholds.validate().map_err(ExperimentError::Config)
    }
}

/// A grid of scenarios sharing one base configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SweepConfig {
    /// Threads for the rayon pool; rayon's default when unset.
    pub num_threads: Option<usize>,
    pub show_progress: bool,
    pub base: ScenarioConfig,
    pub space: SweepSpace,
}

impl SweepConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ExperimentError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ExperimentError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }

    /// Expands the grid into scenarios, in deterministic order.
    pub fn scenarios(&self) -> Result<Vec<ScenarioConfig>, ExperimentError> {
        self.space.generate(&self.base)
    }
}
