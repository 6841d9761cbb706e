//! Errors raised while configuring, running or exporting experiments.

use clinic_core::SimError;

#[derive(Debug, thiserror::Error)]
pub enum ExperimentError {
    /// Rejected before any replication ran.
    #[error("invalid experiment configuration: {0}")]
    Config(String),

    #[error("sweep aborted before completion")]
    Aborted,

    #[error("replication {replication} failed: {source}")]
    ReplicationFailed {
        replication: u64,
        #[source]
        source: SimError,
    },

    /// The optimiser's starting plan already misses a service level.
    #[error("baseline staffing {staffing} does not meet service levels")]
    InfeasibleBaseline { staffing: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),
}

impl ExperimentError {
    pub fn config(message: impl Into<String>) -> Self {
        ExperimentError::Config(message.into())
    }

    /// Maps a parameter validation failure from the kernel.
    pub(crate) fn invalid_params(error: SimError) -> Self {
        match error {
            SimError::Config(message) => ExperimentError::Config(message),
            other => ExperimentError::Config(other.to_string()),
        }
    }
}
