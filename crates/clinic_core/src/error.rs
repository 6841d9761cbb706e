//! Error types for the simulation kernel.
//!
//! Systems cannot return errors, so they raise them into [EngineFault]; the
//! runner checks the fault after every event and aborts the replication.

use bevy_ecs::prelude::Resource;

use crate::streams::StreamRole;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SimError {
    /// Invalid scenario or distribution parameters, detected before a replication starts.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A distribution kept producing non-positive values.
    #[error("{role:?} stream produced no positive draw after {attempts} attempts")]
    Distribution { role: StreamRole, attempts: u32 },

    /// Internal engine inconsistency; the replication is not trustworthy.
    #[error("engine invariant violated: {0}")]
    Invariant(String),
}

impl SimError {
    pub fn config(message: impl Into<String>) -> Self {
        SimError::Config(message.into())
    }

    pub fn invariant(message: impl Into<String>) -> Self {
        SimError::Invariant(message.into())
    }

    /// True for faults that invalidate the engine itself rather than one sample path.
    pub fn is_invariant_violation(&self) -> bool {
        matches!(self, SimError::Invariant(_))
    }
}

/// First error raised by a system during the current replication.
#[derive(Debug, Default, Resource)]
pub struct EngineFault(Option<SimError>);

impl EngineFault {
    /// Records `error` unless an earlier fault is already pending.
    pub fn raise(&mut self, error: SimError) {
        if self.0.is_none() {
            tracing::debug!(%error, "engine fault raised");
            self.0 = Some(error);
        }
    }

    pub fn is_raised(&self) -> bool {
        self.0.is_some()
    }

    pub fn take(&mut self) -> Option<SimError> {
        self.0.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_fault_wins() {
        let mut fault = EngineFault::default();
        assert!(!fault.is_raised());

        fault.raise(SimError::invariant("first"));
        fault.raise(SimError::config("second"));

        assert_eq!(fault.take(), Some(SimError::invariant("first")));
        assert!(!fault.is_raised());
    }

    #[test]
    fn only_invariant_errors_invalidate_the_engine() {
        assert!(SimError::invariant("x").is_invariant_violation());
        assert!(!SimError::config("x").is_invariant_violation());
        assert!(!SimError::Distribution {
            role: StreamRole::ExaminationService,
            attempts: 3
        }
        .is_invariant_violation());
    }
}
