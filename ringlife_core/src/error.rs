//! Error type for simulation runs.

use crate::config::ConfigError;
use ringlife_env::EnvError;
use thiserror::Error;

/// Errors that end a run on a rank.
///
/// Every variant is fatal for the whole group: the driver aborts the
/// process group before returning any of them, so no rank is left
/// waiting on a peer that gave up.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LifeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Communication error: {0}")]
    Env(#[from] EnvError),

    #[error("Allocation of {bytes} bytes failed")]
    Allocation { bytes: usize },

    #[error("Protocol violation: {0}")]
    Protocol(String),
}

impl LifeError {
    /// Creates a protocol violation error.
    pub fn protocol(msg: impl Into<String>) -> Self {
        Self::Protocol(msg.into())
    }

    /// Returns true for defects in partition or halo logic (as opposed to
    /// user or environment errors).
    pub fn is_protocol_violation(&self) -> bool {
        match self {
            Self::Protocol(_) => true,
            Self::Env(env) => env.is_protocol_violation(),
            _ => false,
        }
    }
}
