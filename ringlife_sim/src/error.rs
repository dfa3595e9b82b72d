//! Harness errors.

use ringlife_core::{ConfigError, LifeError};
use ringlife_env::Rank;
use thiserror::Error;

/// Errors from launching, checking, or exporting a run.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("rank {rank} failed: {source}")]
    Rank {
        rank: Rank,
        #[source]
        source: LifeError,
    },

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("rank {rank} reported a different result than the coordinator")]
    Disagreement { rank: Rank },

    #[error("rank task did not complete: {0}")]
    Join(String),

    #[error("pattern {pattern} does not fit a {rows}x{cols} board")]
    PatternTooLarge {
        pattern: &'static str,
        rows: usize,
        cols: usize,
    },

    #[error("Export failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization failed: {0}")]
    Json(#[from] serde_json::Error),
}
