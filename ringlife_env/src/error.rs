//! Error types for the RingLife process-group abstraction.

use crate::types::{Rank, Tag};
use thiserror::Error;

/// Errors that can occur while communicating inside a process group.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EnvError {
    /// A peer's mailbox is gone (its task exited or panicked)
    #[error("Rank {peer} disconnected")]
    Disconnected { peer: Rank },

    /// A transfer carried a different number of bytes than the receiver
    /// posted for. The partition or halo logic disagrees between ranks.
    #[error("Protocol violation on {tag}: expected {expected} bytes, got {actual}")]
    CountMismatch {
        tag: Tag,
        expected: usize,
        actual: usize,
    },

    /// A rank outside `0..size` was addressed
    #[error("Rank {rank} is outside a group of size {size}")]
    InvalidRank { rank: Rank, size: usize },

    /// Some rank aborted the whole group
    #[error("Group aborted: {reason}")]
    Aborted { reason: String },
}

impl EnvError {
    /// Creates an abort error.
    pub fn aborted(reason: impl Into<String>) -> Self {
        Self::Aborted {
            reason: reason.into(),
        }
    }

    /// Returns true for errors signalling a protocol defect rather than
    /// an environmental failure.
    pub fn is_protocol_violation(&self) -> bool {
        matches!(self, Self::CountMismatch { .. } | Self::InvalidRank { .. })
    }
}
