//! RingLife Core - Distributed Game of Life on a Ring of Ranks
//!
//! The board is split into horizontal bands, one per rank. Each rank keeps
//! its band plus two ghost rows, refreshes the ghosts from its ring
//! neighbors every generation, and applies the Game of Life rule locally.
//! Termination is agreed by collectives, so every rank stops on the same
//! generation with the same report.
//!
//! ```text
//!             rows wrap (toroidal)
//!   +--------------------------+ <-+
//!   | rank 0   rows 0..k       |   |
//!   +--------------------------+   |
//!   | rank 1   rows k..2k      |   |
//!   +--------------------------+   |
//!   | ...                      |   |
//!   +--------------------------+   |
//!   | rank P-1                 | --+
//!   +--------------------------+
//!     columns are clipped
//! ```
//!
//! Entry point: [`run_rank`], called on every rank of a
//! [`ProcessGroup`](ringlife_env::ProcessGroup).

pub mod block;
pub mod board;
pub mod config;
pub mod convergence;
pub mod distribute;
pub mod driver;
pub mod error;
pub mod halo;
pub mod kernel;
pub mod partition;
pub mod report;
pub mod topology;

#[cfg(test)]
mod testing;

// Re-export key types for convenience
pub use block::LocalBlock;
pub use board::{Board, ALIVE, DEAD};
pub use config::{ConfigError, SimulationConfig, DEFAULT_PLATEAU_THRESHOLD};
pub use convergence::{
    decide, ConvergenceDetector, PlateauObservation, PlateauTracker, Signals, TerminationReason,
    Verdict,
};
pub use distribute::distribute;
pub use driver::run_rank;
pub use error::LifeError;
pub use halo::exchange_ghosts;
pub use partition::{RowAssignment, RowPartition};
pub use report::{GenerationStats, RankOutcome, RunReport};
pub use topology::RingTopology;
