//! Run results, identical on every rank.

use crate::convergence::TerminationReason;
use ringlife_env::{Rank, Role};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Final result of a run.
///
/// Every field is agreed by collective, so all ranks of a group hold an
/// identical report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Why the run ended
    pub reason: TerminationReason,

    /// Generation (1-based) at which the run ended
    pub generation: u64,

    /// Global alive cells in the final generation
    pub final_alive: u64,

    /// Coordinator's wall time from first generation to termination
    pub elapsed: Duration,

    /// Ranks in the group
    pub ranks: usize,

    /// Board rows
    pub rows: usize,

    /// Board columns
    pub cols: usize,
}

impl RunReport {
    /// Mean wall time per generation.
    pub fn avg_generation_time(&self) -> Duration {
        if self.generation == 0 {
            return Duration::ZERO;
        }
        let nanos = self.elapsed.as_nanos() / u128::from(self.generation);
        Duration::from_nanos(u64::try_from(nanos).unwrap_or(u64::MAX))
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} at generation {}: {} alive on {}x{} across {} ranks in {:.3}s",
            self.reason,
            self.generation,
            self.final_alive,
            self.rows,
            self.cols,
            self.ranks,
            self.elapsed.as_secs_f64()
        )
    }
}

/// Population of one generation, as seen by the coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationStats {
    pub generation: u64,
    pub alive: u64,
    pub elapsed: Duration,
}

/// What one rank returns from a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankOutcome {
    pub rank: Rank,
    pub role: Role,

    /// Real rows this rank owned
    pub local_rows: usize,

    pub report: RunReport,

    /// Per-generation populations (coordinator only, empty elsewhere)
    pub history: Vec<GenerationStats>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report(generation: u64, elapsed: Duration) -> RunReport {
        RunReport {
            reason: TerminationReason::GenerationLimit,
            generation,
            final_alive: 12,
            elapsed,
            ranks: 2,
            rows: 8,
            cols: 6,
        }
    }

    #[test]
    fn test_avg_generation_time() {
        let r = report(4, Duration::from_millis(100));
        assert_eq!(r.avg_generation_time(), Duration::from_millis(25));
        assert_eq!(report(0, Duration::from_secs(1)).avg_generation_time(), Duration::ZERO);
    }

    #[test]
    fn test_display() {
        let text = report(7, Duration::from_millis(1500)).to_string();
        assert_eq!(
            text,
            "generation limit reached at generation 7: 12 alive on 8x6 across 2 ranks in 1.500s"
        );
    }
}
