//! Run configuration and its validation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Default number of consecutive identical population counts that ends a run.
pub const DEFAULT_PLATEAU_THRESHOLD: u64 = 10;

/// Configuration errors, detected before any data is distributed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("rows must be positive")]
    ZeroRows,

    #[error("cols must be positive")]
    ZeroCols,

    #[error("generation limit must be positive")]
    ZeroGenerations,

    #[error("plateau threshold must be positive")]
    ZeroPlateauThreshold,

    #[error("process group is empty")]
    EmptyGroup,

    #[error("{rows} rows cannot give each of {ranks} ranks a real row")]
    TooFewRows { rows: usize, ranks: usize },

    #[error("board is {actual_rows}x{actual_cols}, configuration says {rows}x{cols}")]
    BoardShape {
        rows: usize,
        cols: usize,
        actual_rows: usize,
        actual_cols: usize,
    },
}

/// Configuration of one simulation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Rows of the global grid
    pub rows: usize,

    /// Columns of the global grid
    pub cols: usize,

    /// Generation limit
    pub max_generations: u64,

    /// Seed for the initial board (None = taken from the run context)
    pub seed: Option<u64>,

    /// Consecutive identical global population counts that end the run
    pub plateau_threshold: u64,

    /// Per-generation report cadence on the coordinator (0 = off)
    pub log_every: u64,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            rows: 64,
            cols: 64,
            max_generations: 100,
            seed: None,
            plateau_threshold: DEFAULT_PLATEAU_THRESHOLD,
            log_every: 1,
        }
    }
}

impl SimulationConfig {
    /// Creates a configuration for a `rows x cols` board.
    pub fn new(rows: usize, cols: usize, max_generations: u64) -> Self {
        Self {
            rows,
            cols,
            max_generations,
            ..Default::default()
        }
    }

    /// Sets the seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Sets the plateau threshold.
    pub fn with_plateau_threshold(mut self, threshold: u64) -> Self {
        self.plateau_threshold = threshold;
        self
    }

    /// Sets the per-generation report cadence.
    pub fn with_log_every(mut self, every: u64) -> Self {
        self.log_every = every;
        self
    }

    /// Validates the configuration for a group of `ranks` participants.
    ///
    /// Pure: every rank reaches the same verdict without communicating.
    pub fn validate(&self, ranks: usize) -> Result<(), ConfigError> {
        if self.rows == 0 {
            return Err(ConfigError::ZeroRows);
        }
        if self.cols == 0 {
            return Err(ConfigError::ZeroCols);
        }
        if self.max_generations == 0 {
            return Err(ConfigError::ZeroGenerations);
        }
        if self.plateau_threshold == 0 {
            return Err(ConfigError::ZeroPlateauThreshold);
        }
        if ranks == 0 {
            return Err(ConfigError::EmptyGroup);
        }
        if self.rows < ranks {
            return Err(ConfigError::TooFewRows {
                rows: self.rows,
                ranks,
            });
        }
        Ok(())
    }

    /// Returns true if generation `generation` gets a progress report.
    pub fn reports_generation(&self, generation: u64) -> bool {
        self.log_every > 0 && generation % self.log_every == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = SimulationConfig::new(4, 4, 50);
        assert_eq!(config.validate(2), Ok(()));
        assert_eq!(config.validate(4), Ok(()));
    }

    #[test]
    fn test_rejects_non_positive_dimensions() {
        assert_eq!(SimulationConfig::new(0, 4, 1).validate(1), Err(ConfigError::ZeroRows));
        assert_eq!(SimulationConfig::new(4, 0, 1).validate(1), Err(ConfigError::ZeroCols));
        assert_eq!(
            SimulationConfig::new(4, 4, 0).validate(1),
            Err(ConfigError::ZeroGenerations)
        );
        assert_eq!(
            SimulationConfig::new(4, 4, 1)
                .with_plateau_threshold(0)
                .validate(1),
            Err(ConfigError::ZeroPlateauThreshold)
        );
    }

    #[test]
    fn test_rejects_more_ranks_than_rows() {
        let config = SimulationConfig::new(3, 8, 10);
        assert_eq!(
            config.validate(4),
            Err(ConfigError::TooFewRows { rows: 3, ranks: 4 })
        );
        assert_eq!(config.validate(0), Err(ConfigError::EmptyGroup));
    }

    #[test]
    fn test_report_cadence() {
        let config = SimulationConfig::new(4, 4, 10).with_log_every(3);
        assert!(!config.reports_generation(1));
        assert!(config.reports_generation(3));
        assert!(config.reports_generation(6));

        let silent = config.with_log_every(0);
        assert!(!silent.reports_generation(3));
    }
}
