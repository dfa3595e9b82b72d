//! Row partition: which real rows each rank owns.
//!
//! A pure function of `(rows, ranks)`, recomputed independently by every
//! rank. Rank `r` owns `base + 1` rows when `r < remainder`, else `base`,
//! where `base = rows / ranks` and `remainder = rows % ranks`; offsets are
//! prefix sums, so bands are contiguous and never split a row.

use crate::config::ConfigError;
use ringlife_env::Rank;
use serde::{Deserialize, Serialize};

/// The real rows assigned to one rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RowAssignment {
    /// Number of real rows
    pub rows: usize,

    /// Index of the first real row in the global grid
    pub offset: usize,
}

impl RowAssignment {
    /// Computes the assignment of `rank` directly, without building the
    /// whole table.
    pub fn of(total_rows: usize, ranks: usize, rank: Rank) -> Self {
        let base = total_rows / ranks;
        let remainder = total_rows % ranks;
        let r = rank.index();
        Self {
            rows: base + usize::from(r < remainder),
            offset: r * base + r.min(remainder),
        }
    }

    /// One past the last real row in the global grid.
    pub fn end(&self) -> usize {
        self.offset + self.rows
    }
}

/// Row assignments of every rank in a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowPartition {
    total_rows: usize,
    assignments: Vec<RowAssignment>,
}

impl RowPartition {
    /// Splits `rows` rows across `ranks` ranks.
    ///
    /// Every rank must receive at least one real row.
    pub fn new(rows: usize, ranks: usize) -> Result<Self, ConfigError> {
        if ranks == 0 {
            return Err(ConfigError::EmptyGroup);
        }
        if rows < ranks {
            return Err(ConfigError::TooFewRows { rows, ranks });
        }

        let base = rows / ranks;
        let remainder = rows % ranks;
        let mut offset = 0;
        let assignments = (0..ranks)
            .map(|r| {
                let count = base + usize::from(r < remainder);
                let assignment = RowAssignment {
                    rows: count,
                    offset,
                };
                offset += count;
                assignment
            })
            .collect();

        Ok(Self {
            total_rows: rows,
            assignments,
        })
    }

    /// Returns the number of ranks.
    pub fn ranks(&self) -> usize {
        self.assignments.len()
    }

    /// Returns the number of rows partitioned.
    pub fn total_rows(&self) -> usize {
        self.total_rows
    }

    /// Returns the assignment of `rank`.
    pub fn assignment(&self, rank: Rank) -> RowAssignment {
        self.assignments[rank.index()]
    }

    /// Returns all assignments in rank order.
    pub fn assignments(&self) -> &[RowAssignment] {
        &self.assignments
    }

    /// Returns the scatter byte counts for a grid with `cols` columns.
    pub fn byte_counts(&self, cols: usize) -> Vec<usize> {
        self.assignments.iter().map(|a| a.rows * cols).collect()
    }
}
