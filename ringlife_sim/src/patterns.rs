//! Named seed patterns placed on a board of the configured size.

use crate::error::SimError;
use ringlife_core::Board;
use std::fmt;
use std::str::FromStr;

/// Initial board layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Pattern {
    /// Each cell alive with probability 1/2, drawn from the run seed
    Random,

    /// Period-2 oscillator, horizontal, centered
    Blinker,

    /// 2x2 still life, centered
    Block,

    /// Glider near the top-left corner
    Glider,

    /// The whole top row alive
    Bar,

    /// One alive cell in the center
    Single,
}

impl Pattern {
    /// Returns all patterns.
    pub fn all() -> Vec<Pattern> {
        vec![
            Pattern::Random,
            Pattern::Blinker,
            Pattern::Block,
            Pattern::Glider,
            Pattern::Bar,
            Pattern::Single,
        ]
    }

    /// Returns the pattern name.
    pub fn name(&self) -> &'static str {
        match self {
            Pattern::Random => "random",
            Pattern::Blinker => "blinker",
            Pattern::Block => "block",
            Pattern::Glider => "glider",
            Pattern::Bar => "bar",
            Pattern::Single => "single",
        }
    }

    /// Smallest `(rows, cols)` the pattern fits on.
    pub fn min_size(&self) -> (usize, usize) {
        match self {
            Pattern::Random | Pattern::Bar | Pattern::Single => (1, 1),
            Pattern::Blinker => (1, 3),
            Pattern::Block => (2, 2),
            Pattern::Glider => (4, 4),
        }
    }

    /// Builds the board for a `rows x cols` run.
    ///
    /// # Returns
    /// * `Ok(None)` - [`Pattern::Random`]: the coordinator draws the board
    ///   from the run seed
    /// * `Err(SimError::PatternTooLarge)` - the pattern does not fit
    pub fn board(&self, rows: usize, cols: usize) -> Result<Option<Board>, SimError> {
        let (min_rows, min_cols) = self.min_size();
        if rows < min_rows || cols < min_cols {
            return Err(SimError::PatternTooLarge {
                pattern: self.name(),
                rows,
                cols,
            });
        }

        let mut board = Board::empty(rows, cols);
        let (mid_r, mid_c) = (rows / 2, cols / 2);
        let cells: Vec<(usize, usize)> = match self {
            Pattern::Random => return Ok(None),
            Pattern::Blinker => {
                let left = mid_c.saturating_sub(1).min(cols - 3);
                (left..left + 3).map(|c| (mid_r, c)).collect()
            }
            Pattern::Block => {
                let (top, left) = (mid_r.saturating_sub(1), mid_c.saturating_sub(1));
                vec![(top, left), (top, left + 1), (top + 1, left), (top + 1, left + 1)]
            }
            Pattern::Glider => vec![(1, 2), (2, 3), (3, 1), (3, 2), (3, 3)],
            Pattern::Bar => (0..cols).map(|c| (0, c)).collect(),
            Pattern::Single => vec![(mid_r, mid_c)],
        };

        for (r, c) in cells {
            board.set(r, c, true);
        }
        Ok(Some(board))
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Pattern {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "random" => Ok(Pattern::Random),
            "blinker" => Ok(Pattern::Blinker),
            "block" => Ok(Pattern::Block),
            "glider" => Ok(Pattern::Glider),
            "bar" => Ok(Pattern::Bar),
            "single" => Ok(Pattern::Single),
            _ => Err(format!("Unknown pattern: {}", s)),
        }
    }
}
