//! The global grid, materialized only on the coordinator for seeding.

use crate::config::ConfigError;
use rand::Rng;
use std::fmt;

/// Byte value of a dead cell.
pub const DEAD: u8 = 0;

/// Byte value of an alive cell.
pub const ALIVE: u8 = 1;

/// A `rows x cols` grid of cells, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    rows: usize,
    cols: usize,
    cells: Vec<u8>,
}

impl Board {
    /// Creates an all-dead board.
    pub fn empty(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![DEAD; rows * cols],
        }
    }

    /// Creates a board from row-major cells (`0` dead, `1` alive).
    pub fn from_cells(rows: usize, cols: usize, cells: Vec<u8>) -> Result<Self, ConfigError> {
        if cells.len() != rows * cols {
            return Err(ConfigError::BoardShape {
                rows,
                cols,
                actual_rows: if cols == 0 { 0 } else { cells.len() / cols },
                actual_cols: cols,
            });
        }
        let cells = cells.into_iter().map(|c| u8::from(c != DEAD)).collect();
        Ok(Self { rows, cols, cells })
    }

    /// Parses a board from text rows: `#`, `O` or `1` is alive, anything
    /// else dead. All rows must have the same width.
    ///
    /// ```
    /// use ringlife_core::Board;
    ///
    /// let board = Board::from_rows(&["####", "....", "....", "...."]).unwrap();
    /// assert_eq!(board.alive_count(), 4);
    /// ```
    pub fn from_rows(lines: &[&str]) -> Result<Self, ConfigError> {
        let rows = lines.len();
        let cols = lines.first().map(|l| l.chars().count()).unwrap_or(0);

        let mut cells = Vec::with_capacity(rows * cols);
        for line in lines {
            let width = line.chars().count();
            if width != cols {
                return Err(ConfigError::BoardShape {
                    rows,
                    cols,
                    actual_rows: rows,
                    actual_cols: width,
                });
            }
            cells.extend(line.chars().map(|c| u8::from(matches!(c, '#' | 'O' | '1'))));
        }

        Ok(Self { rows, cols, cells })
    }

    /// Draws a random board, each cell alive with probability 1/2.
    ///
    /// The whole board is redrawn until at least one cell is alive.
    pub fn random<R: Rng + ?Sized>(rows: usize, cols: usize, rng: &mut R) -> Self {
        let mut board = Self::empty(rows, cols);
        if board.cells.is_empty() {
            return board;
        }
        loop {
            for cell in board.cells.iter_mut() {
                *cell = u8::from(rng.gen_bool(0.5));
            }
            if board.alive_count() > 0 {
                return board;
            }
        }
    }

    /// Returns the number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Returns the number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Returns the row-major cells.
    pub fn cells(&self) -> &[u8] {
        &self.cells
    }

    /// Returns row `row`.
    pub fn row(&self, row: usize) -> &[u8] {
        &self.cells[row * self.cols..(row + 1) * self.cols]
    }

    /// Iterates over rows, top to bottom.
    pub fn rows_iter(&self) -> impl Iterator<Item = &[u8]> {
        self.cells.chunks_exact(self.cols.max(1))
    }

    /// Returns true if `(row, col)` is alive.
    pub fn get(&self, row: usize, col: usize) -> bool {
        self.cells[row * self.cols + col] == ALIVE
    }

    /// Sets the state of `(row, col)`.
    pub fn set(&mut self, row: usize, col: usize, alive: bool) {
        self.cells[row * self.cols + col] = u8::from(alive);
    }

    /// Counts alive cells.
    pub fn alive_count(&self) -> u64 {
        self.cells.iter().filter(|&&c| c == ALIVE).count() as u64
    }
}

impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in self.rows_iter() {
            let line: String = row
                .iter()
                .map(|&c| if c == ALIVE { '#' } else { '.' })
                .collect();
            writeln!(f, "{line}")?;
        }
        Ok(())
    }
}
