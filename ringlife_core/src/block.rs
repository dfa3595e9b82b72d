//! Double-buffered local block with ghost rows.
//!
//! ```text
//!   row 0              top ghost     (last real row of prev rank)
//!   row 1              first real    (global row = row_offset)
//!   ...
//!   row local_rows     last real
//!   row local_rows+1   bottom ghost  (first real row of next rank)
//! ```
//!
//! Both buffers are `(local_rows + 2) x cols`. `current` is read by the
//! kernel and the halo exchange, `next` is written by the kernel; the two
//! swap roles after every generation.

use crate::board::{ALIVE, DEAD};
use crate::error::LifeError;
use crate::kernel;
use crate::partition::RowAssignment;

/// Allocates a zeroed buffer, reporting failure instead of aborting.
fn alloc_zeroed(len: usize) -> Result<Vec<u8>, LifeError> {
    let mut buf = Vec::new();
    buf.try_reserve_exact(len)
        .map_err(|_| LifeError::Allocation { bytes: len })?;
    buf.resize(len, DEAD);
    Ok(buf)
}

/// One rank's band of the grid plus its ghost rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalBlock {
    current: Vec<u8>,
    next: Vec<u8>,
    local_rows: usize,
    cols: usize,
    row_offset: usize,
}

impl LocalBlock {
    /// Allocates an all-dead block for `assignment`.
    ///
    /// # Returns
    /// * `Err(LifeError::Allocation)` - either buffer could not be reserved
    pub fn new(assignment: RowAssignment, cols: usize) -> Result<Self, LifeError> {
        let len = assignment
            .rows
            .checked_add(2)
            .and_then(|r| r.checked_mul(cols))
            .ok_or(LifeError::Allocation { bytes: usize::MAX })?;

        Ok(Self {
            current: alloc_zeroed(len)?,
            next: alloc_zeroed(len)?,
            local_rows: assignment.rows,
            cols,
            row_offset: assignment.offset,
        })
    }

    /// Builds a block from real rows, with dead ghost rows.
    pub fn from_real_rows(cells: &[u8], cols: usize, row_offset: usize) -> Result<Self, LifeError> {
        if cols == 0 || cells.len() % cols != 0 {
            return Err(LifeError::protocol(format!(
                "{} cells do not form rows of width {cols}",
                cells.len()
            )));
        }
        let assignment = RowAssignment {
            rows: cells.len() / cols,
            offset: row_offset,
        };
        let mut block = Self::new(assignment, cols)?;
        block.real_rows_mut().copy_from_slice(cells);
        Ok(block)
    }

    /// Number of real rows.
    pub fn local_rows(&self) -> usize {
        self.local_rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Global index of the first real row.
    pub fn row_offset(&self) -> usize {
        self.row_offset
    }

    /// The current generation, ghost rows included.
    pub fn current(&self) -> &[u8] {
        &self.current
    }

    /// The current generation's real rows.
    pub fn real_rows(&self) -> &[u8] {
        &self.current[self.cols..(self.local_rows + 1) * self.cols]
    }

    /// Mutable access to the current generation's real rows.
    pub fn real_rows_mut(&mut self) -> &mut [u8] {
        let range = self.cols..(self.local_rows + 1) * self.cols;
        &mut self.current[range]
    }

    /// The top ghost row.
    pub fn top_ghost(&self) -> &[u8] {
        &self.current[..self.cols]
    }

    /// The bottom ghost row.
    pub fn bottom_ghost(&self) -> &[u8] {
        &self.current[(self.local_rows + 1) * self.cols..]
    }

    /// Clears both ghost rows of the current buffer.
    pub fn clear_ghosts(&mut self) {
        let cols = self.cols;
        let bottom = (self.local_rows + 1) * cols;
        self.current[..cols].fill(DEAD);
        self.current[bottom..].fill(DEAD);
    }

    /// Splits the current buffer into the first real row (to send) and
    /// the bottom ghost row (to receive into).
    pub fn first_row_and_bottom_ghost(&mut self) -> (&[u8], &mut [u8]) {
        let cols = self.cols;
        let (head, ghost) = self.current.split_at_mut((self.local_rows + 1) * cols);
        (&head[cols..2 * cols], ghost)
    }

    /// Splits the current buffer into the last real row (to send) and the
    /// top ghost row (to receive into).
    pub fn last_row_and_top_ghost(&mut self) -> (&[u8], &mut [u8]) {
        let cols = self.cols;
        let last = self.local_rows;
        let (ghost, rest) = self.current.split_at_mut(cols);
        (&rest[(last - 1) * cols..last * cols], ghost)
    }

    /// Computes the next generation into the `next` buffer.
    pub fn advance(&mut self) {
        kernel::step(&self.current, &mut self.next, self.local_rows, self.cols);
    }

    /// Alive cells among the current real rows.
    pub fn alive_count(&self) -> u64 {
        self.real_rows().iter().filter(|&&c| c == ALIVE).count() as u64
    }

    /// Returns true if any real cell differs between `current` and `next`.
    pub fn changed(&self) -> bool {
        let range = self.cols..(self.local_rows + 1) * self.cols;
        self.current[range.clone()] != self.next[range]
    }

    /// Makes `next` the current generation.
    pub fn swap(&mut self) {
        std::mem::swap(&mut self.current, &mut self.next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blinker() -> LocalBlock {
        LocalBlock::from_real_rows(&[0, 0, 0, 1, 1, 1, 0, 0, 0], 3, 0).unwrap()
    }

    #[test]
    fn test_new_block_is_dead_and_padded() {
        let block = LocalBlock::new(RowAssignment { rows: 3, offset: 5 }, 4).unwrap();
        assert_eq!(block.current().len(), 20);
        assert_eq!(block.row_offset(), 5);
        assert_eq!(block.alive_count(), 0);
    }

    #[test]
    fn test_overflowing_size_is_allocation_error() {
        let err = LocalBlock::new(
            RowAssignment {
                rows: usize::MAX / 2,
                offset: 0,
            },
            4,
        )
        .unwrap_err();
        assert!(matches!(err, LifeError::Allocation { .. }));
    }

    #[test]
    fn test_ragged_real_rows_rejected() {
        assert!(LocalBlock::from_real_rows(&[0, 1, 0, 1, 1], 2, 0).is_err());
    }

    #[test]
    fn test_halo_views() {
        let mut block = LocalBlock::from_real_rows(&[1, 0, 0, 0, 0, 1], 3, 0).unwrap();

        let (first, bottom) = block.first_row_and_bottom_ghost();
        assert_eq!(first, &[1, 0, 0]);
        bottom.copy_from_slice(&[1, 1, 1]);

        let (last, top) = block.last_row_and_top_ghost();
        assert_eq!(last, &[0, 0, 1]);
        top.copy_from_slice(&[0, 1, 0]);

        assert_eq!(block.top_ghost(), &[0, 1, 0]);
        assert_eq!(block.bottom_ghost(), &[1, 1, 1]);
        assert_eq!(block.real_rows(), &[1, 0, 0, 0, 0, 1]);
        // Ghosts never count as population
        assert_eq!(block.alive_count(), 2);

        block.clear_ghosts();
        assert_eq!(block.top_ghost(), &[0, 0, 0]);
        assert_eq!(block.bottom_ghost(), &[0, 0, 0]);
    }

    #[test]
    fn test_single_row_block_views_share_row() {
        let mut block = LocalBlock::from_real_rows(&[0, 1], 2, 3).unwrap();
        let (first, _) = block.first_row_and_bottom_ghost();
        assert_eq!(first, &[0, 1]);
        let (last, _) = block.last_row_and_top_ghost();
        assert_eq!(last, &[0, 1]);
    }

    #[test]
    fn test_advance_changed_swap() {
        let mut block = blinker();
        block.advance();
        assert!(block.changed());
        block.swap();
        assert_eq!(block.real_rows(), &[0, 1, 0, 0, 1, 0, 0, 1, 0]);
        assert_eq!(block.alive_count(), 3);

        block.advance();
        block.swap();
        assert_eq!(block.real_rows(), &[0, 0, 0, 1, 1, 1, 0, 0, 0]);
    }

    #[test]
    fn test_still_life_unchanged() {
        let mut block =
            LocalBlock::from_real_rows(&[0, 0, 0, 0, 0, 1, 1, 0, 0, 1, 1, 0, 0, 0, 0, 0], 4, 0)
                .unwrap();
        block.advance();
        assert!(!block.changed());
    }
}
