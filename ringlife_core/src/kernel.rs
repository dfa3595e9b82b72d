//! Local stencil kernel: one Game of Life generation on a padded block.

use crate::board::{ALIVE, DEAD};

/// Standard Game of Life rule.
///
/// Alive with 2 or 3 alive neighbors survives; dead with exactly 3 is
/// born; everything else is dead next generation.
pub fn next_state(alive: bool, neighbors: u8) -> bool {
    matches!((alive, neighbors), (true, 2) | (true, 3) | (false, 3))
}

/// Computes one generation.
///
/// `current` and `next` are `(local_rows + 2) x cols`, row-major. Row 0
/// and row `local_rows + 1` of `current` are ghost rows and must already
/// hold the neighbors' boundary rows. Only rows `1..=local_rows` of `next`
/// are written; its ghost rows are left untouched.
///
/// Rows see the ghost rows above and below; columns are clipped, a
/// neighbor outside `[0, cols)` counts as dead.
pub fn step(current: &[u8], next: &mut [u8], local_rows: usize, cols: usize) {
    let padded = (local_rows + 2) * cols;
    assert_eq!(current.len(), padded, "current buffer is not (local_rows + 2) x cols");
    assert_eq!(next.len(), padded, "next buffer is not (local_rows + 2) x cols");

    for i in 1..=local_rows {
        for j in 0..cols {
            let lo = j.saturating_sub(1);
            let hi = (j + 1).min(cols - 1);

            let mut neighbors = 0u8;
            for row in (i - 1)..=(i + 1) {
                let base = row * cols;
                for col in lo..=hi {
                    if row == i && col == j {
                        continue;
                    }
                    neighbors += u8::from(current[base + col] == ALIVE);
                }
            }

            let alive = current[i * cols + j] == ALIVE;
            next[i * cols + j] = if next_state(alive, neighbors) { ALIVE } else { DEAD };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// Pads real rows with dead ghost rows.
    fn padded(rows: &[&[u8]]) -> Vec<u8> {
        let cols = rows[0].len();
        let mut buf = vec![DEAD; cols];
        for row in rows {
            buf.extend_from_slice(row);
        }
        buf.extend(std::iter::repeat(DEAD).take(cols));
        buf
    }

    fn run(current: &[u8], local_rows: usize, cols: usize) -> Vec<u8> {
        let mut next = vec![DEAD; current.len()];
        step(current, &mut next, local_rows, cols);
        next
    }

    #[test]
    fn test_rule_table() {
        assert!(!next_state(true, 1));
        assert!(next_state(true, 2));
        assert!(next_state(true, 3));
        assert!(!next_state(true, 4));
        assert!(next_state(false, 3));
        assert!(!next_state(false, 2));
        assert!(!next_state(false, 6));
    }

    #[test]
    fn test_blinker_has_period_two() {
        let horizontal = padded(&[&[0, 0, 0], &[1, 1, 1], &[0, 0, 0]]);
        let vertical = padded(&[&[0, 1, 0], &[0, 1, 0], &[0, 1, 0]]);

        let gen1 = run(&horizontal, 3, 3);
        assert_eq!(gen1, vertical);
        let gen2 = run(&gen1, 3, 3);
        assert_eq!(gen2, horizontal);
    }

    #[test]
    fn test_empty_stays_empty() {
        let empty = padded(&[&[0; 4], &[0; 4], &[0; 4]]);
        assert_eq!(run(&empty, 3, 4), empty);
    }

    #[test]
    fn test_isolated_cell_dies() {
        let single = padded(&[&[0, 0, 0], &[0, 1, 0], &[0, 0, 0]]);
        let next = run(&single, 3, 3);
        assert!(next.iter().all(|&c| c == DEAD));
    }

    #[test]
    fn test_block_is_still_life() {
        let block = padded(&[&[0, 0, 0, 0], &[0, 1, 1, 0], &[0, 1, 1, 0], &[0, 0, 0, 0]]);
        assert_eq!(run(&block, 4, 4), block);
    }

    #[test]
    fn test_columns_do_not_wrap() {
        // Left and right edge cells would be neighbors under column wrap
        let current = padded(&[&[1, 0, 0, 1], &[1, 0, 0, 1], &[1, 0, 0, 1]]);
        let next = run(&current, 3, 4);
        // Clipped: edge corners have one neighbor and die, the middle row
        // fills in. Wrapped, the corners would survive on three.
        assert_eq!(&next[4..8], &[0, 0, 0, 0]);
        assert_eq!(&next[8..12], &[1, 1, 1, 1]);
        assert_eq!(&next[12..16], &[0, 0, 0, 0]);
    }

    #[test]
    fn test_ghost_rows_feed_real_rows() {
        // One real row, both ghosts alive in column 1
        let current = vec![0u8, 1, 0, /* real */ 0, 1, 0, /* ghost */ 0, 1, 0];
        let next = run(&current, 1, 3);
        assert_eq!(&next[3..6], &[1, 1, 1]);
    }

    #[test]
    fn test_next_ghost_rows_untouched() {
        let current = padded(&[&[1, 1, 1]]);
        let mut next = vec![7u8; current.len()];
        step(&current, &mut next, 1, 3);
        assert_eq!(&next[0..3], &[7, 7, 7]);
        assert_eq!(&next[6..9], &[7, 7, 7]);
    }

    #[test]
    fn test_single_column() {
        // Vertical line of three in a 1-wide board
        let current = padded(&[&[1], &[1], &[1]]);
        let next = run(&current, 3, 1);
        assert_eq!(&next[1..4], &[0, 1, 0]);
    }

    proptest! {
        #[test]
        fn prop_fixed_point_is_idempotent(
            cells in proptest::collection::vec(0u8..=1, 5 * 6)
        ) {
            // 3 real rows + 2 ghosts, 6 columns
            let current = cells;
            let first = run(&current, 3, 6);
            let again = run(&current, 3, 6);
            prop_assert_eq!(&first, &again);

            let real = 6..4 * 6;
            if first[real.clone()] == current[real.clone()] {
                let mut stepped = current.clone();
                stepped[real.clone()].copy_from_slice(&first[real.clone()]);
                let after = run(&stepped, 3, 6);
                prop_assert_eq!(&after[real.clone()], &current[real]);
            }
        }

        #[test]
        fn prop_no_spontaneous_life(rows in 1usize..6, cols in 1usize..6) {
            let empty = vec![DEAD; (rows + 2) * cols];
            prop_assert!(run(&empty, rows, cols).iter().all(|&c| c == DEAD));
        }
    }
}
