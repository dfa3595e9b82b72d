//! Logical ring of ranks.
//!
//! Rows wrap around the ring (toroidal in the row direction), so rank 0's
//! previous neighbor is rank `P-1`. Columns do not wrap.

use ringlife_env::Rank;

/// Position of a rank in a ring of `size` ranks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RingTopology {
    rank: Rank,
    size: usize,
}

impl RingTopology {
    /// Creates the ring view of `rank` in a group of `size`.
    pub fn new(rank: Rank, size: usize) -> Self {
        debug_assert!(rank.index() < size, "rank {rank} outside ring of {size}");
        Self { rank, size }
    }

    /// Returns this rank.
    pub fn rank(&self) -> Rank {
        self.rank
    }

    /// Returns the ring size.
    pub fn size(&self) -> usize {
        self.size
    }

    /// `(rank - 1 + P) mod P`
    pub fn prev(&self) -> Rank {
        Rank::from_index((self.rank.index() + self.size - 1) % self.size)
    }

    /// `(rank + 1) mod P`
    pub fn next(&self) -> Rank {
        Rank::from_index((self.rank.index() + 1) % self.size)
    }

    /// Returns true when the ring has a single rank, whose neighbors are
    /// itself.
    pub fn is_degenerate(&self) -> bool {
        self.size == 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_interior_neighbors() {
        let t = RingTopology::new(Rank(2), 5);
        assert_eq!(t.prev(), Rank(1));
        assert_eq!(t.next(), Rank(3));
    }

    #[test]
    fn test_wraparound() {
        let first = RingTopology::new(Rank(0), 4);
        assert_eq!(first.prev(), Rank(3));
        assert_eq!(first.next(), Rank(1));

        let last = RingTopology::new(Rank(3), 4);
        assert_eq!(last.next(), Rank(0));
    }

    #[test]
    fn test_two_ranks_share_both_neighbors() {
        let t = RingTopology::new(Rank(1), 2);
        assert_eq!(t.prev(), Rank(0));
        assert_eq!(t.next(), Rank(0));
    }

    #[test]
    fn test_single_rank_is_own_neighbor() {
        let t = RingTopology::new(Rank(0), 1);
        assert!(t.is_degenerate());
        assert_eq!(t.prev(), Rank(0));
        assert_eq!(t.next(), Rank(0));
    }
}
