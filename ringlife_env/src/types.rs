//! Common types for the RingLife process-group abstraction.

use serde::{Deserialize, Serialize};

/// Dense identifier of a participant in a process group (`0..P-1`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Rank(pub u32);

impl Rank {
    /// The designated coordinator of every group.
    pub const COORDINATOR: Rank = Rank(0);

    /// Creates a rank from a `usize` index.
    ///
    /// Group sizes never exceed `u32::MAX`; an out-of-range index panics in
    /// debug builds and saturates otherwise.
    pub fn from_index(index: usize) -> Self {
        let rank = u32::try_from(index);
        debug_assert!(rank.is_ok(), "rank index {index} exceeds u32");
        Self(rank.unwrap_or(u32::MAX))
    }

    /// Returns the rank as a `usize` index.
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for Rank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role a participant plays in the run.
///
/// Derived once from the rank and passed around explicitly, so that
/// coordinator-only work is visible in signatures rather than hidden
/// behind scattered rank comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// Owns the global grid before distribution and the plateau counter.
    Coordinator,

    /// Any other rank.
    Worker,
}

impl Role {
    /// Returns the role of `rank`.
    pub fn of(rank: Rank) -> Self {
        if rank == Rank::COORDINATOR {
            Role::Coordinator
        } else {
            Role::Worker
        }
    }

    /// Returns true for the coordinator.
    pub fn is_coordinator(&self) -> bool {
        matches!(self, Role::Coordinator)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Role::Coordinator => write!(f, "coordinator"),
            Role::Worker => write!(f, "worker"),
        }
    }
}

/// Label distinguishing concurrently in-flight point-to-point transfers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tag(pub u16);

impl Tag {
    /// First real row travelling to the previous neighbor.
    pub const HALO_UP: Tag = Tag(0);

    /// Last real row travelling to the next neighbor.
    pub const HALO_DOWN: Tag = Tag(1);

    /// Root-to-all byte-range scatter.
    pub const SCATTER: Tag = Tag(0x100);

    /// One-to-all broadcast of small words.
    pub const BROADCAST: Tag = Tag(0x101);

    /// All-to-one sum reduction.
    pub const REDUCE: Tag = Tag(0x102);

    /// All-to-all boolean reductions (gather phase; the result rides on
    /// a broadcast).
    pub const ALL_REDUCE: Tag = Tag(0x103);
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            Tag::HALO_UP => write!(f, "halo-up"),
            Tag::HALO_DOWN => write!(f, "halo-down"),
            Tag::SCATTER => write!(f, "scatter"),
            Tag::BROADCAST => write!(f, "broadcast"),
            Tag::REDUCE => write!(f, "reduce"),
            Tag::ALL_REDUCE => write!(f, "all-reduce"),
            Tag(other) => write!(f, "tag-{other}"),
        }
    }
}

/// Envelope for bytes transmitted between ranks.
///
/// The payload is opaque; its meaning is fixed by the tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    /// Sending rank
    pub from: Rank,

    /// Channel label
    pub tag: Tag,

    /// Raw bytes
    pub payload: Vec<u8>,
}

impl Envelope {
    /// Creates a new envelope.
    pub fn new(from: Rank, tag: Tag, payload: Vec<u8>) -> Self {
        Self { from, tag, payload }
    }

    /// Returns true if this envelope answers a receive posted for
    /// `(source, tag)`.
    pub fn matches(&self, source: Rank, tag: Tag) -> bool {
        self.from == source && self.tag == tag
    }

    /// Returns the payload size in bytes.
    pub fn size(&self) -> usize {
        self.payload.len()
    }
}
