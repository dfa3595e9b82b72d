//! Halo exchange: refreshes ghost rows from the ring neighbors.
//!
//! ```text
//!   rank r-1            rank r              rank r+1
//!   last real  ------>  top ghost
//!                       first real  ---+
//!   bottom ghost  <--------------------+
//!                       last real   ------> top ghost
//!                       bottom ghost <----- first real
//! ```
//!
//! Two combined send-and-receive round trips per generation:
//!
//! 1. `HALO_UP`: first real row to prev, next's first real row into the
//!    bottom ghost.
//! 2. `HALO_DOWN`: last real row to next, prev's last real row into the
//!    top ghost.
//!
//! Each round trip completes before the next one starts, and both
//! complete before the kernel reads the ghosts.

use crate::block::LocalBlock;
use crate::error::LifeError;
use crate::topology::RingTopology;
use ringlife_env::{ProcessGroup, Tag};

/// Refreshes both ghost rows of `block`. Real rows are not modified.
///
/// A single-rank ring wraps locally: the first real row becomes the
/// bottom ghost and the last real row the top ghost.
pub async fn exchange_ghosts<G>(
    group: &G,
    ring: &RingTopology,
    block: &mut LocalBlock,
) -> Result<(), LifeError>
where
    G: ProcessGroup + ?Sized,
{
    if ring.is_degenerate() {
        let (first, bottom) = block.first_row_and_bottom_ghost();
        bottom.copy_from_slice(first);
        let (last, top) = block.last_row_and_top_ghost();
        top.copy_from_slice(last);
        return Ok(());
    }

    let (first, bottom) = block.first_row_and_bottom_ghost();
    group
        .send_recv(first, ring.prev(), Tag::HALO_UP, bottom, ring.next(), Tag::HALO_UP)
        .await?;

    let (last, top) = block.last_row_and_top_ghost();
    group
        .send_recv(last, ring.next(), Tag::HALO_DOWN, top, ring.prev(), Tag::HALO_DOWN)
        .await?;

    Ok(())
}
