//! Domain distributor: scatters the coordinator's board into local blocks.
//!
//! Two phases. Every rank computes the same [`RowPartition`] from the
//! configuration alone; then the coordinator scatters contiguous byte
//! ranges of its row-major board, one band of whole rows per rank.

use crate::block::LocalBlock;
use crate::board::Board;
use crate::config::{ConfigError, SimulationConfig};
use crate::error::LifeError;
use crate::partition::RowPartition;
use ringlife_env::{ProcessGroup, Rank, Role};
use tracing::debug;

/// Distributes `board` (present on the coordinator only) across the group.
///
/// # Returns
/// This rank's block with its real rows filled and dead ghost rows.
pub async fn distribute<G>(
    group: &G,
    board: Option<&Board>,
    config: &SimulationConfig,
) -> Result<LocalBlock, LifeError>
where
    G: ProcessGroup + ?Sized,
{
    let partition = RowPartition::new(config.rows, group.size())?;
    let assignment = partition.assignment(group.rank());
    let mut block = LocalBlock::new(assignment, config.cols)?;

    match group.role() {
        Role::Coordinator => {
            let board = board
                .ok_or_else(|| LifeError::protocol("coordinator has no board to distribute"))?;
            if board.rows() != config.rows || board.cols() != config.cols {
                return Err(ConfigError::BoardShape {
                    rows: config.rows,
                    cols: config.cols,
                    actual_rows: board.rows(),
                    actual_cols: board.cols(),
                }
                .into());
            }

            let counts = partition.byte_counts(config.cols);
            let total: usize = counts.iter().sum();
            if total != config.rows * config.cols {
                return Err(LifeError::protocol(format!(
                    "scatter counts sum to {total}, board has {} cells",
                    config.rows * config.cols
                )));
            }

            group
                .scatter(
                    Rank::COORDINATOR,
                    Some((board.cells(), counts.as_slice())),
                    block.real_rows_mut(),
                )
                .await?;
        }
        Role::Worker => {
            group
                .scatter(Rank::COORDINATOR, None, block.real_rows_mut())
                .await?;
        }
    }

    block.clear_ghosts();
    debug!(
        rank = %group.rank(),
        rows = assignment.rows,
        offset = assignment.offset,
        "received row band"
    );
    Ok(block)
}
