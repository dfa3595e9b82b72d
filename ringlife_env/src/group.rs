//! Process-group abstraction for RingLife ranks.

use crate::error::EnvError;
use crate::types::{Rank, Role, Tag};
use async_trait::async_trait;

/// A fixed-size group of cooperating ranks executing in lock-step.
///
/// # Implementations
///
/// - **In-process**: [`LocalEndpoint`](crate::LocalEndpoint), one tokio
///   task per rank over channels
/// - **Message passing**: any transport offering the same primitives
///
/// Every operation except [`rank`](Self::rank), [`size`](Self::size) and
/// [`abort`](Self::abort) is a blocking synchronization point: it does not
/// complete until the matching partners reach the matching call.
///
/// # Collective ordering
///
/// All ranks must issue collectives in the same order. Point-to-point
/// transfers between the same pair with the same tag are delivered in
/// the order they were sent.
#[async_trait]
pub trait ProcessGroup: Send + Sync + 'static {
    /// Returns this participant's rank.
    fn rank(&self) -> Rank;

    /// Returns the number of participants `P`.
    fn size(&self) -> usize;

    /// Returns this participant's role.
    fn role(&self) -> Role {
        Role::of(self.rank())
    }

    /// Combined send-and-receive.
    ///
    /// Sends `send` to `dest` under `send_tag` and fills `recv` with the
    /// payload `source` sent under `recv_tag`.
    ///
    /// # Returns
    /// * `Ok(())` - `recv` holds exactly `recv.len()` received bytes
    /// * `Err(EnvError::CountMismatch)` - the payload size differs
    async fn send_recv(
        &self,
        send: &[u8],
        dest: Rank,
        send_tag: Tag,
        recv: &mut [u8],
        source: Rank,
        recv_tag: Tag,
    ) -> Result<(), EnvError>;

    /// Root-to-all scatter by contiguous byte ranges.
    ///
    /// On `root`, `parts` is `Some((buf, counts))` with one count per rank;
    /// rank `r` receives `buf[offset_r..offset_r + counts[r]]` where
    /// `offset_r` is the prefix sum of the preceding counts. Other ranks
    /// pass `None`.
    async fn scatter(
        &self,
        root: Rank,
        parts: Option<(&[u8], &[usize])>,
        recv: &mut [u8],
    ) -> Result<(), EnvError>;

    /// One-to-all broadcast of small fixed-size values.
    ///
    /// The root's `values` overwrite every other rank's `values`.
    async fn broadcast(&self, root: Rank, values: &mut [u64]) -> Result<(), EnvError>;

    /// All-to-one sum reduction.
    ///
    /// # Returns
    /// `Some(total)` on `root`, `None` elsewhere.
    async fn reduce_sum(&self, root: Rank, local: u64) -> Result<Option<u64>, EnvError>;

    /// All-to-all logical OR.
    async fn all_reduce_or(&self, local: bool) -> Result<bool, EnvError>;

    /// All-to-all logical AND.
    async fn all_reduce_and(&self, local: bool) -> Result<bool, EnvError>;

    /// Aborts the whole group.
    ///
    /// Every pending and future operation on every rank fails with
    /// [`EnvError::Aborted`]. Idempotent: the first reason wins.
    fn abort(&self, reason: &str);
}
