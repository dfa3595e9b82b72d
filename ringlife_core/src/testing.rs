//! Helpers for tests that need a running process group.

use ringlife_env::{LocalEndpoint, LocalGroup};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Upper bound on any group test; a hung rank fails instead of blocking.
pub const TIMEOUT: Duration = Duration::from_secs(10);

/// Runs `f` on every rank of a fresh local group and collects the results
/// in rank order.
pub async fn run_group<F, Fut, T>(size: usize, f: F) -> Vec<T>
where
    F: Fn(Arc<LocalEndpoint>) -> Fut,
    Fut: Future<Output = T> + Send + 'static,
    T: Send + 'static,
{
    let handles: Vec<_> = LocalGroup::new(size)
        .into_endpoints()
        .into_iter()
        .map(|ep| tokio::spawn(f(Arc::new(ep))))
        .collect();

    let mut out = Vec::with_capacity(handles.len());
    for handle in handles {
        let joined = tokio::time::timeout(TIMEOUT, handle)
            .await
            .expect("rank task hung");
        out.push(joined.expect("rank task panicked"));
    }
    out
}

/// Run context whose clock never advances, so reports compare equal
/// across runs.
pub struct FrozenContext {
    pub seed: u64,
}

impl ringlife_env::RunContext for FrozenContext {
    fn now(&self) -> Duration {
        Duration::ZERO
    }

    fn seed(&self) -> u64 {
        self.seed
    }
}
