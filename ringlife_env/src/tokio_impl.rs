//! Production implementation of RunContext.

use crate::RunContext;
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

/// Production context backed by the system monotonic clock.
///
/// When no seed is supplied, the seed is taken from the wall clock, so
/// unseeded runs differ from one another.
pub struct TokioContext {
    /// Start time for monotonic duration calculations
    start: Instant,

    /// Seed of this run
    seed: u64,
}

impl TokioContext {
    /// Creates a new context with an optional user seed.
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            start: Instant::now(),
            seed: seed.unwrap_or_else(wall_clock_seed),
        }
    }

    /// Creates an Arc-wrapped context for sharing across rank tasks.
    pub fn shared(seed: Option<u64>) -> Arc<Self> {
        Arc::new(Self::new(seed))
    }
}

impl Default for TokioContext {
    fn default() -> Self {
        Self::new(None)
    }
}

impl RunContext for TokioContext {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }

    fn seed(&self) -> u64 {
        self.seed
    }
}

fn wall_clock_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_tokio_context_time() {
        let ctx = TokioContext::new(Some(1));
        let t1 = ctx.now();
        tokio::time::sleep(Duration::from_millis(10)).await;
        let t2 = ctx.now();

        assert!(t2 > t1);
        assert!(t2 - t1 >= Duration::from_millis(10));
    }

    #[test]
    fn test_tokio_context_seed() {
        let ctx = TokioContext::new(Some(12345));
        assert_eq!(ctx.seed(), 12345);
    }
}
