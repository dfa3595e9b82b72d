//! Simulation context implementing RunContext for deterministic runs.

use ringlife_env::RunContext;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Simulation context backed by a virtual clock.
///
/// Time moves only when the harness advances it, or by a fixed step on
/// every read when one is configured, so elapsed times in reports are
/// reproducible.
pub struct SimContext {
    /// Master seed for this simulation
    seed: u64,

    /// Current virtual time (nanoseconds since simulation start)
    virtual_time_ns: Arc<AtomicU64>,

    /// Virtual time added after every clock read
    step_ns: u64,
}

impl SimContext {
    /// Creates a new SimContext with a frozen clock.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            virtual_time_ns: Arc::new(AtomicU64::new(0)),
            step_ns: 0,
        }
    }

    /// Creates an Arc-wrapped context for sharing.
    pub fn shared(seed: u64) -> Arc<Self> {
        Arc::new(Self::new(seed))
    }

    /// Advances the clock by `step` after every read.
    pub fn with_step(mut self, step: Duration) -> Self {
        self.step_ns = duration_ns(step);
        self
    }

    /// Advances virtual time by the given duration.
    pub fn advance_time(&self, duration: Duration) {
        self.virtual_time_ns
            .fetch_add(duration_ns(duration), Ordering::SeqCst);
    }

    /// Returns the current virtual time in nanoseconds.
    pub fn time_ns(&self) -> u64 {
        self.virtual_time_ns.load(Ordering::SeqCst)
    }
}

impl Clone for SimContext {
    fn clone(&self) -> Self {
        Self {
            seed: self.seed,
            virtual_time_ns: Arc::clone(&self.virtual_time_ns),
            step_ns: self.step_ns,
        }
    }
}

impl RunContext for SimContext {
    fn now(&self) -> Duration {
        Duration::from_nanos(
            self.virtual_time_ns
                .fetch_add(self.step_ns, Ordering::SeqCst),
        )
    }

    fn seed(&self) -> u64 {
        self.seed
    }
}

fn duration_ns(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sim_context_time() {
        let ctx = SimContext::new(42);
        assert_eq!(ctx.now(), Duration::ZERO);

        ctx.advance_time(Duration::from_secs(1));
        assert_eq!(ctx.now(), Duration::from_secs(1));

        ctx.advance_time(Duration::from_millis(500));
        assert_eq!(ctx.now(), Duration::from_millis(1500));
    }

    #[test]
    fn test_sim_context_step_per_read() {
        let ctx = SimContext::new(1).with_step(Duration::from_millis(2));
        assert_eq!(ctx.now(), Duration::ZERO);
        assert_eq!(ctx.now(), Duration::from_millis(2));
        assert_eq!(ctx.time_ns(), 4_000_000);
    }

    #[test]
    fn test_sim_context_seed() {
        let ctx = SimContext::new(12345);
        assert_eq!(ctx.seed(), 12345);
    }

    #[test]
    fn test_sim_context_clone_shares_time() {
        let ctx1 = SimContext::new(42);
        let ctx2 = ctx1.clone();

        ctx1.advance_time(Duration::from_secs(5));

        // Both should see the same time
        assert_eq!(ctx1.now(), ctx2.now());
    }
}
