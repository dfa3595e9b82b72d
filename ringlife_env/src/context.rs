//! Run context: the clock and entropy a rank consumes.

use std::time::Duration;

/// External sources of time and randomness for a simulation run.
///
/// # Implementations
///
/// - **Production**: `TokioContext` - wraps `Instant`, seed from the user
///   or the wall clock
/// - **Simulation**: a virtual clock advanced by the harness
///
/// # Determinism
///
/// All randomness is derived from [`seed`](Self::seed), so a run is
/// reproducible from its seed alone.
pub trait RunContext: Send + Sync + 'static {
    /// Returns the monotonic time since context creation.
    fn now(&self) -> Duration;

    /// Returns the seed of this run.
    fn seed(&self) -> u64;
}
