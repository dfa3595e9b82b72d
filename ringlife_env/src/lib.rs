//! RingLife Environment Abstraction Layer
//!
//! This crate defines the boundary between the simulation core and the
//! process group it runs on, so the same rank code runs over any
//! transport offering the primitives below.
//!
//! # Core Concept: SPMD over a process group
//!
//! A fixed number of ranks execute identical control flow in lock-step.
//! Everything a rank consumes from outside is intercepted here:
//! - Communication ([`ProcessGroup`]): combined send-and-receive, scatter,
//!   broadcast, sum reduction, boolean all-reductions, group abort
//! - Time and randomness ([`RunContext`]): monotonic clock, run seed
//!
//! # Example
//!
//! ```ignore
//! use ringlife_env::{LocalGroup, ProcessGroup, Rank};
//!
//! let endpoints = LocalGroup::new(4).into_endpoints();
//! for ep in endpoints {
//!     tokio::spawn(async move {
//!         let any = ep.all_reduce_or(ep.rank() == Rank(2)).await?;
//!         assert!(any);
//!         Ok::<_, ringlife_env::EnvError>(())
//!     });
//! }
//! ```

mod context;
mod error;
mod group;
mod local;
mod tokio_impl;
mod types;

pub use context::RunContext;
pub use error::EnvError;
pub use group::ProcessGroup;
pub use local::{GroupAbort, LocalEndpoint, LocalGroup};
pub use tokio_impl::TokioContext;
pub use types::{Envelope, Rank, Role, Tag};
