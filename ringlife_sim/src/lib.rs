//! RingLife Simulation Harness
//!
//! Stands up a process group of `P` ranks inside one process and runs the
//! distributed simulation on it, one tokio task per rank.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────┐
//! │                       Launcher                         │
//! │  ┌──────────────────────────────────────────────────┐  │
//! │  │ LocalGroup (per-rank mailboxes + abort signal)   │  │
//! │  └──────────────────────────────────────────────────┘  │
//! │       │               │                   │            │
//! │  ┌────▼────┐     ┌────▼────┐         ┌────▼────┐       │
//! │  │ rank 0  │◄───►│ rank 1  │◄─ ... ─►│ rank P-1│       │
//! │  │ coord.  │     │ worker  │         │ worker  │       │
//! │  └─────────┘     └─────────┘         └─────────┘       │
//! │       ▲ ring: rank P-1's next is rank 0 ▲              │
//! └────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use ringlife_sim::{Launcher, Pattern, SimContext};
//! use ringlife_core::SimulationConfig;
//!
//! let launcher = Launcher::new(2, SimContext::shared(42));
//! let board = Pattern::Bar.board(4, 4)?;
//! let run = launcher.launch(&SimulationConfig::new(4, 4, 50), board).await?;
//! println!("{}", run.report());
//! ```

mod context;
mod error;
mod exporter;
mod launcher;
mod patterns;
mod runner;
pub mod scenarios;

pub use context::SimContext;
pub use error::SimError;
pub use exporter::{GenerationRecord, RunExport};
pub use launcher::{GroupRun, Launcher};
pub use patterns::Pattern;
pub use runner::{ScenarioResult, ScenarioRunner};
