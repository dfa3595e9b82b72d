//! Distributed convergence detection.
//!
//! Three predicates per generation, each one group-wide collective:
//!
//! | Predicate       | Local input               | Collective                 |
//! |-----------------|---------------------------|----------------------------|
//! | steady state    | any real cell changed     | all-reduce OR              |
//! | zero population | no alive real cell        | all-reduce AND             |
//! | plateau         | alive real cells          | sum to coordinator, then   |
//! |                 |                           | broadcast of the run count |
//!
//! The collectives only gather [`Signals`]; [`decide`] turns them into a
//! [`Verdict`] with a fixed precedence, so the decision is testable
//! without a process group.

use crate::block::LocalBlock;
use crate::config::SimulationConfig;
use crate::error::LifeError;
use ringlife_env::{ProcessGroup, Rank};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// DECISION
// ============================================================================

/// Why a run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TerminationReason {
    /// No cell changed anywhere in the last generation
    SteadyState,
    /// No cell is alive on any rank
    ZeroPopulation,
    /// The global population held for `plateau_threshold` generations
    PlateauReached,
    /// `max_generations` generations were computed
    GenerationLimit,
}

impl fmt::Display for TerminationReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::SteadyState => "steady state reached",
            Self::ZeroPopulation => "zero population reached",
            Self::PlateauReached => "plateau threshold reached",
            Self::GenerationLimit => "generation limit reached",
        };
        f.write_str(text)
    }
}

/// Outcome of one generation's convergence decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Continue,
    SteadyState,
    ZeroPopulation,
    PlateauReached,
    GenerationLimit,
}

impl Verdict {
    /// Returns the termination reason, or `None` for [`Verdict::Continue`].
    pub fn termination(self) -> Option<TerminationReason> {
        match self {
            Self::Continue => None,
            Self::SteadyState => Some(TerminationReason::SteadyState),
            Self::ZeroPopulation => Some(TerminationReason::ZeroPopulation),
            Self::PlateauReached => Some(TerminationReason::PlateauReached),
            Self::GenerationLimit => Some(TerminationReason::GenerationLimit),
        }
    }
}

/// Group-wide values gathered during one generation.
///
/// Later signals are `None` when an earlier check already ended the
/// generation and the collective producing them was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Signals {
    /// OR over ranks of "some real cell changed"
    pub global_changed: bool,

    /// AND over ranks of "no alive real cell"
    pub global_zero: Option<bool>,

    /// Coordinator's plateau run, as broadcast
    pub plateau_run: Option<u64>,
}

impl Signals {
    /// Signals of a generation in which the board did not change.
    pub fn steady() -> Self {
        Self {
            global_changed: false,
            global_zero: None,
            plateau_run: None,
        }
    }

    /// Signals of a generation with changes, before the population checks.
    pub fn changed() -> Self {
        Self {
            global_changed: true,
            global_zero: None,
            plateau_run: None,
        }
    }
}

/// Decides the fate of generation `generation` (1-based).
///
/// Precedence: steady state, zero population, plateau, generation limit.
pub fn decide(signals: &Signals, generation: u64, config: &SimulationConfig) -> Verdict {
    if !signals.global_changed {
        return Verdict::SteadyState;
    }
    if signals.global_zero == Some(true) {
        return Verdict::ZeroPopulation;
    }
    if signals
        .plateau_run
        .is_some_and(|run| run >= config.plateau_threshold)
    {
        return Verdict::PlateauReached;
    }
    if generation >= config.max_generations {
        return Verdict::GenerationLimit;
    }
    Verdict::Continue
}

// ============================================================================
// PLATEAU TRACKING (coordinator only)
// ============================================================================

/// Counts consecutive generations with an unchanged global population.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlateauTracker {
    previous: u64,
    run: u64,
}

impl PlateauTracker {
    /// Starts tracking from the initial global population.
    pub fn new(initial: u64) -> Self {
        Self {
            previous: initial,
            run: 0,
        }
    }

    /// Records a generation's global population and returns the run.
    pub fn observe(&mut self, count: u64) -> u64 {
        if count == self.previous {
            self.run += 1;
        } else {
            self.run = 0;
        }
        self.previous = count;
        self.run
    }

    /// Current run of identical counts.
    pub fn run(&self) -> u64 {
        self.run
    }
}

// ============================================================================
// COLLECTIVES
// ============================================================================

/// Result of the plateau collective on one rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlateauObservation {
    /// Run of identical counts, the same on every rank
    pub run: u64,

    /// Global population (coordinator only)
    pub global_alive: Option<u64>,
}

/// Per-rank side of the convergence protocol.
///
/// Only the coordinator holds a [`PlateauTracker`]; its run count reaches
/// the other ranks by broadcast.
#[derive(Debug)]
pub struct ConvergenceDetector {
    tracker: Option<PlateauTracker>,
}

impl ConvergenceDetector {
    /// Sums the initial population onto the coordinator as the plateau
    /// baseline.
    ///
    /// # Returns
    /// The detector and, on the coordinator, the initial global population.
    pub async fn start<G>(group: &G, block: &LocalBlock) -> Result<(Self, Option<u64>), LifeError>
    where
        G: ProcessGroup + ?Sized,
    {
        let initial = group
            .reduce_sum(Rank::COORDINATOR, block.alive_count())
            .await?;
        let tracker = initial.map(PlateauTracker::new);
        Ok((Self { tracker }, initial))
    }

    /// Returns true if a real cell changed on any rank between `current`
    /// and `next`.
    pub async fn global_changed<G>(&self, group: &G, block: &LocalBlock) -> Result<bool, LifeError>
    where
        G: ProcessGroup + ?Sized,
    {
        Ok(group.all_reduce_or(block.changed()).await?)
    }

    /// Returns true if every rank has zero alive real cells.
    pub async fn global_zero<G>(&self, group: &G, local_alive: u64) -> Result<bool, LifeError>
    where
        G: ProcessGroup + ?Sized,
    {
        Ok(group.all_reduce_and(local_alive == 0).await?)
    }

    /// Sums the population onto the coordinator, advances the plateau run
    /// there, and broadcasts the run to every rank.
    pub async fn plateau<G>(
        &mut self,
        group: &G,
        local_alive: u64,
    ) -> Result<PlateauObservation, LifeError>
    where
        G: ProcessGroup + ?Sized,
    {
        let global_alive = group.reduce_sum(Rank::COORDINATOR, local_alive).await?;

        let mut run = [0u64];
        match (&mut self.tracker, global_alive) {
            (Some(tracker), Some(total)) => run[0] = tracker.observe(total),
            (None, None) => {}
            _ => {
                return Err(LifeError::protocol(
                    "population sum delivered to a rank without a plateau tracker",
                ))
            }
        }
        group.broadcast(Rank::COORDINATOR, &mut run).await?;

        Ok(PlateauObservation {
            run: run[0],
            global_alive,
        })
    }
}
