//! Launcher - stands up a process group and runs every rank on it.
//!
//! ```text
//!            Launcher
//!               │ LocalGroup::new(P)
//!   ┌───────────┼───────────┐
//!   ▼           ▼           ▼
//! rank 0      rank 1  ... rank P-1     one tokio task each,
//! run_rank    run_rank    run_rank     all calling run_rank
//!   │           │           │
//!   └───────────┴─────┬─────┘
//!                     ▼
//!        join, check every report matches
//! ```

use crate::error::SimError;
use ringlife_core::{
    run_rank, Board, ConfigError, GenerationStats, LifeError, RankOutcome, RunReport,
    SimulationConfig,
};
use ringlife_env::{EnvError, LocalGroup, ProcessGroup, Rank, RunContext};
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::debug;

/// Runs simulations over an in-process group of `ranks` ranks.
pub struct Launcher<C> {
    /// Number of ranks per run
    ranks: usize,

    /// Shared clock and seed
    context: Arc<C>,
}

impl<C: RunContext> Launcher<C> {
    /// Creates a launcher for groups of `ranks` ranks.
    pub fn new(ranks: usize, context: Arc<C>) -> Self {
        Self { ranks, context }
    }

    /// Returns the number of ranks per run.
    pub fn ranks(&self) -> usize {
        self.ranks
    }

    /// Runs one simulation to completion.
    ///
    /// `board` is handed to the coordinator; `None` lets it draw a random
    /// board from the run seed.
    ///
    /// # Returns
    /// Every rank's outcome, in rank order, after checking that all ranks
    /// reported the same result.
    pub async fn launch(
        &self,
        config: &SimulationConfig,
        board: Option<Board>,
    ) -> Result<GroupRun, SimError> {
        if self.ranks == 0 {
            return Err(SimError::Rank {
                rank: Rank::COORDINATOR,
                source: ConfigError::EmptyGroup.into(),
            });
        }

        let group = LocalGroup::new(self.ranks);
        let abort = group.abort_handle();
        let endpoints = group.into_endpoints();
        let mut board = board;

        let mut tasks = JoinSet::new();
        for endpoint in endpoints {
            let context = Arc::clone(&self.context);
            let config = config.clone();
            // Only the coordinator reads the board
            let initial = if endpoint.rank() == Rank::COORDINATOR {
                board.take()
            } else {
                None
            };
            tasks.spawn(async move {
                let rank = endpoint.rank();
                (rank, run_rank(&endpoint, &*context, &config, initial).await)
            });
        }

        let mut results = Vec::with_capacity(self.ranks);
        let mut join_error = None;
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(result) => results.push(result),
                Err(e) => {
                    // Peers of a panicked rank would otherwise wait forever
                    abort.abort("rank task panicked");
                    join_error.get_or_insert_with(|| SimError::Join(e.to_string()));
                }
            }
        }
        if let Some(err) = join_error {
            return Err(err);
        }
        results.sort_by_key(|(rank, _)| *rank);

        let outcomes = collect_outcomes(results)?;
        debug!("All {} ranks agree", outcomes.len());
        Ok(GroupRun { outcomes })
    }
}

/// Keeps the root cause when ranks fail: a rank aborted by a peer only
/// reports the abort, so the first other error wins.
fn collect_outcomes(
    results: Vec<(Rank, Result<RankOutcome, LifeError>)>,
) -> Result<Vec<RankOutcome>, SimError> {
    let mut outcomes = Vec::with_capacity(results.len());
    let mut first_error: Option<(Rank, LifeError)> = None;

    for (rank, result) in results {
        match result {
            Ok(outcome) => outcomes.push(outcome),
            Err(err) => {
                let is_abort = matches!(err, LifeError::Env(EnvError::Aborted { .. }));
                let replace = match &first_error {
                    None => true,
                    Some((_, LifeError::Env(EnvError::Aborted { .. }))) => !is_abort,
                    Some(_) => false,
                };
                if replace {
                    first_error = Some((rank, err));
                }
            }
        }
    }

    if let Some((rank, source)) = first_error {
        return Err(SimError::Rank { rank, source });
    }

    if let Some(first) = outcomes.first() {
        if let Some(other) = outcomes.iter().find(|o| o.report != first.report) {
            return Err(SimError::Disagreement { rank: other.rank });
        }
    }
    Ok(outcomes)
}

/// Outcomes of one run, one per rank.
#[derive(Debug, Clone)]
pub struct GroupRun {
    outcomes: Vec<RankOutcome>,
}

impl GroupRun {
    /// The agreed report.
    pub fn report(&self) -> &RunReport {
        &self.outcomes[0].report
    }

    /// The coordinator's per-generation history.
    pub fn history(&self) -> &[GenerationStats] {
        &self.outcomes[0].history
    }

    /// Every rank's outcome, in rank order.
    pub fn outcomes(&self) -> &[RankOutcome] {
        &self.outcomes
    }
}
