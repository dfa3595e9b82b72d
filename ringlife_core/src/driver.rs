//! Simulation driver: the per-rank state machine.
//!
//! ```text
//!  Initializing ──> Running ──┬──> SteadyState ─────┐
//!                     ^   │   ├──> ZeroPopulation ──┤
//!                     └───┘   ├──> PlateauReached ──┼──> Finalizing
//!                             └──> GenerationLimit ─┘
//! ```
//!
//! Every rank runs the same control flow. Each generation:
//! halo exchange, kernel, steady-state check, swap, zero-population
//! check, plateau update and broadcast. Every check is a collective, so
//! all ranks take the same transition on the same generation.

use crate::block::LocalBlock;
use crate::board::Board;
use crate::config::SimulationConfig;
use crate::convergence::{decide, ConvergenceDetector, Signals, TerminationReason};
use crate::distribute::distribute;
use crate::error::LifeError;
use crate::halo::exchange_ghosts;
use crate::report::{GenerationStats, RankOutcome, RunReport};
use crate::topology::RingTopology;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use ringlife_env::{EnvError, ProcessGroup, Rank, Role, RunContext};
use std::time::Duration;
use tracing::{debug, error, info};

/// Runs a whole simulation on one rank.
///
/// Call on every rank of `group` with the same `config`. `initial` is the
/// board to simulate; it is read on the coordinator only, which draws a
/// random board from the run seed when it is `None`.
///
/// # Returns
/// * `Ok(outcome)` - the report is identical on every rank
/// * `Err(_)` - the group has been aborted, so every other rank fails too
pub async fn run_rank<G, C>(
    group: &G,
    ctx: &C,
    config: &SimulationConfig,
    initial: Option<Board>,
) -> Result<RankOutcome, LifeError>
where
    G: ProcessGroup + ?Sized,
    C: RunContext + ?Sized,
{
    let role = group.role();

    if let Err(err) = config.validate(group.size()) {
        if role.is_coordinator() {
            error!("Invalid configuration: {}", err);
        }
        group.abort(&err.to_string());
        return Err(err.into());
    }

    let driver = RankDriver {
        group,
        ctx,
        config,
        ring: RingTopology::new(group.rank(), group.size()),
        role,
    };

    match driver.run(initial).await {
        Ok(outcome) => Ok(outcome),
        Err(err) => {
            if !matches!(err, LifeError::Env(EnvError::Aborted { .. })) {
                error!(rank = %group.rank(), "Run failed: {}", err);
            }
            group.abort(&err.to_string());
            Err(err)
        }
    }
}

struct RankDriver<'a, G: ?Sized, C: ?Sized> {
    group: &'a G,
    ctx: &'a C,
    config: &'a SimulationConfig,
    ring: RingTopology,
    role: Role,
}

impl<G, C> RankDriver<'_, G, C>
where
    G: ProcessGroup + ?Sized,
    C: RunContext + ?Sized,
{
    async fn run(&self, initial: Option<Board>) -> Result<RankOutcome, LifeError> {
        // ===== Initializing =====
        let board = self.seed_board(initial);
        let mut block = distribute(self.group, board.as_ref(), self.config).await?;
        drop(board);

        let (mut detector, initial_alive) = ConvergenceDetector::start(self.group, &block).await?;
        if let Some(alive) = initial_alive {
            info!(
                "Starting {}x{} board on {} ranks: {} alive",
                self.config.rows,
                self.config.cols,
                self.group.size(),
                alive
            );
        }

        // ===== Running =====
        let start = self.ctx.now();
        let mut history = Vec::new();
        let mut generation = 0u64;

        let reason = loop {
            generation += 1;
            let verdict = self
                .generation(&mut block, &mut detector, generation, start, &mut history)
                .await?;
            if let Some(reason) = verdict {
                break reason;
            }
        };

        // ===== Finalizing =====
        let report = self.census(&block, reason, generation, start).await?;
        if self.role.is_coordinator() {
            if history.last().map(|s: &GenerationStats| s.generation) != Some(generation) {
                history.push(GenerationStats {
                    generation,
                    alive: report.final_alive,
                    elapsed: report.elapsed,
                });
            }
            info!("Finished: {}", report);
            info!(
                "Average time per generation: {:.6}s",
                report.avg_generation_time().as_secs_f64()
            );
        }

        Ok(RankOutcome {
            rank: self.group.rank(),
            role: self.role,
            local_rows: block.local_rows(),
            report,
            history,
        })
    }

    /// Picks the board to distribute (coordinator only).
    fn seed_board(&self, initial: Option<Board>) -> Option<Board> {
        match self.role {
            Role::Worker => None,
            Role::Coordinator => Some(initial.unwrap_or_else(|| {
                let seed = self.config.seed.unwrap_or_else(|| self.ctx.seed());
                info!(
                    "Seeding random {}x{} board (seed={})",
                    self.config.rows, self.config.cols, seed
                );
                let mut rng = ChaCha8Rng::seed_from_u64(seed);
                Board::random(self.config.rows, self.config.cols, &mut rng)
            })),
        }
    }

    /// Computes one generation and decides whether the run ends.
    async fn generation(
        &self,
        block: &mut LocalBlock,
        detector: &mut ConvergenceDetector,
        generation: u64,
        start: Duration,
        history: &mut Vec<GenerationStats>,
    ) -> Result<Option<TerminationReason>, LifeError> {
        exchange_ghosts(self.group, &self.ring, block).await?;
        block.advance();

        let changed = detector.global_changed(self.group, block).await?;
        block.swap();

        let signals = if changed {
            let local_alive = block.alive_count();
            let zero = detector.global_zero(self.group, local_alive).await?;
            let mut signals = Signals {
                global_zero: Some(zero),
                ..Signals::changed()
            };

            let global_alive = if zero {
                self.role.is_coordinator().then_some(0)
            } else {
                let observation = detector.plateau(self.group, local_alive).await?;
                signals.plateau_run = Some(observation.run);
                observation.global_alive
            };

            if let Some(alive) = global_alive {
                self.record(history, generation, alive, start);
            }
            debug!(rank = %self.group.rank(), generation, local_alive, "generation complete");
            signals
        } else {
            Signals::steady()
        };

        Ok(decide(&signals, generation, self.config).termination())
    }

    /// Appends a history entry and emits the periodic report.
    fn record(&self, history: &mut Vec<GenerationStats>, generation: u64, alive: u64, start: Duration) {
        let elapsed = self.ctx.now().saturating_sub(start);
        if self.config.reports_generation(generation) {
            info!(
                "Generation {}: {} alive ({:.3}s)",
                generation,
                alive,
                elapsed.as_secs_f64()
            );
        }
        history.push(GenerationStats {
            generation,
            alive,
            elapsed,
        });
    }

    /// Agrees the final population and elapsed time across the group.
    async fn census(
        &self,
        block: &LocalBlock,
        reason: TerminationReason,
        generation: u64,
        start: Duration,
    ) -> Result<RunReport, LifeError> {
        let total = self
            .group
            .reduce_sum(Rank::COORDINATOR, block.alive_count())
            .await?;

        let mut words = [0u64; 2];
        if let Some(total) = total {
            let elapsed = self.ctx.now().saturating_sub(start);
            words = [total, u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX)];
        }
        self.group.broadcast(Rank::COORDINATOR, &mut words).await?;

        Ok(RunReport {
            reason,
            generation,
            final_alive: words[0],
            elapsed: Duration::from_nanos(words[1]),
            ranks: self.group.size(),
            rows: self.config.rows,
            cols: self.config.cols,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigError;
    use crate::testing::{run_group, FrozenContext};
    use std::sync::Arc;

    async fn run_board(
        ranks: usize,
        config: SimulationConfig,
        board: Option<Board>,
    ) -> Vec<Result<RankOutcome, LifeError>> {
        let ctx = Arc::new(FrozenContext { seed: 99 });
        run_group(ranks, move |ep| {
            let (ctx, config, board) = (ctx.clone(), config.clone(), board.clone());
            async move { run_rank(&*ep, &*ctx, &config, board).await }
        })
        .await
    }

    /// Runs to completion and checks every rank agrees.
    async fn run_ok(ranks: usize, config: SimulationConfig, board: Option<Board>) -> Vec<RankOutcome> {
        let outcomes: Vec<RankOutcome> = run_board(ranks, config, board)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();
        for outcome in &outcomes {
            assert_eq!(outcome.report, outcomes[0].report);
        }
        outcomes
    }

    fn bar() -> Board {
        Board::from_rows(&["####", "....", "....", "...."]).unwrap()
    }

    #[tokio::test]
    async fn test_bar_reaches_steady_state_at_generation_three() {
        let outcomes = run_ok(2, SimulationConfig::new(4, 4, 50), Some(bar())).await;
        let report = &outcomes[0].report;
        assert_eq!(report.reason, TerminationReason::SteadyState);
        assert_eq!(report.generation, 3);
        assert_eq!(report.final_alive, 6);
        assert_eq!(report.ranks, 2);

        assert_eq!(outcomes[0].role, Role::Coordinator);
        assert_eq!(outcomes[1].role, Role::Worker);
        assert_eq!(outcomes[0].local_rows, 2);
        assert!(outcomes[1].history.is_empty());

        let alive: Vec<u64> = outcomes[0].history.iter().map(|s| s.alive).collect();
        assert_eq!(alive, vec![6, 6, 6]);
    }

    #[tokio::test]
    async fn test_bar_is_independent_of_rank_count() {
        for ranks in [1, 3, 4] {
            let outcomes = run_ok(ranks, SimulationConfig::new(4, 4, 50), Some(bar())).await;
            let report = &outcomes[0].report;
            assert_eq!(
                (report.reason, report.generation, report.final_alive),
                (TerminationReason::SteadyState, 3, 6),
                "{ranks} ranks"
            );
        }
    }

    #[tokio::test]
    async fn test_blinker_plateaus_exactly_at_threshold() {
        let blinker = Board::from_rows(&[".....", ".....", ".###.", ".....", "....."]).unwrap();
        let config = SimulationConfig::new(5, 5, 50).with_plateau_threshold(4);
        let outcomes = run_ok(2, config, Some(blinker)).await;

        let report = &outcomes[0].report;
        assert_eq!(report.reason, TerminationReason::PlateauReached);
        assert_eq!(report.generation, 4);
        assert_eq!(report.final_alive, 3);
        assert_eq!(outcomes[0].history.len(), 4);
    }

    #[tokio::test]
    async fn test_single_cell_dies_out() {
        let single = Board::from_rows(&["...", ".#.", "..."]).unwrap();
        let outcomes = run_ok(3, SimulationConfig::new(3, 3, 50), Some(single)).await;

        let report = &outcomes[0].report;
        assert_eq!(report.reason, TerminationReason::ZeroPopulation);
        assert_eq!(report.generation, 1);
        assert_eq!(report.final_alive, 0);
    }

    #[tokio::test]
    async fn test_zero_population_stays_zero() {
        let single = Board::from_rows(&["...", ".#.", "...", "..."]).unwrap();
        let config = SimulationConfig::new(4, 3, 50);
        let results = run_group(3, move |ep| {
            let (config, single) = (config.clone(), single.clone());
            async move {
                let ring = RingTopology::new(ep.rank(), ep.size());
                let mut block = distribute(&*ep, Some(&single), &config).await.unwrap();
                let (detector, initial) = ConvergenceDetector::start(&*ep, &block).await.unwrap();

                // Keep stepping well past extinction.
                let mut zero = Vec::new();
                let mut global = Vec::new();
                for _ in 0..8 {
                    exchange_ghosts(&*ep, &ring, &mut block).await.unwrap();
                    block.advance();
                    block.swap();
                    let local = block.alive_count();
                    zero.push(detector.global_zero(&*ep, local).await.unwrap());
                    global.push(ep.reduce_sum(Rank::COORDINATOR, local).await.unwrap());
                }
                (initial, zero, global)
            }
        })
        .await;

        let (initial, _, global) = &results[0];
        assert_eq!(*initial, Some(1));
        assert_eq!(global, &vec![Some(0); 8]);
        for (_, zero, _) in &results {
            assert_eq!(zero, &vec![true; 8]);
        }
    }

    #[tokio::test]
    async fn test_still_life_is_steady_immediately() {
        let block = Board::from_rows(&["....", ".##.", ".##.", "...."]).unwrap();
        let outcomes = run_ok(2, SimulationConfig::new(4, 4, 50), Some(block)).await;

        let report = &outcomes[0].report;
        assert_eq!(report.reason, TerminationReason::SteadyState);
        assert_eq!(report.generation, 1);
        assert_eq!(report.final_alive, 4);
    }

    #[tokio::test]
    async fn test_glider_hits_generation_limit() {
        let mut glider = Board::empty(8, 8);
        for (r, c) in [(1, 2), (2, 3), (3, 1), (3, 2), (3, 3)] {
            glider.set(r, c, true);
        }
        let outcomes = run_ok(4, SimulationConfig::new(8, 8, 5), Some(glider)).await;

        let report = &outcomes[0].report;
        assert_eq!(report.reason, TerminationReason::GenerationLimit);
        assert_eq!(report.generation, 5);
        assert_eq!(report.final_alive, 5);
    }

    #[tokio::test]
    async fn test_seeded_runs_agree_across_decompositions() {
        let config = SimulationConfig::new(12, 10, 30).with_seed(2024);
        let baseline = run_ok(1, config.clone(), None).await[0].report.clone();

        for ranks in 2..=4 {
            let report = run_ok(ranks, config.clone(), None).await[0].report.clone();
            assert_eq!(report.reason, baseline.reason);
            assert_eq!(report.generation, baseline.generation);
            assert_eq!(report.final_alive, baseline.final_alive);
        }
    }

    #[tokio::test]
    async fn test_unseeded_run_uses_context_seed() {
        let a = run_ok(2, SimulationConfig::new(6, 6, 10), None).await;
        let b = run_ok(2, SimulationConfig::new(6, 6, 10).with_seed(99), None).await;
        assert_eq!(a[0].report, b[0].report);
        assert_eq!(a[0].history, b[0].history);
    }

    #[tokio::test]
    async fn test_config_error_fails_every_rank() {
        let results = run_board(3, SimulationConfig::new(2, 4, 10), None).await;
        for result in results {
            assert_eq!(
                result.unwrap_err(),
                LifeError::Config(ConfigError::TooFewRows { rows: 2, ranks: 3 })
            );
        }
    }

    #[tokio::test]
    async fn test_coordinator_failure_aborts_workers() {
        // The coordinator rejects the board; workers are blocked in scatter
        let results = run_board(3, SimulationConfig::new(4, 4, 10), Some(Board::empty(3, 4))).await;

        assert!(matches!(
            results[0],
            Err(LifeError::Config(ConfigError::BoardShape { .. }))
        ));
        for result in &results[1..] {
            assert!(matches!(
                result,
                Err(LifeError::Env(EnvError::Aborted { .. }))
            ));
        }
    }
}
