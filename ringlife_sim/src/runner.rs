//! Scenario runner - executes canned runs and checks their outcomes.

use crate::context::SimContext;
use crate::error::SimError;
use crate::launcher::{GroupRun, Launcher};
use crate::scenarios::{Expectation, ScenarioId};
use ringlife_core::{RunReport, SimulationConfig};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Results from running a scenario.
#[derive(Debug, Clone)]
pub struct ScenarioResult {
    /// Scenario that was run
    pub scenario: ScenarioId,

    /// Seed used
    pub seed: u64,

    /// Whether scenario passed all assertions
    pub passed: bool,

    /// Agreed report of the (last) run
    pub report: Option<RunReport>,

    /// Failure message if any
    pub failure_reason: Option<String>,
}

/// Runs scenarios on in-process groups with a virtual clock.
pub struct ScenarioRunner {
    /// Seed for random boards
    seed: u64,

    /// Virtual time per clock read
    clock_step: Duration,
}

impl ScenarioRunner {
    /// Creates a new runner.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            clock_step: Duration::from_micros(100),
        }
    }

    /// Sets the virtual time per clock read.
    pub fn with_clock_step(mut self, step: Duration) -> Self {
        self.clock_step = step;
        self
    }

    /// Runs a scenario and checks its outcome.
    pub async fn run(&self, scenario: ScenarioId) -> ScenarioResult {
        info!("Starting scenario: {} (seed={})", scenario.name(), self.seed);

        let outcome = match scenario {
            ScenarioId::Decomposition => self.run_decomposition(scenario).await,
            _ => self.run_expected(scenario).await,
        };

        match outcome {
            Ok((report, None)) => ScenarioResult {
                scenario,
                seed: self.seed,
                passed: true,
                report: Some(report),
                failure_reason: None,
            },
            Ok((report, Some(failure))) => ScenarioResult {
                scenario,
                seed: self.seed,
                passed: false,
                report: Some(report),
                failure_reason: Some(failure),
            },
            Err(err) => ScenarioResult {
                scenario,
                seed: self.seed,
                passed: false,
                report: None,
                failure_reason: Some(err.to_string()),
            },
        }
    }

    /// Runs all scenarios in order.
    pub async fn run_all(&self) -> Vec<ScenarioResult> {
        let mut results = Vec::new();
        for scenario in ScenarioId::all() {
            results.push(self.run(scenario).await);
        }
        results
    }

    async fn launch(
        &self,
        ranks: usize,
        config: &SimulationConfig,
        scenario: ScenarioId,
    ) -> Result<GroupRun, SimError> {
        let setup = scenario.setup();
        let board = setup.pattern.board(config.rows, config.cols)?;
        let context = SimContext::new(self.seed).with_step(self.clock_step);
        Launcher::new(ranks, Arc::new(context))
            .launch(config, board)
            .await
    }

    async fn run_expected(&self, scenario: ScenarioId) -> Result<(RunReport, Option<String>), SimError> {
        let setup = scenario.setup();
        let run = self.launch(setup.ranks, &setup.config, scenario).await?;
        let report = run.report().clone();
        let failure = setup
            .expected
            .and_then(|expected| check(&expected, &report));
        Ok((report, failure))
    }

    /// Same seed on every rank count from 1 to the scenario's ranks.
    async fn run_decomposition(
        &self,
        scenario: ScenarioId,
    ) -> Result<(RunReport, Option<String>), SimError> {
        let setup = scenario.setup();
        let config = setup.config.clone().with_seed(self.seed);

        let baseline = self.launch(1, &config, scenario).await?.report().clone();
        debug!("  1 rank: {}", baseline);

        for ranks in 2..=setup.ranks {
            let report = self.launch(ranks, &config, scenario).await?.report().clone();
            debug!("  {} ranks: {}", ranks, report);
            let expected = Expectation {
                reason: baseline.reason,
                generation: baseline.generation,
                final_alive: baseline.final_alive,
            };
            if let Some(failure) = check(&expected, &report) {
                return Ok((report, Some(format!("{} ranks: {}", ranks, failure))));
            }
        }
        Ok((baseline, None))
    }
}

fn check(expected: &Expectation, report: &RunReport) -> Option<String> {
    if report.reason != expected.reason
        || report.generation != expected.generation
        || report.final_alive != expected.final_alive
    {
        return Some(format!(
            "expected {} at generation {} with {} alive, got {} at generation {} with {} alive",
            expected.reason,
            expected.generation,
            expected.final_alive,
            report.reason,
            report.generation,
            report.final_alive
        ));
    }
    None
}
