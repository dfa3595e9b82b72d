//! RingLife CLI
//!
//! Runs the distributed Game of Life on an in-process group of ranks, or
//! runs the canned scenarios.

use clap::Parser;
use ringlife_core::SimulationConfig;
use ringlife_env::{RunContext, TokioContext};
use ringlife_sim::scenarios::ScenarioId;
use ringlife_sim::{Launcher, Pattern, RunExport, ScenarioResult, ScenarioRunner, SimError};
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

/// Distributed Game of Life on a ring of ranks
#[derive(Parser, Debug)]
#[command(name = "ringlife")]
#[command(about = "Run Conway's Game of Life split across a ring of ranks", long_about = None)]
struct Args {
    /// Board rows
    #[arg(short = 'n', long, default_value = "64")]
    rows: usize,

    /// Board columns
    #[arg(short = 'm', long, default_value = "64")]
    cols: usize,

    /// Generation limit
    #[arg(short, long, default_value = "100")]
    iterations: u64,

    /// Seed for the random board (0 = random from time)
    #[arg(short, long, default_value = "0")]
    seed: u64,

    /// Number of ranks
    #[arg(short = 'p', long, default_value = "4")]
    ranks: usize,

    /// Consecutive identical population counts that end the run
    #[arg(long, default_value_t = ringlife_core::DEFAULT_PLATEAU_THRESHOLD)]
    plateau: u64,

    /// Report every N generations (0 = final report only)
    #[arg(long, default_value = "1")]
    log_every: u64,

    /// Initial pattern (random, blinker, block, glider, bar, single)
    #[arg(long, default_value = "random")]
    pattern: String,

    /// Run a canned scenario instead (bar, blinker, single, still_life, glider, decomposition, all)
    #[arg(long)]
    scenario: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output on stdout
    #[arg(long)]
    json: bool,

    /// Export the run to a JSON file
    #[arg(long)]
    export: Option<String>,
}

fn usage_error(message: &str) -> ! {
    eprintln!("Error: {}", message);
    std::process::exit(1);
}

/// Runs one simulation from the command-line flags.
async fn run_simulation(args: &Args) -> Result<(), SimError> {
    let pattern: Pattern = args.pattern.parse().unwrap_or_else(|e: String| {
        usage_error(&format!("{} (available: random, blinker, block, glider, bar, single)", e))
    });

    let mut config = SimulationConfig::new(args.rows, args.cols, args.iterations)
        .with_plateau_threshold(args.plateau)
        .with_log_every(if args.json { 0 } else { args.log_every });
    if args.seed != 0 {
        config = config.with_seed(args.seed);
    }

    let context = TokioContext::shared(config.seed);
    if pattern == Pattern::Random && config.seed.is_none() {
        // Record the time-derived seed so the run can be reproduced
        config = config.with_seed(context.seed());
    }

    config.validate(args.ranks)?;
    let board = pattern.board(args.rows, args.cols)?;
    let launcher = Launcher::new(args.ranks, context);
    let run = launcher.launch(&config, board).await?;

    let export = RunExport::new(pattern.name(), &config, run.report(), run.history());
    if let Some(path) = &args.export {
        export.write_to_file(path)?;
        info!("Exported {} generations to {}", export.history.len(), path);
    }

    if args.json {
        println!("{}", export.to_json()?);
    } else {
        info!("Result: {}", run.report());
    }
    Ok(())
}

/// Runs canned scenarios; returns the number that failed.
async fn run_scenarios(args: &Args, name: &str) -> usize {
    let scenarios: Vec<ScenarioId> = if name == "all" {
        ScenarioId::all()
    } else {
        vec![name.parse().unwrap_or_else(|e: String| {
            usage_error(&format!(
                "{} (available: bar, blinker, single, still_life, glider, decomposition, all)",
                e
            ))
        })]
    };

    let seed = if args.seed == 0 { 42 } else { args.seed };
    let runner = ScenarioRunner::new(seed);

    let mut results: Vec<ScenarioResult> = Vec::new();
    for scenario in scenarios {
        let result = runner.run(scenario).await;
        if !args.json {
            if result.passed {
                info!("✓ {} PASSED - {}", scenario.name(), scenario.description());
            } else {
                error!(
                    "✗ {} FAILED: {}",
                    scenario.name(),
                    result.failure_reason.as_deref().unwrap_or("unknown")
                );
            }
        }
        results.push(result);
    }

    let failed = results.iter().filter(|r| !r.passed).count();
    if args.json {
        let summary = serde_json::json!({
            "total": results.len(),
            "passed": results.len() - failed,
            "failed": failed,
            "results": results.iter().map(|r| {
                serde_json::json!({
                    "scenario": r.scenario.name(),
                    "seed": r.seed,
                    "passed": r.passed,
                    "report": r.report,
                    "failure_reason": r.failure_reason,
                })
            }).collect::<Vec<_>>(),
        });
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => println!("{}", text),
            Err(e) => error!("Failed to serialize summary: {}", e),
        }
    } else if failed == 0 {
        info!("✅ All {} scenarios passed!", results.len());
    } else {
        error!("❌ {}/{} scenarios failed!", failed, results.len());
    }
    failed
}

#[tokio::main]
async fn main() {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) if e.use_stderr() => {
            let _ = e.print();
            std::process::exit(1);
        }
        Err(e) => e.exit(),
    };

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");

    if let Some(name) = args.scenario.clone() {
        if run_scenarios(&args, &name).await > 0 {
            std::process::exit(1);
        }
        return;
    }

    if !args.json {
        info!("RingLife v{}", env!("CARGO_PKG_VERSION"));
        info!(
            "{}x{} board, {} ranks, up to {} generations",
            args.rows, args.cols, args.ranks, args.iterations
        );
    }

    if let Err(e) = run_simulation(&args).await {
        error!("{}", e);
        std::process::exit(1);
    }
}
