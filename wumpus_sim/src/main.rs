//! Wumpus World Simulator CLI
//!
//! Run the autonomous explorer over canned or random maps.

use clap::Parser;
use std::process::ExitCode;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;
use wumpus_core::{EpisodeController, TieBreak};
use wumpus_env::TokioContext;
use wumpus_sim::scenarios::ScenarioId;
use wumpus_sim::{ScenarioResult, ScenarioRunner, SimConfig, SimError, SimWorld};

/// Wumpus World explorer simulator
#[derive(Parser, Debug)]
#[command(name = "wumpus-sim")]
#[command(about = "Run the autonomous Wumpus World explorer over simulated maps", long_about = None)]
struct Args {
    /// Master seed for determinism (0 = random from time)
    #[arg(short, long, default_value = "42")]
    seed: u64,

    /// Side length for random maps
    #[arg(short = 'n', long, default_value = "6")]
    size: usize,

    /// Scenario to run (classic, corridor, walled_start, gold_behind_wumpus, random, all)
    #[arg(short = 'S', long, default_value = "all")]
    scenario: String,

    /// Number of consecutive seeds to run (for CI mode)
    #[arg(long, default_value = "1")]
    seeds: usize,

    /// Maximum virtual duration in seconds
    #[arg(short, long, default_value = "600")]
    duration: f64,

    /// Candidate selection: random or first
    #[arg(long, default_value = "random")]
    tie_break: TieBreak,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// JSON output for CI parsing
    #[arg(long)]
    json: bool,

    /// Export frames of a single scenario run to a JSON file
    #[arg(long)]
    export: Option<String>,

    /// Run a single scenario on the wall clock, logging events as they happen
    #[arg(long)]
    realtime: bool,
}

impl Args {
    fn config(&self, seed: u64) -> SimConfig {
        SimConfig {
            seed,
            size: self.size,
            max_duration: Duration::from_secs_f64(self.duration.max(0.0)),
            tie_break: self.tie_break,
            export: self.export.is_some(),
            ..SimConfig::default()
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize logging
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
    }

    if !args.json {
        info!("Wumpus World Simulator v{}", env!("CARGO_PKG_VERSION"));
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    }

    // Parse scenarios
    let scenarios: Vec<ScenarioId> = if args.scenario == "all" {
        ScenarioId::all()
    } else {
        match args.scenario.parse() {
            Ok(id) => vec![id],
            Err(e) => {
                eprintln!("Error: {}", e);
                eprintln!("Available scenarios: classic, corridor, walled_start, gold_behind_wumpus, random, all");
                return ExitCode::FAILURE;
            }
        }
    };

    // Determine base seed
    let base_seed = if args.seed == 0 {
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_nanos() as u64)
            .unwrap_or(42)
    } else {
        args.seed
    };

    if args.realtime || args.export.is_some() {
        if scenarios.len() > 1 {
            eprintln!("Error: --realtime and --export only support a single scenario, not 'all'");
            return ExitCode::FAILURE;
        }
        let config = args.config(base_seed);
        let outcome = if args.realtime {
            run_realtime(config, scenarios[0])
        } else {
            run_with_export(config, scenarios[0], args.export.as_deref().unwrap_or_default())
        };
        return match outcome {
            Ok(true) => ExitCode::SUCCESS,
            Ok(false) => ExitCode::FAILURE,
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        };
    }

    // Run simulations
    let mut all_results: Vec<ScenarioResult> = Vec::new();
    let mut failed_count = 0;

    for seed_offset in 0..args.seeds {
        let seed = base_seed.wrapping_add(seed_offset as u64);
        let runner = ScenarioRunner::with_config(args.config(seed));

        for scenario in &scenarios {
            let result = match runner.run(*scenario) {
                Ok(result) => result,
                Err(e) => {
                    eprintln!("Error: {} (seed={}): {}", scenario, seed, e);
                    return ExitCode::FAILURE;
                }
            };

            if !args.json {
                if result.passed {
                    info!("✓ {} (seed={}) PASSED: {}", scenario, seed, result.outcome);
                } else {
                    error!(
                        "✗ {} (seed={}) FAILED: {}",
                        scenario,
                        seed,
                        result.failure_reason.as_deref().unwrap_or("unknown")
                    );
                }
            }

            if !result.passed {
                failed_count += 1;
            }
            all_results.push(result);
        }
    }

    // Summary
    let total = all_results.len();
    let passed = total - failed_count;

    if args.json {
        let summary = serde_json::json!({
            "total": total,
            "passed": passed,
            "failed": failed_count,
            "results": all_results,
        });
        match serde_json::to_string_pretty(&summary) {
            Ok(text) => println!("{}", text),
            Err(e) => eprintln!("Error: {}", e),
        }
    } else {
        info!("");
        info!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

        if failed_count == 0 {
            info!("✅ All {} scenario runs passed!", total);
        } else {
            error!("❌ {}/{} scenario runs failed!", failed_count, total);
            for result in all_results.iter().filter(|r| !r.passed) {
                error!(
                    "  - {} seed={}: {}",
                    result.scenario,
                    result.seed,
                    result.failure_reason.as_deref().unwrap_or("unknown")
                );
            }
        }
    }

    // Exit with proper code for CI
    if failed_count > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}

/// Runs one scenario in virtual time and writes its frames to `path`.
fn run_with_export(config: SimConfig, scenario: ScenarioId, path: &str) -> Result<bool, SimError> {
    info!("Running with export to: {}", path);
    let seed = config.seed;
    let result = ScenarioRunner::with_config(config).run(scenario)?;

    if let Some(export) = &result.export {
        export.write_to_file(path)?;
        info!("Exported {} frames to {}", export.frames.len(), path);
    }

    if result.passed {
        info!("✓ {} (seed={}) PASSED: {}", scenario, seed, result.outcome);
    } else {
        error!(
            "✗ {} FAILED: {}",
            scenario,
            result.failure_reason.as_deref().unwrap_or("unknown")
        );
    }
    Ok(result.passed)
}

/// Runs one scenario on the wall clock until it ends or the duration elapses.
fn run_realtime(config: SimConfig, scenario: ScenarioId) -> Result<bool, SimError> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_time()
        .build()?;

    runtime.block_on(async move {
        // The map still comes from the seed; only the clock and tie-breaking are live
        let sim = SimWorld::new(config.clone(), scenario)?;
        for row in sim.map.rows() {
            info!("  {}", row);
        }

        let context = TokioContext::shared();
        let (mut ctl, mut events) =
            EpisodeController::new(context, sim.map.clone(), sim.episode_config())?;

        let printer = tokio::spawn(async move {
            while let Some(event) = events.recv().await {
                info!("{}", event);
            }
        });

        let (stop_tx, stop_rx) = watch::channel(false);
        let deadline = config.max_duration;
        tokio::spawn(async move {
            tokio::time::sleep(deadline).await;
            let _ = stop_tx.send(true);
        });

        ctl.start_episode()?;
        ctl.run_auto();
        let state = ctl.run(stop_rx).await;
        drop(ctl);
        let _ = printer.await;

        info!("{} ended {}", scenario, state);
        Ok::<bool, SimError>(state.is_final())
    })
}
