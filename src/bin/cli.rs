//! Wallrunner CLI - write configs, run scenarios and soak-test the movement model

use clap::{Parser, Subcommand};
use rayon::prelude::*;
use std::io::Write;
use std::ops::ControlFlow;
use std::panic::{self, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;
use tracing::{error, info};

use wallrunner::config::SimConfig;
use wallrunner::game::constants::movement::MAX_JUMPS;
use wallrunner::game::instance::{SimulationInstance, TickReport};
use wallrunner::game::movement::MovementModeKind;
use wallrunner::game::scenario::Scenario;
use wallrunner::game::Simulation;
use wallrunner::logging;

#[derive(Parser)]
#[command(name = "wallrunner")]
#[command(about = "First-person wall-running movement simulator", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the default configuration to a TOML file
    Init {
        /// Output path
        #[arg(default_value = "wallrunner.toml")]
        path: PathBuf,
    },
    /// Run a scenario and print one JSON report per tick
    Run {
        /// Configuration file (defaults are used when omitted)
        #[arg(short, long, env = "WALLRUNNER_CONFIG")]
        config: Option<PathBuf>,
        /// Scenario file; takes precedence over --seed
        #[arg(short, long)]
        scenario: Option<PathBuf>,
        /// Generate a random scenario from this seed instead of the built-in corridor run
        #[arg(long)]
        seed: Option<u64>,
        /// Length of a random scenario in ticks
        #[arg(long, default_value = "500")]
        ticks: u32,
        /// Pace ticks at the configured tick rate with input fed from another thread
        #[arg(long)]
        realtime: bool,
    },
    /// Run many seeded random scenarios in parallel and check movement invariants
    Soak {
        /// Number of scenarios
        #[arg(long, default_value = "64")]
        runs: u64,
        /// Ticks per scenario
        #[arg(long, default_value = "1000")]
        ticks: u32,
        /// Seed of the first scenario; run i uses seed + i
        #[arg(long, default_value = "0")]
        seed: u64,
        /// Configuration file (defaults are used when omitted)
        #[arg(short, long, env = "WALLRUNNER_CONFIG")]
        config: Option<PathBuf>,
    },
}

fn main() {
    logging::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Init { path } => init_config(&path),
        Commands::Run {
            config,
            scenario,
            seed,
            ticks,
            realtime,
        } => run_scenario(config, scenario, seed, ticks, realtime),
        Commands::Soak {
            runs,
            ticks,
            seed,
            config,
        } => soak(runs, ticks, seed, config),
    }
}

fn exit_with(message: impl std::fmt::Display) -> ! {
    error!("{message}");
    std::process::exit(1);
}

fn load_config(path: Option<&Path>) -> SimConfig {
    match path {
        Some(path) => SimConfig::from_file(path).unwrap_or_else(|e| exit_with(e)),
        None => SimConfig::default(),
    }
}

// =============================================================================
// Init Command
// =============================================================================

fn init_config(path: &Path) {
    if path.exists() {
        exit_with(format!("{} already exists", path.display()));
    }

    let text = SimConfig::default()
        .to_toml()
        .unwrap_or_else(|e| exit_with(e));
    let contents = format!("# Wallrunner simulation configuration\n\n{text}");
    if let Err(e) = std::fs::write(path, contents) {
        exit_with(format!("failed to write {}: {e}", path.display()));
    }

    info!(path = %path.display(), "wrote default configuration");
}

// =============================================================================
// Run Command
// =============================================================================

fn run_scenario(
    config_path: Option<PathBuf>,
    scenario_path: Option<PathBuf>,
    seed: Option<u64>,
    ticks: u32,
    realtime: bool,
) {
    let config = load_config(config_path.as_deref());
    let scenario = match (scenario_path, seed) {
        (Some(path), _) => Scenario::from_file(&path).unwrap_or_else(|e| exit_with(e)),
        (None, Some(seed)) => Scenario::random(seed, ticks),
        (None, None) => Scenario::corridor_run(),
    };

    let instance = SimulationInstance::new(config).unwrap_or_else(|e| exit_with(e));
    info!(
        ticks = scenario.total_ticks(),
        tick_rate = instance.config.tick_rate,
        realtime,
        "running scenario"
    );

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    let mut print = |report: &TickReport| write_report(&mut out, report);

    let ran = if realtime {
        run_realtime(instance, &scenario, &mut print)
    } else {
        let mut instance = instance;
        let sender = instance.intent_sender();
        let mut ran = 0;
        for sample in scenario.samples() {
            sender.submit(sample);
            ran += 1;
            if print(&instance.tick()).is_break() {
                break;
            }
        }
        ran
    };

    info!(ticks = ran, "scenario finished");
}

/// Write one report as a JSON line. Breaks once the output can no longer be written.
fn write_report<W: Write>(out: &mut W, report: &TickReport) -> ControlFlow<()> {
    let line = match serde_json::to_string(report) {
        Ok(line) => line,
        Err(e) => {
            error!(tick = report.tick, "failed to encode report: {e}");
            return ControlFlow::Continue(());
        }
    };
    match writeln!(out, "{line}") {
        Ok(()) => ControlFlow::Continue(()),
        Err(e) => {
            error!(tick = report.tick, "output closed, stopping run: {e}");
            ControlFlow::Break(())
        }
    }
}

/// Feed scenario samples from a separate thread at the tick rate while the
/// simulation runs on this one, so the two sides only meet in the intent buffer.
fn run_realtime<F>(instance: SimulationInstance, scenario: &Scenario, on_tick: F) -> u64
where
    F: FnMut(&TickReport) -> ControlFlow<()>,
{
    let total = scenario.total_ticks();
    let period = Duration::from_secs_f64(1.0 / instance.config.tick_rate as f64);
    let (mut sim, _handle) = Simulation::new(instance);

    let sender = sim.intent_sender();
    let samples: Vec<_> = scenario.samples().collect();
    let feeder = thread::spawn(move || {
        for sample in samples {
            if !sender.submit(sample) {
                break;
            }
            thread::sleep(period);
        }
    });

    let ran = sim.run_for(total, on_tick);
    drop(sim);

    if feeder.join().is_err() {
        error!("input feeder thread panicked");
    }
    ran
}

// =============================================================================
// Soak Command
// =============================================================================

#[derive(Debug)]
struct SoakRun {
    seed: u64,
    ticks: usize,
    wall_runs: usize,
    landings: usize,
    violations: Vec<String>,
}

/// Invariants every tick report must satisfy.
fn check_report(config: &SimConfig, report: &TickReport, violations: &mut Vec<String>) {
    let tick = report.tick;
    if report.remaining_jumps > MAX_JUMPS {
        violations.push(format!("tick {tick}: remaining_jumps {}", report.remaining_jumps));
    }
    if report.wall_run_timer >= config.movement.wall_run_max_duration {
        violations.push(format!("tick {tick}: wall_run_timer {}", report.wall_run_timer));
    }
    if report.mode != MovementModeKind::WallRunning && report.wall_run_timer != 0.0 {
        violations.push(format!("tick {tick}: timer {} outside wall-run", report.wall_run_timer));
    }
    if report.position.iter().chain(report.velocity.iter()).any(|v| !v.is_finite()) {
        violations.push(format!("tick {tick}: non-finite state"));
    }
}

fn soak_one(config: &SimConfig, seed: u64, ticks: u32) -> SoakRun {
    let mut run = SoakRun {
        seed,
        ticks: 0,
        wall_runs: 0,
        landings: 0,
        violations: Vec::new(),
    };

    let result = panic::catch_unwind(AssertUnwindSafe(|| {
        let mut instance = SimulationInstance::new(config.clone())?;
        Ok::<_, wallrunner::game::instance::SetupError>(
            instance.run_headless(&Scenario::random(seed, ticks)),
        )
    }));

    let reports = match result {
        Ok(Ok(reports)) => reports,
        Ok(Err(e)) => {
            run.violations.push(format!("setup failed: {e}"));
            return run;
        }
        Err(payload) => {
            logging::log_panic("soak", &format!("seed {seed}"), payload.as_ref());
            run.violations.push(format!("panicked: {}", logging::panic_payload_message(payload.as_ref())));
            return run;
        }
    };

    let mut previous = MovementModeKind::Airborne;
    for report in &reports {
        check_report(config, report, &mut run.violations);
        if report.mode != previous {
            match report.mode {
                MovementModeKind::WallRunning => run.wall_runs += 1,
                MovementModeKind::Grounded => run.landings += 1,
                MovementModeKind::Airborne => {}
            }
        }
        previous = report.mode;
    }
    run.ticks = reports.len();
    run
}

fn soak(runs: u64, ticks: u32, seed: u64, config_path: Option<PathBuf>) {
    let config = load_config(config_path.as_deref());
    info!(runs, ticks, seed, "starting soak");

    let results: Vec<SoakRun> = (0..runs)
        .into_par_iter()
        .map(|i| soak_one(&config, seed.wrapping_add(i), ticks))
        .collect();

    let failed: Vec<&SoakRun> = results.iter().filter(|r| !r.violations.is_empty()).collect();
    for run in &failed {
        for violation in run.violations.iter().take(5) {
            error!(seed = run.seed, "{violation}");
        }
    }

    let summary = serde_json::json!({
        "runs": results.len(),
        "ticks": results.iter().map(|r| r.ticks).sum::<usize>(),
        "wall_runs": results.iter().map(|r| r.wall_runs).sum::<usize>(),
        "landings": results.iter().map(|r| r.landings).sum::<usize>(),
        "failed_seeds": failed.iter().map(|r| r.seed).collect::<Vec<_>>(),
    });
    println!("{summary}");

    if !failed.is_empty() {
        std::process::exit(1);
    }
}
