//! Headless skirmish runner.
//!
//! This binary runs the simulation without graphics, controlled via JSON on
//! stdin/stdout. Designed for scripted drivers, CI testing, and replay
//! verification.
//!
//! # Usage
//!
//! ```bash
//! # Interactive mode - read commands from stdin
//! cargo run -p skirmish_headless -- run
//!
//! # Custom world and tuning, recording a replay
//! cargo run -p skirmish_headless -- --scenario scenarios/harvest.ron \
//!     --config sim.ron run --record session.replay
//!
//! # Verify a replay
//! cargo run -p skirmish_headless -- replay session.replay
//!
//! # Watch the demo play out in real time
//! cargo run -p skirmish_headless -- demo --frames 300 --realtime
//! ```
//!
//! # Protocol
//!
//! Input (stdin): JSON commands, one per line
//! Output (stdout): JSON responses, one per line
//! Logs (stderr): Debug information

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::Duration;

use clap::{Parser, Subcommand};
use skirmish_core::components::EntityId;
use skirmish_core::config::SimConfig;
use skirmish_core::error::GameError;
use skirmish_core::math::{Fixed, Vec2Fixed};
use skirmish_core::replay::Replay;
use skirmish_core::simulation::Simulation;
use skirmish_input::{InputConfig, InputController, InputError};
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use skirmish_headless::{
    protocol::{Response, StateView},
    runner::run_frames,
    FrameClock, HeadlessConfig, HeadlessRunner, Scenario, ScenarioError,
};

#[derive(Parser)]
#[command(name = "skirmish_headless")]
#[command(about = "Headless skirmish runner for scripted play and CI")]
#[command(version)]
struct Cli {
    /// Enable verbose logging to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Simulation tuning (RON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Pointer tuning (RON)
    #[arg(long, global = true)]
    input_config: Option<PathBuf>,

    /// Scenario file to load instead of the built-in demo
    #[arg(short, long, global = true)]
    scenario: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve the JSON-lines protocol on stdin/stdout
    Run {
        /// Output state after every advance
        #[arg(long)]
        auto_state: bool,

        /// Record the session to a replay file
        #[arg(long)]
        record: Option<PathBuf>,
    },

    /// Verify that a replay reproduces its recorded hash
    Replay {
        /// Replay file
        path: PathBuf,

        /// Print the final state as JSON
        #[arg(long)]
        print_state: bool,
    },

    /// Order the demo units and let the world run
    Demo {
        /// Number of frames to run
        #[arg(short, long, default_value = "120")]
        frames: u32,

        /// Frame length in milliseconds
        #[arg(long, default_value = "16")]
        frame_ms: u32,

        /// Pace frames by the wall clock instead of fixed steps
        #[arg(long)]
        realtime: bool,
    },
}

#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    Scenario(#[from] ScenarioError),
    #[error(transparent)]
    Core(#[from] GameError),
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Replay does not reproduce its recorded hash")]
    ReplayMismatch,
    #[error("Frame length {0} ms is out of range")]
    FrameLength(u32),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize logging to stderr (stdout is for protocol)
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(io::stderr)
                .with_ansi(true),
        )
        .with(filter)
        .init();

    let world = cli.world();
    let result = match cli.command {
        Some(Commands::Run { auto_state, record }) => cmd_run(&world, auto_state, record),
        Some(Commands::Replay { path, print_state }) => cmd_replay(&path, print_state),
        Some(Commands::Demo {
            frames,
            frame_ms,
            realtime,
        }) => cmd_demo(&world, frames, frame_ms, realtime),
        None => cmd_run(&world, false, None),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

/// Where the world and its tuning come from.
struct WorldSource {
    config: Option<PathBuf>,
    input_config: Option<PathBuf>,
    scenario: Option<PathBuf>,
}

impl Cli {
    fn world(&self) -> WorldSource {
        WorldSource {
            config: self.config.clone(),
            input_config: self.input_config.clone(),
            scenario: self.scenario.clone(),
        }
    }
}

impl WorldSource {
    fn load(&self) -> Result<(Scenario, Simulation, InputController), CliError> {
        let config = match &self.config {
            Some(path) => SimConfig::load(path)?,
            None => SimConfig::default(),
        };
        let input = match &self.input_config {
            Some(path) => InputConfig::load(path)?,
            None => InputConfig::default(),
        };
        let scenario = match &self.scenario {
            Some(path) => Scenario::load(path)?,
            None => Scenario::demo(),
        };
        let sim = scenario.build(config)?;
        tracing::info!(
            scenario = %scenario.name,
            entities = sim.entity_count(),
            "World loaded"
        );
        Ok((scenario, sim, InputController::new(input)))
    }
}

/// Serve the protocol on stdin/stdout.
fn cmd_run(
    world: &WorldSource,
    auto_state: bool,
    record: Option<PathBuf>,
) -> Result<(), CliError> {
    let (scenario, sim, input) = world.load()?;
    let config = HeadlessConfig {
        auto_state_output: auto_state,
    };
    let mut runner = HeadlessRunner::with_config(sim, input, config);
    if record.is_some() {
        runner.record(&scenario.name)?;
    }

    let stdin = io::stdin();
    let stdout = io::stdout();
    runner.run(stdin.lock(), stdout.lock())?;

    if let (Some(path), Some(replay)) = (record, runner.take_replay()) {
        replay.save(&path)?;
        tracing::info!(
            path = %path.display(),
            commands = replay.command_count(),
            "Replay saved"
        );
    }
    Ok(())
}

/// Load, play back and compare a replay.
fn cmd_replay(path: &Path, print_state: bool) -> Result<(), CliError> {
    let replay = Replay::load(path)?;
    tracing::info!(
        scenario = %replay.scenario_id,
        commands = replay.command_count(),
        "Replay loaded"
    );

    let sim = replay.play()?;
    let mut stdout = io::stdout().lock();
    if print_state {
        stdout.write_all(Response::State(StateView::capture(&sim)).to_json_line().as_bytes())?;
    }
    stdout.write_all(Response::hash(&sim).to_json_line().as_bytes())?;

    if sim.state_hash() == replay.final_hash {
        tracing::info!(hash = replay.final_hash, "Replay verified");
        Ok(())
    } else {
        Err(CliError::ReplayMismatch)
    }
}

/// `--frame-ms` as simulation time.
fn frame_length(frame_ms: u32) -> Result<Fixed, CliError> {
    Fixed::checked_from_num(frame_ms).ok_or(CliError::FrameLength(frame_ms))
}

/// Send the first unit to the first resource node, the second unit
/// somewhere open, and run.
fn cmd_demo(
    world: &WorldSource,
    frames: u32,
    frame_ms: u32,
    realtime: bool,
) -> Result<(), CliError> {
    let frame_delta = frame_length(frame_ms)?;
    let (_, mut sim, _) = world.load()?;

    let unit_ids: Vec<EntityId> = sim.units().map(|unit| unit.core.id.clone()).collect();
    let node = sim.resources().next().map(|node| node.core.position);
    if let (Some(worker), Some(node)) = (unit_ids.first(), node) {
        sim.issue_order(worker, node.x, node.y);
    }
    if let Some(soldier) = unit_ids.get(1) {
        let open = Vec2Fixed::from_ints(20, 20);
        sim.issue_order(soldier, open.x, open.y);
    }

    if realtime {
        let mut clock = FrameClock::new();
        clock.tick();
        for _ in 0..frames {
            std::thread::sleep(Duration::from_millis(u64::from(frame_ms)));
            sim.advance(clock.tick());
        }
    } else {
        run_frames(&mut sim, frames, frame_delta);
    }

    let resources = sim.player_resources();
    tracing::info!(
        elapsed_ms = %sim.elapsed_ms(),
        gold = resources.gold,
        wood = resources.wood,
        "Demo finished"
    );
    let mut stdout = io::stdout().lock();
    stdout.write_all(Response::State(StateView::capture(&sim)).to_json_line().as_bytes())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_length_range() {
        assert_eq!(frame_length(16).unwrap(), Fixed::from_num(16));
        assert!(matches!(
            frame_length(u32::MAX),
            Err(CliError::FrameLength(u32::MAX))
        ));
    }
}
