//! Headless runner implementation.
//!
//! The runner owns a simulation and an input controller and answers one
//! protocol line at a time. Every call that changes the world is resolved
//! to a core command and, when recording, appended to a replay.

use std::io::{self, BufRead, Write};

use skirmish_core::components::EntityId;
use skirmish_core::error::Result as CoreResult;
use skirmish_core::math::Fixed;
use skirmish_core::replay::{Replay, SimCommand};
use skirmish_core::simulation::Simulation;
use skirmish_input::{InputController, ScreenPoint, TapOutcome};
use tracing::{debug, info, warn};

use crate::protocol::{to_fixed, ActionView, Command, Response, StateView, TapView};

/// Most frames a single `advance` command may request.
pub const MAX_ADVANCE_FRAMES: u32 = 100_000;

/// Headless runner configuration.
#[derive(Debug, Clone, Default)]
pub struct HeadlessConfig {
    /// Output state after every advance (vs only on query).
    pub auto_state_output: bool,
}

/// Protocol-driven session over a single simulation.
#[derive(Debug)]
pub struct HeadlessRunner {
    sim: Simulation,
    input: InputController,
    config: HeadlessConfig,
    replay: Option<Replay>,
    finished: bool,
}

impl HeadlessRunner {
    /// Create a runner around an already seeded simulation.
    pub fn new(sim: Simulation, input: InputController) -> Self {
        Self::with_config(sim, input, HeadlessConfig::default())
    }

    /// Create a runner with custom configuration.
    pub fn with_config(sim: Simulation, input: InputController, config: HeadlessConfig) -> Self {
        Self {
            sim,
            input,
            config,
            replay: None,
            finished: false,
        }
    }

    /// Start recording every world-changing command from the current
    /// state on.
    pub fn record(&mut self, scenario_id: &str) -> CoreResult<()> {
        self.replay = Some(Replay::new(scenario_id, &self.sim)?);
        Ok(())
    }

    /// The simulation.
    pub const fn simulation(&self) -> &Simulation {
        &self.sim
    }

    /// The input controller.
    pub const fn input(&self) -> &InputController {
        &self.input
    }

    /// Whether `quit` has been received.
    pub const fn is_finished(&self) -> bool {
        self.finished
    }

    /// Stop recording and return the finished replay, if recording.
    pub fn take_replay(&mut self) -> Option<Replay> {
        let mut replay = self.replay.take()?;
        replay.finalize(&self.sim);
        Some(replay)
    }

    /// Consume the runner, returning the simulation.
    pub fn into_simulation(self) -> Simulation {
        self.sim
    }

    /// Serve a session: write `ready`, answer each line, and finish with
    /// `bye` on `quit` or end of input.
    pub fn run<R: BufRead, W: Write>(&mut self, reader: R, mut writer: W) -> io::Result<()> {
        info!(entities = self.sim.entity_count(), "Headless session started");
        writer.write_all(Response::ready(self.sim.elapsed_ms()).to_json_line().as_bytes())?;
        writer.flush()?;

        for line in reader.lines() {
            let line = line?;
            for response in self.handle_line(&line) {
                writer.write_all(response.to_json_line().as_bytes())?;
            }
            writer.flush()?;
            if self.finished {
                break;
            }
        }

        if !self.finished {
            debug!("Input closed without quit");
            self.finished = true;
            writer.write_all(Response::Bye.to_json_line().as_bytes())?;
            writer.flush()?;
        }
        info!(
            elapsed_ms = %self.sim.elapsed_ms(),
            frames = self.sim.frames(),
            "Headless session finished"
        );
        Ok(())
    }

    /// Parse and handle one protocol line. Blank lines produce nothing.
    pub fn handle_line(&mut self, line: &str) -> Vec<Response> {
        let line = line.trim();
        if line.is_empty() {
            return Vec::new();
        }
        match Command::from_json(line) {
            Ok(cmd) => self.handle(cmd),
            Err(e) => {
                warn!(error = %e, "Unparsable command");
                vec![Response::error(format!("Parse error: {e}"), None)]
            }
        }
    }

    /// Handle one command.
    pub fn handle(&mut self, cmd: Command) -> Vec<Response> {
        let cmd_name = cmd.name();
        if self.finished {
            return vec![Response::error("Session already ended", Some(cmd_name))];
        }

        match cmd {
            Command::Advance { delta_ms, frames } => {
                if frames > MAX_ADVANCE_FRAMES {
                    return vec![Response::error(
                        format!("frames must be at most {MAX_ADVANCE_FRAMES}"),
                        Some(cmd_name),
                    )];
                }
                let Some(delta_ms) = to_fixed(delta_ms) else {
                    return vec![Response::error("delta_ms out of range", Some(cmd_name))];
                };
                for _ in 0..frames {
                    self.apply(SimCommand::Advance { delta_ms });
                }
                let mut responses = vec![Response::ack(cmd_name)];
                if self.config.auto_state_output {
                    responses.push(Response::State(StateView::capture(&self.sim)));
                }
                responses
            }

            Command::PointerDown { x, y } => {
                self.input.pointer_down(ScreenPoint::new(x, y));
                vec![Response::ack(cmd_name)]
            }

            Command::PointerMove { x, y } => {
                self.input.pointer_move(ScreenPoint::new(x, y));
                vec![Response::ack(cmd_name)]
            }

            Command::PointerUp { x, y } => {
                let outcome = self.pointer_up(ScreenPoint::new(x, y));
                vec![Response::Tap {
                    outcome: TapView::from(&outcome),
                }]
            }

            Command::Select { x, y } => {
                let (Some(x), Some(y)) = (to_fixed(x), to_fixed(y)) else {
                    return vec![Response::error("Coordinates out of range", Some(cmd_name))];
                };
                self.apply(SimCommand::Select { x, y });
                vec![Response::Selected {
                    entity_id: self.sim.selected_id().map(|id| id.as_str().to_string()),
                }]
            }

            Command::Order { entity_id, x, y } => {
                let (Some(x), Some(y)) = (to_fixed(x), to_fixed(y)) else {
                    return vec![Response::error("Coordinates out of range", Some(cmd_name))];
                };
                let unit = EntityId::new(entity_id.clone());
                if self.sim.unit(&unit).is_none() {
                    return vec![Response::error(
                        format!("Unit {entity_id} not found"),
                        Some(cmd_name),
                    )];
                }
                self.apply(SimCommand::Order { unit, x, y });
                vec![Response::ack(cmd_name)]
            }

            Command::Action { name } => {
                let outcome = self.sim.on_action(&name);
                self.log(SimCommand::Action { name: name.clone() });
                vec![Response::Action {
                    name,
                    outcome: ActionView::from(outcome),
                }]
            }

            Command::SetResources { gold, wood } => {
                self.apply(SimCommand::OverwriteResources { gold, wood });
                vec![Response::ack(cmd_name)]
            }

            Command::Query => vec![Response::State(StateView::capture(&self.sim))],

            Command::Hash => vec![Response::hash(&self.sim)],

            Command::Quit => {
                self.finished = true;
                vec![Response::Bye]
            }
        }
    }

    /// Release the pointer and record whatever the tap did to the world.
    fn pointer_up(&mut self, at: ScreenPoint) -> TapOutcome {
        // The camera does not move on release, so this is the tap point.
        let world = self.input.screen_to_world(at);
        let outcome = self.input.pointer_up(&mut self.sim, at);
        match (&outcome, world) {
            (TapOutcome::Ordered { unit, world }, _) => self.log(SimCommand::Order {
                unit: unit.clone(),
                x: world.x,
                y: world.y,
            }),
            (TapOutcome::Selected(_), Some(world)) => self.log(SimCommand::Select {
                x: world.x,
                y: world.y,
            }),
            _ => {}
        }
        outcome
    }

    fn apply(&mut self, command: SimCommand) {
        command.apply(&mut self.sim);
        self.log(command);
    }

    fn log(&mut self, command: SimCommand) {
        if let Some(replay) = self.replay.as_mut() {
            replay.record(command);
        }
    }
}

/// Run `frames` frames of `frame_ms` each without a driver.
pub fn run_frames(sim: &mut Simulation, frames: u32, frame_ms: Fixed) {
    for _ in 0..frames {
        sim.advance(frame_ms);
    }
}
