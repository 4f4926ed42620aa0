//! Replay system for recording and playing back sessions.
//!
//! Replays store the initial simulation state and the stream of host
//! calls made against it: frame advances, clicks resolved to selections
//! and orders, HUD actions and resource overwrites. Frame deltas are
//! recorded exactly, so playback reproduces the session bit for bit.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::components::EntityId;
use crate::error::{GameError, Result};
use crate::math::{fixed_serde, Fixed};
use crate::simulation::Simulation;

/// One host call against the simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimCommand {
    /// `advance(delta_ms)`.
    Advance {
        /// Frame time in milliseconds.
        #[serde(with = "fixed_serde")]
        delta_ms: Fixed,
    },
    /// `select_at(x, y)`.
    Select {
        /// World x.
        #[serde(with = "fixed_serde")]
        x: Fixed,
        /// World y.
        #[serde(with = "fixed_serde")]
        y: Fixed,
    },
    /// `issue_order(unit, x, y)`.
    Order {
        /// Ordered unit.
        unit: EntityId,
        /// World x.
        #[serde(with = "fixed_serde")]
        x: Fixed,
        /// World y.
        #[serde(with = "fixed_serde")]
        y: Fixed,
    },
    /// `on_action(name)`.
    Action {
        /// HUD action name.
        name: String,
    },
    /// `overwrite_resources(gold, wood)`.
    OverwriteResources {
        /// New gold.
        gold: u32,
        /// New wood.
        wood: u32,
    },
}

impl SimCommand {
    /// Apply this command to a simulation.
    pub fn apply(&self, sim: &mut Simulation) {
        match self {
            Self::Advance { delta_ms } => {
                sim.advance(*delta_ms);
            }
            Self::Select { x, y } => {
                sim.select_at(*x, *y);
            }
            Self::Order { unit, x, y } => sim.issue_order(unit, *x, *y),
            Self::Action { name } => {
                sim.on_action(name);
            }
            Self::OverwriteResources { gold, wood } => sim.overwrite_resources(*gold, *wood),
        }
    }
}

/// Replay file format version for compatibility.
pub const REPLAY_VERSION: u32 = 1;

/// Complete replay data structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Replay {
    /// Replay format version.
    pub version: u32,
    /// Scenario identifier or name.
    pub scenario_id: String,
    /// Serialized initial simulation state.
    pub initial_state: Vec<u8>,
    /// Host calls in the order they were made.
    pub commands: Vec<SimCommand>,
    /// Simulation clock when recording stopped.
    #[serde(with = "fixed_serde")]
    pub final_elapsed_ms: Fixed,
    /// Final state hash for verification.
    pub final_hash: u64,
}

impl Replay {
    /// Create a new replay from a simulation's initial state.
    ///
    /// # Errors
    /// Returns an error if the simulation cannot be serialized.
    pub fn new(scenario_id: impl Into<String>, initial_state: &Simulation) -> Result<Self> {
        let state_bytes = initial_state.serialize()?;
        Ok(Self {
            version: REPLAY_VERSION,
            scenario_id: scenario_id.into(),
            initial_state: state_bytes,
            commands: Vec::new(),
            final_elapsed_ms: initial_state.elapsed_ms(),
            final_hash: initial_state.state_hash(),
        })
    }

    /// Record a command for replay.
    pub fn record(&mut self, command: SimCommand) {
        self.commands.push(command);
    }

    /// Finalize the replay with the end state.
    pub fn finalize(&mut self, sim: &Simulation) {
        self.final_elapsed_ms = sim.elapsed_ms();
        self.final_hash = sim.state_hash();
    }

    /// Save the replay to a file.
    ///
    /// # Errors
    /// Returns an error if serialization or file writing fails.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let bytes = bincode::serialize(self)
            .map_err(|e| GameError::InvalidState(format!("Failed to serialize replay: {e}")))?;
        std::fs::write(path.as_ref(), bytes)
            .map_err(|e| GameError::InvalidState(format!("Failed to write replay file: {e}")))?;
        Ok(())
    }

    /// Load a replay from a file.
    ///
    /// # Errors
    /// Returns an error if file reading or deserialization fails, or the
    /// file was written by an incompatible version.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let bytes = std::fs::read(path.as_ref())
            .map_err(|e| GameError::InvalidState(format!("Failed to read replay file: {e}")))?;
        let replay: Self = bincode::deserialize(&bytes)
            .map_err(|e| GameError::InvalidState(format!("Failed to deserialize replay: {e}")))?;

        if replay.version != REPLAY_VERSION {
            return Err(GameError::ReplayVersion {
                expected: REPLAY_VERSION,
                found: replay.version,
            });
        }

        Ok(replay)
    }

    /// Get the initial simulation state for playback.
    ///
    /// # Errors
    /// Returns an error if state deserialization fails.
    pub fn restore_initial_state(&self) -> Result<Simulation> {
        Simulation::deserialize(&self.initial_state)
    }

    /// Apply every recorded command to `sim`, in order.
    pub fn replay_into(&self, sim: &mut Simulation) {
        for command in &self.commands {
            command.apply(sim);
        }
    }

    /// Restore the initial state and play the whole replay.
    ///
    /// # Errors
    /// Returns an error if the initial state cannot be restored.
    pub fn play(&self) -> Result<Simulation> {
        let mut sim = self.restore_initial_state()?;
        self.replay_into(&mut sim);
        Ok(sim)
    }

    /// Check that playback reproduces the recorded final hash.
    ///
    /// # Errors
    /// Returns an error if the initial state cannot be restored.
    pub fn verify(&self) -> Result<bool> {
        Ok(self.play()?.state_hash() == self.final_hash)
    }

    /// Get the total number of commands in the replay.
    #[must_use]
    pub fn command_count(&self) -> usize {
        self.commands.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{Unit, UnitClass, UnitState};
    use crate::factions::{Faction, Owner};
    use crate::math::Vec2Fixed;

    fn create_test_simulation() -> Simulation {
        let mut sim = Simulation::new();
        sim.spawn_unit(Unit::new(
            "grunt",
            Faction::Orc,
            UnitClass::Melee,
            Vec2Fixed::from_ints(1, 1),
            Owner::Player,
        ))
        .unwrap();
        sim
    }

    fn record_session(sim: &mut Simulation, replay: &mut Replay) {
        let commands = [
            SimCommand::Select {
                x: Fixed::from_num(1),
                y: Fixed::from_num(1),
            },
            SimCommand::Order {
                unit: EntityId::new("grunt"),
                x: Fixed::from_num(6),
                y: Fixed::from_num(2),
            },
            SimCommand::Advance {
                delta_ms: Fixed::from_num(16),
            },
            SimCommand::Advance {
                delta_ms: Fixed::from_num(1200),
            },
            SimCommand::Action {
                name: "stop".to_string(),
            },
            SimCommand::OverwriteResources { gold: 3, wood: 4 },
        ];
        for command in commands {
            command.apply(sim);
            replay.record(command);
        }
        replay.finalize(sim);
    }

    #[test]
    fn test_replay_create() {
        let sim = create_test_simulation();
        let replay = Replay::new("test_scenario", &sim).unwrap();

        assert_eq!(replay.version, REPLAY_VERSION);
        assert_eq!(replay.scenario_id, "test_scenario");
        assert!(replay.commands.is_empty());
        assert_eq!(replay.final_hash, sim.state_hash());
    }

    #[test]
    fn test_replay_reproduces_session() {
        let mut sim = create_test_simulation();
        let mut replay = Replay::new("test_scenario", &sim).unwrap();
        record_session(&mut sim, &mut replay);

        let played = replay.play().unwrap();
        assert_eq!(played.state_hash(), sim.state_hash());
        assert!(replay.verify().unwrap());

        let grunt = played.unit(&EntityId::new("grunt")).unwrap();
        assert_eq!(grunt.core.state, UnitState::Idle);
        assert_eq!(played.player_resources().gold, 3);
    }

    #[test]
    fn test_replay_save_load() {
        let mut sim = create_test_simulation();
        let mut replay = Replay::new("test_scenario", &sim).unwrap();
        record_session(&mut sim, &mut replay);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("session.replay");
        replay.save(&path).unwrap();

        let loaded = Replay::load(&path).unwrap();
        assert_eq!(loaded.scenario_id, "test_scenario");
        assert_eq!(loaded.command_count(), replay.command_count());
        assert_eq!(loaded.final_hash, replay.final_hash);
        assert!(loaded.verify().unwrap());
    }

    #[test]
    fn test_replay_version_mismatch() {
        let sim = create_test_simulation();
        let mut replay = Replay::new("test_scenario", &sim).unwrap();
        replay.version = REPLAY_VERSION + 1;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("future.replay");
        replay.save(&path).unwrap();

        let err = Replay::load(&path).unwrap_err();
        assert_eq!(
            err,
            GameError::ReplayVersion {
                expected: REPLAY_VERSION,
                found: REPLAY_VERSION + 1,
            }
        );
    }
}
