//! JSON protocol for headless sessions.
//!
//! The runner communicates via JSON lines (one JSON object per line):
//!
//! **Input:** Commands from the driver
//! **Output:** Responses and state dumps
//!
//! World coordinates are grid units; pointer coordinates are device
//! pixels and go through the camera exactly as a touch screen would.
//!
//! # Example Session
//!
//! ```text
//! <- {"type":"ready","version":"1.0","elapsed_ms":0.0}
//! -> {"cmd":"select","x":10.0,"y":10.0}
//! <- {"type":"selected","entity_id":"player-peasant-1"}
//! -> {"cmd":"order","entity_id":"player-peasant-1","x":5.0,"y":5.0}
//! <- {"type":"ack","cmd":"order"}
//! -> {"cmd":"advance","delta_ms":16.0,"frames":60}
//! <- {"type":"ack","cmd":"advance"}
//! -> {"cmd":"query"}
//! <- {"type":"state","elapsed_ms":960.0,...}
//! ```

use serde::{Deserialize, Serialize};
use skirmish_core::actions::ActionOutcome;
use skirmish_core::components::{EntityKind, EntityRef};
use skirmish_core::economy::ResourceState;
use skirmish_core::math::{Fixed, Vec2Fixed};
use skirmish_core::simulation::Simulation;
use skirmish_input::TapOutcome;

/// Protocol version reported in `ready`.
pub const PROTOCOL_VERSION: &str = "1.0";

// ============================================================================
// Input Commands (driver -> runner)
// ============================================================================

/// Commands that can be sent to the headless runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Command {
    /// Advance the simulation `frames` times by `delta_ms` each.
    Advance {
        delta_ms: f64,
        #[serde(default = "default_frames")]
        frames: u32,
    },

    /// Pointer pressed at a screen position.
    PointerDown { x: f32, y: f32 },

    /// Pointer moved to a screen position.
    PointerMove { x: f32, y: f32 },

    /// Pointer released at a screen position.
    PointerUp { x: f32, y: f32 },

    /// Select whatever stands at a world position.
    Select { x: f64, y: f64 },

    /// Order an entity toward a world position.
    Order { entity_id: String, x: f64, y: f64 },

    /// Dispatch a HUD action against the selection.
    Action { name: String },

    /// Overwrite gold and wood.
    SetResources { gold: u32, wood: u32 },

    /// Query current state without advancing time.
    Query,

    /// Report the state hash.
    Hash,

    /// End the session.
    Quit,
}

fn default_frames() -> u32 {
    1
}

// ============================================================================
// Output Responses (runner -> driver)
// ============================================================================

/// Responses sent from the headless runner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Response {
    /// Runner is ready to accept commands.
    Ready { version: String, elapsed_ms: f64 },

    /// Acknowledgment of a command.
    Ack { cmd: String },

    /// Full world state.
    State(StateView),

    /// A pointer release resolved.
    Tap { outcome: TapView },

    /// Selection after a `select` command.
    Selected { entity_id: Option<String> },

    /// Result of a HUD action.
    Action { name: String, outcome: ActionView },

    /// State hash for determinism checks.
    Hash { elapsed_ms: f64, frames: u64, hash: u64 },

    /// Error processing a command.
    Error {
        message: String,
        cmd: Option<String>,
    },

    /// Goodbye message before shutdown.
    Bye,
}

// ============================================================================
// State Types
// ============================================================================

/// World state as seen by a driver.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateView {
    pub elapsed_ms: f64,
    pub frames: u64,
    pub entities: Vec<EntityView>,
    pub resources: ResourceView,
    pub selected: Option<String>,
    pub hash: u64,
}

impl StateView {
    /// Capture the simulation.
    pub fn capture(sim: &Simulation) -> Self {
        let entities = sim
            .units()
            .map(EntityRef::Unit)
            .chain(sim.buildings().map(EntityRef::Building))
            .chain(sim.resources().map(EntityRef::Resource))
            .map(EntityView::from_entity)
            .collect();

        Self {
            elapsed_ms: to_f64(sim.elapsed_ms()),
            frames: sim.frames(),
            entities,
            resources: ResourceView::from(sim.player_resources()),
            selected: sim.selected_id().map(|id| id.as_str().to_string()),
            hash: sim.state_hash(),
        }
    }

    /// Look up an entity by id.
    pub fn entity(&self, id: &str) -> Option<&EntityView> {
        self.entities.iter().find(|entity| entity.id == id)
    }
}

/// State of a single entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityView {
    pub id: String,
    pub kind: EntityKind,
    pub name: String,
    pub x: f64,
    pub y: f64,
    pub state: String,
    pub hp: u32,
    pub max_hp: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub target: Option<[f64; 2]>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub carry: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<u32>,
}

impl EntityView {
    fn from_entity(entity: EntityRef<'_>) -> Self {
        let core = entity.core();
        let (carry, amount) = match entity {
            EntityRef::Unit(unit) => (Some(unit.carry_amount), None),
            EntityRef::Building(_) => (None, None),
            EntityRef::Resource(node) => (None, Some(node.amount)),
        };
        Self {
            id: core.id.as_str().to_string(),
            kind: core.kind,
            name: core.name.clone(),
            x: to_f64(core.position.x),
            y: to_f64(core.position.y),
            state: core.state.as_str().to_string(),
            hp: core.health.current,
            max_hp: core.health.max,
            target: core.target_position.map(point),
            carry,
            amount,
        }
    }
}

/// Player stockpile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceView {
    pub gold: u32,
    pub wood: u32,
    pub food: u32,
    pub max_food: u32,
}

impl From<&ResourceState> for ResourceView {
    fn from(state: &ResourceState) -> Self {
        Self {
            gold: state.gold,
            wood: state.wood,
            food: state.food,
            max_food: state.max_food,
        }
    }
}

/// What a pointer release did.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum TapView {
    None,
    Panned,
    Ordered { entity_id: String, x: f64, y: f64 },
    Selected { entity_id: Option<String> },
}

impl From<&TapOutcome> for TapView {
    fn from(outcome: &TapOutcome) -> Self {
        match outcome {
            TapOutcome::None => Self::None,
            TapOutcome::Panned => Self::Panned,
            TapOutcome::Ordered { unit, world } => Self::Ordered {
                entity_id: unit.as_str().to_string(),
                x: to_f64(world.x),
                y: to_f64(world.y),
            },
            TapOutcome::Selected(hit) => Self::Selected {
                entity_id: hit.as_ref().map(|id| id.as_str().to_string()),
            },
        }
    }
}

/// HUD action outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionView {
    Applied,
    Ignored,
    Unknown,
}

impl From<ActionOutcome> for ActionView {
    fn from(outcome: ActionOutcome) -> Self {
        match outcome {
            ActionOutcome::Applied => Self::Applied,
            ActionOutcome::Ignored => Self::Ignored,
            ActionOutcome::Unknown => Self::Unknown,
        }
    }
}

// ============================================================================
// Helpers
// ============================================================================

fn to_f64(value: Fixed) -> f64 {
    value.to_num::<f64>()
}

fn point(value: Vec2Fixed) -> [f64; 2] {
    [to_f64(value.x), to_f64(value.y)]
}

/// Convert a driver-supplied coordinate into simulation space.
///
/// Returns `None` for NaN, infinities and values outside the fixed-point
/// range.
pub fn to_fixed(value: f64) -> Option<Fixed> {
    Fixed::checked_from_num(value)
}

impl Response {
    /// Create a ready response.
    pub fn ready(elapsed_ms: Fixed) -> Self {
        Self::Ready {
            version: PROTOCOL_VERSION.to_string(),
            elapsed_ms: to_f64(elapsed_ms),
        }
    }

    /// Create an acknowledgment.
    pub fn ack(cmd: &str) -> Self {
        Self::Ack {
            cmd: cmd.to_string(),
        }
    }

    /// Create an error response.
    pub fn error(message: impl Into<String>, cmd: Option<&str>) -> Self {
        Self::Error {
            message: message.into(),
            cmd: cmd.map(String::from),
        }
    }

    /// Create a hash response.
    pub fn hash(sim: &Simulation) -> Self {
        Self::Hash {
            elapsed_ms: to_f64(sim.elapsed_ms()),
            frames: sim.frames(),
            hash: sim.state_hash(),
        }
    }

    /// Serialize to JSON line (with newline).
    pub fn to_json_line(&self) -> String {
        let mut json = serde_json::to_string(self).unwrap_or_else(|e| {
            format!(
                r#"{{"type":"error","message":"Serialization failed: {}"}}"#,
                e
            )
        });
        json.push('\n');
        json
    }
}

impl Command {
    /// Parse from a JSON line.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Get command name for acknowledgment.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Advance { .. } => "advance",
            Self::PointerDown { .. } => "pointer_down",
            Self::PointerMove { .. } => "pointer_move",
            Self::PointerUp { .. } => "pointer_up",
            Self::Select { .. } => "select",
            Self::Order { .. } => "order",
            Self::Action { .. } => "action",
            Self::SetResources { .. } => "set_resources",
            Self::Query => "query",
            Self::Hash => "hash",
            Self::Quit => "quit",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_core::components::EntityId;

    #[test]
    fn test_parse_advance_command() {
        let cmd = Command::from_json(r#"{"cmd":"advance","delta_ms":16.5,"frames":60}"#).unwrap();
        assert_eq!(
            cmd,
            Command::Advance {
                delta_ms: 16.5,
                frames: 60
            }
        );
    }

    #[test]
    fn test_default_frame_count() {
        let cmd = Command::from_json(r#"{"cmd":"advance","delta_ms":16.0}"#).unwrap();
        assert!(matches!(cmd, Command::Advance { frames: 1, .. }));
    }

    #[test]
    fn test_parse_order_command() {
        let json = r#"{"cmd":"order","entity_id":"player-peasant-1","x":5.0,"y":5.5}"#;
        let cmd = Command::from_json(json).unwrap();
        assert!(matches!(
            cmd,
            Command::Order { entity_id, x, y }
                if entity_id == "player-peasant-1" && x == 5.0 && y == 5.5
        ));
        assert_eq!(Command::Quit.name(), "quit");
    }

    #[test]
    fn test_unknown_command_is_rejected() {
        assert!(Command::from_json(r#"{"cmd":"teleport","x":1}"#).is_err());
        assert!(Command::from_json("not json").is_err());
    }

    #[test]
    fn test_tap_response_shape() {
        let outcome = TapOutcome::Ordered {
            unit: EntityId::new("grunt"),
            world: Vec2Fixed::new(Fixed::from_num(5.5), Fixed::from_num(5)),
        };
        let json = Response::Tap {
            outcome: TapView::from(&outcome),
        }
        .to_json_line();
        assert!(json.ends_with('\n'));
        assert!(json.contains(r#""type":"tap""#));
        assert!(json.contains(r#""result":"ordered""#));
        assert!(json.contains(r#""x":5.5"#));
    }

    #[test]
    fn test_state_view_lists_every_entity() {
        let mut sim = Simulation::new();
        sim.spawn_unit(skirmish_core::components::Unit::new(
            "grunt",
            skirmish_core::factions::Faction::Orc,
            skirmish_core::components::UnitClass::Melee,
            Vec2Fixed::from_ints(3, 4),
            skirmish_core::factions::Owner::Cpu,
        ))
        .unwrap();

        let state = StateView::capture(&sim);
        let grunt = state.entity("grunt").unwrap();
        assert_eq!((grunt.x, grunt.y), (3.0, 4.0));
        assert_eq!(grunt.state, "idle");
        assert_eq!(grunt.carry, Some(0));
        assert!(grunt.target.is_none());
        assert_eq!(state.resources.gold, 1000);

        let json = Response::State(state).to_json_line();
        assert!(json.contains(r#""type":"state""#));
        assert!(json.contains(r#""kind":"Unit""#));
        assert!(!json.contains("amount"));
    }

    #[test]
    fn test_non_finite_coordinates_are_rejected() {
        assert!(to_fixed(f64::NAN).is_none());
        assert!(to_fixed(1e30).is_none());
        assert_eq!(to_fixed(2.5), Some(Fixed::from_num(2.5)));
    }
}
