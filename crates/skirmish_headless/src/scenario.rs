//! Scenario loading and world seeding.
//!
//! Scenarios describe the starting world for a headless session: the
//! player's stockpile and where every unit, building and resource node
//! stands. They are written in RON with plain decimal coordinates.
//!
//! ```ron
//! Scenario(
//!     name: "Forest edge",
//!     description: "One worker next to a tree line",
//!     starting_resources: Some((gold: 200, wood: 0, food: 1, max_food: 4)),
//!     units: [(id: "peasant", class: Worker, faction: Human, x: 3.0, y: 3.0)],
//!     buildings: [(id: "hall", class: TownHall, faction: Human, x: 1.0, y: 1.0)],
//!     resources: [(id: "tree", kind: Wood, x: 6.0, y: 3.0, amount: 100)],
//! )
//! ```

use std::path::Path;

use serde::{Deserialize, Serialize};
use skirmish_core::components::{Building, BuildingClass, ResourceNode, Unit, UnitClass};
use skirmish_core::config::{decimal_serde, SimConfig};
use skirmish_core::economy::{ResourceKind, ResourceState};
use skirmish_core::error::GameError;
use skirmish_core::factions::{Faction, Owner};
use skirmish_core::math::{Fixed, Vec2Fixed};
use skirmish_core::simulation::Simulation;
use thiserror::Error;
use tracing::debug;

/// Error type for scenario operations.
#[derive(Error, Debug)]
pub enum ScenarioError {
    /// File not found.
    #[error("Scenario file not found: {0}")]
    FileNotFound(String),
    /// Failed to read file.
    #[error("Failed to read scenario file: {0}")]
    ReadError(#[from] std::io::Error),
    /// Failed to parse RON.
    #[error("Failed to parse scenario: {0}")]
    ParseError(#[from] ron::error::SpannedError),
    /// A unit or building was placed with the neutral faction, which only
    /// resource nodes may use.
    #[error("Entity {0} cannot belong to the neutral faction")]
    NeutralFaction(String),
    /// A placement could not be spawned.
    #[error("Invalid scenario entity: {0}")]
    InvalidEntity(#[from] GameError),
}

fn default_true() -> bool {
    true
}

/// A unit to spawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitPlacement {
    /// Entity id.
    pub id: String,
    /// Unit class.
    pub class: UnitClass,
    /// Faction.
    pub faction: Faction,
    /// Controller; defaults to the player.
    #[serde(default)]
    pub owner: Owner,
    /// Grid x.
    #[serde(with = "decimal_serde")]
    pub x: Fixed,
    /// Grid y.
    #[serde(with = "decimal_serde")]
    pub y: Fixed,
}

impl UnitPlacement {
    /// Player-owned unit at a grid cell.
    pub fn new(id: &str, class: UnitClass, faction: Faction, x: i32, y: i32) -> Self {
        Self {
            id: id.to_string(),
            class,
            faction,
            owner: Owner::Player,
            x: Fixed::from_num(x),
            y: Fixed::from_num(y),
        }
    }

    fn to_unit(&self) -> Unit {
        Unit::new(
            self.id.as_str(),
            self.faction,
            self.class,
            Vec2Fixed::new(self.x, self.y),
            self.owner,
        )
    }
}

/// A building to spawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingPlacement {
    /// Entity id.
    pub id: String,
    /// Building class.
    pub class: BuildingClass,
    /// Faction.
    pub faction: Faction,
    /// Controller; defaults to the player.
    #[serde(default)]
    pub owner: Owner,
    /// Grid x.
    #[serde(with = "decimal_serde")]
    pub x: Fixed,
    /// Grid y.
    #[serde(with = "decimal_serde")]
    pub y: Fixed,
    /// Whether construction has finished. Defaults to true.
    #[serde(default = "default_true")]
    pub complete: bool,
}

impl BuildingPlacement {
    fn to_building(&self) -> Building {
        Building::new(
            self.id.as_str(),
            self.faction,
            self.class,
            Vec2Fixed::new(self.x, self.y),
            self.owner,
            self.complete,
        )
    }
}

/// A resource node to spawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourcePlacement {
    /// Entity id.
    pub id: String,
    /// Resource kind.
    pub kind: ResourceKind,
    /// Grid x.
    #[serde(with = "decimal_serde")]
    pub x: Fixed,
    /// Grid y.
    #[serde(with = "decimal_serde")]
    pub y: Fixed,
    /// Amount held.
    pub amount: u32,
}

impl ResourcePlacement {
    /// Node at a grid cell.
    pub fn new(id: &str, kind: ResourceKind, x: i32, y: i32, amount: u32) -> Self {
        Self {
            id: id.to_string(),
            kind,
            x: Fixed::from_num(x),
            y: Fixed::from_num(y),
            amount,
        }
    }

    fn to_node(&self) -> ResourceNode {
        ResourceNode::new(
            self.id.as_str(),
            self.kind,
            Vec2Fixed::new(self.x, self.y),
            self.amount,
        )
    }
}

/// A complete scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    /// Scenario name, also used as the replay scenario id.
    pub name: String,
    /// Human-readable description.
    #[serde(default)]
    pub description: String,
    /// Player stockpile; the config default when absent.
    #[serde(default)]
    pub starting_resources: Option<ResourceState>,
    /// Units, in spawn order.
    #[serde(default)]
    pub units: Vec<UnitPlacement>,
    /// Buildings, in spawn order.
    #[serde(default)]
    pub buildings: Vec<BuildingPlacement>,
    /// Resource nodes, in spawn order.
    #[serde(default)]
    pub resources: Vec<ResourcePlacement>,
}

impl Default for Scenario {
    fn default() -> Self {
        Self::demo()
    }
}

impl Scenario {
    /// Load a scenario from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ScenarioError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ScenarioError::FileNotFound(path.display().to_string()));
        }
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron_str(&contents)
    }

    /// Load from a RON string (useful for embedded scenarios).
    pub fn from_ron_str(ron: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = ron::from_str(ron)?;
        Ok(scenario)
    }

    /// The demo skirmish: two gold mines in opposite corners, a row of
    /// trees, one peasant and one grunt. There is no town hall, so
    /// harvested loads have nowhere to go.
    #[must_use]
    pub fn demo() -> Self {
        let mut resources = vec![
            ResourcePlacement::new("gold-1", ResourceKind::Gold, 5, 5, 5000),
            ResourcePlacement::new("gold-2", ResourceKind::Gold, 35, 35, 5000),
        ];
        resources.extend(
            (0..5).map(|i| {
                ResourcePlacement::new(&format!("wood-{i}"), ResourceKind::Wood, 8 + i, 4, 200)
            }),
        );

        Self {
            name: "demo".to_string(),
            description: "Two gold mines, a tree line, a peasant and a grunt".to_string(),
            starting_resources: None,
            units: vec![
                UnitPlacement::new("player-peasant-1", UnitClass::Worker, Faction::Human, 10, 10),
                UnitPlacement::new("player-grunt-1", UnitClass::Melee, Faction::Human, 11, 11),
            ],
            buildings: Vec::new(),
            resources,
        }
    }

    /// Number of entities this scenario places.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.units.len() + self.buildings.len() + self.resources.len()
    }

    /// Build a fresh simulation seeded with this scenario.
    pub fn build(&self, mut config: SimConfig) -> Result<Simulation, ScenarioError> {
        self.validate()?;
        if let Some(resources) = self.starting_resources {
            config.starting_resources = resources;
        }
        let mut sim = Simulation::with_config(config);
        self.spawn_all(&mut sim)?;
        Ok(sim)
    }

    /// Spawn this scenario's entities into an existing simulation.
    ///
    /// Only gold and wood of `starting_resources` are applied here; food
    /// figures come from the simulation's own config.
    pub fn apply(&self, sim: &mut Simulation) -> Result<(), ScenarioError> {
        self.validate()?;
        if let Some(resources) = self.starting_resources {
            sim.overwrite_resources(resources.gold, resources.wood);
        }
        self.spawn_all(sim)
    }

    /// Check placements that the simulation itself would accept but the
    /// entity model forbids.
    ///
    /// # Errors
    ///
    /// Returns [`ScenarioError::NeutralFaction`] for the first unit or
    /// building placed as [`Faction::Neutral`].
    pub fn validate(&self) -> Result<(), ScenarioError> {
        let neutral = self
            .units
            .iter()
            .filter(|unit| unit.faction == Faction::Neutral)
            .map(|unit| &unit.id)
            .chain(
                self.buildings
                    .iter()
                    .filter(|building| building.faction == Faction::Neutral)
                    .map(|building| &building.id),
            )
            .next();
        match neutral {
            Some(id) => Err(ScenarioError::NeutralFaction(id.clone())),
            None => Ok(()),
        }
    }

    fn spawn_all(&self, sim: &mut Simulation) -> Result<(), ScenarioError> {
        for node in &self.resources {
            sim.spawn_resource(node.to_node())?;
        }
        for building in &self.buildings {
            sim.spawn_building(building.to_building())?;
        }
        for unit in &self.units {
            sim.spawn_unit(unit.to_unit())?;
        }
        debug!(
            scenario = %self.name,
            entities = self.entity_count(),
            "Scenario applied"
        );
        Ok(())
    }
}
