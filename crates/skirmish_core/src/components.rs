//! Entity model.
//!
//! Every simulated object shares an [`EntityCore`] and adds kind-specific
//! fields on top: [`Unit`], [`Building`] and [`ResourceNode`]. Read paths
//! that need to treat all three uniformly go through [`EntityRef`].

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::data::{BuildingStats, UnitStats};
use crate::economy::{HarvestPhase, ResourceKind};
use crate::factions::{Faction, Owner};
use crate::math::{fixed_serde, Fixed, Vec2Fixed};

/// Size of one grid cell in device pixels. Shared with the renderer and
/// the input layer.
pub const TILE_SIZE: u32 = 40;

/// Map edge length in grid cells.
pub const MAP_SIZE: u32 = 40;

/// Unique, immutable identifier for entities.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(String);

impl EntityId {
    /// Create an id from any string-like value.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Borrow the id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for EntityId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Which concrete shape an entity has.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    /// A mobile unit.
    Unit,
    /// A stationary building.
    Building,
    /// A harvestable resource node.
    Resource,
}

/// Behavioral state of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum UnitState {
    /// Doing nothing.
    #[default]
    Idle,
    /// Walking toward a target position.
    Moving,
    /// Reserved for combat; nothing transitions into it yet.
    Attacking,
    /// Working a resource node.
    Harvesting,
}

impl UnitState {
    /// Lowercase label used by the HUD.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Moving => "moving",
            Self::Attacking => "attacking",
            Self::Harvesting => "harvesting",
        }
    }
}

/// Unit class tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnitClass {
    /// Gatherer and builder. The only class that can harvest.
    Worker,
    /// Close-combat soldier.
    Melee,
    /// Ranged soldier.
    Ranged,
}

impl UnitClass {
    /// Display name, also used as the default entity name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Worker => "Worker",
            Self::Melee => "Melee",
            Self::Ranged => "Ranged",
        }
    }
}

/// Building class tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BuildingClass {
    /// Main base; also the drop-off point for harvested resources.
    TownHall,
    /// Supply building.
    Farm,
    /// Soldier production.
    Barracks,
}

impl BuildingClass {
    /// Display name, also used as the default entity name.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::TownHall => "Town Hall",
            Self::Farm => "Farm",
            Self::Barracks => "Barracks",
        }
    }
}

/// Health component for damageable entities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Health {
    /// Current health points.
    pub current: u32,
    /// Maximum health points.
    pub max: u32,
}

impl Health {
    /// Create new health component at full health.
    #[must_use]
    pub const fn new(max: u32) -> Self {
        Self { current: max, max }
    }

    /// Check if entity is at zero health.
    ///
    /// Nothing removes zero-health entities; callers decide what it means.
    #[must_use]
    pub const fn is_dead(&self) -> bool {
        self.current == 0
    }

    /// Overwrite current health, clamped to `max`.
    pub fn set_current(&mut self, value: u32) {
        self.current = value.min(self.max);
    }
}

/// Fields shared by every entity kind.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityCore {
    /// Unique identifier.
    pub id: EntityId,
    /// Concrete kind.
    pub kind: EntityKind,
    /// Faction allegiance.
    pub faction: Faction,
    /// Control authority.
    pub owner: Owner,
    /// Display name shown by the HUD.
    pub name: String,
    /// Current grid position.
    pub position: Vec2Fixed,
    /// Destination while an order is in flight.
    pub target_position: Option<Vec2Fixed>,
    /// Hit points.
    pub health: Health,
    /// Behavioral state.
    pub state: UnitState,
    /// Simulation clock (ms) of the most recent state change.
    #[serde(with = "fixed_serde")]
    pub last_action_ms: Fixed,
}

impl EntityCore {
    fn new(
        id: EntityId,
        kind: EntityKind,
        faction: Faction,
        owner: Owner,
        name: impl Into<String>,
        position: Vec2Fixed,
        max_hp: u32,
    ) -> Self {
        Self {
            id,
            kind,
            faction,
            owner,
            name: name.into(),
            position,
            target_position: None,
            health: Health::new(max_hp),
            state: UnitState::Idle,
            last_action_ms: Fixed::ZERO,
        }
    }

    /// Change behavioral state and stamp the action time.
    pub fn set_state(&mut self, state: UnitState, now_ms: Fixed) {
        self.state = state;
        self.last_action_ms = now_ms;
    }
}

/// Common accessors over every entity kind.
pub trait GameEntity {
    /// Shared fields.
    fn core(&self) -> &EntityCore;

    /// Entity id.
    fn id(&self) -> &EntityId {
        &self.core().id
    }

    /// Current position.
    fn position(&self) -> Vec2Fixed {
        self.core().position
    }
}

/// A mobile unit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Unit {
    /// Shared fields.
    pub core: EntityCore,
    /// Unit class.
    pub class: UnitClass,
    /// Movement speed in grid units per second.
    #[serde(with = "fixed_serde")]
    pub speed: Fixed,
    /// Attack range in grid units.
    #[serde(with = "fixed_serde")]
    pub attack_range: Fixed,
    /// Damage per attack.
    pub attack_damage: u32,
    /// Resources currently carried.
    pub carry_amount: u32,
    /// Kind of the carried resources, if any.
    pub carry_kind: Option<ResourceKind>,
    /// Entity being moved toward or harvested.
    pub target_id: Option<EntityId>,
    /// Step of the harvest loop while `Harvesting`.
    pub harvest: Option<HarvestPhase>,
    /// Fractional gather amount not yet extracted.
    #[serde(with = "fixed_serde")]
    pub gather_progress: Fixed,
}

impl Unit {
    /// Create a unit with the class's base stats, idle at `position`.
    #[must_use]
    pub fn new(
        id: impl Into<EntityId>,
        faction: Faction,
        class: UnitClass,
        position: Vec2Fixed,
        owner: Owner,
    ) -> Self {
        let stats = UnitStats::for_class(class);
        Self {
            core: EntityCore::new(
                id.into(),
                EntityKind::Unit,
                faction,
                owner,
                class.display_name(),
                position,
                stats.hp,
            ),
            class,
            speed: stats.speed,
            attack_range: stats.range,
            attack_damage: stats.damage,
            carry_amount: 0,
            carry_kind: None,
            target_id: None,
            harvest: None,
            gather_progress: Fixed::ZERO,
        }
    }

    /// Drop any in-flight order and return to idle.
    pub fn halt(&mut self, now_ms: Fixed) {
        self.core.target_position = None;
        self.target_id = None;
        self.harvest = None;
        self.gather_progress = Fixed::ZERO;
        self.core.set_state(UnitState::Idle, now_ms);
    }
}

impl GameEntity for Unit {
    fn core(&self) -> &EntityCore {
        &self.core
    }
}

/// A stationary building.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Building {
    /// Shared fields.
    pub core: EntityCore,
    /// Building class.
    pub class: BuildingClass,
    /// Whether construction has finished.
    pub is_complete: bool,
    /// Construction progress, 0 to 1.
    #[serde(with = "fixed_serde")]
    pub progress: Fixed,
    /// Unit classes waiting to be trained, front first.
    pub training_queue: Vec<UnitClass>,
}

impl Building {
    /// Create a building with the class's base stats.
    ///
    /// Complete buildings start at progress 1, incomplete ones at 0.
    #[must_use]
    pub fn new(
        id: impl Into<EntityId>,
        faction: Faction,
        class: BuildingClass,
        position: Vec2Fixed,
        owner: Owner,
        is_complete: bool,
    ) -> Self {
        let stats = BuildingStats::for_class(class);
        Self {
            core: EntityCore::new(
                id.into(),
                EntityKind::Building,
                faction,
                owner,
                class.display_name(),
                position,
                stats.hp,
            ),
            class,
            is_complete,
            progress: if is_complete {
                Fixed::from_num(1)
            } else {
                Fixed::ZERO
            },
            training_queue: Vec::new(),
        }
    }

    /// Whether harvested resources can be dropped off here.
    #[must_use]
    pub fn is_depot(&self) -> bool {
        self.is_complete && self.class == BuildingClass::TownHall
    }
}

impl GameEntity for Building {
    fn core(&self) -> &EntityCore {
        &self.core
    }
}

/// A harvestable resource node.
///
/// Health mirrors `amount` so the generic bar rendering shows depletion.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceNode {
    /// Shared fields.
    pub core: EntityCore,
    /// What the node yields.
    pub kind: ResourceKind,
    /// Amount remaining.
    pub amount: u32,
}

impl ResourceNode {
    /// Create a neutral resource node.
    #[must_use]
    pub fn new(id: impl Into<EntityId>, kind: ResourceKind, position: Vec2Fixed, amount: u32) -> Self {
        Self {
            core: EntityCore::new(
                id.into(),
                EntityKind::Resource,
                Faction::Neutral,
                Owner::Cpu,
                kind.node_name(),
                position,
                amount,
            ),
            kind,
            amount,
        }
    }

    /// Check if this node is depleted.
    #[must_use]
    pub const fn is_depleted(&self) -> bool {
        self.amount == 0
    }

    /// Extract resources from this node.
    ///
    /// Returns the actual amount extracted (may be less than requested if
    /// the node is nearly depleted).
    pub fn extract(&mut self, requested: u32) -> u32 {
        let extracted = requested.min(self.amount);
        self.amount -= extracted;
        self.core.health.set_current(self.amount);
        extracted
    }
}

impl GameEntity for ResourceNode {
    fn core(&self) -> &EntityCore {
        &self.core
    }
}

/// Borrowed view over any entity kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityRef<'a> {
    /// A unit.
    Unit(&'a Unit),
    /// A building.
    Building(&'a Building),
    /// A resource node.
    Resource(&'a ResourceNode),
}

impl<'a> EntityRef<'a> {
    /// Shared fields.
    #[must_use]
    pub fn core(&self) -> &'a EntityCore {
        match self {
            Self::Unit(unit) => &unit.core,
            Self::Building(building) => &building.core,
            Self::Resource(node) => &node.core,
        }
    }

    /// Entity id.
    #[must_use]
    pub fn id(&self) -> &'a EntityId {
        &self.core().id
    }

    /// Concrete kind.
    #[must_use]
    pub fn kind(&self) -> EntityKind {
        self.core().kind
    }

    /// Display name.
    #[must_use]
    pub fn name(&self) -> &'a str {
        &self.core().name
    }

    /// Current position.
    #[must_use]
    pub fn position(&self) -> Vec2Fixed {
        self.core().position
    }

    /// Hit points.
    #[must_use]
    pub fn health(&self) -> Health {
        self.core().health
    }

    /// Behavioral state.
    #[must_use]
    pub fn state(&self) -> UnitState {
        self.core().state
    }

    /// Control authority.
    #[must_use]
    pub fn owner(&self) -> Owner {
        self.core().owner
    }

    /// Faction allegiance.
    #[must_use]
    pub fn faction(&self) -> Faction {
        self.core().faction
    }

    /// The unit, if this is one.
    #[must_use]
    pub fn as_unit(&self) -> Option<&'a Unit> {
        match self {
            Self::Unit(unit) => Some(unit),
            _ => None,
        }
    }

    /// The building, if this is one.
    #[must_use]
    pub fn as_building(&self) -> Option<&'a Building> {
        match self {
            Self::Building(building) => Some(building),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_uses_class_stats() {
        let unit = Unit::new(
            "grunt",
            Faction::Orc,
            UnitClass::Melee,
            Vec2Fixed::from_ints(3, 4),
            Owner::Cpu,
        );
        assert_eq!(unit.core.health, Health::new(100));
        assert_eq!(unit.core.name, "Melee");
        assert_eq!(unit.core.kind, EntityKind::Unit);
        assert_eq!(unit.core.state, UnitState::Idle);
        assert_eq!(unit.carry_amount, 0);
        assert!(unit.core.target_position.is_none());
    }

    #[test]
    fn test_resource_health_mirrors_amount() {
        let mut node = ResourceNode::new("gold", ResourceKind::Gold, Vec2Fixed::ZERO, 10);
        assert_eq!(node.core.faction, Faction::Neutral);
        assert_eq!(node.core.name, "Gold Mine");

        assert_eq!(node.extract(4), 4);
        assert_eq!(node.amount, 6);
        assert_eq!(node.core.health.current, 6);
        assert_eq!(node.core.health.max, 10);

        assert_eq!(node.extract(50), 6);
        assert!(node.is_depleted());
        assert!(node.core.health.is_dead());
    }

    #[test]
    fn test_only_complete_town_halls_are_depots() {
        let hall = Building::new(
            "hall",
            Faction::Human,
            BuildingClass::TownHall,
            Vec2Fixed::ZERO,
            Owner::Player,
            true,
        );
        let site = Building::new(
            "site",
            Faction::Human,
            BuildingClass::TownHall,
            Vec2Fixed::ZERO,
            Owner::Player,
            false,
        );
        let farm = Building::new(
            "farm",
            Faction::Human,
            BuildingClass::Farm,
            Vec2Fixed::ZERO,
            Owner::Player,
            true,
        );
        assert!(hall.is_depot());
        assert!(!site.is_depot());
        assert_eq!(site.progress, Fixed::ZERO);
        assert!(!farm.is_depot());
    }

    #[test]
    fn test_health_clamps() {
        let mut health = Health::new(50);
        health.set_current(80);
        assert_eq!(health.current, 50);
        health.set_current(0);
        assert!(health.is_dead());
    }

    #[test]
    fn test_entity_ref_accessors() {
        let unit = Unit::new(
            "peasant",
            Faction::Human,
            UnitClass::Worker,
            Vec2Fixed::from_ints(1, 2),
            Owner::Player,
        );
        let view = EntityRef::Unit(&unit);
        assert_eq!(view.id().as_str(), "peasant");
        assert_eq!(view.position(), Vec2Fixed::from_ints(1, 2));
        assert!(view.as_unit().is_some());
        assert!(view.as_building().is_none());
    }
}
