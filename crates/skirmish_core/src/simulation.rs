//! Core simulation loop.
//!
//! The host drives the simulation once per rendered frame with the
//! measured frame time. Each call integrates unit movement, runs the
//! harvest loop and advances the simulation clock. Selection, orders and
//! HUD actions are applied between frames.
//!
//! # Determinism
//!
//! All operations in this module are fully deterministic:
//! - No floating-point math (uses fixed-point via [`Fixed`])
//! - Collections iterate in insertion order
//! - Same inputs always produce same outputs
//!
//! # Example
//!
//! ```
//! use skirmish_core::components::{Unit, UnitClass, UnitState};
//! use skirmish_core::factions::{Faction, Owner};
//! use skirmish_core::math::{Fixed, Vec2Fixed};
//! use skirmish_core::simulation::Simulation;
//!
//! let mut sim = Simulation::new();
//!
//! // Spawn a unit
//! let grunt = sim
//!     .spawn_unit(Unit::new(
//!         "grunt",
//!         Faction::Human,
//!         UnitClass::Melee,
//!         Vec2Fixed::ZERO,
//!         Owner::Player,
//!     ))
//!     .unwrap();
//!
//! // Order it one tile east
//! sim.issue_order(&grunt, Fixed::from_num(1), Fixed::ZERO);
//!
//! // Advance one second
//! sim.advance(Fixed::from_num(1000));
//! assert_eq!(sim.unit(&grunt).unwrap().core.state, UnitState::Idle);
//! ```

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use tracing::{debug, warn};

use crate::actions::{ActionOutcome, HudAction};
use crate::components::{Building, EntityId, EntityRef, GameEntity, ResourceNode, Unit, UnitState};
use crate::config::SimConfig;
use crate::economy::{harvest_step, EconomyEvent, HarvestContext, ResourceState};
use crate::error::{GameError, Result};
use crate::math::{fixed_serde, Fixed, Vec2Fixed};
use crate::orders::resolve_order;
use crate::selection;
use crate::systems::movement_system;

/// Insertion-ordered storage for one entity kind.
///
/// Iteration follows insertion order, which is also the priority order for
/// hit-testing. Lookup by id is O(1). Entities are never removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityStorage<T> {
    items: Vec<T>,
    index: HashMap<EntityId, usize>,
}

impl<T> Default for EntityStorage<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            index: HashMap::new(),
        }
    }
}

impl<T: GameEntity> EntityStorage<T> {
    /// Create empty entity storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build storage from entities in order.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::DuplicateEntity`] if two entities share an id.
    pub fn from_items(items: Vec<T>) -> Result<Self> {
        let mut storage = Self::new();
        for item in items {
            storage.insert(item)?;
        }
        Ok(storage)
    }

    /// Append an entity and return its id.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::DuplicateEntity`] if the id is already present.
    pub fn insert(&mut self, entity: T) -> Result<EntityId> {
        let id = entity.id().clone();
        if self.index.contains_key(&id) {
            return Err(GameError::DuplicateEntity(id));
        }
        self.index.insert(id.clone(), self.items.len());
        self.items.push(entity);
        Ok(id)
    }

    /// Get an entity by ID.
    #[must_use]
    pub fn get(&self, id: &EntityId) -> Option<&T> {
        self.index.get(id).map(|&slot| &self.items[slot])
    }

    /// Get a mutable reference to an entity by ID.
    pub fn get_mut(&mut self, id: &EntityId) -> Option<&mut T> {
        self.index.get(id).map(|&slot| &mut self.items[slot])
    }

    /// Check if an entity exists.
    #[must_use]
    pub fn contains(&self, id: &EntityId) -> bool {
        self.index.contains_key(id)
    }

    /// Get the number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if storage is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Iterate in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Iterate mutably in insertion order.
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    /// Entities as a slice, in insertion order.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.items
    }
}

impl<'a, T: GameEntity> IntoIterator for &'a EntityStorage<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// Serialized as a plain sequence; the index is rebuilt on load.
impl<T: Serialize> Serialize for EntityStorage<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.items.serialize(serializer)
    }
}

impl<'de, T> Deserialize<'de> for EntityStorage<T>
where
    T: GameEntity + Deserialize<'de>,
{
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let items = Vec::<T>::deserialize(deserializer)?;
        Self::from_items(items).map_err(serde::de::Error::custom)
    }
}

/// Events generated during one simulation step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepEvents {
    /// Units that reached their move target this step.
    pub arrivals: Vec<EntityId>,
    /// Gathering and deposit events from the harvest loop.
    pub economy: Vec<EconomyEvent>,
}

impl StepEvents {
    /// True if nothing happened.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.arrivals.is_empty() && self.economy.is_empty()
    }
}

/// Owned copy of the world for renderers and persistence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Simulation clock in milliseconds.
    #[serde(with = "fixed_serde")]
    pub elapsed_ms: Fixed,
    /// Units in collection order.
    pub units: Vec<Unit>,
    /// Buildings in collection order.
    pub buildings: Vec<Building>,
    /// Resource nodes in collection order.
    pub resources: Vec<ResourceNode>,
    /// Player stockpile.
    pub player_resources: ResourceState,
    /// Currently selected entity.
    pub selected: Option<EntityId>,
}

/// The skirmish simulation.
///
/// Owns every entity, the player's stockpile and the current selection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Simulation {
    config: SimConfig,
    /// Sum of all positive deltas, in milliseconds.
    #[serde(with = "fixed_serde")]
    clock_ms: Fixed,
    /// Number of non-empty steps taken.
    frames: u64,
    units: EntityStorage<Unit>,
    buildings: EntityStorage<Building>,
    resources: EntityStorage<ResourceNode>,
    player_resources: ResourceState,
    selected: Option<EntityId>,
}

impl Simulation {
    /// Create an empty simulation with default tuning.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(SimConfig::default())
    }

    /// Create an empty simulation with the given tuning.
    #[must_use]
    pub fn with_config(config: SimConfig) -> Self {
        Self {
            player_resources: config.starting_resources,
            config,
            clock_ms: Fixed::ZERO,
            frames: 0,
            units: EntityStorage::new(),
            buildings: EntityStorage::new(),
            resources: EntityStorage::new(),
            selected: None,
        }
    }

    /// Active tuning.
    #[must_use]
    pub const fn config(&self) -> &SimConfig {
        &self.config
    }

    // ========================================================================
    // Spawning
    // ========================================================================

    fn ensure_unique(&self, id: &EntityId) -> Result<()> {
        if self.contains(id) {
            return Err(GameError::DuplicateEntity(id.clone()));
        }
        Ok(())
    }

    /// Add a unit to the end of the unit collection.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::DuplicateEntity`] if any entity already uses the id.
    pub fn spawn_unit(&mut self, unit: Unit) -> Result<EntityId> {
        self.ensure_unique(unit.id())?;
        debug!(id = %unit.core.id, class = ?unit.class, "Spawned unit");
        self.units.insert(unit)
    }

    /// Add a building to the end of the building collection.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::DuplicateEntity`] if any entity already uses the id.
    pub fn spawn_building(&mut self, building: Building) -> Result<EntityId> {
        self.ensure_unique(building.id())?;
        debug!(id = %building.core.id, class = ?building.class, "Spawned building");
        self.buildings.insert(building)
    }

    /// Add a resource node to the end of the resource collection.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::DuplicateEntity`] if any entity already uses the id.
    pub fn spawn_resource(&mut self, node: ResourceNode) -> Result<EntityId> {
        self.ensure_unique(node.id())?;
        debug!(id = %node.core.id, kind = ?node.kind, amount = node.amount, "Spawned resource node");
        self.resources.insert(node)
    }

    // ========================================================================
    // Stepping
    // ========================================================================

    /// Advance the world by `delta_ms` milliseconds of frame time.
    ///
    /// Moving units walk toward their target and go idle on arrival.
    /// Harvesting workers run the harvest loop when it is enabled.
    /// Buildings and resource nodes do not change on their own.
    ///
    /// A zero or negative delta changes nothing, including the clock. Any
    /// positive delta is accepted; the clock saturates at [`Fixed::MAX`].
    pub fn advance(&mut self, delta_ms: Fixed) -> StepEvents {
        if delta_ms <= Fixed::ZERO {
            return StepEvents::default();
        }

        self.clock_ms = self.clock_ms.saturating_add(delta_ms);
        self.frames = self.frames.saturating_add(1);
        let now = self.clock_ms;
        let epsilon = self.config.arrival_epsilon;

        let arrivals = movement_system(self.units.iter_mut(), delta_ms, epsilon, now);

        let mut economy = Vec::new();
        if self.config.harvest.enabled {
            let mut ctx = HarvestContext {
                nodes: &mut self.resources,
                buildings: &self.buildings,
                ledger: &mut self.player_resources,
                config: &self.config.harvest,
                arrival_epsilon: epsilon,
            };
            for unit in self
                .units
                .iter_mut()
                .filter(|unit| unit.core.state == UnitState::Harvesting)
            {
                harvest_step(unit, &mut ctx, delta_ms, now, &mut economy);
            }
        }

        StepEvents { arrivals, economy }
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Select the entity under a world point.
    ///
    /// Units are tested before buildings; resource nodes cannot be
    /// selected. A miss clears the selection.
    pub fn select_at(&mut self, x: Fixed, y: Fixed) -> Option<EntityRef<'_>> {
        let point = Vec2Fixed::new(x, y);
        let hit = selection::pick(
            &self.units,
            &self.buildings,
            point,
            self.config.selection_half_width,
        )
        .map(|entity| entity.id().clone());

        match &hit {
            Some(id) => debug!(%id, "Selected entity"),
            None if self.selected.is_some() => debug!("Selection cleared"),
            None => {}
        }
        self.selected = hit;

        let id = self.selected.as_ref()?;
        self.entity(id)
    }

    /// Id of the current selection.
    #[must_use]
    pub fn selected_id(&self) -> Option<&EntityId> {
        self.selected.as_ref()
    }

    /// The currently selected entity.
    #[must_use]
    pub fn selected_entity(&self) -> Option<EntityRef<'_>> {
        self.selected.as_ref().and_then(|id| self.entity(id))
    }

    /// Drop the current selection.
    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    // ========================================================================
    // Orders and actions
    // ========================================================================

    /// Order a unit to the world point `(x, y)`.
    ///
    /// A worker ordered near a resource node starts harvesting it; any other
    /// order is a move to the exact point. Ids that are not units are
    /// ignored.
    pub fn issue_order(&mut self, id: &EntityId, x: Fixed, y: Fixed) {
        let now = self.clock_ms;
        let Some(unit) = self.units.get_mut(id) else {
            debug!(%id, "Order ignored: not a unit");
            return;
        };

        let order = resolve_order(
            unit.class,
            Vec2Fixed::new(x, y),
            &self.resources,
            self.config.order_half_width,
        );
        debug!(%id, ?order, "Order issued");
        order.apply(unit, now);
    }

    /// Dispatch a HUD action against the current selection.
    pub fn on_action(&mut self, name: &str) -> ActionOutcome {
        let Some(action) = HudAction::parse(name) else {
            warn!(action = name, "Unknown HUD action");
            return ActionOutcome::Unknown;
        };

        let Some(selected) = self.selected.clone() else {
            debug!(action = name, "HUD action with nothing selected");
            return ActionOutcome::Ignored;
        };

        let outcome = match action {
            HudAction::Stop => match self.force_idle(&selected) {
                Ok(()) => ActionOutcome::Applied,
                Err(_) => ActionOutcome::Ignored,
            },
            HudAction::TrainWorker | HudAction::TrainSoldier => {
                match (self.buildings.get_mut(&selected), action.trains()) {
                    (Some(building), Some(class)) => {
                        building.training_queue.push(class);
                        ActionOutcome::Applied
                    }
                    _ => ActionOutcome::Ignored,
                }
            }
            HudAction::Attack | HudAction::Move | HudAction::BuildMenu => ActionOutcome::Ignored,
        };

        debug!(action = name, %selected, ?outcome, "HUD action");
        outcome
    }

    /// Halt a unit: idle, no target position, no target entity.
    ///
    /// # Errors
    ///
    /// Returns [`GameError::EntityNotFound`] if `id` is not a unit.
    pub fn force_idle(&mut self, id: &EntityId) -> Result<()> {
        let now = self.clock_ms;
        let unit = self
            .units
            .get_mut(id)
            .ok_or_else(|| GameError::EntityNotFound(id.clone()))?;
        unit.halt(now);
        Ok(())
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Units in collection order.
    pub fn units(&self) -> impl Iterator<Item = &Unit> {
        self.units.iter()
    }

    /// Buildings in collection order.
    pub fn buildings(&self) -> impl Iterator<Item = &Building> {
        self.buildings.iter()
    }

    /// Resource nodes in collection order.
    pub fn resources(&self) -> impl Iterator<Item = &ResourceNode> {
        self.resources.iter()
    }

    /// Look up a unit.
    #[must_use]
    pub fn unit(&self, id: &EntityId) -> Option<&Unit> {
        self.units.get(id)
    }

    /// Look up a building.
    #[must_use]
    pub fn building(&self, id: &EntityId) -> Option<&Building> {
        self.buildings.get(id)
    }

    /// Look up a resource node.
    #[must_use]
    pub fn resource(&self, id: &EntityId) -> Option<&ResourceNode> {
        self.resources.get(id)
    }

    /// Look up any entity.
    #[must_use]
    pub fn entity(&self, id: &EntityId) -> Option<EntityRef<'_>> {
        self.units
            .get(id)
            .map(EntityRef::Unit)
            .or_else(|| self.buildings.get(id).map(EntityRef::Building))
            .or_else(|| self.resources.get(id).map(EntityRef::Resource))
    }

    /// Check if any entity uses `id`.
    #[must_use]
    pub fn contains(&self, id: &EntityId) -> bool {
        self.units.contains(id) || self.buildings.contains(id) || self.resources.contains(id)
    }

    /// Total number of entities of every kind.
    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.units.len() + self.buildings.len() + self.resources.len()
    }

    /// Player stockpile.
    #[must_use]
    pub const fn player_resources(&self) -> &ResourceState {
        &self.player_resources
    }

    /// Replace gold and wood, e.g. when resuming a saved session.
    pub fn overwrite_resources(&mut self, gold: u32, wood: u32) {
        debug!(gold, wood, "Resources overwritten");
        self.player_resources.overwrite(gold, wood);
    }

    /// Simulation clock in milliseconds.
    #[must_use]
    pub const fn elapsed_ms(&self) -> Fixed {
        self.clock_ms
    }

    /// Number of steps that advanced the clock.
    #[must_use]
    pub const fn frames(&self) -> u64 {
        self.frames
    }

    /// Owned copy of the current world.
    #[must_use]
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            elapsed_ms: self.clock_ms,
            units: self.units.as_slice().to_vec(),
            buildings: self.buildings.as_slice().to_vec(),
            resources: self.resources.as_slice().to_vec(),
            player_resources: self.player_resources,
            selected: self.selected.clone(),
        }
    }

    /// Compute a hash of the simulation state for determinism checks.
    ///
    /// Covers the clock, every entity in collection order, the stockpile
    /// and the selection. Tuning is not included.
    #[must_use]
    pub fn state_hash(&self) -> u64 {
        let mut hasher = DefaultHasher::new();

        self.clock_ms.to_bits().hash(&mut hasher);
        self.frames.hash(&mut hasher);

        self.units.len().hash(&mut hasher);
        for unit in &self.units {
            unit.hash(&mut hasher);
        }
        self.buildings.len().hash(&mut hasher);
        for building in &self.buildings {
            building.hash(&mut hasher);
        }
        self.resources.len().hash(&mut hasher);
        for node in &self.resources {
            node.hash(&mut hasher);
        }

        self.player_resources.hash(&mut hasher);
        self.selected.hash(&mut hasher);

        hasher.finish()
    }

    /// Serialize simulation state to bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn serialize(&self) -> Result<Vec<u8>> {
        bincode::serialize(self)
            .map_err(|e| GameError::InvalidState(format!("Failed to serialize simulation: {e}")))
    }

    /// Deserialize simulation state from bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if deserialization fails.
    pub fn deserialize(data: &[u8]) -> Result<Self> {
        bincode::deserialize(data).map_err(|e| {
            GameError::InvalidState(format!("Failed to deserialize simulation: {e}"))
        })
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}
