//! Economy and resource management.
//!
//! Workers ordered onto a resource node walk to it, gather into their
//! carry, walk the load back to the nearest completed Town Hall of their
//! owner and return for more. Only player-owned deposits reach the
//! [`ResourceState`] ledger.
//!
//! All amounts are integers; fractional gather progress is carried over
//! between frames in fixed-point.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::components::{Building, EntityId, ResourceNode, Unit};
use crate::config::HarvestConfig;
use crate::factions::Owner;
use crate::math::{per_second, Fixed, Vec2Fixed};
use crate::simulation::EntityStorage;
use crate::systems::move_toward;

/// What a resource node yields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Gold mine.
    Gold,
    /// Forest.
    Wood,
}

impl ResourceKind {
    /// Default display name for a node of this kind.
    #[must_use]
    pub const fn node_name(&self) -> &'static str {
        match self {
            Self::Gold => "Gold Mine",
            Self::Wood => "Forest",
        }
    }
}

/// Player economy totals.
///
/// `food <= max_food` is intended but not enforced; nothing in the core
/// consumes food yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceState {
    /// Gold stockpile.
    pub gold: u32,
    /// Wood stockpile.
    pub wood: u32,
    /// Supply in use.
    pub food: u32,
    /// Supply cap.
    pub max_food: u32,
}

impl ResourceState {
    /// Create a new ledger.
    #[must_use]
    pub const fn new(gold: u32, wood: u32, food: u32, max_food: u32) -> Self {
        Self {
            gold,
            wood,
            food,
            max_food,
        }
    }

    /// Add harvested resources to the matching stockpile.
    pub fn deposit(&mut self, kind: ResourceKind, amount: u32) {
        match kind {
            ResourceKind::Gold => self.gold = self.gold.saturating_add(amount),
            ResourceKind::Wood => self.wood = self.wood.saturating_add(amount),
        }
    }

    /// Replace gold and wood, leaving supply untouched.
    pub fn overwrite(&mut self, gold: u32, wood: u32) {
        self.gold = gold;
        self.wood = wood;
    }
}

impl Default for ResourceState {
    fn default() -> Self {
        Self::new(1000, 500, 1, 4)
    }
}

/// Step of the harvest loop a worker is in.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HarvestPhase {
    /// Walking to the node in `target_id`.
    ToNode,
    /// Standing at the node, filling the carry.
    Gathering,
    /// Walking a full load to the given depot.
    ToDepot(EntityId),
}

/// Events generated by the economy step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EconomyEvent {
    /// A worker gathered resources from a node.
    ResourceGathered {
        /// The worker.
        worker: EntityId,
        /// The resource node.
        node: EntityId,
        /// Amount gathered.
        amount: u32,
    },
    /// A worker dropped its load at a depot.
    ResourceDeposited {
        /// The worker.
        worker: EntityId,
        /// The depot building.
        depot: EntityId,
        /// What was deposited.
        kind: ResourceKind,
        /// Amount deposited.
        amount: u32,
    },
    /// A resource node has been fully depleted.
    NodeDepleted {
        /// The depleted node.
        node: EntityId,
    },
}

/// Borrowed world state the harvest step needs.
pub struct HarvestContext<'a> {
    /// Resource nodes, mutable for extraction.
    pub nodes: &'a mut EntityStorage<ResourceNode>,
    /// Buildings, searched for depots.
    pub buildings: &'a EntityStorage<Building>,
    /// Player stockpile.
    pub ledger: &'a mut ResourceState,
    /// Gathering parameters.
    pub config: &'a HarvestConfig,
    /// Arrival tolerance in grid units.
    pub arrival_epsilon: Fixed,
}

/// Advance one harvesting worker by `delta_ms`.
///
/// Units without a harvest phase are left untouched.
pub fn harvest_step(
    unit: &mut Unit,
    ctx: &mut HarvestContext<'_>,
    delta_ms: Fixed,
    now_ms: Fixed,
    events: &mut Vec<EconomyEvent>,
) {
    let Some(phase) = unit.harvest.clone() else {
        return;
    };

    match phase {
        HarvestPhase::ToNode => {
            if walk(unit, delta_ms, ctx.arrival_epsilon) {
                trace!(worker = %unit.core.id, "Worker reached resource node");
                unit.core.target_position = None;
                unit.harvest = Some(HarvestPhase::Gathering);
                unit.gather_progress = Fixed::ZERO;
                unit.core.last_action_ms = now_ms;
            }
        }
        HarvestPhase::Gathering => gather(unit, ctx, delta_ms, now_ms, events),
        HarvestPhase::ToDepot(depot_id) => {
            if walk(unit, delta_ms, ctx.arrival_epsilon) {
                deposit(unit, ctx, depot_id, now_ms, events);
            }
        }
    }
}

/// Move toward the current target position; `true` once there.
fn walk(unit: &mut Unit, delta_ms: Fixed, epsilon: Fixed) -> bool {
    match unit.core.target_position {
        Some(target) => move_toward(
            &mut unit.core.position,
            target,
            unit.speed,
            delta_ms,
            epsilon,
        ),
        None => true,
    }
}

fn gather(
    unit: &mut Unit,
    ctx: &mut HarvestContext<'_>,
    delta_ms: Fixed,
    now_ms: Fixed,
    events: &mut Vec<EconomyEvent>,
) {
    let Some(node) = unit.target_id.as_ref().and_then(|id| ctx.nodes.get_mut(id)) else {
        unit.halt(now_ms);
        return;
    };

    if unit.carry_kind.is_some_and(|kind| kind != node.kind) {
        // A different resource was being carried; it is dropped.
        unit.carry_amount = 0;
        unit.carry_kind = None;
    }

    if !node.is_depleted() {
        unit.gather_progress = unit
            .gather_progress
            .saturating_add(per_second(ctx.config.gather_rate, delta_ms));
        let whole = unit.gather_progress.floor();
        unit.gather_progress -= whole;

        let space = ctx.config.carry_capacity.saturating_sub(unit.carry_amount);
        let requested = whole.to_num::<u32>().min(space);
        let extracted = node.extract(requested);

        if extracted > 0 {
            unit.carry_amount += extracted;
            unit.carry_kind = Some(node.kind);
            events.push(EconomyEvent::ResourceGathered {
                worker: unit.core.id.clone(),
                node: node.core.id.clone(),
                amount: extracted,
            });
            if node.is_depleted() {
                debug!(node = %node.core.id, "Resource node depleted");
                events.push(EconomyEvent::NodeDepleted {
                    node: node.core.id.clone(),
                });
            }
        }
    }

    let full = unit.carry_amount >= ctx.config.carry_capacity;
    if full || node.is_depleted() {
        if unit.carry_amount > 0 {
            head_to_depot(unit, ctx.buildings, now_ms);
        } else {
            unit.halt(now_ms);
        }
    }
}

fn head_to_depot(unit: &mut Unit, buildings: &EntityStorage<Building>, now_ms: Fixed) {
    match nearest_depot(unit.core.position, unit.core.owner, buildings) {
        Some(depot) => {
            unit.harvest = Some(HarvestPhase::ToDepot(depot.core.id.clone()));
            unit.core.target_position = Some(depot.core.position);
            unit.core.last_action_ms = now_ms;
        }
        None => {
            debug!(worker = %unit.core.id, "No depot available; worker idles with its load");
            unit.halt(now_ms);
        }
    }
}

fn deposit(
    unit: &mut Unit,
    ctx: &mut HarvestContext<'_>,
    depot: EntityId,
    now_ms: Fixed,
    events: &mut Vec<EconomyEvent>,
) {
    unit.core.target_position = None;

    if let (Some(kind), amount) = (unit.carry_kind, unit.carry_amount) {
        if amount > 0 {
            if unit.core.owner == Owner::Player {
                ctx.ledger.deposit(kind, amount);
            }
            events.push(EconomyEvent::ResourceDeposited {
                worker: unit.core.id.clone(),
                depot,
                kind,
                amount,
            });
        }
    }
    unit.carry_amount = 0;
    unit.carry_kind = None;

    let node_position = unit
        .target_id
        .as_ref()
        .and_then(|id| ctx.nodes.get(id))
        .filter(|node| !node.is_depleted())
        .map(|node| node.core.position);

    match node_position {
        Some(position) => {
            unit.harvest = Some(HarvestPhase::ToNode);
            unit.core.target_position = Some(position);
            unit.core.last_action_ms = now_ms;
        }
        None => unit.halt(now_ms),
    }
}

/// Find the nearest depot owned by `owner`. Ties keep collection order.
#[must_use]
pub fn nearest_depot<'a>(
    from: Vec2Fixed,
    owner: Owner,
    buildings: &'a EntityStorage<Building>,
) -> Option<&'a Building> {
    buildings
        .iter()
        .filter(|building| building.is_depot() && building.core.owner == owner)
        .min_by_key(|building| from.distance_squared(building.core.position).to_bits())
}
