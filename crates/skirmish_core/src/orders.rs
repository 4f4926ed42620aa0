//! Order resolution.
//!
//! A world point becomes either a harvest order (worker clicked on a
//! resource node) or a plain move. Orders replace whatever the unit was
//! doing; there is no queue.

use serde::{Deserialize, Serialize};

use crate::components::{EntityId, ResourceNode, Unit, UnitClass, UnitState};
use crate::economy::HarvestPhase;
use crate::math::{Fixed, Vec2Fixed};
use crate::selection::hit_test;
use crate::simulation::EntityStorage;

/// What a unit was told to do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Order {
    /// Walk to the point.
    Move(Vec2Fixed),
    /// Work the node at its exact position.
    Harvest {
        /// Node id.
        node: EntityId,
        /// Node position.
        position: Vec2Fixed,
    },
}

/// Resolve an order point for a unit of `class`.
///
/// Only workers probe for resource nodes; the probe square is wider than
/// the selection square.
#[must_use]
pub fn resolve_order(
    class: UnitClass,
    point: Vec2Fixed,
    resources: &EntityStorage<ResourceNode>,
    half_width: Fixed,
) -> Order {
    if class == UnitClass::Worker {
        if let Some(node) = hit_test(resources.iter(), point, half_width) {
            return Order::Harvest {
                node: node.core.id.clone(),
                position: node.core.position,
            };
        }
    }
    Order::Move(point)
}

impl Order {
    /// Overwrite the unit's current order with this one.
    ///
    /// Carried resources are kept.
    pub fn apply(self, unit: &mut Unit, now_ms: Fixed) {
        unit.gather_progress = Fixed::ZERO;
        match self {
            Self::Move(point) => {
                unit.core.target_position = Some(point);
                unit.target_id = None;
                unit.harvest = None;
                unit.core.set_state(UnitState::Moving, now_ms);
            }
            Self::Harvest { node, position } => {
                unit.core.target_position = Some(position);
                unit.target_id = Some(node);
                unit.harvest = Some(HarvestPhase::ToNode);
                unit.core.set_state(UnitState::Harvesting, now_ms);
            }
        }
    }
}
