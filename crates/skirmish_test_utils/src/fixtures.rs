//! Test fixtures and helpers.
//!
//! Pre-built worlds and entity constructors for consistent testing.

use fixed::types::I32F32;
use skirmish_core::components::{Building, BuildingClass, EntityId, ResourceNode, Unit, UnitClass};
use skirmish_core::economy::ResourceKind;
use skirmish_core::factions::{Faction, Owner};
use skirmish_core::math::Vec2Fixed;
use skirmish_core::simulation::Simulation;

/// Create a fixed-point number from an integer.
#[must_use]
pub fn fixed(n: i32) -> I32F32 {
    I32F32::from_num(n)
}

/// Create a fixed-point number from a float (for tests only).
///
/// Note: In real simulation code, never use floats.
/// This is only for convenient test setup.
#[must_use]
pub fn fixed_f(n: f64) -> I32F32 {
    I32F32::from_num(n)
}

/// Grid position from floats (for tests only).
#[must_use]
pub fn pos(x: f64, y: f64) -> Vec2Fixed {
    Vec2Fixed::new(fixed_f(x), fixed_f(y))
}

/// Player-owned human worker.
#[must_use]
pub fn worker(id: &str, x: f64, y: f64) -> Unit {
    Unit::new(id, Faction::Human, UnitClass::Worker, pos(x, y), Owner::Player)
}

/// Player-owned human melee soldier.
#[must_use]
pub fn soldier(id: &str, x: f64, y: f64) -> Unit {
    Unit::new(id, Faction::Human, UnitClass::Melee, pos(x, y), Owner::Player)
}

/// Completed player Town Hall.
#[must_use]
pub fn town_hall(id: &str, x: f64, y: f64) -> Building {
    Building::new(
        id,
        Faction::Human,
        BuildingClass::TownHall,
        pos(x, y),
        Owner::Player,
        true,
    )
}

/// Gold mine holding `amount`.
#[must_use]
pub fn gold_mine(id: &str, x: f64, y: f64, amount: u32) -> ResourceNode {
    ResourceNode::new(id, ResourceKind::Gold, pos(x, y), amount)
}

/// Forest holding `amount`.
#[must_use]
pub fn forest(id: &str, x: f64, y: f64, amount: u32) -> ResourceNode {
    ResourceNode::new(id, ResourceKind::Wood, pos(x, y), amount)
}

/// The demo skirmish: two gold mines, a row of forest, one worker and one
/// soldier.
///
/// # Panics
///
/// Never in practice; fixture ids are unique.
#[must_use]
pub fn demo_world() -> Simulation {
    let mut sim = Simulation::new();
    sim.spawn_resource(gold_mine("gold-1", 5.0, 5.0, 5000))
        .expect("unique id");
    sim.spawn_resource(gold_mine("gold-2", 35.0, 35.0, 5000))
        .expect("unique id");
    for i in 0..5 {
        sim.spawn_resource(forest(&format!("wood-{i}"), 8.0 + f64::from(i), 4.0, 200))
            .expect("unique id");
    }
    sim.spawn_unit(worker("player-peasant-1", 10.0, 10.0))
        .expect("unique id");
    sim.spawn_unit(soldier("player-grunt-1", 11.0, 11.0))
        .expect("unique id");
    sim
}

/// Id of the demo worker.
#[must_use]
pub fn demo_worker_id() -> EntityId {
    EntityId::new("player-peasant-1")
}

/// Id of the demo soldier.
#[must_use]
pub fn demo_soldier_id() -> EntityId {
    EntityId::new("player-grunt-1")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_world_layout() {
        let sim = demo_world();
        assert_eq!(sim.units().count(), 2);
        assert_eq!(sim.resources().count(), 7);
        assert_eq!(sim.buildings().count(), 0);
        assert_eq!(
            sim.unit(&demo_worker_id()).unwrap().core.position,
            pos(10.0, 10.0)
        );
    }
}
