//! Session-level tests driving the simulation through its public surface.

use skirmish_core::prelude::*;
use skirmish_test_utils::fixtures::{
    demo_soldier_id, demo_worker_id, demo_world, fixed, fixed_f, gold_mine, pos, soldier, town_hall, worker,
};

// =============================================================================
// Selection then order, the way a host wires a tap
// =============================================================================

#[test]
fn test_select_then_order_moves_soldier() {
    let mut sim = demo_world();

    let selected = sim.select_at(fixed_f(11.2), fixed_f(10.8)).map(|e| e.id().clone());
    assert_eq!(selected, Some(demo_soldier_id()));

    sim.issue_order(&demo_soldier_id(), fixed(20), fixed(11));
    for _ in 0..600 {
        sim.advance(fixed(16));
    }

    let grunt = sim.unit(&demo_soldier_id()).unwrap();
    assert_eq!(grunt.core.position, pos(20.0, 11.0));
    assert_eq!(grunt.core.state, UnitState::Idle);
    assert!(grunt.core.target_position.is_none());
}

#[test]
fn test_overlapping_units_pick_first_spawned() {
    let mut sim = Simulation::new();
    sim.spawn_unit(worker("first", 3.0, 3.0)).unwrap();
    sim.spawn_unit(soldier("second", 3.2, 3.2)).unwrap();

    let hit = sim.select_at(fixed_f(3.1), fixed_f(3.1)).unwrap();
    assert_eq!(hit.id().as_str(), "first");
}

#[test]
fn test_click_on_building_selects_it() {
    let mut sim = demo_world();
    sim.spawn_building(town_hall("hall", 20.0, 20.0)).unwrap();

    let hit = sim.select_at(fixed_f(20.4), fixed_f(19.6)).unwrap();
    assert_eq!(hit.kind(), EntityKind::Building);
    assert_eq!(hit.name(), "Town Hall");
    assert!(sim.selected_entity().is_some());
}

#[test]
fn test_worker_near_forest_targets_that_node() {
    let mut sim = demo_world();

    // wood-0 at (8, 4) is the first node in range of (8.5, 4.5).
    sim.issue_order(&demo_worker_id(), fixed_f(8.5), fixed_f(4.5));

    let peasant = sim.unit(&demo_worker_id()).unwrap();
    assert_eq!(peasant.core.state, UnitState::Harvesting);
    assert_eq!(peasant.target_id, Some(EntityId::new("wood-0")));
    assert_eq!(peasant.core.target_position, Some(pos(8.0, 4.0)));
}

#[test]
fn test_new_order_overwrites_previous() {
    let mut sim = demo_world();
    sim.issue_order(&demo_worker_id(), fixed(5), fixed(5));
    sim.issue_order(&demo_worker_id(), fixed(15), fixed(15));

    let peasant = sim.unit(&demo_worker_id()).unwrap();
    assert_eq!(peasant.core.state, UnitState::Moving);
    assert!(peasant.target_id.is_none());
    assert_eq!(peasant.core.target_position, Some(pos(15.0, 15.0)));
}

// =============================================================================
// Harvest loop
// =============================================================================

#[test]
fn test_worker_harvests_wood_into_stockpile() {
    let mut sim = demo_world();
    sim.spawn_building(town_hall("hall", 10.0, 6.0)).unwrap();
    sim.issue_order(&demo_worker_id(), fixed(8), fixed(4));

    let mut deposits = 0;
    for _ in 0..3000 {
        let events = sim.advance(fixed(16));
        deposits += events
            .economy
            .iter()
            .filter(|e| matches!(e, EconomyEvent::ResourceDeposited { kind: ResourceKind::Wood, .. }))
            .count();
    }

    assert!(deposits >= 2, "expected repeated trips, got {deposits}");
    assert_eq!(sim.player_resources().wood, 500 + 10 * deposits as u32);
    let forest = sim.resource(&EntityId::new("wood-0")).unwrap();
    assert!(forest.amount < 200);
    assert_eq!(forest.core.health.current, forest.amount);
}

#[test]
fn test_depleted_node_sends_worker_idle() {
    let mut sim = Simulation::new();
    sim.spawn_building(town_hall("hall", 2.0, 0.0)).unwrap();
    sim.spawn_resource(gold_mine("tiny", 0.0, 0.0, 3)).unwrap();
    let id = sim.spawn_unit(worker("peasant", 0.0, 0.0)).unwrap();
    sim.issue_order(&id, fixed(0), fixed(0));

    let mut depleted = false;
    for _ in 0..1000 {
        let events = sim.advance(fixed(20));
        depleted |= events
            .economy
            .iter()
            .any(|e| matches!(e, EconomyEvent::NodeDepleted { .. }));
    }

    assert!(depleted);
    assert_eq!(sim.player_resources().gold, 1003);
    let peasant = sim.unit(&id).unwrap();
    assert_eq!(peasant.core.state, UnitState::Idle);
    assert_eq!(peasant.carry_amount, 0);
    // Depleted nodes stay in the world.
    assert!(sim.resource(&EntityId::new("tiny")).unwrap().is_depleted());
}

// =============================================================================
// Actions and persistence hooks
// =============================================================================

#[test]
fn test_stop_interrupts_harvest() {
    let mut sim = demo_world();
    sim.issue_order(&demo_worker_id(), fixed(5), fixed(5));
    sim.advance(fixed(100));
    let at = sim.unit(&demo_worker_id()).unwrap().core.position;
    sim.select_at(at.x, at.y);

    assert_eq!(sim.on_action("stop"), ActionOutcome::Applied);

    let peasant = sim.unit(&demo_worker_id()).unwrap();
    assert_eq!(peasant.core.state, UnitState::Idle);
    assert!(peasant.target_id.is_none());
    assert!(peasant.harvest.is_none());
}

#[test]
fn test_zero_hp_units_are_kept() {
    let mut sim = Simulation::new();
    let mut doomed = soldier("doomed", 1.0, 1.0);
    doomed.core.health.set_current(0);
    let id = sim.spawn_unit(doomed).unwrap();

    sim.advance(fixed(1000));

    assert!(sim.unit(&id).unwrap().core.health.is_dead());
    assert_eq!(sim.units().count(), 1);
    assert!(sim.select_at(fixed(1), fixed(1)).is_some());
}

#[test]
fn test_snapshot_matches_queries() {
    let mut sim = demo_world();
    sim.overwrite_resources(250, 125);
    sim.select_at(fixed(10), fixed(10));
    sim.advance(fixed(40));

    let snapshot = sim.snapshot();
    assert_eq!(snapshot.elapsed_ms, fixed(40));
    assert_eq!(snapshot.units.len(), 2);
    assert_eq!(snapshot.resources.len(), 7);
    assert_eq!(snapshot.player_resources.gold, 250);
    assert_eq!(snapshot.selected, Some(demo_worker_id()));
    assert_eq!(snapshot.units[0].core.id, demo_worker_id());
}

#[test]
fn test_config_thresholds_are_used() {
    let config = SimConfig::from_ron_str("(selection_half_width: 2.0)").unwrap();
    let mut sim = Simulation::with_config(config);
    sim.spawn_unit(soldier("grunt", 5.0, 5.0)).unwrap();

    assert!(sim.select_at(fixed_f(6.5), fixed_f(3.5)).is_some());
    assert!(sim.select_at(fixed(7), fixed(5)).is_none());
}
