//! Pointer input driven against the demo world.

use proptest::prelude::*;
use skirmish_core::components::UnitState;
use skirmish_input::{InputConfig, InputController, ScreenPoint, TapOutcome};
use skirmish_test_utils::fixtures::{demo_soldier_id, demo_worker_id, demo_world, fixed, pos};

fn press_and_release(
    controller: &mut InputController,
    sim: &mut skirmish_core::simulation::Simulation,
    points: &[ScreenPoint],
) -> TapOutcome {
    let (first, rest) = points.split_first().expect("at least one point");
    controller.pointer_down(*first);
    for point in rest {
        controller.pointer_move(*point);
    }
    let last = rest.last().copied().unwrap_or(*first);
    controller.pointer_up(sim, last)
}

#[test]
fn test_worker_tap_on_gold_starts_harvest() {
    let mut sim = demo_world();
    let mut controller = InputController::default();

    // Worker at (10, 10) is drawn at (400, 400).
    let outcome = press_and_release(&mut controller, &mut sim, &[ScreenPoint::new(401.0, 399.0)]);
    assert_eq!(outcome, TapOutcome::Selected(Some(demo_worker_id())));

    // gold-1 at (5, 5) sits at (200, 200); tap slightly off-centre.
    let outcome = press_and_release(&mut controller, &mut sim, &[ScreenPoint::new(225.0, 190.0)]);
    assert!(matches!(outcome, TapOutcome::Ordered { .. }));

    let peasant = sim.unit(&demo_worker_id()).unwrap();
    assert_eq!(peasant.core.state, UnitState::Harvesting);
    assert_eq!(peasant.core.target_position, Some(pos(5.0, 5.0)));
}

#[test]
fn test_soldier_tap_on_gold_moves_to_point() {
    let mut sim = demo_world();
    let mut controller = InputController::default();

    press_and_release(&mut controller, &mut sim, &[ScreenPoint::new(440.0, 440.0)]);
    assert_eq!(sim.selected_id(), Some(&demo_soldier_id()));

    press_and_release(&mut controller, &mut sim, &[ScreenPoint::new(220.0, 200.0)]);

    let grunt = sim.unit(&demo_soldier_id()).unwrap();
    assert_eq!(grunt.core.state, UnitState::Moving);
    assert_eq!(grunt.core.target_position, Some(pos(5.5, 5.0)));
}

#[test]
fn test_drag_then_tap_uses_new_camera() {
    let mut sim = demo_world();
    let mut controller = InputController::default();

    let outcome = press_and_release(
        &mut controller,
        &mut sim,
        &[
            ScreenPoint::new(100.0, 100.0),
            ScreenPoint::new(120.0, 100.0),
            ScreenPoint::new(140.0, 100.0),
        ],
    );
    assert_eq!(outcome, TapOutcome::Panned);
    assert_eq!(controller.camera().offset, ScreenPoint::new(40.0, 0.0));

    // The worker at (10, 10) is now drawn at (440, 400).
    let outcome = press_and_release(&mut controller, &mut sim, &[ScreenPoint::new(440.0, 400.0)]);
    assert_eq!(outcome, TapOutcome::Selected(Some(demo_worker_id())));
}

#[test]
fn test_custom_threshold() {
    let mut sim = demo_world();
    let config = InputConfig::from_ron_str("(drag_threshold: 20.0)").unwrap();
    let mut controller = InputController::new(config);

    // 15px of wobble stays a tap with a 20px threshold.
    let outcome = press_and_release(
        &mut controller,
        &mut sim,
        &[ScreenPoint::new(400.0, 400.0), ScreenPoint::new(415.0, 400.0)],
    );
    assert_eq!(outcome, TapOutcome::Selected(Some(demo_worker_id())));
    assert_eq!(controller.camera().offset, ScreenPoint::ZERO);
}

fn arb_wobble() -> impl Strategy<Value = Vec<(f32, f32)>> {
    proptest::collection::vec((-3.0f32..3.0, -3.0f32..3.0), 0..12)
}

proptest! {
    #[test]
    fn prop_drag_never_dispatches(
        start_x in 0.0f32..1600.0,
        start_y in 0.0f32..1600.0,
        push in 4.5f32..200.0,
        horizontal in any::<bool>(),
        wobble in arb_wobble(),
    ) {
        let mut sim = demo_world();
        // Select the worker first so a stray tap would issue an order.
        sim.select_at(fixed(10), fixed(10));
        let before = sim.state_hash();
        let mut controller = InputController::default();

        let start = ScreenPoint::new(start_x, start_y);
        let far = if horizontal {
            ScreenPoint::new(start_x + push, start_y)
        } else {
            ScreenPoint::new(start_x, start_y - push)
        };
        let mut points = vec![start, far];
        // Finish right back where the press started.
        points.extend(wobble.iter().map(|(dx, dy)| ScreenPoint::new(start_x + dx, start_y + dy)));
        points.push(start);

        let outcome = press_and_release(&mut controller, &mut sim, &points);

        prop_assert_eq!(outcome, TapOutcome::Panned);
        prop_assert_eq!(sim.state_hash(), before);
    }

    #[test]
    fn prop_small_wobble_is_a_tap(
        wobble in arb_wobble(),
    ) {
        let mut sim = demo_world();
        let mut controller = InputController::default();
        let start = ScreenPoint::new(400.0, 400.0);

        let mut points = vec![start];
        points.extend(wobble.iter().map(|(dx, dy)| ScreenPoint::new(400.0 + dx, 400.0 + dy)));

        let outcome = press_and_release(&mut controller, &mut sim, &points);
        prop_assert_eq!(outcome, TapOutcome::Selected(Some(demo_worker_id())));
        prop_assert_eq!(controller.camera().offset, ScreenPoint::ZERO);
    }
}
