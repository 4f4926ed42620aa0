//! Simulation systems.
//!
//! Systems contain the logic that processes entity data. Each system
//! should do one thing well and reads no state other than what it is
//! handed, so per-unit updates never observe each other.

use tracing::trace;

use crate::components::{EntityId, Unit, UnitState};
use crate::math::{per_second, Fixed, Vec2Fixed};

/// Move `position` toward `target` by `speed * delta_ms / 1000` grid units.
///
/// Returns `true` when the unit has arrived, in which case `position` has
/// been snapped exactly onto `target`. Arrival happens when:
/// - the remaining distance is already under `epsilon`,
/// - the step would reach or pass the target, or
/// - the step leaves less than `epsilon` to go.
///
/// Non-positive `delta_ms` never moves the unit.
pub fn move_toward(
    position: &mut Vec2Fixed,
    target: Vec2Fixed,
    speed: Fixed,
    delta_ms: Fixed,
    epsilon: Fixed,
) -> bool {
    let offset = target - *position;
    let distance = position.distance(target);

    if distance < epsilon {
        *position = target;
        return true;
    }

    if delta_ms <= Fixed::ZERO {
        return false;
    }

    let step = per_second(speed, delta_ms);
    if step >= distance {
        *position = target;
        return true;
    }

    // distance >= epsilon > 0 here, so the division is safe.
    *position = *position + offset.scale(step / distance);

    if position.distance(target) < epsilon {
        *position = target;
        return true;
    }

    false
}

/// Integrates every `Moving` unit that has a target position.
///
/// Arrived units are snapped, lose their target and go `Idle`. Returns the
/// ids of units that arrived this step, in collection order.
pub fn movement_system<'a>(
    units: impl Iterator<Item = &'a mut Unit>,
    delta_ms: Fixed,
    epsilon: Fixed,
    now_ms: Fixed,
) -> Vec<EntityId> {
    let mut arrivals = Vec::new();

    for unit in units {
        if unit.core.state != UnitState::Moving {
            continue;
        }
        let Some(target) = unit.core.target_position else {
            continue;
        };

        if move_toward(&mut unit.core.position, target, unit.speed, delta_ms, epsilon) {
            trace!(unit = %unit.core.id, "Unit arrived");
            unit.core.target_position = None;
            unit.core.set_state(UnitState::Idle, now_ms);
            arrivals.push(unit.core.id.clone());
        }
    }

    arrivals
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::UnitClass;
    use crate::factions::{Faction, Owner};
    use crate::math::ratio;

    fn epsilon() -> Fixed {
        ratio(1, 10)
    }

    #[test]
    fn test_move_toward_partial_step() {
        let mut pos = Vec2Fixed::ZERO;
        let target = Vec2Fixed::from_ints(10, 0);

        // 2 units/s for 1s
        let arrived = move_toward(
            &mut pos,
            target,
            Fixed::from_num(2),
            Fixed::from_num(1000),
            epsilon(),
        );

        assert!(!arrived);
        let tolerance = ratio(1, 10_000);
        assert!((pos.x - Fixed::from_num(2)).abs() < tolerance);
        assert_eq!(pos.y, Fixed::ZERO);
    }

    #[test]
    fn test_move_toward_never_overshoots() {
        let mut pos = Vec2Fixed::ZERO;
        let target = Vec2Fixed::from_ints(1, 1);

        let arrived = move_toward(
            &mut pos,
            target,
            Fixed::from_num(100),
            Fixed::from_num(1000),
            epsilon(),
        );

        assert!(arrived);
        assert_eq!(pos, target);
    }

    #[test]
    fn test_move_toward_far_target() {
        let mut pos = Vec2Fixed::ZERO;
        let target = Vec2Fixed::from_ints(50_000, 0);

        let arrived = move_toward(
            &mut pos,
            target,
            Fixed::from_num(2),
            Fixed::from_num(16),
            epsilon(),
        );

        assert!(!arrived);
        let tolerance = ratio(1, 1000);
        assert!((pos.x - ratio(32, 1000)).abs() < tolerance);
        assert_eq!(pos.y, Fixed::ZERO);
    }

    #[test]
    fn test_huge_delta_arrives() {
        let mut pos = Vec2Fixed::ZERO;
        let target = Vec2Fixed::from_ints(-50_000, 30_000);

        assert!(move_toward(
            &mut pos,
            target,
            ratio(15, 10),
            Fixed::from_num(1_500_000_000),
            epsilon(),
        ));
        assert_eq!(pos, target);
    }

    #[test]
    fn test_zero_distance_arrives_without_dividing() {
        let mut pos = Vec2Fixed::from_ints(4, 4);
        assert!(move_toward(
            &mut pos,
            Vec2Fixed::from_ints(4, 4),
            Fixed::from_num(2),
            Fixed::ZERO,
            epsilon(),
        ));
    }

    #[test]
    fn test_non_positive_delta_does_not_move() {
        let mut pos = Vec2Fixed::ZERO;
        let target = Vec2Fixed::from_ints(5, 5);

        assert!(!move_toward(&mut pos, target, Fixed::from_num(2), Fixed::ZERO, epsilon()));
        assert!(!move_toward(
            &mut pos,
            target,
            Fixed::from_num(2),
            Fixed::from_num(-500),
            epsilon(),
        ));
        assert_eq!(pos, Vec2Fixed::ZERO);
    }

    #[test]
    fn test_movement_system_skips_non_moving_units() {
        let mut idle = Unit::new(
            "idle",
            Faction::Human,
            UnitClass::Melee,
            Vec2Fixed::ZERO,
            Owner::Player,
        );
        idle.core.target_position = Some(Vec2Fixed::from_ints(3, 0));

        let mut moving = Unit::new(
            "moving",
            Faction::Human,
            UnitClass::Melee,
            Vec2Fixed::ZERO,
            Owner::Player,
        );
        moving.core.state = UnitState::Moving;
        moving.core.target_position = Some(Vec2Fixed::from_ints(0, 1));

        let mut units = vec![idle, moving];
        let arrivals = movement_system(
            units.iter_mut(),
            Fixed::from_num(1000),
            epsilon(),
            Fixed::from_num(1000),
        );

        assert_eq!(arrivals, vec![EntityId::new("moving")]);
        assert_eq!(units[0].core.position, Vec2Fixed::ZERO);
        assert_eq!(units[1].core.position, Vec2Fixed::from_ints(0, 1));
        assert_eq!(units[1].core.state, UnitState::Idle);
        assert_eq!(units[1].core.last_action_ms, Fixed::from_num(1000));
        assert!(units[1].core.target_position.is_none());
    }
}
