//! Point hit-testing for selection and targeting.
//!
//! Hits use an axis-aligned square around each entity, not a circle. The
//! first match in collection order wins; there is no nearest-match search.

use crate::components::{Building, EntityRef, GameEntity, Unit};
use crate::math::{Fixed, Vec2Fixed};

/// First entity whose position lies strictly within `half_width` of
/// `point` on both axes.
pub fn hit_test<'a, T, I>(entities: I, point: Vec2Fixed, half_width: Fixed) -> Option<&'a T>
where
    T: GameEntity + 'a,
    I: IntoIterator<Item = &'a T>,
{
    entities
        .into_iter()
        .find(|entity| entity.position().within_square(point, half_width))
}

/// Units take priority over buildings. Resource nodes are never picked.
pub fn pick<'a>(
    units: impl IntoIterator<Item = &'a Unit>,
    buildings: impl IntoIterator<Item = &'a Building>,
    point: Vec2Fixed,
    half_width: Fixed,
) -> Option<EntityRef<'a>> {
    hit_test(units, point, half_width)
        .map(EntityRef::Unit)
        .or_else(|| hit_test(buildings, point, half_width).map(EntityRef::Building))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::{BuildingClass, UnitClass};
    use crate::factions::{Faction, Owner};
    use crate::math::ratio;

    fn unit(id: &str, x: Fixed, y: Fixed) -> Unit {
        Unit::new(
            id,
            Faction::Human,
            UnitClass::Melee,
            Vec2Fixed::new(x, y),
            Owner::Player,
        )
    }

    #[test]
    fn test_boundary_is_exclusive() {
        let units = [unit("a", Fixed::ZERO, Fixed::ZERO)];
        let half = ratio(1, 2);

        assert!(hit_test(&units, Vec2Fixed::new(ratio(49, 100), Fixed::ZERO), half).is_some());
        assert!(hit_test(&units, Vec2Fixed::new(half, Fixed::ZERO), half).is_none());
        assert!(hit_test(&units, Vec2Fixed::new(Fixed::ZERO, -half), half).is_none());
    }

    #[test]
    fn test_first_match_wins_over_nearest() {
        let units = [
            unit("first", ratio(4, 10), Fixed::ZERO),
            unit("second", Fixed::ZERO, Fixed::ZERO),
        ];
        let hit = hit_test(&units, Vec2Fixed::ZERO, ratio(1, 2)).unwrap();
        assert_eq!(hit.core.id.as_str(), "first");
    }

    #[test]
    fn test_units_shadow_buildings() {
        let units = [unit("grunt", Fixed::ZERO, Fixed::ZERO)];
        let buildings = [Building::new(
            "hall",
            Faction::Human,
            BuildingClass::TownHall,
            Vec2Fixed::ZERO,
            Owner::Player,
            true,
        )];

        let hit = pick(&units, &buildings, Vec2Fixed::ZERO, ratio(1, 2)).unwrap();
        assert!(hit.as_unit().is_some());

        let hit = pick(std::iter::empty::<&Unit>(), &buildings, Vec2Fixed::ZERO, ratio(1, 2)).unwrap();
        assert_eq!(hit.id().as_str(), "hall");
    }
}
