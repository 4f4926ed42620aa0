//! Unit stat table.

use serde::{Deserialize, Serialize};

use super::Cost;
use crate::components::UnitClass;
use crate::math::{fixed_serde, ratio, Fixed};

/// Base statistics for a unit class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStats {
    /// Maximum hit points.
    pub hp: u32,
    /// Damage per attack.
    pub damage: u32,
    /// Attack range in grid units.
    #[serde(with = "fixed_serde")]
    pub range: Fixed,
    /// Movement speed in grid units per second.
    #[serde(with = "fixed_serde")]
    pub speed: Fixed,
    /// Production cost.
    pub cost: Cost,
    /// Training time in seconds.
    pub train_time: u32,
}

impl UnitStats {
    /// Look up the stats for a unit class.
    #[must_use]
    pub fn for_class(class: UnitClass) -> Self {
        match class {
            UnitClass::Worker => Self {
                hp: 40,
                damage: 2,
                range: Fixed::from_num(1),
                speed: Fixed::from_num(2),
                cost: Cost::new(50, 0, 1),
                train_time: 5,
            },
            UnitClass::Melee => Self {
                hp: 100,
                damage: 10,
                range: ratio(12, 10),
                speed: ratio(15, 10),
                cost: Cost::new(120, 0, 1),
                train_time: 10,
            },
            UnitClass::Ranged => Self {
                hp: 60,
                damage: 8,
                range: Fixed::from_num(5),
                speed: ratio(18, 10),
                cost: Cost::new(100, 40, 1),
                train_time: 8,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_worker_stats() {
        let worker = UnitStats::for_class(UnitClass::Worker);
        assert_eq!(worker.hp, 40);
        assert_eq!(worker.speed, Fixed::from_num(2));
        assert_eq!(worker.cost, Cost::new(50, 0, 1));
    }

    #[test]
    fn test_ranged_costs_wood() {
        let ranged = UnitStats::for_class(UnitClass::Ranged);
        assert_eq!(ranged.cost.wood, 40);
        assert!(ranged.range > UnitStats::for_class(UnitClass::Melee).range);
    }
}
