//! Building stat table.

use serde::{Deserialize, Serialize};

use super::Cost;
use crate::components::BuildingClass;

/// Base statistics for a building class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildingStats {
    /// Maximum hit points.
    pub hp: u32,
    /// Construction cost (food is always zero for buildings).
    pub cost: Cost,
    /// Construction time in seconds.
    pub build_time: u32,
    /// Supply cap added once complete.
    pub food_provided: u32,
}

impl BuildingStats {
    /// Look up the stats for a building class.
    #[must_use]
    pub const fn for_class(class: BuildingClass) -> Self {
        match class {
            BuildingClass::TownHall => Self {
                hp: 1000,
                cost: Cost::new(400, 200, 0),
                build_time: 30,
                food_provided: 0,
            },
            BuildingClass::Farm => Self {
                hp: 200,
                cost: Cost::new(100, 50, 0),
                build_time: 10,
                food_provided: 4,
            },
            BuildingClass::Barracks => Self {
                hp: 500,
                cost: Cost::new(200, 100, 0),
                build_time: 20,
                food_provided: 0,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_farms_provide_food() {
        assert_eq!(BuildingStats::for_class(BuildingClass::Farm).food_provided, 4);
        assert_eq!(BuildingStats::for_class(BuildingClass::TownHall).food_provided, 0);
        assert_eq!(BuildingStats::for_class(BuildingClass::Barracks).food_provided, 0);
    }
}
