//! Static stat tables for units and buildings.
//!
//! Pure data, no IO. Values mirror the balance sheet the renderer and HUD
//! use for cost and health displays.

mod building_data;
mod unit_data;

pub use building_data::BuildingStats;
pub use unit_data::UnitStats;

use serde::{Deserialize, Serialize};

/// Price of producing a unit or constructing a building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cost {
    /// Gold required.
    pub gold: u32,
    /// Wood required.
    pub wood: u32,
    /// Food (supply) consumed while alive.
    pub food: u32,
}

impl Cost {
    /// Create a new cost.
    #[must_use]
    pub const fn new(gold: u32, wood: u32, food: u32) -> Self {
        Self { gold, wood, food }
    }
}
