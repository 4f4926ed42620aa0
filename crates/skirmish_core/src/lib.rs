//! # Skirmish Core
//!
//! Deterministic simulation core for a small real-time strategy skirmish.
//!
//! This crate contains **only** simulation logic:
//! - No rendering
//! - No IO beyond loading config and replay files on request
//! - No floating-point math in world state (uses fixed-point)
//!
//! This separation enables:
//! - Headless hosts and scripted drivers
//! - Replay systems
//! - Determinism testing
//!
//! ## Crate Structure
//!
//! - [`components`] - Entity model
//! - [`simulation`] - Entity storage and the per-frame step
//! - [`systems`] - Movement integration
//! - [`selection`] - Point hit-testing
//! - [`orders`] - Turning a clicked point into an order
//! - [`economy`] - Stockpile and the harvest loop
//! - [`actions`] - HUD action names
//! - [`replay`] - Recording and playback
//! - [`math`] - Fixed-point math utilities

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod actions;
pub mod components;
pub mod config;
pub mod data;
pub mod economy;
pub mod error;
pub mod factions;
pub mod math;
pub mod orders;
pub mod replay;
pub mod selection;
pub mod simulation;
pub mod systems;

/// Re-export commonly used types
pub mod prelude {
    pub use crate::actions::{ActionOutcome, HudAction};
    pub use crate::components::*;
    pub use crate::config::{HarvestConfig, SimConfig};
    pub use crate::economy::{EconomyEvent, HarvestPhase, ResourceKind, ResourceState};
    pub use crate::error::{GameError, Result};
    pub use crate::factions::{Faction, Owner};
    pub use crate::math::{Fixed, Vec2Fixed};
    pub use crate::orders::Order;
    pub use crate::replay::{Replay, SimCommand};
    pub use crate::simulation::{Simulation, StepEvents, WorldSnapshot};
}
