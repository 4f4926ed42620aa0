//! # Skirmish Test Utilities
//!
//! Helpers shared by the integration tests of every crate:
//! - [`fixtures`]: entity constructors and the demo world
//! - [`determinism`]: hash-based replay checks and proptest strategies
//!
//! Depend on this crate from `[dev-dependencies]` only.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod determinism;
pub mod fixtures;

/// Re-export so dependents share one proptest version.
pub use proptest;
