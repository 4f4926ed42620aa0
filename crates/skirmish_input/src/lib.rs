//! # Skirmish Input
//!
//! Maps raw pointer events in device pixels onto the simulation.
//!
//! A pointer gesture either pans the camera (drag) or lands as a tap.
//! Taps are converted to grid coordinates and dispatched: with a unit
//! selected they become an order, otherwise they select.
//!
//! ## Crate Structure
//!
//! - [`camera`] - Camera offset and screen/world conversion
//! - [`gesture`] - Tap vs drag state machine
//! - [`controller`] - Dispatch of gestures into a [`Simulation`](skirmish_core::simulation::Simulation)
//! - [`config`] - Tile size and drag threshold

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic)]

pub mod camera;
pub mod config;
pub mod controller;
pub mod gesture;

pub use camera::{Camera, ScreenPoint};
pub use config::{InputConfig, InputError};
pub use controller::{InputController, TapOutcome};
pub use gesture::{GestureEvent, GestureState, PointerGesture};
