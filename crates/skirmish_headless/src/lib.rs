//! Headless skirmish runner for scripted drivers and CI verification.
//!
//! This crate hosts the simulation without a renderer. A driver controls it
//! via JSON commands on stdin, with responses on stdout. This enables:
//!
//! - **Scripted play**: select, order and tap exactly as the touch UI would
//! - **CI verification**: state hashes after a known command stream
//! - **Replay verification**: check that recordings reproduce their hash
//!
//! # Protocol
//!
//! Communication uses JSON lines (one JSON object per line):
//!
//! - **stdin**: Commands from the driver (advance, select, order, ...)
//! - **stdout**: Responses and state (JSON)
//! - **stderr**: Logs (human-readable)
//!
//! See [`protocol`] module for the full command/response specification.
//!
//! # Example
//!
//! ```bash
//! # Run interactively against the demo world
//! echo '{"cmd":"advance","delta_ms":16.0,"frames":60}' | cargo run -p skirmish_headless -- run
//!
//! # Record a session and verify it afterwards
//! cargo run -p skirmish_headless -- run --record session.replay < script.jsonl
//! cargo run -p skirmish_headless -- replay session.replay
//! ```

pub mod clock;
pub mod protocol;
pub mod runner;
pub mod scenario;

pub use clock::FrameClock;
pub use protocol::{Command, Response};
pub use runner::{HeadlessConfig, HeadlessRunner};
pub use scenario::{Scenario, ScenarioError};
