//! Error types for the game simulation.
//!
//! The player-facing surface (`advance`, `select_at`, `issue_order`) is
//! total and never returns these. They cover setup paths only: spawning,
//! configuration loading and replay decoding.

use thiserror::Error;

use crate::components::EntityId;

/// Result type alias using [`GameError`].
pub type Result<T> = std::result::Result<T, GameError>;

/// Top-level error type for all game simulation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GameError {
    /// Invalid entity reference.
    #[error("Entity not found: {0}")]
    EntityNotFound(EntityId),

    /// An entity with this id already exists in the simulation.
    #[error("Duplicate entity ID: {0}")]
    DuplicateEntity(EntityId),

    /// Configuration value out of range or unparsable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Data file parsing error.
    #[error("Failed to parse data file '{path}': {message}")]
    DataParseError {
        /// Path to the file that failed to parse.
        path: String,
        /// Error message.
        message: String,
    },

    /// Replay recorded with an incompatible format.
    #[error("Replay version mismatch: expected {expected}, found {found}")]
    ReplayVersion {
        /// Version this build understands.
        expected: u32,
        /// Version found in the file.
        found: u32,
    },

    /// Invalid game state.
    #[error("Invalid game state: {0}")]
    InvalidState(String),
}
