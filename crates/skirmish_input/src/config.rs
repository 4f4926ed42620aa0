//! Input tuning, loadable from RON.
//!
//! ```ron
//! InputConfig(tile_size: 40.0, drag_threshold: 4.0)
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use skirmish_core::components::TILE_SIZE;
use thiserror::Error;

/// Errors from loading input config.
#[derive(Debug, Error)]
pub enum InputError {
    /// Config file could not be read.
    #[error("Failed to read input config {path}: {source}")]
    Io {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Config text is not valid RON.
    #[error("Failed to parse input config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    /// A value is out of range.
    #[error("Invalid input config: {0}")]
    Invalid(String),
}

/// Pixel-space tuning for pointer input.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Pixels per grid cell.
    pub tile_size: f32,
    /// Per-axis displacement, in pixels, a press must exceed to become a
    /// drag.
    pub drag_threshold: f32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            tile_size: TILE_SIZE as f32,
            drag_threshold: 4.0,
        }
    }
}

impl InputConfig {
    /// Parse and validate from a RON string.
    pub fn from_ron_str(ron: &str) -> Result<Self, InputError> {
        let config: Self = ron::from_str(ron)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate from a RON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, InputError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| InputError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&contents)
    }

    /// Reject sizes the camera cannot divide by.
    pub fn validate(&self) -> Result<(), InputError> {
        if !(self.tile_size.is_finite() && self.tile_size > 0.0) {
            return Err(InputError::Invalid(format!(
                "tile_size must be positive, got {}",
                self.tile_size
            )));
        }
        if !(self.drag_threshold.is_finite() && self.drag_threshold >= 0.0) {
            return Err(InputError::Invalid(format!(
                "drag_threshold must be non-negative, got {}",
                self.drag_threshold
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_tile_size() {
        let config = InputConfig::default();
        assert!((config.tile_size - 40.0).abs() < f32::EPSILON);
        assert!((config.drag_threshold - 4.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_partial_ron() {
        let config = InputConfig::from_ron_str("(drag_threshold: 10.0)").unwrap();
        assert!((config.drag_threshold - 10.0).abs() < f32::EPSILON);
        assert!((config.tile_size - 40.0).abs() < f32::EPSILON);
    }

    #[test]
    fn test_rejects_zero_tile() {
        assert!(matches!(
            InputConfig::from_ron_str("(tile_size: 0.0)"),
            Err(InputError::Invalid(_))
        ));
        assert!(matches!(
            InputConfig::from_ron_str("(tile_size: )"),
            Err(InputError::Parse(_))
        ));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.ron");
        std::fs::write(&path, "InputConfig(tile_size: 32.0)").unwrap();

        let config = InputConfig::load(&path).unwrap();
        assert!((config.tile_size - 32.0).abs() < f32::EPSILON);

        assert!(matches!(
            InputConfig::load(dir.path().join("nope.ron")),
            Err(InputError::Io { .. })
        ));
    }
}
