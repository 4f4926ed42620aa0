//! Camera offset and screen/world conversion.
//!
//! The camera is a pure pixel translation: the map is drawn shifted by
//! `offset`, and one grid cell spans `tile_size` pixels. There is no zoom.

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};
use skirmish_core::math::{Fixed, Vec2Fixed};

/// A point or displacement in device pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    /// Horizontal pixels.
    pub x: f32,
    /// Vertical pixels.
    pub y: f32,
}

impl ScreenPoint {
    /// Origin.
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    /// Create a new screen point.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Both components finite.
    #[must_use]
    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl Add for ScreenPoint {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self::new(self.x + other.x, self.y + other.y)
    }
}

impl Sub for ScreenPoint {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self::new(self.x - other.x, self.y - other.y)
    }
}

/// Pan-only 2D camera.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Camera {
    /// Pixel translation applied to the map when drawing.
    pub offset: ScreenPoint,
}

impl Camera {
    /// Camera with the given offset.
    #[must_use]
    pub const fn new(offset: ScreenPoint) -> Self {
        Self { offset }
    }

    /// Shift the view by a pixel delta.
    pub fn pan(&mut self, delta: ScreenPoint) {
        self.offset = self.offset + delta;
    }

    /// Convert a screen position to grid coordinates:
    /// `world = (screen - offset) / tile_size`.
    ///
    /// Returns `None` for non-finite input or a result outside the
    /// fixed-point range.
    #[must_use]
    pub fn screen_to_world(&self, screen: ScreenPoint, tile_size: f32) -> Option<Vec2Fixed> {
        let local = screen - self.offset;
        if !local.is_finite() {
            return None;
        }
        let tile = Fixed::checked_from_num(tile_size).filter(|tile| *tile > Fixed::ZERO)?;
        let x = Fixed::checked_from_num(local.x)?;
        let y = Fixed::checked_from_num(local.y)?;
        Some(Vec2Fixed::new(x.checked_div(tile)?, y.checked_div(tile)?))
    }

    /// Convert grid coordinates to the screen position they are drawn at.
    #[must_use]
    pub fn world_to_screen(&self, world: Vec2Fixed, tile_size: f32) -> ScreenPoint {
        ScreenPoint::new(
            world.x.to_num::<f32>() * tile_size + self.offset.x,
            world.y.to_num::<f32>() * tile_size + self.offset.y,
        )
    }
}
