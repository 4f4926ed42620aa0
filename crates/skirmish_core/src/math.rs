//! Fixed-point math utilities for deterministic simulation.
//!
//! All world-space coordinates use fixed-point arithmetic so that a
//! recorded command stream replays to bit-identical state on any
//! platform. Pixel-space math lives in the input layer and is converted
//! into [`Fixed`] at the screen/world boundary.

use fixed::types::I32F32;
use serde::{Deserialize, Serialize};

/// Fixed-point number type for all simulation math.
///
/// Uses 32 bits for integer part and 32 bits for fractional part.
/// Range: approximately -2,147,483,648 to 2,147,483,647
/// Precision: approximately 0.00000000023
pub type Fixed = I32F32;

/// Fixed-point 2D vector in grid units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Vec2Fixed {
    /// X coordinate.
    #[serde(with = "fixed_serde")]
    pub x: Fixed,
    /// Y coordinate.
    #[serde(with = "fixed_serde")]
    pub y: Fixed,
}

/// Serde support for fixed-point numbers.
///
/// Serializes fixed-point numbers as their raw bit representation (i64)
/// to preserve exact precision across serialization boundaries.
pub mod fixed_serde {
    use super::Fixed;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    /// Serialize a fixed-point number as its raw bit representation.
    pub fn serialize<S>(value: &Fixed, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        value.to_bits().serialize(serializer)
    }

    /// Deserialize a fixed-point number from its raw bit representation.
    pub fn deserialize<'de, D>(deserializer: D) -> Result<Fixed, D::Error>
    where
        D: Deserializer<'de>,
    {
        let bits = i64::deserialize(deserializer)?;
        Ok(Fixed::from_bits(bits))
    }
}

/// Build a fixed-point value from a decimal given as `numerator / denominator`.
///
/// Keeps float literals out of simulation constants.
#[must_use]
pub fn ratio(numerator: i32, denominator: i32) -> Fixed {
    Fixed::from_num(numerator) / Fixed::from_num(denominator)
}

/// Amount accrued over `delta_ms` milliseconds at `rate` per second.
///
/// Multiplies before dividing for precision, falling back to dividing first
/// when the product would overflow. Saturates at [`Fixed::MAX`].
#[must_use]
pub fn per_second(rate: Fixed, delta_ms: Fixed) -> Fixed {
    let thousand = Fixed::from_num(1000);
    match rate.checked_mul(delta_ms) {
        Some(product) => product / thousand,
        None => rate.saturating_mul(delta_ms / thousand),
    }
}

impl Vec2Fixed {
    /// Create a new fixed-point vector.
    #[must_use]
    pub const fn new(x: Fixed, y: Fixed) -> Self {
        Self { x, y }
    }

    /// Create a vector from whole grid cells.
    #[must_use]
    pub fn from_ints(x: i32, y: i32) -> Self {
        Self::new(Fixed::from_num(x), Fixed::from_num(y))
    }

    /// Zero vector.
    pub const ZERO: Self = Self {
        x: Fixed::ZERO,
        y: Fixed::ZERO,
    };

    /// Calculate squared distance (avoids sqrt for comparisons).
    ///
    /// Saturates at [`Fixed::MAX`] for points more than about 46,000 cells
    /// apart.
    #[must_use]
    pub fn distance_squared(self, other: Self) -> Fixed {
        let (dx, dy) = self.abs_offset(other);
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
    }

    /// Euclidean distance between two points.
    ///
    /// Computed as `max * sqrt(1 + (min / max)²)` so that no intermediate
    /// value leaves the range of [`Fixed`]. Saturates at [`Fixed::MAX`].
    #[must_use]
    pub fn distance(self, other: Self) -> Fixed {
        let (dx, dy) = self.abs_offset(other);
        let (major, minor) = if dx >= dy { (dx, dy) } else { (dy, dx) };
        if major == Fixed::ZERO {
            return Fixed::ZERO;
        }
        let r = minor / major;
        major.saturating_mul(fixed_sqrt(Fixed::ONE + r * r))
    }

    /// Multiply both components by a scalar, saturating.
    #[must_use]
    pub fn scale(self, factor: Fixed) -> Self {
        Self::new(self.x.saturating_mul(factor), self.y.saturating_mul(factor))
    }

    /// Whether `other` lies strictly inside the axis-aligned square of the
    /// given half-width centred on `self`.
    #[must_use]
    pub fn within_square(self, other: Self, half_width: Fixed) -> bool {
        let (dx, dy) = self.abs_offset(other);
        dx < half_width && dy < half_width
    }

    /// Per-axis absolute difference, saturating at [`Fixed::MAX`].
    fn abs_offset(self, other: Self) -> (Fixed, Fixed) {
        (
            self.x.saturating_sub(other.x).saturating_abs(),
            self.y.saturating_sub(other.y).saturating_abs(),
        )
    }
}

/// Computes the square root of a fixed-point number using binary search.
pub fn fixed_sqrt(value: Fixed) -> Fixed {
    if value <= Fixed::ZERO {
        return Fixed::ZERO;
    }

    let mut low = Fixed::ZERO;
    let mut high = if value > Fixed::from_num(1) {
        value
    } else {
        Fixed::from_num(1)
    };

    for _ in 0..48 {
        let mid = (low + high) / Fixed::from_num(2);
        let mid_sq = mid.saturating_mul(mid);

        if mid_sq <= value {
            low = mid;
        } else {
            high = mid;
        }
    }

    // Only reachable for exact roots of the initial upper bound, e.g. 1.
    if high.saturating_mul(high) == value {
        high
    } else {
        low
    }
}

/// Component-wise, saturating at the bounds of [`Fixed`].
impl std::ops::Add for Vec2Fixed {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x.saturating_add(rhs.x),
            y: self.y.saturating_add(rhs.y),
        }
    }
}

/// Component-wise, saturating at the bounds of [`Fixed`].
impl std::ops::Sub for Vec2Fixed {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x.saturating_sub(rhs.x),
            y: self.y.saturating_sub(rhs.y),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec2_distance_squared() {
        let a = Vec2Fixed::from_ints(3, 0);
        let b = Vec2Fixed::from_ints(0, 4);
        // 3² + 4² = 25
        assert_eq!(a.distance_squared(b), Fixed::from_num(25));
    }

    #[test]
    fn test_distance_is_close_to_exact() {
        let a = Vec2Fixed::from_ints(3, 0);
        let b = Vec2Fixed::from_ints(0, 4);
        let epsilon = ratio(1, 100_000);
        assert!((a.distance(b) - Fixed::from_num(5)).abs() < epsilon);
    }

    #[test]
    fn test_within_square_is_strict() {
        let centre = Vec2Fixed::from_ints(10, 10);
        let half = ratio(1, 2);

        let on_edge = Vec2Fixed::new(Fixed::from_num(10) + half, Fixed::from_num(10));
        assert!(!centre.within_square(on_edge, half));

        let inside = Vec2Fixed::new(
            Fixed::from_num(10) + half - ratio(1, 1000),
            Fixed::from_num(10) - half + ratio(1, 1000),
        );
        assert!(centre.within_square(inside, half));
    }

    #[test]
    fn test_distance_between_far_points_saturates() {
        let near = Vec2Fixed::ZERO;
        let far = Vec2Fixed::from_ints(50_000, 0);
        assert_eq!(near.distance_squared(far), Fixed::MAX);
        assert_eq!(near.distance(far), Fixed::from_num(50_000));

        let corner = Vec2Fixed::new(Fixed::MIN, Fixed::MIN);
        let opposite = Vec2Fixed::new(Fixed::MAX, Fixed::MAX);
        assert_eq!(corner.distance(opposite), Fixed::MAX);
        assert!(!corner.within_square(opposite, Fixed::MAX));
    }

    #[test]
    fn test_per_second_survives_huge_deltas() {
        assert_eq!(per_second(Fixed::from_num(2), Fixed::from_num(1500)), Fixed::from_num(3));
        assert_eq!(
            per_second(Fixed::from_num(2), Fixed::from_num(1_500_000_000)),
            Fixed::from_num(3_000_000)
        );
        assert_eq!(per_second(Fixed::MAX, Fixed::MAX), Fixed::MAX);
    }

    #[test]
    fn test_fixed_determinism() {
        let a = Fixed::from_num(1) / Fixed::from_num(3);
        let b = Fixed::from_num(1) / Fixed::from_num(3);
        assert_eq!(a * Fixed::from_num(7), b * Fixed::from_num(7));
    }
}
