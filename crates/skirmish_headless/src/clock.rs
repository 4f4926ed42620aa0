//! Wall-clock frame pacing.
//!
//! Each frame advances the simulation by the real time since the previous
//! frame. Deltas are not clamped and not split into substeps, so a stalled
//! host produces one large step.

use std::time::{Duration, Instant};

use skirmish_core::math::Fixed;

/// Measures the time between frames.
#[derive(Debug, Clone, Default)]
pub struct FrameClock {
    last: Option<Instant>,
}

impl FrameClock {
    /// Clock with no frame yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// Milliseconds since the previous call; zero on the first.
    pub fn tick(&mut self) -> Fixed {
        self.tick_at(Instant::now())
    }

    /// Like [`FrameClock::tick`] with an explicit timestamp.
    ///
    /// A timestamp earlier than the previous one yields zero.
    pub fn tick_at(&mut self, now: Instant) -> Fixed {
        let elapsed = self
            .last
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.last = Some(now);
        duration_to_ms(elapsed)
    }

    /// Forget the previous frame, e.g. after a pause.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Convert a duration to fixed-point milliseconds at microsecond precision.
pub fn duration_to_ms(duration: Duration) -> Fixed {
    let micros = i64::try_from(duration.as_micros()).unwrap_or(i64::MAX);
    Fixed::saturating_from_num(micros) / Fixed::from_num(1000)
}
