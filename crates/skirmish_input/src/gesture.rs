//! Tap vs drag recognition.
//!
//! A gesture starts tracking on pointer-down. It becomes a drag once the
//! pointer has strayed more than the threshold from where it went down,
//! measured per axis. Small jitter accumulates against that origin, so a
//! slow drift still counts as a drag. After the flip every move pans by
//! its own delta. Releasing a gesture that never dragged is a tap.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::camera::ScreenPoint;

/// Where the gesture is.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GestureState {
    /// No pointer down.
    Idle,
    /// Pointer down, still under the drag threshold.
    Tracking {
        /// Pointer-down position.
        origin: ScreenPoint,
        /// Most recent position.
        last: ScreenPoint,
    },
    /// Pointer down and past the drag threshold.
    Dragging {
        /// Most recent position.
        last: ScreenPoint,
    },
}

/// What a pointer event amounts to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureEvent {
    /// Nothing to act on.
    None,
    /// Pan the camera by this pixel delta.
    Pan(ScreenPoint),
    /// A tap at this screen position.
    Tap(ScreenPoint),
}

/// Single-pointer gesture recognizer.
#[derive(Debug, Clone, PartialEq)]
pub struct PointerGesture {
    state: GestureState,
    threshold: f32,
}

impl PointerGesture {
    /// Recognizer that flips to dragging past `threshold` pixels.
    #[must_use]
    pub const fn new(threshold: f32) -> Self {
        Self {
            state: GestureState::Idle,
            threshold,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> GestureState {
        self.state
    }

    /// Whether the current gesture has become a drag.
    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        matches!(self.state, GestureState::Dragging { .. })
    }

    /// Pointer pressed. A second press restarts the gesture.
    pub fn down(&mut self, at: ScreenPoint) {
        self.state = GestureState::Tracking {
            origin: at,
            last: at,
        };
    }

    /// Pointer moved. Moves without a press are ignored.
    pub fn moved(&mut self, at: ScreenPoint) -> GestureEvent {
        match self.state {
            GestureState::Idle => GestureEvent::None,
            GestureState::Tracking { origin, last } => {
                let total = at - origin;
                if total.x.abs() > self.threshold || total.y.abs() > self.threshold {
                    trace!(dx = total.x, dy = total.y, "Pointer gesture became a drag");
                    self.state = GestureState::Dragging { last: at };
                    GestureEvent::Pan(at - last)
                } else {
                    self.state = GestureState::Tracking { origin, last: at };
                    GestureEvent::None
                }
            }
            GestureState::Dragging { last } => {
                self.state = GestureState::Dragging { last: at };
                GestureEvent::Pan(at - last)
            }
        }
    }

    /// Pointer released. Always returns to idle.
    pub fn up(&mut self, at: ScreenPoint) -> GestureEvent {
        let previous = std::mem::replace(&mut self.state, GestureState::Idle);
        match previous {
            GestureState::Tracking { .. } => GestureEvent::Tap(at),
            GestureState::Idle | GestureState::Dragging { .. } => GestureEvent::None,
        }
    }

    /// Abandon the gesture without a tap, e.g. when the pointer is captured
    /// elsewhere.
    pub fn cancel(&mut self) {
        self.state = GestureState::Idle;
    }
}

impl Default for PointerGesture {
    fn default() -> Self {
        Self::new(4.0)
    }
}
