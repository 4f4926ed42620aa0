//! Gesture dispatch into the simulation.
//!
//! The controller owns the camera and the gesture recognizer. Drags move
//! the camera; taps are converted to grid coordinates and either order the
//! selected unit or make a new selection.

use skirmish_core::components::EntityId;
use skirmish_core::math::Vec2Fixed;
use skirmish_core::simulation::Simulation;
use tracing::{debug, warn};

use crate::camera::{Camera, ScreenPoint};
use crate::config::InputConfig;
use crate::gesture::{GestureEvent, PointerGesture};

/// What a pointer release did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapOutcome {
    /// Nothing: no press in progress, or the tap could not be mapped.
    None,
    /// The gesture was a drag and only moved the camera.
    Panned,
    /// The selected entity was ordered to the world point.
    Ordered {
        /// Ordered entity.
        unit: EntityId,
        /// Tap position in grid coordinates.
        world: Vec2Fixed,
    },
    /// A selection was made; `None` means the tap hit nothing.
    Selected(Option<EntityId>),
}

/// Pointer input handler for one view of the map.
#[derive(Debug, Clone)]
pub struct InputController {
    camera: Camera,
    gesture: PointerGesture,
    config: InputConfig,
}

impl InputController {
    /// Controller with a centred camera.
    #[must_use]
    pub fn new(config: InputConfig) -> Self {
        Self {
            camera: Camera::default(),
            gesture: PointerGesture::new(config.drag_threshold),
            config,
        }
    }

    /// Current camera.
    #[must_use]
    pub const fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Camera, mutably, for hosts that pan by other means.
    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    /// Active tuning.
    #[must_use]
    pub const fn config(&self) -> &InputConfig {
        &self.config
    }

    /// Whether the current press has turned into a drag.
    #[must_use]
    pub const fn is_dragging(&self) -> bool {
        self.gesture.is_dragging()
    }

    /// Grid coordinates under a screen position with the current camera.
    #[must_use]
    pub fn screen_to_world(&self, screen: ScreenPoint) -> Option<Vec2Fixed> {
        self.camera.screen_to_world(screen, self.config.tile_size)
    }

    /// Pointer pressed at `at`.
    pub fn pointer_down(&mut self, at: ScreenPoint) {
        self.gesture.down(at);
    }

    /// Pointer moved to `at`. Returns the pan applied, if any.
    pub fn pointer_move(&mut self, at: ScreenPoint) -> Option<ScreenPoint> {
        match self.gesture.moved(at) {
            GestureEvent::Pan(delta) => {
                self.camera.pan(delta);
                Some(delta)
            }
            GestureEvent::None | GestureEvent::Tap(_) => None,
        }
    }

    /// Pointer released at `at`. A tap is dispatched into `sim`.
    pub fn pointer_up(&mut self, sim: &mut Simulation, at: ScreenPoint) -> TapOutcome {
        let was_dragging = self.gesture.is_dragging();
        match self.gesture.up(at) {
            GestureEvent::Tap(screen) => self.tap(sim, screen),
            GestureEvent::None | GestureEvent::Pan(_) if was_dragging => TapOutcome::Panned,
            GestureEvent::None | GestureEvent::Pan(_) => TapOutcome::None,
        }
    }

    /// Drop any press in progress without tapping.
    pub fn cancel(&mut self) {
        self.gesture.cancel();
    }

    fn tap(&self, sim: &mut Simulation, screen: ScreenPoint) -> TapOutcome {
        let Some(world) = self.screen_to_world(screen) else {
            warn!(x = screen.x, y = screen.y, "Tap outside the representable map");
            return TapOutcome::None;
        };

        if let Some(selected) = sim.selected_id().cloned() {
            debug!(unit = %selected, x = %world.x, y = %world.y, "Tap issues order");
            sim.issue_order(&selected, world.x, world.y);
            return TapOutcome::Ordered {
                unit: selected,
                world,
            };
        }

        let hit = sim.select_at(world.x, world.y).map(|entity| entity.id().clone());
        debug!(x = %world.x, y = %world.y, selected = ?hit, "Tap selects");
        TapOutcome::Selected(hit)
    }
}

impl Default for InputController {
    fn default() -> Self {
        Self::new(InputConfig::default())
    }
}
