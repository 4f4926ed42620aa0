//! HUD action names.

use serde::{Deserialize, Serialize};

use crate::components::UnitClass;

/// Actions the HUD can send for the current selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HudAction {
    /// Halt the selected unit.
    Stop,
    /// Queue a worker at the selected building.
    TrainWorker,
    /// Queue a melee soldier at the selected building.
    TrainSoldier,
    /// Attack mode. Not wired up.
    Attack,
    /// Move mode. Not wired up.
    Move,
    /// Open the build menu. Not wired up.
    BuildMenu,
}

impl HudAction {
    /// Parse the wire name used by the HUD.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "stop" => Some(Self::Stop),
            "train_worker" => Some(Self::TrainWorker),
            "train_soldier" => Some(Self::TrainSoldier),
            "attack" => Some(Self::Attack),
            "move" => Some(Self::Move),
            "build_menu" => Some(Self::BuildMenu),
            _ => None,
        }
    }

    /// Wire name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Stop => "stop",
            Self::TrainWorker => "train_worker",
            Self::TrainSoldier => "train_soldier",
            Self::Attack => "attack",
            Self::Move => "move",
            Self::BuildMenu => "build_menu",
        }
    }

    /// Unit class a training action queues.
    #[must_use]
    pub const fn trains(&self) -> Option<UnitClass> {
        match self {
            Self::TrainWorker => Some(UnitClass::Worker),
            Self::TrainSoldier => Some(UnitClass::Melee),
            _ => None,
        }
    }
}

/// Result of dispatching a HUD action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionOutcome {
    /// The selection changed.
    Applied,
    /// Recognised, but nothing to do for the current selection.
    Ignored,
    /// Name not recognised.
    Unknown,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_round_trips_names() {
        for action in [
            HudAction::Stop,
            HudAction::TrainWorker,
            HudAction::TrainSoldier,
            HudAction::Attack,
            HudAction::Move,
            HudAction::BuildMenu,
        ] {
            assert_eq!(HudAction::parse(action.name()), Some(action));
        }
        assert_eq!(HudAction::parse("Stop"), None);
        assert_eq!(HudAction::parse("dance"), None);
    }

    #[test]
    fn test_training_classes() {
        assert_eq!(HudAction::TrainSoldier.trains(), Some(UnitClass::Melee));
        assert_eq!(HudAction::Stop.trains(), None);
    }
}
