//! Faction and ownership identifiers.

use serde::{Deserialize, Serialize};

/// Faction an entity fights for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Faction {
    /// The Human Alliance.
    Human,
    /// The Orcish Horde.
    Orc,
    /// Unaligned world objects. Reserved for resource nodes.
    Neutral,
}

impl Faction {
    /// Get the display name for this faction.
    #[must_use]
    pub const fn display_name(&self) -> &'static str {
        match self {
            Self::Human => "Human Alliance",
            Self::Orc => "Orcish Horde",
            Self::Neutral => "Neutral",
        }
    }

    /// Get the short name for this faction.
    #[must_use]
    pub const fn short_name(&self) -> &'static str {
        match self {
            Self::Human => "Human",
            Self::Orc => "Orc",
            Self::Neutral => "Neutral",
        }
    }
}

/// Control authority over an entity, independent of faction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Owner {
    /// Controlled by the local player.
    #[default]
    Player,
    /// Controlled by the computer (also used for neutral world objects).
    Cpu,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_names() {
        assert_eq!(Faction::Orc.short_name(), "Orc");
        assert_eq!(Faction::Human.display_name(), "Human Alliance");
    }

    #[test]
    fn test_owner_default_is_player() {
        assert_eq!(Owner::default(), Owner::Player);
    }
}
