//! Domain-specific identifier types.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Actor identifier (a player, pet or target taking part in a trial).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActorId(pub u32);

impl ActorId {
    /// Index into per-trial actor tables.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Actor({})", self.0)
    }
}

/// Ability identifier.
///
/// The `tag` distinguishes secondary parts of one ability, e.g. the per-tick
/// spell of a channel uses the channel's id with tag 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AbilityId {
    /// Ability number from the ability table.
    pub id: u32,
    /// Sub-part tag (0 for the ability itself).
    #[serde(default)]
    pub tag: u8,
}

impl AbilityId {
    /// Create an ability id with tag 0.
    pub const fn new(id: u32) -> Self {
        Self { id, tag: 0 }
    }

    /// Same ability, different tag.
    pub const fn with_tag(self, tag: u8) -> Self {
        Self { id: self.id, tag }
    }

    /// Compare ignoring the tag.
    pub fn same_ability(self, other: AbilityId) -> bool {
        self.id == other.id
    }
}

impl fmt::Display for AbilityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tag == 0 {
            write!(f, "Ability({})", self.id)
        } else {
            write!(f, "Ability({}#{})", self.id, self.tag)
        }
    }
}

/// Periodic effect instance identifier, an index into a trial's dot set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DotId(pub u32);

impl DotId {
    /// Index into the dot set.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for DotId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Dot({})", self.0)
    }
}

/// Resource pool kind.
///
/// Mana-like pools regenerate on a timed tick; rage-like pools only grow
/// through combat events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    /// Continuously regenerating pool.
    Mana,
    /// Combat-generated pool.
    Rage,
}

impl ResourceType {
    /// Lowercase display name used in diagnostics.
    pub fn name(self) -> &'static str {
        match self {
            ResourceType::Mana => "mana",
            ResourceType::Rage => "rage",
        }
    }

    /// Whether the pool regenerates on the fixed regen cadence.
    pub fn regenerates_on_tick(self) -> bool {
        matches!(self, ResourceType::Mana)
    }
}

impl fmt::Display for ResourceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ability_tag_comparison() {
        let ability = AbilityId::new(5143);
        let tick = ability.with_tag(1);

        assert_ne!(ability, tick);
        assert!(ability.same_ability(tick));
        assert_eq!(tick.to_string(), "Ability(5143#1)");
        assert_eq!(ability.to_string(), "Ability(5143)");
    }

    #[test]
    fn test_resource_type_deserialize() {
        let mana: ResourceType = serde_json::from_str("\"mana\"").unwrap();
        assert_eq!(mana, ResourceType::Mana);
        assert!(mana.regenerates_on_tick());

        let rage: ResourceType = serde_json::from_str("\"rage\"").unwrap();
        assert!(!rage.regenerates_on_tick());
    }
}
