//! Entity definitions for the protected world.

mod entity;
mod item;

pub use entity::*;
pub use item::*;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for all entities in the world, players included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId(pub Uuid);

impl EntityId {
    /// Create a new random entity ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create an entity ID from a specific UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    /// Create a nil/empty entity ID.
    pub fn nil() -> Self {
        Self(Uuid::nil())
    }
}

impl Default for EntityId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Kinds of entities the protection pipeline distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Player,
    /// Gravity-affected block in flight (sand, gravel, anvils).
    FallingBlock,
    /// Dropped item lying in the world.
    Item,
    ExperienceOrb,
    PrimedTnt,
    Arrow,
    FishingHook,
    ThrownPotion,
    ThrownEgg,
    ThrownExpBottle,
    Minecart,
    Boat,
    ItemFrame,
    Painting,
    ArmorStand,
    Animal,
    Monster,
    Villager,
    Other,
}

impl EntityKind {
    /// Vehicles players can ride and break.
    pub fn is_vehicle(&self) -> bool {
        matches!(self, EntityKind::Minecart | EntityKind::Boat)
    }

    /// Entities attached to a block face.
    pub fn is_hanging(&self) -> bool {
        matches!(self, EntityKind::ItemFrame | EntityKind::Painting)
    }

    /// Living, non-player entities.
    pub fn is_creature(&self) -> bool {
        matches!(
            self,
            EntityKind::Animal | EntityKind::Monster | EntityKind::Villager
        )
    }

    /// Projectiles whose shooter is the responsible party.
    pub fn is_projectile(&self) -> bool {
        matches!(
            self,
            EntityKind::Arrow
                | EntityKind::FishingHook
                | EntityKind::ThrownPotion
                | EntityKind::ThrownEgg
                | EntityKind::ThrownExpBottle
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_id_uniqueness() {
        assert_ne!(EntityId::new(), EntityId::new());
        assert_eq!(EntityId::nil(), EntityId::from_uuid(Uuid::nil()));
    }

    #[test]
    fn test_entity_kind_categories() {
        assert!(EntityKind::Boat.is_vehicle());
        assert!(EntityKind::Painting.is_hanging());
        assert!(EntityKind::Animal.is_creature());
        assert!(!EntityKind::Player.is_creature());
        assert!(EntityKind::ThrownPotion.is_projectile());
    }
}
