//! Entity snapshots as seen by a single notification.

use serde::{Deserialize, Serialize};

use super::{EntityId, EntityKind};
use crate::materials::Material;
use crate::world_state::{BlockPos, WorldId};

/// A view of an entity at the moment a notification was raised.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRef {
    pub id: EntityId,
    pub kind: EntityKind,
    /// Block the entity occupies.
    pub pos: BlockPos,
    /// Material carried by falling blocks.
    pub carried: Option<Material>,
}

impl EntityRef {
    /// Create a new entity snapshot with a fresh ID.
    pub fn new(kind: EntityKind, pos: BlockPos) -> Self {
        Self {
            id: EntityId::new(),
            kind,
            pos,
            carried: None,
        }
    }

    /// Create a player snapshot.
    pub fn player(pos: BlockPos) -> Self {
        Self::new(EntityKind::Player, pos)
    }

    /// Create a falling block carrying the given material.
    pub fn falling_block(material: Material, pos: BlockPos) -> Self {
        Self::new(EntityKind::FallingBlock, pos).with_carried(material)
    }

    /// Use a specific ID instead of a fresh one.
    pub fn with_id(mut self, id: EntityId) -> Self {
        self.id = id;
        self
    }

    /// Set the carried material.
    pub fn with_carried(mut self, material: Material) -> Self {
        self.carried = Some(material);
        self
    }

    /// Move the snapshot to another block.
    pub fn at(mut self, pos: BlockPos) -> Self {
        self.pos = pos;
        self
    }

    pub fn is_player(&self) -> bool {
        self.kind == EntityKind::Player
    }

    pub fn world(&self) -> WorldId {
        self.pos.world
    }
}

impl std::fmt::Display for EntityRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}#{}@{}", self.kind, self.id, self.pos)
    }
}
