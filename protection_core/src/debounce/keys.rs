//! Structural identities of burst-prone notifications.

use world_rules::{BlockFace, BlockPos, EntityId};

/// An entity acting on a block (stepping on a plate, an enderman taking it).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockEntityKey {
    pub block: BlockPos,
    pub entity: EntityId,
}

impl BlockEntityKey {
    pub fn new(block: BlockPos, entity: EntityId) -> Self {
        Self { block, entity }
    }
}

/// An entity acting on another entity (a player picking up an item).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityEntityKey {
    pub source: EntityId,
    pub target: EntityId,
}

impl EntityEntityKey {
    pub fn new(source: EntityId, target: EntityId) -> Self {
        Self { source, target }
    }
}

/// A piston pushing a set of blocks.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PistonExtendKey {
    pub piston: BlockPos,
    pub direction: BlockFace,
    pub blocks: Vec<BlockPos>,
}

/// A sticky piston pulling a block back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PistonRetractKey {
    pub piston: BlockPos,
    pub direction: BlockFace,
    pub retract_location: BlockPos,
}

/// Identity of an inventory holder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HolderKey {
    Block(BlockPos),
    Entity(EntityId),
}

/// Items moving between two inventories on behalf of a third.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InventoryMoveKey {
    pub source: HolderKey,
    pub destination: HolderKey,
    pub initiator: HolderKey,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use world_rules::WorldId;

    #[test]
    fn test_piston_keys_compare_pushed_blocks() {
        let world = WorldId::nil();
        let piston = BlockPos::new(world, 0, 64, 0);
        let a = PistonExtendKey {
            piston,
            direction: BlockFace::East,
            blocks: vec![piston.relative(BlockFace::East)],
        };
        let mut b = a.clone();
        b.blocks.push(piston.offset(BlockFace::East, 2));

        let keys: HashSet<_> = [a.clone(), a, b].into_iter().collect();
        assert_eq!(keys.len(), 2);
    }

    #[test]
    fn test_block_entity_key_equality() {
        let pos = BlockPos::new(WorldId::nil(), 1, 1, 1);
        let entity = EntityId::new();

        assert_eq!(BlockEntityKey::new(pos, entity), BlockEntityKey::new(pos, entity));
        assert_ne!(BlockEntityKey::new(pos, entity), BlockEntityKey::new(pos, EntityId::new()));
    }
}
