//! Spatial vocabulary: worlds, block positions, faces, and block snapshots.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::materials::Material;

/// Unique identifier for worlds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorldId(pub Uuid);

impl WorldId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn nil() -> Self {
        Self(Uuid::nil())
    }
}

impl Default for WorldId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for WorldId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Integer block coordinates inside a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BlockPos {
    pub world: WorldId,
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl BlockPos {
    /// Create a new block position.
    pub fn new(world: WorldId, x: i32, y: i32, z: i32) -> Self {
        Self { world, x, y, z }
    }

    /// The neighbouring block on the given face.
    pub fn relative(&self, face: BlockFace) -> Self {
        self.offset(face, 1)
    }

    /// The block `distance` steps away in the direction of `face`.
    pub fn offset(&self, face: BlockFace, distance: i32) -> Self {
        let (dx, dy, dz) = face.direction();
        Self {
            world: self.world,
            x: self.x + dx * distance,
            y: self.y + dy * distance,
            z: self.z + dz * distance,
        }
    }

    /// Coordinates of the 16x16 column containing this block.
    pub fn column(&self) -> (i32, i32) {
        (self.x >> 4, self.z >> 4)
    }
}

impl std::fmt::Display for BlockPos {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// The six faces of a block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BlockFace {
    North,
    South,
    East,
    West,
    Up,
    Down,
}

impl BlockFace {
    pub const ALL: [BlockFace; 6] = [
        BlockFace::North,
        BlockFace::South,
        BlockFace::West,
        BlockFace::East,
        BlockFace::Up,
        BlockFace::Down,
    ];

    /// Unit step along the face normal.
    pub fn direction(&self) -> (i32, i32, i32) {
        match self {
            BlockFace::North => (0, 0, -1),
            BlockFace::South => (0, 0, 1),
            BlockFace::East => (1, 0, 0),
            BlockFace::West => (-1, 0, 0),
            BlockFace::Up => (0, 1, 0),
            BlockFace::Down => (0, -1, 0),
        }
    }

    pub fn opposite(&self) -> Self {
        match self {
            BlockFace::North => BlockFace::South,
            BlockFace::South => BlockFace::North,
            BlockFace::East => BlockFace::West,
            BlockFace::West => BlockFace::East,
            BlockFace::Up => BlockFace::Down,
            BlockFace::Down => BlockFace::Up,
        }
    }

    pub fn is_vertical(&self) -> bool {
        matches!(self, BlockFace::Up | BlockFace::Down)
    }
}

/// A block's material at a position, captured when a notification was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BlockSnapshot {
    pub pos: BlockPos,
    pub material: Material,
}

impl BlockSnapshot {
    /// Create a new block snapshot.
    pub fn new(pos: BlockPos, material: Material) -> Self {
        Self { pos, material }
    }

    /// An empty block at the position.
    pub fn air(pos: BlockPos) -> Self {
        Self::new(pos, Material::Air)
    }

    pub fn is_air(&self) -> bool {
        self.material.is_air()
    }

    pub fn world(&self) -> WorldId {
        self.pos.world
    }
}

impl std::fmt::Display for BlockSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.material, self.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_positions() {
        let origin = BlockPos::new(WorldId::nil(), 0, 64, 0);

        assert_eq!(origin.relative(BlockFace::Up).y, 65);
        assert_eq!(origin.relative(BlockFace::North).z, -1);
        assert_eq!(origin.offset(BlockFace::East, 3).x, 3);
    }

    #[test]
    fn test_opposite_faces() {
        for face in BlockFace::ALL {
            assert_eq!(face.opposite().opposite(), face);
            assert_ne!(face.opposite(), face);
        }
    }

    #[test]
    fn test_column_of_negative_coordinates() {
        let pos = BlockPos::new(WorldId::nil(), -1, 10, 17);
        assert_eq!(pos.column(), (-1, 1));
    }

    #[test]
    fn test_snapshot_air() {
        let pos = BlockPos::new(WorldId::nil(), 5, 5, 5);
        assert!(BlockSnapshot::air(pos).is_air());
        assert!(!BlockSnapshot::new(pos, Material::Stone).is_air());
    }
}
