//! Materials: block and item types with the classification the
//! protection pipeline needs.

use serde::{Deserialize, Serialize};

/// Block and item types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Material {
    // Terrain
    Air,
    Stone,
    Dirt,
    Grass,
    TallGrass,
    /// Farmland.
    Soil,
    Sand,
    Gravel,
    Obsidian,
    Log,
    Leaves,
    Sapling,
    Crops,
    Cocoa,
    Pumpkin,

    // Fluids and fire
    Water,
    Lava,
    Fire,

    // Redstone
    RedstoneOre,
    GlowingRedstoneOre,
    RedstoneWire,
    Repeater,
    Comparator,
    Lever,
    StoneButton,
    StonePlate,
    Piston,
    StickyPiston,
    PistonHead,
    Tnt,

    // Containers and usable blocks
    Chest,
    TrappedChest,
    Furnace,
    Hopper,
    Dispenser,
    Dropper,
    Jukebox,
    NoteBlock,
    WoodenDoor,
    TrapDoor,
    FenceGate,
    Bed,
    Cake,
    Sign,
    Anvil,

    // Items
    FlintAndSteel,
    Bucket,
    WaterBucket,
    LavaBucket,
    MilkBucket,
    Minecart,
    StorageMinecart,
    Boat,
    SpawnEgg,
    CocoaBeans,
    BoneMeal,
    ExperienceBottle,
    Potion,
    SplashPotion,
    Bow,
    Arrow,
    Sword,
    Shears,
    Lead,
    Egg,
    FishingRod,
    Apple,
}

impl Material {
    /// Whether this material exists as a placed block.
    pub fn is_block(&self) -> bool {
        (*self as u8) <= (Material::Anvil as u8)
    }

    pub fn is_air(&self) -> bool {
        *self == Material::Air
    }

    pub fn is_water(&self) -> bool {
        *self == Material::Water
    }

    pub fn is_lava(&self) -> bool {
        *self == Material::Lava
    }

    pub fn is_liquid(&self) -> bool {
        self.is_water() || self.is_lava()
    }

    /// Blocks that fluids cannot flow into.
    pub fn is_solid(&self) -> bool {
        self.is_block()
            && !matches!(
                self,
                Material::Air
                    | Material::Water
                    | Material::Lava
                    | Material::Fire
                    | Material::TallGrass
                    | Material::Sapling
                    | Material::Crops
                    | Material::RedstoneWire
                    | Material::Repeater
                    | Material::Comparator
                    | Material::Lever
                    | Material::StoneButton
                    | Material::StonePlate
                    | Material::Sign
            )
    }

    pub fn is_redstone_ore(&self) -> bool {
        matches!(self, Material::RedstoneOre | Material::GlowingRedstoneOre)
    }

    /// Blocks with a container inventory.
    pub fn is_container(&self) -> bool {
        matches!(
            self,
            Material::Chest
                | Material::TrappedChest
                | Material::Furnace
                | Material::Hopper
                | Material::Dispenser
                | Material::Dropper
                | Material::Jukebox
        )
    }

    /// Whether clicking the block changes world state.
    pub fn is_block_modified_on_click(&self, right_click: bool) -> bool {
        match self {
            Material::Lever
            | Material::StoneButton
            | Material::WoodenDoor
            | Material::TrapDoor
            | Material::FenceGate
            | Material::Repeater
            | Material::Comparator
            | Material::NoteBlock
            | Material::Cake
            | Material::Bed
            | Material::Anvil
            | Material::Tnt => right_click,
            m if m.is_container() => right_click,
            // Punching fire puts it out
            Material::Fire => !right_click,
            _ => false,
        }
    }

    /// Whether using this item on the given block modifies the block.
    pub fn is_item_applied_to_block(&self, block: Material) -> bool {
        match self {
            Material::FlintAndSteel => true,
            Material::BoneMeal => matches!(
                block,
                Material::Sapling | Material::Crops | Material::Grass | Material::Cocoa
            ),
            Material::CocoaBeans => block == Material::Log,
            Material::Shears => block == Material::Pumpkin,
            Material::SpawnEgg
            | Material::Minecart
            | Material::StorageMinecart
            | Material::Boat => true,
            _ => false,
        }
    }

    pub fn is_minecart(&self) -> bool {
        matches!(self, Material::Minecart | Material::StorageMinecart)
    }

    /// Block created by emptying a bucket, or `None` for buckets that place nothing.
    pub fn bucket_block_material(&self) -> Option<Material> {
        match self {
            Material::WaterBucket => Some(Material::Water),
            Material::LavaBucket => Some(Material::Lava),
            _ => None,
        }
    }

    /// Item form of a placed block, used when a placement consumes an item.
    pub fn item_form(&self) -> Material {
        match self {
            Material::Water => Material::WaterBucket,
            Material::Lava => Material::LavaBucket,
            Material::Fire => Material::FlintAndSteel,
            Material::Cocoa => Material::CocoaBeans,
            other => *other,
        }
    }
}

impl std::fmt::Display for Material {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
