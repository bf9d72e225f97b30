//! Raw notifications as delivered by the host.
//!
//! Each struct carries what its handler needs to extract causes and targets,
//! a cancellation flag, and the outcome fields the handler may write back.

use world_rules::{BlockFace, BlockPos, BlockSnapshot, EntityRef, ItemStack, Material};

use crate::debounce::{DebounceSource, HolderKey, InventoryMoveKey};
use crate::event::{BatchNotification, Cancellable};

/// A block changing from one state to another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockTransaction {
    pub original: BlockSnapshot,
    pub replacement: BlockSnapshot,
}

impl BlockTransaction {
    pub fn new(original: BlockSnapshot, replacement: Material) -> Self {
        Self {
            original,
            replacement: BlockSnapshot::new(original.pos, replacement),
        }
    }
}

/// A player breaking blocks.
#[derive(Debug, Clone)]
pub struct BlockBreak {
    pub player: Option<EntityRef>,
    pub transactions: Vec<BlockTransaction>,
    pub cancelled: bool,
}

/// A player placing blocks, possibly replacing what was there.
#[derive(Debug, Clone)]
pub struct BlockPlace {
    pub player: Option<EntityRef>,
    pub transactions: Vec<BlockTransaction>,
    pub cancelled: bool,
}

/// A block about to burn away.
#[derive(Debug, Clone)]
pub struct BlockBurn {
    pub block: BlockSnapshot,
    /// The six neighbours; fire among them is what burns the block.
    pub neighbours: Vec<BlockSnapshot>,
    /// Fire blocks the host should put out.
    pub extinguish: Vec<BlockPos>,
    pub cancelled: bool,
}

/// A sapling or mushroom growing into a structure.
#[derive(Debug, Clone)]
pub struct StructureGrow {
    pub origin: BlockSnapshot,
    /// Player applying bone meal, if any.
    pub player: Option<EntityRef>,
    pub blocks: Vec<BlockSnapshot>,
    /// Set when part of the structure was refused; the host clears the origin.
    pub clear_origin: bool,
    pub cancelled: bool,
}

/// An entity turning a block into something else (endermen, falling blocks,
/// sheep eating grass).
#[derive(Debug, Clone)]
pub struct EntityChangeBlock {
    pub entity: EntityRef,
    pub block: BlockSnapshot,
    pub to: Material,
    /// Set when a refused falling block should drop as an item instead.
    pub drop_item: bool,
    pub cancelled: bool,
}

/// An explosion destroying blocks.
#[derive(Debug, Clone)]
pub struct Explosion {
    pub source: Option<EntityRef>,
    pub at: BlockPos,
    pub blocks: Vec<BlockSnapshot>,
    pub cancelled: bool,
}

/// A piston pushing blocks.
#[derive(Debug, Clone)]
pub struct PistonExtend {
    pub piston: BlockSnapshot,
    pub direction: BlockFace,
    /// Pushed blocks, nearest first.
    pub blocks: Vec<BlockSnapshot>,
    pub cancelled: bool,
}

/// A piston retracting.
#[derive(Debug, Clone)]
pub struct PistonRetract {
    pub piston: BlockSnapshot,
    pub direction: BlockFace,
    pub sticky: bool,
    /// Block pulled back by a sticky piston.
    pub retract_location: BlockSnapshot,
    pub cancelled: bool,
}

/// A player starting to damage a block.
#[derive(Debug, Clone)]
pub struct BlockDamage {
    pub player: EntityRef,
    pub block: BlockSnapshot,
    pub cancelled: bool,
}

/// How a player interacted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractAction {
    /// Stepping on something.
    Physical,
    LeftClickBlock,
    RightClickBlock,
    LeftClickAir,
    RightClickAir,
}

/// A player clicking or stepping.
#[derive(Debug, Clone)]
pub struct PlayerInteract {
    pub player: EntityRef,
    pub action: InteractAction,
    pub item: Option<ItemStack>,
    pub clicked: Option<BlockSnapshot>,
    pub face: BlockFace,
    /// The block on the clicked face.
    pub adjacent: Option<BlockSnapshot>,
    /// Other halves of multi-block structures (doors, beds, double chests).
    pub connected: Vec<BlockSnapshot>,
    /// The block the player stands in.
    pub feet: BlockSnapshot,
    pub deny_use_block: bool,
    pub deny_use_item: bool,
    pub cancelled: bool,
}

impl PlayerInteract {
    /// A click on a block face.
    pub fn click(
        player: EntityRef,
        action: InteractAction,
        clicked: BlockSnapshot,
        face: BlockFace,
    ) -> Self {
        let feet = BlockSnapshot::air(player.pos);
        Self {
            player,
            action,
            item: None,
            clicked: Some(clicked),
            face,
            adjacent: Some(BlockSnapshot::air(clicked.pos.relative(face))),
            connected: Vec::new(),
            feet,
            deny_use_block: false,
            deny_use_item: false,
            cancelled: false,
        }
    }

    /// Stepping on a block.
    pub fn physical(player: EntityRef, block: BlockSnapshot) -> Self {
        Self::click(player, InteractAction::Physical, block, BlockFace::Up)
    }

    /// Set the held item.
    pub fn with_item(mut self, item: ItemStack) -> Self {
        self.item = Some(item);
        self
    }
}

/// A non-player entity interacting with a block (trampling farmland).
#[derive(Debug, Clone)]
pub struct EntityInteract {
    pub entity: EntityRef,
    pub block: BlockSnapshot,
    pub cancelled: bool,
}

/// Fire starting.
#[derive(Debug, Clone)]
pub struct BlockIgnite {
    pub block: BlockSnapshot,
    pub player: Option<EntityRef>,
    pub igniting_entity: Option<EntityRef>,
    pub igniting_block: Option<BlockSnapshot>,
    pub cancelled: bool,
}

#[derive(Debug, Clone)]
pub struct SignChange {
    pub player: Option<EntityRef>,
    pub sign: BlockSnapshot,
    pub cancelled: bool,
}

#[derive(Debug, Clone)]
pub struct BedEnter {
    pub player: EntityRef,
    pub bed: BlockSnapshot,
    pub cancelled: bool,
}

/// A bucket being emptied or filled.
#[derive(Debug, Clone)]
pub struct BucketUse {
    pub player: EntityRef,
    pub bucket: Material,
    /// The block that receives or loses liquid.
    pub affected: BlockSnapshot,
    pub cancelled: bool,
}

/// Liquid spreading from one block into another.
#[derive(Debug, Clone)]
pub struct LiquidFlow {
    pub from: BlockSnapshot,
    pub to: BlockSnapshot,
    pub cancelled: bool,
}

/// Creatures spawning.
#[derive(Debug, Clone)]
pub struct CreatureSpawn {
    /// The entity responsible (a thrown egg), if any.
    pub spawner: Option<EntityRef>,
    pub entities: Vec<EntityRef>,
    pub cancelled: bool,
}

/// A player hanging a painting or item frame.
#[derive(Debug, Clone)]
pub struct HangingPlace {
    pub player: EntityRef,
    pub entity: EntityRef,
    pub cancelled: bool,
}

#[derive(Debug, Clone)]
pub struct HangingBreak {
    pub remover: Option<EntityRef>,
    pub entity: EntityRef,
    pub cancelled: bool,
}

/// A vehicle being destroyed or damaged.
#[derive(Debug, Clone)]
pub struct VehicleDamage {
    pub attacker: Option<EntityRef>,
    pub vehicle: EntityRef,
    /// Destroyed outright rather than damaged.
    pub destroyed: bool,
    pub cancelled: bool,
}

#[derive(Debug, Clone)]
pub struct VehicleEnter {
    pub entity: EntityRef,
    pub vehicle: EntityRef,
    pub cancelled: bool,
}

/// Where dropped experience comes from.
#[derive(Debug, Clone)]
pub enum ExperienceSource {
    Block(BlockSnapshot),
    Fishing { player: EntityRef, hook: EntityRef },
    Death(EntityRef),
    Bottle(EntityRef),
}

/// Experience about to drop. A refusal zeroes the amount.
#[derive(Debug, Clone)]
pub struct ExperienceDrop {
    pub source: ExperienceSource,
    pub at: BlockPos,
    pub amount: u32,
}

#[derive(Debug, Clone)]
pub struct PlayerInteractEntity {
    pub player: EntityRef,
    pub item: Option<ItemStack>,
    pub entity: EntityRef,
    pub cancelled: bool,
}

/// What is hurting an entity.
#[derive(Debug, Clone)]
pub enum Damager {
    Block(BlockSnapshot),
    Entity(EntityRef),
    Unknown,
}

/// An entity taking damage or catching fire.
#[derive(Debug, Clone)]
pub struct EntityDamage {
    pub damager: Damager,
    pub target: EntityRef,
    /// Item held by a player damager.
    pub held_item: Option<ItemStack>,
    /// Set on fire rather than hit.
    pub combust: bool,
    pub cancelled: bool,
}

/// A player (or other entity) using an entity: unleash, tame or shear.
#[derive(Debug, Clone)]
pub struct EntityUse {
    pub user: Option<EntityRef>,
    pub entity: EntityRef,
    pub cancelled: bool,
}

/// An entity leaving the world: despawned, killed or unloaded.
#[derive(Debug, Clone)]
pub struct EntityRemove {
    pub entity: EntityRef,
}

/// A player picking up or dropping item entities.
#[derive(Debug, Clone)]
pub struct ItemTransfer {
    pub player: Option<EntityRef>,
    pub items: Vec<EntityRef>,
    pub cancelled: bool,
}

#[derive(Debug, Clone)]
pub struct ItemConsume {
    pub player: Option<EntityRef>,
    pub item: ItemStack,
    pub cancelled: bool,
}

/// Owner of an inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryHolder {
    Block(BlockSnapshot),
    Entity(EntityRef),
    DoubleChest(BlockSnapshot, BlockSnapshot),
    /// Inventories not attached to the world.
    Virtual,
}

impl InventoryHolder {
    pub fn key(&self) -> Option<HolderKey> {
        match self {
            InventoryHolder::Block(block) | InventoryHolder::DoubleChest(block, _) => {
                Some(HolderKey::Block(block.pos))
            }
            InventoryHolder::Entity(entity) => Some(HolderKey::Entity(entity.id)),
            InventoryHolder::Virtual => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct InventoryOpen {
    pub player: EntityRef,
    pub holder: InventoryHolder,
    pub cancelled: bool,
}

/// Items moving between inventories (hoppers, droppers).
#[derive(Debug, Clone)]
pub struct InventoryMove {
    pub source: InventoryHolder,
    pub destination: InventoryHolder,
    pub initiator: InventoryHolder,
    /// Set when a refused hopper should be broken.
    pub break_initiator: bool,
    pub cancelled: bool,
}

impl InventoryMove {
    pub fn new(
        source: InventoryHolder,
        destination: InventoryHolder,
        initiator: InventoryHolder,
    ) -> Self {
        Self {
            source,
            destination,
            initiator,
            break_initiator: false,
            cancelled: false,
        }
    }
}

impl DebounceSource for InventoryMove {
    type Key = InventoryMoveKey;

    fn debounce_key(&self) -> Option<InventoryMoveKey> {
        Some(InventoryMoveKey {
            source: self.source.key()?,
            destination: self.destination.key()?,
            initiator: self.initiator.key()?,
        })
    }
}

/// An entity hit by a splash potion.
#[derive(Debug, Clone)]
pub struct Affected {
    pub entity: EntityRef,
    pub intensity: f64,
}

#[derive(Debug, Clone)]
pub struct PotionSplash {
    pub potion: EntityRef,
    pub shooter: Option<EntityRef>,
    pub item: ItemStack,
    /// The potion carries a damaging effect.
    pub harmful: bool,
    pub affected: Vec<Affected>,
    pub cancelled: bool,
}

/// A dispenser firing an item.
#[derive(Debug, Clone)]
pub struct BlockDispense {
    pub dispenser: BlockSnapshot,
    pub facing: BlockFace,
    pub item: ItemStack,
    /// The block in front of the dispenser.
    pub placed: BlockSnapshot,
    /// The block behind `placed`, which the item is used against.
    pub clicked: BlockSnapshot,
    pub cancelled: bool,
}

macro_rules! impl_cancellable {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Cancellable for $ty {
                fn is_cancelled(&self) -> bool {
                    self.cancelled
                }

                fn set_cancelled(&mut self, cancelled: bool) {
                    self.cancelled = cancelled;
                }
            }
        )*
    };
}

impl_cancellable!(
    BlockBreak,
    BlockPlace,
    BlockBurn,
    StructureGrow,
    EntityChangeBlock,
    Explosion,
    PistonExtend,
    PistonRetract,
    BlockDamage,
    PlayerInteract,
    EntityInteract,
    BlockIgnite,
    SignChange,
    BedEnter,
    BucketUse,
    LiquidFlow,
    CreatureSpawn,
    HangingPlace,
    HangingBreak,
    VehicleDamage,
    VehicleEnter,
    PlayerInteractEntity,
    EntityDamage,
    EntityUse,
    ItemTransfer,
    ItemConsume,
    InventoryOpen,
    InventoryMove,
    PotionSplash,
    BlockDispense,
);

/// Experience drops cannot be vetoed, only zeroed.
impl Cancellable for ExperienceDrop {
    fn is_cancelled(&self) -> bool {
        self.amount == 0
    }

    fn set_cancelled(&mut self, cancelled: bool) {
        if cancelled {
            self.amount = 0;
        }
    }
}

/// Removal is only observed, never vetoed.
impl Cancellable for EntityRemove {
    fn is_cancelled(&self) -> bool {
        false
    }

    fn set_cancelled(&mut self, _cancelled: bool) {}
}

impl BatchNotification for StructureGrow {
    type Entry = BlockSnapshot;

    fn entries(&self) -> &[BlockSnapshot] {
        &self.blocks
    }

    fn retain_entries<F>(&mut self, keep: F)
    where
        F: FnMut(&BlockSnapshot) -> bool,
    {
        self.blocks.retain(keep);
    }
}

impl BatchNotification for Explosion {
    type Entry = BlockSnapshot;

    fn entries(&self) -> &[BlockSnapshot] {
        &self.blocks
    }

    fn retain_entries<F>(&mut self, keep: F)
    where
        F: FnMut(&BlockSnapshot) -> bool,
    {
        self.blocks.retain(keep);
    }
}

/// Every notification kind the dispatcher understands.
#[derive(Debug, Clone)]
pub enum RawNotification {
    BlockBreak(BlockBreak),
    BlockPlace(BlockPlace),
    BlockBurn(BlockBurn),
    StructureGrow(StructureGrow),
    EntityChangeBlock(EntityChangeBlock),
    Explosion(Explosion),
    PistonExtend(PistonExtend),
    PistonRetract(PistonRetract),
    BlockDamage(BlockDamage),
    PlayerInteract(PlayerInteract),
    EntityInteract(EntityInteract),
    BlockIgnite(BlockIgnite),
    SignChange(SignChange),
    BedEnter(BedEnter),
    BucketEmpty(BucketUse),
    BucketFill(BucketUse),
    LiquidFlow(LiquidFlow),
    CreatureSpawn(CreatureSpawn),
    HangingPlace(HangingPlace),
    HangingBreak(HangingBreak),
    VehicleDamage(VehicleDamage),
    VehicleEnter(VehicleEnter),
    ExperienceDrop(ExperienceDrop),
    PlayerInteractEntity(PlayerInteractEntity),
    EntityDamage(EntityDamage),
    EntityUnleash(EntityUse),
    EntityTame(EntityUse),
    EntityShear(EntityUse),
    EntityRemove(EntityRemove),
    ItemPickup(ItemTransfer),
    ItemDrop(ItemTransfer),
    ItemConsume(ItemConsume),
    InventoryOpen(InventoryOpen),
    InventoryMove(InventoryMove),
    PotionSplash(PotionSplash),
    BlockDispense(BlockDispense),
}

/// Expands to a match binding the inner notification of every variant.
macro_rules! each_raw {
    ($value:expr, $raw:ident => $body:expr) => {
        match $value {
            RawNotification::BlockBreak($raw) => $body,
            RawNotification::BlockPlace($raw) => $body,
            RawNotification::BlockBurn($raw) => $body,
            RawNotification::StructureGrow($raw) => $body,
            RawNotification::EntityChangeBlock($raw) => $body,
            RawNotification::Explosion($raw) => $body,
            RawNotification::PistonExtend($raw) => $body,
            RawNotification::PistonRetract($raw) => $body,
            RawNotification::BlockDamage($raw) => $body,
            RawNotification::PlayerInteract($raw) => $body,
            RawNotification::EntityInteract($raw) => $body,
            RawNotification::BlockIgnite($raw) => $body,
            RawNotification::SignChange($raw) => $body,
            RawNotification::BedEnter($raw) => $body,
            RawNotification::BucketEmpty($raw) | RawNotification::BucketFill($raw) => $body,
            RawNotification::LiquidFlow($raw) => $body,
            RawNotification::CreatureSpawn($raw) => $body,
            RawNotification::HangingPlace($raw) => $body,
            RawNotification::HangingBreak($raw) => $body,
            RawNotification::VehicleDamage($raw) => $body,
            RawNotification::VehicleEnter($raw) => $body,
            RawNotification::ExperienceDrop($raw) => $body,
            RawNotification::PlayerInteractEntity($raw) => $body,
            RawNotification::EntityDamage($raw) => $body,
            RawNotification::EntityUnleash($raw)
            | RawNotification::EntityTame($raw)
            | RawNotification::EntityShear($raw) => $body,
            RawNotification::EntityRemove($raw) => $body,
            RawNotification::ItemPickup($raw) | RawNotification::ItemDrop($raw) => $body,
            RawNotification::ItemConsume($raw) => $body,
            RawNotification::InventoryOpen($raw) => $body,
            RawNotification::InventoryMove($raw) => $body,
            RawNotification::PotionSplash($raw) => $body,
            RawNotification::BlockDispense($raw) => $body,
        }
    };
}

impl Cancellable for RawNotification {
    fn is_cancelled(&self) -> bool {
        each_raw!(self, raw => raw.is_cancelled())
    }

    fn set_cancelled(&mut self, cancelled: bool) {
        each_raw!(self, raw => raw.set_cancelled(cancelled))
    }
}
