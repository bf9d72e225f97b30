//! The intent type handed to policies.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use world_rules::{
    BlockPos, BlockSnapshot, EntityKind, EntityRef, Flag, ItemStack, Material, WorldId,
};

use super::Cancellable;
use crate::cause::Cause;

/// The canonical action kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IntentKind {
    Break,
    Place,
    UseBlock,
    UseItem,
    UseEntity,
    Spawn,
    Destroy,
    Damage,
}

impl std::fmt::Display for IntentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            IntentKind::Break => "break",
            IntentKind::Place => "place",
            IntentKind::UseBlock => "use-block",
            IntentKind::UseItem => "use-item",
            IntentKind::UseEntity => "use-entity",
            IntentKind::Spawn => "spawn",
            IntentKind::Destroy => "destroy",
            IntentKind::Damage => "damage",
        };
        f.write_str(name)
    }
}

/// What an intent acts upon.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Target {
    /// A block, with the material relevant to the action: the prior content
    /// for breaks, the new content for places.
    Block(BlockSnapshot),
    Entity(EntityRef),
    /// An entity that does not exist yet.
    EntityType { kind: EntityKind, at: BlockPos },
    /// No location, only the world (item use).
    World(WorldId),
}

impl Target {
    pub fn location(&self) -> Option<BlockPos> {
        match self {
            Target::Block(block) => Some(block.pos),
            Target::Entity(entity) => Some(entity.pos),
            Target::EntityType { at, .. } => Some(*at),
            Target::World(_) => None,
        }
    }

    pub fn world(&self) -> WorldId {
        match self {
            Target::Block(block) => block.world(),
            Target::Entity(entity) => entity.world(),
            Target::EntityType { at, .. } => at.world,
            Target::World(world) => *world,
        }
    }

    /// The targeted entity, if it is a player.
    pub fn player(&self) -> Option<&EntityRef> {
        match self {
            Target::Entity(entity) if entity.is_player() => Some(entity),
            _ => None,
        }
    }
}

/// Extra data describing what is used or produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Payload {
    #[default]
    None,
    Material(Material),
    Item(ItemStack),
}

/// A canonical action awaiting a decision.
#[derive(Debug, Clone)]
pub struct Intent {
    pub kind: IntentKind,
    pub cause: Cause,
    pub target: Target,
    pub payload: Payload,
    /// Pre-approval; an allowed intent is never cancelled.
    pub allowed: bool,
    /// Suppresses denial feedback.
    pub silent: bool,
    /// Flags checked in addition to those implied by the kind.
    pub relevant_flags: BTreeSet<Flag>,
    cancelled: bool,
}

impl Intent {
    /// Create a new intent.
    pub fn new(kind: IntentKind, cause: Cause, target: Target) -> Self {
        Self {
            kind,
            cause,
            target,
            payload: Payload::None,
            allowed: false,
            silent: false,
            relevant_flags: BTreeSet::new(),
            cancelled: false,
        }
    }

    /// Break a block; `block` carries the material being removed.
    pub fn break_block(cause: Cause, block: BlockSnapshot) -> Self {
        Self::new(IntentKind::Break, cause, Target::Block(block))
    }

    /// Place a block; `block` carries the material being placed.
    pub fn place_block(cause: Cause, block: BlockSnapshot) -> Self {
        Self::new(IntentKind::Place, cause, Target::Block(block))
    }

    pub fn use_block(cause: Cause, block: BlockSnapshot) -> Self {
        Self::new(IntentKind::UseBlock, cause, Target::Block(block))
    }

    /// Use an item; item use has no location.
    pub fn use_item(cause: Cause, world: WorldId, item: ItemStack) -> Self {
        Self::new(IntentKind::UseItem, cause, Target::World(world))
            .with_payload(Payload::Item(item))
    }

    pub fn use_entity(cause: Cause, entity: EntityRef) -> Self {
        Self::new(IntentKind::UseEntity, cause, Target::Entity(entity))
    }

    pub fn spawn_entity(cause: Cause, entity: EntityRef) -> Self {
        Self::new(IntentKind::Spawn, cause, Target::Entity(entity))
    }

    /// Spawn an entity that has no snapshot yet.
    pub fn spawn_type(cause: Cause, kind: EntityKind, at: BlockPos) -> Self {
        Self::new(IntentKind::Spawn, cause, Target::EntityType { kind, at })
    }

    pub fn destroy_entity(cause: Cause, entity: EntityRef) -> Self {
        Self::new(IntentKind::Destroy, cause, Target::Entity(entity))
    }

    pub fn damage_entity(cause: Cause, entity: EntityRef) -> Self {
        Self::new(IntentKind::Damage, cause, Target::Entity(entity))
    }

    /// Set the payload.
    pub fn with_payload(mut self, payload: Payload) -> Self {
        self.payload = payload;
        self
    }

    /// Set the pre-approval.
    pub fn with_allowed(mut self, allowed: bool) -> Self {
        self.allowed = allowed;
        self
    }

    /// Set whether denial feedback is suppressed.
    pub fn with_silent(mut self, silent: bool) -> Self {
        self.silent = silent;
        self
    }

    /// Add a flag to check.
    pub fn with_relevant_flag(mut self, flag: Flag) -> Self {
        self.relevant_flags.insert(flag);
        self
    }

    pub fn location(&self) -> Option<BlockPos> {
        self.target.location()
    }

    pub fn world(&self) -> WorldId {
        self.target.world()
    }

    /// Where denial feedback should be shown.
    pub fn feedback_location(&self) -> Option<BlockPos> {
        self.location().or_else(|| self.cause.origin())
    }

    /// Deny the intent. Has no effect on an allowed intent.
    pub fn cancel(&mut self) {
        self.set_cancelled(true);
    }
}

impl Cancellable for Intent {
    fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    fn set_cancelled(&mut self, cancelled: bool) {
        if cancelled && self.allowed {
            return;
        }
        self.cancelled = cancelled;
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} by [{}]", self.kind, self.cause)?;
        if let Some(at) = self.location() {
            write!(f, " at {}", at)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stone() -> BlockSnapshot {
        BlockSnapshot::new(BlockPos::new(WorldId::nil(), 1, 2, 3), Material::Stone)
    }

    #[test]
    fn test_allowed_intent_cannot_be_cancelled() {
        let mut intent = Intent::break_block(Cause::unknown(), stone()).with_allowed(true);
        intent.cancel();
        assert!(!intent.is_cancelled());
    }

    #[test]
    fn test_cancel() {
        let mut intent = Intent::place_block(Cause::unknown(), stone());
        intent.cancel();
        assert!(intent.is_cancelled());
    }

    #[test]
    fn test_item_use_has_no_location() {
        let world = WorldId::new();
        let intent = Intent::use_item(Cause::unknown(), world, ItemStack::single(Material::Bow));

        assert_eq!(intent.location(), None);
        assert_eq!(intent.world(), world);
        assert_eq!(intent.payload, Payload::Item(ItemStack::single(Material::Bow)));
    }

    #[test]
    fn test_feedback_location_falls_back_to_cause() {
        let player = EntityRef::player(BlockPos::new(WorldId::nil(), 7, 64, 7));
        let bow = ItemStack::single(Material::Bow);
        let intent = Intent::use_item(Cause::of(player.clone()), WorldId::nil(), bow);

        assert_eq!(intent.feedback_location(), Some(player.pos));
    }

    #[test]
    fn test_relevant_flags() {
        let intent = Intent::use_block(Cause::unknown(), stone())
            .with_relevant_flag(Flag::PotionSplash)
            .with_relevant_flag(Flag::PotionSplash);
        assert_eq!(intent.relevant_flags.len(), 1);
    }

    #[test]
    fn test_display() {
        let intent = Intent::break_block(Cause::unknown(), stone());
        assert_eq!(intent.to_string(), "break by [unknown] at (1, 2, 3)");
    }
}
