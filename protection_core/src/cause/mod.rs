//! Cause chains - who is responsible for an action.
//!
//! A cause is an ordered list of actors, immediate actor first. Indirect
//! effects append the actor that set them in motion, e.g. a falling block
//! followed by the block it fell from. The empty chain is the unknown cause
//! used for system-triggered effects.

mod tracker;

pub use tracker::*;

use serde::{Deserialize, Serialize};
use world_rules::{BlockPos, BlockSnapshot, EntityRef, WorldId};

/// A single responsible party.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Actor {
    Entity(EntityRef),
    Block(BlockSnapshot),
}

impl Actor {
    /// Position of the actor when the notification was raised.
    pub fn pos(&self) -> BlockPos {
        match self {
            Actor::Entity(entity) => entity.pos,
            Actor::Block(block) => block.pos,
        }
    }

    pub fn world(&self) -> WorldId {
        self.pos().world
    }

    /// The actor as a player, if it is one.
    pub fn as_player(&self) -> Option<&EntityRef> {
        match self {
            Actor::Entity(entity) if entity.is_player() => Some(entity),
            _ => None,
        }
    }

    pub fn as_entity(&self) -> Option<&EntityRef> {
        match self {
            Actor::Entity(entity) => Some(entity),
            Actor::Block(_) => None,
        }
    }
}

impl From<EntityRef> for Actor {
    fn from(entity: EntityRef) -> Self {
        Actor::Entity(entity)
    }
}

impl From<BlockSnapshot> for Actor {
    fn from(block: BlockSnapshot) -> Self {
        Actor::Block(block)
    }
}

impl std::fmt::Display for Actor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Actor::Entity(entity) => write!(f, "{}", entity),
            Actor::Block(block) => write!(f, "{}", block),
        }
    }
}

/// Ordered responsibility chain attached to an intent. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cause {
    actors: Vec<Actor>,
}

impl Cause {
    /// Build a cause from explicit actors, immediate actor first.
    pub fn create(actors: impl IntoIterator<Item = Actor>) -> Self {
        Self {
            actors: actors.into_iter().collect(),
        }
    }

    /// Cause of a single actor.
    pub fn of(actor: impl Into<Actor>) -> Self {
        Self {
            actors: vec![actor.into()],
        }
    }

    /// The anonymous cause for effects nobody can be blamed for.
    pub fn unknown() -> Self {
        Self::default()
    }

    pub fn is_known(&self) -> bool {
        !self.actors.is_empty()
    }

    /// The immediate actor.
    pub fn root(&self) -> Option<&Actor> {
        self.actors.first()
    }

    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    /// The first player anywhere in the chain.
    pub fn first_player(&self) -> Option<&EntityRef> {
        self.actors.iter().find_map(Actor::as_player)
    }

    /// Where the chain originates: the position of the immediate actor.
    pub fn origin(&self) -> Option<BlockPos> {
        self.root().map(Actor::pos)
    }

    pub fn contains(&self, actor: &Actor) -> bool {
        self.actors.contains(actor)
    }
}

impl std::fmt::Display for Cause {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.actors.is_empty() {
            return f.write_str("unknown");
        }
        for (i, actor) in self.actors.iter().enumerate() {
            if i > 0 {
                f.write_str(" <- ")?;
            }
            write!(f, "{}", actor)?;
        }
        Ok(())
    }
}
