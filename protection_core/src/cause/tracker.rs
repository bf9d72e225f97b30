//! Short-lived correlation table linking newly created entities to the
//! actor that produced them.

use std::collections::HashMap;

use world_rules::EntityId;

use super::{Actor, Cause};

/// Associations beyond this count are evicted oldest first.
pub const MAX_TRACKED_PARENTS: usize = 4096;

/// Tracks parent causes across notifications.
///
/// An association is written once when an entity is created from another
/// actor (a block starting to fall) and removed by the next cause built for
/// that entity, so it never outlives the logical action.
#[derive(Debug, Default)]
pub struct CauseTracker {
    parents: HashMap<EntityId, (Actor, u64)>,
    sequence: u64,
}

impl CauseTracker {
    /// Create an empty tracker.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `parent` is responsible for the entity `child`.
    pub fn track_parent_cause(&mut self, child: EntityId, parent: impl Into<Actor>) {
        self.sequence += 1;
        self.parents.insert(child, (parent.into(), self.sequence));

        if self.parents.len() > MAX_TRACKED_PARENTS {
            let oldest = self
                .parents
                .iter()
                .min_by_key(|(_, (_, seq))| *seq)
                .map(|(id, _)| *id);
            if let Some(oldest) = oldest {
                tracing::warn!(entity = %oldest, "evicting unconsumed parent cause");
                self.parents.remove(&oldest);
            }
        }
    }

    /// Remove and return the parent tracked for an entity.
    pub fn take_parent(&mut self, child: EntityId) -> Option<Actor> {
        self.parents.remove(&child).map(|(parent, _)| parent)
    }

    /// Peek at the parent without consuming it.
    pub fn parent_of(&self, child: EntityId) -> Option<&Actor> {
        self.parents.get(&child).map(|(parent, _)| parent)
    }

    /// Build a cause, expanding every entity with a tracked parent into
    /// `[entity, parent]` and consuming the association.
    pub fn create(&mut self, actors: impl IntoIterator<Item = Actor>) -> Cause {
        let mut chain = Vec::new();
        for actor in actors {
            let parent = actor.as_entity().and_then(|e| self.take_parent(e.id));
            chain.push(actor);
            chain.extend(parent);
        }
        Cause::create(chain)
    }

    /// Drop the association of an entity that left the world.
    pub fn forget(&mut self, child: EntityId) {
        self.parents.remove(&child);
    }

    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Drop every association (shutdown or reload).
    pub fn clear(&mut self) {
        self.parents.clear();
    }
}
