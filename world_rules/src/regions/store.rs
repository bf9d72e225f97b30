//! Region store - per-world snapshots of region sets.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use super::RegionSet;
use crate::error::RegionError;
use crate::world_state::WorldId;

/// Shared handle to the region sets of every world.
///
/// Readers take an immutable snapshot per query; edits are applied to a copy
/// and published as a whole, so a reader never observes a half-applied edit.
/// The store lives on the single event-processing thread, hence `Rc`.
#[derive(Debug, Clone, Default)]
pub struct RegionStore {
    worlds: Rc<RefCell<HashMap<WorldId, Rc<RegionSet>>>>,
}

impl RegionStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot of a world's regions, if the world has any.
    pub fn snapshot(&self, world: WorldId) -> Option<Rc<RegionSet>> {
        self.worlds.borrow().get(&world).cloned()
    }

    /// Replace a world's regions.
    pub fn publish(&self, world: WorldId, mut regions: RegionSet) {
        regions.reindex();
        self.worlds.borrow_mut().insert(world, Rc::new(regions));
    }

    /// Apply an edit to a copy of the world's regions and publish it on success.
    ///
    /// On error nothing is published.
    pub fn edit<T>(
        &self,
        world: WorldId,
        edit: impl FnOnce(&mut RegionSet) -> Result<T, RegionError>,
    ) -> Result<T, RegionError> {
        let mut draft = self
            .snapshot(world)
            .map(|current| (*current).clone())
            .unwrap_or_default();

        let result = edit(&mut draft)?;
        self.worlds.borrow_mut().insert(world, Rc::new(draft));
        Ok(result)
    }

    /// Drop a world's regions.
    pub fn unload(&self, world: WorldId) -> Option<Rc<RegionSet>> {
        self.worlds.borrow_mut().remove(&world)
    }
}
