//! Region set - the validated region definitions of one world.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use super::{Flag, Region, RegionId, State};
use crate::entities::EntityId;
use crate::error::RegionError;
use crate::world_state::BlockPos;

/// Upper bound on parent-chain walks.
pub const MAX_PARENT_DEPTH: usize = 32;

/// Regions covering more columns than this are tested on every query
/// instead of being indexed per column.
pub const MAX_INDEXED_COLUMNS: i64 = 4096;

/// The regions of a single world.
///
/// Regions are stored by ID with a secondary index from 16x16 block columns
/// to the regions overlapping them, so containment queries only test the
/// handful of regions near the point.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct RegionSet {
    /// All regions stored by ID.
    regions: BTreeMap<RegionId, Region>,

    /// Index: column -> regions overlapping the column.
    #[serde(skip)]
    columns: HashMap<(i32, i32), Vec<RegionId>>,

    /// Regions tested on every query: global shapes and regions too wide to
    /// index per column.
    #[serde(skip)]
    unbounded: Vec<RegionId>,
}

impl RegionSet {
    /// Create a new empty region set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a new region.
    ///
    /// The parent, if any, must already exist. Since a new region has no
    /// children yet, adding one can never close a cycle.
    pub fn add(&mut self, region: Region) -> Result<(), RegionError> {
        if !region.id.is_valid() {
            return Err(RegionError::InvalidId(region.id.to_string()));
        }
        if !region.shape.is_valid() {
            return Err(RegionError::InvalidShape(region.id.clone()));
        }
        if self.regions.contains_key(&region.id) {
            return Err(RegionError::DuplicateRegion(region.id.clone()));
        }
        if let Some(parent) = &region.parent {
            if !self.regions.contains_key(parent) {
                return Err(RegionError::UnknownParent {
                    region: region.id.clone(),
                    parent: parent.clone(),
                });
            }
        }

        self.index(&region);
        self.regions.insert(region.id.clone(), region);
        Ok(())
    }

    /// Remove a region. Children of the removed region lose their parent.
    pub fn remove(&mut self, id: &RegionId) -> Result<Region, RegionError> {
        let region = self
            .regions
            .remove(id)
            .ok_or_else(|| RegionError::UnknownRegion(id.clone()))?;

        for child in self.regions.values_mut() {
            if child.parent.as_ref() == Some(id) {
                child.parent = None;
            }
        }

        self.unindex(&region);
        Ok(region)
    }

    /// Change the parent of a region, rejecting unknown parents and cycles.
    pub fn set_parent(
        &mut self,
        id: &RegionId,
        parent: Option<RegionId>,
    ) -> Result<(), RegionError> {
        if !self.regions.contains_key(id) {
            return Err(RegionError::UnknownRegion(id.clone()));
        }

        if let Some(parent_id) = &parent {
            if !self.regions.contains_key(parent_id) {
                return Err(RegionError::UnknownParent {
                    region: id.clone(),
                    parent: parent_id.clone(),
                });
            }

            // Walking up from the new parent must never reach the region itself
            let mut cursor = Some(parent_id);
            while let Some(current) = cursor {
                if current == id {
                    return Err(RegionError::ParentCycle {
                        region: id.clone(),
                        parent: parent_id.clone(),
                    });
                }
                cursor = self.regions.get(current).and_then(|r| r.parent.as_ref());
            }
        }

        if let Some(region) = self.regions.get_mut(id) {
            region.parent = parent;
        }
        Ok(())
    }

    /// Set or clear an explicit flag value.
    pub fn set_flag(
        &mut self,
        id: &RegionId,
        flag: Flag,
        state: Option<State>,
    ) -> Result<(), RegionError> {
        let region = self.get_mut(id)?;
        match state {
            Some(state) => region.flags.insert(flag, state),
            None => region.flags.remove(&flag),
        };
        Ok(())
    }

    /// Change the priority of a region.
    pub fn set_priority(&mut self, id: &RegionId, priority: i32) -> Result<(), RegionError> {
        self.get_mut(id)?.priority = priority;
        Ok(())
    }

    /// Add an owner to a region.
    pub fn add_owner(&mut self, id: &RegionId, player: EntityId) -> Result<(), RegionError> {
        self.get_mut(id)?.owners.insert(player);
        Ok(())
    }

    /// Add a member to a region.
    pub fn add_member(&mut self, id: &RegionId, player: EntityId) -> Result<(), RegionError> {
        self.get_mut(id)?.members.insert(player);
        Ok(())
    }

    /// Remove a player from both the owners and members of a region.
    pub fn remove_player(&mut self, id: &RegionId, player: EntityId) -> Result<(), RegionError> {
        let region = self.get_mut(id)?;
        region.owners.remove(&player);
        region.members.remove(&player);
        Ok(())
    }

    /// Get region by ID.
    pub fn get(&self, id: &RegionId) -> Option<&Region> {
        self.regions.get(id)
    }

    fn get_mut(&mut self, id: &RegionId) -> Result<&mut Region, RegionError> {
        self.regions
            .get_mut(id)
            .ok_or_else(|| RegionError::UnknownRegion(id.clone()))
    }

    /// All regions containing the block, highest priority first, ties by ID.
    pub fn regions_containing(&self, pos: BlockPos) -> Vec<&Region> {
        let column = self.columns.get(&pos.column());

        let mut found: Vec<&Region> = column
            .into_iter()
            .flatten()
            .chain(self.unbounded.iter())
            .filter_map(|id| self.regions.get(id))
            .filter(|region| region.shape.contains(pos))
            .collect();

        found.sort_by(|a, b| b.priority.cmp(&a.priority).then_with(|| a.id.cmp(&b.id)));
        found
    }

    /// The region followed by its ancestors, at most [`MAX_PARENT_DEPTH`] deep.
    pub fn lineage<'a>(&'a self, region: &'a Region) -> impl Iterator<Item = &'a Region> + 'a {
        std::iter::successors(Some(region), move |r| {
            r.parent.as_ref().and_then(|p| self.regions.get(p))
        })
        .take(MAX_PARENT_DEPTH)
    }

    /// Flag value of a region, inherited through its parent chain.
    ///
    /// Returns the value together with the ancestor that set it.
    pub fn effective_flag<'a>(
        &'a self,
        region: &'a Region,
        flag: Flag,
    ) -> Option<(State, &'a RegionId)> {
        let mut depth = 0;
        for ancestor in self.lineage(region) {
            depth += 1;
            if let Some(state) = ancestor.flag(flag) {
                return Some((state, &ancestor.id));
            }
        }
        if depth == MAX_PARENT_DEPTH {
            tracing::warn!(region = %region.id, %flag, "parent chain truncated at depth bound");
        }
        None
    }

    /// Whether the player owns the region or one of its ancestors.
    pub fn is_owner(&self, region: &Region, player: EntityId) -> bool {
        self.lineage(region).any(|r| r.has_owner(player))
    }

    /// Whether the player is a member or owner of the region or one of its ancestors.
    pub fn is_member(&self, region: &Region, player: EntityId) -> bool {
        self.lineage(region).any(|r| r.has_member(player))
    }

    /// Iterate over all regions in ID order.
    pub fn iter(&self) -> impl Iterator<Item = &Region> {
        self.regions.values()
    }

    /// Get the total number of regions.
    pub fn len(&self) -> usize {
        self.regions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.regions.is_empty()
    }

    /// Rebuild the column index, e.g. after deserialization.
    pub fn reindex(&mut self) {
        self.columns.clear();
        self.unbounded.clear();
        let regions: Vec<Region> = self.regions.values().cloned().collect();
        for region in &regions {
            self.index(region);
        }
    }

    fn index(&mut self, region: &Region) {
        match indexed_columns(region) {
            Some((lo, hi)) => {
                for cx in lo.0..=hi.0 {
                    for cz in lo.1..=hi.1 {
                        self.columns
                            .entry((cx, cz))
                            .or_default()
                            .push(region.id.clone());
                    }
                }
            }
            None => self.unbounded.push(region.id.clone()),
        }
    }

    fn unindex(&mut self, region: &Region) {
        let id = &region.id;
        match indexed_columns(region) {
            Some((lo, hi)) => {
                for cx in lo.0..=hi.0 {
                    for cz in lo.1..=hi.1 {
                        if let Some(ids) = self.columns.get_mut(&(cx, cz)) {
                            ids.retain(|other| other != id);
                            if ids.is_empty() {
                                self.columns.remove(&(cx, cz));
                            }
                        }
                    }
                }
            }
            None => self.unbounded.retain(|other| other != id),
        }
    }
}

/// Column range a region is indexed under, or `None` when it belongs in the
/// unbounded list.
fn indexed_columns(region: &Region) -> Option<((i32, i32), (i32, i32))> {
    let (lo, hi) = region.shape.horizontal_bounds()?;
    let lo = (lo[0] >> 4, lo[1] >> 4);
    let hi = (hi[0] >> 4, hi[1] >> 4);

    let width = i64::from(hi.0) - i64::from(lo.0) + 1;
    let depth = i64::from(hi.1) - i64::from(lo.1) + 1;
    if width * depth > MAX_INDEXED_COLUMNS {
        return None;
    }
    Some((lo, hi))
}
