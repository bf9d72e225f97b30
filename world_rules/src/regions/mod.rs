//! Region definitions - named, prioritized areas carrying flags and membership.
//!
//! - **Region**: shape, priority, optional parent, owners, members, flags
//! - **RegionSet**: validated definitions of one world with a column index
//! - **RegionStore**: per-world immutable snapshots published between dispatches

mod flag;
mod index;
mod shape;
mod store;

pub use flag::*;
pub use index::*;
pub use shape::*;
pub use store::*;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use crate::entities::EntityId;

/// Region identifiers are case-insensitive and stored lowercase.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegionId(String);

impl RegionId {
    /// Identifier of the conventional whole-world region.
    pub const GLOBAL: &'static str = "__global__";

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier only uses characters accepted in region names.
    pub fn is_valid(&self) -> bool {
        !self.0.is_empty()
            && self.0.chars().all(|c| {
                c.is_ascii_alphanumeric() || matches!(c, '_' | ',' | '\'' | '-' | '+' | '/')
            })
    }
}

impl std::fmt::Display for RegionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for RegionId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for RegionId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

/// A protected area.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    pub shape: RegionShape,

    /// Higher priority regions override lower ones.
    pub priority: i32,

    /// Parent whose flags and membership this region inherits.
    /// Validated by [`RegionSet`] when the region is added or re-parented.
    pub parent: Option<RegionId>,

    pub owners: BTreeSet<EntityId>,
    pub members: BTreeSet<EntityId>,

    /// Explicit flag values; missing flags are inherited from the parent.
    pub flags: BTreeMap<Flag, State>,
}

impl Region {
    /// Create a region with priority 0 and no flags.
    pub fn new(id: impl Into<RegionId>, shape: RegionShape) -> Self {
        Self {
            id: id.into(),
            shape,
            priority: 0,
            parent: None,
            owners: BTreeSet::new(),
            members: BTreeSet::new(),
            flags: BTreeMap::new(),
        }
    }

    /// Create the whole-world region.
    pub fn global() -> Self {
        Self::new(RegionId::GLOBAL, RegionShape::Global)
    }

    /// Set the priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Set the parent region.
    pub fn with_parent(mut self, parent: impl Into<RegionId>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    /// Set an explicit flag value.
    pub fn with_flag(mut self, flag: Flag, state: State) -> Self {
        self.flags.insert(flag, state);
        self
    }

    /// Add an owner.
    pub fn with_owner(mut self, player: EntityId) -> Self {
        self.owners.insert(player);
        self
    }

    /// Add a member.
    pub fn with_member(mut self, player: EntityId) -> Self {
        self.members.insert(player);
        self
    }

    /// Explicit value on this region only, ignoring the parent chain.
    pub fn flag(&self, flag: Flag) -> Option<State> {
        self.flags.get(&flag).copied()
    }

    /// Direct ownership, ignoring the parent chain.
    pub fn has_owner(&self, player: EntityId) -> bool {
        self.owners.contains(&player)
    }

    /// Direct membership (owners count as members), ignoring the parent chain.
    pub fn has_member(&self, player: EntityId) -> bool {
        self.members.contains(&player) || self.has_owner(player)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_region_id_is_case_insensitive() {
        assert_eq!(RegionId::new("Spawn"), RegionId::new("spawn"));
        assert!(RegionId::new("town-hall_2").is_valid());
        assert!(!RegionId::new("bad name").is_valid());
        assert!(!RegionId::new("").is_valid());
    }

    #[test]
    fn test_region_builder() {
        let owner = EntityId::new();
        let region = Region::new("town", RegionShape::cuboid([0, 0, 0], [9, 9, 9]))
            .with_priority(5)
            .with_flag(Flag::Build, State::Deny)
            .with_owner(owner);

        assert_eq!(region.priority, 5);
        assert_eq!(region.flag(Flag::Build), Some(State::Deny));
        assert_eq!(region.flag(Flag::Pvp), None);
        assert!(region.has_owner(owner));
        assert!(region.has_member(owner));
    }
}
