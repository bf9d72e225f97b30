//! Region flag resolution over overlapping, prioritized regions.

mod policy;

pub use policy::*;

use world_rules::{BlockPos, EntityId, Flag, Region, RegionId, RegionSet, State, WorldConfig};

/// Who decided a flag value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DecidedBy {
    Region(RegionId),
    /// No region set the flag; the world default applied.
    Default,
}

/// The effective value of a flag at a point for an actor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlagResolution {
    pub value: State,
    pub decided_by: DecidedBy,
}

impl FlagResolution {
    pub fn is_allow(&self) -> bool {
        self.value.is_allow()
    }

    pub fn is_deny(&self) -> bool {
        self.value.is_deny()
    }
}

/// Answers flag queries against one snapshot of a world's regions.
///
/// A world without regions behaves as an empty set: every query falls
/// through to the configured defaults.
#[derive(Debug, Clone, Copy)]
pub struct RegionResolver<'a> {
    regions: Option<&'a RegionSet>,
    config: &'a WorldConfig,
}

impl<'a> RegionResolver<'a> {
    /// Create a resolver over a snapshot.
    pub fn new(regions: Option<&'a RegionSet>, config: &'a WorldConfig) -> Self {
        Self { regions, config }
    }

    /// Regions containing the point, highest priority first, ties by ID.
    pub fn applicable_regions(&self, point: BlockPos) -> Vec<&'a Region> {
        self.regions
            .map(|set| set.regions_containing(point))
            .unwrap_or_default()
    }

    /// IDs of [`applicable_regions`](Self::applicable_regions), same order.
    pub fn applicable_ids(&self, point: BlockPos) -> Vec<RegionId> {
        self.applicable_regions(point)
            .into_iter()
            .map(|r| r.id.clone())
            .collect()
    }

    /// Resolve a flag at a point.
    ///
    /// The first applicable region with an explicit or inherited value
    /// decides. Members of that region get ALLOW on flags they bypass.
    pub fn flag_value(
        &self,
        point: BlockPos,
        flag: Flag,
        actor: Option<EntityId>,
    ) -> FlagResolution {
        let Some(set) = self.regions else {
            return self.default_value(flag);
        };

        for region in set.regions_containing(point) {
            let Some((state, _)) = set.effective_flag(region, flag) else {
                continue;
            };

            let bypass = flag.members_bypass()
                && actor.is_some_and(|player| set.is_member(region, player));

            return FlagResolution {
                value: if bypass { State::Allow } else { state },
                decided_by: DecidedBy::Region(region.id.clone()),
            };
        }

        self.default_value(flag)
    }

    /// Whether the player may build at the point.
    ///
    /// Owners and members of any applicable region pass; everyone else gets
    /// the resolved BUILD value.
    pub fn can_build(&self, player: EntityId, point: BlockPos) -> bool {
        if self.is_member_anywhere(player, point) {
            return true;
        }
        self.flag_value(point, Flag::Build, Some(player)).is_allow()
    }

    /// Whether the player is a member or owner of any region at the point.
    pub fn is_member_anywhere(&self, player: EntityId, point: BlockPos) -> bool {
        let Some(set) = self.regions else {
            return false;
        };
        set.regions_containing(point)
            .into_iter()
            .any(|region| set.is_member(region, player))
    }

    /// Whether the player owns any region at the point.
    pub fn is_owner_anywhere(&self, player: EntityId, point: BlockPos) -> bool {
        let Some(set) = self.regions else {
            return false;
        };
        set.regions_containing(point)
            .into_iter()
            .any(|region| set.is_owner(region, player))
    }

    fn default_value(&self, flag: Flag) -> FlagResolution {
        FlagResolution {
            value: self.config.flag_default(flag),
            decided_by: DecidedBy::Default,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use world_rules::{RegionShape, WorldId};

    fn at(x: i32) -> BlockPos {
        BlockPos::new(WorldId::nil(), x, 64, 0)
    }

    fn overlapping(a_priority: i32, b_priority: i32) -> RegionSet {
        let mut set = RegionSet::new();
        set.add(
            Region::new("a", RegionShape::cuboid([0, 0, -5], [20, 255, 5]))
                .with_priority(a_priority)
                .with_flag(Flag::Build, State::Deny),
        )
        .unwrap();
        set.add(
            Region::new("b", RegionShape::cuboid([10, 0, -5], [30, 255, 5]))
                .with_priority(b_priority)
                .with_flag(Flag::Build, State::Allow),
        )
        .unwrap();
        set
    }

    #[test]
    fn test_priority_decides() {
        let config = WorldConfig::default();
        let set = overlapping(10, 5);
        let resolver = RegionResolver::new(Some(&set), &config);

        let high_a = resolver.flag_value(at(15), Flag::Build, None);
        assert_eq!(high_a.value, State::Deny);
        assert_eq!(high_a.decided_by, DecidedBy::Region(RegionId::new("a")));

        let set = overlapping(5, 10);
        let resolver = RegionResolver::new(Some(&set), &config);
        assert_eq!(resolver.flag_value(at(15), Flag::Build, None).value, State::Allow);
    }

    #[test]
    fn test_equal_priority_breaks_ties_by_id() {
        let config = WorldConfig::default();
        let set = overlapping(0, 0);
        let resolver = RegionResolver::new(Some(&set), &config);

        let ids = resolver.applicable_ids(at(15));
        assert_eq!(ids, vec![RegionId::new("a"), RegionId::new("b")]);
        assert!(resolver.flag_value(at(15), Flag::Build, None).is_deny());
    }

    #[test]
    fn test_region_without_flag_falls_through() {
        let config = WorldConfig::default();
        let mut set = overlapping(5, 1);
        set.add(Region::new("top", RegionShape::cuboid([0, 0, 0], [30, 255, 0])).with_priority(100))
            .unwrap();
        let resolver = RegionResolver::new(Some(&set), &config);

        let resolution = resolver.flag_value(at(15), Flag::Build, None);
        assert_eq!(resolution.decided_by, DecidedBy::Region(RegionId::new("a")));
    }

    #[test]
    fn test_inheritance_and_default() {
        let mut config = WorldConfig::default();
        config.flag_defaults.insert(Flag::Pvp, State::Deny);

        let mut set = RegionSet::new();
        set.add(
            Region::new("parent", RegionShape::Global)
                .with_priority(-1)
                .with_flag(Flag::Pvp, State::Allow),
        )
        .unwrap();
        set.add(
            Region::new("child", RegionShape::cuboid([0, 0, 0], [9, 255, 9])).with_parent("parent"),
        )
        .unwrap();

        let resolver = RegionResolver::new(Some(&set), &config);
        let inside = BlockPos::new(WorldId::nil(), 1, 64, 1);
        let resolution = resolver.flag_value(inside, Flag::Pvp, None);
        assert_eq!(resolution.value, State::Allow);
        assert_eq!(resolution.decided_by, DecidedBy::Region(RegionId::new("child")));

        set.set_flag(&RegionId::new("parent"), Flag::Pvp, None).unwrap();
        let resolver = RegionResolver::new(Some(&set), &config);
        let resolution = resolver.flag_value(inside, Flag::Pvp, None);
        assert_eq!(resolution.value, State::Deny);
        assert_eq!(resolution.decided_by, DecidedBy::Default);
    }

    #[test]
    fn test_member_bypass_only_for_bypassed_flags() {
        let config = WorldConfig::default();
        let member = EntityId::new();
        let mut set = RegionSet::new();
        set.add(
            Region::new("home", RegionShape::cuboid([0, 0, -5], [9, 255, 5]))
                .with_member(member)
                .with_flag(Flag::Build, State::Deny)
                .with_flag(Flag::Pvp, State::Deny),
        )
        .unwrap();
        let resolver = RegionResolver::new(Some(&set), &config);

        assert!(resolver.flag_value(at(1), Flag::Build, Some(member)).is_allow());
        assert!(resolver.flag_value(at(1), Flag::Pvp, Some(member)).is_deny());
        assert!(resolver.flag_value(at(1), Flag::Build, Some(EntityId::new())).is_deny());
    }

    #[test]
    fn test_can_build_owner_bypass() {
        let config = WorldConfig::default();
        let owner = EntityId::new();
        let mut set = overlapping(10, 5);
        set.add_owner(&RegionId::new("b"), owner).unwrap();
        let resolver = RegionResolver::new(Some(&set), &config);

        assert!(resolver.can_build(owner, at(15)));
        assert!(!resolver.can_build(EntityId::new(), at(15)));
        assert!(resolver.is_owner_anywhere(owner, at(15)));
    }

    #[test]
    fn test_no_regions_uses_defaults() {
        let config = WorldConfig::default();
        let resolver = RegionResolver::new(None, &config);

        assert!(resolver.applicable_regions(at(0)).is_empty());
        assert!(resolver.can_build(EntityId::new(), at(0)));
        assert_eq!(resolver.flag_value(at(0), Flag::Build, None).decided_by, DecidedBy::Default);
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let config = WorldConfig::default();
        let set = overlapping(3, 3);
        let resolver = RegionResolver::new(Some(&set), &config);
        let player = EntityId::new();

        let first = resolver.flag_value(at(12), Flag::Build, Some(player));
        for _ in 0..10 {
            assert_eq!(resolver.flag_value(at(12), Flag::Build, Some(player)), first);
            assert!(!resolver.can_build(player, at(12)));
        }
    }
}
