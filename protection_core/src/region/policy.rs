//! The region policy: denies intents that region flags forbid.

use std::collections::BTreeSet;

use world_rules::{BlockPos, Flag, RegionStore, WorldConfig};

use super::RegionResolver;
use crate::cause::Cause;
use crate::event::{Intent, IntentHandler, IntentKind};

/// Checks every intent against the regions of its world.
#[derive(Debug, Clone, Default)]
pub struct RegionPolicy {
    store: RegionStore,
}

impl RegionPolicy {
    /// Create a policy reading from `store`.
    pub fn new(store: RegionStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &RegionStore {
        &self.store
    }

    /// Flags an intent must pass, from its kind and its relevant flags.
    pub fn flags_for(intent: &Intent) -> BTreeSet<Flag> {
        let mut flags: BTreeSet<Flag> = match intent.kind {
            IntentKind::Break => [Flag::Build, Flag::BlockBreak].into(),
            IntentKind::Place => [Flag::Build, Flag::BlockPlace].into(),
            IntentKind::UseBlock | IntentKind::UseEntity => [Flag::Interact].into(),
            IntentKind::Destroy => [Flag::Build].into(),
            IntentKind::Spawn if intent.cause.first_player().is_some() => [Flag::Build].into(),
            IntentKind::Spawn => [Flag::MobSpawning].into(),
            IntentKind::Damage if intent.target.player().is_some() => [Flag::Pvp].into(),
            IntentKind::Damage => [Flag::DamageAnimals].into(),
            IntentKind::UseItem => BTreeSet::new(),
        };
        flags.extend(intent.relevant_flags.iter().copied());
        flags
    }
}

impl IntentHandler for RegionPolicy {
    fn handle(&mut self, intent: &mut Intent, config: &WorldConfig) {
        if !config.use_regions {
            return;
        }
        let Some(target) = intent.location() else {
            return;
        };
        let flags = Self::flags_for(intent);
        if flags.is_empty() {
            return;
        }

        let snapshot = self.store.snapshot(target.world);
        let resolver = RegionResolver::new(snapshot.as_deref(), config);

        let denied = match intent.cause.first_player() {
            Some(player) => {
                let member = resolver.is_member_anywhere(player.id, target);
                flags.iter().find(|flag| {
                    if member && flag.members_bypass() {
                        return false;
                    }
                    resolver.flag_value(target, **flag, Some(player.id)).is_deny()
                })
            }
            None => {
                if same_regions(&resolver, &intent.cause, target) {
                    None
                } else {
                    flags
                        .iter()
                        .find(|flag| resolver.flag_value(target, **flag, None).is_deny())
                }
            }
        };

        if let Some(flag) = denied {
            tracing::debug!(%flag, %intent, "region flag denies intent");
            intent.cancel();
        }
    }

    fn name(&self) -> &str {
        "region-policy"
    }
}

/// Whether the cause originates inside exactly the regions of the target.
fn same_regions(resolver: &RegionResolver<'_>, cause: &Cause, target: BlockPos) -> bool {
    let Some(origin) = cause.origin() else {
        return false;
    };
    origin.world == target.world
        && resolver.applicable_ids(origin) == resolver.applicable_ids(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::Cancellable;
    use world_rules::{
        BlockSnapshot, EntityKind, EntityRef, ItemStack, Material, Region, RegionSet, RegionShape,
        State, WorldId,
    };

    fn fixture() -> (RegionPolicy, WorldId, EntityRef) {
        let world = WorldId::new();
        let store = RegionStore::new();
        let owner = EntityRef::player(BlockPos::new(world, 5, 64, 5));

        let mut set = RegionSet::new();
        set.add(
            Region::new("spawn", RegionShape::cuboid([0, 0, 0], [9, 255, 9]))
                .with_owner(owner.id)
                .with_flag(Flag::Build, State::Deny)
                .with_flag(Flag::Pvp, State::Deny)
                .with_flag(Flag::MobSpawning, State::Deny),
        )
        .unwrap();
        store.publish(world, set);

        (RegionPolicy::new(store), world, owner)
    }

    fn stone(world: WorldId, x: i32) -> BlockSnapshot {
        BlockSnapshot::new(BlockPos::new(world, x, 64, 5), Material::Stone)
    }

    #[test]
    fn test_kind_flags() {
        let world = WorldId::nil();
        let player = Cause::of(EntityRef::player(BlockPos::new(world, 0, 0, 0)));

        let place = Intent::place_block(player.clone(), stone(world, 0));
        assert_eq!(
            RegionPolicy::flags_for(&place),
            BTreeSet::from([Flag::Build, Flag::BlockPlace])
        );

        let at = BlockPos::new(world, 0, 0, 0);
        let spawn = Intent::spawn_type(Cause::unknown(), EntityKind::Monster, at);
        assert_eq!(RegionPolicy::flags_for(&spawn), BTreeSet::from([Flag::MobSpawning]));

        let item = Intent::use_item(player, world, ItemStack::single(Material::Bow))
            .with_relevant_flag(Flag::PotionSplash);
        assert_eq!(RegionPolicy::flags_for(&item), BTreeSet::from([Flag::PotionSplash]));
    }

    #[test]
    fn test_stranger_denied_owner_allowed() {
        let (mut policy, world, owner) = fixture();
        let config = WorldConfig::default();
        let stranger = EntityRef::player(BlockPos::new(world, 20, 64, 5));

        let mut by_stranger = Intent::break_block(Cause::of(stranger), stone(world, 3));
        policy.handle(&mut by_stranger, &config);
        assert!(by_stranger.is_cancelled());

        let mut by_owner = Intent::break_block(Cause::of(owner), stone(world, 3));
        policy.handle(&mut by_owner, &config);
        assert!(!by_owner.is_cancelled());
    }

    #[test]
    fn test_owner_still_subject_to_pvp() {
        let (mut policy, world, owner) = fixture();
        let config = WorldConfig::default();
        let victim = EntityRef::player(BlockPos::new(world, 4, 64, 4));

        let mut hit = Intent::damage_entity(Cause::of(owner), victim);
        policy.handle(&mut hit, &config);
        assert!(hit.is_cancelled());
    }

    #[test]
    fn test_non_player_inside_same_regions_allowed() {
        let (mut policy, world, _) = fixture();
        let config = WorldConfig::default();

        let source = BlockSnapshot::new(BlockPos::new(world, 4, 64, 5), Material::Water);
        let target = BlockSnapshot::new(BlockPos::new(world, 5, 64, 5), Material::Water);
        let mut flow = Intent::place_block(Cause::of(source), target);
        policy.handle(&mut flow, &config);
        assert!(!flow.is_cancelled());
    }

    #[test]
    fn test_non_player_crossing_boundary_denied() {
        let (mut policy, world, _) = fixture();
        let config = WorldConfig::default();

        let source = BlockSnapshot::new(BlockPos::new(world, 10, 64, 5), Material::Lava);
        let target = BlockSnapshot::new(BlockPos::new(world, 9, 64, 5), Material::Lava);
        let mut flow = Intent::place_block(Cause::of(source), target);
        policy.handle(&mut flow, &config);
        assert!(flow.is_cancelled());
    }

    #[test]
    fn test_unknown_cause_spawn_uses_mob_spawning() {
        let (mut policy, world, _) = fixture();
        let config = WorldConfig::default();

        let at = BlockPos::new(world, 2, 64, 2);
        let mut spawn = Intent::spawn_type(Cause::unknown(), EntityKind::Monster, at);
        policy.handle(&mut spawn, &config);
        assert!(spawn.is_cancelled());
    }

    #[test]
    fn test_disabled_regions_allow_everything() {
        let (mut policy, world, _) = fixture();
        let config = WorldConfig {
            use_regions: false,
            ..WorldConfig::default()
        };
        let stranger = EntityRef::player(BlockPos::new(world, 20, 64, 5));

        let mut intent = Intent::break_block(Cause::of(stranger), stone(world, 3));
        policy.handle(&mut intent, &config);
        assert!(!intent.is_cancelled());
    }

    #[test]
    fn test_unknown_world_uses_defaults() {
        let (mut policy, _, _) = fixture();
        let config = WorldConfig::default();
        let elsewhere = WorldId::new();
        let player = EntityRef::player(BlockPos::new(elsewhere, 0, 64, 0));

        let mut intent = Intent::place_block(Cause::of(player), stone(elsewhere, 0));
        policy.handle(&mut intent, &config);
        assert!(!intent.is_cancelled());
    }
}
