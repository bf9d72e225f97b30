//! Handlers for inventories, item use and splash potions.

use std::time::Instant;

use world_rules::{Flag, Material};

use super::{Dispatcher, InventoryHolder, InventoryMove, InventoryOpen, ItemConsume, PotionSplash};
use crate::cause::{Actor, Cause};
use crate::event::{Cancellable, EventPipeline, Intent};

impl Dispatcher {
    pub(super) fn on_item_consume(&mut self, raw: &mut ItemConsume) {
        let Some(player) = raw.player.clone() else {
            return;
        };
        let world = player.world();
        let cause = self.cause([Actor::from(player)]);
        let intent = Intent::use_item(cause, world, raw.item);
        self.pipeline.fire_to_cancel(raw, intent);
    }

    pub(super) fn on_inventory_open(&mut self, raw: &mut InventoryOpen) {
        // Players' own inventories
        if matches!(&raw.holder, InventoryHolder::Entity(entity) if entity.is_player()) {
            return;
        }
        let holder = raw.holder.clone();
        let cause = self.cause([Actor::from(raw.player.clone())]);
        use_holder(&mut self.pipeline, raw, &cause, &holder);
    }

    /// Hoppers move items several times a second; the decision for a
    /// source, destination and initiator is kept for the move TTL.
    pub(super) fn on_inventory_move(&mut self, raw: &mut InventoryMove, now: Instant) {
        if raw.cancelled {
            return;
        }

        let cause = match raw.initiator.clone() {
            InventoryHolder::Entity(entity) => self.cause([Actor::from(entity)]),
            InventoryHolder::Block(block) | InventoryHolder::DoubleChest(block, _) => {
                self.cause([Actor::from(block)])
            }
            InventoryHolder::Virtual => Cause::unknown(),
        };
        let source = raw.source.clone();
        let destination = raw.destination.clone();
        let initiator_is_source = raw.initiator == raw.source;
        let hopper = matches!(
            &raw.initiator,
            InventoryHolder::Block(block) if block.material == Material::Hopper
        );

        let Some(mut entry) = self.debounce.move_item.try_debounce(raw, now) else {
            return;
        };

        if !initiator_is_source {
            use_holder(&mut self.pipeline, raw, &cause, &source);
        }
        use_holder(&mut self.pipeline, raw, &cause, &destination);

        if raw.cancelled && hopper {
            raw.break_initiator = true;
        }
        entry.set_cancelled(raw.cancelled);
    }

    /// The potion is used as an item, then applied to each affected entity.
    /// Refused entities are spared; refusing all of them cancels the splash.
    pub(super) fn on_potion_splash(&mut self, raw: &mut PotionSplash) {
        let mut actors = vec![Actor::from(raw.potion.clone())];
        actors.extend(raw.shooter.clone().map(Actor::from));
        let cause = self.cause(actors);

        let intent = Intent::use_item(cause.clone(), raw.potion.world(), raw.item);
        self.pipeline.fire_to_cancel(raw, intent);
        if raw.cancelled {
            return;
        }

        let harmful = raw.harmful;
        let mut blocked = 0;
        for affected in raw.affected.iter_mut() {
            let intent = if harmful {
                Intent::damage_entity(cause.clone(), affected.entity.clone())
            } else {
                Intent::use_entity(cause.clone(), affected.entity.clone())
            };
            if self
                .pipeline
                .fire_and_test_cancel(intent.with_relevant_flag(Flag::PotionSplash))
            {
                affected.intensity = 0.0;
                blocked += 1;
            }
        }

        if blocked > 0 && blocked == raw.affected.len() {
            raw.cancelled = true;
        }
    }
}

/// Use of whatever holds an inventory. Both halves of a double chest count.
fn use_holder<R>(pipeline: &mut EventPipeline, raw: &mut R, cause: &Cause, holder: &InventoryHolder)
where
    R: Cancellable,
{
    if raw.is_cancelled() {
        return;
    }

    match holder {
        InventoryHolder::Entity(entity) => {
            pipeline.fire_to_cancel(raw, Intent::use_entity(cause.clone(), entity.clone()));
        }
        InventoryHolder::Block(block) => {
            let mut intent = Intent::use_block(cause.clone(), *block);
            if block.material.is_container() {
                intent = intent.with_relevant_flag(Flag::Chest);
            }
            pipeline.fire_to_cancel(raw, intent);
        }
        InventoryHolder::DoubleChest(left, right) => {
            for half in [left, right] {
                let intent =
                    Intent::use_block(cause.clone(), *half).with_relevant_flag(Flag::Chest);
                pipeline.fire_to_cancel(raw, intent);
            }
        }
        InventoryHolder::Virtual => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dispatcher::Affected;
    use crate::event::{IntentHandler, IntentKind, Target};
    use std::cell::RefCell;
    use std::rc::Rc;
    use world_rules::{
        BlockPos, BlockSnapshot, EntityKind, EntityRef, ItemStack, ProtectionConfig, WorldConfig,
        WorldId,
    };

    /// Denies intents whose target is the given block position.
    struct DenyAt {
        pos: Option<BlockPos>,
        seen: Rc<RefCell<Vec<Intent>>>,
    }

    impl IntentHandler for DenyAt {
        fn handle(&mut self, intent: &mut Intent, _config: &WorldConfig) {
            self.seen.borrow_mut().push(intent.clone());
            if self.pos.is_some() && intent.location() == self.pos {
                intent.cancel();
            }
        }
    }

    fn dispatcher(deny_at: Option<BlockPos>) -> (Dispatcher, Rc<RefCell<Vec<Intent>>>) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let handler = DenyAt {
            pos: deny_at,
            seen: Rc::clone(&seen),
        };
        let pipeline =
            EventPipeline::new(Rc::new(ProtectionConfig::default())).with_handler(handler);
        (Dispatcher::new(pipeline), seen)
    }

    fn at(x: i32) -> BlockPos {
        BlockPos::new(WorldId::nil(), x, 64, 0)
    }

    fn hopper() -> InventoryHolder {
        InventoryHolder::Block(BlockSnapshot::new(at(0), Material::Hopper))
    }

    fn chest() -> InventoryHolder {
        InventoryHolder::Block(BlockSnapshot::new(at(1), Material::Chest))
    }

    #[test]
    fn test_hopper_pulling_checks_source_and_destination() {
        let (mut dispatcher, seen) = dispatcher(None);
        let mut raw = InventoryMove::new(chest(), hopper(), hopper());
        dispatcher.on_inventory_move(&mut raw, Instant::now());

        // Chest above, then the pulling hopper as destination
        let targets: Vec<_> = seen.borrow().iter().map(|i| i.location()).collect();
        assert_eq!(targets, vec![Some(at(1)), Some(at(0))]);
    }

    #[test]
    fn test_initiator_as_source_skipped() {
        let (mut dispatcher, seen) = dispatcher(None);
        let mut raw = InventoryMove::new(hopper(), chest(), hopper());
        dispatcher.on_inventory_move(&mut raw, Instant::now());

        let targets: Vec<_> = seen.borrow().iter().map(|i| i.location()).collect();
        assert_eq!(targets, vec![Some(at(1))]);
    }

    #[test]
    fn test_denied_hopper_is_broken_and_cached() {
        let (mut dispatcher, seen) = dispatcher(Some(at(1)));
        let now = Instant::now();

        let mut raw = InventoryMove::new(chest(), hopper(), hopper());
        dispatcher.on_inventory_move(&mut raw, now);
        assert!(raw.cancelled);
        assert!(raw.break_initiator);

        let mut repeat = InventoryMove::new(chest(), hopper(), hopper());
        dispatcher.on_inventory_move(&mut repeat, now);
        assert!(repeat.cancelled);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_virtual_inventory_never_cached() {
        let (mut dispatcher, seen) = dispatcher(None);
        let now = Instant::now();

        for _ in 0..2 {
            let mut raw =
                InventoryMove::new(InventoryHolder::Virtual, chest(), InventoryHolder::Virtual);
            dispatcher.on_inventory_move(&mut raw, now);
        }
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn test_open_player_inventory_ignored() {
        let (mut dispatcher, seen) = dispatcher(None);
        let player = EntityRef::player(at(0));
        let mut raw = InventoryOpen {
            player: player.clone(),
            holder: InventoryHolder::Entity(player),
            cancelled: false,
        };
        dispatcher.on_inventory_open(&mut raw);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_open_chest_checks_chest_flag() {
        let (mut dispatcher, seen) = dispatcher(None);
        let mut raw = InventoryOpen {
            player: EntityRef::player(at(5)),
            holder: chest(),
            cancelled: false,
        };
        dispatcher.on_inventory_open(&mut raw);

        let seen = seen.borrow();
        assert_eq!(seen[0].kind, IntentKind::UseBlock);
        assert!(seen[0].relevant_flags.contains(&Flag::Chest));
    }

    fn splash(harmful: bool, entities: &[BlockPos]) -> PotionSplash {
        PotionSplash {
            potion: EntityRef::new(EntityKind::ThrownPotion, at(10)),
            shooter: Some(EntityRef::player(at(12))),
            item: ItemStack::single(Material::SplashPotion),
            harmful,
            affected: entities
                .iter()
                .map(|pos| Affected {
                    entity: EntityRef::new(EntityKind::Animal, *pos),
                    intensity: 1.0,
                })
                .collect(),
            cancelled: false,
        }
    }

    #[test]
    fn test_splash_spares_refused_entities() {
        let (mut dispatcher, seen) = dispatcher(Some(at(2)));
        let mut raw = splash(true, &[at(2), at(3)]);
        dispatcher.on_potion_splash(&mut raw);

        assert!(!raw.cancelled);
        assert_eq!(raw.affected[0].intensity, 0.0);
        assert_eq!(raw.affected[1].intensity, 1.0);

        let seen = seen.borrow();
        assert_eq!(seen[0].kind, IntentKind::UseItem);
        assert_eq!(seen[1].kind, IntentKind::Damage);
        assert!(seen[1].relevant_flags.contains(&Flag::PotionSplash));
    }

    #[test]
    fn test_splash_all_refused_cancels() {
        let (mut dispatcher, seen) = dispatcher(Some(at(2)));
        let mut raw = splash(false, &[at(2)]);
        dispatcher.on_potion_splash(&mut raw);

        assert!(raw.cancelled);
        assert!(matches!(seen.borrow()[1].target, Target::Entity(_)));
        assert_eq!(seen.borrow()[1].kind, IntentKind::UseEntity);
    }
}
