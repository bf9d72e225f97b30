//! Handlers for notifications about entities.

use std::time::Instant;

use world_rules::{EntityKind, Flag};

use super::{
    CreatureSpawn, Damager, Dispatcher, EntityDamage, EntityRemove, EntityUse, ExperienceDrop,
    ExperienceSource, HangingBreak, HangingPlace, ItemTransfer, PlayerInteractEntity, VehicleDamage,
    VehicleEnter,
};
use crate::cause::{Actor, Cause};
use crate::debounce::EntityEntityKey;
use crate::event::Intent;

impl Dispatcher {
    /// Only creatures hatched from thrown eggs are checked here.
    pub(super) fn on_creature_spawn(&mut self, raw: &mut CreatureSpawn) {
        let from_egg = raw
            .spawner
            .as_ref()
            .is_some_and(|spawner| spawner.kind == EntityKind::ThrownEgg);
        if !from_egg {
            return;
        }

        for entity in raw.entities.clone() {
            self.pipeline
                .fire_to_cancel(raw, Intent::spawn_entity(Cause::unknown(), entity));
        }
    }

    pub(super) fn on_hanging_place(&mut self, raw: &mut HangingPlace) {
        let cause = self.cause([Actor::from(raw.player.clone())]);
        let intent = Intent::spawn_entity(cause, raw.entity.clone());
        self.pipeline.fire_to_cancel(raw, intent);
    }

    pub(super) fn on_hanging_break(&mut self, raw: &mut HangingBreak) {
        let Some(remover) = raw.remover.clone() else {
            return;
        };
        let cause = self.cause([Actor::from(remover)]);
        let intent = Intent::destroy_entity(cause, raw.entity.clone());
        self.pipeline.fire_to_cancel(raw, intent);
    }

    pub(super) fn on_vehicle_damage(&mut self, raw: &mut VehicleDamage) {
        let cause = match raw.attacker.clone() {
            Some(attacker) => self.cause([Actor::from(attacker)]),
            None => Cause::unknown(),
        };
        let intent = Intent::destroy_entity(cause, raw.vehicle.clone())
            .with_relevant_flag(Flag::VehicleDestroy);
        self.pipeline.fire_to_cancel(raw, intent);
    }

    pub(super) fn on_vehicle_enter(&mut self, raw: &mut VehicleEnter) {
        let cause = self.cause([Actor::from(raw.entity.clone())]);
        let intent = Intent::use_entity(cause, raw.vehicle.clone()).with_relevant_flag(Flag::Ride);
        self.pipeline.fire_to_cancel(raw, intent);
    }

    /// Refused experience is not dropped; the notification itself stands.
    pub(super) fn on_experience_drop(&mut self, raw: &mut ExperienceDrop) {
        // Hosts raise this even when nothing drops
        if raw.amount == 0 {
            return;
        }

        let actors = match &raw.source {
            ExperienceSource::Block(block) => vec![Actor::from(*block)],
            ExperienceSource::Fishing { player, hook } => {
                vec![Actor::from(player.clone()), Actor::from(hook.clone())]
            }
            ExperienceSource::Death(entity) | ExperienceSource::Bottle(entity) => {
                vec![Actor::from(entity.clone())]
            }
        };
        let cause = self.cause(actors);
        let intent = Intent::spawn_type(cause, EntityKind::ExperienceOrb, raw.at)
            .with_relevant_flag(Flag::ExpDrops);

        if self.pipeline.fire_and_test_cancel(intent) {
            raw.amount = 0;
        }
    }

    pub(super) fn on_player_interact_entity(&mut self, raw: &mut PlayerInteractEntity) {
        let cause = self.cause([Actor::from(raw.player.clone())]);

        if let Some(item) = raw.item {
            let intent = Intent::use_item(cause.clone(), raw.player.world(), item);
            self.pipeline.fire_to_cancel(raw, intent);
        }

        let intent = Intent::use_entity(cause, raw.entity.clone());
        self.pipeline.fire_to_cancel(raw, intent);
    }

    /// Damage and combustion. A player's held item counts as used.
    pub(super) fn on_entity_damage(&mut self, raw: &mut EntityDamage) {
        let target = raw.target.clone();

        match raw.damager.clone() {
            Damager::Block(block) => {
                let cause = self.cause([Actor::from(block)]);
                self.pipeline
                    .fire_to_cancel(raw, Intent::damage_entity(cause, target));
            }
            Damager::Entity(damager) => {
                let cause = self.cause([Actor::from(damager.clone())]);
                self.pipeline
                    .fire_to_cancel(raw, Intent::damage_entity(cause.clone(), target.clone()));

                if raw.combust || !damager.is_player() {
                    return;
                }
                if let Some(item) = raw.held_item {
                    let intent = Intent::use_item(cause, target.world(), item);
                    self.pipeline.fire_to_cancel(raw, intent);
                }
            }
            Damager::Unknown => {}
        }
    }

    /// A falling block that breaks or despawns mid-air never lands; drop
    /// whatever it was still blamed on.
    pub(super) fn on_entity_remove(&mut self, raw: &mut EntityRemove) {
        self.causes.forget(raw.entity.id);
    }

    /// Unleashing, taming and shearing.
    pub(super) fn on_entity_use(&mut self, raw: &mut EntityUse) {
        let Some(user) = raw.user.clone() else {
            return;
        };
        let cause = self.cause([Actor::from(user)]);
        let intent = Intent::use_entity(cause, raw.entity.clone());
        self.pipeline.fire_to_cancel(raw, intent);
    }

    /// Players walking over items raise a pickup every tick.
    pub(super) fn on_item_pickup(&mut self, raw: &mut ItemTransfer, now: Instant) {
        let Some(player) = raw.player.clone() else {
            return;
        };

        for item in raw.items.clone() {
            let cause = self.cause([Actor::from(player.clone())]);
            let key = EntityEntityKey::new(player.id, item.id);
            let intent = Intent::destroy_entity(cause, item).with_relevant_flag(Flag::ItemPickup);
            self.debounce
                .pickup
                .debounce(key, raw, intent, &mut self.pipeline, now);
        }
    }

    pub(super) fn on_item_drop(&mut self, raw: &mut ItemTransfer) {
        let Some(player) = raw.player.clone() else {
            return;
        };

        for item in raw.items.clone() {
            let cause = self.cause([Actor::from(player.clone())]);
            let intent = Intent::spawn_entity(cause, item).with_relevant_flag(Flag::ItemDrop);
            self.pipeline.fire_to_cancel(raw, intent);
        }
    }
}
