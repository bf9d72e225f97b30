//! Handlers for notifications about blocks.

use std::time::Instant;

use world_rules::{BlockFace, BlockSnapshot, EntityKind, Flag, ItemStack, Material};

use super::{
    Batch, BedEnter, BlockBreak, BlockBurn, BlockDamage, BlockDispense, BlockIgnite, BlockPlace,
    BucketUse, Dispatcher, EntityChangeBlock, EntityInteract, Explosion, InteractAction, LiquidFlow,
    PistonExtend, PistonRetract, PlayerInteract, SignChange, StructureGrow,
};
use crate::cause::{Actor, Cause};
use crate::debounce::{BlockEntityKey, PistonExtendKey, PistonRetractKey};
use crate::event::{Cancellable, Intent, Payload};

impl Dispatcher {
    pub(super) fn on_block_break(&mut self, raw: &mut BlockBreak) {
        let Some(player) = raw.player.clone() else {
            return;
        };

        for transaction in raw.transactions.clone() {
            let cause = self.cause([Actor::from(player.clone())]);
            self.pipeline
                .fire_to_cancel(raw, Intent::break_block(cause, transaction.original));
        }
    }

    /// Replacing a block is a break of what was there, the use of the item
    /// in hand, then the place itself.
    pub(super) fn on_block_place(&mut self, raw: &mut BlockPlace) {
        let Some(player) = raw.player.clone() else {
            return;
        };

        for transaction in raw.transactions.clone() {
            let cause = self.cause([Actor::from(player.clone())]);
            let previous = transaction.original;
            let next = transaction.replacement;

            // Tall grass, fire and snow get replaced
            if !previous.is_air() {
                self.pipeline
                    .fire_to_cancel(raw, Intent::break_block(cause.clone(), previous));
            }

            if !raw.cancelled {
                let item = ItemStack::single(next.material.item_form());
                self.pipeline
                    .fire_to_cancel(raw, Intent::use_item(cause.clone(), next.world(), item));
            }

            if !raw.cancelled {
                self.pipeline.fire_to_cancel(raw, Intent::place_block(cause, next));
            }
        }
    }

    pub(super) fn on_block_burn(&mut self, raw: &mut BlockBurn) {
        let target = raw.block;
        let mut found = 0;
        let mut allowed = false;

        for source in raw.neighbours.clone() {
            if source.material != Material::Fire {
                continue;
            }
            found += 1;

            let cause = self.cause([Actor::from(source)]);
            let intent = Intent::break_block(cause, target).with_relevant_flag(Flag::FireSpread);
            if self.pipeline.fire_and_test_cancel(intent) {
                raw.extinguish.push(source.pos);
            } else {
                allowed = true;
            }
        }

        if found > 0 && !allowed {
            raw.cancelled = true;
        }
    }

    pub(super) fn on_structure_grow(&mut self, raw: &mut StructureGrow) {
        let original_count = raw.blocks.len();
        let actor = match &raw.player {
            Some(player) => Actor::from(player.clone()),
            None => Actor::from(raw.origin),
        };
        let cause = self.cause([actor]);

        let cancelled = self
            .pipeline
            .fire_bulk_to_cancel(raw, |block| Some(Intent::place_block(cause.clone(), *block)));

        if !cancelled && raw.blocks.len() != original_count {
            raw.clear_origin = true;
        }
    }

    pub(super) fn on_entity_change_block(&mut self, raw: &mut EntityChangeBlock, now: Instant) {
        let entity = raw.entity.clone();
        let block = raw.block;
        let to = raw.to;

        // Handled as interaction
        if block.material.is_redstone_ore() && to.is_redstone_ore() {
            return;
        }

        let target = BlockSnapshot::new(block.pos, to);

        if !to.is_air() && !block.is_air() {
            let cause = self.cause([Actor::from(entity)]);
            self.pipeline
                .fire_to_cancel(raw, Intent::break_block(cause.clone(), block));
            self.pipeline.fire_to_cancel(raw, Intent::place_block(cause, target));
        } else if to.is_air() {
            if entity.kind == EntityKind::FallingBlock {
                // The block becomes an entity; remember where it came from
                self.causes.track_parent_cause(entity.id, block);

                let cause = Cause::of(block);
                self.pipeline
                    .fire_to_cancel(raw, Intent::break_block(cause.clone(), block));
                self.pipeline
                    .fire_to_cancel(raw, Intent::spawn_entity(cause, entity));
            } else {
                let cause = self.cause([Actor::from(entity.clone())]);
                let key = BlockEntityKey::new(block.pos, entity.id);
                self.debounce.entity_break.debounce(
                    key,
                    raw,
                    Intent::break_block(cause, block),
                    &mut self.pipeline,
                    now,
                );
            }
        } else {
            let was_cancelled = raw.cancelled;
            let cause = self.cause([Actor::from(entity.clone())]);
            self.pipeline.fire_to_cancel(raw, Intent::place_block(cause, target));

            if raw.cancelled && !was_cancelled && entity.kind == EntityKind::FallingBlock {
                let item = ItemStack::single(entity.carried.unwrap_or(to).item_form());
                let drop_cause = self.cause([Actor::from(block), Actor::from(entity.clone())]);
                let drop = Intent::spawn_type(drop_cause, EntityKind::Item, entity.pos)
                    .with_payload(Payload::Item(item));
                raw.drop_item = !self.pipeline.fire_and_test_cancel(drop);
            }
        }
    }

    pub(super) fn on_explosion(&mut self, raw: &mut Explosion) {
        let Some(source) = raw.source.clone() else {
            return;
        };
        let tnt = source.kind == EntityKind::PrimedTnt;
        let cause = self.cause([Actor::from(source)]);

        self.pipeline.fire_bulk_to_cancel(raw, |block| {
            let intent = Intent::break_block(cause.clone(), *block);
            Some(if tnt { intent.with_relevant_flag(Flag::Tnt) } else { intent })
        });
    }

    /// A push is all or nothing: refusing any moved block refuses the push.
    pub(super) fn on_piston_extend(&mut self, raw: &mut PistonExtend, now: Instant) {
        if raw.cancelled {
            return;
        }

        let direction = raw.direction;
        let key = PistonExtendKey {
            piston: raw.piston.pos,
            direction,
            blocks: raw.blocks.iter().map(|b| b.pos).collect(),
        };

        let mut moved: Vec<BlockSnapshot> = raw
            .blocks
            .iter()
            .map(|b| BlockSnapshot::new(b.pos.relative(direction), b.material))
            .collect();
        moved.push(BlockSnapshot::new(raw.piston.pos.relative(direction), Material::PistonHead));

        let cause = self.cause([Actor::from(raw.piston)]);
        let Some(mut entry) = self.debounce.piston_extend.get_if_not_present(key, raw, now) else {
            return;
        };

        let mut batch = Batch::new(moved);
        let total = batch.entries.len();
        self.pipeline
            .fire_bulk_to_cancel(&mut batch, |b| Some(Intent::place_block(cause.clone(), *b)));

        if batch.entries.len() != total {
            raw.cancelled = true;
        }
        entry.set_cancelled(raw.cancelled);
    }

    pub(super) fn on_piston_retract(&mut self, raw: &mut PistonRetract, now: Instant) {
        if !raw.sticky || raw.cancelled {
            return;
        }

        let pulled = raw.retract_location;
        let head = BlockSnapshot::new(raw.piston.pos.relative(raw.direction), pulled.material);
        let key = PistonRetractKey {
            piston: raw.piston.pos,
            direction: raw.direction,
            retract_location: pulled.pos,
        };

        let cause = self.cause([Actor::from(raw.piston)]);
        let Some(mut entry) = self.debounce.piston_retract.get_if_not_present(key, raw, now) else {
            return;
        };

        self.pipeline
            .fire_to_cancel(raw, Intent::break_block(cause.clone(), pulled));
        self.pipeline.fire_to_cancel(raw, Intent::place_block(cause, head));
        entry.set_cancelled(raw.cancelled);
    }

    /// Eating cake only shows up as block damage.
    pub(super) fn on_block_damage(&mut self, raw: &mut BlockDamage) {
        if raw.block.material != Material::Cake {
            return;
        }
        let cause = self.cause([Actor::from(raw.player.clone())]);
        let intent = Intent::use_block(cause, raw.block);
        self.pipeline.fire_to_cancel(raw, intent);
    }

    pub(super) fn on_player_interact(&mut self, raw: &mut PlayerInteract, now: Instant) {
        let player = raw.player.clone();
        let item = raw.item;
        let face = raw.face;
        let cause = self.cause([Actor::from(player.clone())]);

        match raw.action {
            InteractAction::Physical => {
                let Some(clicked) = raw.clicked else {
                    return;
                };
                let silent =
                    clicked.material.is_redstone_ore() || clicked.material == Material::Soil;
                let bypass = self
                    .world_config(clicked.world())
                    .has_interact_bypass(clicked.material);

                let intent = Intent::use_block(cause, clicked)
                    .with_silent(silent)
                    .with_allowed(bypass);
                let key = BlockEntityKey::new(clicked.pos, player.id);
                self.debounce
                    .interact
                    .debounce(key, raw, intent, &mut self.pipeline, now);
            }
            InteractAction::LeftClickBlock | InteractAction::RightClickBlock => {
                let Some(clicked) = raw.clicked else {
                    return;
                };
                let placed = raw
                    .adjacent
                    .unwrap_or_else(|| BlockSnapshot::air(clicked.pos.relative(face)));
                let right_click = raw.action == InteractAction::RightClickBlock;

                if right_click {
                    self.handle_block_right_click(raw, &cause, item, clicked, face, placed);
                }
                if self.click_block(raw, &cause, clicked, placed, right_click) {
                    self.use_held_item(raw, &cause);
                }
            }
            InteractAction::LeftClickAir | InteractAction::RightClickAir => {
                self.use_held_item(raw, &cause);
            }
        }
    }

    /// Use of the clicked block and its connected halves. Returns false when
    /// putting out a fire was refused, which ends the interaction.
    fn click_block(
        &mut self,
        raw: &mut PlayerInteract,
        cause: &Cause,
        clicked: BlockSnapshot,
        placed: BlockSnapshot,
        right_click: bool,
    ) -> bool {
        let config = self.world_config(clicked.world());
        let block_bypass = config.has_interact_bypass(clicked.material);
        let item_applied = raw.item.is_some_and(|item| {
            item.material.is_item_applied_to_block(clicked.material)
                && !block_bypass
                && !config.has_interact_bypass(item.material)
        });
        let modifies_world = (clicked.material.is_block_modified_on_click(right_click)
            && !block_bypass)
            || item_applied;

        let intent = Intent::use_block(cause.clone(), clicked).with_allowed(!modifies_world);
        if self.pipeline.fire_and_test_cancel(intent) {
            raw.deny_use_block = true;
        }

        for connected in raw.connected.clone() {
            let intent = Intent::use_block(cause.clone(), connected).with_allowed(!modifies_world);
            if self.pipeline.fire_and_test_cancel(intent) {
                raw.deny_use_block = true;
                break;
            }
        }

        if !right_click && placed.material == Material::Fire {
            let intent = Intent::break_block(cause.clone(), placed);
            if self.pipeline.fire_and_test_cancel(intent) {
                raw.deny_use_block = true;
                return false;
            }
        }
        true
    }

    /// The held item itself, and items configured to count as using the
    /// block at the player's feet.
    fn use_held_item(&mut self, raw: &mut PlayerInteract, cause: &Cause) {
        let Some(item) = raw.item else {
            return;
        };
        let world = raw.player.world();

        if !item.is_block() && !raw.cancelled {
            let intent = Intent::use_item(cause.clone(), world, item);
            if self.pipeline.fire_to_cancel(raw, intent) {
                raw.deny_use_item = true;
            }
        }

        if self.world_config(world).uses_block_at_feet(item.material) {
            let intent = Intent::use_block(cause.clone(), raw.feet);
            self.pipeline.fire_to_cancel(raw, intent);
        }
    }

    /// Items that create something when used against a block. Shared by
    /// players and dispensers.
    fn handle_block_right_click<R>(
        &mut self,
        raw: &mut R,
        cause: &Cause,
        item: Option<ItemStack>,
        clicked: BlockSnapshot,
        face: BlockFace,
        placed: BlockSnapshot,
    ) where
        R: Cancellable,
    {
        let Some(item) = item else {
            return;
        };
        let spawn = |kind: EntityKind| {
            Intent::spawn_type(cause.clone(), kind, placed.pos).with_payload(Payload::Item(item))
        };

        match item.material {
            Material::Tnt => {
                let primed = BlockSnapshot::new(clicked.pos, Material::Tnt);
                self.pipeline
                    .fire_to_cancel(raw, Intent::use_block(cause.clone(), primed));

                let tnt = BlockSnapshot::new(placed.pos, Material::Tnt);
                let intent = Intent::place_block(cause.clone(), tnt).with_relevant_flag(Flag::Tnt);
                self.pipeline.fire_to_cancel(raw, intent);
            }
            material if material.is_minecart() => {
                let intent = spawn(EntityKind::Minecart).with_relevant_flag(Flag::VehiclePlace);
                self.pipeline.fire_to_cancel(raw, intent);
            }
            Material::Boat => {
                let intent = spawn(EntityKind::Boat).with_relevant_flag(Flag::VehiclePlace);
                self.pipeline.fire_to_cancel(raw, intent);
            }
            Material::SpawnEgg => {
                self.pipeline.fire_to_cancel(raw, spawn(EntityKind::Animal));
            }
            // Cocoa only grows on the sides of logs
            Material::CocoaBeans if !face.is_vertical() => {
                let cocoa = BlockSnapshot::new(placed.pos, Material::Cocoa);
                self.pipeline
                    .fire_to_cancel(raw, Intent::place_block(cause.clone(), cocoa));
            }
            _ => {}
        }
    }

    pub(super) fn on_entity_interact(&mut self, raw: &mut EntityInteract, now: Instant) {
        let block = raw.block;
        let entity = raw.entity.clone();
        let bypass = self.world_config(block.world()).has_interact_bypass(block.material);

        let cause = self.cause([Actor::from(entity.clone())]);
        let intent = Intent::use_block(cause, block).with_allowed(bypass);
        let key = BlockEntityKey::new(block.pos, entity.id);
        self.debounce
            .interact
            .debounce(key, raw, intent, &mut self.pipeline, now);
    }

    pub(super) fn on_block_ignite(&mut self, raw: &mut BlockIgnite) {
        let (actor, flag) = if let Some(player) = &raw.player {
            (Some(Actor::from(player.clone())), Some(Flag::Lighter))
        } else if let Some(entity) = &raw.igniting_entity {
            (Some(Actor::from(entity.clone())), None)
        } else if let Some(block) = raw.igniting_block {
            (Some(Actor::from(block)), Some(Flag::FireSpread))
        } else {
            (None, None)
        };

        let cause = match actor {
            Some(actor) => self.cause([actor]),
            None => Cause::unknown(),
        };
        let fire = BlockSnapshot::new(raw.block.pos, Material::Fire);
        let mut intent = Intent::place_block(cause, fire);
        if let Some(flag) = flag {
            intent = intent.with_relevant_flag(flag);
        }
        self.pipeline.fire_to_cancel(raw, intent);
    }

    pub(super) fn on_sign_change(&mut self, raw: &mut SignChange) {
        let Some(player) = raw.player.clone() else {
            return;
        };
        let cause = self.cause([Actor::from(player)]);
        let intent = Intent::use_block(cause, raw.sign);
        self.pipeline.fire_to_cancel(raw, intent);
    }

    pub(super) fn on_bed_enter(&mut self, raw: &mut BedEnter) {
        let cause = self.cause([Actor::from(raw.player.clone())]);
        let intent = Intent::use_block(cause, raw.bed).with_relevant_flag(Flag::Sleep);
        self.pipeline.fire_to_cancel(raw, intent);
    }

    pub(super) fn on_bucket_empty(&mut self, raw: &mut BucketUse) {
        // Milk buckets are drunk, not emptied
        let allowed = raw.bucket == Material::MilkBucket;
        let cause = self.cause([Actor::from(raw.player.clone())]);
        let liquid = raw.bucket.bucket_block_material().unwrap_or(Material::Air);
        let world = raw.affected.world();

        let poured = BlockSnapshot::new(raw.affected.pos, liquid);
        let place = Intent::place_block(cause.clone(), poured).with_allowed(allowed);
        self.pipeline.fire_to_cancel(raw, place);

        let use_item =
            Intent::use_item(cause, world, ItemStack::single(raw.bucket)).with_allowed(allowed);
        self.pipeline.fire_to_cancel(raw, use_item);
    }

    pub(super) fn on_bucket_fill(&mut self, raw: &mut BucketUse) {
        let allowed = raw.bucket == Material::MilkBucket;
        let cause = self.cause([Actor::from(raw.player.clone())]);
        let world = raw.affected.world();

        let take = Intent::break_block(cause.clone(), raw.affected).with_allowed(allowed);
        self.pipeline.fire_to_cancel(raw, take);

        let use_item =
            Intent::use_item(cause, world, ItemStack::single(raw.bucket)).with_allowed(allowed);
        self.pipeline.fire_to_cancel(raw, use_item);
    }

    /// Flow is a high-frequency notification, checked only when configured.
    pub(super) fn on_liquid_flow(&mut self, raw: &mut LiquidFlow) {
        let from = raw.from;
        let to = raw.to;

        if !self.world_config(from.world()).checks_liquid_flow() {
            return;
        }
        // Liquids report flowing into solid blocks
        if to.material.is_solid() && from.material.is_liquid() {
            return;
        }
        // Level changes within the same liquid
        if (from.material.is_water() && to.material.is_water())
            || (from.material.is_lava() && to.material.is_lava())
        {
            return;
        }

        let cause = self.cause([Actor::from(from)]);
        let mut intent = Intent::place_block(cause, BlockSnapshot::new(to.pos, from.material));
        if from.material.is_water() {
            intent = intent.with_relevant_flag(Flag::WaterFlow);
        } else if from.material.is_lava() {
            intent = intent.with_relevant_flag(Flag::LavaFlow);
        }
        self.pipeline.fire_to_cancel(raw, intent);
    }

    /// A dispenser uses its item, then acts like a player right-clicking
    /// the block in front of it.
    pub(super) fn on_block_dispense(&mut self, raw: &mut BlockDispense) {
        let cause = self.cause([Actor::from(raw.dispenser)]);
        let item = raw.item;
        let clicked = raw.clicked;
        let placed = raw.placed;
        let face = raw.facing.opposite();

        let intent = Intent::use_item(cause.clone(), raw.dispenser.world(), item);
        self.pipeline.fire_to_cancel(raw, intent);

        self.handle_block_right_click(raw, &cause, Some(item), clicked, face, placed);
    }
}
