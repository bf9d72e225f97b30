//! Event abstraction dispatcher.
//!
//! Translates raw host notifications into intents, fires them through the
//! pipeline (through a debounce cache for burst-prone kinds) and writes the
//! decision back onto the notification. Handlers never look at regions.

mod block;
mod entity;
mod inventory;
mod raw;

pub use raw::*;

use std::rc::Rc;
use std::time::Instant;

use world_rules::{ProtectionConfig, RegionStore, WorldConfig, WorldId};

use crate::cause::{Actor, Cause, CauseTracker};
use crate::debounce::DebounceTables;
use crate::event::{BatchNotification, Cancellable, EventPipeline};
use crate::region::RegionPolicy;

/// Owns the pipeline and the per-dispatch state (debounce tables and cause
/// associations). Lives on the event thread.
#[derive(Debug)]
pub struct Dispatcher {
    pipeline: EventPipeline,
    debounce: DebounceTables,
    causes: CauseTracker,
    config: Rc<ProtectionConfig>,
}

impl Dispatcher {
    /// Create a dispatcher around a pipeline, using the pipeline's config.
    pub fn new(pipeline: EventPipeline) -> Self {
        let config = pipeline.config();
        Self {
            debounce: DebounceTables::new(&config.debounce),
            causes: CauseTracker::new(),
            pipeline,
            config,
        }
    }

    /// Create a dispatcher whose only policy is region protection.
    pub fn with_regions(config: ProtectionConfig, store: RegionStore) -> Self {
        let pipeline = EventPipeline::new(Rc::new(config)).with_handler(RegionPolicy::new(store));
        Self::new(pipeline)
    }

    pub fn pipeline(&self) -> &EventPipeline {
        &self.pipeline
    }

    pub fn pipeline_mut(&mut self) -> &mut EventPipeline {
        &mut self.pipeline
    }

    pub fn causes(&self) -> &CauseTracker {
        &self.causes
    }

    pub fn config(&self) -> &ProtectionConfig {
        &self.config
    }

    /// Handle a notification now.
    pub fn dispatch(&mut self, raw: &mut RawNotification) {
        self.dispatch_at(raw, Instant::now());
    }

    /// Handle a notification as if it arrived at `now`.
    pub fn dispatch_at(&mut self, raw: &mut RawNotification, now: Instant) {
        match raw {
            RawNotification::BlockBreak(raw) => self.on_block_break(raw),
            RawNotification::BlockPlace(raw) => self.on_block_place(raw),
            RawNotification::BlockBurn(raw) => self.on_block_burn(raw),
            RawNotification::StructureGrow(raw) => self.on_structure_grow(raw),
            RawNotification::EntityChangeBlock(raw) => self.on_entity_change_block(raw, now),
            RawNotification::Explosion(raw) => self.on_explosion(raw),
            RawNotification::PistonExtend(raw) => self.on_piston_extend(raw, now),
            RawNotification::PistonRetract(raw) => self.on_piston_retract(raw, now),
            RawNotification::BlockDamage(raw) => self.on_block_damage(raw),
            RawNotification::PlayerInteract(raw) => self.on_player_interact(raw, now),
            RawNotification::EntityInteract(raw) => self.on_entity_interact(raw, now),
            RawNotification::BlockIgnite(raw) => self.on_block_ignite(raw),
            RawNotification::SignChange(raw) => self.on_sign_change(raw),
            RawNotification::BedEnter(raw) => self.on_bed_enter(raw),
            RawNotification::BucketEmpty(raw) => self.on_bucket_empty(raw),
            RawNotification::BucketFill(raw) => self.on_bucket_fill(raw),
            RawNotification::LiquidFlow(raw) => self.on_liquid_flow(raw),
            RawNotification::CreatureSpawn(raw) => self.on_creature_spawn(raw),
            RawNotification::HangingPlace(raw) => self.on_hanging_place(raw),
            RawNotification::HangingBreak(raw) => self.on_hanging_break(raw),
            RawNotification::VehicleDamage(raw) => self.on_vehicle_damage(raw),
            RawNotification::VehicleEnter(raw) => self.on_vehicle_enter(raw),
            RawNotification::ExperienceDrop(raw) => self.on_experience_drop(raw),
            RawNotification::PlayerInteractEntity(raw) => self.on_player_interact_entity(raw),
            RawNotification::EntityDamage(raw) => self.on_entity_damage(raw),
            RawNotification::EntityUnleash(raw)
            | RawNotification::EntityTame(raw)
            | RawNotification::EntityShear(raw) => self.on_entity_use(raw),
            RawNotification::EntityRemove(raw) => self.on_entity_remove(raw),
            RawNotification::ItemPickup(raw) => self.on_item_pickup(raw, now),
            RawNotification::ItemDrop(raw) => self.on_item_drop(raw),
            RawNotification::ItemConsume(raw) => self.on_item_consume(raw),
            RawNotification::InventoryOpen(raw) => self.on_inventory_open(raw),
            RawNotification::InventoryMove(raw) => self.on_inventory_move(raw, now),
            RawNotification::PotionSplash(raw) => self.on_potion_splash(raw),
            RawNotification::BlockDispense(raw) => self.on_block_dispense(raw),
        }
    }

    /// Swap in a new configuration. Cached decisions and cause associations
    /// were taken under the old one and are dropped.
    pub fn reload_config(&mut self, config: ProtectionConfig) {
        let config = Rc::new(config);
        self.debounce.reconfigure(&config.debounce);
        self.causes.clear();
        self.pipeline.set_config(Rc::clone(&config));
        self.config = config;
        tracing::debug!("protection config reloaded");
    }

    /// Drop all transient state (shutdown).
    pub fn reset(&mut self) {
        self.debounce.clear();
        self.causes.clear();
    }

    fn world_config(&self, world: WorldId) -> &WorldConfig {
        self.config.world(world)
    }

    /// Build a cause, expanding tracked parents.
    fn cause(&mut self, actors: impl IntoIterator<Item = Actor>) -> Cause {
        self.causes.create(actors)
    }
}

/// A locally assembled list of entries fired as one batch.
#[derive(Debug)]
struct Batch<T> {
    entries: Vec<T>,
    cancelled: bool,
}

impl<T> Batch<T> {
    fn new(entries: Vec<T>) -> Self {
        Self {
            entries,
            cancelled: false,
        }
    }
}

impl<T> Cancellable for Batch<T> {
    fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    fn set_cancelled(&mut self, cancelled: bool) {
        self.cancelled = cancelled;
    }
}

impl<T> BatchNotification for Batch<T> {
    type Entry = T;

    fn entries(&self) -> &[T] {
        &self.entries
    }

    fn retain_entries<F>(&mut self, keep: F)
    where
        F: FnMut(&T) -> bool,
    {
        self.entries.retain(keep);
    }
}
