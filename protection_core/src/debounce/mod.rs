//! Debounce cache - collapses bursts of identical notifications.
//!
//! Pressure plates, hoppers and pistons raise the same notification many
//! times per second for one logical action. The first arrival is evaluated;
//! repeats with an equal key inside the TTL reuse its decision.

mod keys;

pub use keys::*;

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use world_rules::DebounceConfig;

use crate::event::{Cancellable, EventPipeline, Intent};

/// Lookups between two purges of expired entries.
pub const PURGE_INTERVAL: usize = 256;

/// A cached decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebounceEntry {
    pub cancelled: bool,
    pub expires_at: Instant,
}

impl DebounceEntry {
    pub fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// Mutable access to a freshly created entry.
///
/// A detached handle belongs to a notification without a usable key; writes
/// to it are dropped.
#[derive(Debug)]
pub struct EntryHandle<'a> {
    entry: Option<&'a mut DebounceEntry>,
}

impl<'a> EntryHandle<'a> {
    pub fn detached() -> Self {
        Self { entry: None }
    }

    pub fn is_detached(&self) -> bool {
        self.entry.is_none()
    }

    /// Record the decision for later repeats.
    pub fn set_cancelled(&mut self, cancelled: bool) {
        if let Some(entry) = self.entry.as_deref_mut() {
            entry.cancelled = cancelled;
        }
    }
}

/// A notification whose structural identity can be turned into a key.
pub trait DebounceSource: Cancellable {
    type Key: Eq + Hash;

    /// `None` when the notification cannot be keyed.
    fn debounce_key(&self) -> Option<Self::Key>;
}

/// Key to decision memo with a fixed TTL.
#[derive(Debug)]
pub struct EventDebounce<K> {
    entries: HashMap<K, DebounceEntry>,
    ttl: Duration,
    lookups: usize,
}

impl<K: Eq + Hash> EventDebounce<K> {
    /// Create an empty cache whose entries live for `ttl`.
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: HashMap::new(),
            ttl,
            lookups: 0,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Change the TTL; cached decisions are dropped.
    pub fn set_ttl(&mut self, ttl: Duration) {
        self.ttl = ttl;
        self.clear();
    }

    /// Evaluate `intent` for `raw` unless an equal key was evaluated within
    /// the TTL, in which case a cached denial is reapplied instead.
    pub fn debounce<R>(
        &mut self,
        key: K,
        raw: &mut R,
        intent: Intent,
        pipeline: &mut EventPipeline,
        now: Instant,
    ) where
        R: Cancellable + ?Sized,
    {
        // A decision taken by someone else says nothing about this key
        if raw.is_cancelled() {
            return;
        }
        if let Some(mut entry) = self.get_if_not_present(key, raw, now) {
            let cancelled = pipeline.fire_to_cancel(raw, intent);
            entry.set_cancelled(cancelled);
        }
    }

    /// First arrival wins: returns a fresh entry when no live one exists.
    ///
    /// On a live hit the cached denial, if any, is applied to `raw` and
    /// `None` is returned.
    pub fn get_if_not_present<R>(
        &mut self,
        key: K,
        raw: &mut R,
        now: Instant,
    ) -> Option<EntryHandle<'_>>
    where
        R: Cancellable + ?Sized,
    {
        self.tick(now);

        if let Some(entry) = self.entries.get(&key).filter(|e| e.is_live(now)) {
            tracing::trace!(cancelled = entry.cancelled, "debounce hit");
            if entry.cancelled {
                raw.set_cancelled(true);
            }
            return None;
        }

        let fresh = DebounceEntry {
            cancelled: false,
            expires_at: now + self.ttl,
        };
        let entry = self
            .entries
            .entry(key)
            .and_modify(|e| *e = fresh)
            .or_insert(fresh);
        Some(EntryHandle { entry: Some(entry) })
    }

    /// Like [`get_if_not_present`](Self::get_if_not_present) with the key
    /// derived from the notification itself. Unkeyable notifications get a
    /// detached entry so they are always evaluated.
    pub fn try_debounce<R>(&mut self, raw: &mut R, now: Instant) -> Option<EntryHandle<'_>>
    where
        R: DebounceSource<Key = K>,
    {
        match raw.debounce_key() {
            Some(key) => self.get_if_not_present(key, raw, now),
            None => Some(EntryHandle::detached()),
        }
    }

    /// The live entry for a key.
    pub fn peek(&self, key: &K, now: Instant) -> Option<&DebounceEntry> {
        self.entries.get(key).filter(|e| e.is_live(now))
    }

    /// Drop every expired entry.
    pub fn purge_expired(&mut self, now: Instant) {
        self.entries.retain(|_, entry| entry.is_live(now));
    }

    /// Number of stored entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.lookups = 0;
    }

    fn tick(&mut self, now: Instant) {
        self.lookups += 1;
        if self.lookups >= PURGE_INTERVAL {
            self.lookups = 0;
            self.purge_expired(now);
        }
    }
}

/// The debounce caches owned by the dispatcher, one per burst-prone family.
#[derive(Debug)]
pub struct DebounceTables {
    /// Physical interaction (pressure plates, trampling).
    pub interact: EventDebounce<BlockEntityKey>,
    pub pickup: EventDebounce<EntityEntityKey>,
    pub entity_break: EventDebounce<BlockEntityKey>,
    pub move_item: EventDebounce<InventoryMoveKey>,
    pub piston_extend: EventDebounce<PistonExtendKey>,
    pub piston_retract: EventDebounce<PistonRetractKey>,
}

impl DebounceTables {
    /// Create empty tables with the configured TTLs.
    pub fn new(config: &DebounceConfig) -> Self {
        Self {
            interact: EventDebounce::new(config.interact()),
            pickup: EventDebounce::new(config.item_pickup()),
            entity_break: EventDebounce::new(config.entity_break()),
            move_item: EventDebounce::new(config.inventory_move()),
            piston_extend: EventDebounce::new(config.piston()),
            piston_retract: EventDebounce::new(config.piston()),
        }
    }

    /// Apply new TTLs, dropping every cached decision.
    pub fn reconfigure(&mut self, config: &DebounceConfig) {
        *self = Self::new(config);
    }

    pub fn clear(&mut self) {
        self.interact.clear();
        self.pickup.clear();
        self.entity_break.clear();
        self.move_item.clear();
        self.piston_extend.clear();
        self.piston_retract.clear();
    }
}

impl Default for DebounceTables {
    fn default() -> Self {
        Self::new(&DebounceConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cause::Cause;
    use crate::event::{IntentHandler, IntentKind};
    use std::cell::Cell;
    use std::rc::Rc;
    use world_rules::{BlockPos, BlockSnapshot, Material, ProtectionConfig, WorldConfig, WorldId};

    struct Counting {
        calls: Rc<Cell<usize>>,
        deny: Rc<Cell<bool>>,
    }

    impl IntentHandler for Counting {
        fn handle(&mut self, intent: &mut Intent, _config: &WorldConfig) {
            self.calls.set(self.calls.get() + 1);
            if self.deny.get() {
                intent.cancel();
            }
        }
    }

    #[derive(Default)]
    struct Raw {
        cancelled: bool,
        key: Option<u32>,
    }

    impl Cancellable for Raw {
        fn is_cancelled(&self) -> bool {
            self.cancelled
        }

        fn set_cancelled(&mut self, cancelled: bool) {
            self.cancelled = cancelled;
        }
    }

    impl DebounceSource for Raw {
        type Key = u32;

        fn debounce_key(&self) -> Option<u32> {
            self.key
        }
    }

    fn setup(deny: bool) -> (EventPipeline, Rc<Cell<usize>>, Rc<Cell<bool>>) {
        let calls = Rc::new(Cell::new(0));
        let deny = Rc::new(Cell::new(deny));
        let pipeline =
            EventPipeline::new(Rc::new(ProtectionConfig::default())).with_handler(Counting {
                calls: Rc::clone(&calls),
                deny: Rc::clone(&deny),
            });
        (pipeline, calls, deny)
    }

    fn plate() -> Intent {
        let pos = BlockPos::new(WorldId::nil(), 0, 64, 0);
        Intent::new(
            IntentKind::UseBlock,
            Cause::unknown(),
            crate::event::Target::Block(BlockSnapshot::new(pos, Material::StonePlate)),
        )
    }

    #[test]
    fn test_repeat_within_ttl_is_not_reevaluated() {
        let (mut pipeline, calls, _) = setup(true);
        let mut cache = EventDebounce::new(Duration::from_secs(10));
        let now = Instant::now();

        for offset in 0..5 {
            let mut raw = Raw::default();
            let at = now + Duration::from_secs(offset);
            cache.debounce(7u32, &mut raw, plate(), &mut pipeline, at);
            assert!(raw.cancelled);
        }

        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_allowed_hit_does_not_uncancel() {
        let (mut pipeline, _, _) = setup(false);
        let mut cache = EventDebounce::new(Duration::from_secs(10));
        let now = Instant::now();

        let mut first = Raw::default();
        cache.debounce(1u32, &mut first, plate(), &mut pipeline, now);

        let mut second = Raw {
            cancelled: true,
            key: None,
        };
        assert!(cache.get_if_not_present(1u32, &mut second, now).is_none());

        assert!(!first.cancelled);
        assert!(second.cancelled);
    }

    #[test]
    fn test_expired_entry_is_reevaluated() {
        let (mut pipeline, calls, deny) = setup(true);
        let mut cache = EventDebounce::new(Duration::from_secs(10));
        let now = Instant::now();

        let mut raw = Raw::default();
        cache.debounce(1u32, &mut raw, plate(), &mut pipeline, now);
        assert!(raw.cancelled);

        deny.set(false);
        let mut later = Raw::default();
        cache.debounce(1u32, &mut later, plate(), &mut pipeline, now + Duration::from_secs(10));

        assert!(!later.cancelled);
        assert_eq!(calls.get(), 2);
    }

    #[test]
    fn test_distinct_keys_evaluated_separately() {
        let (mut pipeline, calls, _) = setup(false);
        let mut cache = EventDebounce::new(Duration::from_secs(10));
        let now = Instant::now();

        for key in 0..3u32 {
            let mut raw = Raw::default();
            cache.debounce(key, &mut raw, plate(), &mut pipeline, now);
        }

        assert_eq!(calls.get(), 3);
    }

    #[test]
    fn test_precancelled_raw_is_not_cached() {
        let (mut pipeline, calls, _) = setup(false);
        let mut cache = EventDebounce::new(Duration::from_secs(10));
        let now = Instant::now();

        let mut raw = Raw {
            cancelled: true,
            key: None,
        };
        cache.debounce(1u32, &mut raw, plate(), &mut pipeline, now);

        assert_eq!(calls.get(), 0);
        assert!(cache.peek(&1, now).is_none());
    }

    #[test]
    fn test_get_if_not_present_first_arrival_wins() {
        let mut cache = EventDebounce::new(Duration::from_secs(5));
        let now = Instant::now();
        let mut raw = Raw::default();

        let mut entry = cache.get_if_not_present(3u32, &mut raw, now).unwrap();
        entry.set_cancelled(true);

        let mut repeat = Raw::default();
        assert!(cache.get_if_not_present(3u32, &mut repeat, now).is_none());
        assert!(repeat.cancelled);
    }

    #[test]
    fn test_try_debounce_without_key_is_detached() {
        let mut cache: EventDebounce<u32> = EventDebounce::new(Duration::from_secs(30));
        let now = Instant::now();

        for _ in 0..3 {
            let mut raw = Raw::default();
            let entry = cache.try_debounce(&mut raw, now).unwrap();
            assert!(entry.is_detached());
        }
        assert!(cache.is_empty());
    }

    #[test]
    fn test_try_debounce_with_key() {
        let mut cache = EventDebounce::new(Duration::from_secs(30));
        let now = Instant::now();

        let mut raw = Raw {
            cancelled: false,
            key: Some(9),
        };
        assert!(cache.try_debounce(&mut raw, now).is_some());
        assert!(cache.try_debounce(&mut raw, now).is_none());
    }

    #[test]
    fn test_purge_bounds_memory() {
        let mut cache = EventDebounce::new(Duration::from_millis(1));
        let now = Instant::now();

        for key in 0..(PURGE_INTERVAL as u32 - 1) {
            let mut raw = Raw::default();
            let _ = cache.get_if_not_present(key, &mut raw, now);
        }
        assert_eq!(cache.len(), PURGE_INTERVAL - 1);

        let mut raw = Raw::default();
        let _ = cache.get_if_not_present(u32::MAX, &mut raw, now + Duration::from_secs(1));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_tables_use_configured_ttls() {
        let tables = DebounceTables::default();

        assert_eq!(tables.interact.ttl(), Duration::from_secs(10));
        assert_eq!(tables.move_item.ttl(), Duration::from_secs(30));
        assert_eq!(tables.piston_extend.ttl(), Duration::from_secs(5));
    }
}
