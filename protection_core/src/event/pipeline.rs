//! Firing intents through the registered policies.

use std::rc::Rc;

use world_rules::{BlockPos, EntityId, ProtectionConfig, WorldConfig};

use super::{BatchNotification, Cancellable, Intent};
use crate::feedback::{DenialFeedback, TracingFeedback};

/// A policy consulted for every fired intent.
pub trait IntentHandler {
    /// Inspect the intent and cancel it to deny.
    fn handle(&mut self, intent: &mut Intent, config: &WorldConfig);

    /// Name used in logs.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Ordered list of policies plus the denial feedback sink.
pub struct EventPipeline {
    handlers: Vec<Box<dyn IntentHandler>>,
    feedback: Box<dyn DenialFeedback>,
    config: Rc<ProtectionConfig>,
}

impl EventPipeline {
    /// Create a pipeline with no policies that logs denials.
    pub fn new(config: Rc<ProtectionConfig>) -> Self {
        Self {
            handlers: Vec::new(),
            feedback: Box::new(TracingFeedback),
            config,
        }
    }

    /// Append a policy. Policies run in registration order.
    pub fn with_handler(mut self, handler: impl IntentHandler + 'static) -> Self {
        self.handlers.push(Box::new(handler));
        self
    }

    /// Replace the denial feedback sink.
    pub fn with_feedback(mut self, feedback: impl DenialFeedback + 'static) -> Self {
        self.feedback = Box::new(feedback);
        self
    }

    pub fn add_handler(&mut self, handler: Box<dyn IntentHandler>) {
        self.handlers.push(handler);
    }

    pub fn config(&self) -> Rc<ProtectionConfig> {
        Rc::clone(&self.config)
    }

    pub fn set_config(&mut self, config: Rc<ProtectionConfig>) {
        self.config = config;
    }

    /// Run the intent through the policies until one cancels it.
    ///
    /// Allowed intents skip the policies entirely.
    pub fn fire(&mut self, intent: &mut Intent) {
        let config = Rc::clone(&self.config);
        let world = config.world(intent.world());

        for handler in &mut self.handlers {
            if intent.allowed || intent.is_cancelled() {
                break;
            }
            handler.handle(intent, world);
            if intent.is_cancelled() {
                tracing::debug!(policy = handler.name(), %intent, "intent denied");
            }
        }
    }

    /// Fire an intent that has no raw notification; returns true if denied.
    pub fn fire_and_test_cancel(&mut self, mut intent: Intent) -> bool {
        self.fire(&mut intent);
        intent.is_cancelled()
    }

    /// Fire an intent on behalf of `raw` and cancel `raw` if it is denied.
    ///
    /// An already cancelled notification short-circuits and reports true
    /// without consulting anything.
    pub fn fire_to_cancel<R>(&mut self, raw: &mut R, intent: Intent) -> bool
    where
        R: Cancellable + ?Sized,
    {
        if raw.is_cancelled() {
            return true;
        }

        let mut intent = intent;
        self.fire(&mut intent);
        if intent.is_cancelled() {
            self.deny(raw, &intent);
            return true;
        }
        false
    }

    /// Fire one intent per entry of `raw`, dropping the denied entries.
    ///
    /// `build` may return `None` for entries that need no check. The
    /// notification is cancelled only when it had entries and every one of
    /// them was denied. Returns whether `raw` ended up cancelled.
    pub fn fire_bulk_to_cancel<R, F>(&mut self, raw: &mut R, mut build: F) -> bool
    where
        R: BatchNotification,
        F: FnMut(&R::Entry) -> Option<Intent>,
    {
        if raw.is_cancelled() {
            return true;
        }

        let before = raw.entries().len();
        let mut denied_at: Option<(Option<EntityId>, BlockPos)> = None;
        let mut silent = true;

        raw.retain_entries(|entry| {
            let Some(mut intent) = build(entry) else {
                return true;
            };
            self.fire(&mut intent);
            if !intent.is_cancelled() {
                return true;
            }
            if !intent.silent {
                silent = false;
                if denied_at.is_none() {
                    denied_at = intent
                        .feedback_location()
                        .map(|at| (intent.cause.first_player().map(|p| p.id), at));
                }
            }
            false
        });

        let after = raw.entries().len();
        if before > after {
            tracing::debug!(denied = before - after, total = before, "batch entries denied");
            if !silent {
                if let Some((viewer, at)) = denied_at {
                    self.feedback.notify_denial(viewer, at);
                }
            }
        }

        if before > 0 && after == 0 {
            raw.set_cancelled(true);
        }
        raw.is_cancelled()
    }

    /// Cancel `raw` because of `intent`, notifying the first time only.
    pub fn deny<R>(&mut self, raw: &mut R, intent: &Intent)
    where
        R: Cancellable + ?Sized,
    {
        if raw.is_cancelled() {
            return;
        }
        raw.set_cancelled(true);

        if intent.silent {
            return;
        }
        if let Some(at) = intent.feedback_location() {
            let viewer = intent.cause.first_player().map(|p| p.id);
            self.feedback.notify_denial(viewer, at);
        }
    }
}

impl std::fmt::Debug for EventPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<&str> = self.handlers.iter().map(|h| h.name()).collect();
        f.debug_struct("EventPipeline").field("handlers", &names).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cause::Cause;
    use crate::event::IntentKind;
    use std::cell::RefCell;
    use world_rules::{BlockSnapshot, EntityRef, Material, WorldId};

    /// Denies every intent of one kind and records what it saw.
    struct DenyKind {
        kind: IntentKind,
        seen: Rc<RefCell<Vec<IntentKind>>>,
    }

    impl IntentHandler for DenyKind {
        fn handle(&mut self, intent: &mut Intent, _config: &WorldConfig) {
            self.seen.borrow_mut().push(intent.kind);
            if intent.kind == self.kind {
                intent.cancel();
            }
        }
    }

    #[derive(Default, Clone)]
    struct Recorded(Rc<RefCell<Vec<BlockPos>>>);

    impl DenialFeedback for Recorded {
        fn notify_denial(&mut self, _viewer: Option<EntityId>, at: BlockPos) {
            self.0.borrow_mut().push(at);
        }
    }

    struct Raw {
        cancelled: bool,
        blocks: Vec<BlockSnapshot>,
    }

    impl Cancellable for Raw {
        fn is_cancelled(&self) -> bool {
            self.cancelled
        }

        fn set_cancelled(&mut self, cancelled: bool) {
            self.cancelled = cancelled;
        }
    }

    impl BatchNotification for Raw {
        type Entry = BlockSnapshot;

        fn entries(&self) -> &[BlockSnapshot] {
            &self.blocks
        }

        fn retain_entries<F>(&mut self, keep: F)
        where
            F: FnMut(&BlockSnapshot) -> bool,
        {
            self.blocks.retain(keep);
        }
    }

    fn block(x: i32) -> BlockSnapshot {
        BlockSnapshot::new(BlockPos::new(WorldId::nil(), x, 64, 0), Material::Stone)
    }

    fn pipeline(kind: IntentKind) -> (EventPipeline, Rc<RefCell<Vec<IntentKind>>>, Recorded) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let feedback = Recorded::default();
        let pipeline = EventPipeline::new(Rc::new(ProtectionConfig::default()))
            .with_handler(DenyKind {
                kind,
                seen: Rc::clone(&seen),
            })
            .with_feedback(feedback.clone());
        (pipeline, seen, feedback)
    }

    fn player_cause() -> Cause {
        Cause::of(EntityRef::player(BlockPos::new(WorldId::nil(), 0, 64, 0)))
    }

    #[test]
    fn test_allowed_intent_skips_handlers() {
        let (mut pipeline, seen, _) = pipeline(IntentKind::Break);

        let intent = Intent::break_block(player_cause(), block(1)).with_allowed(true);
        let denied = pipeline.fire_and_test_cancel(intent);

        assert!(!denied);
        assert!(seen.borrow().is_empty());
    }

    #[test]
    fn test_fire_to_cancel_notifies_once() {
        let (mut pipeline, seen, feedback) = pipeline(IntentKind::Break);
        let mut raw = Raw {
            cancelled: false,
            blocks: Vec::new(),
        };

        assert!(pipeline.fire_to_cancel(&mut raw, Intent::break_block(player_cause(), block(1))));
        assert!(pipeline.fire_to_cancel(&mut raw, Intent::break_block(player_cause(), block(2))));

        assert!(raw.cancelled);
        assert_eq!(feedback.0.borrow().len(), 1);
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn test_silent_denial_has_no_feedback() {
        let (mut pipeline, _, feedback) = pipeline(IntentKind::UseBlock);
        let mut raw = Raw {
            cancelled: false,
            blocks: Vec::new(),
        };

        let intent = Intent::use_block(player_cause(), block(1)).with_silent(true);
        pipeline.fire_to_cancel(&mut raw, intent);

        assert!(raw.cancelled);
        assert!(feedback.0.borrow().is_empty());
    }

    #[test]
    fn test_allowed_fire_leaves_raw_untouched() {
        let (mut pipeline, _, _) = pipeline(IntentKind::Break);
        let mut raw = Raw {
            cancelled: false,
            blocks: Vec::new(),
        };

        assert!(!pipeline.fire_to_cancel(&mut raw, Intent::place_block(player_cause(), block(1))));
        assert!(!raw.cancelled);
    }

    #[test]
    fn test_bulk_keeps_allowed_entries() {
        let (mut pipeline, _, feedback) = pipeline(IntentKind::Break);
        let mut raw = Raw {
            cancelled: false,
            blocks: (0..5).map(block).collect(),
        };

        let cause = player_cause();
        let cancelled = pipeline.fire_bulk_to_cancel(&mut raw, |b| {
            let kind = if b.pos.x % 2 == 1 { IntentKind::Break } else { IntentKind::Place };
            Some(Intent::new(kind, cause.clone(), crate::event::Target::Block(*b)))
        });

        assert!(!cancelled);
        assert_eq!(raw.blocks.iter().map(|b| b.pos.x).collect::<Vec<_>>(), vec![0, 2, 4]);
        assert_eq!(feedback.0.borrow().len(), 1);
    }

    #[test]
    fn test_bulk_all_denied_cancels() {
        let (mut pipeline, _, _) = pipeline(IntentKind::Break);
        let mut raw = Raw {
            cancelled: false,
            blocks: (0..5).map(block).collect(),
        };

        let cause = player_cause();
        let cancelled =
            pipeline
                .fire_bulk_to_cancel(&mut raw, |b| Some(Intent::break_block(cause.clone(), *b)));

        assert!(cancelled);
        assert!(raw.blocks.is_empty());
    }

    #[test]
    fn test_empty_bulk_is_not_cancelled() {
        let (mut pipeline, _, _) = pipeline(IntentKind::Break);
        let mut raw = Raw {
            cancelled: false,
            blocks: Vec::new(),
        };

        let cancelled =
            pipeline.fire_bulk_to_cancel(&mut raw, |b| {
                Some(Intent::break_block(Cause::unknown(), *b))
            });
        assert!(!cancelled);
    }
}
