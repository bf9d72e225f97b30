//! Denial feedback shown to whoever was refused.

use world_rules::{BlockPos, EntityId};

/// Receives one notification per denied raw notification.
///
/// Implementations must not fail; the host decides what a denial looks like
/// (particles, a chat message, nothing at all).
pub trait DenialFeedback {
    fn notify_denial(&mut self, viewer: Option<EntityId>, at: BlockPos);
}

/// Logs denials at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingFeedback;

impl DenialFeedback for TracingFeedback {
    fn notify_denial(&mut self, viewer: Option<EntityId>, at: BlockPos) {
        match viewer {
            Some(viewer) => tracing::debug!(%viewer, %at, world = %at.world, "action denied"),
            None => tracing::debug!(%at, world = %at.world, "action denied"),
        }
    }
}

/// Discards denials.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoFeedback;

impl DenialFeedback for NoFeedback {
    fn notify_denial(&mut self, _viewer: Option<EntityId>, _at: BlockPos) {}
}
