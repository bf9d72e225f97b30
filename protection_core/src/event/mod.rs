//! Canonical intents and the firing protocol around them.
//!
//! Every raw notification is reduced to a handful of intents (break, place,
//! use, spawn, destroy, damage). Policies see only intents; the pipeline
//! maps their decisions back onto the raw notification.

mod intent;
mod pipeline;

pub use intent::*;
pub use pipeline::*;

/// A notification that can be vetoed.
pub trait Cancellable {
    fn is_cancelled(&self) -> bool;

    fn set_cancelled(&mut self, cancelled: bool);
}

/// A notification carrying an ordered, removable collection of entries
/// (blocks of an explosion, blocks of a growing tree).
pub trait BatchNotification: Cancellable {
    type Entry;

    fn entries(&self) -> &[Self::Entry];

    /// Keep only the entries for which `keep` returns true, preserving order.
    fn retain_entries<F>(&mut self, keep: F)
    where
        F: FnMut(&Self::Entry) -> bool;
}
