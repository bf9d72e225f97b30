//! # Protection Core (Warden)
//!
//! Turns the many low-level world notifications into a small set of
//! canonical intents and runs them through the protection checks. Cancelled
//! intents cancel the notification that produced them.
//!
//! ## Core Components
//!
//! - **cause**: Ordered chains of actors responsible for an action
//! - **event**: Canonical intents and the pipeline of handlers that judge them
//! - **debounce**: Short-lived cache of decisions for high-frequency notifications
//! - **region**: Flag resolution over prioritised, inheriting regions
//! - **dispatcher**: Maps each raw notification onto intents
//! - **feedback**: Telling a player their action was refused
//!
//! Everything runs on the single thread that raises notifications.

pub mod cause;
pub mod debounce;
pub mod dispatcher;
pub mod event;
pub mod feedback;
pub mod region;

pub use cause::*;
pub use debounce::*;
pub use dispatcher::*;
pub use event::*;
pub use feedback::*;
pub use region::*;
