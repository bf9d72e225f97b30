//! # World Rules
//!
//! The world vocabulary shared by the protection pipeline: positions, block
//! faces and snapshots, materials, entities, region definitions and the
//! configuration the host loads. This crate holds data and validation only;
//! it never decides whether an action is allowed.

pub mod config;
pub mod entities;
pub mod error;
pub mod materials;
pub mod regions;
pub mod world_state;

pub use config::*;
pub use entities::*;
pub use error::*;
pub use materials::*;
pub use regions::*;
pub use world_state::*;
