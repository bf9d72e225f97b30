//! Error types for region definitions and configuration loading.

use thiserror::Error;

use crate::regions::RegionId;

/// Errors raised while defining or editing regions.
#[derive(Debug, Error)]
pub enum RegionError {
    #[error("invalid region id: {0:?}")]
    InvalidId(String),

    #[error("region {0} has a malformed shape")]
    InvalidShape(RegionId),

    #[error("region already exists: {0}")]
    DuplicateRegion(RegionId),

    #[error("region not found: {0}")]
    UnknownRegion(RegionId),

    #[error("parent {parent} of region {region} does not exist")]
    UnknownParent { region: RegionId, parent: RegionId },

    #[error("making {parent} the parent of {region} would create a cycle")]
    ParentCycle { region: RegionId, parent: RegionId },
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid TOML configuration: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid JSON configuration: {0}")]
    Json(#[from] serde_json::Error),
}
