//! Protection configuration, loaded once by the host and read during dispatch.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::time::Duration;

use crate::error::ConfigError;
use crate::materials::Material;
use crate::regions::{Flag, State};
use crate::world_state::WorldId;

/// Lifetimes of cached debounce decisions, in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DebounceConfig {
    /// Pressure plates, tripwires and mobs trampling crops.
    pub interact_ms: u64,
    pub item_pickup_ms: u64,
    /// Entities breaking blocks (endermen, zombies at doors).
    pub entity_break_ms: u64,
    pub piston_ms: u64,
    /// Hoppers and droppers moving items.
    pub inventory_move_ms: u64,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            interact_ms: 10_000,
            item_pickup_ms: 10_000,
            entity_break_ms: 10_000,
            piston_ms: 5_000,
            inventory_move_ms: 30_000,
        }
    }
}

impl DebounceConfig {
    pub fn interact(&self) -> Duration {
        Duration::from_millis(self.interact_ms)
    }

    pub fn item_pickup(&self) -> Duration {
        Duration::from_millis(self.item_pickup_ms)
    }

    pub fn entity_break(&self) -> Duration {
        Duration::from_millis(self.entity_break_ms)
    }

    pub fn piston(&self) -> Duration {
        Duration::from_millis(self.piston_ms)
    }

    pub fn inventory_move(&self) -> Duration {
        Duration::from_millis(self.inventory_move_ms)
    }
}

/// Per-world toggles.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Whether region protection applies in this world.
    pub use_regions: bool,

    /// Check flags on high-frequency events such as liquid flow.
    pub high_frequency_flags: bool,

    /// Check liquid flow even when high-frequency flags are off.
    pub check_liquid_flow: bool,

    /// Blocks and items anyone may interact with.
    pub allow_all_interact: BTreeSet<Material>,

    /// Items whose use is checked as using the block at the player's feet.
    pub block_use_at_feet: BTreeSet<Material>,

    /// Values used when no region sets a flag.
    pub flag_defaults: BTreeMap<Flag, State>,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            use_regions: true,
            high_frequency_flags: false,
            check_liquid_flow: false,
            allow_all_interact: BTreeSet::new(),
            block_use_at_feet: BTreeSet::new(),
            flag_defaults: BTreeMap::new(),
        }
    }
}

impl WorldConfig {
    /// Whether the material bypasses interaction checks.
    pub fn has_interact_bypass(&self, material: Material) -> bool {
        self.allow_all_interact.contains(&material)
    }

    pub fn uses_block_at_feet(&self, item: Material) -> bool {
        self.block_use_at_feet.contains(&item)
    }

    /// Value of a flag when no region decides it.
    pub fn flag_default(&self, flag: Flag) -> State {
        self.flag_defaults.get(&flag).copied().unwrap_or_default()
    }

    /// Whether liquid flow is checked at all.
    pub fn checks_liquid_flow(&self) -> bool {
        self.use_regions && (self.high_frequency_flags || self.check_liquid_flow)
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ProtectionConfig {
    pub debounce: DebounceConfig,

    /// Settings for worlds without their own section.
    pub defaults: WorldConfig,

    /// Per-world overrides.
    pub worlds: HashMap<WorldId, WorldConfig>,
}

impl ProtectionConfig {
    /// Parse configuration from TOML.
    pub fn from_toml_str(source: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(source)?)
    }

    /// Parse configuration from JSON.
    pub fn from_json_str(source: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Settings of a world, falling back to the defaults.
    pub fn world(&self, world: WorldId) -> &WorldConfig {
        self.worlds.get(&world).unwrap_or(&self.defaults)
    }

    /// Set a world's settings.
    pub fn with_world(mut self, world: WorldId, config: WorldConfig) -> Self {
        self.worlds.insert(world, config);
        self
    }
}
