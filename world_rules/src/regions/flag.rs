//! Region flags - named policy settings with a state per region.

use serde::{Deserialize, Serialize};

/// Named policy settings a region can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Flag {
    /// Master switch for changing blocks and entities.
    Build,
    BlockBreak,
    BlockPlace,
    /// Using blocks and entities without changing them.
    Interact,
    /// Doors, levers, buttons and similar mechanisms.
    Use,
    Chest,
    Sleep,
    Ride,
    Lighter,
    Tnt,
    ItemPickup,
    ItemDrop,
    ExpDrops,
    VehiclePlace,
    VehicleDestroy,
    PotionSplash,
    Pvp,
    DamageAnimals,
    MobSpawning,
    FireSpread,
    WaterFlow,
    LavaFlow,
}

impl Flag {
    /// Whether region members and owners are exempt from a DENY on this flag.
    ///
    /// Environmental flags (spread, flow, spawning) and PvP apply to
    /// everyone regardless of membership.
    pub fn members_bypass(&self) -> bool {
        !matches!(
            self,
            Flag::Pvp
                | Flag::MobSpawning
                | Flag::FireSpread
                | Flag::WaterFlow
                | Flag::LavaFlow
                | Flag::ExpDrops
                | Flag::Tnt
        )
    }

    /// Configuration name of the flag.
    pub fn name(&self) -> &'static str {
        match self {
            Flag::Build => "build",
            Flag::BlockBreak => "block-break",
            Flag::BlockPlace => "block-place",
            Flag::Interact => "interact",
            Flag::Use => "use",
            Flag::Chest => "chest-access",
            Flag::Sleep => "sleep",
            Flag::Ride => "ride",
            Flag::Lighter => "lighter",
            Flag::Tnt => "tnt",
            Flag::ItemPickup => "item-pickup",
            Flag::ItemDrop => "item-drop",
            Flag::ExpDrops => "exp-drops",
            Flag::VehiclePlace => "vehicle-place",
            Flag::VehicleDestroy => "vehicle-destroy",
            Flag::PotionSplash => "potion-splash",
            Flag::Pvp => "pvp",
            Flag::DamageAnimals => "damage-animals",
            Flag::MobSpawning => "mob-spawning",
            Flag::FireSpread => "fire-spread",
            Flag::WaterFlow => "water-flow",
            Flag::LavaFlow => "lava-flow",
        }
    }
}

impl std::fmt::Display for Flag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Value of a state flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum State {
    #[default]
    Allow,
    Deny,
}

impl State {
    pub fn is_allow(&self) -> bool {
        *self == State::Allow
    }

    pub fn is_deny(&self) -> bool {
        *self == State::Deny
    }
}
