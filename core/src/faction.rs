//! Hostile factions and the creature tiers their hives produce.

use serde::{Deserialize, Serialize};

/// Tribes that claim territory in the valley.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Faction {
    /// Jukari tribe.
    Jukari,
    /// Kurak tribe.
    Kurak,
    /// Barrab tribe. Their land is never infested.
    Barrab,
    /// Barako tribe.
    Barako,
    /// Urali tribe.
    Urali,
    /// Sakkhra tribe.
    Sakkhra,
}

impl Faction {
    /// Every faction in declaration order.
    pub const ALL: [Faction; 6] = [
        Faction::Jukari,
        Faction::Kurak,
        Faction::Barrab,
        Faction::Barako,
        Faction::Urali,
        Faction::Sakkhra,
    ];

    /// Short tag of the faction.
    #[must_use]
    pub const fn tag(self) -> &'static str {
        match self {
            Self::Jukari => "Jukari",
            Self::Kurak => "Kurak",
            Self::Barrab => "Barrab",
            Self::Barako => "Barako",
            Self::Urali => "Urali",
            Self::Sakkhra => "Sakkhra",
        }
    }

    /// Name shown for the faction's territory.
    #[must_use]
    pub fn display_name(self) -> String {
        format!("{} tribe", self.tag())
    }

    /// Reports whether spawn points may appear on this faction's land.
    #[must_use]
    pub const fn hosts_spawn_points(self) -> bool {
        !matches!(self, Self::Barrab)
    }
}

/// Tiers of the hive species, weakest first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CreatureKind {
    /// Newly hatched larva.
    Larva,
    /// Worker drone.
    Drone,
    /// Soldier caste.
    Warrior,
}

impl CreatureKind {
    /// Every tier a spawn point can produce, each equally likely.
    pub const ALL: [CreatureKind; 3] = [
        CreatureKind::Larva,
        CreatureKind::Drone,
        CreatureKind::Warrior,
    ];
}
