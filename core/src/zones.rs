//! Static registry of faction territories.
//!
//! The registry is built once when the process starts and never changes
//! afterwards. Lookups go through a per-plane rectangle index; when rectangles
//! of different zones overlap, the zone registered first wins.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{ConfigError, Faction, Location, MapId, TileRect, ZoneId};

/// World-plane hosting the reference deployment.
pub const REFERENCE_MAP: MapId = MapId::new(4);

/// Declarative description of one zone, as found in code or configuration.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneDefinition {
    /// Faction that claims the zone.
    pub faction: Faction,
    /// World-plane the rectangles lie on.
    pub map: MapId,
    /// Rectangles whose union forms the zone.
    pub rects: Vec<TileRect>,
    /// Ceiling on concurrently active spawn points.
    pub max_spawn_points: u32,
}

/// Ordered list of zone definitions.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ZoneTable {
    /// Definitions in registration order.
    pub zones: Vec<ZoneDefinition>,
}

impl ZoneTable {
    /// Zone layout of the reference deployment.
    #[must_use]
    pub fn reference() -> Self {
        let zone = |faction, rects: &[TileRect], max_spawn_points| ZoneDefinition {
            faction,
            map: REFERENCE_MAP,
            rects: rects.to_vec(),
            max_spawn_points,
        };

        Self {
            zones: vec![
                zone(Faction::Jukari, &[TileRect::new(640, 2_046, 115, 115)], 6),
                zone(Faction::Kurak, &[TileRect::new(291, 1_817, 125, 90)], 6),
                zone(
                    Faction::Barrab,
                    &[
                        TileRect::new(134, 1_767, 33, 20),
                        TileRect::new(142, 1_786, 57, 80),
                        TileRect::new(145, 1_750, 20, 20),
                    ],
                    5,
                ),
                zone(Faction::Barako, &[TileRect::new(620, 1_677, 95, 100)], 5),
                zone(Faction::Urali, &[TileRect::new(320, 1_551, 160, 72)], 5),
                zone(Faction::Sakkhra, &[TileRect::new(482, 1_375, 200, 200)], 8),
            ],
        }
    }

    /// Checks that the table can be registered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.zones.is_empty() {
            return Err(ConfigError::EmptyZoneTable);
        }

        if self.zones.len() > usize::from(u16::MAX) {
            return Err(ConfigError::TooManyZones {
                count: self.zones.len(),
            });
        }

        for definition in &self.zones {
            if definition.rects.iter().all(TileRect::is_empty) {
                return Err(ConfigError::ZoneWithoutArea {
                    faction: definition.faction,
                });
            }
        }

        Ok(())
    }
}

/// Registered territory bound to a faction and a spawn point ceiling.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Zone {
    id: ZoneId,
    faction: Faction,
    name: String,
    map: MapId,
    rects: Vec<TileRect>,
    max_spawn_points: u32,
}

impl Zone {
    /// Identifier assigned at registration.
    #[must_use]
    pub const fn id(&self) -> ZoneId {
        self.id
    }

    /// Faction claiming the zone.
    #[must_use]
    pub const fn faction(&self) -> Faction {
        self.faction
    }

    /// Display name derived from the faction.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// World-plane the zone lies on.
    #[must_use]
    pub const fn map(&self) -> MapId {
        self.map
    }

    /// Rectangles covered by the zone.
    #[must_use]
    pub fn rects(&self) -> &[TileRect] {
        &self.rects
    }

    /// Ceiling on concurrently active spawn points.
    #[must_use]
    pub const fn max_spawn_points(&self) -> u32 {
        self.max_spawn_points
    }

    /// Reports whether the zone covers `location` on `map`.
    #[must_use]
    pub fn contains(&self, map: MapId, location: Location) -> bool {
        self.map == map
            && self
                .rects
                .iter()
                .any(|rect| rect.contains(location.x(), location.y()))
    }
}

/// Immutable lookup service over every registered zone.
#[derive(Clone, Debug)]
pub struct ZoneRegistry {
    zones: Vec<Zone>,
    index: BTreeMap<MapId, Vec<(TileRect, ZoneId)>>,
}

impl ZoneRegistry {
    /// Registers the reference zone layout.
    #[must_use]
    pub fn reference() -> Self {
        Self::build(ZoneTable::reference())
    }

    /// Registers the zones of a validated table.
    pub fn from_table(table: ZoneTable) -> Result<Self, ConfigError> {
        table.validate()?;
        Ok(Self::build(table))
    }

    fn build(table: ZoneTable) -> Self {
        let mut zones = Vec::with_capacity(table.zones.len());
        let mut index: BTreeMap<MapId, Vec<(TileRect, ZoneId)>> = BTreeMap::new();

        for (position, definition) in table.zones.into_iter().enumerate() {
            let Ok(raw) = u16::try_from(position) else {
                break;
            };
            let id = ZoneId::new(raw);
            let bucket = index.entry(definition.map).or_default();
            for rect in definition.rects.iter().filter(|rect| !rect.is_empty()) {
                bucket.push((*rect, id));
            }

            zones.push(Zone {
                id,
                faction: definition.faction,
                name: definition.faction.display_name(),
                map: definition.map,
                rects: definition.rects,
                max_spawn_points: definition.max_spawn_points,
            });
        }

        Self { zones, index }
    }

    /// Retrieves a zone by identifier.
    #[must_use]
    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.get(usize::from(id.get()))
    }

    /// Finds the zone covering `location` on `map`.
    #[must_use]
    pub fn zone_at(&self, map: MapId, location: Location) -> Option<&Zone> {
        let bucket = self.index.get(&map)?;
        bucket
            .iter()
            .filter(|(rect, _)| rect.contains(location.x(), location.y()))
            .map(|(_, id)| *id)
            .min()
            .and_then(|id| self.zone(id))
    }

    /// Iterator over the zones in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &Zone> {
        self.zones.iter()
    }

    /// Number of registered zones.
    #[must_use]
    pub fn len(&self) -> usize {
        self.zones.len()
    }

    /// Reports whether no zone is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }
}

impl Default for ZoneRegistry {
    fn default() -> Self {
        Self::reference()
    }
}
