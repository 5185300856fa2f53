//! Authoritative spawn point state and its roster of creatures.

use std::collections::BTreeMap;

use hive_frontier_core::{
    ActorId, CreatureId, Location, MapId, SimTime, SpawnPointId, SpawnPointRecord,
    SpawnPointSnapshot, ZoneId, SPAWN_POINT_RECORD_VERSION,
};

/// Creature references attributed to a spawn point, in creation order.
///
/// The roster never owns its creatures and never holds the same reference
/// twice.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Roster {
    entries: Vec<CreatureId>,
}

impl Roster {
    /// Builds a roster from persisted references, keeping the first occurrence of each.
    pub(crate) fn from_references(references: impl IntoIterator<Item = CreatureId>) -> Self {
        let mut roster = Self::default();
        for creature in references {
            let _ = roster.push(creature);
        }
        roster
    }

    /// Appends a creature, refusing duplicates.
    pub(crate) fn push(&mut self, creature: CreatureId) -> bool {
        if self.entries.contains(&creature) {
            return false;
        }
        self.entries.push(creature);
        true
    }

    /// Drops every entry for which `is_live` fails and reports how many went.
    pub(crate) fn prune(&mut self, mut is_live: impl FnMut(CreatureId) -> bool) -> usize {
        let before = self.entries.len();
        self.entries.retain(|creature| is_live(*creature));
        before - self.entries.len()
    }

    /// Forgets every entry without touching the creatures and reports how many were held.
    pub(crate) fn release(&mut self) -> usize {
        let released = self.entries.len();
        self.entries.clear();
        released
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = CreatureId> + '_ {
        self.entries.iter().copied()
    }
}

/// Live spawn point anchored in the world.
#[derive(Clone, Debug)]
pub(crate) struct SpawnPoint {
    pub(crate) id: SpawnPointId,
    pub(crate) zone: Option<ZoneId>,
    pub(crate) focus: Option<ActorId>,
    pub(crate) map: MapId,
    pub(crate) location: Location,
    pub(crate) next_spawn_time: SimTime,
    pub(crate) roster: Roster,
}

impl SpawnPoint {
    pub(crate) fn snapshot(&self) -> SpawnPointSnapshot {
        SpawnPointSnapshot {
            id: self.id,
            zone: self.zone,
            focus: self.focus,
            map: self.map,
            location: self.location,
            next_spawn_time: self.next_spawn_time,
            roster_len: u32::try_from(self.roster.len()).unwrap_or(u32::MAX),
        }
    }

    pub(crate) fn record(&self) -> SpawnPointRecord {
        SpawnPointRecord {
            version: SPAWN_POINT_RECORD_VERSION,
            id: self.id,
            map: self.map,
            location: self.location,
            roster: self.roster.iter().collect(),
        }
    }
}

/// Registry that stores spawn points and manages identifier allocation.
#[derive(Debug)]
pub(crate) struct SpawnPointRegistry {
    entries: BTreeMap<SpawnPointId, SpawnPoint>,
    next_id: u32,
}

impl SpawnPointRegistry {
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_id: 0,
        }
    }

    /// Reserves the next free identifier.
    pub(crate) fn allocate(&mut self) -> SpawnPointId {
        let id = SpawnPointId::new(self.next_id);
        self.next_id = self.next_id.saturating_add(1);
        id
    }

    /// Stores a spawn point, keeping later allocations clear of its identifier.
    pub(crate) fn insert(&mut self, spawn_point: SpawnPoint) {
        self.next_id = self.next_id.max(spawn_point.id.get().saturating_add(1));
        let _ = self.entries.insert(spawn_point.id, spawn_point);
    }

    pub(crate) fn remove(&mut self, id: SpawnPointId) -> Option<SpawnPoint> {
        self.entries.remove(&id)
    }

    pub(crate) fn get(&self, id: SpawnPointId) -> Option<&SpawnPoint> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: SpawnPointId) -> Option<&mut SpawnPoint> {
        self.entries.get_mut(&id)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &SpawnPoint> {
        self.entries.values()
    }

    /// Removes every spawn point, yielding them in identifier order.
    pub(crate) fn drain(&mut self) -> Vec<SpawnPoint> {
        std::mem::take(&mut self.entries).into_values().collect()
    }
}
