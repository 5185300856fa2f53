//! Read-only snapshots handed to systems.

use crate::{AccessLevel, ActorId, ActorKind, Location, MapId, SimTime, SpawnPointId, ZoneId};

/// Immutable representation of a single actor used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActorSnapshot {
    /// Identifier of the actor.
    pub id: ActorId,
    /// Controller classification of the actor.
    pub kind: ActorKind,
    /// Privilege level of the actor.
    pub access: AccessLevel,
    /// World-plane the actor occupies.
    pub map: MapId,
    /// Current location of the actor.
    pub location: Location,
}

/// Read-only snapshot describing every actor in the world.
#[derive(Clone, Debug, Default)]
pub struct ActorView {
    snapshots: Vec<ActorSnapshot>,
}

impl ActorView {
    /// Creates a new actor view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<ActorSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &ActorSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a single actor.
    #[must_use]
    pub fn get(&self, actor: ActorId) -> Option<&ActorSnapshot> {
        self.snapshots
            .binary_search_by_key(&actor, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Reports whether the actor is a player or a companion owned by one.
    #[must_use]
    pub fn is_player_driven(&self, actor: ActorId) -> bool {
        match self.get(actor).map(|snapshot| snapshot.kind) {
            Some(ActorKind::Player) => true,
            Some(ActorKind::Companion { owner: Some(owner) }) => {
                matches!(
                    self.get(owner).map(|snapshot| snapshot.kind),
                    Some(ActorKind::Player)
                )
            }
            _ => false,
        }
    }

    /// Reports whether the actor may cause a zone to grow a new spawn point.
    ///
    /// Staff actors never do, even when player-driven.
    #[must_use]
    pub fn may_trigger_spawn(&self, actor: ActorId) -> bool {
        self.is_player_driven(actor)
            && self
                .get(actor)
                .is_some_and(|snapshot| snapshot.access == AccessLevel::Player)
    }

    /// Number of actors captured.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

/// Immutable representation of a single spawn point used for queries.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpawnPointSnapshot {
    /// Identifier of the spawn point.
    pub id: SpawnPointId,
    /// Owning zone, `None` while unresolved.
    pub zone: Option<ZoneId>,
    /// Actor the spawn point's creatures are directed at.
    pub focus: Option<ActorId>,
    /// World-plane the spawn point occupies.
    pub map: MapId,
    /// Current location of the spawn point.
    pub location: Location,
    /// Cooldown marker; the point re-arms once the clock passes it.
    pub next_spawn_time: SimTime,
    /// Number of roster entries, stale ones included.
    pub roster_len: u32,
}

/// Read-only snapshot describing every registered spawn point.
#[derive(Clone, Debug, Default)]
pub struct SpawnPointView {
    snapshots: Vec<SpawnPointSnapshot>,
}

impl SpawnPointView {
    /// Creates a new spawn point view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<SpawnPointSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &SpawnPointSnapshot> {
        self.snapshots.iter()
    }

    /// Looks up a single spawn point.
    #[must_use]
    pub fn get(&self, spawn_point: SpawnPointId) -> Option<&SpawnPointSnapshot> {
        self.snapshots
            .binary_search_by_key(&spawn_point, |snapshot| snapshot.id)
            .ok()
            .and_then(|index| self.snapshots.get(index))
    }

    /// Counts the spawn points currently owned by `zone`.
    #[must_use]
    pub fn active_in(&self, zone: ZoneId) -> usize {
        self.snapshots
            .iter()
            .filter(|snapshot| snapshot.zone == Some(zone))
            .count()
    }

    /// Number of spawn points captured.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether the view is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
