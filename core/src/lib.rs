#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Hive Frontier engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to. Systems consume event streams, query immutable
//! views, and respond exclusively with new command batches.

mod error;
mod faction;
mod geometry;
mod terrain;
mod views;
mod zones;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use error::ConfigError;
pub use faction::{CreatureKind, Faction};
pub use geometry::{Location, MapId, TileRect};
pub use terrain::Terrain;
pub use views::{ActorSnapshot, ActorView, SpawnPointSnapshot, SpawnPointView};
pub use zones::{Zone, ZoneDefinition, ZoneRegistry, ZoneTable, REFERENCE_MAP};

/// Hard ceiling on the number of creatures a single spawn point may own.
pub const MAX_POPULATION: u32 = 12;

/// Schema version written into every persisted spawn point record.
pub const SPAWN_POINT_RECORD_VERSION: u32 = 0;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Advances the simulation clock and fires every scheduled task now due.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Introduces a new actor into the world.
    RegisterActor {
        /// Controller classification of the actor.
        kind: ActorKind,
        /// Privilege level the actor operates with.
        access: AccessLevel,
        /// World-plane the actor is placed on.
        map: MapId,
        /// Initial position of the actor.
        location: Location,
    },
    /// Moves an actor, producing the movement feed consumed by triggers.
    MoveActor {
        /// Identifier of the actor being moved.
        actor: ActorId,
        /// World-plane the actor ends up on.
        map: MapId,
        /// Destination of the move.
        location: Location,
    },
    /// Removes an actor from the world.
    RemoveActor {
        /// Identifier of the actor leaving the world.
        actor: ActorId,
    },
    /// Requests that a new spawn point be anchored inside a zone.
    CreateSpawnPoint {
        /// Zone that will own the spawn point.
        zone: ZoneId,
        /// Actor that triggered the spawn point.
        focus: ActorId,
        /// World-plane the spawn point is placed on.
        map: MapId,
        /// Location chosen for the spawn point.
        location: Location,
    },
    /// Starts a wave: prune the roster, arm the cooldown and schedule creations.
    BeginWave {
        /// Spawn point asked to produce a wave.
        spawn_point: SpawnPointId,
        /// Population the wave tops the roster up to.
        target_population: u32,
        /// Cooldown applied to the spawn point's next-spawn marker.
        cooldown: Duration,
    },
    /// Places a single creature on behalf of a spawn point.
    SpawnCreature {
        /// Spawn point that owns the new creature.
        spawn_point: SpawnPointId,
        /// Tier of creature to instantiate.
        kind: CreatureKind,
        /// Location the creature is placed at.
        location: Location,
        /// Roster size at which the creation is refused.
        population_cap: u32,
    },
    /// Marks a creature as dead while leaving it in the world.
    KillCreature {
        /// Identifier of the creature that died.
        creature: CreatureId,
    },
    /// Removes a creature from the world entirely.
    RemoveCreature {
        /// Identifier of the creature being removed.
        creature: CreatureId,
    },
    /// Replaces the combat focus of a spawn point.
    SetSpawnPointFocus {
        /// Spawn point being retargeted.
        spawn_point: SpawnPointId,
        /// New focus, or `None` to clear it.
        focus: Option<ActorId>,
    },
    /// Overwrites the next-spawn marker of a spawn point.
    SetNextSpawnTime {
        /// Spawn point being edited.
        spawn_point: SpawnPointId,
        /// New value of the marker.
        at: SimTime,
    },
    /// Moves a spawn point, possibly onto the internal staging plane.
    RelocateSpawnPoint {
        /// Spawn point being moved.
        spawn_point: SpawnPointId,
        /// Destination world-plane.
        map: MapId,
        /// Destination location.
        location: Location,
    },
    /// Runs the population health check of a spawn point immediately.
    CheckPopulation {
        /// Spawn point being checked.
        spawn_point: SpawnPointId,
    },
    /// Deletes a spawn point regardless of its population.
    DeleteSpawnPoint {
        /// Spawn point being deleted.
        spawn_point: SpawnPointId,
    },
    /// Captures persisted records for every spawn point.
    SaveSpawnPoints,
    /// Replaces all spawn points with the provided persisted records.
    RestoreSpawnPoints {
        /// Records produced by a previous save.
        records: Vec<SpawnPointRecord>,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
        /// Clock value after the tick.
        now: SimTime,
    },
    /// Confirms that an actor joined the world.
    ActorRegistered {
        /// Identifier assigned to the actor.
        actor: ActorId,
        /// World-plane the actor was placed on.
        map: MapId,
        /// Location the actor was placed at.
        location: Location,
    },
    /// Reports that an actor moved.
    ActorMoved {
        /// Identifier of the actor that moved.
        actor: ActorId,
        /// World-plane the actor occupies after the move.
        map: MapId,
        /// Location the actor occupied before the move.
        from: Location,
        /// Location the actor occupies after the move.
        to: Location,
    },
    /// Confirms that an actor left the world.
    ActorRemoved {
        /// Identifier of the departed actor.
        actor: ActorId,
    },
    /// Confirms that a spawn point was anchored into the world.
    SpawnPointCreated {
        /// Identifier assigned to the spawn point.
        spawn_point: SpawnPointId,
        /// Zone that owns the spawn point, if it is registered.
        zone: Option<ZoneId>,
        /// World-plane the spawn point occupies.
        map: MapId,
        /// Location of the spawn point.
        location: Location,
        /// Actor that triggered the spawn point.
        focus: ActorId,
    },
    /// Confirms that a spawn point was deleted and deregistered.
    SpawnPointDeleted {
        /// Identifier of the deleted spawn point.
        spawn_point: SpawnPointId,
        /// Zone the spawn point belonged to, if resolved.
        zone: Option<ZoneId>,
        /// Why the spawn point went away.
        reason: RetirementReason,
        /// Number of roster entries released without destroying creatures.
        released: u32,
    },
    /// Reports that stale roster entries were dropped.
    RosterPruned {
        /// Spawn point whose roster shrank.
        spawn_point: SpawnPointId,
        /// Number of entries removed.
        removed: u32,
        /// Number of entries left after pruning.
        remaining: u32,
    },
    /// Confirms that creations for a wave were scheduled.
    WaveScheduled {
        /// Spawn point producing the wave.
        spawn_point: SpawnPointId,
        /// Population drawn for the wave.
        target_population: u32,
        /// Number of creation tasks scheduled.
        creations: u32,
        /// Updated next-spawn marker.
        next_spawn_time: SimTime,
    },
    /// Reports that a wave request was dropped.
    WaveSkipped {
        /// Spawn point whose wave was skipped.
        spawn_point: SpawnPointId,
        /// Reason the wave could not run.
        reason: WaveSkipReason,
    },
    /// Announces that a staggered creation task fired and needs a placement.
    CreatureCreationDue {
        /// Spawn point the creation belongs to.
        spawn_point: SpawnPointId,
        /// Target population of the wave that scheduled the creation.
        population_cap: u32,
    },
    /// Confirms that a creature was placed into the world.
    CreatureSpawned {
        /// Identifier assigned to the creature.
        creature: CreatureId,
        /// Spawn point that owns the creature.
        spawn_point: SpawnPointId,
        /// Tier of the creature.
        kind: CreatureKind,
        /// World-plane the creature occupies.
        map: MapId,
        /// Location the creature was placed at.
        location: Location,
    },
    /// Reports that a creature placement was refused.
    CreatureSpawnRejected {
        /// Spawn point that requested the creature.
        spawn_point: SpawnPointId,
        /// Reason the placement was refused.
        reason: SpawnRejection,
    },
    /// Confirms that a creature received its combat target.
    CreatureFocusAssigned {
        /// Creature that was retargeted.
        creature: CreatureId,
        /// Actor the creature now targets, if any.
        focus: Option<ActorId>,
    },
    /// Confirms that a creature died.
    CreatureKilled {
        /// Identifier of the dead creature.
        creature: CreatureId,
    },
    /// Confirms that a creature was removed from the world.
    CreatureRemoved {
        /// Identifier of the removed creature.
        creature: CreatureId,
    },
    /// Confirms that a spawn point's focus changed.
    SpawnPointFocusChanged {
        /// Spawn point that was retargeted.
        spawn_point: SpawnPointId,
        /// New focus, if any.
        focus: Option<ActorId>,
    },
    /// Confirms that a spawn point's next-spawn marker was overwritten.
    SpawnPointNextSpawnChanged {
        /// Spawn point that was edited.
        spawn_point: SpawnPointId,
        /// New marker value.
        at: SimTime,
    },
    /// Confirms that a spawn point was moved.
    SpawnPointRelocated {
        /// Spawn point that moved.
        spawn_point: SpawnPointId,
        /// World-plane after the move.
        map: MapId,
        /// Location after the move.
        location: Location,
    },
    /// Reports that a restored spawn point found its owning zone.
    SpawnPointZoneResolved {
        /// Spawn point that was bound.
        spawn_point: SpawnPointId,
        /// Zone found at the spawn point's location.
        zone: ZoneId,
    },
    /// Reports that a restored spawn point gave up looking for its zone.
    SpawnPointZoneUnresolved {
        /// Spawn point left without a zone.
        spawn_point: SpawnPointId,
        /// Number of lookups performed.
        attempts: u32,
    },
    /// Carries the persisted records captured by a save.
    SpawnPointsSaved {
        /// One record per live spawn point, ordered by identifier.
        records: Vec<SpawnPointRecord>,
    },
    /// Summarises a restore.
    SpawnPointsRestored {
        /// Number of spawn points that came back to life.
        restored: u32,
        /// Number of records deleted for lack of resolvable creatures.
        discarded: u32,
    },
}

/// Reasons a spawn point leaves the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RetirementReason {
    /// The health check found no living creature.
    Depopulated,
    /// A restored record resolved to an empty roster.
    RestoredEmpty,
    /// An administrator deleted the spawn point.
    Administrative,
}

/// Reasons a wave request does not schedule any creation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum WaveSkipReason {
    /// The spawn point sits on the internal staging plane.
    MapUnavailable,
}

/// Reasons a creature placement is refused by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SpawnRejection {
    /// The spawn point was deleted before the creation fired.
    SpawnPointMissing,
    /// The spawn point sits on the internal staging plane.
    MapUnavailable,
    /// The roster already reached the wave's population.
    PopulationReached,
}

/// Controller classification of an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActorKind {
    /// Actor driven directly by a player.
    Player,
    /// Pet or follower, optionally owned by another actor.
    Companion {
        /// Actor that controls the companion, if any.
        owner: Option<ActorId>,
    },
    /// Actor driven by the simulation.
    Npc,
}

/// Privilege level of an actor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AccessLevel {
    /// Regular participant.
    #[default]
    Player,
    /// Helper with limited moderation rights.
    Counselor,
    /// Staff member able to edit world state.
    GameMaster,
    /// Full administrator.
    Administrator,
}

/// Unique identifier assigned to an actor.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ActorId(u32);

impl ActorId {
    /// Creates a new actor identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a creature.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CreatureId(u32);

impl CreatureId {
    /// Creates a new creature identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Unique identifier assigned to a spawn point.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SpawnPointId(u32);

impl SpawnPointId {
    /// Creates a new spawn point identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Index of a zone inside the registry, assigned in registration order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ZoneId(u16);

impl ZoneId {
    /// Creates a new zone identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u16 {
        self.0
    }
}

/// Simulation timestamp measured in milliseconds since the world booted.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SimTime(u64);

impl SimTime {
    /// Moment the simulation starts.
    pub const ZERO: Self = Self(0);

    /// Creates a timestamp from a millisecond count.
    #[must_use]
    pub const fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Milliseconds elapsed since the simulation started.
    #[must_use]
    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    /// Returns the timestamp `delay` later, saturating at the end of time.
    #[must_use]
    pub fn saturating_add(self, delay: Duration) -> Self {
        let millis = u64::try_from(delay.as_millis()).unwrap_or(u64::MAX);
        Self(self.0.saturating_add(millis))
    }

    /// Time elapsed since `earlier`, or zero if `earlier` lies in the future.
    #[must_use]
    pub fn saturating_duration_since(self, earlier: SimTime) -> Duration {
        Duration::from_millis(self.0.saturating_sub(earlier.0))
    }
}

/// Persisted form of a spawn point.
///
/// Only the roster is carried beyond the entity's placement; focus, cooldown
/// and owning zone are rebuilt after the world loads.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnPointRecord {
    /// Schema version of the record.
    pub version: u32,
    /// Identifier of the spawn point.
    pub id: SpawnPointId,
    /// World-plane the spawn point occupied.
    pub map: MapId,
    /// Location of the spawn point.
    pub location: Location,
    /// Creature references in creation order.
    pub roster: Vec<CreatureId>,
}
