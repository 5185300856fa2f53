#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Hive Frontier.
//!
//! The world owns actors, creatures, spawn points, the static zone registry
//! and the deferred task queue. Every mutation arrives as a
//! [`Command`](hive_frontier_core::Command) through [`apply`]; deferred work is
//! queued on the world's clock and fires when a `Tick` moves the clock past
//! it. Each task re-checks that its spawn point still exists before acting,
//! so deleting a spawn point never has to cancel anything.

mod persistence;
mod scheduler;
mod spawn_points;
mod terrain;

use std::{collections::BTreeMap, time::Duration};

use hive_frontier_core::{
    AccessLevel, ActorId, ActorKind, Command, CreatureId, CreatureKind, Event, Location, MapId,
    RetirementReason, SimTime, SpawnPointId, SpawnPointRecord, SpawnRejection, WaveSkipReason,
    Zone, ZoneId, ZoneRegistry, MAX_POPULATION,
};
use tracing::{debug, info, warn};

use scheduler::{Scheduler, Task};
use spawn_points::{Roster, SpawnPoint, SpawnPointRegistry};

pub use persistence::{decode_records, encode_records, PersistenceError};
pub use terrain::TileTerrain;

/// Delay between consecutive creations of one wave.
pub const CREATION_STAGGER: Duration = Duration::from_millis(333);
/// Delay after a restore before a spawn point looks up its zone.
pub const ZONE_RESOLVE_DELAY: Duration = Duration::from_secs(10);
/// Zone lookups performed before a restored spawn point stays unresolved.
pub const ZONE_RESOLVE_ATTEMPTS: u32 = 3;
/// Delay after a save before every spawn point runs its health check.
pub const POST_SAVE_CHECK_DELAY: Duration = Duration::from_secs(30);
/// Delay after a restore before every restored spawn point runs its health check.
pub const POST_RESTORE_CHECK_DELAY: Duration = Duration::from_secs(10);

#[derive(Clone, Debug)]
struct Actor {
    id: ActorId,
    kind: ActorKind,
    access: AccessLevel,
    map: MapId,
    location: Location,
}

#[derive(Clone, Debug)]
struct Creature {
    id: CreatureId,
    kind: CreatureKind,
    spawn_point: SpawnPointId,
    map: MapId,
    location: Location,
    alive: bool,
    combatant: Option<ActorId>,
}

/// Represents the authoritative Hive Frontier world state.
#[derive(Debug)]
pub struct World {
    clock: SimTime,
    zones: ZoneRegistry,
    actors: BTreeMap<ActorId, Actor>,
    next_actor_id: u32,
    creatures: BTreeMap<CreatureId, Creature>,
    next_creature_id: u32,
    spawn_points: SpawnPointRegistry,
    scheduler: Scheduler,
}

impl World {
    /// Creates a world hosting the reference zone layout.
    #[must_use]
    pub fn new() -> Self {
        Self::with_zones(ZoneRegistry::reference())
    }

    /// Creates a world hosting the provided zone registry.
    #[must_use]
    pub fn with_zones(zones: ZoneRegistry) -> Self {
        Self {
            clock: SimTime::ZERO,
            zones,
            actors: BTreeMap::new(),
            next_actor_id: 0,
            creatures: BTreeMap::new(),
            next_creature_id: 0,
            spawn_points: SpawnPointRegistry::new(),
            scheduler: Scheduler::default(),
        }
    }

    fn advance(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        self.clock = self.clock.saturating_add(dt);
        out_events.push(Event::TimeAdvanced {
            dt,
            now: self.clock,
        });

        for task in self.scheduler.take_due(self.clock) {
            self.run_task(task, out_events);
        }
    }

    fn run_task(&mut self, task: Task, out_events: &mut Vec<Event>) {
        debug!(spawn_point = task.spawn_point().get(), ?task, "scheduled task fired");

        match task {
            Task::CreateCreature {
                spawn_point,
                population_cap,
            } => {
                let Some(state) = self.spawn_points.get(spawn_point) else {
                    return;
                };
                if !state.map.is_simulated() {
                    return;
                }
                out_events.push(Event::CreatureCreationDue {
                    spawn_point,
                    population_cap,
                });
            }
            Task::AssignFocus {
                spawn_point,
                creature,
            } => {
                let Some(state) = self.spawn_points.get(spawn_point) else {
                    return;
                };
                let focus = state
                    .focus
                    .filter(|actor| self.actors.contains_key(actor));
                let Some(target) = self
                    .creatures
                    .get_mut(&creature)
                    .filter(|target| target.alive)
                else {
                    return;
                };
                target.combatant = focus;
                out_events.push(Event::CreatureFocusAssigned { creature, focus });
            }
            Task::ResolveZone {
                spawn_point,
                attempt,
            } => self.resolve_zone(spawn_point, attempt, out_events),
            Task::CheckPopulation { spawn_point } => {
                self.check_population(spawn_point, out_events);
            }
        }
    }

    fn register_actor(
        &mut self,
        kind: ActorKind,
        access: AccessLevel,
        map: MapId,
        location: Location,
        out_events: &mut Vec<Event>,
    ) {
        let id = ActorId::new(self.next_actor_id);
        self.next_actor_id = self.next_actor_id.saturating_add(1);
        let _ = self.actors.insert(
            id,
            Actor {
                id,
                kind,
                access,
                map,
                location,
            },
        );
        out_events.push(Event::ActorRegistered {
            actor: id,
            map,
            location,
        });
    }

    fn move_actor(
        &mut self,
        actor: ActorId,
        map: MapId,
        location: Location,
        out_events: &mut Vec<Event>,
    ) {
        let Some(state) = self.actors.get_mut(&actor) else {
            return;
        };
        let from = state.location;
        state.map = map;
        state.location = location;
        out_events.push(Event::ActorMoved {
            actor,
            map,
            from,
            to: location,
        });
    }

    fn create_spawn_point(
        &mut self,
        zone: ZoneId,
        focus: ActorId,
        map: MapId,
        location: Location,
        out_events: &mut Vec<Event>,
    ) {
        let zone = self.zones.zone(zone).map(Zone::id);
        let id = self.spawn_points.allocate();
        self.spawn_points.insert(SpawnPoint {
            id,
            zone,
            focus: Some(focus),
            map,
            location,
            next_spawn_time: self.clock,
            roster: Roster::default(),
        });
        info!(
            spawn_point = id.get(),
            zone = ?zone,
            x = location.x(),
            y = location.y(),
            "spawn point created"
        );
        out_events.push(Event::SpawnPointCreated {
            spawn_point: id,
            zone,
            map,
            location,
            focus,
        });
    }

    fn begin_wave(
        &mut self,
        id: SpawnPointId,
        target_population: u32,
        cooldown: Duration,
        out_events: &mut Vec<Event>,
    ) {
        let creatures = &self.creatures;
        let Some(spawn_point) = self.spawn_points.get_mut(id) else {
            debug!(spawn_point = id.get(), "wave requested for a missing spawn point");
            return;
        };

        let removed = spawn_point
            .roster
            .prune(|creature| is_live(creatures, creature));
        let remaining = len_u32(spawn_point.roster.len());
        if removed > 0 {
            out_events.push(Event::RosterPruned {
                spawn_point: id,
                removed: len_u32(removed),
                remaining,
            });
        }

        if !spawn_point.map.is_simulated() {
            out_events.push(Event::WaveSkipped {
                spawn_point: id,
                reason: WaveSkipReason::MapUnavailable,
            });
            return;
        }

        spawn_point.next_spawn_time = self.clock.saturating_add(cooldown);
        let target_population = target_population.min(MAX_POPULATION);
        let creations = target_population.saturating_sub(remaining);
        for step in 1..=creations {
            self.scheduler.schedule(
                self.clock.saturating_add(CREATION_STAGGER * step),
                Task::CreateCreature {
                    spawn_point: id,
                    population_cap: target_population,
                },
            );
        }

        debug!(
            spawn_point = id.get(),
            target_population, creations, "wave scheduled"
        );
        out_events.push(Event::WaveScheduled {
            spawn_point: id,
            target_population,
            creations,
            next_spawn_time: spawn_point.next_spawn_time,
        });
    }

    fn spawn_creature(
        &mut self,
        id: SpawnPointId,
        kind: CreatureKind,
        location: Location,
        population_cap: u32,
        out_events: &mut Vec<Event>,
    ) {
        let rejection = match self.spawn_points.get(id) {
            None => Some(SpawnRejection::SpawnPointMissing),
            Some(spawn_point) if !spawn_point.map.is_simulated() => {
                Some(SpawnRejection::MapUnavailable)
            }
            Some(spawn_point)
                if spawn_point.roster.len() >= len_usize(population_cap.min(MAX_POPULATION)) =>
            {
                Some(SpawnRejection::PopulationReached)
            }
            Some(_) => None,
        };
        if let Some(reason) = rejection {
            debug!(spawn_point = id.get(), ?reason, "creature spawn rejected");
            out_events.push(Event::CreatureSpawnRejected {
                spawn_point: id,
                reason,
            });
            return;
        }

        let Some(spawn_point) = self.spawn_points.get_mut(id) else {
            return;
        };
        let creature = CreatureId::new(self.next_creature_id);
        self.next_creature_id = self.next_creature_id.saturating_add(1);
        let _ = spawn_point.roster.push(creature);
        let map = spawn_point.map;

        let _ = self.creatures.insert(
            creature,
            Creature {
                id: creature,
                kind,
                spawn_point: id,
                map,
                location,
                alive: true,
                combatant: None,
            },
        );
        self.scheduler.schedule(
            self.clock,
            Task::AssignFocus {
                spawn_point: id,
                creature,
            },
        );

        debug!(
            spawn_point = id.get(),
            creature = creature.get(),
            ?kind,
            "creature spawned"
        );
        out_events.push(Event::CreatureSpawned {
            creature,
            spawn_point: id,
            kind,
            map,
            location,
        });
    }

    fn check_population(&mut self, id: SpawnPointId, out_events: &mut Vec<Event>) {
        let Some(spawn_point) = self.spawn_points.get(id) else {
            return;
        };
        let living = spawn_point
            .roster
            .iter()
            .filter(|creature| is_live(&self.creatures, *creature))
            .count();
        if living == 0 {
            self.delete_spawn_point(id, RetirementReason::Depopulated, out_events);
        }
    }

    fn delete_spawn_point(
        &mut self,
        id: SpawnPointId,
        reason: RetirementReason,
        out_events: &mut Vec<Event>,
    ) {
        let Some(mut spawn_point) = self.spawn_points.remove(id) else {
            return;
        };
        let released = spawn_point.roster.release();
        info!(spawn_point = id.get(), ?reason, released, "spawn point deleted");
        out_events.push(Event::SpawnPointDeleted {
            spawn_point: id,
            zone: spawn_point.zone,
            reason,
            released: len_u32(released),
        });
    }

    fn resolve_zone(&mut self, id: SpawnPointId, attempt: u32, out_events: &mut Vec<Event>) {
        let Some(spawn_point) = self.spawn_points.get_mut(id) else {
            return;
        };

        match self
            .zones
            .zone_at(spawn_point.map, spawn_point.location)
            .map(Zone::id)
        {
            Some(zone) => {
                spawn_point.zone = Some(zone);
                out_events.push(Event::SpawnPointZoneResolved {
                    spawn_point: id,
                    zone,
                });
            }
            None if attempt < ZONE_RESOLVE_ATTEMPTS => {
                debug!(spawn_point = id.get(), attempt, "zone lookup failed, retrying");
                self.scheduler.schedule(
                    self.clock.saturating_add(ZONE_RESOLVE_DELAY),
                    Task::ResolveZone {
                        spawn_point: id,
                        attempt: attempt + 1,
                    },
                );
            }
            None => {
                warn!(spawn_point = id.get(), attempt, "spawn point left without a zone");
                out_events.push(Event::SpawnPointZoneUnresolved {
                    spawn_point: id,
                    attempts: attempt,
                });
            }
        }
    }

    fn save(&mut self, out_events: &mut Vec<Event>) {
        let records: Vec<SpawnPointRecord> =
            self.spawn_points.iter().map(SpawnPoint::record).collect();
        let due = self.clock.saturating_add(POST_SAVE_CHECK_DELAY);
        for record in &records {
            self.scheduler.schedule(
                due,
                Task::CheckPopulation {
                    spawn_point: record.id,
                },
            );
        }
        info!(count = records.len(), "spawn point records captured");
        out_events.push(Event::SpawnPointsSaved { records });
    }

    fn restore(&mut self, records: Vec<SpawnPointRecord>, out_events: &mut Vec<Event>) {
        let replaced = self.spawn_points.drain();
        if !replaced.is_empty() {
            debug!(count = replaced.len(), "discarding in-memory spawn points");
        }
        self.scheduler = Scheduler::default();

        let mut restored = 0_u32;
        let mut discarded = 0_u32;
        for record in records {
            let roster = Roster::from_references(
                record
                    .roster
                    .iter()
                    .copied()
                    .filter(|creature| self.creatures.contains_key(creature)),
            );
            let dropped = record.roster.len() - roster.len();
            if dropped > 0 {
                debug!(
                    spawn_point = record.id.get(),
                    dropped, "unresolvable creature references dropped"
                );
            }

            if roster.is_empty() {
                discarded += 1;
                info!(spawn_point = record.id.get(), "restored spawn point is empty");
                out_events.push(Event::SpawnPointDeleted {
                    spawn_point: record.id,
                    zone: None,
                    reason: RetirementReason::RestoredEmpty,
                    released: 0,
                });
                continue;
            }

            self.spawn_points.insert(SpawnPoint {
                id: record.id,
                zone: None,
                focus: None,
                map: record.map,
                location: record.location,
                next_spawn_time: SimTime::ZERO,
                roster,
            });
            self.scheduler.schedule(
                self.clock.saturating_add(POST_RESTORE_CHECK_DELAY),
                Task::CheckPopulation {
                    spawn_point: record.id,
                },
            );
            self.scheduler.schedule(
                self.clock.saturating_add(ZONE_RESOLVE_DELAY),
                Task::ResolveZone {
                    spawn_point: record.id,
                    attempt: 1,
                },
            );
            restored += 1;
        }

        info!(restored, discarded, "spawn points restored");
        out_events.push(Event::SpawnPointsRestored {
            restored,
            discarded,
        });
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => world.advance(dt, out_events),
        Command::RegisterActor {
            kind,
            access,
            map,
            location,
        } => world.register_actor(kind, access, map, location, out_events),
        Command::MoveActor {
            actor,
            map,
            location,
        } => world.move_actor(actor, map, location, out_events),
        Command::RemoveActor { actor } => {
            if world.actors.remove(&actor).is_some() {
                out_events.push(Event::ActorRemoved { actor });
            }
        }
        Command::CreateSpawnPoint {
            zone,
            focus,
            map,
            location,
        } => world.create_spawn_point(zone, focus, map, location, out_events),
        Command::BeginWave {
            spawn_point,
            target_population,
            cooldown,
        } => world.begin_wave(spawn_point, target_population, cooldown, out_events),
        Command::SpawnCreature {
            spawn_point,
            kind,
            location,
            population_cap,
        } => world.spawn_creature(spawn_point, kind, location, population_cap, out_events),
        Command::KillCreature { creature } => {
            if let Some(state) = world.creatures.get_mut(&creature) {
                if state.alive {
                    state.alive = false;
                    out_events.push(Event::CreatureKilled { creature });
                }
            }
        }
        Command::RemoveCreature { creature } => {
            if world.creatures.remove(&creature).is_some() {
                out_events.push(Event::CreatureRemoved { creature });
            }
        }
        Command::SetSpawnPointFocus { spawn_point, focus } => {
            if let Some(state) = world.spawn_points.get_mut(spawn_point) {
                state.focus = focus;
                out_events.push(Event::SpawnPointFocusChanged { spawn_point, focus });
            }
        }
        Command::SetNextSpawnTime { spawn_point, at } => {
            if let Some(state) = world.spawn_points.get_mut(spawn_point) {
                state.next_spawn_time = at;
                out_events.push(Event::SpawnPointNextSpawnChanged { spawn_point, at });
            }
        }
        Command::RelocateSpawnPoint {
            spawn_point,
            map,
            location,
        } => {
            if let Some(state) = world.spawn_points.get_mut(spawn_point) {
                state.map = map;
                state.location = location;
                out_events.push(Event::SpawnPointRelocated {
                    spawn_point,
                    map,
                    location,
                });
            }
        }
        Command::CheckPopulation { spawn_point } => {
            world.check_population(spawn_point, out_events);
        }
        Command::DeleteSpawnPoint { spawn_point } => {
            world.delete_spawn_point(spawn_point, RetirementReason::Administrative, out_events);
        }
        Command::SaveSpawnPoints => world.save(out_events),
        Command::RestoreSpawnPoints { records } => world.restore(records, out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use hive_frontier_core::{
        ActorId, ActorSnapshot, ActorView, CreatureId, CreatureKind, Location, MapId, SimTime,
        SpawnPointId, SpawnPointSnapshot, SpawnPointView, ZoneId, ZoneRegistry,
    };

    use super::{Creature, Task, World};

    /// Current value of the simulation clock.
    #[must_use]
    pub fn now(world: &World) -> SimTime {
        world.clock
    }

    /// Provides read-only access to the zone registry.
    #[must_use]
    pub fn zones(world: &World) -> &ZoneRegistry {
        &world.zones
    }

    /// Captures a read-only view of every actor.
    #[must_use]
    pub fn actor_view(world: &World) -> ActorView {
        ActorView::from_snapshots(
            world
                .actors
                .values()
                .map(|actor| ActorSnapshot {
                    id: actor.id,
                    kind: actor.kind,
                    access: actor.access,
                    map: actor.map,
                    location: actor.location,
                })
                .collect(),
        )
    }

    /// Captures a read-only view of every spawn point.
    #[must_use]
    pub fn spawn_point_view(world: &World) -> SpawnPointView {
        SpawnPointView::from_snapshots(
            world
                .spawn_points
                .iter()
                .map(|spawn_point| spawn_point.snapshot())
                .collect(),
        )
    }

    /// Captures a single spawn point.
    #[must_use]
    pub fn spawn_point(world: &World, spawn_point: SpawnPointId) -> Option<SpawnPointSnapshot> {
        world
            .spawn_points
            .get(spawn_point)
            .map(|state| state.snapshot())
    }

    /// Roster of a spawn point in creation order.
    #[must_use]
    pub fn roster(world: &World, spawn_point: SpawnPointId) -> Option<Vec<CreatureId>> {
        world
            .spawn_points
            .get(spawn_point)
            .map(|state| state.roster.iter().collect())
    }

    /// Counts the spawn points currently owned by `zone`.
    #[must_use]
    pub fn active_spawn_points(world: &World, zone: ZoneId) -> usize {
        world
            .spawn_points
            .iter()
            .filter(|spawn_point| spawn_point.zone == Some(zone))
            .count()
    }

    /// Captures a single creature.
    #[must_use]
    pub fn creature(world: &World, creature: CreatureId) -> Option<CreatureSnapshot> {
        world.creatures.get(&creature).map(snapshot_of)
    }

    /// Captures every creature in identifier order.
    #[must_use]
    pub fn creatures(world: &World) -> Vec<CreatureSnapshot> {
        world.creatures.values().map(snapshot_of).collect()
    }

    /// Due times of the creations still pending for a spawn point.
    #[must_use]
    pub fn pending_creations(world: &World, spawn_point: SpawnPointId) -> Vec<SimTime> {
        world
            .scheduler
            .pending()
            .into_iter()
            .filter_map(|(due, task)| match task {
                Task::CreateCreature {
                    spawn_point: owner, ..
                } if owner == spawn_point => Some(due),
                _ => None,
            })
            .collect()
    }

    /// Number of deferred tasks waiting for the clock.
    #[must_use]
    pub fn pending_task_count(world: &World) -> usize {
        world.scheduler.pending().len()
    }

    /// Immutable representation of a single creature used for queries.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub struct CreatureSnapshot {
        /// Identifier of the creature.
        pub id: CreatureId,
        /// Tier of the creature.
        pub kind: CreatureKind,
        /// Spawn point that created the creature.
        pub spawn_point: SpawnPointId,
        /// World-plane the creature occupies.
        pub map: MapId,
        /// Location of the creature.
        pub location: Location,
        /// Whether the creature is still alive.
        pub alive: bool,
        /// Actor the creature is fighting, if any.
        pub combatant: Option<ActorId>,
    }

    fn snapshot_of(creature: &Creature) -> CreatureSnapshot {
        CreatureSnapshot {
            id: creature.id,
            kind: creature.kind,
            spawn_point: creature.spawn_point,
            map: creature.map,
            location: creature.location,
            alive: creature.alive,
            combatant: creature.combatant,
        }
    }
}

fn is_live(creatures: &BTreeMap<CreatureId, Creature>, creature: CreatureId) -> bool {
    creatures.get(&creature).is_some_and(|state| state.alive)
}

fn len_u32(len: usize) -> u32 {
    u32::try_from(len).unwrap_or(u32::MAX)
}

fn len_usize(value: u32) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hive_frontier_core::REFERENCE_MAP;

    fn world_with_spawn_point() -> (World, SpawnPointId, ActorId) {
        let mut world = World::new();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::RegisterActor {
                kind: ActorKind::Player,
                access: AccessLevel::Player,
                map: REFERENCE_MAP,
                location: Location::new(700, 2_100, 0),
            },
            &mut events,
        );
        let actor = ActorId::new(0);
        apply(
            &mut world,
            Command::CreateSpawnPoint {
                zone: ZoneId::new(0),
                focus: actor,
                map: REFERENCE_MAP,
                location: Location::new(702, 2_101, 0),
            },
            &mut events,
        );
        (world, SpawnPointId::new(0), actor)
    }

    fn spawn(world: &mut World, spawn_point: SpawnPointId, events: &mut Vec<Event>) {
        apply(
            world,
            Command::SpawnCreature {
                spawn_point,
                kind: CreatureKind::Drone,
                location: Location::new(703, 2_102, 0),
                population_cap: MAX_POPULATION,
            },
            events,
        );
    }

    #[test]
    fn wave_schedules_staggered_creations() {
        let (mut world, spawn_point, _) = world_with_spawn_point();
        let mut events = Vec::new();
        for _ in 0..3 {
            spawn(&mut world, spawn_point, &mut events);
        }

        events.clear();
        apply(
            &mut world,
            Command::BeginWave {
                spawn_point,
                target_population: 10,
                cooldown: Duration::from_secs(180),
            },
            &mut events,
        );

        assert_eq!(
            events,
            vec![Event::WaveScheduled {
                spawn_point,
                target_population: 10,
                creations: 7,
                next_spawn_time: SimTime::from_millis(180_000),
            }]
        );
        let due: Vec<u64> = query::pending_creations(&world, spawn_point)
            .into_iter()
            .map(|due| due.as_millis())
            .collect();
        assert_eq!(due, vec![333, 666, 999, 1_332, 1_665, 1_998, 2_331]);
    }

    #[test]
    fn wave_prunes_dead_and_removed_creatures_first() {
        let (mut world, spawn_point, _) = world_with_spawn_point();
        let mut events = Vec::new();
        for _ in 0..4 {
            spawn(&mut world, spawn_point, &mut events);
        }
        apply(
            &mut world,
            Command::KillCreature {
                creature: CreatureId::new(1),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::RemoveCreature {
                creature: CreatureId::new(2),
            },
            &mut events,
        );

        events.clear();
        apply(
            &mut world,
            Command::BeginWave {
                spawn_point,
                target_population: 8,
                cooldown: Duration::from_secs(120),
            },
            &mut events,
        );

        assert_eq!(
            events[0],
            Event::RosterPruned {
                spawn_point,
                removed: 2,
                remaining: 2,
            }
        );
        assert_eq!(
            query::roster(&world, spawn_point),
            Some(vec![CreatureId::new(0), CreatureId::new(3)])
        );
        assert_eq!(query::pending_creations(&world, spawn_point).len(), 6);
    }

    #[test]
    fn staging_plane_skips_the_wave_and_pending_creations() {
        let (mut world, spawn_point, _) = world_with_spawn_point();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::BeginWave {
                spawn_point,
                target_population: 8,
                cooldown: Duration::from_secs(120),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::RelocateSpawnPoint {
                spawn_point,
                map: MapId::INTERNAL,
                location: Location::default(),
            },
            &mut events,
        );

        events.clear();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(5),
            },
            &mut events,
        );
        assert!(!events
            .iter()
            .any(|event| matches!(event, Event::CreatureCreationDue { .. })));

        events.clear();
        apply(
            &mut world,
            Command::BeginWave {
                spawn_point,
                target_population: 8,
                cooldown: Duration::from_secs(120),
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::WaveSkipped {
                spawn_point,
                reason: WaveSkipReason::MapUnavailable,
            }]
        );
    }

    #[test]
    fn creations_stop_at_the_wave_population() {
        let (mut world, spawn_point, _) = world_with_spawn_point();
        let mut events = Vec::new();
        for _ in 0..2 {
            apply(
                &mut world,
                Command::SpawnCreature {
                    spawn_point,
                    kind: CreatureKind::Larva,
                    location: Location::new(700, 2_100, 0),
                    population_cap: 2,
                },
                &mut events,
            );
        }

        events.clear();
        apply(
            &mut world,
            Command::SpawnCreature {
                spawn_point,
                kind: CreatureKind::Larva,
                location: Location::new(700, 2_100, 0),
                population_cap: 2,
            },
            &mut events,
        );
        assert_eq!(
            events,
            vec![Event::CreatureSpawnRejected {
                spawn_point,
                reason: SpawnRejection::PopulationReached,
            }]
        );
    }

    #[test]
    fn focus_is_read_when_the_assignment_fires() {
        let (mut world, spawn_point, _) = world_with_spawn_point();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::RegisterActor {
                kind: ActorKind::Player,
                access: AccessLevel::Player,
                map: REFERENCE_MAP,
                location: Location::new(705, 2_100, 0),
            },
            &mut events,
        );
        spawn(&mut world, spawn_point, &mut events);
        apply(
            &mut world,
            Command::SetSpawnPointFocus {
                spawn_point,
                focus: Some(ActorId::new(1)),
            },
            &mut events,
        );

        events.clear();
        apply(&mut world, Command::Tick { dt: Duration::ZERO }, &mut events);
        assert!(events.contains(&Event::CreatureFocusAssigned {
            creature: CreatureId::new(0),
            focus: Some(ActorId::new(1)),
        }));
        assert_eq!(
            query::creature(&world, CreatureId::new(0)).and_then(|c| c.combatant),
            Some(ActorId::new(1))
        );
    }

    #[test]
    fn departed_focus_is_assigned_as_absent() {
        let (mut world, spawn_point, actor) = world_with_spawn_point();
        let mut events = Vec::new();
        spawn(&mut world, spawn_point, &mut events);
        apply(&mut world, Command::RemoveActor { actor }, &mut events);

        events.clear();
        apply(&mut world, Command::Tick { dt: Duration::ZERO }, &mut events);
        assert!(events.contains(&Event::CreatureFocusAssigned {
            creature: CreatureId::new(0),
            focus: None,
        }));
    }

    #[test]
    fn health_check_retires_depopulated_spawn_points() {
        let (mut world, spawn_point, _) = world_with_spawn_point();
        let mut events = Vec::new();
        spawn(&mut world, spawn_point, &mut events);
        spawn(&mut world, spawn_point, &mut events);

        apply(&mut world, Command::CheckPopulation { spawn_point }, &mut events);
        assert!(query::spawn_point(&world, spawn_point).is_some());

        apply(
            &mut world,
            Command::KillCreature {
                creature: CreatureId::new(0),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::RemoveCreature {
                creature: CreatureId::new(1),
            },
            &mut events,
        );
        events.clear();
        apply(&mut world, Command::CheckPopulation { spawn_point }, &mut events);

        assert_eq!(
            events,
            vec![Event::SpawnPointDeleted {
                spawn_point,
                zone: Some(ZoneId::new(0)),
                reason: RetirementReason::Depopulated,
                released: 2,
            }]
        );
        assert!(query::spawn_point(&world, spawn_point).is_none());
        assert_eq!(query::active_spawn_points(&world, ZoneId::new(0)), 0);
        assert!(query::creature(&world, CreatureId::new(0)).is_some());
    }

    #[test]
    fn deletion_leaves_pending_creations_harmless() {
        let (mut world, spawn_point, _) = world_with_spawn_point();
        let mut events = Vec::new();
        apply(
            &mut world,
            Command::BeginWave {
                spawn_point,
                target_population: 9,
                cooldown: Duration::from_secs(120),
            },
            &mut events,
        );
        apply(&mut world, Command::DeleteSpawnPoint { spawn_point }, &mut events);

        events.clear();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(4),
            },
            &mut events,
        );
        assert_eq!(events.len(), 1, "only the clock advances: {events:?}");
        assert_eq!(query::pending_task_count(&world), 0);
    }
}
