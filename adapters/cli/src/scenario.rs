//! Scripted simulation that drives the world together with both systems.

use std::{collections::BTreeMap, time::Duration};

use anyhow::{Context, Result};
use hive_frontier_core::{
    AccessLevel, ActorId, ActorKind, Command, CreatureId, Event, Location, MapId,
    SpawnPointRecord, TileRect, ZoneId, ZoneRegistry,
};
use hive_frontier_system_spawn_waves::{self as spawn_waves, SpawnWaves};
use hive_frontier_system_zone_trigger::{self as zone_trigger, ZoneTrigger};
use hive_frontier_world::{
    self as world, decode_records, encode_records, query, TileTerrain, World,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

const TICK: Duration = Duration::from_millis(250);
const TICKS_PER_STEP: u32 = 4;
const STEP_DISTANCE: i32 = 2;
/// Margin of open ground kept around the zones of every plane.
const PLANE_MARGIN: i32 = 32;

/// Counters accumulated from the event stream.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub(crate) struct Tally {
    pub(crate) spawn_points_created: u32,
    pub(crate) spawn_points_deleted: u32,
    pub(crate) waves: u32,
    pub(crate) creatures_spawned: u32,
    pub(crate) spawns_rejected: u32,
    pub(crate) creatures_lost: u32,
}

impl Tally {
    fn observe(&mut self, event: &Event) {
        match event {
            Event::SpawnPointCreated { .. } => self.spawn_points_created += 1,
            Event::SpawnPointDeleted { .. } => self.spawn_points_deleted += 1,
            Event::WaveScheduled { .. } => self.waves += 1,
            Event::CreatureSpawned { .. } => self.creatures_spawned += 1,
            Event::CreatureSpawnRejected { .. } => self.spawns_rejected += 1,
            Event::CreatureKilled { .. } | Event::CreatureRemoved { .. } => {
                self.creatures_lost += 1;
            }
            _ => {}
        }
    }
}

/// Per-zone state reported at the end of a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct ZoneSummary {
    pub(crate) name: String,
    pub(crate) ceiling: u32,
    pub(crate) spawn_points: usize,
    pub(crate) living_creatures: usize,
}

/// Counts reported by the world after a reload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct RestoreOutcome {
    pub(crate) restored: u32,
    pub(crate) discarded: u32,
}

/// Players wandering through faction zones while both systems react.
#[derive(Debug)]
pub(crate) struct Simulation {
    world: World,
    terrain: TileTerrain,
    zone_trigger: ZoneTrigger,
    spawn_waves: SpawnWaves,
    rng: ChaCha8Rng,
    players: Vec<Wanderer>,
    tally: Tally,
}

#[derive(Clone, Copy, Debug)]
struct Wanderer {
    actor: ActorId,
    map: MapId,
    area: TileRect,
    location: Location,
}

impl Simulation {
    pub(crate) fn new(
        zones: ZoneRegistry,
        zone_trigger: zone_trigger::Config,
        spawn_waves: spawn_waves::Config,
        seed: u64,
    ) -> Result<Self> {
        let terrain = terrain_for(&zones);
        Ok(Self {
            world: World::with_zones(zones),
            terrain,
            zone_trigger: ZoneTrigger::new(zone_trigger)?,
            spawn_waves: SpawnWaves::new(spawn_waves)?,
            rng: ChaCha8Rng::seed_from_u64(seed),
            players: Vec::new(),
            tally: Tally::default(),
        })
    }

    /// Registers `count` players, spread over the zones that host spawn points.
    pub(crate) fn add_players(&mut self, count: u32) {
        let areas: Vec<(MapId, TileRect)> = query::zones(&self.world)
            .iter()
            .filter(|zone| zone.faction().hosts_spawn_points())
            .filter_map(|zone| {
                zone.rects()
                    .iter()
                    .find(|rect| !rect.is_empty())
                    .map(|rect| (zone.map(), *rect))
            })
            .collect();
        if areas.is_empty() {
            return;
        }

        for index in 0..count {
            let (map, area) = areas[index as usize % areas.len()];
            let location = self.random_point(area);
            let events = self.apply(Command::RegisterActor {
                kind: ActorKind::Player,
                access: AccessLevel::Player,
                map,
                location,
            });
            let Some(actor) = events.iter().find_map(|event| match event {
                Event::ActorRegistered { actor, .. } => Some(*actor),
                _ => None,
            }) else {
                continue;
            };
            self.pump(events);
            self.players.push(Wanderer {
                actor,
                map,
                area,
                location,
            });
        }
    }

    /// Advances the simulation by whole seconds, removing a creature every `loss_interval` seconds.
    pub(crate) fn run(&mut self, seconds: u64, loss_interval: Option<u64>) {
        for second in 1..=seconds {
            for _ in 0..TICKS_PER_STEP {
                let events = self.apply(Command::Tick { dt: TICK });
                self.pump(events);
            }
            self.wander();
            if loss_interval.is_some_and(|interval| interval > 0 && second % interval == 0) {
                self.lose_creature();
            }
        }
        info!(
            seconds,
            now_ms = query::now(&self.world).as_millis(),
            "simulation finished"
        );
    }

    /// Captures the persisted records of every spawn point.
    pub(crate) fn save(&mut self) -> Result<Vec<SpawnPointRecord>> {
        let events = self.apply(Command::SaveSpawnPoints);
        let records = events.iter().find_map(|event| match event {
            Event::SpawnPointsSaved { records } => Some(records.clone()),
            _ => None,
        });
        self.pump(events);
        records.context("world did not report saved spawn points")
    }

    /// Saves, encodes, decodes and restores every spawn point in place.
    ///
    /// Creatures stay in the world across the reload, as they would across a
    /// server restart, so populated rosters survive it.
    pub(crate) fn reload(&mut self) -> Result<RestoreOutcome> {
        let bytes = encode_records(&self.save()?)?;
        let records = decode_records(&bytes).context("decode reloaded spawn points")?;
        let events = self.apply(Command::RestoreSpawnPoints { records });
        let outcome = events.iter().find_map(|event| match event {
            Event::SpawnPointsRestored {
                restored,
                discarded,
            } => Some(RestoreOutcome {
                restored: *restored,
                discarded: *discarded,
            }),
            _ => None,
        });
        self.pump(events);

        let outcome = outcome.context("world did not report restored spawn points")?;
        info!(
            restored = outcome.restored,
            discarded = outcome.discarded,
            "spawn points reloaded"
        );
        Ok(outcome)
    }

    pub(crate) fn tally(&self) -> &Tally {
        &self.tally
    }

    pub(crate) fn zone_summaries(&self) -> Vec<ZoneSummary> {
        let mut living: BTreeMap<ZoneId, usize> = BTreeMap::new();
        let spawn_points = query::spawn_point_view(&self.world);
        for creature in query::creatures(&self.world) {
            if !creature.alive {
                continue;
            }
            if let Some(zone) = spawn_points
                .get(creature.spawn_point)
                .and_then(|spawn_point| spawn_point.zone)
            {
                *living.entry(zone).or_default() += 1;
            }
        }

        query::zones(&self.world)
            .iter()
            .map(|zone| ZoneSummary {
                name: zone.name().to_owned(),
                ceiling: zone.max_spawn_points(),
                spawn_points: query::active_spawn_points(&self.world, zone.id()),
                living_creatures: living.get(&zone.id()).copied().unwrap_or(0),
            })
            .collect()
    }

    fn apply(&mut self, command: Command) -> Vec<Event> {
        let mut events = Vec::new();
        world::apply(&mut self.world, command, &mut events);
        events
    }

    /// Feeds events to both systems until they stop issuing commands.
    fn pump(&mut self, pending_events: Vec<Event>) {
        let mut events = pending_events;

        loop {
            if events.is_empty() {
                break;
            }
            for event in &events {
                self.tally.observe(event);
            }

            let actors = query::actor_view(&self.world);
            let spawn_points = query::spawn_point_view(&self.world);
            let now = query::now(&self.world);
            let mut commands = Vec::new();
            self.zone_trigger.handle(
                &events,
                query::zones(&self.world),
                &actors,
                &spawn_points,
                &self.terrain,
                &mut commands,
            );
            self.spawn_waves.handle(
                &events,
                now,
                &actors,
                &spawn_points,
                &self.terrain,
                &mut commands,
            );

            if commands.is_empty() {
                break;
            }

            events.clear();
            for command in commands {
                world::apply(&mut self.world, command, &mut events);
            }
        }
    }

    fn wander(&mut self) {
        for index in 0..self.players.len() {
            let wanderer = self.players[index];
            let x = wanderer.location.x()
                + self.rng.gen_range(-STEP_DISTANCE..=STEP_DISTANCE);
            let y = wanderer.location.y()
                + self.rng.gen_range(-STEP_DISTANCE..=STEP_DISTANCE);
            let location = clamp_to(wanderer.area, x, y);
            self.players[index].location = location;

            let events = self.apply(Command::MoveActor {
                actor: wanderer.actor,
                map: wanderer.map,
                location,
            });
            self.pump(events);
        }
    }

    fn lose_creature(&mut self) {
        let living: Vec<CreatureId> = query::creatures(&self.world)
            .into_iter()
            .filter(|creature| creature.alive)
            .map(|creature| creature.id)
            .collect();
        if living.is_empty() {
            return;
        }
        let creature = living[self.rng.gen_range(0..living.len())];
        let command = if self.rng.gen_bool(0.5) {
            Command::KillCreature { creature }
        } else {
            Command::RemoveCreature { creature }
        };
        debug!(creature = creature.get(), "creature lost");
        let events = self.apply(command);
        self.pump(events);
    }

    fn random_point(&mut self, area: TileRect) -> Location {
        let x = area.x() + self.rng.gen_range(0..span(area.width()));
        let y = area.y() + self.rng.gen_range(0..span(area.height()));
        Location::new(x, y, 0)
    }
}

fn span(extent: u32) -> i32 {
    i32::try_from(extent).unwrap_or(i32::MAX).max(1)
}

fn clamp_to(area: TileRect, x: i32, y: i32) -> Location {
    let max_x = area.x() + span(area.width()) - 1;
    let max_y = area.y() + span(area.height()) - 1;
    Location::new(x.clamp(area.x(), max_x), y.clamp(area.y(), max_y), 0)
}

/// Flat open terrain covering every zone with a margin around it.
fn terrain_for(zones: &ZoneRegistry) -> TileTerrain {
    let mut bounds: BTreeMap<MapId, (i32, i32, i32, i32)> = BTreeMap::new();
    for zone in zones.iter() {
        for rect in zone.rects().iter().filter(|rect| !rect.is_empty()) {
            let right = rect.x() + span(rect.width());
            let bottom = rect.y() + span(rect.height());
            let entry = bounds
                .entry(zone.map())
                .or_insert((rect.x(), rect.y(), right, bottom));
            *entry = (
                entry.0.min(rect.x()),
                entry.1.min(rect.y()),
                entry.2.max(right),
                entry.3.max(bottom),
            );
        }
    }

    bounds
        .into_iter()
        .fold(TileTerrain::new(), |terrain, (map, (left, top, right, bottom))| {
            let width = u32::try_from(right - left + 2 * PLANE_MARGIN).unwrap_or(0);
            let height = u32::try_from(bottom - top + 2 * PLANE_MARGIN).unwrap_or(0);
            terrain.with_plane(
                map,
                TileRect::new(left - PLANE_MARGIN, top - PLANE_MARGIN, width, height),
                0,
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use hive_frontier_core::{Terrain, REFERENCE_MAP};

    fn simulation(spawn_chance: f64) -> Simulation {
        Simulation::new(
            ZoneRegistry::reference(),
            zone_trigger::Config::new(1).with_spawn_chance(spawn_chance),
            spawn_waves::Config::new(2),
            3,
        )
        .expect("valid configs")
    }

    #[test]
    fn terrain_covers_every_zone() {
        let zones = ZoneRegistry::reference();
        let terrain = terrain_for(&zones);
        for zone in zones.iter() {
            for rect in zone.rects() {
                let corner = Location::new(rect.x(), rect.y(), 0);
                assert!(terrain.can_spawn_creature(REFERENCE_MAP, corner), "{rect:?}");
            }
        }
    }

    #[test]
    fn players_stay_inside_their_zone() {
        let mut simulation = simulation(0.0);
        simulation.add_players(5);
        simulation.run(30, None);

        assert_eq!(simulation.players.len(), 5);
        for wanderer in &simulation.players {
            assert!(wanderer
                .area
                .contains(wanderer.location.x(), wanderer.location.y()));
        }
        assert_eq!(simulation.tally().spawn_points_created, 0);
    }

    #[test]
    fn eager_zones_fill_to_their_ceiling() {
        let mut simulation = simulation(1.0);
        simulation.add_players(10);
        simulation.run(20, Some(5));

        let tally = simulation.tally().clone();
        assert!(tally.spawn_points_created > 0);
        assert!(tally.creatures_spawned > 0);
        assert!(tally.creatures_lost > 0);

        for summary in simulation.zone_summaries() {
            assert!(
                summary.spawn_points <= summary.ceiling as usize,
                "{summary:?}"
            );
        }
    }

    #[test]
    fn reload_keeps_populated_spawn_points_and_rebinds_their_zones() {
        let mut simulation = simulation(1.0);
        simulation.add_players(6);
        simulation.run(20, None);
        let before = query::spawn_point_view(&simulation.world).iter().count();
        assert!(before > 0);

        let outcome = simulation.reload().expect("reload");
        assert_eq!(
            (outcome.restored + outcome.discarded) as usize,
            before,
            "{outcome:?}"
        );
        assert!(outcome.restored > 0);
        let restored: Vec<_> = query::spawn_point_view(&simulation.world)
            .iter()
            .map(|spawn_point| spawn_point.id)
            .collect();

        simulation.run(15, None);
        let spawn_points = query::spawn_point_view(&simulation.world);
        let zones = query::zones(&simulation.world);
        for id in restored {
            let Some(spawn_point) = spawn_points.get(id) else {
                continue;
            };
            let expected = zones
                .zone_at(spawn_point.map, spawn_point.location)
                .map(|zone| zone.id());
            assert_eq!(spawn_point.zone, expected, "{spawn_point:?}");
        }
    }

    #[test]
    fn same_seed_gives_same_outcome() {
        let run = || {
            let mut simulation = simulation(0.05);
            simulation.add_players(6);
            simulation.run(60, Some(7));
            (simulation.tally().clone(), simulation.zone_summaries())
        };
        assert_eq!(run(), run());
    }
}
