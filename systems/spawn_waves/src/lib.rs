#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Spawn wave system deciding how placed spawn points grow their population.
//!
//! The world owns rosters and timers; this system owns every random draw.
//! It requests a wave for each new spawn point, re-arms points whose cooldown
//! elapsed when a player wanders close, and picks a site and tier for every
//! creature creation the world reports as due.

use std::{collections::BTreeSet, time::Duration};

use hive_frontier_core::{
    ActorView, Command, ConfigError, CreatureKind, Event, Location, SimTime, SpawnPointId,
    SpawnPointSnapshot, SpawnPointView, Terrain, MAX_POPULATION,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

const DEFAULT_SEED: u64 = 0x7370_6177_6e65_7273;
const SECONDS_PER_MINUTE: u64 = 60;

/// Configuration parameters required to construct the spawn wave system.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    rng_seed: u64,
    min_population: u32,
    max_population: u32,
    min_cooldown_minutes: u32,
    max_cooldown_minutes: u32,
    placement_radius: u32,
    placement_attempts: u32,
    rearm_radius: u32,
}

impl Config {
    /// Creates a configuration with the reference tuning and the provided seed.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self {
            rng_seed,
            min_population: 8,
            max_population: MAX_POPULATION,
            min_cooldown_minutes: 2,
            max_cooldown_minutes: 5,
            placement_radius: 3,
            placement_attempts: 25,
            rearm_radius: 7,
        }
    }

    /// Overrides the inclusive range wave targets are drawn from.
    #[must_use]
    pub const fn with_population(self, min_population: u32, max_population: u32) -> Self {
        Self {
            min_population,
            max_population,
            ..self
        }
    }

    /// Overrides the inclusive range of whole minutes a wave cooldown lasts.
    #[must_use]
    pub const fn with_cooldown_minutes(self, min: u32, max: u32) -> Self {
        Self {
            min_cooldown_minutes: min,
            max_cooldown_minutes: max,
            ..self
        }
    }

    /// Overrides the half-width of the square searched for a creature tile.
    #[must_use]
    pub const fn with_placement_radius(self, placement_radius: u32) -> Self {
        Self {
            placement_radius,
            ..self
        }
    }

    /// Overrides how many creature tiles are tried before using the spawn point itself.
    #[must_use]
    pub const fn with_placement_attempts(self, placement_attempts: u32) -> Self {
        Self {
            placement_attempts,
            ..self
        }
    }

    /// Overrides the distance within which a player re-arms a spawn point.
    #[must_use]
    pub const fn with_rearm_radius(self, rearm_radius: u32) -> Self {
        Self {
            rearm_radius,
            ..self
        }
    }

    /// Seed used by the system's random stream.
    #[must_use]
    pub const fn rng_seed(&self) -> u64 {
        self.rng_seed
    }

    /// Checks that every parameter is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_population == 0 {
            return Err(ConfigError::Zero {
                name: "max_population",
            });
        }
        if self.min_population > self.max_population {
            return Err(ConfigError::InvertedRange {
                name: "population",
                min: u64::from(self.min_population),
                max: u64::from(self.max_population),
            });
        }
        if self.max_population > MAX_POPULATION {
            return Err(ConfigError::AboveLimit {
                name: "max_population",
                value: u64::from(self.max_population),
                limit: u64::from(MAX_POPULATION),
            });
        }
        if self.min_cooldown_minutes > self.max_cooldown_minutes {
            return Err(ConfigError::InvertedRange {
                name: "cooldown_minutes",
                min: u64::from(self.min_cooldown_minutes),
                max: u64::from(self.max_cooldown_minutes),
            });
        }
        if self.placement_radius > i32::MAX as u32 {
            return Err(ConfigError::AboveLimit {
                name: "placement_radius",
                value: u64::from(self.placement_radius),
                limit: i32::MAX as u64,
            });
        }
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

/// Pure system that drives wave requests and creature placement.
#[derive(Debug)]
pub struct SpawnWaves {
    config: Config,
    rng: ChaCha8Rng,
}

impl SpawnWaves {
    /// Creates a new spawn wave system using the supplied configuration.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        })
    }

    /// Consumes events and immutable views to emit wave and creature commands.
    ///
    /// `now` must be the world clock at the time the views were captured.
    pub fn handle<T: Terrain + ?Sized>(
        &mut self,
        events: &[Event],
        now: SimTime,
        actors: &ActorView,
        spawn_points: &SpawnPointView,
        terrain: &T,
        out: &mut Vec<Command>,
    ) {
        let mut rearmed = BTreeSet::new();

        for event in events {
            match *event {
                Event::SpawnPointCreated { spawn_point, .. } => {
                    out.push(self.wave_request(spawn_point));
                }
                Event::CreatureCreationDue {
                    spawn_point,
                    population_cap,
                } => {
                    let Some(snapshot) = spawn_points.get(spawn_point) else {
                        continue;
                    };
                    let location = self.place_creature(snapshot, terrain);
                    let kind = CreatureKind::ALL[self.rng.gen_range(0..CreatureKind::ALL.len())];
                    out.push(Command::SpawnCreature {
                        spawn_point,
                        kind,
                        location,
                        population_cap,
                    });
                }
                Event::ActorMoved { actor, map, to, .. } => {
                    if !actors.is_player_driven(actor) {
                        continue;
                    }
                    let radius = self.config.rearm_radius;
                    let nearby = spawn_points.iter().filter(|snapshot| {
                        snapshot.map == map
                            && snapshot.location.in_range(to, radius)
                            && now > snapshot.next_spawn_time
                    });
                    for snapshot in nearby {
                        if !rearmed.insert(snapshot.id) {
                            continue;
                        }
                        debug!(
                            spawn_point = snapshot.id.get(),
                            actor = actor.get(),
                            "spawn point re-armed by nearby player"
                        );
                        out.push(Command::SetSpawnPointFocus {
                            spawn_point: snapshot.id,
                            focus: Some(actor),
                        });
                        out.push(self.wave_request(snapshot.id));
                    }
                }
                _ => {}
            }
        }
    }

    fn wave_request(&mut self, spawn_point: SpawnPointId) -> Command {
        let target_population = self
            .rng
            .gen_range(self.config.min_population..=self.config.max_population);
        let minutes = self
            .rng
            .gen_range(self.config.min_cooldown_minutes..=self.config.max_cooldown_minutes);
        Command::BeginWave {
            spawn_point,
            target_population,
            cooldown: Duration::from_secs(u64::from(minutes) * SECONDS_PER_MINUTE),
        }
    }

    fn place_creature<T: Terrain + ?Sized>(
        &mut self,
        spawn_point: &SpawnPointSnapshot,
        terrain: &T,
    ) -> Location {
        let origin = spawn_point.location;
        let radius = i32::try_from(self.config.placement_radius).unwrap_or(i32::MAX);
        for _ in 0..self.config.placement_attempts {
            let x = origin.x().saturating_add(self.rng.gen_range(-radius..=radius));
            let y = origin.y().saturating_add(self.rng.gen_range(-radius..=radius));
            let candidate = Location::new(x, y, terrain.average_elevation(spawn_point.map, x, y));
            if terrain.can_spawn_creature(spawn_point.map, candidate)
                && terrain.line_of_sight(spawn_point.map, origin, candidate)
            {
                return candidate;
            }
        }
        origin
    }
}
