#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Zone trigger system that grows new spawn points under wandering players.
//!
//! Every actor arrival or movement inside a faction zone rolls a small chance
//! to anchor a spawn point near the actor. The active-count ceiling is read
//! from the spawn point view captured before the batch, so two arrivals in the
//! same batch may both pass it; the ceiling is a soft cap.

use hive_frontier_core::{
    ActorView, Command, ConfigError, Event, Location, MapId, SpawnPointView, Terrain,
    ZoneRegistry,
};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

const DEFAULT_SPAWN_CHANCE: f64 = 0.005;
const DEFAULT_SEARCH_RADIUS: u32 = 5;
const DEFAULT_SEARCH_ATTEMPTS: u32 = 10;
const DEFAULT_CLEARANCE: u32 = 16;
const DEFAULT_SEED: u64 = 0x6d79_726d_6964_6578;

/// Configuration parameters required to construct the zone trigger.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    rng_seed: u64,
    spawn_chance: f64,
    search_radius: u32,
    search_attempts: u32,
    clearance: u32,
}

impl Config {
    /// Creates a configuration with the reference tuning and the provided seed.
    #[must_use]
    pub const fn new(rng_seed: u64) -> Self {
        Self {
            rng_seed,
            spawn_chance: DEFAULT_SPAWN_CHANCE,
            search_radius: DEFAULT_SEARCH_RADIUS,
            search_attempts: DEFAULT_SEARCH_ATTEMPTS,
            clearance: DEFAULT_CLEARANCE,
        }
    }

    /// Overrides the per-event probability of creating a spawn point.
    #[must_use]
    pub const fn with_spawn_chance(self, spawn_chance: f64) -> Self {
        Self {
            spawn_chance,
            ..self
        }
    }

    /// Overrides the half-width of the square searched for a site.
    #[must_use]
    pub const fn with_search_radius(self, search_radius: u32) -> Self {
        Self {
            search_radius,
            ..self
        }
    }

    /// Overrides how many candidate sites are tried before falling back.
    #[must_use]
    pub const fn with_search_attempts(self, search_attempts: u32) -> Self {
        Self {
            search_attempts,
            ..self
        }
    }

    /// Overrides the vertical clearance a site must offer.
    #[must_use]
    pub const fn with_clearance(self, clearance: u32) -> Self {
        Self { clearance, ..self }
    }

    /// Seed used by the trigger's random stream.
    #[must_use]
    pub const fn rng_seed(&self) -> u64 {
        self.rng_seed
    }

    /// Probability of creating a spawn point per qualifying event.
    #[must_use]
    pub const fn spawn_chance(&self) -> f64 {
        self.spawn_chance
    }

    /// Checks that every parameter is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(0.0..=1.0).contains(&self.spawn_chance) {
            return Err(ConfigError::InvalidProbability {
                name: "spawn_chance",
                value: self.spawn_chance,
            });
        }
        if self.search_radius > i32::MAX as u32 {
            return Err(ConfigError::AboveLimit {
                name: "search_radius",
                value: u64::from(self.search_radius),
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

/// Pure system that turns actor movement inside zones into spawn point requests.
#[derive(Debug)]
pub struct ZoneTrigger {
    config: Config,
    rng: ChaCha8Rng,
}

impl ZoneTrigger {
    /// Creates a new zone trigger using the supplied configuration.
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            rng: ChaCha8Rng::seed_from_u64(config.rng_seed),
        })
    }

    /// Consumes events and immutable views to emit spawn point creation commands.
    pub fn handle<T: Terrain + ?Sized>(
        &mut self,
        events: &[Event],
        zones: &ZoneRegistry,
        actors: &ActorView,
        spawn_points: &SpawnPointView,
        terrain: &T,
        out: &mut Vec<Command>,
    ) {
        for event in events {
            let (actor, map, location) = match *event {
                Event::ActorRegistered {
                    actor,
                    map,
                    location,
                } => (actor, map, location),
                Event::ActorMoved { actor, map, to, .. } => (actor, map, to),
                _ => continue,
            };

            let Some(zone) = zones.zone_at(map, location) else {
                continue;
            };
            if !zone.faction().hosts_spawn_points() {
                continue;
            }
            let active = spawn_points.active_in(zone.id());
            if active >= usize::try_from(zone.max_spawn_points()).unwrap_or(usize::MAX) {
                continue;
            }
            if !self.rng.gen_bool(self.config.spawn_chance) {
                continue;
            }
            if !actors.may_trigger_spawn(actor) {
                continue;
            }

            let site = self.find_site(map, location, terrain);
            debug!(
                zone = zone.name(),
                actor = actor.get(),
                active,
                x = site.x(),
                y = site.y(),
                "zone requested a spawn point"
            );
            out.push(Command::CreateSpawnPoint {
                zone: zone.id(),
                focus: actor,
                map,
                location: site,
            });
        }
    }

    /// Looks for a site with enough clearance near `origin`, falling back to `origin`.
    fn find_site<T: Terrain + ?Sized>(
        &mut self,
        map: MapId,
        origin: Location,
        terrain: &T,
    ) -> Location {
        let radius = i32::try_from(self.config.search_radius).unwrap_or(i32::MAX);
        for _ in 0..self.config.search_attempts {
            let x = origin.x().saturating_add(self.rng.gen_range(-radius..=radius));
            let y = origin.y().saturating_add(self.rng.gen_range(-radius..=radius));
            let candidate = Location::new(x, y, terrain.average_elevation(map, x, y));
            if terrain.can_fit(map, candidate, self.config.clearance) {
                return candidate;
            }
        }
        origin
    }
}
