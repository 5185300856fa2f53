//! TOML configuration accepted by the command-line adapter.

use std::{fs, path::Path};

use anyhow::{bail, Context, Result};
use hive_frontier_core::{ZoneDefinition, ZoneRegistry, ZoneTable};
use hive_frontier_system_spawn_waves as spawn_waves;
use hive_frontier_system_zone_trigger as zone_trigger;
use serde::Deserialize;

/// Configuration schema understood by this build.
const CONFIG_VERSION: u32 = 1;
const DEFAULT_SEED: u64 = 0x6869_7665;

/// Parsed contents of a configuration file.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct CliConfig {
    version: u32,
    #[serde(default = "default_seed")]
    pub(crate) seed: u64,
    #[serde(default)]
    zone_trigger: ZoneTriggerOverrides,
    #[serde(default)]
    spawn_waves: SpawnWavesOverrides,
    /// Replaces the reference zone layout when non-empty.
    #[serde(default)]
    zones: Vec<ZoneDefinition>,
}

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
struct ZoneTriggerOverrides {
    spawn_chance: Option<f64>,
    search_radius: Option<u32>,
    search_attempts: Option<u32>,
    clearance: Option<u32>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
struct SpawnWavesOverrides {
    population: Option<(u32, u32)>,
    cooldown_minutes: Option<(u32, u32)>,
    placement_radius: Option<u32>,
    placement_attempts: Option<u32>,
    rearm_radius: Option<u32>,
}

fn default_seed() -> u64 {
    DEFAULT_SEED
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            version: CONFIG_VERSION,
            seed: DEFAULT_SEED,
            zone_trigger: ZoneTriggerOverrides::default(),
            spawn_waves: SpawnWavesOverrides::default(),
            zones: Vec::new(),
        }
    }
}

impl CliConfig {
    /// Reads the file at `path`, or the defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let text = fs::read_to_string(path)
            .with_context(|| format!("read config: {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("parse config: {}", path.display()))
    }

    pub(crate) fn parse(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        if config.version != CONFIG_VERSION {
            bail!(
                "unsupported config version {}, expected {CONFIG_VERSION}",
                config.version
            );
        }
        Ok(config)
    }

    pub(crate) fn zone_registry(&self) -> Result<ZoneRegistry> {
        if self.zones.is_empty() {
            return Ok(ZoneRegistry::reference());
        }
        let table = ZoneTable {
            zones: self.zones.clone(),
        };
        ZoneRegistry::from_table(table).context("invalid zone table")
    }

    pub(crate) fn zone_trigger(&self, seed: u64) -> zone_trigger::Config {
        let overrides = &self.zone_trigger;
        let mut config = zone_trigger::Config::new(seed);
        if let Some(chance) = overrides.spawn_chance {
            config = config.with_spawn_chance(chance);
        }
        if let Some(radius) = overrides.search_radius {
            config = config.with_search_radius(radius);
        }
        if let Some(attempts) = overrides.search_attempts {
            config = config.with_search_attempts(attempts);
        }
        if let Some(clearance) = overrides.clearance {
            config = config.with_clearance(clearance);
        }
        config
    }

    pub(crate) fn spawn_waves(&self, seed: u64) -> spawn_waves::Config {
        let overrides = &self.spawn_waves;
        let mut config = spawn_waves::Config::new(seed);
        if let Some((min, max)) = overrides.population {
            config = config.with_population(min, max);
        }
        if let Some((min, max)) = overrides.cooldown_minutes {
            config = config.with_cooldown_minutes(min, max);
        }
        if let Some(radius) = overrides.placement_radius {
            config = config.with_placement_radius(radius);
        }
        if let Some(attempts) = overrides.placement_attempts {
            config = config.with_placement_attempts(attempts);
        }
        if let Some(radius) = overrides.rearm_radius {
            config = config.with_rearm_radius(radius);
        }
        config
    }
}
