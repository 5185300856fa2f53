#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs and inspects Hive Frontier spawn simulations.

mod config;
mod scenario;

use std::{fs, path::PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use hive_frontier_world::{decode_records, encode_records};
use tracing::info;
use tracing_subscriber::{prelude::*, EnvFilter};

use config::CliConfig;
use scenario::Simulation;

#[derive(Debug, Parser)]
#[command(author, version, about = "Hive Frontier spawn point simulator", long_about = None)]
struct Cli {
    /// Raise log output to debug level.
    #[arg(long, global = true)]
    verbose: bool,
    /// TOML file overriding the reference tuning and zone layout.
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    #[command(subcommand)]
    command: Cmd,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// List the registered zones
    Zones,
    /// Run a seeded scenario with wandering players
    Simulate {
        /// Simulated duration in seconds.
        #[arg(long, default_value_t = 600)]
        seconds: u64,
        /// Number of wandering players.
        #[arg(long, default_value_t = 8)]
        players: u32,
        /// Seconds between out-of-band creature losses; 0 disables them.
        #[arg(long, default_value_t = 20)]
        loss_interval: u64,
        /// Seed overriding the configured one.
        #[arg(long)]
        seed: Option<u64>,
        /// Save and restore every spawn point after this many seconds.
        #[arg(long)]
        reload_at: Option<u64>,
        /// Write the persisted spawn point records here when the run ends.
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Print a saved spawn point file as JSON
    Inspect {
        /// File written by `simulate --save`.
        path: PathBuf,
    },
}

/// Entry point for the Hive Frontier command-line interface.
fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = CliConfig::load(cli.config.as_deref())?;
    match cli.command {
        Cmd::Zones => list_zones(&config),
        Cmd::Simulate {
            seconds,
            players,
            loss_interval,
            seed,
            reload_at,
            save,
        } => simulate(
            &config,
            Run {
                seconds,
                players,
                loss_interval,
                reload_at,
            },
            seed,
            save,
        ),
        Cmd::Inspect { path } => inspect(path),
    }
}

fn init_tracing(verbose: bool) {
    let env_filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn list_zones(config: &CliConfig) -> Result<()> {
    let zones = config.zone_registry()?;
    for zone in zones.iter() {
        let rects: Vec<String> = zone
            .rects()
            .iter()
            .map(|rect| {
                format!(
                    "({},{} {}x{})",
                    rect.x(),
                    rect.y(),
                    rect.width(),
                    rect.height()
                )
            })
            .collect();
        let spawns = if zone.faction().hosts_spawn_points() {
            ""
        } else {
            "  [never spawns]"
        };
        println!(
            "{:>2}  {:<14} map {:>3}  ceiling {}  {}{spawns}",
            zone.id().get(),
            zone.name(),
            zone.map().get(),
            zone.max_spawn_points(),
            rects.join(" ")
        );
    }
    Ok(())
}

/// Shape of one simulated run.
#[derive(Clone, Copy, Debug)]
struct Run {
    seconds: u64,
    players: u32,
    loss_interval: u64,
    reload_at: Option<u64>,
}

fn simulate(
    config: &CliConfig,
    run: Run,
    seed: Option<u64>,
    save: Option<PathBuf>,
) -> Result<()> {
    let Run {
        seconds,
        players,
        loss_interval,
        reload_at,
    } = run;
    if reload_at.is_some_and(|at| at > seconds) {
        bail!("--reload-at must not exceed --seconds ({seconds})");
    }
    let seed = seed.unwrap_or(config.seed);
    let mut simulation = Simulation::new(
        config.zone_registry()?,
        config.zone_trigger(seed),
        config.spawn_waves(seed.wrapping_add(1)),
        seed.wrapping_add(2),
    )
    .context("invalid system configuration")?;

    info!(seed, seconds, players, "starting simulation");
    simulation.add_players(players);
    match reload_at {
        Some(at) => {
            simulation.run(at, Some(loss_interval));
            let outcome = simulation.reload()?;
            println!(
                "reloaded at {at}s: {} restored, {} discarded",
                outcome.restored, outcome.discarded
            );
            simulation.run(seconds - at, Some(loss_interval));
        }
        None => simulation.run(seconds, Some(loss_interval)),
    }

    println!("{:<14} {:>7} {:>7} {:>9}", "zone", "points", "ceiling", "creatures");
    for summary in simulation.zone_summaries() {
        println!(
            "{:<14} {:>7} {:>7} {:>9}",
            summary.name, summary.spawn_points, summary.ceiling, summary.living_creatures
        );
    }
    let tally = simulation.tally();
    println!(
        "created {} spawn points ({} retired), scheduled {} waves, spawned {} creatures ({} rejected), lost {}",
        tally.spawn_points_created,
        tally.spawn_points_deleted,
        tally.waves,
        tally.creatures_spawned,
        tally.spawns_rejected,
        tally.creatures_lost
    );

    if let Some(path) = save {
        let records = simulation.save()?;
        let bytes = encode_records(&records)?;
        fs::write(&path, bytes).with_context(|| format!("write save: {}", path.display()))?;
        info!(count = records.len(), path = %path.display(), "spawn points saved");
    }
    Ok(())
}

fn inspect(path: PathBuf) -> Result<()> {
    let bytes = fs::read(&path).with_context(|| format!("read save: {}", path.display()))?;
    let records =
        decode_records(&bytes).with_context(|| format!("decode save: {}", path.display()))?;
    println!("{}", serde_json::to_string_pretty(&records)?);
    Ok(())
}
