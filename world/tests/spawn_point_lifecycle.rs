use std::time::Duration;

use hive_frontier_core::{
    AccessLevel, ActorId, ActorKind, Command, CreatureId, CreatureKind, Event, Location,
    RetirementReason, SpawnPointId, SpawnPointRecord, ZoneId, REFERENCE_MAP,
    SPAWN_POINT_RECORD_VERSION,
};
use hive_frontier_world::{self as world, decode_records, encode_records, query, World};

const INSIDE_JUKARI: Location = Location::new(700, 2_100, 0);
const OUTSIDE_ZONES: Location = Location::new(10, 1_300, 0);

fn run(world: &mut World, command: Command) -> Vec<Event> {
    let mut events = Vec::new();
    world::apply(world, command, &mut events);
    events
}

fn populated_world(creatures: usize) -> (World, SpawnPointId) {
    let mut world = World::new();
    let _ = run(
        &mut world,
        Command::RegisterActor {
            kind: ActorKind::Player,
            access: AccessLevel::Player,
            map: REFERENCE_MAP,
            location: INSIDE_JUKARI,
        },
    );
    let _ = run(
        &mut world,
        Command::CreateSpawnPoint {
            zone: ZoneId::new(0),
            focus: ActorId::new(0),
            map: REFERENCE_MAP,
            location: INSIDE_JUKARI,
        },
    );
    for _ in 0..creatures {
        let _ = run(
            &mut world,
            Command::SpawnCreature {
                spawn_point: SpawnPointId::new(0),
                kind: CreatureKind::Warrior,
                location: INSIDE_JUKARI,
                population_cap: 12,
            },
        );
    }
    (world, SpawnPointId::new(0))
}

fn saved_records(world: &mut World) -> Vec<SpawnPointRecord> {
    let events = run(world, Command::SaveSpawnPoints);
    match events.as_slice() {
        [Event::SpawnPointsSaved { records }] => records.clone(),
        other => panic!("unexpected events: {other:?}"),
    }
}

fn ids(values: &[u32]) -> Vec<CreatureId> {
    values.iter().copied().map(CreatureId::new).collect()
}

#[test]
fn restore_keeps_resolvable_creatures_in_order() {
    let (mut world, spawn_point) = populated_world(3);
    let bytes = encode_records(&saved_records(&mut world)).expect("encode");

    let _ = run(
        &mut world,
        Command::RemoveCreature {
            creature: CreatureId::new(1),
        },
    );
    let records = decode_records(&bytes).expect("decode");
    let events = run(&mut world, Command::RestoreSpawnPoints { records });

    assert_eq!(
        events.last(),
        Some(&Event::SpawnPointsRestored {
            restored: 1,
            discarded: 0,
        })
    );
    assert_eq!(query::roster(&world, spawn_point), Some(ids(&[0, 2])));

    let restored = query::spawn_point(&world, spawn_point).expect("restored");
    assert_eq!(restored.zone, None);
    assert_eq!(restored.focus, None);
    assert_eq!(restored.location, INSIDE_JUKARI);
}

#[test]
fn restore_collapses_duplicate_references() {
    let (mut world, spawn_point) = populated_world(3);
    let record = SpawnPointRecord {
        version: SPAWN_POINT_RECORD_VERSION,
        id: spawn_point,
        map: REFERENCE_MAP,
        location: INSIDE_JUKARI,
        roster: ids(&[2, 0, 2, 0, 1]),
    };

    let _ = run(
        &mut world,
        Command::RestoreSpawnPoints {
            records: vec![record],
        },
    );
    assert_eq!(query::roster(&world, spawn_point), Some(ids(&[2, 0, 1])));
}

#[test]
fn restored_spawn_point_rebinds_its_zone_after_delay() {
    let (mut world, spawn_point) = populated_world(2);
    let records = saved_records(&mut world);
    let _ = run(&mut world, Command::RestoreSpawnPoints { records });
    assert_eq!(query::active_spawn_points(&world, ZoneId::new(0)), 0);

    let early = run(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(9_999),
        },
    );
    assert!(!early
        .iter()
        .any(|event| matches!(event, Event::SpawnPointZoneResolved { .. })));

    let events = run(
        &mut world,
        Command::Tick {
            dt: Duration::from_millis(1),
        },
    );
    assert!(events.contains(&Event::SpawnPointZoneResolved {
        spawn_point,
        zone: ZoneId::new(0),
    }));
    assert_eq!(query::active_spawn_points(&world, ZoneId::new(0)), 1);
}

#[test]
fn zone_lookup_retries_then_gives_up() {
    let (mut world, spawn_point) = populated_world(2);
    let mut records = saved_records(&mut world);
    records[0].location = OUTSIDE_ZONES;
    let _ = run(&mut world, Command::RestoreSpawnPoints { records });

    let mut unresolved = Vec::new();
    for _ in 0..3 {
        let events = run(
            &mut world,
            Command::Tick {
                dt: Duration::from_secs(10),
            },
        );
        unresolved.extend(
            events
                .into_iter()
                .filter(|event| matches!(event, Event::SpawnPointZoneUnresolved { .. })),
        );
    }

    assert_eq!(
        unresolved,
        vec![Event::SpawnPointZoneUnresolved {
            spawn_point,
            attempts: 3,
        }]
    );
    assert_eq!(query::spawn_point(&world, spawn_point).and_then(|s| s.zone), None);
    assert_eq!(query::pending_task_count(&world), 0);
}

#[test]
fn zone_lookup_retries_stay_apart_under_one_long_tick() {
    let (mut world, spawn_point) = populated_world(1);
    let mut records = saved_records(&mut world);
    records[0].location = OUTSIDE_ZONES;
    let _ = run(&mut world, Command::RestoreSpawnPoints { records });

    let is_unresolved = |event: &Event| matches!(event, Event::SpawnPointZoneUnresolved { .. });
    let long = run(
        &mut world,
        Command::Tick {
            dt: Duration::from_secs(60),
        },
    );
    assert!(!long.iter().any(is_unresolved));
    assert_eq!(query::pending_task_count(&world), 1);

    let second = run(
        &mut world,
        Command::Tick {
            dt: Duration::from_secs(10),
        },
    );
    assert!(!second.iter().any(is_unresolved));

    let third = run(
        &mut world,
        Command::Tick {
            dt: Duration::from_secs(10),
        },
    );
    assert!(third.contains(&Event::SpawnPointZoneUnresolved {
        spawn_point,
        attempts: 3,
    }));
}

#[test]
fn zone_lookup_succeeds_once_the_spawn_point_moves_into_a_zone() {
    let (mut world, spawn_point) = populated_world(1);
    let mut records = saved_records(&mut world);
    records[0].location = OUTSIDE_ZONES;
    let _ = run(&mut world, Command::RestoreSpawnPoints { records });

    let _ = run(
        &mut world,
        Command::Tick {
            dt: Duration::from_secs(10),
        },
    );
    let _ = run(
        &mut world,
        Command::RelocateSpawnPoint {
            spawn_point,
            map: REFERENCE_MAP,
            location: INSIDE_JUKARI,
        },
    );
    let events = run(
        &mut world,
        Command::Tick {
            dt: Duration::from_secs(10),
        },
    );

    assert!(events.contains(&Event::SpawnPointZoneResolved {
        spawn_point,
        zone: ZoneId::new(0),
    }));
}

#[test]
fn empty_restored_spawn_points_retire_immediately() {
    let (mut world, spawn_point) = populated_world(2);
    let records = saved_records(&mut world);
    for raw in 0..2 {
        let _ = run(
            &mut world,
            Command::RemoveCreature {
                creature: CreatureId::new(raw),
            },
        );
    }

    let events = run(&mut world, Command::RestoreSpawnPoints { records });
    assert_eq!(
        events,
        vec![
            Event::SpawnPointDeleted {
                spawn_point,
                zone: None,
                reason: RetirementReason::RestoredEmpty,
                released: 0,
            },
            Event::SpawnPointsRestored {
                restored: 0,
                discarded: 1,
            },
        ]
    );
    assert!(query::spawn_point_view(&world).is_empty());
}

#[test]
fn restored_spawn_point_with_only_dead_creatures_retires_before_binding_a_zone() {
    let (mut world, spawn_point) = populated_world(3);
    let records = saved_records(&mut world);
    for raw in 0..3 {
        let _ = run(
            &mut world,
            Command::KillCreature {
                creature: CreatureId::new(raw),
            },
        );
    }

    let events = run(&mut world, Command::RestoreSpawnPoints { records });
    assert_eq!(
        events.last(),
        Some(&Event::SpawnPointsRestored {
            restored: 1,
            discarded: 0,
        })
    );

    let events = run(
        &mut world,
        Command::Tick {
            dt: Duration::from_secs(10),
        },
    );
    assert!(events.contains(&Event::SpawnPointDeleted {
        spawn_point,
        zone: None,
        reason: RetirementReason::Depopulated,
        released: 3,
    }));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::SpawnPointZoneResolved { .. })));
    assert!(query::spawn_point(&world, spawn_point).is_none());
    assert_eq!(query::active_spawn_points(&world, ZoneId::new(0)), 0);
}

#[test]
fn restore_replaces_existing_spawn_points_and_their_tasks() {
    let (mut world, spawn_point) = populated_world(1);
    let _ = run(
        &mut world,
        Command::BeginWave {
            spawn_point,
            target_population: 9,
            cooldown: Duration::from_secs(120),
        },
    );
    assert_eq!(query::pending_creations(&world, spawn_point).len(), 8);

    let _ = run(&mut world, Command::RestoreSpawnPoints { records: Vec::new() });
    assert!(query::spawn_point(&world, spawn_point).is_none());
    assert_eq!(query::pending_task_count(&world), 0);
}

#[test]
fn health_check_runs_thirty_seconds_after_save() {
    let (mut world, spawn_point) = populated_world(2);
    let _ = saved_records(&mut world);
    for raw in 0..2 {
        let _ = run(
            &mut world,
            Command::KillCreature {
                creature: CreatureId::new(raw),
            },
        );
    }

    let _ = run(
        &mut world,
        Command::Tick {
            dt: Duration::from_secs(29),
        },
    );
    assert!(query::spawn_point(&world, spawn_point).is_some());

    let events = run(
        &mut world,
        Command::Tick {
            dt: Duration::from_secs(1),
        },
    );
    assert!(events.contains(&Event::SpawnPointDeleted {
        spawn_point,
        zone: Some(ZoneId::new(0)),
        reason: RetirementReason::Depopulated,
        released: 2,
    }));
    assert_eq!(query::active_spawn_points(&world, ZoneId::new(0)), 0);
}

#[test]
fn populated_spawn_points_survive_the_post_save_check() {
    let (mut world, spawn_point) = populated_world(2);
    let _ = saved_records(&mut world);
    let _ = run(
        &mut world,
        Command::KillCreature {
            creature: CreatureId::new(0),
        },
    );

    let _ = run(
        &mut world,
        Command::Tick {
            dt: Duration::from_secs(30),
        },
    );
    assert!(query::spawn_point(&world, spawn_point).is_some());
}
