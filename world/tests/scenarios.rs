use std::{collections::BTreeSet, time::Duration};

use gridchase_core::{
    Charges, Command, CrashKind, Event, GridPosition, GridSize, LevelState, RushOutcome,
    SessionState, TeleportMode,
};
use gridchase_world::{self as world, query, World, WorldConfig};

const STEP: Duration = Duration::from_millis(800);
const FRAME: Duration = Duration::from_micros(16_667);

fn config() -> WorldConfig {
    WorldConfig::default()
        .with_grid(GridSize::new(10, 10))
        .with_seed(0x0dd5_eed5)
}

fn cell(x: i32, y: i32) -> GridPosition {
    GridPosition::new(x, y)
}

fn level_state(
    level: u32,
    player: (i32, i32),
    pursuers: &[(i32, i32)],
    obstacles: &[(i32, i32)],
) -> LevelState {
    LevelState {
        level,
        score: 0,
        charges: Charges::new(10, 3, 2, 1),
        player: cell(player.0, player.1),
        pursuers: pursuers.iter().map(|(x, y)| cell(*x, *y)).collect(),
        obstacles: obstacles.iter().map(|(x, y)| cell(*x, *y)).collect(),
    }
}

fn restore(state: LevelState) -> World {
    World::restore(config(), state).expect("snapshot is valid")
}

fn run(world: &mut World, commands: impl IntoIterator<Item = Command>) -> Vec<Event> {
    let mut events = Vec::new();
    for command in commands {
        world::apply(world, command, &mut events);
    }
    events
}

fn pursuer_cells(world: &World) -> Vec<GridPosition> {
    query::pursuer_view(world)
        .iter()
        .map(|snapshot| snapshot.cell)
        .collect()
}

#[test]
fn single_pursuer_closes_in_and_catches_player() {
    let mut world = restore(level_state(1, (5, 5), &[(0, 0)], &[]));

    let _ = run(&mut world, [Command::Wait]);
    assert_eq!(pursuer_cells(&world), vec![cell(1, 1)]);
    let _ = run(&mut world, [Command::Tick { dt: STEP }]);
    assert_eq!(query::session(&world), SessionState::Playing);

    for expected in 2..=4 {
        let _ = run(&mut world, [Command::Wait, Command::Tick { dt: STEP }]);
        assert_eq!(pursuer_cells(&world), vec![cell(expected, expected)]);
        assert_eq!(query::session(&world), SessionState::Playing);
    }

    let events = run(&mut world, [Command::Wait, Command::Tick { dt: STEP }]);
    assert_eq!(pursuer_cells(&world), vec![cell(5, 5)]);
    assert_eq!(query::session(&world), SessionState::GameOver);
    assert!(events.contains(&Event::PlayerCaught { cell: cell(5, 5) }));
    assert!(events.contains(&Event::SessionChanged {
        state: SessionState::GameOver,
    }));
    assert_eq!(
        query::end_message(&world).as_deref(),
        Some("Game Over! You were caught by a pursuer!")
    );
}

#[test]
fn resolution_waits_for_every_animation_to_finish() {
    let mut world = restore(level_state(1, (5, 1), &[(0, 0), (0, 2)], &[]));

    let events = run(
        &mut world,
        [Command::Wait, Command::Tick { dt: STEP / 2 }],
    );
    assert!(query::pursuit_in_motion(&world));
    assert_eq!(pursuer_cells(&world), vec![cell(1, 1), cell(1, 1)]);
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::PursuersCrashed { .. })));

    let events = run(&mut world, [Command::Tick { dt: STEP / 2 }]);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::PursuersCrashed { .. })));
}

#[test]
fn stacked_pair_becomes_one_obstacle() {
    let mut world = restore(level_state(1, (8, 8), &[(2, 2), (2, 2), (9, 0)], &[]));

    let events = run(&mut world, [Command::Wait, Command::Tick { dt: STEP }]);

    assert_eq!(pursuer_cells(&world), vec![cell(8, 1)]);
    assert_eq!(query::obstacles(&world), vec![cell(3, 3)]);
    assert_eq!(query::score(&world), 4);
    assert!(events.contains(&Event::PursuersCrashed {
        cell: cell(3, 3),
        kind: CrashKind::Pursuer,
        destroyed: 2,
    }));
    assert!(events.contains(&Event::ObstacleCreated { cell: cell(3, 3) }));
}

#[test]
fn pursuer_walking_into_obstacle_is_destroyed() {
    let mut world = restore(level_state(1, (5, 0), &[(3, 0), (9, 9)], &[(4, 0)]));

    let events = run(&mut world, [Command::Wait, Command::Tick { dt: STEP }]);

    assert_eq!(pursuer_cells(&world), vec![cell(8, 8)]);
    assert_eq!(query::obstacles(&world), vec![cell(4, 0)]);
    assert_eq!(query::score(&world), 2);
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::ObstacleCreated { .. })));
}

#[test]
fn disable_tool_clears_king_neighbourhood_only() {
    let mut world = restore(level_state(
        1,
        (5, 5),
        &[(4, 4), (5, 4), (6, 6), (7, 7)],
        &[],
    ));

    let events = run(&mut world, [Command::UseDisableTool]);

    assert_eq!(
        events[0],
        Event::PursuersDisabled {
            cells: vec![cell(4, 4), cell(5, 4), cell(6, 6)],
        }
    );
    assert_eq!(query::score(&world), 15);
    assert_eq!(query::charges(&world).disable, 1);
    assert!(query::obstacles(&world).is_empty());
    assert_eq!(pursuer_cells(&world), vec![cell(6, 6)]);
    assert!(query::pursuit_in_motion(&world));
}

#[test]
fn disable_tool_without_charges_is_a_no_op() {
    let mut state = level_state(1, (5, 5), &[(4, 4)], &[]);
    state.charges.disable = 0;
    let mut world = restore(state);

    let events = run(&mut world, [Command::UseDisableTool]);

    assert!(events.is_empty());
    assert_eq!(pursuer_cells(&world), vec![cell(4, 4)]);
}

#[test]
fn teleport_spends_the_matching_charge_and_costs_a_turn() {
    let mut world = restore(level_state(1, (5, 5), &[(0, 0), (9, 9)], &[(3, 3)]));

    let events = run(
        &mut world,
        [Command::Teleport {
            mode: TeleportMode::Safe,
        }],
    );

    let charges = query::charges(&world);
    assert_eq!(charges.safe_teleports, 2);
    assert_eq!(charges.teleports, 10);
    let Event::PlayerTeleported { from, to, mode } = events[0] else {
        panic!("expected a teleport, got {events:?}");
    };
    assert_eq!(from, cell(5, 5));
    assert_eq!(to, query::player(&world));
    assert_eq!(mode, TeleportMode::Safe);
    assert_ne!(to, cell(3, 3));
    assert_eq!(events[1], Event::PursuersAdvanced { pursuers: 2 });
}

#[test]
fn clearing_a_level_grants_refills_and_respawns() {
    let mut world = restore(level_state(1, (5, 1), &[(0, 0), (0, 2)], &[]));

    let events = run(&mut world, [Command::Wait, Command::Tick { dt: STEP }]);

    assert!(events.contains(&Event::LevelCleared { level: 1, bonus: 10 }));
    assert!(events.contains(&Event::LevelStarted {
        level: 2,
        pursuers: 7,
    }));
    assert_eq!(query::level(&world), 2);
    assert_eq!(query::score(&world), 14);
    let charges = query::charges(&world);
    assert_eq!(charges.teleports, 12);
    assert_eq!(charges.disable, 4);
    assert_eq!(charges.rush, 1);
    assert!(query::obstacles(&world).is_empty());
    assert_eq!(query::pursuer_view(&world).len(), 7);
    assert_eq!(query::session(&world), SessionState::Playing);
}

#[test]
fn reaching_every_fifth_level_grants_a_bonus_rush_charge() {
    let mut state = level_state(4, (5, 1), &[(0, 0), (0, 2)], &[]);
    state.charges.rush = 0;
    let mut world = restore(state);

    let _ = run(&mut world, [Command::Wait, Command::Tick { dt: STEP }]);

    assert_eq!(query::level(&world), 5);
    assert_eq!(query::charges(&world).rush, 2);
}

#[test]
fn clearing_the_final_level_wins_and_menu_resets_progress() {
    let mut world = restore(level_state(10, (5, 1), &[(0, 0), (0, 2)], &[]));

    let events = run(&mut world, [Command::Wait, Command::Tick { dt: STEP }]);

    assert!(events.contains(&Event::LevelCleared {
        level: 10,
        bonus: 100,
    }));
    assert!(events.contains(&Event::GameWon { score: 104 }));
    assert_eq!(
        events.last(),
        Some(&Event::SessionChanged {
            state: SessionState::Won,
        })
    );
    assert_eq!(query::session(&world), SessionState::Won);
    assert_eq!(
        query::end_message(&world).as_deref(),
        Some("Congratulations! You survived all levels!")
    );

    let events = run(&mut world, [Command::ReturnToMenu]);
    assert_eq!(
        events,
        vec![Event::SessionChanged {
            state: SessionState::Menu,
        }]
    );
    assert_eq!(query::score(&world), 0);
    assert_eq!(query::level(&world), 1);
    assert!(query::pursuer_view(&world).is_empty());
    assert_eq!(query::end_message(&world), None);
}

#[test]
fn rush_crash_of_last_pursuers_awards_survival_bonus() {
    let mut world = restore(level_state(1, (9, 9), &[(0, 0), (0, 0)], &[]));

    let events = run(&mut world, [Command::ActivateRush, Command::Tick { dt: FRAME }]);

    assert_eq!(events[0], Event::RushStarted);
    assert!(events.contains(&Event::RushEnded {
        outcome: RushOutcome::Survived,
    }));
    assert!(events.contains(&Event::LevelCleared { level: 1, bonus: 10 }));
    assert_eq!(query::score(&world), 4 + 50 + 10);
    assert_eq!(query::rush_speed(&world), None);
    assert_eq!(query::level(&world), 2);
}

#[test]
fn rush_catches_a_player_who_stands_still() {
    let mut world = restore(level_state(1, (5, 5), &[(5, 0)], &[]));
    let _ = run(&mut world, [Command::ActivateRush]);
    assert_eq!(query::charges(&world).rush, 0);

    let mut log = Vec::new();
    for _ in 0..600 {
        log.extend(run(&mut world, [Command::Tick { dt: FRAME }]));
        if query::session(&world) != SessionState::Playing {
            break;
        }
    }

    assert_eq!(query::session(&world), SessionState::GameOver);
    assert!(log.contains(&Event::RushEnded {
        outcome: RushOutcome::Caught,
    }));
    assert!(log.contains(&Event::PlayerCaught { cell: cell(5, 5) }));
}

#[test]
fn rush_accelerates_and_lets_the_player_keep_moving() {
    let mut world = restore(level_state(1, (9, 9), &[(0, 0)], &[]));
    let _ = run(&mut world, [Command::ActivateRush]);

    let _ = run(&mut world, [Command::Tick { dt: FRAME }]);
    let early = query::rush_speed(&world).expect("rush active");
    let events = run(
        &mut world,
        [
            Command::Tick { dt: FRAME },
            Command::MovePlayer {
                direction: gridchase_core::Direction::West,
            },
        ],
    );
    let later = query::rush_speed(&world).expect("rush active");

    assert!(later > early);
    assert_eq!(query::player(&world), cell(8, 9));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::PursuersAdvanced { .. })));
}

#[test]
fn overcrowded_setup_reports_failure_instead_of_hanging() {
    let mut failures = 0;
    for seed in 0..32 {
        let config = WorldConfig::default()
            .with_grid(GridSize::new(5, 5))
            .with_max_level(1)
            .with_spawn_attempts_per_pursuer(1)
            .with_seed(seed);
        let mut world = World::new(config).expect("valid config");

        let events = run(&mut world, [Command::StartGame]);

        let failed = events
            .iter()
            .any(|event| matches!(event, Event::LevelSetupFailed { .. }));
        if failed {
            failures += 1;
            assert_eq!(query::session(&world), SessionState::GameOver);
            assert_eq!(
                events.last(),
                Some(&Event::SessionChanged {
                    state: SessionState::GameOver,
                })
            );
            assert!(query::end_message(&world)
                .expect("game ended")
                .contains("could not be set up"));
        } else {
            assert_eq!(query::pursuer_view(&world).len(), 6);
        }
    }
    assert!(failures > 0);
}

#[test]
fn start_and_new_game_spawn_fresh_levels() {
    let mut world = World::new(config()).expect("valid config");

    let events = run(&mut world, [Command::StartGame]);
    assert_eq!(
        events[0],
        Event::SessionChanged {
            state: SessionState::Playing,
        }
    );
    assert_eq!(
        events[1],
        Event::LevelStarted {
            level: 1,
            pursuers: 6,
        }
    );

    let player = query::player(&world);
    let cells = pursuer_cells(&world);
    assert!(cells.iter().all(|cell| cell.squared_distance(player) > 3));
    let unique: BTreeSet<_> = cells.iter().collect();
    assert_eq!(unique.len(), cells.len());

    let events = run(&mut world, [Command::NewGame]);
    assert_eq!(
        events,
        vec![Event::LevelStarted {
            level: 1,
            pursuers: 6,
        }]
    );
    assert_eq!(query::charges(&world), Charges::new(10, 3, 2, 1));
}

#[test]
fn level_state_round_trips_through_restore() {
    let mut world = World::new(config()).expect("valid config");
    let _ = run(
        &mut world,
        [
            Command::StartGame,
            Command::Wait,
            Command::Tick { dt: STEP },
            Command::Teleport {
                mode: TeleportMode::Random,
            },
            Command::Tick { dt: STEP },
        ],
    );
    if query::session(&world) != SessionState::Playing {
        return;
    }

    let snapshot = query::level_state(&world);
    let restored = World::restore(config(), snapshot.clone()).expect("snapshot is valid");

    assert_eq!(query::level_state(&restored), snapshot);
    let cells: BTreeSet<_> = snapshot.pursuers.iter().collect();
    assert_eq!(cells.len(), snapshot.pursuers.len());
    assert!(snapshot
        .pursuers
        .iter()
        .all(|pursuer| !snapshot.obstacles.contains(pursuer)));
    assert!(!snapshot.obstacles.contains(&snapshot.player));
}
