//! Scripted player used by the headless mode.
//!
//! The policy is greedy: it picks the neighbouring cell whose nearest
//! pursuer, after the pursuers answer the move, is farthest away. Charges
//! are spent only when every option ends in capture.

use std::time::Duration;

use gridchase_core::{Direction, GridPosition, SessionState};
use gridchase_system_audio::AudioNotifier;
use gridchase_system_input::ControlInput;
use gridchase_world::{query, World};

use crate::simulation::{Simulation, FIXED_STEP};

/// Outcome of a headless session.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct AutopilotReport {
    pub(crate) frames: u32,
    pub(crate) session: SessionState,
    pub(crate) level: u32,
    pub(crate) score: u32,
}

/// Drives `simulation` for at most `max_frames` fixed frames or until the game ends.
pub(crate) fn run<N: AudioNotifier>(
    simulation: &mut Simulation<N>,
    max_frames: u32,
) -> AutopilotReport {
    let mut frames = 0;
    while frames < max_frames {
        let world = simulation.world();
        if matches!(
            query::session(world),
            SessionState::GameOver | SessionState::Won
        ) {
            break;
        }
        let controls = choose_controls(world);
        simulation.advance(FIXED_STEP, controls);
        frames += 1;
    }

    let world = simulation.world();
    let report = AutopilotReport {
        frames,
        session: query::session(world),
        level: query::level(world),
        score: query::score(world),
    };
    tracing::info!(
        frames = report.frames,
        session = ?report.session,
        level = report.level,
        score = report.score,
        simulated = ?Duration::from_secs_f64(FIXED_STEP.as_secs_f64() * f64::from(frames)),
        "headless session finished"
    );
    report
}

/// Controls the scripted player presses this frame.
pub(crate) fn choose_controls(world: &World) -> ControlInput {
    match query::session(world) {
        SessionState::Menu => {
            return ControlInput {
                confirm: true,
                ..ControlInput::default()
            }
        }
        SessionState::GameOver | SessionState::Won => return ControlInput::default(),
        SessionState::Playing => {}
    }
    if query::pursuit_in_motion(world) || query::rush_speed(world).is_some() {
        return ControlInput::default();
    }

    let player = query::player(world);
    let pursuers: Vec<GridPosition> = query::pursuer_view(world)
        .iter()
        .map(|snapshot| snapshot.cell)
        .collect();
    let charges = query::charges(world);

    let adjacent = pursuers
        .iter()
        .filter(|cell| cell.chebyshev_distance(player) == 1)
        .count();
    if adjacent >= 2 && charges.disable > 0 {
        return ControlInput {
            disable: true,
            ..ControlInput::default()
        };
    }

    let (best, margin) = best_option(world, player, &pursuers);
    if margin > 0 {
        return match best {
            Some(direction) => ControlInput {
                movement: Some(direction),
                ..ControlInput::default()
            },
            None => ControlInput {
                wait: true,
                ..ControlInput::default()
            },
        };
    }

    let mut controls = ControlInput::default();
    if charges.safe_teleports > 0 {
        controls.safe_teleport = true;
    } else if charges.teleports > 0 {
        controls.teleport = true;
    } else if charges.disable > 0 {
        controls.disable = true;
    } else {
        controls.wait = true;
    }
    controls
}

/// Best move (`None` meaning wait) and the squared distance to the nearest
/// pursuer once every pursuer has stepped toward the destination.
fn best_option(
    world: &World,
    player: GridPosition,
    pursuers: &[GridPosition],
) -> (Option<Direction>, u32) {
    let grid = query::grid_size(world);
    let obstacles = query::obstacles(world);

    std::iter::once(None)
        .chain(Direction::ALL.into_iter().map(Some))
        .filter_map(|option| {
            let destination = match option {
                Some(direction) => {
                    let (dx, dy) = direction.delta();
                    player.offset(dx, dy)
                }
                None => player,
            };
            if !grid.contains(destination) || obstacles.contains(&destination) {
                return None;
            }
            let margin = pursuers
                .iter()
                .map(|cell| cell.step_toward(destination).squared_distance(destination))
                .min()
                .unwrap_or(u32::MAX);
            Some((option, margin))
        })
        .fold((None, 0), |best, candidate| {
            if candidate.1 > best.1 {
                candidate
            } else {
                best
            }
        })
}
