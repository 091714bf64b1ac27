//! Continuous "rush" mode where every pursuer charges the player in real time.

use std::time::Duration;

use gridchase_core::{CrashKind, Event, RushOutcome, VisualPosition};

use crate::{
    collision::{self, Resolution},
    config::RushTuning,
    Board,
};

/// Progress of an active rush.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct RushState {
    speed: f32,
    ticks: u64,
}

impl RushState {
    pub(crate) fn new(tuning: RushTuning) -> Self {
        Self {
            speed: tuning.initial_speed,
            ticks: 0,
        }
    }

    pub(crate) const fn speed(&self) -> f32 {
        self.speed
    }
}

/// Result of a single rush tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct RushTick {
    /// Pursuers removed by crashes during the tick.
    pub(crate) destroyed: u32,
    /// Set when the rush must stop.
    pub(crate) outcome: Option<RushOutcome>,
}

/// Advances every pursuer toward the player by `speed · dt`.
pub(crate) fn advance(
    state: &mut RushState,
    board: &mut Board,
    tuning: RushTuning,
    dt: Duration,
    out_events: &mut Vec<Event>,
) -> RushTick {
    let seconds = dt.as_secs_f32();
    state.ticks = state.ticks.saturating_add(1);
    state.speed = (state.speed * tuning.acceleration.powf(seconds)).min(tuning.max_speed);

    let player = VisualPosition::from(board.player);
    if board
        .pursuers
        .iter()
        .any(|pursuer| pursuer.visual().within(player, tuning.collision_threshold))
    {
        return RushTick {
            destroyed: 0,
            outcome: Some(RushOutcome::Caught),
        };
    }

    let travel = state.speed * seconds;
    let grid = board.size;
    let mut alive = vec![true; board.pursuers.len()];
    let mut destroyed = 0;
    let mut moved = false;
    let mut caught = false;

    for index in 0..board.pursuers.len() {
        if !alive[index] {
            continue;
        }

        let current = board.pursuers[index].visual();
        let distance = current.squared_distance(player).sqrt();
        if distance <= tuning.arrival_epsilon {
            continue;
        }

        let step = travel.min(distance);
        let next = VisualPosition::new(
            current.x + (player.x - current.x) / distance * step,
            current.y + (player.y - current.y) / distance * step,
        );
        board.pursuers[index].glide_to(next, grid);
        moved = true;
        let position = board.pursuers[index].visual();

        if let Some(cell) = board.obstacles.find(|cell| {
            VisualPosition::from(cell).within(position, tuning.collision_threshold)
        }) {
            alive[index] = false;
            destroyed += 1;
            out_events.push(Event::PursuersCrashed {
                cell,
                kind: CrashKind::Obstacle,
                destroyed: 1,
            });
            continue;
        }

        let partner = (0..board.pursuers.len()).find(|&other| {
            other != index
                && alive[other]
                && board.pursuers[other]
                    .visual()
                    .within(position, tuning.collision_threshold)
        });
        if let Some(other) = partner {
            alive[index] = false;
            alive[other] = false;
            destroyed += 2;
            let cell = position
                .midpoint(board.pursuers[other].visual())
                .rounded();
            out_events.push(Event::PursuersCrashed {
                cell,
                kind: CrashKind::Pursuer,
                destroyed: 2,
            });
            // The wreck lands on the player.
            if cell == board.player {
                caught = true;
                break;
            }
            if board.obstacles.insert(cell) {
                out_events.push(Event::ObstacleCreated { cell });
            }
        }
    }

    let mut flags = alive.into_iter();
    board
        .pursuers
        .retain(|_| flags.next().unwrap_or(true));
    if caught {
        return RushTick {
            destroyed,
            outcome: Some(RushOutcome::Caught),
        };
    }

    if state.ticks % 2 == 0 {
        let Resolution {
            caught,
            destroyed: backstop,
        } = collision::resolve(board, out_events);
        destroyed += backstop;
        if caught {
            return RushTick {
                destroyed,
                outcome: Some(RushOutcome::Caught),
            };
        }
    }

    let outcome = if board.pursuers.is_empty() {
        Some(RushOutcome::Survived)
    } else if !moved {
        Some(RushOutcome::Settled)
    } else {
        None
    };

    RushTick { destroyed, outcome }
}
