//! Level setup and progression.

use std::collections::BTreeSet;

use gridchase_core::{Event, GridPosition, GridSize};
use rand::Rng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{error, info};

use crate::{EndReason, Motion, World, WorldConfig, LEVEL_CLEAR_POINTS};

/// Placement gave up before every pursuer found a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
#[error("placed {placed} of {requested} pursuers on level {level} before giving up")]
pub(crate) struct PlacementError {
    pub(crate) level: u32,
    pub(crate) requested: u32,
    pub(crate) placed: u32,
}

/// Draws a uniformly distributed cell.
pub(crate) fn random_cell(rng: &mut ChaCha8Rng, grid: GridSize) -> GridPosition {
    GridPosition::new(
        rng.gen_range(0..grid.columns()) as i32,
        rng.gen_range(0..grid.rows()) as i32,
    )
}

/// Chooses distinct pursuer cells away from the player.
///
/// Each pursuer gets a bounded number of draws so that an overcrowded grid
/// reports failure instead of spinning.
pub(crate) fn place_pursuers(
    rng: &mut ChaCha8Rng,
    config: &WorldConfig,
    level: u32,
    player: GridPosition,
) -> Result<Vec<GridPosition>, PlacementError> {
    let grid = config.grid();
    let requested = config.pursuers_for_level(level);
    let min_squared = config.spawn_min_squared_distance();
    let attempts = config.spawn_attempts_per_pursuer();

    let mut taken = BTreeSet::new();
    let mut cells = Vec::with_capacity(requested as usize);
    while cells.len() < requested as usize {
        let candidate = (0..attempts)
            .map(|_| random_cell(rng, grid))
            .find(|cell| cell.squared_distance(player) > min_squared && !taken.contains(cell));
        let Some(cell) = candidate else {
            return Err(PlacementError {
                level,
                requested,
                placed: cells.len() as u32,
            });
        };
        let _ = taken.insert(cell);
        cells.push(cell);
    }
    Ok(cells)
}

impl World {
    /// Clears the board and populates the current level.
    pub(crate) fn start_level(&mut self, out_events: &mut Vec<Event>) {
        self.motion = Motion::Idle;
        self.board.pursuers.clear();
        self.board.obstacles.clear();
        self.board.player = random_cell(&mut self.rng, self.board.size);
        self.charges.rush = self
            .config
            .starting_charges()
            .rush
            .saturating_add(self.pending_rush_bonus);
        self.pending_rush_bonus = 0;

        match place_pursuers(&mut self.rng, &self.config, self.level, self.board.player) {
            Ok(cells) => {
                let pursuers = cells.len() as u32;
                for cell in cells {
                    self.spawn_pursuer(cell);
                }
                info!(level = self.level, pursuers, "level started");
                out_events.push(Event::LevelStarted {
                    level: self.level,
                    pursuers,
                });
            }
            Err(failure) => {
                error!(%failure, "level setup failed");
                out_events.push(Event::LevelSetupFailed {
                    level: failure.level,
                    requested: failure.requested,
                    placed: failure.placed,
                });
                self.finish(
                    EndReason::SetupFailed {
                        level: failure.level,
                    },
                    out_events,
                );
            }
        }
    }

    /// Awards the clear bonus, grants refills and moves on or declares victory.
    pub(crate) fn complete_level(&mut self, out_events: &mut Vec<Event>) {
        let cleared = self.level;
        let bonus = cleared.saturating_mul(LEVEL_CLEAR_POINTS);
        self.award(bonus);
        info!(level = cleared, bonus, score = self.score, "level cleared");
        out_events.push(Event::LevelCleared {
            level: cleared,
            bonus,
        });

        self.level = cleared.saturating_add(1);
        let refill = self.config.level_refill();
        self.charges.teleports = self.charges.teleports.saturating_add(refill.teleports);
        self.charges.safe_teleports = self
            .charges
            .safe_teleports
            .saturating_add(refill.safe_teleports);
        self.charges.disable = self.charges.disable.saturating_add(refill.disable);
        self.pending_rush_bonus = self.pending_rush_bonus.saturating_add(refill.rush);
        let interval = self.config.rush_bonus_interval();
        if interval > 0 && self.level % interval == 0 {
            self.pending_rush_bonus = self.pending_rush_bonus.saturating_add(1);
        }

        if self.level > self.config.max_level() {
            info!(score = self.score, "game won");
            out_events.push(Event::GameWon { score: self.score });
            self.finish(EndReason::Won, out_events);
        } else {
            self.start_level(out_events);
        }
    }
}
