//! Player relocation ("teleport").

use gridchase_core::{Event, GridPosition, TeleportMode};
use rand_chacha::ChaCha8Rng;
use tracing::debug;

use crate::{level::random_cell, Board, World};

/// Samples a destination for the player.
///
/// Sampling is best effort: once `attempts` draws are spent the last free
/// cell seen is accepted even if it fails the safety rule. Should no draw
/// land on a free cell at all the player stays put.
pub(crate) fn sample_destination(
    rng: &mut ChaCha8Rng,
    board: &Board,
    mode: TeleportMode,
    attempts: u32,
    safe_squared_distance: u32,
) -> GridPosition {
    let mut fallback = board.player;
    for _ in 0..attempts {
        let candidate = random_cell(rng, board.size);
        if board.is_occupied(candidate) {
            continue;
        }
        fallback = candidate;
        let safe = || {
            board
                .pursuers
                .iter()
                .all(|pursuer| pursuer.cell().squared_distance(candidate) > safe_squared_distance)
        };
        if mode == TeleportMode::Random || safe() {
            return candidate;
        }
    }
    fallback
}

impl World {
    pub(crate) fn teleport(&mut self, mode: TeleportMode, out_events: &mut Vec<Event>) {
        if !self.accepts_actions() || self.charges.teleports_for(mode) == 0 {
            debug!(?mode, "teleport rejected");
            return;
        }

        let to = sample_destination(
            &mut self.rng,
            &self.board,
            mode,
            self.config.teleport_attempts(),
            self.config.safe_teleport_squared_distance(),
        );
        match mode {
            TeleportMode::Random => self.charges.teleports -= 1,
            TeleportMode::Safe => self.charges.safe_teleports -= 1,
        }

        let from = self.board.player;
        self.board.player = to;
        out_events.push(Event::PlayerTeleported { from, to, mode });
        self.end_turn(out_events);
    }
}
