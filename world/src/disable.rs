//! Disable tool removing pursuers next to the player.

use gridchase_core::{Event, GridPosition};
use tracing::debug;

use crate::{Board, World, DISABLE_POINTS};

/// Removes every pursuer in the player's 8-neighbourhood.
///
/// Removed pursuers leave no obstacle behind. A pursuer on the player's own
/// cell is not adjacent and stays.
pub(crate) fn disable_adjacent(board: &mut Board) -> Vec<GridPosition> {
    let player = board.player;
    let mut cells = Vec::new();
    board.pursuers.retain(|pursuer| {
        if pursuer.cell().chebyshev_distance(player) == 1 {
            cells.push(pursuer.cell());
            false
        } else {
            true
        }
    });
    cells
}

impl World {
    pub(crate) fn use_disable_tool(&mut self, out_events: &mut Vec<Event>) {
        if !self.accepts_actions() || self.charges.disable == 0 {
            debug!(charges = self.charges.disable, "disable tool rejected");
            return;
        }

        self.charges.disable -= 1;
        let cells = disable_adjacent(&mut self.board);
        self.award((cells.len() as u32).saturating_mul(DISABLE_POINTS));
        out_events.push(Event::PursuersDisabled { cells });
        self.end_turn(out_events);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pursuers::Pursuer;
    use gridchase_core::{GridSize, PursuerId};

    #[test]
    fn removes_only_the_king_neighbourhood() {
        let mut board = Board::new(GridSize::new(10, 10));
        board.player = GridPosition::new(5, 5);
        for (index, (x, y)) in [(4, 4), (5, 4), (6, 6), (7, 7), (5, 5)].into_iter().enumerate() {
            board
                .pursuers
                .push(Pursuer::new(PursuerId::new(index as u32), GridPosition::new(x, y)));
        }

        let removed = disable_adjacent(&mut board);

        assert_eq!(
            removed,
            vec![
                GridPosition::new(4, 4),
                GridPosition::new(5, 4),
                GridPosition::new(6, 6),
            ]
        );
        let remaining: Vec<_> = board.pursuers.iter().map(Pursuer::cell).collect();
        assert_eq!(remaining, vec![GridPosition::new(7, 7), GridPosition::new(5, 5)]);
        assert_eq!(board.obstacles.iter().count(), 0);
    }
}
