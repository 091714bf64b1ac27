//! Batch collision resolution run after every discrete movement cycle.

use std::collections::{BTreeMap, BTreeSet};

use gridchase_core::{CrashKind, Event, GridPosition};

use crate::Board;

/// Cells permanently blocked for the remainder of a level.
#[derive(Clone, Debug, Default)]
pub(crate) struct ObstacleSet {
    cells: BTreeSet<GridPosition>,
}

impl ObstacleSet {
    pub(crate) fn contains(&self, cell: GridPosition) -> bool {
        self.cells.contains(&cell)
    }

    /// Adds `cell`, returning `false` when it was already blocked.
    pub(crate) fn insert(&mut self, cell: GridPosition) -> bool {
        self.cells.insert(cell)
    }

    pub(crate) fn clear(&mut self) {
        self.cells.clear();
    }

    /// Blocked cells in ascending order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = GridPosition> + '_ {
        self.cells.iter().copied()
    }

    /// Returns the first blocked cell satisfying `predicate`.
    pub(crate) fn find(&self, mut predicate: impl FnMut(GridPosition) -> bool) -> Option<GridPosition> {
        self.iter().find(|cell| predicate(*cell))
    }
}

/// Result of a batch resolution pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Resolution {
    /// A pursuer occupies the player's cell.
    pub(crate) caught: bool,
    /// Pursuers removed by crashes during the pass.
    pub(crate) destroyed: u32,
}

/// Runs the ordered resolution pass over the board.
///
/// Order: player check, obstacle crashes, pile-ups, obstacle commit, player
/// re-check. A capture found by the first check ends the pass untouched.
pub(crate) fn resolve(board: &mut Board, out_events: &mut Vec<Event>) -> Resolution {
    if board.player_caught() {
        return Resolution {
            caught: true,
            destroyed: 0,
        };
    }

    let Board {
        pursuers,
        obstacles,
        ..
    } = board;
    let mut pending: BTreeSet<GridPosition> = BTreeSet::new();
    let mut destroyed = 0;

    let mut wrecked: BTreeMap<GridPosition, u32> = BTreeMap::new();
    pursuers.retain(|pursuer| {
        if obstacles.contains(pursuer.cell()) {
            *wrecked.entry(pursuer.cell()).or_default() += 1;
            false
        } else {
            true
        }
    });
    for (cell, count) in wrecked {
        destroyed += count;
        let _ = pending.insert(cell);
        out_events.push(Event::PursuersCrashed {
            cell,
            kind: CrashKind::Obstacle,
            destroyed: count,
        });
    }

    let mut occupancy: BTreeMap<GridPosition, u32> = BTreeMap::new();
    for pursuer in pursuers.iter() {
        *occupancy.entry(pursuer.cell()).or_default() += 1;
    }
    occupancy.retain(|_, count| *count > 1);
    if !occupancy.is_empty() {
        pursuers.retain(|pursuer| !occupancy.contains_key(&pursuer.cell()));
        for (cell, count) in occupancy {
            destroyed += count;
            let _ = pending.insert(cell);
            out_events.push(Event::PursuersCrashed {
                cell,
                kind: CrashKind::Pursuer,
                destroyed: count,
            });
        }
    }

    for cell in pending {
        if obstacles.insert(cell) {
            out_events.push(Event::ObstacleCreated { cell });
        }
    }

    Resolution {
        caught: board.player_caught(),
        destroyed,
    }
}
