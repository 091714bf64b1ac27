#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Gridchase engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing player intents, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values for systems to
//! react to deterministically. Systems consume event streams, query immutable
//! snapshots, and respond exclusively with new command batches or
//! presentation data.

mod geometry;

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use geometry::{smoothstep, Direction, GridPosition, GridSize, VisualPosition};

/// Canonical banner emitted when the experience boots.
pub const WELCOME_BANNER: &str = "Welcome to Gridchase. Make them crash into each other!";

/// Phase of the session state machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SessionState {
    /// Title screen waiting for the player to start.
    Menu,
    /// A level is in progress and gameplay input is accepted.
    Playing,
    /// The player was caught or the level could not be set up.
    GameOver,
    /// Every level was cleared.
    Won,
}

/// Variants of the relocation action.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TeleportMode {
    /// Any free cell.
    Random,
    /// A free cell that no pursuer can reach in a single step.
    Safe,
}

/// What a destroyed pursuer collided with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CrashKind {
    /// Ran into an existing obstacle.
    Obstacle,
    /// Ran into one or more other pursuers.
    Pursuer,
}

/// Reason the continuous rush mode ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RushOutcome {
    /// No pursuer had any distance left to cover.
    Settled,
    /// Every pursuer was destroyed while rushing.
    Survived,
    /// A pursuer reached the player.
    Caught,
}

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Leaves the menu and starts the first level.
    StartGame,
    /// Abandons the running game and restarts from the first level.
    NewGame,
    /// Dismisses the game-over or victory screen and returns to the menu.
    ReturnToMenu,
    /// Requests that the player step one cell in the provided direction.
    MovePlayer {
        /// Direction of the attempted step.
        direction: Direction,
    },
    /// Pointer request: step toward the cell, or wait when it is the player's own.
    ClickCell {
        /// Grid cell under the pointer.
        cell: GridPosition,
    },
    /// Spends the turn without moving.
    Wait,
    /// Relocates the player to a sampled cell.
    Teleport {
        /// Which sampling rule and charge pool to use.
        mode: TeleportMode,
    },
    /// Destroys every pursuer adjacent to the player.
    UseDisableTool,
    /// Enters the continuous rush mode.
    ActivateRush,
    /// Shows or hides the grid overlay.
    ToggleGrid,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Announces that the session entered a new state.
    SessionChanged {
        /// State that became active.
        state: SessionState,
    },
    /// Confirms that a level was populated and play can begin.
    LevelStarted {
        /// One-based level number.
        level: u32,
        /// Number of pursuers placed on the board.
        pursuers: u32,
    },
    /// Reports that level setup gave up placing pursuers.
    LevelSetupFailed {
        /// Level that failed to start.
        level: u32,
        /// Number of pursuers the level asked for.
        requested: u32,
        /// Number of pursuers placed before the attempt cap was reached.
        placed: u32,
    },
    /// Confirms that the player stepped between two cells.
    PlayerMoved {
        /// Cell the player left.
        from: GridPosition,
        /// Cell the player now occupies.
        to: GridPosition,
    },
    /// Confirms that the player relocated.
    PlayerTeleported {
        /// Cell the player left.
        from: GridPosition,
        /// Cell the player now occupies.
        to: GridPosition,
        /// Charge pool the relocation consumed.
        mode: TeleportMode,
    },
    /// Announces that every live pursuer committed a discrete step.
    PursuersAdvanced {
        /// Number of pursuers that stepped.
        pursuers: u32,
    },
    /// Reports pursuers destroyed by a collision at a single cell.
    PursuersCrashed {
        /// Cell where the collision resolved.
        cell: GridPosition,
        /// What the pursuers collided with.
        kind: CrashKind,
        /// Number of pursuers removed by this collision.
        destroyed: u32,
    },
    /// Reports that a new obstacle was committed to the board.
    ObstacleCreated {
        /// Cell that became permanently blocked.
        cell: GridPosition,
    },
    /// Reports the result of using the disable tool.
    PursuersDisabled {
        /// Cells of the pursuers that were removed. May be empty.
        cells: Vec<GridPosition>,
    },
    /// Announces that the continuous rush mode began.
    RushStarted,
    /// Announces that the continuous rush mode ended.
    RushEnded {
        /// Why the rush stopped.
        outcome: RushOutcome,
    },
    /// Reports that a pursuer reached the player.
    PlayerCaught {
        /// Player cell at the time of capture.
        cell: GridPosition,
    },
    /// Reports that the last pursuer of a level was destroyed.
    LevelCleared {
        /// Level that was cleared.
        level: u32,
        /// Points awarded for clearing it.
        bonus: u32,
    },
    /// Reports that the final level was cleared.
    GameWon {
        /// Final score.
        score: u32,
    },
    /// Reports the new grid overlay visibility.
    GridToggled {
        /// Whether the overlay is now shown.
        visible: bool,
    },
}

/// Unique identifier assigned to a pursuer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PursuerId(u32);

impl PursuerId {
    /// Creates a new pursuer identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }
}

/// Limited-use resources held by the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Charges {
    /// Plain relocation charges.
    pub teleports: u32,
    /// Safe relocation charges.
    pub safe_teleports: u32,
    /// Disable tool charges.
    pub disable: u32,
    /// Rush mode charges.
    pub rush: u32,
}

impl Charges {
    /// Creates a new charge ledger.
    #[must_use]
    pub const fn new(teleports: u32, safe_teleports: u32, disable: u32, rush: u32) -> Self {
        Self {
            teleports,
            safe_teleports,
            disable,
            rush,
        }
    }

    /// Charges available for the provided relocation mode.
    #[must_use]
    pub const fn teleports_for(&self, mode: TeleportMode) -> u32 {
        match mode {
            TeleportMode::Random => self.teleports,
            TeleportMode::Safe => self.safe_teleports,
        }
    }
}

/// Serializable description of a level in progress.
///
/// Only authoritative grid state is captured; visual interpolation and
/// cosmetic effects restart from rest when a state is restored.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelState {
    /// One-based level number.
    pub level: u32,
    /// Accumulated score.
    pub score: u32,
    /// Remaining charges.
    pub charges: Charges,
    /// Player cell.
    pub player: GridPosition,
    /// Cells of the live pursuers in identifier order.
    pub pursuers: Vec<GridPosition>,
    /// Permanently blocked cells in ascending order.
    pub obstacles: Vec<GridPosition>,
}

/// Immutable representation of a single pursuer's state used for queries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PursuerSnapshot {
    /// Unique identifier assigned to the pursuer.
    pub id: PursuerId,
    /// Authoritative grid cell.
    pub cell: GridPosition,
    /// Interpolated position for rendering.
    pub visual: VisualPosition,
    /// Whether a discrete step animation is still running.
    pub animating: bool,
}

/// Read-only snapshot describing all live pursuers.
#[derive(Clone, Debug, Default)]
pub struct PursuerView {
    snapshots: Vec<PursuerSnapshot>,
}

impl PursuerView {
    /// Creates a new pursuer view from the provided snapshots.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<PursuerSnapshot>) -> Self {
        snapshots.sort_by_key(|snapshot| snapshot.id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &PursuerSnapshot> {
        self.snapshots.iter()
    }

    /// Number of live pursuers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Reports whether no pursuer is alive.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}
