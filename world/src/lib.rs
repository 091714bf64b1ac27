#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state management for Gridchase.
//!
//! The [`World`] owns the board, the session state machine and the seeded
//! random stream. Every mutation flows through [`apply`], which reports what
//! happened as [`Event`] values; adapters and systems observe the world
//! through the read-only [`query`] module.

mod collision;
mod config;
mod disable;
mod level;
mod pursuers;
mod relocation;
mod rush;

use std::time::Duration;

use gridchase_core::{
    Charges, Command, Direction, Event, GridPosition, GridSize, LevelState, PursuerId,
    RushOutcome, SessionState, WELCOME_BANNER,
};
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use thiserror::Error;
use tracing::{debug, info};

use crate::{collision::ObstacleSet, pursuers::Pursuer, rush::RushState};

pub use config::{ConfigError, RushTuning, WorldConfig, MAX_GRID_DIMENSION};

/// Points awarded for every pursuer destroyed by a crash.
pub const CRASH_POINTS: u32 = 2;
/// Points awarded for every pursuer removed by the disable tool.
pub const DISABLE_POINTS: u32 = 5;
/// Points awarded for outlasting every pursuer during a rush.
pub const RUSH_SURVIVAL_BONUS: u32 = 50;
/// Level clear bonus per level number.
pub const LEVEL_CLEAR_POINTS: u32 = 10;

/// Reasons a level snapshot cannot be restored.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum WorldError {
    /// The configuration itself is invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The snapshot refers to a level the configuration does not have.
    #[error("level {level} is outside 1..={max_level}")]
    LevelOutOfRange {
        /// Level stored in the snapshot.
        level: u32,
        /// Last level allowed by the configuration.
        max_level: u32,
    },
    /// An entity lies outside the configured grid.
    #[error("{entity} at ({}, {}) lies outside the grid", .cell.x(), .cell.y())]
    OutOfBounds {
        /// Kind of entity that was misplaced.
        entity: &'static str,
        /// Offending cell.
        cell: GridPosition,
    },
    /// The player stands on a blocked cell.
    #[error("player at ({}, {}) stands on an obstacle", .cell.x(), .cell.y())]
    PlayerOnObstacle {
        /// Offending cell.
        cell: GridPosition,
    },
}

/// Positions of every entity on the grid.
#[derive(Clone, Debug)]
pub(crate) struct Board {
    pub(crate) size: GridSize,
    pub(crate) player: GridPosition,
    pub(crate) pursuers: Vec<Pursuer>,
    pub(crate) obstacles: ObstacleSet,
}

impl Board {
    pub(crate) fn new(size: GridSize) -> Self {
        Self {
            size,
            player: GridPosition::new(0, 0),
            pursuers: Vec::new(),
            obstacles: ObstacleSet::default(),
        }
    }

    /// Reports whether any pursuer stands on the player's cell.
    pub(crate) fn player_caught(&self) -> bool {
        self.pursuers
            .iter()
            .any(|pursuer| pursuer.cell() == self.player)
    }

    /// Reports whether a pursuer or an obstacle holds the cell.
    pub(crate) fn is_occupied(&self, cell: GridPosition) -> bool {
        self.obstacles.contains(cell) || self.pursuers.iter().any(|pursuer| pursuer.cell() == cell)
    }
}

/// How pursuers are currently moving.
#[derive(Clone, Copy, Debug, PartialEq)]
enum Motion {
    /// Waiting for the player's next action.
    Idle,
    /// A discrete step animation is running; resolution follows its end.
    Stepping,
    /// Pursuers charge continuously.
    Rushing(RushState),
}

/// Why the last game ended.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum EndReason {
    Caught,
    SetupFailed { level: u32 },
    Won,
}

/// Represents the authoritative Gridchase world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: WorldConfig,
    rng: ChaCha8Rng,
    session: SessionState,
    board: Board,
    motion: Motion,
    level: u32,
    score: u32,
    charges: Charges,
    pending_rush_bonus: u32,
    show_grid: bool,
    clock: Duration,
    last_move: Option<Duration>,
    next_pursuer_id: u32,
    end: Option<EndReason>,
}

impl World {
    /// Creates a new world sitting on the menu screen.
    pub fn new(config: WorldConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            banner: WELCOME_BANNER,
            rng: ChaCha8Rng::seed_from_u64(config.seed()),
            session: SessionState::Menu,
            board: Board::new(config.grid()),
            motion: Motion::Idle,
            level: 1,
            score: 0,
            charges: config.starting_charges(),
            pending_rush_bonus: 0,
            show_grid: false,
            clock: Duration::ZERO,
            last_move: None,
            next_pursuer_id: 0,
            end: None,
            config,
        })
    }

    /// Rebuilds a world in the middle of a level from a snapshot.
    ///
    /// Pursuers may share cells or stand on obstacles; the next resolution
    /// pass settles them.
    pub fn restore(config: WorldConfig, state: LevelState) -> Result<Self, WorldError> {
        let mut world = Self::new(config)?;
        let max_level = world.config.max_level();
        if state.level == 0 || state.level > max_level {
            return Err(WorldError::LevelOutOfRange {
                level: state.level,
                max_level,
            });
        }

        let grid = world.config.grid();
        let misplaced = std::iter::once(("player", state.player))
            .chain(state.pursuers.iter().map(|cell| ("pursuer", *cell)))
            .chain(state.obstacles.iter().map(|cell| ("obstacle", *cell)))
            .find(|(_, cell)| !grid.contains(*cell));
        if let Some((entity, cell)) = misplaced {
            return Err(WorldError::OutOfBounds { entity, cell });
        }
        if state.obstacles.contains(&state.player) {
            return Err(WorldError::PlayerOnObstacle { cell: state.player });
        }

        world.session = SessionState::Playing;
        world.level = state.level;
        world.score = state.score;
        world.charges = state.charges;
        world.board.player = state.player;
        for cell in state.obstacles {
            let _ = world.board.obstacles.insert(cell);
        }
        for cell in state.pursuers {
            world.spawn_pursuer(cell);
        }
        Ok(world)
    }

    fn spawn_pursuer(&mut self, cell: GridPosition) {
        let id = PursuerId::new(self.next_pursuer_id);
        self.next_pursuer_id = self.next_pursuer_id.wrapping_add(1);
        self.board.pursuers.push(Pursuer::new(id, cell));
    }

    fn accepts_actions(&self) -> bool {
        self.session == SessionState::Playing
            && matches!(self.motion, Motion::Idle | Motion::Rushing(_))
    }

    fn rushing(&self) -> bool {
        matches!(self.motion, Motion::Rushing(_))
    }

    fn award(&mut self, points: u32) {
        self.score = self.score.saturating_add(points);
    }

    /// Stamps the move clock, returning `false` while the cooldown runs.
    fn claim_move_slot(&mut self) -> bool {
        let cooldown = self.config.move_cooldown();
        if let Some(at) = self.last_move {
            if self.clock.saturating_sub(at) < cooldown {
                return false;
            }
        }
        self.last_move = Some(self.clock);
        true
    }

    fn enter(&mut self, state: SessionState, out_events: &mut Vec<Event>) {
        self.session = state;
        out_events.push(Event::SessionChanged { state });
    }

    fn reset_progress(&mut self) {
        self.level = 1;
        self.score = 0;
        self.charges = self.config.starting_charges();
        self.pending_rush_bonus = 0;
        self.motion = Motion::Idle;
        self.last_move = None;
        self.end = None;
    }

    fn finish(&mut self, reason: EndReason, out_events: &mut Vec<Event>) {
        self.motion = Motion::Idle;
        self.end = Some(reason);
        let state = match reason {
            EndReason::Won => SessionState::Won,
            EndReason::Caught | EndReason::SetupFailed { .. } => SessionState::GameOver,
        };
        self.enter(state, out_events);
    }

    fn catch_player(&mut self, out_events: &mut Vec<Event>) {
        let cell = self.board.player;
        info!(level = self.level, score = self.score, "player caught");
        out_events.push(Event::PlayerCaught { cell });
        self.finish(EndReason::Caught, out_events);
    }

    /// Starts one discrete step for every pursuer, or ends the turn at once
    /// when none is left.
    fn end_turn(&mut self, out_events: &mut Vec<Event>) {
        if self.rushing() {
            return;
        }

        let stepped = pursuers::step_all(&mut self.board.pursuers, self.board.player);
        if stepped == 0 {
            self.resolve_board(out_events);
            return;
        }
        self.motion = Motion::Stepping;
        out_events.push(Event::PursuersAdvanced { pursuers: stepped });
    }

    fn resolve_board(&mut self, out_events: &mut Vec<Event>) {
        let resolution = collision::resolve(&mut self.board, out_events);
        self.award(resolution.destroyed.saturating_mul(CRASH_POINTS));
        if resolution.caught {
            self.catch_player(out_events);
        } else if self.board.pursuers.is_empty() {
            self.complete_level(out_events);
        }
    }

    fn advance_motion(&mut self, dt: Duration, out_events: &mut Vec<Event>) {
        match self.motion {
            Motion::Idle => {}
            Motion::Stepping => {
                let duration = self.config.step_duration();
                if pursuers::advance_all(&mut self.board.pursuers, dt, duration) {
                    self.motion = Motion::Idle;
                    self.resolve_board(out_events);
                }
            }
            Motion::Rushing(mut state) => {
                let tick = rush::advance(
                    &mut state,
                    &mut self.board,
                    self.config.rush(),
                    dt,
                    out_events,
                );
                self.motion = Motion::Rushing(state);
                self.award(tick.destroyed.saturating_mul(CRASH_POINTS));
                if let Some(outcome) = tick.outcome {
                    self.finish_rush(outcome, out_events);
                }
            }
        }
    }

    fn finish_rush(&mut self, outcome: RushOutcome, out_events: &mut Vec<Event>) {
        self.motion = Motion::Idle;
        info!(?outcome, score = self.score, "rush ended");
        out_events.push(Event::RushEnded { outcome });
        match outcome {
            RushOutcome::Caught => self.catch_player(out_events),
            RushOutcome::Survived => {
                self.award(RUSH_SURVIVAL_BONUS);
                self.complete_level(out_events);
            }
            RushOutcome::Settled => {
                for pursuer in self.board.pursuers.iter_mut() {
                    pursuer.settle();
                }
                self.resolve_board(out_events);
            }
        }
    }

    fn move_player(&mut self, direction: Direction, out_events: &mut Vec<Event>) {
        if !self.accepts_actions() || !self.claim_move_slot() {
            return;
        }

        let from = self.board.player;
        let (dx, dy) = direction.delta();
        let to = from.offset(dx, dy);
        if !self.board.size.contains(to) || self.board.obstacles.contains(to) {
            debug!(?direction, "move rejected");
            return;
        }

        self.board.player = to;
        out_events.push(Event::PlayerMoved { from, to });
        self.end_turn(out_events);
    }

    fn click_cell(&mut self, cell: GridPosition, out_events: &mut Vec<Event>) {
        if !self.board.size.contains(cell) {
            debug!(?cell, "click outside the grid ignored");
            return;
        }
        if cell == self.board.player {
            if self.accepts_actions() && self.claim_move_slot() {
                self.wait(out_events);
            }
            return;
        }

        if let Some(direction) = self.board.player.direction_toward(cell) {
            self.move_player(direction, out_events);
        }
    }

    fn wait(&mut self, out_events: &mut Vec<Event>) {
        if self.session != SessionState::Playing || self.motion != Motion::Idle {
            return;
        }
        self.end_turn(out_events);
    }

    fn activate_rush(&mut self, out_events: &mut Vec<Event>) {
        if self.session != SessionState::Playing
            || self.motion != Motion::Idle
            || self.charges.rush == 0
        {
            debug!(charges = self.charges.rush, "rush rejected");
            return;
        }

        self.charges.rush -= 1;
        self.motion = Motion::Rushing(RushState::new(self.config.rush()));
        info!(
            level = self.level,
            pursuers = self.board.pursuers.len(),
            "rush started"
        );
        out_events.push(Event::RushStarted);
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.clock = world.clock.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });
            if world.session == SessionState::Playing {
                world.advance_motion(dt, out_events);
            }
        }
        Command::StartGame => {
            if world.session != SessionState::Menu {
                return;
            }
            world.reset_progress();
            world.enter(SessionState::Playing, out_events);
            world.start_level(out_events);
        }
        Command::NewGame => {
            if world.session != SessionState::Playing {
                return;
            }
            info!(level = world.level, score = world.score, "game abandoned");
            world.reset_progress();
            world.start_level(out_events);
        }
        Command::ReturnToMenu => {
            if !matches!(world.session, SessionState::GameOver | SessionState::Won) {
                return;
            }
            world.reset_progress();
            world.board.pursuers.clear();
            world.board.obstacles.clear();
            world.enter(SessionState::Menu, out_events);
        }
        Command::MovePlayer { direction } => world.move_player(direction, out_events),
        Command::ClickCell { cell } => world.click_cell(cell, out_events),
        Command::Wait => world.wait(out_events),
        Command::Teleport { mode } => world.teleport(mode, out_events),
        Command::UseDisableTool => world.use_disable_tool(out_events),
        Command::ActivateRush => world.activate_rush(out_events),
        Command::ToggleGrid => {
            if world.session != SessionState::Playing {
                return;
            }
            world.show_grid = !world.show_grid;
            out_events.push(Event::GridToggled {
                visible: world.show_grid,
            });
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use gridchase_core::{
        Charges, GridPosition, GridSize, LevelState, PursuerView, SessionState,
    };

    use super::{EndReason, Motion, World};

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Current phase of the session state machine.
    #[must_use]
    pub fn session(world: &World) -> SessionState {
        world.session
    }

    /// Dimensions of the playable grid.
    #[must_use]
    pub fn grid_size(world: &World) -> GridSize {
        world.board.size
    }

    /// Authoritative player cell.
    #[must_use]
    pub fn player(world: &World) -> GridPosition {
        world.board.player
    }

    /// Captures a read-only view of the live pursuers.
    #[must_use]
    pub fn pursuer_view(world: &World) -> PursuerView {
        PursuerView::from_snapshots(
            world
                .board
                .pursuers
                .iter()
                .map(|pursuer| pursuer.snapshot())
                .collect(),
        )
    }

    /// Blocked cells in ascending order.
    #[must_use]
    pub fn obstacles(world: &World) -> Vec<GridPosition> {
        world.board.obstacles.iter().collect()
    }

    /// Accumulated score.
    #[must_use]
    pub fn score(world: &World) -> u32 {
        world.score
    }

    /// One-based number of the current level.
    #[must_use]
    pub fn level(world: &World) -> u32 {
        world.level
    }

    /// Remaining player charges.
    #[must_use]
    pub fn charges(world: &World) -> Charges {
        world.charges
    }

    /// Current rush speed in cells per second, or `None` outside a rush.
    #[must_use]
    pub fn rush_speed(world: &World) -> Option<f32> {
        match world.motion {
            Motion::Rushing(state) => Some(state.speed()),
            Motion::Idle | Motion::Stepping => None,
        }
    }

    /// Reports whether a discrete step animation blocks player actions.
    #[must_use]
    pub fn pursuit_in_motion(world: &World) -> bool {
        world.motion == Motion::Stepping
    }

    /// Whether the grid overlay is shown.
    #[must_use]
    pub fn show_grid(world: &World) -> bool {
        world.show_grid
    }

    /// Message describing how the last game ended.
    #[must_use]
    pub fn end_message(world: &World) -> Option<String> {
        world.end.map(|reason| match reason {
            EndReason::Caught => "Game Over! You were caught by a pursuer!".to_owned(),
            EndReason::SetupFailed { level } => {
                format!("Game Over! Level {level} could not be set up.")
            }
            EndReason::Won => "Congratulations! You survived all levels!".to_owned(),
        })
    }

    /// Serializable snapshot of the level in progress.
    #[must_use]
    pub fn level_state(world: &World) -> LevelState {
        let mut pursuers: Vec<_> = world
            .board
            .pursuers
            .iter()
            .map(|pursuer| pursuer.snapshot())
            .collect();
        pursuers.sort_by_key(|snapshot| snapshot.id);
        LevelState {
            level: world.level,
            score: world.score,
            charges: world.charges,
            player: world.board.player,
            pursuers: pursuers.into_iter().map(|snapshot| snapshot.cell).collect(),
            obstacles: world.board.obstacles.iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridchase_core::TeleportMode;

    fn small_config() -> WorldConfig {
        WorldConfig::default()
            .with_grid(GridSize::new(10, 10))
            .with_seed(7)
    }

    fn restored(player: (i32, i32), pursuers: &[(i32, i32)], obstacles: &[(i32, i32)]) -> World {
        let state = LevelState {
            level: 1,
            score: 0,
            charges: Charges::new(10, 3, 2, 1),
            player: GridPosition::new(player.0, player.1),
            pursuers: pursuers
                .iter()
                .map(|(x, y)| GridPosition::new(*x, *y))
                .collect(),
            obstacles: obstacles
                .iter()
                .map(|(x, y)| GridPosition::new(*x, *y))
                .collect(),
        };
        World::restore(small_config(), state).expect("valid snapshot")
    }

    #[test]
    fn new_world_waits_on_menu() {
        let world = World::new(small_config()).expect("valid config");
        assert_eq!(query::session(&world), SessionState::Menu);
        assert_eq!(query::welcome_banner(&world), WELCOME_BANNER);
        assert!(query::pursuer_view(&world).is_empty());
        assert_eq!(query::end_message(&world), None);
    }

    #[test]
    fn gameplay_commands_are_ignored_on_menu() {
        let mut world = World::new(small_config()).expect("valid config");
        let mut events = Vec::new();

        for command in [
            Command::MovePlayer {
                direction: Direction::East,
            },
            Command::Wait,
            Command::Teleport {
                mode: TeleportMode::Random,
            },
            Command::UseDisableTool,
            Command::ActivateRush,
            Command::ToggleGrid,
            Command::NewGame,
            Command::ReturnToMenu,
        ] {
            apply(&mut world, command, &mut events);
        }

        assert!(events.is_empty());
        assert_eq!(query::session(&world), SessionState::Menu);
    }

    #[test]
    fn actions_are_blocked_while_pursuers_animate() {
        let mut world = restored((5, 5), &[(0, 0)], &[]);
        let mut events = Vec::new();

        apply(&mut world, Command::Wait, &mut events);
        assert!(query::pursuit_in_motion(&world));

        events.clear();
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(200),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::MovePlayer {
                direction: Direction::North,
            },
            &mut events,
        );
        apply(&mut world, Command::UseDisableTool, &mut events);

        assert_eq!(query::player(&world), GridPosition::new(5, 5));
        assert_eq!(query::charges(&world).disable, 2);
        assert_eq!(
            events,
            vec![Event::TimeAdvanced {
                dt: Duration::from_millis(200),
            }]
        );
    }

    #[test]
    fn move_into_obstacle_or_edge_is_ignored() {
        let mut world = restored((0, 0), &[(9, 9)], &[(1, 0)]);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::MovePlayer {
                direction: Direction::East,
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(150),
            },
            &mut events,
        );
        apply(
            &mut world,
            Command::MovePlayer {
                direction: Direction::North,
            },
            &mut events,
        );

        assert_eq!(query::player(&world), GridPosition::new(0, 0));
        assert!(!query::pursuit_in_motion(&world));
    }

    #[test]
    fn move_cooldown_throttles_repeated_moves_during_rush() {
        let mut world = restored((5, 5), &[(0, 9)], &[]);
        let mut events = Vec::new();
        apply(&mut world, Command::ActivateRush, &mut events);

        let east = Command::MovePlayer {
            direction: Direction::East,
        };
        apply(&mut world, east.clone(), &mut events);
        apply(&mut world, east.clone(), &mut events);
        assert_eq!(query::player(&world), GridPosition::new(6, 5));

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(100),
            },
            &mut events,
        );
        apply(&mut world, east, &mut events);
        assert_eq!(query::player(&world), GridPosition::new(7, 5));
    }

    #[test]
    fn click_steps_toward_cell_and_waits_on_player() {
        let mut world = restored((5, 5), &[(0, 0)], &[]);
        let mut events = Vec::new();

        apply(
            &mut world,
            Command::ClickCell {
                cell: GridPosition::new(9, 1),
            },
            &mut events,
        );
        assert_eq!(query::player(&world), GridPosition::new(6, 4));

        apply(
            &mut world,
            Command::Tick {
                dt: Duration::from_millis(800),
            },
            &mut events,
        );
        events.clear();
        apply(
            &mut world,
            Command::ClickCell {
                cell: GridPosition::new(6, 4),
            },
            &mut events,
        );
        assert_eq!(query::player(&world), GridPosition::new(6, 4));
        assert_eq!(events, vec![Event::PursuersAdvanced { pursuers: 1 }]);
    }

    #[test]
    fn clicks_outside_the_grid_are_ignored() {
        let mut world = restored((5, 5), &[(0, 0)], &[]);
        let mut events = Vec::new();

        for cell in [
            GridPosition::new(i32::MIN, 5),
            GridPosition::new(5, i32::MAX),
            GridPosition::new(-1, -1),
            GridPosition::new(10, 5),
        ] {
            apply(&mut world, Command::ClickCell { cell }, &mut events);
        }

        assert!(events.is_empty());
        assert_eq!(query::player(&world), GridPosition::new(5, 5));
        assert!(!query::pursuit_in_motion(&world));
    }

    #[test]
    fn grid_toggle_flips_visibility() {
        let mut world = restored((5, 5), &[(0, 0)], &[]);
        let mut events = Vec::new();

        apply(&mut world, Command::ToggleGrid, &mut events);
        apply(&mut world, Command::ToggleGrid, &mut events);

        assert_eq!(
            events,
            vec![
                Event::GridToggled { visible: true },
                Event::GridToggled { visible: false },
            ]
        );
        assert!(!query::show_grid(&world));
    }

    #[test]
    fn restore_rejects_inconsistent_snapshots() {
        let valid = LevelState {
            level: 2,
            score: 10,
            charges: Charges::default(),
            player: GridPosition::new(1, 1),
            pursuers: vec![GridPosition::new(4, 4)],
            obstacles: vec![GridPosition::new(2, 2)],
        };

        let mut outside = valid.clone();
        outside.pursuers.push(GridPosition::new(10, 3));
        assert_eq!(
            World::restore(small_config(), outside).err(),
            Some(WorldError::OutOfBounds {
                entity: "pursuer",
                cell: GridPosition::new(10, 3),
            })
        );

        let mut blocked = valid.clone();
        blocked.player = GridPosition::new(2, 2);
        assert_eq!(
            World::restore(small_config(), blocked).err(),
            Some(WorldError::PlayerOnObstacle {
                cell: GridPosition::new(2, 2),
            })
        );

        let mut too_far = valid.clone();
        too_far.level = 11;
        assert_eq!(
            World::restore(small_config(), too_far).err(),
            Some(WorldError::LevelOutOfRange {
                level: 11,
                max_level: 10,
            })
        );

        assert!(World::restore(small_config(), valid).is_ok());
    }
}
