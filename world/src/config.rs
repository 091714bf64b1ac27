//! Tunable parameters for a Gridchase session.

use std::time::Duration;

use gridchase_core::{Charges, GridSize};
use thiserror::Error;

const DEFAULT_GRID: GridSize = GridSize::new(50, 35);
const DEFAULT_SEED: u64 = 0x5eed_da1e_c0de_2025;
const DEFAULT_BASE_PURSUERS: u32 = 5;
const DEFAULT_MAX_LEVEL: u32 = 10;
const DEFAULT_SPAWN_MIN_SQUARED_DISTANCE: u32 = 3;
const DEFAULT_SPAWN_ATTEMPTS_PER_PURSUER: u32 = 1_000;
const DEFAULT_STEP_DURATION: Duration = Duration::from_millis(800);
const DEFAULT_MOVE_COOLDOWN: Duration = Duration::from_millis(100);
const DEFAULT_TELEPORT_ATTEMPTS: u32 = 100;
const DEFAULT_SAFE_TELEPORT_SQUARED_DISTANCE: u32 = 2;
const DEFAULT_STARTING_CHARGES: Charges = Charges::new(10, 3, 2, 1);
const DEFAULT_LEVEL_REFILL: Charges = Charges::new(2, 0, 2, 0);
const DEFAULT_RUSH_BONUS_INTERVAL: u32 = 5;

/// Largest accepted column or row count; keeps squared cell distances inside `u32`.
pub const MAX_GRID_DIMENSION: u32 = 4_096;

/// Speed profile and collision tolerances of the continuous rush mode.
///
/// Speeds are measured in cells per second; distances in cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RushTuning {
    /// Speed every pursuer starts with when the rush begins.
    pub initial_speed: f32,
    /// Multiplicative growth per simulated second (`speed *= acceleration^dt`).
    pub acceleration: f32,
    /// Hard cap on the speed.
    pub max_speed: f32,
    /// Two positions closer than this collide.
    pub collision_threshold: f32,
    /// Pursuers closer than this to the player stop moving.
    pub arrival_epsilon: f32,
}

impl Default for RushTuning {
    fn default() -> Self {
        Self {
            initial_speed: 2.0,
            acceleration: 1.2,
            max_speed: 15.0,
            collision_threshold: 0.5,
            arrival_epsilon: 0.1,
        }
    }
}

/// Configuration parameters required to construct a world.
#[derive(Clone, Debug, PartialEq)]
pub struct WorldConfig {
    grid: GridSize,
    seed: u64,
    base_pursuers: u32,
    max_level: u32,
    spawn_min_squared_distance: u32,
    spawn_attempts_per_pursuer: u32,
    step_duration: Duration,
    move_cooldown: Duration,
    teleport_attempts: u32,
    safe_teleport_squared_distance: u32,
    starting_charges: Charges,
    level_refill: Charges,
    rush_bonus_interval: u32,
    rush: RushTuning,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            grid: DEFAULT_GRID,
            seed: DEFAULT_SEED,
            base_pursuers: DEFAULT_BASE_PURSUERS,
            max_level: DEFAULT_MAX_LEVEL,
            spawn_min_squared_distance: DEFAULT_SPAWN_MIN_SQUARED_DISTANCE,
            spawn_attempts_per_pursuer: DEFAULT_SPAWN_ATTEMPTS_PER_PURSUER,
            step_duration: DEFAULT_STEP_DURATION,
            move_cooldown: DEFAULT_MOVE_COOLDOWN,
            teleport_attempts: DEFAULT_TELEPORT_ATTEMPTS,
            safe_teleport_squared_distance: DEFAULT_SAFE_TELEPORT_SQUARED_DISTANCE,
            starting_charges: DEFAULT_STARTING_CHARGES,
            level_refill: DEFAULT_LEVEL_REFILL,
            rush_bonus_interval: DEFAULT_RUSH_BONUS_INTERVAL,
            rush: RushTuning::default(),
        }
    }
}

impl WorldConfig {
    /// Replaces the grid dimensions.
    #[must_use]
    pub fn with_grid(mut self, grid: GridSize) -> Self {
        self.grid = grid;
        self
    }

    /// Replaces the random seed.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Replaces the pursuer count of level zero; level `n` spawns `base + n`.
    #[must_use]
    pub fn with_base_pursuers(mut self, base_pursuers: u32) -> Self {
        self.base_pursuers = base_pursuers;
        self
    }

    /// Replaces the last level; clearing it wins the game.
    #[must_use]
    pub fn with_max_level(mut self, max_level: u32) -> Self {
        self.max_level = max_level;
        self
    }

    /// Replaces the number of draws each pursuer gets during level setup.
    #[must_use]
    pub fn with_spawn_attempts_per_pursuer(mut self, attempts: u32) -> Self {
        self.spawn_attempts_per_pursuer = attempts;
        self
    }

    /// Replaces the duration of a discrete step animation.
    #[must_use]
    pub fn with_step_duration(mut self, step_duration: Duration) -> Self {
        self.step_duration = step_duration;
        self
    }

    /// Replaces the minimum simulated time between accepted player moves.
    #[must_use]
    pub fn with_move_cooldown(mut self, move_cooldown: Duration) -> Self {
        self.move_cooldown = move_cooldown;
        self
    }

    /// Replaces the charges granted when a game starts.
    #[must_use]
    pub fn with_starting_charges(mut self, charges: Charges) -> Self {
        self.starting_charges = charges;
        self
    }

    /// Replaces the rush speed profile.
    #[must_use]
    pub fn with_rush(mut self, rush: RushTuning) -> Self {
        self.rush = rush;
        self
    }

    /// Dimensions of the playable grid.
    #[must_use]
    pub const fn grid(&self) -> GridSize {
        self.grid
    }

    /// Seed feeding every random draw of the session.
    #[must_use]
    pub const fn seed(&self) -> u64 {
        self.seed
    }

    /// Number of pursuers spawned on the provided level.
    #[must_use]
    pub const fn pursuers_for_level(&self, level: u32) -> u32 {
        self.base_pursuers.saturating_add(level)
    }

    /// Last playable level.
    #[must_use]
    pub const fn max_level(&self) -> u32 {
        self.max_level
    }

    /// Pursuers must spawn strictly farther than this squared distance from the player.
    #[must_use]
    pub const fn spawn_min_squared_distance(&self) -> u32 {
        self.spawn_min_squared_distance
    }

    /// Placement attempts budgeted per requested pursuer.
    #[must_use]
    pub const fn spawn_attempts_per_pursuer(&self) -> u32 {
        self.spawn_attempts_per_pursuer
    }

    /// Duration of a discrete step animation.
    #[must_use]
    pub const fn step_duration(&self) -> Duration {
        self.step_duration
    }

    /// Minimum simulated time between accepted player moves.
    #[must_use]
    pub const fn move_cooldown(&self) -> Duration {
        self.move_cooldown
    }

    /// Number of cells sampled by a relocation before settling.
    #[must_use]
    pub const fn teleport_attempts(&self) -> u32 {
        self.teleport_attempts
    }

    /// Safe relocations reject cells within this squared distance of a pursuer.
    #[must_use]
    pub const fn safe_teleport_squared_distance(&self) -> u32 {
        self.safe_teleport_squared_distance
    }

    /// Charges granted when a game starts.
    #[must_use]
    pub const fn starting_charges(&self) -> Charges {
        self.starting_charges
    }

    /// Charges added whenever a level is cleared.
    #[must_use]
    pub const fn level_refill(&self) -> Charges {
        self.level_refill
    }

    /// Reaching a level divisible by this interval grants a bonus rush charge.
    #[must_use]
    pub const fn rush_bonus_interval(&self) -> u32 {
        self.rush_bonus_interval
    }

    /// Rush speed profile.
    #[must_use]
    pub const fn rush(&self) -> RushTuning {
        self.rush
    }

    /// Checks that every level can be populated and that timings are usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.columns() == 0 || self.grid.rows() == 0 {
            return Err(ConfigError::EmptyGrid);
        }
        if self.grid.columns() > MAX_GRID_DIMENSION || self.grid.rows() > MAX_GRID_DIMENSION {
            return Err(ConfigError::GridTooLarge {
                columns: self.grid.columns(),
                rows: self.grid.rows(),
            });
        }
        if self.max_level == 0 {
            return Err(ConfigError::NoLevels);
        }
        if self.step_duration.is_zero() {
            return Err(ConfigError::ZeroStepDuration);
        }
        if self.teleport_attempts == 0 || self.spawn_attempts_per_pursuer == 0 {
            return Err(ConfigError::ZeroAttempts);
        }

        let exclusion = exclusion_zone_cells(self.spawn_min_squared_distance);
        let required = u64::from(self.pursuers_for_level(self.max_level)) + exclusion;
        if self.grid.cell_count() < required {
            return Err(ConfigError::GridTooSmall {
                cells: self.grid.cell_count(),
                required,
            });
        }

        let rush = self.rush;
        if !(rush.initial_speed > 0.0) {
            return Err(ConfigError::InvalidRush("initial speed must be positive"));
        }
        if !(rush.acceleration >= 1.0) {
            return Err(ConfigError::InvalidRush("acceleration must be at least 1"));
        }
        if !(rush.max_speed >= rush.initial_speed) {
            return Err(ConfigError::InvalidRush(
                "max speed must not be below the initial speed",
            ));
        }
        if !(rush.collision_threshold > 0.0) || !(rush.arrival_epsilon >= 0.0) {
            return Err(ConfigError::InvalidRush("distances must be non-negative"));
        }

        Ok(())
    }
}

/// Reasons a configuration is rejected before a world is built.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// The grid has no cells.
    #[error("grid must have at least one column and one row")]
    EmptyGrid,
    /// A grid dimension exceeds [`MAX_GRID_DIMENSION`].
    #[error("grid {columns}x{rows} exceeds the {MAX_GRID_DIMENSION} cell limit per side")]
    GridTooLarge {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
    /// The game would end before it starts.
    #[error("max level must be at least 1")]
    NoLevels,
    /// Step animations must take time for the pursuit gate to work.
    #[error("step animation duration must be positive")]
    ZeroStepDuration,
    /// Sampling loops need at least one attempt.
    #[error("teleport and spawn attempt caps must be positive")]
    ZeroAttempts,
    /// The final level cannot fit its pursuers outside the spawn exclusion zone.
    #[error("grid has {cells} cells but the final level needs at least {required}")]
    GridTooSmall {
        /// Cells available on the configured grid.
        cells: u64,
        /// Cells required by the final level.
        required: u64,
    },
    /// The rush tuning is unusable.
    #[error("invalid rush tuning: {0}")]
    InvalidRush(&'static str),
}

/// Number of cells (player cell included) within `min_squared` of a cell.
fn exclusion_zone_cells(min_squared: u32) -> u64 {
    let radius = (f64::from(min_squared)).sqrt().floor() as i64;
    let limit = i64::from(min_squared);
    let mut cells = 0;
    for dx in -radius..=radius {
        for dy in -radius..=radius {
            if dx * dx + dy * dy <= limit {
                cells += 1;
            }
        }
    }
    cells
}
