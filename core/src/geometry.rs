//! Grid geometry shared by the world, systems and adapters.
//!
//! Everything here is pure: no state, no side effects, no failure modes.
//! Distances used for thresholds are squared so comparisons never need a
//! square root.

use serde::{Deserialize, Serialize};

/// Location of a single grid cell expressed as column (`x`) and row (`y`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPosition {
    x: i32,
    y: i32,
}

impl GridPosition {
    /// Creates a new grid cell coordinate.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the cell displaced by the provided per-axis delta.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Squared Euclidean distance (`dx² + dy²`) between two cells.
    #[must_use]
    pub const fn squared_distance(self, other: GridPosition) -> u32 {
        let dx = self.x.abs_diff(other.x);
        let dy = self.y.abs_diff(other.y);
        dx.saturating_mul(dx).saturating_add(dy.saturating_mul(dy))
    }

    /// Chebyshev distance, the number of king moves separating two cells.
    #[must_use]
    pub fn chebyshev_distance(self, other: GridPosition) -> u32 {
        self.x.abs_diff(other.x).max(self.y.abs_diff(other.y))
    }

    /// Advances one cell toward `target`, comparing each axis independently.
    ///
    /// An axis that is already aligned keeps a zero delta, so the result is
    /// one of the eight neighbours or the cell itself.
    #[must_use]
    pub fn step_toward(self, target: GridPosition) -> Self {
        let (dx, dy) = self.axis_signs(target);
        self.offset(dx, dy)
    }

    /// Direction of a single step toward `target`, or `None` when aligned.
    #[must_use]
    pub fn direction_toward(self, target: GridPosition) -> Option<Direction> {
        let (dx, dy) = self.axis_signs(target);
        Direction::from_delta(dx, dy)
    }

    fn axis_signs(self, target: GridPosition) -> (i32, i32) {
        (
            target.x.saturating_sub(self.x).signum(),
            target.y.saturating_sub(self.y).signum(),
        )
    }
}

/// Dimensions of the playable grid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridSize {
    columns: u32,
    rows: u32,
}

impl GridSize {
    /// Creates a new grid size descriptor.
    #[must_use]
    pub const fn new(columns: u32, rows: u32) -> Self {
        Self { columns, rows }
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Total number of cells.
    #[must_use]
    pub const fn cell_count(&self) -> u64 {
        self.columns as u64 * self.rows as u64
    }

    /// Reports whether the cell lies inside `0..columns` × `0..rows`.
    #[must_use]
    pub fn contains(&self, position: GridPosition) -> bool {
        u32::try_from(position.x()).map_or(false, |x| x < self.columns)
            && u32::try_from(position.y()).map_or(false, |y| y < self.rows)
    }

    /// Clamps a cell onto the nearest in-bounds cell.
    ///
    /// Zero-sized grids clamp everything to the origin.
    #[must_use]
    pub fn clamp(&self, position: GridPosition) -> GridPosition {
        let max_x = i32::try_from(self.columns.saturating_sub(1)).unwrap_or(i32::MAX);
        let max_y = i32::try_from(self.rows.saturating_sub(1)).unwrap_or(i32::MAX);
        GridPosition::new(position.x().clamp(0, max_x), position.y().clamp(0, max_y))
    }

    /// Largest in-bounds visual coordinate along each axis.
    #[must_use]
    pub fn max_visual(&self) -> VisualPosition {
        VisualPosition::new(
            self.columns.saturating_sub(1) as f32,
            self.rows.saturating_sub(1) as f32,
        )
    }
}

/// Floating point position in grid-cell units used for interpolation.
#[derive(Clone, Copy, Debug, PartialEq, Default, Serialize, Deserialize)]
pub struct VisualPosition {
    /// Horizontal coordinate in cells.
    pub x: f32,
    /// Vertical coordinate in cells.
    pub y: f32,
}

impl VisualPosition {
    /// Creates a new visual position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Linear interpolation toward `target` by factor `t`.
    #[must_use]
    pub fn lerp(self, target: VisualPosition, t: f32) -> Self {
        Self::new(
            self.x + (target.x - self.x) * t,
            self.y + (target.y - self.y) * t,
        )
    }

    /// Squared distance between two visual positions.
    #[must_use]
    pub fn squared_distance(self, other: VisualPosition) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Reports whether `other` lies strictly closer than `threshold`.
    #[must_use]
    pub fn within(self, other: VisualPosition, threshold: f32) -> bool {
        self.squared_distance(other) < threshold * threshold
    }

    /// Nearest grid cell (round half away from zero).
    #[must_use]
    pub fn rounded(self) -> GridPosition {
        GridPosition::new(self.x.round() as i32, self.y.round() as i32)
    }

    /// Midpoint between two visual positions.
    #[must_use]
    pub fn midpoint(self, other: VisualPosition) -> Self {
        Self::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    /// Clamps both coordinates into `0..=max`.
    #[must_use]
    pub fn clamp_to(self, size: GridSize) -> Self {
        let max = size.max_visual();
        Self::new(self.x.clamp(0.0, max.x), self.y.clamp(0.0, max.y))
    }
}

impl From<GridPosition> for VisualPosition {
    fn from(position: GridPosition) -> Self {
        Self::new(position.x() as f32, position.y() as f32)
    }
}

/// Eight-way movement directions available to the player.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Toward decreasing rows.
    North,
    /// Up and to the right.
    NorthEast,
    /// Toward increasing columns.
    East,
    /// Down and to the right.
    SouthEast,
    /// Toward increasing rows.
    South,
    /// Down and to the left.
    SouthWest,
    /// Toward decreasing columns.
    West,
    /// Up and to the left.
    NorthWest,
}

impl Direction {
    /// Every direction in clockwise order starting at north.
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Per-axis delta of a single step in this direction.
    #[must_use]
    pub const fn delta(self) -> (i32, i32) {
        match self {
            Self::North => (0, -1),
            Self::NorthEast => (1, -1),
            Self::East => (1, 0),
            Self::SouthEast => (1, 1),
            Self::South => (0, 1),
            Self::SouthWest => (-1, 1),
            Self::West => (-1, 0),
            Self::NorthWest => (-1, -1),
        }
    }

    /// Resolves a unit delta back into a direction.
    #[must_use]
    pub fn from_delta(dx: i32, dy: i32) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|direction| direction.delta() == (dx, dy))
    }
}

/// Smoothstep easing, `t² · (3 − 2t)` with `t` clamped to `0..=1`.
#[must_use]
pub fn smoothstep(t: f32) -> f32 {
    let t = t.clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}
