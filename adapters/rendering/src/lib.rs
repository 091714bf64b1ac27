#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Shared rendering contracts for Gridchase adapters.

use anyhow::Result as AnyResult;
use glam::Vec2;
use gridchase_core::{Direction, GridPosition, VisualPosition};
use std::{error::Error, fmt, time::Duration};

/// RGBA color used when presenting frames.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Color {
    /// Red channel intensity in the range 0.0..=1.0.
    pub red: f32,
    /// Green channel intensity in the range 0.0..=1.0.
    pub green: f32,
    /// Blue channel intensity in the range 0.0..=1.0.
    pub blue: f32,
    /// Alpha channel intensity in the range 0.0..=1.0.
    pub alpha: f32,
}

impl Color {
    /// Creates a new color from floating point channels.
    #[must_use]
    pub const fn new(red: f32, green: f32, blue: f32, alpha: f32) -> Self {
        Self {
            red,
            green,
            blue,
            alpha,
        }
    }

    /// Creates an opaque color from byte RGB values.
    #[must_use]
    pub const fn from_rgb_u8(red: u8, green: u8, blue: u8) -> Self {
        Self {
            red: red as f32 / 255.0,
            green: green as f32 / 255.0,
            blue: blue as f32 / 255.0,
            alpha: 1.0,
        }
    }

    /// Returns the same color with its alpha channel scaled by `opacity`.
    #[must_use]
    pub fn faded(self, opacity: f32) -> Self {
        Self {
            alpha: self.alpha * opacity.clamp(0.0, 1.0),
            ..self
        }
    }
}

/// Input snapshot gathered by adapters before updating the scene.
///
/// Every flag is edge-triggered and only set on the frame the control was pressed.
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct FrameInput {
    /// Direction requested by a movement key.
    pub movement: Option<Direction>,
    /// Whether the confirm key (space) was pressed.
    pub confirm: bool,
    /// Whether the dedicated wait key was pressed.
    pub wait: bool,
    /// Whether the primary pointer button was pressed.
    pub click: bool,
    /// Grid cell under the cursor, when the cursor lies on the board.
    pub cursor_cell: Option<GridPosition>,
    /// Whether the plain teleport key was pressed.
    pub teleport: bool,
    /// Whether the safe teleport key was pressed.
    pub safe_teleport: bool,
    /// Whether the disable tool key was pressed.
    pub disable: bool,
    /// Whether the rush key was pressed.
    pub rush: bool,
    /// Whether the new game key was pressed.
    pub new_game: bool,
    /// Whether the grid overlay key was pressed.
    pub toggle_grid: bool,
}

/// Describes the playing field as a grid of square cells.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GridPresentation {
    /// Number of columns contained in the grid.
    pub columns: u32,
    /// Number of rows contained in the grid.
    pub rows: u32,
    /// Side length of a single cell expressed in world units.
    pub cell_length: f32,
    /// Color used when drawing grid lines.
    pub line_color: Color,
    /// Whether grid lines should be drawn.
    pub show_lines: bool,
}

impl GridPresentation {
    /// Default cell side length in world units.
    pub const DEFAULT_CELL_LENGTH: f32 = 20.0;

    /// Creates a new grid descriptor.
    ///
    /// Returns an error when the grid has no cells or `cell_length` is not a
    /// positive finite number.
    pub fn new(
        columns: u32,
        rows: u32,
        cell_length: f32,
        line_color: Color,
    ) -> std::result::Result<Self, RenderingError> {
        if columns == 0 || rows == 0 {
            return Err(RenderingError::EmptyGrid { columns, rows });
        }
        if !cell_length.is_finite() || cell_length <= 0.0 {
            return Err(RenderingError::InvalidCellLength { cell_length });
        }

        Ok(Self {
            columns,
            rows,
            cell_length,
            line_color,
            show_lines: false,
        })
    }

    /// Calculates the total width of the grid.
    #[must_use]
    pub const fn width(&self) -> f32 {
        self.columns as f32 * self.cell_length
    }

    /// Calculates the total height of the grid.
    #[must_use]
    pub const fn height(&self) -> f32 {
        self.rows as f32 * self.cell_length
    }

    /// World-space centre of a (possibly fractional) cell position.
    #[must_use]
    pub fn cell_center(&self, position: VisualPosition) -> Vec2 {
        Vec2::new(
            (position.x + 0.5) * self.cell_length,
            (position.y + 0.5) * self.cell_length,
        )
    }

    /// Maps a world-space position to the cell containing it.
    ///
    /// Returns `None` when the position lies outside the grid.
    #[must_use]
    pub fn world_to_cell(&self, position: Vec2) -> Option<GridPosition> {
        if position.x < 0.0
            || position.y < 0.0
            || position.x >= self.width()
            || position.y >= self.height()
        {
            return None;
        }

        let column = (position.x / self.cell_length).floor() as i32;
        let row = (position.y / self.cell_length).floor() as i32;
        let column = column.min(self.columns as i32 - 1);
        let row = row.min(self.rows as i32 - 1);
        Some(GridPosition::new(column, row))
    }
}

/// Player marker.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PlayerPresentation {
    /// Cell occupied by the player.
    pub cell: GridPosition,
    /// Opacity in `0.0..=1.0`; drops to zero while relocating.
    pub opacity: f32,
    /// Fill color.
    pub color: Color,
}

/// Pursuer marker drawn at its interpolated position.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PursuerPresentation {
    /// Interpolated position in cell units.
    pub position: VisualPosition,
    /// Fill color.
    pub color: Color,
}

/// Visual style of a transient effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectStyle {
    /// Ring shrinking away at the cell the player left.
    Vanish,
    /// Ring growing in at the cell the player arrived at.
    Appear,
    /// Spark burst over a disabled pursuer.
    Spark,
}

/// Transient effect anchored to a cell.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectPresentation {
    /// Visual style.
    pub style: EffectStyle,
    /// Anchor cell.
    pub cell: GridPosition,
    /// Progress through the effect, from `0.0` to `1.0`.
    pub progress: f32,
}

/// Text drawn in the band beneath the grid.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct HudPresentation {
    /// Counter line.
    pub status: String,
    /// Grid overlay state line.
    pub grid: String,
    /// Banner shown while a rush is running.
    pub banner: Option<String>,
    /// Short-lived notice such as the grid toggle confirmation.
    pub notice: Option<String>,
}

/// Full-screen overlay drawn above the board.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Overlay {
    /// Title screen with the control reference.
    Menu {
        /// Game title.
        title: String,
        /// Instruction lines.
        lines: Vec<String>,
    },
    /// Game-over or victory screen.
    Ended {
        /// Description of how the game ended.
        message: String,
        /// Final score line.
        score: String,
        /// Prompt describing how to continue.
        prompt: String,
    },
}

/// Scene description combining the grid and its inhabitants.
#[derive(Clone, Debug, PartialEq)]
pub struct Scene {
    /// Grid that composes the play area.
    pub grid: GridPresentation,
    /// Player marker, absent on the menu.
    pub player: Option<PlayerPresentation>,
    /// Live pursuers.
    pub pursuers: Vec<PursuerPresentation>,
    /// Blocked cells.
    pub obstacles: Vec<GridPosition>,
    /// Color used to fill blocked cells.
    pub obstacle_color: Color,
    /// Running transient effects.
    pub effects: Vec<EffectPresentation>,
    /// Head-up display text.
    pub hud: HudPresentation,
    /// Overlay covering the board, if any.
    pub overlay: Option<Overlay>,
}

impl Scene {
    /// Height in world units of the band reserved for the HUD.
    pub const HUD_HEIGHT: f32 = 60.0;

    /// Creates an empty scene over the provided grid.
    #[must_use]
    pub fn new(grid: GridPresentation, obstacle_color: Color) -> Self {
        Self {
            grid,
            player: None,
            pursuers: Vec::new(),
            obstacles: Vec::new(),
            obstacle_color,
            effects: Vec::new(),
            hud: HudPresentation::default(),
            overlay: None,
        }
    }

    /// Height of the entire scene including the HUD band.
    #[must_use]
    pub fn total_height(&self) -> f32 {
        self.grid.height() + Self::HUD_HEIGHT
    }
}

/// Presentation descriptor consumed by rendering backends.
#[derive(Clone, Debug, PartialEq)]
pub struct Presentation {
    /// Title used by the created window.
    pub window_title: String,
    /// Solid color used to clear each frame.
    pub clear_color: Color,
    /// Scene content that should be displayed.
    pub scene: Scene,
}

impl Presentation {
    /// Constructs a new presentation descriptor.
    #[must_use]
    pub fn new<T>(window_title: T, clear_color: Color, scene: Scene) -> Self
    where
        T: Into<String>,
    {
        Self {
            window_title: window_title.into(),
            clear_color,
            scene,
        }
    }
}

/// Rendering backend capable of presenting Gridchase scenes.
pub trait RenderingBackend {
    /// Runs the rendering backend until it is requested to exit.
    ///
    /// The provided `update_scene` closure receives the frame delta, per-frame
    /// input captured by the adapter, and may mutate the scene before it is
    /// rendered.
    fn run<F>(self, presentation: Presentation, update_scene: F) -> AnyResult<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static;
}

/// Errors that can occur when constructing rendering descriptors.
#[derive(Debug, PartialEq)]
pub enum RenderingError {
    /// The grid must contain at least one cell.
    EmptyGrid {
        /// Requested column count.
        columns: u32,
        /// Requested row count.
        rows: u32,
    },
    /// Cell length must be positive and finite.
    InvalidCellLength {
        /// Provided length that failed validation.
        cell_length: f32,
    },
}

impl fmt::Display for RenderingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyGrid { columns, rows } => {
                write!(f, "grid must contain cells (received {columns}x{rows})")
            }
            Self::InvalidCellLength { cell_length } => {
                write!(
                    f,
                    "cell_length must be positive (received {cell_length})"
                )
            }
        }
    }
}

impl Error for RenderingError {}
