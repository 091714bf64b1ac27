#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure bootstrap system that prepares the Gridchase experience.

use gridchase_core::{Charges, SessionState};
use gridchase_world::{query, World};

/// Title shown on the menu screen.
pub const TITLE: &str = "GRIDCHASE";

/// Controls listed on the menu screen.
pub const INSTRUCTIONS: &[&str] = &[
    "Use arrow keys or mouse to move",
    "Q, E, Z, C for diagonal movement",
    "N to start a new game",
    "SPACE or . to wait",
    "T to teleport randomly",
    "R to teleport safely",
    "S to use the disable tool",
    "L to rush (all pursuers charge you)",
    "G to turn the grid on/off",
    "",
    "MOUSE: click a cell to step toward it",
    "Click on the player to wait in place",
    "",
    "Avoid the pursuers!",
    "Make them crash into each other!",
    "The disable tool destroys adjacent pursuers!",
    "Rush forces every pursuer to move!",
    "",
    "Press SPACE or click to start",
];

/// Prompt shown on the game-over and victory screens.
pub const RESTART_PROMPT: &str = "Press SPACE or click to restart";

/// Head-up display data derived from the world.
#[derive(Clone, Debug, PartialEq)]
pub struct HudSummary {
    /// Current session phase.
    pub session: SessionState,
    /// One-based level number.
    pub level: u32,
    /// Accumulated score.
    pub score: u32,
    /// Remaining charges.
    pub charges: Charges,
    /// Live pursuer count.
    pub pursuers: usize,
    /// Rush speed while a rush is running.
    pub rush_speed: Option<f32>,
    /// Whether the grid overlay is shown.
    pub show_grid: bool,
    /// Message describing how the last game ended.
    pub end_message: Option<String>,
}

impl HudSummary {
    /// Single-line status with every counter.
    #[must_use]
    pub fn status_line(&self) -> String {
        format!(
            "Level: {}  Score: {}  Teleports: {}  Safe: {}  Disable: {}  Rush: {}  Pursuers: {}",
            self.level,
            self.score,
            self.charges.teleports,
            self.charges.safe_teleports,
            self.charges.disable,
            self.charges.rush,
            self.pursuers,
        )
    }

    /// Grid overlay state line.
    #[must_use]
    pub fn grid_line(&self) -> &'static str {
        if self.show_grid {
            "Grid: ON"
        } else {
            "Grid: OFF"
        }
    }

    /// Banner shown while a rush is running.
    #[must_use]
    pub fn rush_line(&self) -> Option<String> {
        self.rush_speed
            .map(|speed| format!("RUSH ACTIVE! Speed: {speed:.1}"))
    }

    /// Final score line for the end screens.
    #[must_use]
    pub fn final_score_line(&self) -> String {
        format!("Final Score: {}", self.score)
    }
}

/// Produces data required to greet the player and fill the HUD.
#[derive(Debug, Default)]
pub struct Bootstrap;

impl Bootstrap {
    /// Derives the banner that should be shown when the experience starts.
    #[must_use]
    pub fn welcome_banner<'world>(&self, world: &'world World) -> &'world str {
        query::welcome_banner(world)
    }

    /// Collects the counters shown by the HUD.
    #[must_use]
    pub fn hud(&self, world: &World) -> HudSummary {
        HudSummary {
            session: query::session(world),
            level: query::level(world),
            score: query::score(world),
            charges: query::charges(world),
            pursuers: query::pursuer_view(world).len(),
            rush_speed: query::rush_speed(world),
            show_grid: query::show_grid(world),
            end_message: query::end_message(world),
        }
    }
}
