#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure input system translating edge-triggered controls into world commands.

use gridchase_core::{Command, Direction, Event, GridPosition, SessionState, TeleportMode};

/// Input snapshot distilled from adapter-provided frame input data.
///
/// Every flag is edge-triggered: adapters set it only on the frame the
/// control was pressed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ControlInput {
    /// Direction requested by a movement key.
    pub movement: Option<Direction>,
    /// Confirm key: starts, dismisses or waits depending on the session.
    pub confirm: bool,
    /// Dedicated wait key.
    pub wait: bool,
    /// Pointer button pressed this frame.
    pub click: bool,
    /// Grid cell under the pointer, when it lies on the board.
    pub cursor_cell: Option<GridPosition>,
    /// Plain relocation key.
    pub teleport: bool,
    /// Safe relocation key.
    pub safe_teleport: bool,
    /// Disable tool key.
    pub disable: bool,
    /// Rush key.
    pub rush: bool,
    /// New game key.
    pub new_game: bool,
    /// Grid overlay key.
    pub toggle_grid: bool,
}

/// Input system that gates controls by the session state it observes.
#[derive(Debug, Clone)]
pub struct Input {
    session: SessionState,
}

impl Default for Input {
    fn default() -> Self {
        Self::new()
    }
}

impl Input {
    /// Creates a new input system that assumes the menu is showing.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            session: SessionState::Menu,
        }
    }

    /// Session state as last reported by the world.
    #[must_use]
    pub const fn session(&self) -> SessionState {
        self.session
    }

    /// Consumes world events and the frame's controls to emit commands.
    pub fn handle(&mut self, events: &[Event], input: ControlInput, out: &mut Vec<Command>) {
        for event in events {
            if let Event::SessionChanged { state } = event {
                self.session = *state;
            }
        }

        match self.session {
            SessionState::Menu => {
                if input.confirm || input.click {
                    out.push(Command::StartGame);
                }
            }
            SessionState::GameOver | SessionState::Won => {
                if input.confirm || input.click {
                    out.push(Command::ReturnToMenu);
                }
            }
            SessionState::Playing => Self::gameplay(input, out),
        }
    }

    fn gameplay(input: ControlInput, out: &mut Vec<Command>) {
        if input.new_game {
            out.push(Command::NewGame);
            return;
        }
        if input.toggle_grid {
            out.push(Command::ToggleGrid);
        }
        if let Some(direction) = input.movement {
            out.push(Command::MovePlayer { direction });
        }
        if input.click {
            if let Some(cell) = input.cursor_cell {
                out.push(Command::ClickCell { cell });
            }
        }
        if input.confirm || input.wait {
            out.push(Command::Wait);
        }
        if input.teleport {
            out.push(Command::Teleport {
                mode: TeleportMode::Random,
            });
        }
        if input.safe_teleport {
            out.push(Command::Teleport {
                mode: TeleportMode::Safe,
            });
        }
        if input.disable {
            out.push(Command::UseDisableTool);
        }
        if input.rush {
            out.push(Command::ActivateRush);
        }
    }
}
