//! Fixed-timestep driver wiring the world to its systems and the scene.

use std::time::Duration;

use gridchase_core::{Command, Event, SessionState};
use gridchase_rendering::{
    Color, EffectPresentation, EffectStyle, FrameInput, HudPresentation, Overlay,
    PlayerPresentation, PursuerPresentation, Scene,
};
use gridchase_system_audio::{Audio, AudioNotifier, SoundEvent};
use gridchase_system_bootstrap::{Bootstrap, INSTRUCTIONS, RESTART_PROMPT, TITLE};
use gridchase_system_effects::{EffectKind, Effects};
use gridchase_system_input::{ControlInput, Input};
use gridchase_world::{self as world, query, World};

/// Simulated time advanced by a single world tick.
pub(crate) const FIXED_STEP: Duration = Duration::from_nanos(16_666_667);
/// Longest frame delta folded into the accumulator; slower frames drop time.
const MAX_FRAME_DELTA: Duration = Duration::from_millis(250);

const PLAYER_COLOR: Color = Color::from_rgb_u8(60, 200, 90);
const PURSUER_COLOR: Color = Color::from_rgb_u8(220, 60, 60);
const RUSHING_PURSUER_COLOR: Color = Color::from_rgb_u8(255, 140, 40);

/// Sound notifier that reports cues through the tracing pipeline.
#[derive(Debug, Default)]
pub(crate) struct LoggingNotifier;

impl AudioNotifier for LoggingNotifier {
    fn notify(&mut self, sound: SoundEvent) {
        tracing::debug!(sound = sound.name(), "sound cue");
    }
}

/// Owns the world and the pure systems that observe it.
#[derive(Debug)]
pub(crate) struct Simulation<N> {
    world: World,
    input: Input,
    audio: Audio,
    effects: Effects,
    bootstrap: Bootstrap,
    notifier: N,
    accumulator: Duration,
    last_events: Vec<Event>,
}

impl<N: AudioNotifier> Simulation<N> {
    /// Wraps `world`, syncing the input system with its current session.
    pub(crate) fn new(world: World, notifier: N) -> Self {
        let session = query::session(&world);
        Self {
            world,
            input: Input::new(),
            audio: Audio::new(),
            effects: Effects::new(),
            bootstrap: Bootstrap,
            notifier,
            accumulator: Duration::ZERO,
            last_events: vec![Event::SessionChanged { state: session }],
        }
    }

    pub(crate) fn world(&self) -> &World {
        &self.world
    }

    /// Advances one frame: controls first, then as many fixed ticks as `dt` covers.
    pub(crate) fn advance(&mut self, dt: Duration, controls: ControlInput) {
        let mut commands = Vec::new();
        self.input.handle(&self.last_events, controls, &mut commands);

        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }

        self.accumulator = self
            .accumulator
            .saturating_add(dt.min(MAX_FRAME_DELTA));
        while self.accumulator >= FIXED_STEP {
            self.accumulator -= FIXED_STEP;
            world::apply(&mut self.world, Command::Tick { dt: FIXED_STEP }, &mut events);
        }

        self.audio.handle(&events, &mut self.notifier);
        self.effects.handle(&events);
        self.last_events = events;
    }

    /// Rebuilds `scene` from the current world and effect state.
    pub(crate) fn populate_scene(&self, scene: &mut Scene) {
        let session = query::session(&self.world);
        let hud = self.bootstrap.hud(&self.world);

        scene.grid.show_lines = hud.show_grid;
        scene.effects = self
            .effects
            .descriptors()
            .into_iter()
            .map(|descriptor| EffectPresentation {
                style: match descriptor.kind {
                    EffectKind::Vanish => EffectStyle::Vanish,
                    EffectKind::Appear => EffectStyle::Appear,
                    EffectKind::Disable => EffectStyle::Spark,
                },
                cell: descriptor.cell,
                progress: descriptor.progress,
            })
            .collect();

        if session == SessionState::Menu {
            scene.player = None;
            scene.pursuers.clear();
            scene.obstacles.clear();
            scene.hud = HudPresentation::default();
            scene.overlay = Some(Overlay::Menu {
                title: TITLE.to_owned(),
                lines: INSTRUCTIONS.iter().map(|line| (*line).to_owned()).collect(),
            });
            return;
        }

        scene.player = Some(PlayerPresentation {
            cell: query::player(&self.world),
            opacity: self.effects.player_opacity(),
            color: PLAYER_COLOR,
        });
        let pursuer_color = if hud.rush_speed.is_some() {
            RUSHING_PURSUER_COLOR
        } else {
            PURSUER_COLOR
        };
        scene.pursuers = query::pursuer_view(&self.world)
            .iter()
            .map(|snapshot| PursuerPresentation {
                position: snapshot.visual,
                color: pursuer_color,
            })
            .collect();
        scene.obstacles = query::obstacles(&self.world);
        scene.hud = HudPresentation {
            status: hud.status_line(),
            grid: hud.grid_line().to_owned(),
            banner: hud.rush_line(),
            notice: self.effects.notice().map(str::to_owned),
        };
        scene.overlay = match session {
            SessionState::GameOver | SessionState::Won => Some(Overlay::Ended {
                message: hud.end_message.clone().unwrap_or_default(),
                score: hud.final_score_line(),
                prompt: RESTART_PROMPT.to_owned(),
            }),
            SessionState::Menu | SessionState::Playing => None,
        };
    }
}

/// Translates adapter frame input into system controls.
pub(crate) fn controls_from_frame(frame: FrameInput) -> ControlInput {
    ControlInput {
        movement: frame.movement,
        confirm: frame.confirm,
        wait: frame.wait,
        click: frame.click,
        cursor_cell: frame.cursor_cell,
        teleport: frame.teleport,
        safe_teleport: frame.safe_teleport,
        disable: frame.disable,
        rush: frame.rush,
        new_game: frame.new_game,
        toggle_grid: frame.toggle_grid,
    }
}
