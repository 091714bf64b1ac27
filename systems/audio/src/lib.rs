#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure audio system that turns world events into sound cues.
//!
//! Playback itself belongs to whoever implements [`AudioNotifier`]; this
//! crate only decides which cue a batch of events deserves.

use gridchase_core::Event;

/// Closed set of sound cues the game can request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SoundEvent {
    /// Pursuers crashed into each other or into an obstacle.
    Crash,
    /// The game ended, either caught or victorious.
    GameOver,
    /// A level started.
    GameStart,
    /// The player relocated.
    Teleport,
    /// The disable tool hit at least one pursuer.
    Disable,
}

impl SoundEvent {
    /// Every cue in declaration order.
    pub const ALL: [SoundEvent; 5] = [
        SoundEvent::Crash,
        SoundEvent::GameOver,
        SoundEvent::GameStart,
        SoundEvent::Teleport,
        SoundEvent::Disable,
    ];

    /// Stable lowercase name, suitable for asset lookup.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Crash => "crash",
            Self::GameOver => "gameover",
            Self::GameStart => "gamestart",
            Self::Teleport => "teleport",
            Self::Disable => "disable",
        }
    }

    fn from_event(event: &Event) -> Option<Self> {
        match event {
            Event::PursuersCrashed { .. } => Some(Self::Crash),
            Event::PlayerCaught { .. } | Event::GameWon { .. } => Some(Self::GameOver),
            Event::LevelStarted { .. } => Some(Self::GameStart),
            Event::PlayerTeleported { .. } => Some(Self::Teleport),
            Event::PursuersDisabled { cells } if !cells.is_empty() => Some(Self::Disable),
            _ => None,
        }
    }
}

/// Fire-and-forget sink for sound cues.
pub trait AudioNotifier {
    /// Requests playback of the provided cue.
    fn notify(&mut self, sound: SoundEvent);
}

/// Audio system dispatching cues to an injected notifier.
#[derive(Debug, Default)]
pub struct Audio;

impl Audio {
    /// Creates a new audio system.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Notifies every cue found in `events`, each at most once per batch.
    pub fn handle<N>(&self, events: &[Event], notifier: &mut N)
    where
        N: AudioNotifier + ?Sized,
    {
        let mut played: Vec<SoundEvent> = Vec::new();
        for sound in events.iter().filter_map(SoundEvent::from_event) {
            if played.contains(&sound) {
                continue;
            }
            played.push(sound);
            notifier.notify(sound);
        }
    }
}
