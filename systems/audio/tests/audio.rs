use gridchase_core::{CrashKind, Event, GridPosition, TeleportMode};
use gridchase_system_audio::{Audio, AudioNotifier, SoundEvent};

#[derive(Default)]
struct Recorder {
    played: Vec<SoundEvent>,
}

impl AudioNotifier for Recorder {
    fn notify(&mut self, sound: SoundEvent) {
        self.played.push(sound);
    }
}

fn crash_at(x: i32, y: i32) -> Event {
    Event::PursuersCrashed {
        cell: GridPosition::new(x, y),
        kind: CrashKind::Pursuer,
        destroyed: 2,
    }
}

#[test]
fn each_cue_plays_once_per_batch() {
    let audio = Audio::new();
    let mut recorder = Recorder::default();

    audio.handle(
        &[crash_at(1, 1), crash_at(4, 4), crash_at(7, 2)],
        &mut recorder,
    );
    audio.handle(&[crash_at(3, 3)], &mut recorder);

    assert_eq!(recorder.played, vec![SoundEvent::Crash, SoundEvent::Crash]);
}

#[test]
fn cues_follow_first_occurrence_order() {
    let audio = Audio::default();
    let mut recorder = Recorder::default();

    audio.handle(
        &[
            Event::PlayerTeleported {
                from: GridPosition::new(0, 0),
                to: GridPosition::new(5, 5),
                mode: TeleportMode::Random,
            },
            crash_at(2, 2),
            Event::PlayerCaught {
                cell: GridPosition::new(5, 5),
            },
        ],
        &mut recorder,
    );

    assert_eq!(
        recorder.played,
        vec![SoundEvent::Teleport, SoundEvent::Crash, SoundEvent::GameOver]
    );
}

#[test]
fn empty_disable_is_silent() {
    let audio = Audio::new();
    let mut recorder = Recorder::default();

    audio.handle(&[Event::PursuersDisabled { cells: Vec::new() }], &mut recorder);
    assert!(recorder.played.is_empty());

    audio.handle(
        &[Event::PursuersDisabled {
            cells: vec![GridPosition::new(1, 2)],
        }],
        &mut recorder,
    );
    assert_eq!(recorder.played, vec![SoundEvent::Disable]);
}

#[test]
fn level_start_and_victory_have_cues() {
    let audio = Audio::new();
    let mut recorder = Recorder::default();

    audio.handle(
        &[Event::LevelStarted {
            level: 1,
            pursuers: 6,
        }],
        &mut recorder,
    );
    audio.handle(&[Event::GameWon { score: 300 }], &mut recorder);

    assert_eq!(
        recorder.played,
        vec![SoundEvent::GameStart, SoundEvent::GameOver]
    );
}

#[test]
fn names_are_stable() {
    let names: Vec<_> = SoundEvent::ALL.iter().map(SoundEvent::name).collect();
    assert_eq!(
        names,
        vec!["crash", "gameover", "gamestart", "teleport", "disable"]
    );
}
