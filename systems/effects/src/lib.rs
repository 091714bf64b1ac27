#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system tracking cosmetic effects derived from world events.
//!
//! Effects never influence the simulation. They are keyed to grid cells and
//! report their progress in `0.0..=1.0` so renderers can fade, scale or
//! colour them however they like.

use std::time::Duration;

use gridchase_core::{Event, GridPosition, SessionState};

const TELEPORT_DURATION: Duration = Duration::from_millis(500);
const DISABLE_DURATION: Duration = Duration::from_millis(800);
const NOTICE_DURATION: Duration = Duration::from_millis(1_500);

/// Fraction of the relocation after which the player starts to reappear.
const APPEAR_START: f32 = 0.3;
/// Fraction of the relocation after which the old cell is fully gone.
const VANISH_END: f32 = 0.5;

/// Kind of cosmetic effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// Sparkle fading out at the cell the player left.
    Vanish,
    /// Sparkle fading in at the cell the player arrived at.
    Appear,
    /// Spark on a cell whose pursuer was disabled.
    Disable,
}

/// Renderer-facing description of one running effect.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EffectDescriptor {
    /// Effect kind.
    pub kind: EffectKind,
    /// Cell the effect is anchored to.
    pub cell: GridPosition,
    /// Progress through the effect, from `0.0` to `1.0`.
    pub progress: f32,
}

#[derive(Clone, Debug)]
struct Relocation {
    from: GridPosition,
    to: GridPosition,
    elapsed: Duration,
}

#[derive(Clone, Debug)]
struct Sparks {
    cells: Vec<GridPosition>,
    elapsed: Duration,
}

#[derive(Clone, Copy, Debug)]
struct Notice {
    grid_visible: bool,
    elapsed: Duration,
}

/// Tracks running effects and expires them as simulated time passes.
#[derive(Clone, Debug, Default)]
pub struct Effects {
    relocation: Option<Relocation>,
    sparks: Option<Sparks>,
    notice: Option<Notice>,
}

impl Effects {
    /// Creates an effect tracker with nothing running.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes a batch of world events in order.
    pub fn handle(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::TimeAdvanced { dt } => self.advance(*dt),
                Event::PlayerTeleported { from, to, .. } => {
                    self.relocation = Some(Relocation {
                        from: *from,
                        to: *to,
                        elapsed: Duration::ZERO,
                    });
                }
                Event::PursuersDisabled { cells } if !cells.is_empty() => {
                    self.sparks = Some(Sparks {
                        cells: cells.clone(),
                        elapsed: Duration::ZERO,
                    });
                }
                Event::GridToggled { visible } => {
                    self.notice = Some(Notice {
                        grid_visible: *visible,
                        elapsed: Duration::ZERO,
                    });
                }
                Event::LevelStarted { .. }
                | Event::SessionChanged {
                    state: SessionState::Menu,
                } => {
                    self.relocation = None;
                    self.sparks = None;
                }
                _ => {}
            }
        }
    }

    fn advance(&mut self, dt: Duration) {
        if let Some(relocation) = self.relocation.as_mut() {
            relocation.elapsed = relocation.elapsed.saturating_add(dt);
            if relocation.elapsed >= TELEPORT_DURATION {
                self.relocation = None;
            }
        }
        if let Some(sparks) = self.sparks.as_mut() {
            sparks.elapsed = sparks.elapsed.saturating_add(dt);
            if sparks.elapsed >= DISABLE_DURATION {
                self.sparks = None;
            }
        }
        if let Some(notice) = self.notice.as_mut() {
            notice.elapsed = notice.elapsed.saturating_add(dt);
            if notice.elapsed >= NOTICE_DURATION {
                self.notice = None;
            }
        }
    }

    /// Running effects in a stable order: relocation first, then sparks.
    #[must_use]
    pub fn descriptors(&self) -> Vec<EffectDescriptor> {
        let mut descriptors = Vec::new();

        if let Some(relocation) = &self.relocation {
            let progress = fraction(relocation.elapsed, TELEPORT_DURATION);
            if progress < VANISH_END {
                descriptors.push(EffectDescriptor {
                    kind: EffectKind::Vanish,
                    cell: relocation.from,
                    progress: progress / VANISH_END,
                });
            }
            if progress > APPEAR_START {
                descriptors.push(EffectDescriptor {
                    kind: EffectKind::Appear,
                    cell: relocation.to,
                    progress: (progress - APPEAR_START) / (1.0 - APPEAR_START),
                });
            }
        }

        if let Some(sparks) = &self.sparks {
            let progress = fraction(sparks.elapsed, DISABLE_DURATION);
            descriptors.extend(sparks.cells.iter().map(|cell| EffectDescriptor {
                kind: EffectKind::Disable,
                cell: *cell,
                progress,
            }));
        }

        descriptors
    }

    /// Opacity of the player sprite, `0.0` while it is between cells.
    #[must_use]
    pub fn player_opacity(&self) -> f32 {
        let Some(relocation) = &self.relocation else {
            return 1.0;
        };
        let progress = fraction(relocation.elapsed, TELEPORT_DURATION);
        if progress < APPEAR_START {
            0.0
        } else {
            (progress - APPEAR_START) / (1.0 - APPEAR_START)
        }
    }

    /// Transient grid overlay notice, if one is showing.
    #[must_use]
    pub fn notice(&self) -> Option<&'static str> {
        self.notice.map(|notice| {
            if notice.grid_visible {
                "Grid ON"
            } else {
                "Grid OFF"
            }
        })
    }
}

fn fraction(elapsed: Duration, total: Duration) -> f32 {
    (elapsed.as_secs_f32() / total.as_secs_f32()).clamp(0.0, 1.0)
}
