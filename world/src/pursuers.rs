//! Entity model for pursuers and their discrete step animation.

use std::time::Duration;

use gridchase_core::{smoothstep, GridPosition, GridSize, PursuerId, PursuerSnapshot, VisualPosition};

/// A single pursuer tracked by the world.
///
/// The grid cell is authoritative and committed as soon as a step starts;
/// the visual position only trails it for rendering.
#[derive(Clone, Debug)]
pub(crate) struct Pursuer {
    id: PursuerId,
    cell: GridPosition,
    visual: VisualPosition,
    origin: VisualPosition,
    target: VisualPosition,
    animating: bool,
    anim_timer: Duration,
}

impl Pursuer {
    pub(crate) fn new(id: PursuerId, cell: GridPosition) -> Self {
        let at_rest = VisualPosition::from(cell);
        Self {
            id,
            cell,
            visual: at_rest,
            origin: at_rest,
            target: at_rest,
            animating: false,
            anim_timer: Duration::ZERO,
        }
    }

    pub(crate) const fn cell(&self) -> GridPosition {
        self.cell
    }

    pub(crate) const fn visual(&self) -> VisualPosition {
        self.visual
    }

    /// Commits `destination` and starts easing the visual position toward it.
    pub(crate) fn begin_step(&mut self, destination: GridPosition) {
        self.origin = self.visual;
        self.target = VisualPosition::from(destination);
        self.cell = destination;
        self.animating = true;
        self.anim_timer = Duration::ZERO;
    }

    /// Advances the step animation, returning `true` once it has finished.
    pub(crate) fn advance_animation(&mut self, dt: Duration, duration: Duration) -> bool {
        if !self.animating {
            return true;
        }

        self.anim_timer = self.anim_timer.saturating_add(dt);
        let t = self.anim_timer.as_secs_f32() / duration.as_secs_f32();
        if t >= 1.0 {
            self.visual = self.target;
            self.animating = false;
        } else {
            self.visual = self.origin.lerp(self.target, smoothstep(t));
        }
        !self.animating
    }

    /// Moves the pursuer continuously and re-derives its cell from the result.
    pub(crate) fn glide_to(&mut self, visual: VisualPosition, grid: GridSize) {
        let visual = visual.clamp_to(grid);
        self.visual = visual;
        self.origin = visual;
        self.target = visual;
        self.cell = grid.clamp(visual.rounded());
        self.animating = false;
        self.anim_timer = Duration::ZERO;
    }

    /// Snaps the visual position back onto the authoritative cell.
    pub(crate) fn settle(&mut self) {
        let at_rest = VisualPosition::from(self.cell);
        self.visual = at_rest;
        self.origin = at_rest;
        self.target = at_rest;
        self.animating = false;
        self.anim_timer = Duration::ZERO;
    }

    pub(crate) fn snapshot(&self) -> PursuerSnapshot {
        PursuerSnapshot {
            id: self.id,
            cell: self.cell,
            visual: self.visual,
            animating: self.animating,
        }
    }
}

/// Moves every pursuer one cell toward `player` using per-axis signs.
///
/// Returns the number of pursuers that started a step.
pub(crate) fn step_all(pursuers: &mut [Pursuer], player: GridPosition) -> u32 {
    let mut stepped = 0;
    for pursuer in pursuers.iter_mut() {
        let destination = pursuer.cell().step_toward(player);
        pursuer.begin_step(destination);
        stepped += 1;
    }
    stepped
}

/// Advances every running animation and reports whether all of them finished.
pub(crate) fn advance_all(pursuers: &mut [Pursuer], dt: Duration, duration: Duration) -> bool {
    let mut all_finished = true;
    for pursuer in pursuers.iter_mut() {
        if !pursuer.advance_animation(dt, duration) {
            all_finished = false;
        }
    }
    all_finished
}

#[cfg(test)]
mod tests {
    use super::*;

    const STEP: Duration = Duration::from_millis(800);

    #[test]
    fn step_commits_cell_before_animation_finishes() {
        let mut pursuer = Pursuer::new(PursuerId::new(0), GridPosition::new(0, 0));
        pursuer.begin_step(GridPosition::new(1, 1));

        assert_eq!(pursuer.cell(), GridPosition::new(1, 1));
        assert!(pursuer.snapshot().animating);
        assert_eq!(pursuer.visual(), VisualPosition::new(0.0, 0.0));
    }

    #[test]
    fn animation_eases_and_lands_on_target() {
        let mut pursuer = Pursuer::new(PursuerId::new(0), GridPosition::new(2, 2));
        pursuer.begin_step(GridPosition::new(3, 2));

        assert!(!pursuer.advance_animation(Duration::from_millis(200), STEP));
        let quarter = pursuer.visual();
        assert!(quarter.x > 2.0 && quarter.x < 2.25, "{quarter:?}");
        assert_eq!(quarter.y, 2.0);

        assert!(!pursuer.advance_animation(Duration::from_millis(200), STEP));
        assert!((pursuer.visual().x - 2.5).abs() < 1e-5);

        assert!(pursuer.advance_animation(Duration::from_millis(400), STEP));
        assert_eq!(pursuer.visual(), VisualPosition::new(3.0, 2.0));
        assert!(!pursuer.snapshot().animating);
    }

    #[test]
    fn step_all_converges_on_player() {
        let player = GridPosition::new(5, 5);
        let mut pursuers = vec![
            Pursuer::new(PursuerId::new(0), GridPosition::new(0, 0)),
            Pursuer::new(PursuerId::new(1), GridPosition::new(9, 5)),
        ];

        assert_eq!(step_all(&mut pursuers, player), 2);
        assert_eq!(pursuers[0].cell(), GridPosition::new(1, 1));
        assert_eq!(pursuers[1].cell(), GridPosition::new(8, 5));
        assert!(!advance_all(&mut pursuers, Duration::from_millis(100), STEP));
        assert!(advance_all(&mut pursuers, STEP, STEP));
    }

    #[test]
    fn glide_rederives_cell_within_bounds() {
        let grid = GridSize::new(4, 4);
        let mut pursuer = Pursuer::new(PursuerId::new(3), GridPosition::new(0, 0));
        pursuer.glide_to(VisualPosition::new(1.6, -0.7), grid);

        assert_eq!(pursuer.visual(), VisualPosition::new(1.6, 0.0));
        assert_eq!(pursuer.cell(), GridPosition::new(2, 0));

        pursuer.settle();
        assert_eq!(pursuer.visual(), VisualPosition::new(2.0, 0.0));
        assert_eq!(pursuer.snapshot().id, PursuerId::new(3));
    }
}
