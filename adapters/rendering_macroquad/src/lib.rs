#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Macroquad-backed rendering adapter for Gridchase.
//!
//! Macroquad's optional audio stack depends on native ALSA development
//! libraries, which are unavailable in the containerised CI environment.
//! To keep `cargo test` usable everywhere we depend on macroquad without its
//! default `audio` feature. Sound cues are therefore reported through the
//! audio system's notifier rather than played here.

use anyhow::Result;
use glam::Vec2;
use gridchase_core::{Direction, GridPosition};
use gridchase_rendering::{
    Color, EffectPresentation, EffectStyle, FrameInput, HudPresentation, Overlay, Presentation,
    RenderingBackend, Scene,
};
use macroquad::input::{
    is_key_pressed, is_mouse_button_pressed, mouse_position, KeyCode, MouseButton,
};
use std::time::Duration;

const HUD_FONT_SIZE: f32 = 18.0;
const OVERLAY_FONT_SIZE: f32 = 22.0;
const TITLE_FONT_SIZE: f32 = 44.0;
const TEXT_COLOR: Color = Color::from_rgb_u8(235, 235, 235);
const BANNER_COLOR: Color = Color::from_rgb_u8(255, 90, 60);
const OVERLAY_COLOR: Color = Color::new(0.0, 0.0, 0.0, 0.82);
const RELOCATION_COLOR: Color = Color::from_rgb_u8(120, 180, 255);
const SPARK_COLOR: Color = Color::from_rgb_u8(255, 220, 80);

/// Keys observed on a single frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct KeyboardShortcuts {
    quit_requested: bool,
    movement: Option<Direction>,
    confirm: bool,
    wait: bool,
    teleport: bool,
    safe_teleport: bool,
    disable: bool,
    rush: bool,
    new_game: bool,
    toggle_grid: bool,
}

impl KeyboardShortcuts {
    fn poll() -> Self {
        Self {
            quit_requested: is_key_pressed(KeyCode::Escape),
            movement: poll_movement(),
            confirm: is_key_pressed(KeyCode::Space),
            wait: is_key_pressed(KeyCode::Period),
            teleport: is_key_pressed(KeyCode::T),
            safe_teleport: is_key_pressed(KeyCode::R),
            disable: is_key_pressed(KeyCode::S),
            rush: is_key_pressed(KeyCode::L),
            new_game: is_key_pressed(KeyCode::N),
            toggle_grid: is_key_pressed(KeyCode::G),
        }
    }
}

fn poll_movement() -> Option<Direction> {
    const BINDINGS: [(KeyCode, Direction); 8] = [
        (KeyCode::Up, Direction::North),
        (KeyCode::Down, Direction::South),
        (KeyCode::Left, Direction::West),
        (KeyCode::Right, Direction::East),
        (KeyCode::Q, Direction::NorthWest),
        (KeyCode::E, Direction::NorthEast),
        (KeyCode::Z, Direction::SouthWest),
        (KeyCode::C, Direction::SouthEast),
    ];

    BINDINGS
        .iter()
        .find(|(key, _)| is_key_pressed(*key))
        .map(|(_, direction)| *direction)
}

/// Rendering backend implemented on top of macroquad.
#[derive(Debug, Default)]
pub struct MacroquadBackend {
    swap_interval: Option<i32>,
    window_width: Option<i32>,
}

impl MacroquadBackend {
    /// Returns a backend that requests the platform's default swap interval.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the backend to request a specific swap interval from the platform.
    #[must_use]
    pub fn with_swap_interval(mut self, swap_interval: Option<i32>) -> Self {
        self.swap_interval = swap_interval;
        self
    }

    /// Configures the backend to either synchronise presentation with the display refresh rate
    /// or render as fast as possible.
    #[must_use]
    pub fn with_vsync(self, enabled: bool) -> Self {
        let swap_interval = if enabled { Some(1) } else { Some(0) };
        self.with_swap_interval(swap_interval)
    }

    /// Overrides the initial window width; the height follows the scene's aspect ratio.
    #[must_use]
    pub fn with_window_width(mut self, width: i32) -> Self {
        self.window_width = Some(width);
        self
    }
}

impl RenderingBackend for MacroquadBackend {
    fn run<F>(self, presentation: Presentation, mut update_scene: F) -> Result<()>
    where
        F: FnMut(Duration, FrameInput, &mut Scene) + 'static,
    {
        let Self {
            swap_interval,
            window_width,
        } = self;

        let Presentation {
            window_title,
            clear_color,
            scene,
        } = presentation;

        let width = window_width.unwrap_or(1000).max(200);
        let aspect = scene.total_height() / scene.grid.width();
        let height = (width as f32 * aspect).round() as i32;

        let mut config = macroquad::window::Conf {
            window_title,
            window_width: width,
            window_height: height,
            ..macroquad::window::Conf::default()
        };
        if let Some(swap_interval) = swap_interval {
            config.platform.swap_interval = Some(swap_interval);
        }

        macroquad::Window::from_config(config, async move {
            let mut scene = scene;
            let background = to_macroquad_color(clear_color);

            loop {
                let keyboard = KeyboardShortcuts::poll();
                if keyboard.quit_requested {
                    break;
                }

                macroquad::window::clear_background(background);

                let screen_width = macroquad::window::screen_width();
                let screen_height = macroquad::window::screen_height();

                let dt_seconds = macroquad::time::get_frame_time();
                let frame_dt = Duration::from_secs_f32(dt_seconds.max(0.0));
                let metrics_before = SceneMetrics::from_scene(&scene, screen_width, screen_height);
                let (cursor_x, cursor_y) = mouse_position();
                let frame_input = gather_frame_input_from_observations(
                    &scene,
                    &metrics_before,
                    Vec2::new(cursor_x, cursor_y),
                    is_mouse_button_pressed(MouseButton::Left),
                    keyboard,
                );

                update_scene(frame_dt, frame_input, &mut scene);

                let metrics = SceneMetrics::from_scene(&scene, screen_width, screen_height);
                if scene.grid.show_lines {
                    draw_grid_lines(&scene, &metrics);
                }
                draw_obstacles(&scene, &metrics);
                draw_pursuers(&scene, &metrics);
                draw_player(&scene, &metrics);
                draw_effects(&scene.effects, &metrics);
                draw_hud(&scene.hud, &metrics);
                if let Some(overlay) = &scene.overlay {
                    draw_overlay(overlay, screen_width, screen_height);
                }

                macroquad::window::next_frame().await;
            }
        });

        Ok(())
    }
}

#[derive(Clone, Copy, Debug)]
struct SceneMetrics {
    scale: f32,
    offset_x: f32,
    offset_y: f32,
    grid_width_scaled: f32,
    grid_height_scaled: f32,
    cell_step: f32,
}

impl SceneMetrics {
    fn from_scene(scene: &Scene, screen_width: f32, screen_height: f32) -> Self {
        let grid = scene.grid;
        let world_width = grid.width();
        let world_height = scene.total_height();
        let scale = if world_width <= f32::EPSILON || world_height <= f32::EPSILON {
            1.0
        } else {
            (screen_width / world_width).min(screen_height / world_height)
        };

        let offset_x = ((screen_width - world_width * scale) * 0.5).max(0.0);
        let offset_y = ((screen_height - world_height * scale) * 0.5).max(0.0);

        Self {
            scale,
            offset_x,
            offset_y,
            grid_width_scaled: grid.width() * scale,
            grid_height_scaled: grid.height() * scale,
            cell_step: grid.cell_length * scale,
        }
    }

    fn to_screen(&self, world: Vec2) -> Vec2 {
        Vec2::new(
            self.offset_x + world.x * self.scale,
            self.offset_y + world.y * self.scale,
        )
    }

    fn cell_origin(&self, cell: GridPosition) -> Vec2 {
        Vec2::new(
            self.offset_x + cell.x() as f32 * self.cell_step,
            self.offset_y + cell.y() as f32 * self.cell_step,
        )
    }

    fn hud_top(&self) -> f32 {
        self.offset_y + self.grid_height_scaled
    }
}

fn gather_frame_input_from_observations(
    scene: &Scene,
    metrics: &SceneMetrics,
    cursor_position: Vec2,
    click: bool,
    keyboard: KeyboardShortcuts,
) -> FrameInput {
    let mut input = FrameInput {
        movement: keyboard.movement,
        confirm: keyboard.confirm,
        wait: keyboard.wait,
        click,
        teleport: keyboard.teleport,
        safe_teleport: keyboard.safe_teleport,
        disable: keyboard.disable,
        rush: keyboard.rush,
        new_game: keyboard.new_game,
        toggle_grid: keyboard.toggle_grid,
        ..FrameInput::default()
    };

    if metrics.scale <= f32::EPSILON {
        return input;
    }

    let world_position = Vec2::new(
        (cursor_position.x - metrics.offset_x) / metrics.scale,
        (cursor_position.y - metrics.offset_y) / metrics.scale,
    );
    input.cursor_cell = scene.grid.world_to_cell(world_position);

    input
}

fn draw_grid_lines(scene: &Scene, metrics: &SceneMetrics) {
    let color = to_macroquad_color(scene.grid.line_color);
    let left = metrics.offset_x;
    let top = metrics.offset_y;

    for column in 0..=scene.grid.columns {
        let x = left + column as f32 * metrics.cell_step;
        macroquad::shapes::draw_line(x, top, x, top + metrics.grid_height_scaled, 1.0, color);
    }
    for row in 0..=scene.grid.rows {
        let y = top + row as f32 * metrics.cell_step;
        macroquad::shapes::draw_line(left, y, left + metrics.grid_width_scaled, y, 1.0, color);
    }
}

fn draw_obstacles(scene: &Scene, metrics: &SceneMetrics) {
    let color = to_macroquad_color(scene.obstacle_color);
    for cell in &scene.obstacles {
        let origin = metrics.cell_origin(*cell);
        macroquad::shapes::draw_rectangle(
            origin.x,
            origin.y,
            metrics.cell_step,
            metrics.cell_step,
            color,
        );
    }
}

fn draw_pursuers(scene: &Scene, metrics: &SceneMetrics) {
    let radius = metrics.cell_step * 0.4;
    for pursuer in &scene.pursuers {
        let centre = metrics.to_screen(scene.grid.cell_center(pursuer.position));
        macroquad::shapes::draw_circle(
            centre.x,
            centre.y,
            radius,
            to_macroquad_color(pursuer.color),
        );
    }
}

fn draw_player(scene: &Scene, metrics: &SceneMetrics) {
    let Some(player) = scene.player else {
        return;
    };
    if player.opacity <= f32::EPSILON {
        return;
    }

    let inset = metrics.cell_step * 0.1;
    let origin = metrics.cell_origin(player.cell);
    macroquad::shapes::draw_rectangle(
        origin.x + inset,
        origin.y + inset,
        metrics.cell_step - 2.0 * inset,
        metrics.cell_step - 2.0 * inset,
        to_macroquad_color(player.color.faded(player.opacity)),
    );
}

fn effect_radius(effect: &EffectPresentation, cell_step: f32) -> f32 {
    let progress = effect.progress.clamp(0.0, 1.0);
    match effect.style {
        EffectStyle::Vanish => cell_step * 0.6 * (1.0 - progress),
        EffectStyle::Appear => cell_step * 0.6 * progress,
        EffectStyle::Spark => cell_step * (0.3 + 0.5 * progress),
    }
}

fn effect_color(effect: &EffectPresentation) -> Color {
    let progress = effect.progress.clamp(0.0, 1.0);
    match effect.style {
        EffectStyle::Vanish => RELOCATION_COLOR.faded(1.0 - progress),
        EffectStyle::Appear => RELOCATION_COLOR.faded(progress),
        EffectStyle::Spark => SPARK_COLOR.faded(1.0 - progress),
    }
}

fn draw_effects(effects: &[EffectPresentation], metrics: &SceneMetrics) {
    for effect in effects {
        let origin = metrics.cell_origin(effect.cell);
        let half = metrics.cell_step * 0.5;
        macroquad::shapes::draw_circle_lines(
            origin.x + half,
            origin.y + half,
            effect_radius(effect, metrics.cell_step),
            2.0,
            to_macroquad_color(effect_color(effect)),
        );
    }
}

fn draw_hud(hud: &HudPresentation, metrics: &SceneMetrics) {
    let text = to_macroquad_color(TEXT_COLOR);
    let left = metrics.offset_x + 8.0;
    let line_height = HUD_FONT_SIZE * 1.1;
    let mut baseline = metrics.hud_top() + line_height;

    let _ = macroquad::text::draw_text(&hud.status, left, baseline, HUD_FONT_SIZE, text);
    baseline += line_height;
    let _ = macroquad::text::draw_text(&hud.grid, left, baseline, HUD_FONT_SIZE, text);

    if let Some(notice) = &hud.notice {
        let _ = macroquad::text::draw_text(
            notice,
            left + metrics.grid_width_scaled * 0.5,
            baseline,
            HUD_FONT_SIZE,
            text,
        );
    }

    if let Some(banner) = &hud.banner {
        let _ = macroquad::text::draw_text(
            banner,
            left,
            metrics.offset_y + line_height,
            OVERLAY_FONT_SIZE,
            to_macroquad_color(BANNER_COLOR),
        );
    }
}

fn draw_centered(line: &str, y: f32, font_size: f32, screen_width: f32, color: Color) {
    let dimensions = macroquad::text::measure_text(line, None, font_size as u16, 1.0);
    let x = ((screen_width - dimensions.width) * 0.5).max(0.0);
    let _ = macroquad::text::draw_text(line, x, y, font_size, to_macroquad_color(color));
}

fn draw_overlay(overlay: &Overlay, screen_width: f32, screen_height: f32) {
    macroquad::shapes::draw_rectangle(
        0.0,
        0.0,
        screen_width,
        screen_height,
        to_macroquad_color(OVERLAY_COLOR),
    );

    let line_height = OVERLAY_FONT_SIZE * 1.2;
    match overlay {
        Overlay::Menu { title, lines } => {
            let block = TITLE_FONT_SIZE + line_height * lines.len() as f32;
            let mut y = ((screen_height - block) * 0.5).max(TITLE_FONT_SIZE);
            draw_centered(title, y, TITLE_FONT_SIZE, screen_width, TEXT_COLOR);
            y += TITLE_FONT_SIZE;
            for line in lines {
                draw_centered(line, y, OVERLAY_FONT_SIZE, screen_width, TEXT_COLOR);
                y += line_height;
            }
        }
        Overlay::Ended {
            message,
            score,
            prompt,
        } => {
            let mut y = screen_height * 0.5 - line_height;
            draw_centered(message, y, OVERLAY_FONT_SIZE, screen_width, BANNER_COLOR);
            y += line_height;
            draw_centered(score, y, OVERLAY_FONT_SIZE, screen_width, TEXT_COLOR);
            y += line_height * 2.0;
            draw_centered(prompt, y, OVERLAY_FONT_SIZE, screen_width, TEXT_COLOR);
        }
    }
}

fn to_macroquad_color(color: Color) -> macroquad::color::Color {
    macroquad::color::Color::new(color.red, color.green, color.blue, color.alpha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridchase_rendering::GridPresentation;

    fn base_scene() -> Scene {
        let grid = GridPresentation::new(10, 5, 20.0, Color::from_rgb_u8(40, 40, 40))
            .expect("valid grid");
        Scene::new(grid, Color::from_rgb_u8(90, 90, 90))
    }

    #[test]
    fn scene_metrics_fit_grid_and_hud() {
        let scene = base_scene();
        let metrics = SceneMetrics::from_scene(&scene, 400.0, 400.0);

        assert!((metrics.scale - 2.0).abs() <= f32::EPSILON);
        assert!((metrics.cell_step - 40.0).abs() <= f32::EPSILON);
        assert_eq!(metrics.offset_x, 0.0);
        let used_height = scene.total_height() * metrics.scale;
        assert!((metrics.offset_y - (400.0 - used_height) * 0.5).abs() <= 1e-4);
        assert!((metrics.hud_top() - (metrics.offset_y + 200.0)).abs() <= 1e-4);
    }

    #[test]
    fn cursor_cell_only_reported_inside_grid() {
        let scene = base_scene();
        let metrics = SceneMetrics::from_scene(&scene, 400.0, 400.0);

        let inside = gather_frame_input_from_observations(
            &scene,
            &metrics,
            Vec2::new(
                metrics.offset_x + metrics.cell_step * 3.5,
                metrics.offset_y + metrics.cell_step * 1.5,
            ),
            true,
            KeyboardShortcuts::default(),
        );
        assert_eq!(inside.cursor_cell, Some(GridPosition::new(3, 1)));
        assert!(inside.click);

        let below = gather_frame_input_from_observations(
            &scene,
            &metrics,
            Vec2::new(metrics.offset_x + 10.0, metrics.hud_top() + 10.0),
            true,
            KeyboardShortcuts::default(),
        );
        assert_eq!(below.cursor_cell, None);
        assert!(
            below.click,
            "clicks off the board still count for menu screens"
        );
    }

    #[test]
    fn keyboard_flags_are_forwarded() {
        let scene = base_scene();
        let metrics = SceneMetrics::from_scene(&scene, 400.0, 400.0);
        let keyboard = KeyboardShortcuts {
            movement: Some(Direction::NorthEast),
            safe_teleport: true,
            toggle_grid: true,
            ..KeyboardShortcuts::default()
        };

        let input = gather_frame_input_from_observations(
            &scene,
            &metrics,
            Vec2::ZERO,
            false,
            keyboard,
        );

        assert_eq!(input.movement, Some(Direction::NorthEast));
        assert!(input.safe_teleport);
        assert!(input.toggle_grid);
        assert!(!input.teleport);
        assert!(!input.confirm);
    }

    #[test]
    fn relocation_rings_shrink_and_grow() {
        let vanish = EffectPresentation {
            style: EffectStyle::Vanish,
            cell: GridPosition::new(0, 0),
            progress: 0.25,
        };
        let appear = EffectPresentation {
            style: EffectStyle::Appear,
            ..vanish
        };

        assert!((effect_radius(&vanish, 40.0) - 18.0).abs() <= 1e-4);
        assert!((effect_radius(&appear, 40.0) - 6.0).abs() <= 1e-4);
        assert!((effect_color(&vanish).alpha - 0.75).abs() <= 1e-4);
        assert!((effect_color(&appear).alpha - 0.25).abs() <= 1e-4);
    }
}
