#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Gridchase experience.

mod autopilot;
mod config;
mod level_transfer;
mod simulation;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use gridchase_core::{GridSize, SessionState};
use gridchase_rendering::{Color, GridPresentation, Presentation, RenderingBackend, Scene};
use gridchase_rendering_macroquad::MacroquadBackend;
use gridchase_system_bootstrap::Bootstrap;
use gridchase_world::{query, World, WorldConfig};
use tracing_subscriber::EnvFilter;

use crate::{
    config::FileConfig,
    level_transfer::LevelTransfer,
    simulation::{controls_from_frame, LoggingNotifier, Simulation},
};

const DEFAULT_LOG_FILTER: &str = "gridchase=info";

/// Command-line arguments accepted by the Gridchase binary.
#[derive(Debug, Parser)]
#[command(name = "gridchase", version, about = "Lure the pursuers into each other.")]
struct CliArgs {
    /// TOML file whose keys override the built-in configuration.
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Seed for every random draw of the session.
    #[arg(long)]
    seed: Option<u64>,
    /// Number of grid columns.
    #[arg(long)]
    columns: Option<u32>,
    /// Number of grid rows.
    #[arg(long)]
    rows: Option<u32>,
    /// Last level; clearing it wins the game.
    #[arg(long)]
    max_level: Option<u32>,
    /// Runs a scripted session without opening a window.
    #[arg(long)]
    headless: bool,
    /// Frame budget of a headless session.
    #[arg(long, default_value_t = 36_000, requires = "headless")]
    frames: u32,
    /// Level transfer string to resume instead of starting on the menu.
    #[arg(long, value_name = "STRING")]
    level: Option<String>,
    /// Prints the level transfer string when a headless session ends or, in a
    /// window, whenever a new game abandons the level in progress.
    #[arg(long)]
    export_level: bool,
    /// Synchronises presentation with the display refresh rate.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    vsync: bool,
    /// Initial window width in pixels.
    #[arg(long)]
    window_width: Option<i32>,
}

impl CliArgs {
    fn world_config(&self) -> Result<WorldConfig> {
        let mut config = WorldConfig::default();
        if let Some(path) = &self.config {
            config = FileConfig::load(path)?.apply(config);
        }
        if let Some(seed) = self.seed {
            config = config.with_seed(seed);
        }
        if self.columns.is_some() || self.rows.is_some() {
            let grid = config.grid();
            config = config.with_grid(GridSize::new(
                self.columns.unwrap_or(grid.columns()),
                self.rows.unwrap_or(grid.rows()),
            ));
        }
        if let Some(max_level) = self.max_level {
            config = config.with_max_level(max_level);
        }
        Ok(config)
    }
}

fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

fn build_world(args: &CliArgs) -> Result<World> {
    let config = args.world_config()?;

    let Some(encoded) = &args.level else {
        return World::new(config).context("invalid configuration");
    };
    let transfer = LevelTransfer::decode(encoded).context("failed to decode level string")?;
    let config = config.with_grid(transfer.grid());
    World::restore(config, transfer.state).context("level string does not fit the configuration")
}

fn export_level(world: &World) -> Result<()> {
    if query::session(world) != SessionState::Playing {
        tracing::info!("no level in progress to export");
        return Ok(());
    }
    let transfer = LevelTransfer::new(query::grid_size(world), query::level_state(world));
    println!("{}", transfer.encode().context("failed to encode level")?);
    Ok(())
}

fn run_headless(args: &CliArgs, world: World) -> Result<()> {
    let mut simulation = Simulation::new(world, LoggingNotifier);
    let report = autopilot::run(&mut simulation, args.frames);

    let hud = Bootstrap.hud(simulation.world());
    println!("{}", hud.status_line());
    if let Some(message) = &hud.end_message {
        println!("{message}");
    }
    println!(
        "Frames: {}  Level: {}  {}",
        report.frames,
        report.level,
        hud.final_score_line()
    );

    if args.export_level {
        export_level(simulation.world())?;
    }
    Ok(())
}

fn run_windowed(args: &CliArgs, world: World) -> Result<()> {
    let grid_size = query::grid_size(&world);
    let grid = GridPresentation::new(
        grid_size.columns(),
        grid_size.rows(),
        GridPresentation::DEFAULT_CELL_LENGTH,
        Color::from_rgb_u8(50, 50, 60),
    )
    .context("failed to describe the grid")?;
    let mut scene = Scene::new(grid, Color::from_rgb_u8(110, 110, 120));

    let mut simulation = Simulation::new(world, LoggingNotifier);
    simulation.populate_scene(&mut scene);
    let presentation = Presentation::new("Gridchase", Color::from_rgb_u8(18, 18, 24), scene);

    let export = args.export_level;
    let mut backend = MacroquadBackend::new().with_vsync(args.vsync);
    if let Some(width) = args.window_width {
        backend = backend.with_window_width(width);
    }

    backend.run(presentation, move |dt, frame, scene| {
        if export && frame.new_game {
            if let Err(error) = export_level(simulation.world()) {
                tracing::warn!(%error, "level export failed");
            }
        }
        simulation.advance(dt, controls_from_frame(frame));
        simulation.populate_scene(scene);
    })
}

/// Entry point for the Gridchase command-line interface.
fn main() -> Result<()> {
    init_tracing();
    let args = CliArgs::parse();

    let world = build_world(&args)?;
    tracing::info!("{}", Bootstrap.welcome_banner(&world));

    if args.headless {
        run_headless(&args, world)
    } else {
        run_windowed(&args, world)
    }
}
