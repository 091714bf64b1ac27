//! Optional TOML configuration file layered beneath command-line flags.

use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use gridchase_core::{Charges, GridSize};
use gridchase_world::{RushTuning, WorldConfig};
use serde::Deserialize;

/// File-level settings; every key is optional and falls back to the built-in defaults.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct FileConfig {
    pub(crate) seed: Option<u64>,
    pub(crate) columns: Option<u32>,
    pub(crate) rows: Option<u32>,
    pub(crate) base_pursuers: Option<u32>,
    pub(crate) max_level: Option<u32>,
    pub(crate) spawn_attempts_per_pursuer: Option<u32>,
    pub(crate) step_duration_ms: Option<u64>,
    pub(crate) move_cooldown_ms: Option<u64>,
    pub(crate) charges: Option<ChargesSection>,
    pub(crate) rush: Option<RushSection>,
}

/// `[charges]` table.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct ChargesSection {
    pub(crate) teleports: u32,
    pub(crate) safe_teleports: u32,
    pub(crate) disable: u32,
    pub(crate) rush: u32,
}

impl Default for ChargesSection {
    fn default() -> Self {
        let charges = WorldConfig::default().starting_charges();
        Self {
            teleports: charges.teleports,
            safe_teleports: charges.safe_teleports,
            disable: charges.disable,
            rush: charges.rush,
        }
    }
}

/// `[rush]` table.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct RushSection {
    pub(crate) initial_speed: f32,
    pub(crate) acceleration: f32,
    pub(crate) max_speed: f32,
    pub(crate) collision_threshold: f32,
    pub(crate) arrival_epsilon: f32,
}

impl Default for RushSection {
    fn default() -> Self {
        let tuning = RushTuning::default();
        Self {
            initial_speed: tuning.initial_speed,
            acceleration: tuning.acceleration,
            max_speed: tuning.max_speed,
            collision_threshold: tuning.collision_threshold,
            arrival_epsilon: tuning.arrival_epsilon,
        }
    }
}

impl FileConfig {
    /// Reads and parses the file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("failed to parse config file {}", path.display()))
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        toml::from_str(contents).context("invalid gridchase configuration")
    }

    /// Layers the file's settings over `config`.
    pub(crate) fn apply(&self, mut config: WorldConfig) -> WorldConfig {
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
        if let Some(base) = self.base_pursuers {
            config = config.with_base_pursuers(base);
        }
        if let Some(max_level) = self.max_level {
            config = config.with_max_level(max_level);
        }
        if let Some(attempts) = self.spawn_attempts_per_pursuer {
            config = config.with_spawn_attempts_per_pursuer(attempts);
        }
        if let Some(millis) = self.step_duration_ms {
            config = config.with_step_duration(Duration::from_millis(millis));
        }
        if let Some(millis) = self.move_cooldown_ms {
            config = config.with_move_cooldown(Duration::from_millis(millis));
        }
        if let Some(charges) = self.charges {
            config = config.with_starting_charges(Charges::new(
                charges.teleports,
                charges.safe_teleports,
                charges.disable,
                charges.rush,
            ));
        }
        if let Some(rush) = self.rush {
            config = config.with_rush(RushTuning {
                initial_speed: rush.initial_speed,
                acceleration: rush.acceleration,
                max_speed: rush.max_speed,
                collision_threshold: rush.collision_threshold,
                arrival_epsilon: rush.arrival_epsilon,
            });
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_keeps_defaults() {
        let file = FileConfig::parse("").expect("empty config parses");
        assert_eq!(file, FileConfig::default());

        let config = file.apply(WorldConfig::default());
        assert_eq!(config, WorldConfig::default());
    }

    #[test]
    fn keys_override_defaults() {
        let file = FileConfig::parse(
            r#"
            seed = 99
            columns = 20
            max_level = 3
            step_duration_ms = 400

            [charges]
            teleports = 4

            [rush]
            max_speed = 8.0
            "#,
        )
        .expect("config parses");

        let config = file.apply(WorldConfig::default());

        assert_eq!(config.seed(), 99);
        assert_eq!(config.grid(), GridSize::new(20, 35));
        assert_eq!(config.max_level(), 3);
        assert_eq!(config.step_duration(), Duration::from_millis(400));
        assert_eq!(config.starting_charges(), Charges::new(4, 3, 2, 1));
        assert_eq!(config.rush().max_speed, 8.0);
        assert_eq!(config.rush().initial_speed, 2.0);
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let error = FileConfig::parse("pursuers = 3").expect_err("unknown key");
        assert!(format!("{error:#}").contains("unknown field"));
    }
}
