//! Screensaver configuration.
//!
//! Values come from defaults, then an optional TOML file, then environment
//! variables, then command line flags. Everything is validated once before the
//! simulation is built.

use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, ScreensaverError};

pub const FPS_ENV: &str = "MAZESAVER_FPS";
pub const SEED_ENV: &str = "MAZESAVER_SEED";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seed for the run. A random one is picked when absent.
    pub seed: Option<u64>,
    pub simulation: SimulationConfig,
    pub display: DisplayConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    /// Requested maze height in cells. Even values are bumped to the next odd one.
    pub rows: usize,
    /// Requested maze width in cells. Even values are bumped to the next odd one.
    pub cols: usize,
    pub prey_count: usize,
    /// Hunter speed in cells per second.
    pub hunter_speed: f32,
    /// Prey speed in cells per second. Zero keeps prey on their spawn cell.
    pub prey_speed: f32,
    /// Capture distance as a fraction of the tile size.
    pub capture_radius: f32,
    /// Earliest respawn, in seconds after capture.
    pub respawn_min: f32,
    /// Latest respawn (exclusive), in seconds after capture.
    pub respawn_max: f32,
    /// Draws spent looking for an unoccupied respawn cell before settling.
    pub spawn_attempts: usize,
    /// Upper bound on a single frame's delta, in seconds.
    pub max_delta: f32,
    /// Loop injection attempts per grid cell.
    pub loop_density: f32,
    pub trail_length: usize,
    /// Tile size used until the first resize.
    pub tile_size: f32,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            rows: 19,
            cols: 19,
            prey_count: 18,
            hunter_speed: 2.8,
            prey_speed: 0.0,
            capture_radius: 0.45,
            respawn_min: 4.0,
            respawn_max: 10.0,
            spawn_attempts: 60,
            max_delta: 0.05,
            loop_density: crate::maze::DEFAULT_LOOP_DENSITY,
            trail_length: 10,
            tile_size: 24.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub fps: u64,
    pub particle_count: usize,
    /// Rebuild the whole screensaver this often. `None` disables it.
    pub auto_refresh_secs: Option<u64>,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            fps: 60,
            particle_count: 80,
            auto_refresh_secs: Some(30 * 60),
        }
    }
}

impl Config {
    /// Reads `path` when given, then applies environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_toml(&std::fs::read_to_string(path)?)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_toml(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(fps) = lookup(FPS_ENV)
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|v| *v > 0)
        {
            self.display.fps = fps;
        }
        if let Some(seed) = lookup(SEED_ENV).and_then(|v| v.parse::<u64>().ok()) {
            self.seed = Some(seed);
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.simulation.validate()?;
        if self.display.fps == 0 {
            return Err(invalid("display.fps must be positive"));
        }
        Ok(())
    }
}

impl SimulationConfig {
    pub fn validate(&self) -> Result<()> {
        if self.rows < 2 || self.cols < 2 {
            return Err(ScreensaverError::InvalidDimensions {
                rows: self.rows,
                cols: self.cols,
            });
        }
        if !positive(self.hunter_speed) {
            return Err(invalid("hunter_speed must be positive"));
        }
        if !(self.prey_speed.is_finite() && self.prey_speed >= 0.0) {
            return Err(invalid("prey_speed must be zero or positive"));
        }
        if !positive(self.capture_radius) {
            return Err(invalid("capture_radius must be positive"));
        }
        if !(self.respawn_min.is_finite() && self.respawn_min >= 0.0) {
            return Err(invalid("respawn_min must be zero or positive"));
        }
        if !(self.respawn_max.is_finite() && self.respawn_max > self.respawn_min) {
            return Err(ScreensaverError::InvalidConfig(format!(
                "respawn_max ({}) must be greater than respawn_min ({})",
                self.respawn_max, self.respawn_min
            )));
        }
        if self.spawn_attempts == 0 {
            return Err(invalid("spawn_attempts must be at least 1"));
        }
        if !positive(self.max_delta) {
            return Err(invalid("max_delta must be positive"));
        }
        if !(self.loop_density.is_finite() && self.loop_density >= 0.0) {
            return Err(invalid("loop_density must be zero or positive"));
        }
        if !positive(self.tile_size) {
            return Err(invalid("tile_size must be positive"));
        }
        Ok(())
    }
}

fn positive(value: f32) -> bool {
    value.is_finite() && value > 0.0
}

fn invalid(msg: &str) -> ScreensaverError {
    ScreensaverError::InvalidConfig(msg.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.simulation.rows, 19);
        assert_eq!(config.simulation.prey_count, 18);
        assert_eq!(config.display.auto_refresh_secs, Some(1800));
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config = Config::from_toml(
            r#"
            seed = 42

            [simulation]
            rows = 25
            hunter_speed = 3.5

            [display]
            fps = 30
            "#,
        )
        .unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.simulation.rows, 25);
        assert_eq!(config.simulation.cols, 19);
        assert_eq!(config.simulation.hunter_speed, 3.5);
        assert_eq!(config.display.fps, 30);
        assert_eq!(config.display.particle_count, 80);
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = Config::from_toml("[simulation]\nrows = \"many\"").unwrap_err();
        assert!(matches!(err, ScreensaverError::ConfigParse(_)));
    }

    #[test]
    fn env_overrides_fps_and_seed() {
        let mut config = Config::default();
        config.apply_env(|key| match key {
            FPS_ENV => Some("24".into()),
            SEED_ENV => Some("7".into()),
            _ => None,
        });
        assert_eq!(config.display.fps, 24);
        assert_eq!(config.seed, Some(7));
    }

    #[test]
    fn env_ignores_garbage() {
        let mut config = Config::default();
        config.apply_env(|key| match key {
            FPS_ENV => Some("0".into()),
            SEED_ENV => Some("soon".into()),
            _ => None,
        });
        assert_eq!(config.display.fps, 60);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn rejects_inconsistent_values() {
        let mut config = Config::default();
        config.simulation.rows = 0;
        assert!(matches!(
            config.validate(),
            Err(ScreensaverError::InvalidDimensions { rows: 0, .. })
        ));

        let mut config = Config::default();
        config.simulation.respawn_max = 3.0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.simulation.hunter_speed = f32::NAN;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.simulation.spawn_attempts = 0;
        assert!(config.validate().is_err());

        let mut config = Config::default();
        config.display.fps = 0;
        assert!(config.validate().is_err());
    }
}
