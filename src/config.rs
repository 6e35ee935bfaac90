use crate::app_dirs::AppDirs;
use crate::geometry::{DetectionZone, Field, Vec2};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Gameplay tuning. Every constant the engine uses comes from here.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub zone_x_start_ratio: f64,
    pub zone_x_end_ratio: f64,
    pub zone_y_start_ratio: f64,
    pub zone_y_end_ratio: f64,
    pub obstacle_size: f64,
    pub initial_speed: Vec2,
    pub speed_increment: Vec2,
    pub score_interval: u32,
    pub max_fails: u32,
    pub retreat_speed: Vec2,
    pub advance_speed: Vec2,
    /// Inclusive range of pixels subtracted from the spawn row
    pub spawn_jitter_min: u32,
    pub spawn_jitter_max: u32,
    /// How far the newest obstacle must travel from the spawn edge before another spawns
    pub min_spawn_distance: f64,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            zone_x_start_ratio: 0.3,
            zone_x_end_ratio: 0.7,
            zone_y_start_ratio: 0.2,
            zone_y_end_ratio: 0.8,
            obstacle_size: 100.0,
            initial_speed: Vec2::new(7.0, 4.0),
            speed_increment: Vec2::new(0.15, 0.075),
            score_interval: 5,
            max_fails: 3,
            retreat_speed: Vec2::new(5.0, 3.0),
            advance_speed: Vec2::new(5.0, 3.0),
            spawn_jitter_min: 50,
            spawn_jitter_max: 150,
            min_spawn_distance: 300.0,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("zone ratio {name} = {value} is outside [0, 1]")]
    RatioOutOfRange { name: &'static str, value: f64 },

    #[error("zone {axis} start ratio must be below its end ratio")]
    EmptyZone { axis: char },

    #[error("obstacle size must be positive, got {0}")]
    ObstacleSize(f64),

    #[error("{name} must be finite and non-negative, and moving speeds need a positive x")]
    Speed { name: &'static str },

    #[error("score interval must be at least 1")]
    ScoreInterval,

    #[error("max fails must be at least 1")]
    MaxFails,

    #[error("spawn jitter range {min}..={max} is inverted")]
    SpawnJitter { min: u32, max: u32 },

    #[error("field must have positive dimensions, got {width}x{height}")]
    Field { width: u32, height: u32 },
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let ratios = [
            ("zone_x_start_ratio", self.zone_x_start_ratio),
            ("zone_x_end_ratio", self.zone_x_end_ratio),
            ("zone_y_start_ratio", self.zone_y_start_ratio),
            ("zone_y_end_ratio", self.zone_y_end_ratio),
        ];
        for (name, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::RatioOutOfRange { name, value });
            }
        }
        if self.zone_x_start_ratio >= self.zone_x_end_ratio {
            return Err(ConfigError::EmptyZone { axis: 'x' });
        }
        if self.zone_y_start_ratio >= self.zone_y_end_ratio {
            return Err(ConfigError::EmptyZone { axis: 'y' });
        }
        if !(self.obstacle_size.is_finite() && self.obstacle_size > 0.0) {
            return Err(ConfigError::ObstacleSize(self.obstacle_size));
        }

        // (name, value, must move horizontally)
        let speeds = [
            ("initial_speed", self.initial_speed, true),
            ("speed_increment", self.speed_increment, false),
            ("retreat_speed", self.retreat_speed, true),
            ("advance_speed", self.advance_speed, true),
        ];
        for (name, v, moving) in speeds {
            if !(v.x.is_finite() && v.y.is_finite() && v.x >= 0.0 && v.y >= 0.0) {
                return Err(ConfigError::Speed { name });
            }
            // the walk into the zone and every retry exit need horizontal motion
            if moving && v.x == 0.0 {
                return Err(ConfigError::Speed { name });
            }
        }
        if !(self.min_spawn_distance.is_finite() && self.min_spawn_distance >= 0.0) {
            return Err(ConfigError::Speed {
                name: "min_spawn_distance",
            });
        }

        if self.score_interval == 0 {
            return Err(ConfigError::ScoreInterval);
        }
        if self.max_fails == 0 {
            return Err(ConfigError::MaxFails);
        }
        if self.spawn_jitter_min > self.spawn_jitter_max {
            return Err(ConfigError::SpawnJitter {
                min: self.spawn_jitter_min,
                max: self.spawn_jitter_max,
            });
        }
        Ok(())
    }

    pub fn zone(&self, field: Field) -> DetectionZone {
        DetectionZone::from_ratios(
            field,
            self.zone_x_start_ratio,
            self.zone_x_end_ratio,
            self.zone_y_start_ratio,
            self.zone_y_end_ratio,
        )
    }
}

pub trait ConfigStore {
    fn load(&self) -> GameConfig;
    fn save(&self, cfg: &GameConfig) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        let path =
            AppDirs::config_path().unwrap_or_else(|| PathBuf::from("handdash_config.json"));
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> GameConfig {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(_) => return GameConfig::default(),
        };
        match serde_json::from_slice::<GameConfig>(&bytes) {
            Ok(cfg) => cfg,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "config unreadable, using defaults");
                GameConfig::default()
            }
        }
    }

    fn save(&self, cfg: &GameConfig) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg).unwrap_or_default();
        fs::write(&self.path, data)
    }
}
