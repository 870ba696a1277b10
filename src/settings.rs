//! Gameplay tuning and feature flags
//!
//! Every tunable of the game lives in `GameConfig`. Distances are in pixels
//! and converted to meters through `GameConfig::units` when they reach the
//! physics world. Configs round-trip through JSON so a run can be replayed
//! with exactly the same numbers.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::sim::CollectibleKind;
use crate::units::Units;

/// Named tuning presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum TuningPreset {
    /// Two jumps, snap to platforms, fewer pickups
    Classic,
    /// Ten jumps, fast-fall, full pickup table
    #[default]
    Casual,
}

impl TuningPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            TuningPreset::Classic => "Classic",
            TuningPreset::Casual => "Casual",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "classic" => Some(TuningPreset::Classic),
            "casual" => Some(TuningPreset::Casual),
            _ => None,
        }
    }
}

/// Optional mechanics
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Features {
    /// Spawn pickups on platforms
    pub collectibles: bool,
    /// Also spawn pickups (and apply their effects) with two players
    pub collectibles_in_multiplayer: bool,
    /// Snap input teleports an airborne player onto the platform below
    pub snap: bool,
    /// Held fast-fall input multiplies gravity while airborne
    pub fast_fall: bool,
    /// Zero horizontal player velocity every frame
    pub cancel_drift: bool,
    /// Leaving the screen on the left is a death
    pub left_boundary_death: bool,
}

impl Default for Features {
    fn default() -> Self {
        Self {
            collectibles: true,
            collectibles_in_multiplayer: false,
            snap: false,
            fast_fall: true,
            cancel_drift: false,
            left_boundary_death: true,
        }
    }
}

/// How a jump input turns into an impulse
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum JumpModel {
    /// Reset vertical velocity, then launch to reach `height` pixels
    Height { height: f32 },
    /// Add `speed` px/s of upward velocity on top of the current one
    Velocity { speed: f32 },
}

/// One row of the pickup table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollectibleWeight {
    pub kind: CollectibleKind,
    /// Probability mass; the last row takes whatever is left
    pub weight: f32,
}

impl CollectibleWeight {
    pub const fn new(kind: CollectibleKind, weight: f32) -> Self {
        Self { kind, weight }
    }
}

/// Complete gameplay configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    pub preset: TuningPreset,
    pub features: Features,

    // === World ===
    pub window_width: f32,
    pub window_height: f32,
    pub pixels_per_meter: f32,
    /// Downward gravity (m/s^2)
    pub gravity: f32,
    pub velocity_iterations: u32,
    pub position_iterations: u32,
    /// Frame deltas above this are clamped (seconds)
    pub max_frame_dt: f32,

    // === Platforms ===
    pub platform_height: f32,
    pub platform_min_length: f32,
    pub platform_max_length: f32,
    /// Vertical spawn band for platform centers
    pub platform_min_y: f32,
    pub platform_max_y: f32,
    /// Horizontal clearance required around a new platform
    pub platform_overlap_buffer: f32,
    pub platform_friction: f32,
    /// Length multiplier while Lengthen is active
    pub lengthen_factor: f32,
    /// Length multiplier while Shorten is active
    pub shorten_factor: f32,

    // === Difficulty ===
    /// Platform speed at the start of a session (px/s)
    pub initial_block_speed: f32,
    /// Speed gained per second of play (px/s^2)
    pub block_speed_increase: f32,
    pub max_block_speed: f32,
    /// Spawn interval bounds at the initial speed
    pub slow_min_spawn_time: f32,
    pub slow_max_spawn_time: f32,
    /// Spawn interval bounds at the maximum speed
    pub fast_min_spawn_time: f32,
    pub fast_max_spawn_time: f32,

    // === Players ===
    pub player_width: f32,
    pub player_height: f32,
    pub player_density: f32,
    pub player_friction: f32,
    pub player_spawn_x: f32,
    pub player_spawn_y: f32,
    /// Player 2 spawns this far left of player 1
    pub second_player_offset: f32,
    /// Foot sensor width relative to the player width
    pub foot_sensor_width_factor: f32,
    pub foot_sensor_height: f32,
    pub max_jumps: u32,
    pub jump: JumpModel,
    /// Gravity multiplier while fast-falling
    pub fast_fall_gravity_scale: f32,

    // === Collectibles ===
    pub collectible_radius: f32,
    /// Gap between a pickup and the top of its platform
    pub collectible_clearance: f32,
    pub collectible_spawn_chance: f32,
    pub collectible_table: Vec<CollectibleWeight>,
    pub small_score_value: u32,
    pub big_score_value: u32,
    pub penalty_value: u32,

    // === Effects ===
    /// Lengthen/Shorten duration (seconds)
    pub effect_duration: f32,
    pub rain_duration: f32,
    pub rain_interval: f32,
    /// Falling speed of rain drops (px/s)
    pub rain_speed: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::from_preset(TuningPreset::default())
    }
}

impl GameConfig {
    /// Build the full config for a preset
    pub fn from_preset(preset: TuningPreset) -> Self {
        let casual = Self {
            preset: TuningPreset::Casual,
            features: Features::default(),

            window_width: 1200.0,
            window_height: 700.0,
            pixels_per_meter: 50.0,
            gravity: 7.0,
            velocity_iterations: crate::consts::VELOCITY_ITERATIONS,
            position_iterations: crate::consts::POSITION_ITERATIONS,
            max_frame_dt: crate::consts::MAX_FRAME_DT,

            platform_height: 20.0,
            platform_min_length: 100.0,
            platform_max_length: 300.0,
            platform_min_y: 250.0,
            platform_max_y: 550.0,
            platform_overlap_buffer: 50.0,
            platform_friction: 0.7,
            lengthen_factor: 2.0,
            shorten_factor: 0.5,

            initial_block_speed: 200.0,
            block_speed_increase: 5.0,
            max_block_speed: 600.0,
            slow_min_spawn_time: 2.5,
            slow_max_spawn_time: 3.5,
            fast_min_spawn_time: 0.8,
            fast_max_spawn_time: 1.5,

            player_width: 40.0,
            player_height: 60.0,
            player_density: 1.0,
            player_friction: 0.5,
            player_spawn_x: 300.0,
            player_spawn_y: 500.0,
            second_player_offset: 100.0,
            foot_sensor_width_factor: 0.9,
            foot_sensor_height: 10.0,
            max_jumps: 10,
            jump: JumpModel::Velocity { speed: 700.0 },
            fast_fall_gravity_scale: 100.0,

            collectible_radius: 25.0,
            collectible_clearance: 5.0,
            collectible_spawn_chance: 0.45,
            collectible_table: vec![
                CollectibleWeight::new(CollectibleKind::ScoreSmall, 0.35),
                CollectibleWeight::new(CollectibleKind::ScoreBig, 0.20),
                CollectibleWeight::new(CollectibleKind::LengthenEffect, 0.125),
                CollectibleWeight::new(CollectibleKind::ShortenEffect, 0.125),
                CollectibleWeight::new(CollectibleKind::RainEvent, 0.05),
                CollectibleWeight::new(CollectibleKind::PenaltyScore, 0.15),
            ],
            small_score_value: 1,
            big_score_value: 3,
            penalty_value: 2,

            effect_duration: 10.0,
            rain_duration: 10.0,
            rain_interval: 0.25,
            rain_speed: 300.0,
        };

        match preset {
            TuningPreset::Casual => casual,
            TuningPreset::Classic => Self {
                preset: TuningPreset::Classic,
                features: Features {
                    collectibles: true,
                    collectibles_in_multiplayer: false,
                    snap: true,
                    fast_fall: false,
                    cancel_drift: true,
                    left_boundary_death: false,
                },
                pixels_per_meter: 30.0,
                gravity: 5.0,
                max_jumps: 2,
                jump: JumpModel::Height { height: 450.0 },
                collectible_radius: 15.0,
                collectible_spawn_chance: 0.3,
                collectible_table: vec![
                    CollectibleWeight::new(CollectibleKind::ScoreSmall, 0.4),
                    CollectibleWeight::new(CollectibleKind::ScoreBig, 0.3),
                    CollectibleWeight::new(CollectibleKind::LengthenEffect, 0.15),
                    CollectibleWeight::new(CollectibleKind::ShortenEffect, 0.15),
                ],
                big_score_value: 5,
                ..casual
            },
        }
    }

    pub fn units(&self) -> Units {
        Units::new(self.pixels_per_meter)
    }

    /// Reject configs the simulation cannot run with
    pub fn validate(&self) -> Result<()> {
        fn check(ok: bool, msg: &str) -> Result<()> {
            if ok {
                Ok(())
            } else {
                Err(Error::InvalidConfig(msg.to_string()))
            }
        }

        check(
            self.window_width > 0.0 && self.window_height > 0.0,
            "window size must be positive",
        )?;
        check(self.pixels_per_meter > 0.0, "pixels_per_meter must be positive")?;
        check(self.max_frame_dt > 0.0, "max_frame_dt must be positive")?;
        check(
            self.platform_min_length > 0.0 && self.platform_min_length <= self.platform_max_length,
            "platform length bounds are inverted",
        )?;
        check(
            self.platform_min_y <= self.platform_max_y,
            "platform spawn band is inverted",
        )?;
        check(self.platform_height > 0.0, "platform_height must be positive")?;
        check(
            self.initial_block_speed <= self.max_block_speed,
            "initial_block_speed exceeds max_block_speed",
        )?;
        check(
            self.block_speed_increase >= 0.0,
            "block_speed_increase must not be negative",
        )?;
        check(
            self.slow_min_spawn_time > 0.0
                && self.fast_min_spawn_time > 0.0
                && self.slow_min_spawn_time <= self.slow_max_spawn_time
                && self.fast_min_spawn_time <= self.fast_max_spawn_time,
            "spawn time bounds are inverted",
        )?;
        check(
            self.player_width > 0.0 && self.player_height > 0.0,
            "player size must be positive",
        )?;
        check(self.max_jumps > 0, "max_jumps must be at least 1")?;
        check(
            (0.0..=1.0).contains(&self.collectible_spawn_chance),
            "collectible_spawn_chance must be within [0, 1]",
        )?;
        check(
            !self.collectible_table.is_empty(),
            "collectible_table is empty",
        )?;
        check(
            self.collectible_table.iter().all(|w| w.weight >= 0.0),
            "collectible weights must not be negative",
        )?;
        check(
            self.rain_interval > 0.0,
            "rain_interval must be positive",
        )?;
        Ok(())
    }

    /// Parse and validate a JSON config; missing fields take Casual values
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load a config file
    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path).map_err(|source| Error::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded {} config from {}", config.preset.as_str(), path.display());
        Ok(config)
    }

    /// Load a config file, falling back to the defaults on any failure
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("{e}; using default config");
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = self.to_json()?;
        fs::write(path, json).map_err(|source| Error::Write {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("Config saved to {}", path.display());
        Ok(())
    }
}
