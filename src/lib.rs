//! Rat Rider - a side-scrolling endless-runner platformer core
//!
//! Core modules:
//! - `sim`: Frame-stepped simulation (rigid bodies, contacts, spawning, game state)
//! - `settings`: Data-driven tuning presets and feature flags
//! - `highscores`: Persisted best score
//! - `audio`: Sound cue dispatch
//! - `units`: Meters <-> pixels conversion

pub mod audio;
pub mod error;
pub mod highscores;
pub mod settings;
pub mod sim;
pub mod units;

pub use error::{Error, Result};
pub use highscores::HighScoreFile;
pub use settings::{Features, GameConfig, TuningPreset};
pub use units::Units;

/// Engine constants that are not part of the tunable config
pub mod consts {
    /// Frame timestep used by the headless runner (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;
    /// Largest frame delta the simulation will accept
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Solver iterations per step
    pub const VELOCITY_ITERATIONS: u32 = 8;
    pub const POSITION_ITERATIONS: u32 = 3;

    /// Maximum simultaneous players
    pub const MAX_PLAYERS: usize = 2;

    /// First platform id; every platform id is >= this
    pub const PLATFORM_ID_BASE: u32 = 1000;
}

/// Linear interpolation from `a` to `b`
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + t * (b - a)
}
