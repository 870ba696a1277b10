//! Errors for the storage and configuration boundary
//!
//! The simulation itself never fails; these only surface from file access
//! and config parsing.

use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("failed to read {}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to write {}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid high score {value:?}")]
    InvalidHighScore {
        value: String,
        #[source]
        source: ParseIntError,
    },

    #[error("malformed config")]
    ConfigFormat(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    InvalidConfig(String),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
