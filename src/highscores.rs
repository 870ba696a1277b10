//! Best-score persistence
//!
//! A plain text file holding one integer. A missing file means no best
//! score yet.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Parse the first whitespace-separated token; empty text is 0
pub fn parse_high_score(text: &str) -> Result<u32> {
    let Some(token) = text.split_whitespace().next() else {
        return Ok(0);
    };
    token.parse().map_err(|source| Error::InvalidHighScore {
        value: token.to_string(),
        source,
    })
}

/// The high score file on disk
#[derive(Debug, Clone)]
pub struct HighScoreFile {
    path: PathBuf,
}

impl Default for HighScoreFile {
    fn default() -> Self {
        Self::new(Self::DEFAULT_FILE)
    }
}

impl HighScoreFile {
    pub const DEFAULT_FILE: &'static str = "highscore.txt";

    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the stored score; a missing file reads as 0
    pub fn read(&self) -> Result<u32> {
        match fs::read_to_string(&self.path) {
            Ok(text) => parse_high_score(&text),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(0),
            Err(source) => Err(Error::Read {
                path: self.path.clone(),
                source,
            }),
        }
    }

    /// Read the stored score, treating any failure as 0
    pub fn load(&self) -> u32 {
        match self.read() {
            Ok(score) => {
                log::info!("Loaded high score {score}");
                score
            }
            Err(e) => {
                log::warn!("{e}; starting from 0");
                0
            }
        }
    }

    pub fn save(&self, score: u32) -> Result<()> {
        fs::write(&self.path, score.to_string()).map_err(|source| Error::Write {
            path: self.path.clone(),
            source,
        })?;
        log::info!("High score {score} saved to {}", self.path.display());
        Ok(())
    }

    /// Save `score` only if it beats the stored one. Returns whether it did.
    pub fn record(&self, score: u32) -> Result<bool> {
        let best = self.read().unwrap_or(0);
        if score <= best {
            return Ok(false);
        }
        self.save(score)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_file(name: &str) -> HighScoreFile {
        let path = std::env::temp_dir().join(format!("rat_rider_{}_{name}", std::process::id()));
        let _ = fs::remove_file(&path);
        HighScoreFile::new(path)
    }

    #[test]
    fn test_parse_first_token() {
        assert_eq!(parse_high_score("42\n").unwrap(), 42);
        assert_eq!(parse_high_score("  7 trailing words").unwrap(), 7);
        assert_eq!(parse_high_score("").unwrap(), 0);
        assert_eq!(parse_high_score(" \n").unwrap(), 0);
        assert!(matches!(
            parse_high_score("-3"),
            Err(Error::InvalidHighScore { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_zero() {
        let file = temp_file("missing");
        assert_eq!(file.read().unwrap(), 0);
        assert_eq!(file.load(), 0);
    }

    #[test]
    fn test_invalid_file_loads_as_zero() {
        let file = temp_file("garbage");
        fs::write(file.path(), "not a number").unwrap();
        assert!(file.read().is_err());
        assert_eq!(file.load(), 0);
        let _ = fs::remove_file(file.path());
    }

    #[test]
    fn test_save_then_load() {
        let file = temp_file("roundtrip");
        file.save(31).unwrap();
        assert_eq!(fs::read_to_string(file.path()).unwrap(), "31");
        assert_eq!(file.load(), 31);
        let _ = fs::remove_file(file.path());
    }

    #[test]
    fn test_record_only_when_beaten() {
        let file = temp_file("record");
        assert!(file.record(5).unwrap());
        assert!(!file.record(5).unwrap());
        assert!(!file.record(2).unwrap());
        assert!(file.record(9).unwrap());
        assert_eq!(file.load(), 9);
        let _ = fs::remove_file(file.path());
    }
}
