//! High score persistence
//!
//! The game reads the high score once at startup and writes it back when a
//! finished game beats it. Failures are reported to the caller; the game
//! logs them and keeps playing with an in-memory value.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Storage for the best score across games
pub trait HighScoreStore {
    /// Read the stored high score, 0 when nothing was stored yet
    fn load(&mut self) -> Result<u32>;
    fn save(&mut self, high_score: u32) -> Result<()>;
}

impl<T: HighScoreStore + ?Sized> HighScoreStore for Box<T> {
    fn load(&mut self) -> Result<u32> {
        (**self).load()
    }

    fn save(&mut self, high_score: u32) -> Result<()> {
        (**self).save(high_score)
    }
}

/// On-disk record
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
struct HighScoreRecord {
    high_score: u32,
}

/// High score kept as JSON in a file
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl HighScoreStore for JsonFileStore {
    fn load(&mut self) -> Result<u32> {
        if !self.path.exists() {
            return Ok(0);
        }

        let text = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read high score from {:?}", self.path))?;
        let record: HighScoreRecord = serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse high score file {:?}", self.path))?;

        Ok(record.high_score)
    }

    fn save(&mut self, high_score: u32) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {:?}", parent))?;
        }

        let json = serde_json::to_string_pretty(&HighScoreRecord { high_score })
            .context("Failed to serialize high score")?;
        std::fs::write(&self.path, json)
            .with_context(|| format!("Failed to write high score to {:?}", self.path))?;

        Ok(())
    }
}

/// High score that lives only as long as the process
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    high_score: u32,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_score(high_score: u32) -> Self {
        Self { high_score }
    }

    pub fn high_score(&self) -> u32 {
        self.high_score
    }
}

impl HighScoreStore for MemoryStore {
    fn load(&mut self) -> Result<u32> {
        Ok(self.high_score)
    }

    fn save(&mut self, high_score: u32) -> Result<()> {
        self.high_score = high_score;
        Ok(())
    }
}
