//! Configuration management
//!
//! Handles loading and parsing of JSON configuration files for the demo
//! runner. Every section has defaults, so a partial (or empty) file works.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use crate::feed::{SimulatedFeed, DEFAULT_MAX_PRICE, DEFAULT_MIN_PRICE};

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub engine: EngineSection,
    #[serde(default)]
    pub feed: FeedSection,
}

impl Config {
    /// Load configuration from JSON file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref()).context("Failed to read config file")?;
        let config: Config =
            serde_json::from_str(&contents).context("Failed to parse config JSON")?;
        Ok(config)
    }

    /// Reject values the engine cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.engine.poll_interval_ms == 0 {
            anyhow::bail!("engine.poll_interval_ms must be >= 1");
        }
        if self.feed.min_price <= 0.0 {
            anyhow::bail!("feed.min_price ({}) must be positive", self.feed.min_price);
        }
        if self.feed.max_price < self.feed.min_price {
            anyhow::bail!(
                "feed.max_price ({}) must be >= feed.min_price ({})",
                self.feed.max_price,
                self.feed.min_price
            );
        }
        Ok(())
    }
}

/// Engine section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineSection {
    /// Pause between evaluation cycles, in milliseconds
    pub poll_interval_ms: u64,
}

impl Default for EngineSection {
    fn default() -> Self {
        EngineSection {
            poll_interval_ms: 1_000,
        }
    }
}

impl EngineSection {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

/// Simulated feed section
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeedSection {
    pub min_price: f64,
    pub max_price: f64,
    /// Fixed RNG seed for reproducible runs (omit for OS entropy)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
}

impl Default for FeedSection {
    fn default() -> Self {
        FeedSection {
            min_price: DEFAULT_MIN_PRICE,
            max_price: DEFAULT_MAX_PRICE,
            seed: None,
        }
    }
}

impl FeedSection {
    /// Build the simulated feed described by this section
    pub fn build(&self) -> SimulatedFeed {
        match self.seed {
            Some(seed) => SimulatedFeed::with_seed(self.min_price, self.max_price, seed),
            None => SimulatedFeed::new(self.min_price, self.max_price),
        }
    }
}
