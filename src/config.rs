//! Configuration parser
//!
//! Parses `timebox.toml`. Every section and field is optional; a missing file
//! yields the defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};

/// Where and under which namespace state is stored
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StorageConfig {
    /// Directory of the file store (default: `.timebox`)
    #[serde(default = "default_dir")]
    pub dir: PathBuf,
    /// Prefix of the storage key (default: `@timebox`)
    #[serde(default = "default_namespace")]
    pub namespace: String,
}

fn default_dir() -> PathBuf {
    PathBuf::from(".timebox")
}

fn default_namespace() -> String {
    "@timebox".to_string()
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: default_dir(),
            namespace: default_namespace(),
        }
    }
}

/// Countdown behaviour
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimerConfig {
    /// Milliseconds between ticks while watching (default: 1000)
    #[serde(default = "default_tick_millis")]
    pub tick_millis: u64,
    /// Cycle length used when none is given (default: 25)
    #[serde(default = "default_minutes")]
    pub default_minutes: u32,
}

const fn default_tick_millis() -> u64 {
    1000
}

const fn default_minutes() -> u32 {
    25
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_millis: default_tick_millis(),
            default_minutes: default_minutes(),
        }
    }
}

impl TimerConfig {
    /// Tick period as a `Duration`
    #[must_use]
    pub const fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }
}

/// Logging defaults
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Filter used when `RUST_LOG` is unset (default: `info`)
    #[serde(default = "default_level")]
    pub level: String,
}

fn default_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
        }
    }
}

/// Top-level configuration parsed from timebox.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeboxConfig {
    /// Storage settings
    #[serde(default)]
    pub storage: StorageConfig,
    /// Timer settings
    #[serde(default)]
    pub timer: TimerConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl TimeboxConfig {
    /// Load configuration from a path, using defaults if the file does not exist
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::from_path(path)
    }

    /// Parse a timebox.toml file from a path
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    /// Parse timebox.toml content from a string
    pub fn parse(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).context("Failed to parse timebox.toml")?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.storage.namespace.trim().is_empty() {
            bail!("storage.namespace cannot be empty");
        }
        if self.storage.dir.as_os_str().is_empty() {
            bail!("storage.dir cannot be empty");
        }
        if self.timer.tick_millis == 0 {
            bail!("timer.tick_millis must be greater than 0");
        }
        if self.timer.default_minutes == 0 {
            bail!("timer.default_minutes must be greater than 0");
        }
        if self.logging.level.trim().is_empty() {
            bail!("logging.level cannot be empty");
        }
        Ok(())
    }
}
