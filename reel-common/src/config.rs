//! Configuration loading and config file resolution
//!
//! Every key is optional. A missing file never stops the player: it logs a
//! warning and runs on built-in defaults.
//!
//! Config file resolution order:
//! 1. Command-line argument (highest priority)
//! 2. `REELS_CONFIG` environment variable
//! 3. `<config dir>/reels/config.toml`
//! 4. Built-in defaults (no file)

use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{info, warn};

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "REELS_CONFIG";

/// Top-level TOML configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
pub struct TomlConfig {
    #[serde(default)]
    pub playback: PlaybackSettings,

    #[serde(default)]
    pub narration: NarrationSettings,

    #[serde(default)]
    pub viewport: ViewportSettings,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Playback timing
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PlaybackSettings {
    /// Gap between the end of one narration and the start of the next
    #[serde(default = "default_auto_advance_delay_ms")]
    pub auto_advance_delay_ms: u64,

    /// How long the play/pause glyph stays up after a tap
    #[serde(default = "default_icon_visible_ms")]
    pub icon_visible_ms: u64,

    /// Event bus capacity
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
}

impl Default for PlaybackSettings {
    fn default() -> Self {
        Self {
            auto_advance_delay_ms: default_auto_advance_delay_ms(),
            icon_visible_ms: default_icon_visible_ms(),
            event_capacity: default_event_capacity(),
        }
    }
}

impl PlaybackSettings {
    pub fn auto_advance_delay(&self) -> Duration {
        Duration::from_millis(self.auto_advance_delay_ms)
    }

    pub fn icon_visible(&self) -> Duration {
        Duration::from_millis(self.icon_visible_ms)
    }
}

/// Narration engine settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct NarrationSettings {
    /// Locale used when no script-specific locale is detected
    #[serde(default = "default_locale")]
    pub default_locale: String,

    /// Speaking rate of the simulated speech engine
    #[serde(default = "default_words_per_minute")]
    pub words_per_minute: u32,
}

impl Default for NarrationSettings {
    fn default() -> Self {
        Self {
            default_locale: default_locale(),
            words_per_minute: default_words_per_minute(),
        }
    }
}

/// Viewport tracking settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ViewportSettings {
    /// Fraction of a reel that must be inside the container to count as visible
    #[serde(default = "default_visibility_threshold")]
    pub visibility_threshold: f64,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        Self {
            visibility_threshold: default_visibility_threshold(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_auto_advance_delay_ms() -> u64 {
    1000
}

fn default_icon_visible_ms() -> u64 {
    1500
}

fn default_event_capacity() -> usize {
    100
}

fn default_locale() -> String {
    "en-US".to_string()
}

fn default_words_per_minute() -> u32 {
    170
}

fn default_visibility_threshold() -> f64 {
    0.98
}

fn default_log_level() -> String {
    "info".to_string()
}

impl TomlConfig {
    /// Parse and validate a TOML document
    pub fn parse(toml_str: &str) -> Result<Self> {
        let config: TomlConfig = toml::from_str(toml_str)
            .map_err(|e| Error::Config(format!("Failed to parse TOML: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let toml_str = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config file {:?}: {}", path, e)))?;
        let config = Self::parse(&toml_str)?;
        info!("Loaded configuration from {:?}", path);
        Ok(config)
    }

    /// Resolve and load the config file, degrading to defaults
    ///
    /// An explicit `cli_path` that cannot be loaded is an error; a file found
    /// through the environment or the platform config dir that fails to
    /// load only produces a warning.
    pub fn resolve(cli_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = cli_path {
            return Self::load(path);
        }

        match resolve_config_path() {
            Some(path) => match Self::load(&path) {
                Ok(config) => Ok(config),
                Err(e) => {
                    warn!("{}; using built-in defaults", e);
                    Ok(Self::default())
                }
            },
            None => {
                info!("No config file found; using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    /// Reject values the player cannot run with
    pub fn validate(&self) -> Result<()> {
        let threshold = self.viewport.visibility_threshold;
        if !(threshold > 0.0 && threshold <= 1.0) {
            return Err(Error::Config(format!(
                "viewport.visibility_threshold must be in (0, 1], got {}",
                threshold
            )));
        }
        if self.playback.auto_advance_delay_ms == 0 {
            return Err(Error::Config("playback.auto_advance_delay_ms must be > 0".to_string()));
        }
        if self.playback.icon_visible_ms == 0 {
            return Err(Error::Config("playback.icon_visible_ms must be > 0".to_string()));
        }
        if self.playback.event_capacity == 0 {
            return Err(Error::Config("playback.event_capacity must be > 0".to_string()));
        }
        if self.narration.words_per_minute == 0 {
            return Err(Error::Config("narration.words_per_minute must be > 0".to_string()));
        }
        if self.narration.default_locale.trim().is_empty() {
            return Err(Error::Config("narration.default_locale must not be empty".to_string()));
        }
        Ok(())
    }
}

/// Locate a config file from the environment or the platform config dir
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    default_config_path().filter(|p| p.exists())
}

/// `<config dir>/reels/config.toml` for the current platform
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("reels").join("config.toml"))
}
