//! Configuration for reel-player
//!
//! # Settings Sources Priority
//!
//! 1. Command-line arguments
//! 2. TOML configuration file (see `reel_common::config` for resolution)
//! 3. Built-in defaults

use crate::error::{Error, Result};
use reel_common::config::TomlConfig;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Controller timings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    /// Gap between one narration ending and the next reel starting
    pub auto_advance_delay: Duration,
    /// Play/pause glyph window after a tap
    pub icon_visible: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            auto_advance_delay: Duration::from_millis(1000),
            icon_visible: Duration::from_millis(1500),
        }
    }
}

/// Complete player configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerConfig {
    pub timings: Timings,
    pub event_capacity: usize,
    pub default_locale: String,
    pub words_per_minute: u32,
    pub visibility_threshold: f64,
    pub log_level: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self::from_toml(&TomlConfig::default())
    }
}

/// Command-line configuration overrides
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub auto_advance_delay_ms: Option<u64>,
    pub words_per_minute: Option<u32>,
    pub default_locale: Option<String>,
    pub log_level: Option<String>,
}

impl PlayerConfig {
    pub fn from_toml(toml: &TomlConfig) -> Self {
        Self {
            timings: Timings {
                auto_advance_delay: toml.playback.auto_advance_delay(),
                icon_visible: toml.playback.icon_visible(),
            },
            event_capacity: toml.playback.event_capacity,
            default_locale: toml.narration.default_locale.clone(),
            words_per_minute: toml.narration.words_per_minute,
            visibility_threshold: toml.viewport.visibility_threshold,
            log_level: toml.logging.level.clone(),
        }
    }

    /// Resolve the TOML file, then apply command-line overrides
    pub fn load(config_path: Option<&Path>, overrides: ConfigOverrides) -> Result<Self> {
        let toml = TomlConfig::resolve(config_path)?;
        let config = Self::from_toml(&toml).with_overrides(overrides)?;
        info!(
            "Playback: advance gap {:?}, icon window {:?}, default locale {}",
            config.timings.auto_advance_delay, config.timings.icon_visible, config.default_locale
        );
        Ok(config)
    }

    fn with_overrides(mut self, overrides: ConfigOverrides) -> Result<Self> {
        if let Some(ms) = overrides.auto_advance_delay_ms {
            if ms == 0 {
                return Err(Error::Config("auto-advance delay must be > 0".to_string()));
            }
            self.timings.auto_advance_delay = Duration::from_millis(ms);
        }
        if let Some(wpm) = overrides.words_per_minute {
            if wpm == 0 {
                return Err(Error::Config("words per minute must be > 0".to_string()));
            }
            self.words_per_minute = wpm;
        }
        if let Some(locale) = overrides.default_locale {
            self.default_locale = locale;
        }
        if let Some(level) = overrides.log_level {
            self.log_level = level;
        }
        Ok(self)
    }
}
