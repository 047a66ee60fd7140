use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::history::{DEFAULT_HISTORY_CAPACITY, JsonFileHistoryStore};
use crate::player::{AudioSettings, PlayerSettings, SkipWindows};
use crate::services::ContinuitySettings;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub playback: PlaybackConfig,

    #[serde(default)]
    pub history: HistoryConfig,

    #[serde(default)]
    pub api: ApiConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Advance to the next episode when one ends
    #[serde(default = "default_true")]
    pub auto_play: bool,

    /// Start playing as soon as media is ready
    #[serde(default = "default_true")]
    pub autoplay_on_load: bool,

    #[serde(default = "default_quality")]
    pub preferred_quality: u32,

    #[serde(default = "default_intro_window")]
    pub intro_window_seconds: f64,

    #[serde(default = "default_outro_window")]
    pub outro_window_seconds: f64,

    #[serde(default = "default_save_interval")]
    pub progress_save_interval_seconds: u64,

    #[serde(default = "default_volume")]
    pub default_volume: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    #[serde(default = "default_history_capacity")]
    pub capacity: usize,

    /// Overrides the history file location
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Sent with every catalog request
    #[serde(default = "default_language")]
    pub language: String,

    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Config {
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            info!("No config file found, using defaults");
            let config = Config::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        debug!("Loading config from {:?}", path);
        let contents = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&contents).context("Failed to parse config file")?;
        info!("Config loaded successfully");
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Failed to create config directory")?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents).context("Failed to write config file")?;

        debug!("Config saved to {:?}", path);
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().context("Failed to get config directory")?;
        Ok(config_dir.join("dramapop").join("config.toml"))
    }

    pub fn history_path(&self) -> Result<PathBuf> {
        match &self.history.path {
            Some(path) => Ok(path.clone()),
            None => JsonFileHistoryStore::default_path().context("Failed to get data directory"),
        }
    }

    pub fn player_settings(&self) -> PlayerSettings {
        PlayerSettings {
            skip_windows: SkipWindows::new(
                self.playback.intro_window_seconds,
                self.playback.outro_window_seconds,
            ),
            autoplay_on_load: self.playback.autoplay_on_load,
            audio: AudioSettings {
                volume: self.playback.default_volume.clamp(0.0, 1.0),
                ..AudioSettings::default()
            },
        }
    }

    pub fn continuity_settings(&self) -> ContinuitySettings {
        ContinuitySettings {
            auto_play: self.playback.auto_play,
            preferred_quality: self.playback.preferred_quality,
            progress_save_interval: Duration::from_secs(self.playback.progress_save_interval_seconds),
        }
    }

    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api.timeout_seconds)
    }
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            auto_play: true,
            autoplay_on_load: true,
            preferred_quality: default_quality(),
            intro_window_seconds: default_intro_window(),
            outro_window_seconds: default_outro_window(),
            progress_save_interval_seconds: default_save_interval(),
            default_volume: default_volume(),
        }
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: default_history_capacity(),
            path: None,
        }
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            language: default_language(),
            timeout_seconds: default_timeout(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_quality() -> u32 {
    720
}

fn default_intro_window() -> f64 {
    90.0
}

fn default_outro_window() -> f64 {
    30.0
}

fn default_save_interval() -> u64 {
    10
}

fn default_volume() -> f64 {
    1.0
}

fn default_history_capacity() -> usize {
    DEFAULT_HISTORY_CAPACITY
}

fn default_base_url() -> String {
    "https://dramabox-api.example.com".to_string()
}

fn default_language() -> String {
    "en".to_string()
}

fn default_timeout() -> u64 {
    30
}
