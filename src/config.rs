//! Settings file
//!
//! `~/.config/eatsease/config.json`; session credentials can also come from
//! `EATSEASE_USERNAME` / `EATSEASE_TOKEN`.

use crate::engine::EngineSettings;
use crate::error::{Result, SwipeError};
use crate::service::DEFAULT_BASE_URL;
use eatsease_common::{GestureConfig, DEFAULT_LIKE_CAP};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const TOKEN_ENV: &str = "EATSEASE_TOKEN";
pub const USERNAME_ENV: &str = "EATSEASE_USERNAME";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub base_url: String,
    pub username: Option<String>,
    pub token: Option<String>,
    pub timeout_seconds: u64,
    pub like_cap: u32,
    pub gesture: GestureSettings,
}

/// Swipe thresholds as stored on disk
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureSettings {
    pub screen_width: f64,
    pub tentative_threshold: f64,
    pub commit_threshold: f64,
    pub exit_duration_ms: u64,
}

/// Who the session belongs to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub token: String,
}

impl Default for GestureSettings {
    fn default() -> Self {
        let gesture = GestureConfig::default();
        Self {
            screen_width: gesture.screen_width,
            tentative_threshold: gesture.tentative_threshold,
            commit_threshold: gesture.commit_threshold,
            exit_duration_ms: gesture.exit_duration.as_millis() as u64,
        }
    }
}

impl From<GestureSettings> for GestureConfig {
    fn from(settings: GestureSettings) -> Self {
        Self {
            screen_width: settings.screen_width,
            tentative_threshold: settings.tentative_threshold,
            commit_threshold: settings.commit_threshold,
            exit_duration: Duration::from_millis(settings.exit_duration_ms),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.into(),
            username: None,
            token: None,
            timeout_seconds: 10,
            like_cap: DEFAULT_LIKE_CAP,
            gesture: GestureSettings::default(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = serde_json::from_str(&content)?;
            Ok(config)
        } else {
            Ok(Self::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| SwipeError::Config("home directory not found".into()))?;
        Ok(home.join(".config").join("eatsease").join("config.json"))
    }

    /// Environment variables win over the stored values
    pub fn credentials(&self) -> Result<Credentials> {
        let username = env_or(USERNAME_ENV, self.username.as_deref());
        let token = env_or(TOKEN_ENV, self.token.as_deref());

        match (username, token) {
            (Some(username), Some(token)) => Ok(Credentials { username, token }),
            _ => Err(SwipeError::MissingCredentials),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn engine_settings(&self) -> Result<EngineSettings> {
        let settings = EngineSettings {
            like_cap: self.like_cap,
            sync_timeout: self.timeout(),
            gesture: self.gesture.into(),
        };
        settings.validate()?;
        Ok(settings)
    }
}

fn env_or(key: &str, stored: Option<&str>) -> Option<String> {
    std::env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or_else(|| stored.map(str::to_string))
}
