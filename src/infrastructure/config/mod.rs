//! Configuration management
//!
//! Settings come from config.yaml, then environment variables on top
//! (the environment wins). A missing file is fine; a missing token is
//! checked at startup, not here.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::application::errors::ConfigError;
use crate::domain::entities::{clamp_volume, DEFAULT_VOLUME};

/// Bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct Config {
    pub discord: DiscordConfig,
    pub stream: StreamConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct DiscordConfig {
    pub token: Option<String>,
    /// Guild to register slash commands in. Unset means global
    /// registration, which Discord can take up to an hour to propagate.
    pub guild_id: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct StreamConfig {
    pub url: Option<String>,
    pub volume: f32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            discord: DiscordConfig {
                token: None,
                guild_id: None,
            },
            stream: StreamConfig {
                url: None,
                volume: DEFAULT_VOLUME,
            },
        }
    }
}

impl Config {
    pub fn load(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path)
            .map_err(|e| ConfigError::Parse(format!("Failed to read config: {}", e)))?;

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Parse(format!("Failed to parse config: {}", e)))?;
        config.validated()
    }

    /// Overlays the process environment on top of the file values.
    pub fn apply_env(self) -> Self {
        self.apply_vars(|name| std::env::var(name).ok())
    }

    /// Environment overlay with an injectable lookup.
    ///
    /// Malformed numeric values are logged and ignored rather than
    /// taking the bot down.
    pub fn apply_vars(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(token) = lookup("DISCORD_TOKEN") {
            self.discord.token = Some(token);
        }
        if let Some(url) = lookup("STREAM_URL") {
            self.stream.url = Some(url);
        }
        if let Some(raw) = lookup("VOLUME") {
            match raw.parse::<f32>() {
                Ok(value) if value.is_finite() => self.stream.volume = clamp_volume(value),
                _ => tracing::warn!("Ignoring invalid VOLUME value: {:?}", raw),
            }
        }
        if let Some(raw) = lookup("GUILD_ID") {
            match raw.parse::<u64>() {
                Ok(id) => self.discord.guild_id = Some(id),
                Err(_) => tracing::warn!("Ignoring invalid GUILD_ID value: {:?}", raw),
            }
        }
        self
    }

    fn validated(mut self) -> Result<Self, ConfigError> {
        if !self.stream.volume.is_finite() {
            return Err(ConfigError::InvalidValue(format!(
                "stream.volume must be finite, got {}",
                self.stream.volume
            )));
        }
        self.stream.volume = clamp_volume(self.stream.volume);
        Ok(self)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        serde_yaml::to_string(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}
