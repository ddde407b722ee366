//! # Configuration
//!
//! Process configuration from the environment plus the immutable bot
//! [`Settings`] loaded from YAML.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0

use anyhow::{anyhow, Result};
use log::info;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Longest timeout Discord accepts, in seconds
pub const DISCORD_MAX_TIMEOUT_SECS: u64 = 28 * 24 * 60 * 60;

/// Values read from the process environment at startup
#[derive(Debug, Clone)]
pub struct Config {
    pub discord_token: String,
    pub log_level: String,
    pub settings_path: String,
    pub api_key_file: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let discord_token = std::env::var("DISCORD_TOKEN")
            .or_else(|_| std::env::var("API_KEY"))
            .map_err(|_| anyhow!("DISCORD_TOKEN environment variable not set"))?;

        Ok(Config {
            discord_token,
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            settings_path: std::env::var("BOT_SETTINGS_PATH")
                .unwrap_or_else(|_| "bot.yaml".to_string()),
            api_key_file: std::env::var("GOOGLE_API_KEY_FILE")
                .unwrap_or_else(|_| "GOOGLE_API_KEY.txt".to_string()),
        })
    }
}

/// Bot-wide settings, fixed after startup and shared behind an `Arc`
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub prefix: String,
    pub version: String,
    pub admin_role: String,
    pub moderator_role: String,
    pub member_role: String,
    /// Upper bound for `!mute`, in seconds. Discord itself allows up to 28 days.
    pub max_timeout_secs: u64,
    pub default_mute_secs: i64,
    pub transient_message_secs: u64,
    pub generation: GenerationSettings,
    pub delivery: DeliverySettings,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct GenerationSettings {
    pub model: String,
    pub temperature: f32,
    pub max_attempts: u32,
    pub retry_delay_secs: u64,
    pub max_concurrent: usize,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct DeliverySettings {
    pub inline_limit: usize,
    /// Where oversized responses are staged before upload; system temp dir when unset
    pub scratch_dir: Option<PathBuf>,
    pub attachment_name: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            prefix: "!".to_string(),
            version: format!("v{}", env!("CARGO_PKG_VERSION")),
            admin_role: "Admin".to_string(),
            moderator_role: "Playtester".to_string(),
            member_role: "Member".to_string(),
            max_timeout_secs: 24_192,
            default_mute_secs: 15,
            transient_message_secs: 5,
            generation: GenerationSettings::default(),
            delivery: DeliverySettings::default(),
        }
    }
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash-lite".to_string(),
            temperature: 1.0,
            max_attempts: 5,
            retry_delay_secs: 15,
            max_concurrent: 4,
        }
    }
}

impl Default for DeliverySettings {
    fn default() -> Self {
        Self {
            inline_limit: 2000,
            scratch_dir: None,
            attachment_name: "Requested_response_is_longer_than_2000_characters.txt".to_string(),
        }
    }
}

impl Settings {
    /// Load settings from a YAML file, falling back to defaults when it does not exist
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            info!("No settings file at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path)?;
        let settings: Settings = serde_yaml::from_str(&contents)?;
        settings.validate()?;
        info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.prefix.is_empty() {
            return Err(anyhow!("Command prefix must not be empty"));
        }
        if self.prefix.chars().any(char::is_whitespace) {
            return Err(anyhow!("Command prefix must not contain whitespace"));
        }
        for (field, value) in [
            ("admin_role", &self.admin_role),
            ("moderator_role", &self.moderator_role),
            ("member_role", &self.member_role),
        ] {
            if value.trim().is_empty() {
                return Err(anyhow!("{field} must not be empty"));
            }
        }
        if self.max_timeout_secs == 0 {
            return Err(anyhow!("max_timeout_secs must be at least 1"));
        }
        if self.max_timeout_secs > DISCORD_MAX_TIMEOUT_SECS {
            return Err(anyhow!(
                "max_timeout_secs must be at most {DISCORD_MAX_TIMEOUT_SECS} (28 days)"
            ));
        }
        if self.generation.max_attempts == 0 {
            return Err(anyhow!("generation.max_attempts must be at least 1"));
        }
        if self.generation.max_concurrent == 0 {
            return Err(anyhow!("generation.max_concurrent must be at least 1"));
        }
        if self.delivery.inline_limit == 0 {
            return Err(anyhow!("delivery.inline_limit must be at least 1"));
        }
        Ok(())
    }

    pub fn transient_ttl(&self) -> Duration {
        Duration::from_secs(self.transient_message_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_secs(self.generation.retry_delay_secs)
    }

    pub fn scratch_dir(&self) -> PathBuf {
        self.delivery
            .scratch_dir
            .clone()
            .unwrap_or_else(std::env::temp_dir)
    }
}
