//! Configuration settings for tally.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, Result};

/// Main configuration structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub telegram: TelegramConfig,
    pub mongo: MongoConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ConfigError::ReadFile)?;
        Self::from_toml(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from default locations or use defaults.
    pub fn load() -> Result<Self> {
        let config_paths = [
            PathBuf::from("tally.toml"),
            PathBuf::from("config.toml"),
            dirs::config_dir()
                .map(|p| p.join("tally/config.toml"))
                .unwrap_or_default(),
            dirs::home_dir()
                .map(|p| p.join(".tally/config.toml"))
                .unwrap_or_default(),
        ];

        for path in &config_paths {
            if path.exists() {
                tracing::info!("Loading config from: {}", path.display());
                return Self::from_file(path);
            }
        }

        tracing::info!("No config file found, using defaults");
        Ok(Config::default())
    }

    /// Validate the configuration.
    fn validate(&self) -> Result<()> {
        // Telegram caps long-poll timeouts at 50 seconds.
        if !(1..=50).contains(&self.telegram.poll_timeout_secs) {
            return Err(ConfigError::Invalid(
                "telegram.poll_timeout_secs must be between 1 and 50".to_string(),
            )
            .into());
        }
        if self.mongo.host.is_empty() {
            return Err(ConfigError::MissingField("mongo.host".to_string()).into());
        }
        if self.mongo.database.is_empty() {
            return Err(ConfigError::MissingField("mongo.database".to_string()).into());
        }
        if self.mongo.collection.is_empty() {
            return Err(ConfigError::MissingField("mongo.collection".to_string()).into());
        }
        Ok(())
    }
}

/// Telegram transport configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TelegramConfig {
    /// Bot token from BotFather. CLI flag and TELEGRAM_BOT_TOKEN env
    /// override this.
    pub token: Option<String>,
    /// Long-poll timeout passed to getUpdates.
    pub poll_timeout_secs: u64,
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            token: None,
            poll_timeout_secs: 25,
        }
    }
}

/// MongoDB connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MongoConfig {
    pub host: String,
    pub port: u16,
    /// Name of the backend database.
    pub database: String,
    /// Name of the payment collection.
    pub collection: String,
}

impl Default for MongoConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 27017,
            database: "tally".to_string(),
            collection: "payments".to_string(),
        }
    }
}

impl MongoConfig {
    pub fn uri(&self) -> String {
        format!("mongodb://{}:{}", self.host, self.port)
    }
}
