//! Configuration management for modlinker
//!
//! Configuration is read once at startup from a TOML file, then environment
//! overrides (`MODLINKER_SECTION__KEY=value`) are applied and the result is
//! validated.

use crate::error::{ModlinkerError, Result};
use crate::reply::{DEFAULT_FOOTER, MAX_LENGTH};
use crate::request::MAX_RESULTS;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

mod validator;

pub use validator::ConfigValidator;

/// Legacy variable naming the current game version
const CURRENT_VERSION_ENV: &str = "RIMWORLD_CURRENT_ALPHA";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(rename = "_meta")]
    pub meta: MetaConfig,
    pub linker: LinkerConfig,
    pub catalog: CatalogConfig,
    pub bot: BotConfig,
    pub storage: StorageConfig,
}

/// Metadata about the configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetaConfig {
    pub schema_version: String,
    #[serde(default = "current_timestamp")]
    pub created_at: String,
    #[serde(default = "current_timestamp")]
    pub last_modified: String,
}

fn current_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}

/// Request recognition and reply layout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkerConfig {
    /// Version tag used when a request names none
    pub current_version: String,
    pub max_results: usize,
    /// Maximum reply length in characters, footer included
    pub max_length: usize,
    pub footer: String,
}

/// Steam Workshop catalog settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub app_id: u32,
    pub browse_url: String,
    pub item_url: String,
    pub api_url: String,
    pub api_key_env: String,
    /// 3 is relevance ordering
    pub query_type: u32,
    pub timeout_secs: u64,
}

/// Run loop settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BotConfig {
    /// Account the bot replies as; its own comments are ignored
    pub username: String,
    pub ratelimit_backoff: String,
    pub max_post_attempts: u32,
}

impl BotConfig {
    pub fn ratelimit_backoff(&self) -> Duration {
        parse_duration(&self.ratelimit_backoff).unwrap_or(Duration::from_secs(60))
    }
}

/// Analytics storage
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub database: PathBuf,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ModlinkerError::ConfigNotFound {
                path: path.to_path_buf(),
            });
        }

        let content = std::fs::read_to_string(path).map_err(|e| ModlinkerError::Io {
            source: e,
            context: format!("Failed to read config file: {:?}", path),
        })?;
        let mut config: Config = toml::from_str(&content)?;

        // Apply environment variable overrides
        config.apply_env_overrides();

        // Validate configuration
        ConfigValidator::validate(&config)?;

        Ok(config)
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content).map_err(|e| ModlinkerError::Io {
            source: e,
            context: format!("Failed to write config file: {:?}", path),
        })?;
        Ok(())
    }

    /// Apply environment variable overrides
    /// Environment variables in format: MODLINKER_SECTION__KEY=value
    pub fn apply_env_overrides(&mut self) {
        if let Ok(version) = std::env::var(CURRENT_VERSION_ENV) {
            self.linker.current_version = version;
        }

        for (key, value) in std::env::vars() {
            if let Some(config_key) = key.strip_prefix("MODLINKER_") {
                if let Err(e) = self.set_value_from_env(config_key, &value) {
                    tracing::warn!("Failed to apply env override {}: {}", key, e);
                }
            }
        }
    }

    fn set_value_from_env(&mut self, path: &str, value: &str) -> Result<()> {
        match path {
            "LINKER__CURRENT_VERSION" => {
                self.linker.current_version = value.to_string();
            }
            "LINKER__MAX_RESULTS" => {
                self.linker.max_results = parse_env(path, value)?;
            }
            "LINKER__MAX_LENGTH" => {
                self.linker.max_length = parse_env(path, value)?;
            }
            "LINKER__FOOTER" => {
                self.linker.footer = value.to_string();
            }
            "CATALOG__API_KEY_ENV" => {
                self.catalog.api_key_env = value.to_string();
            }
            "CATALOG__API_URL" => {
                self.catalog.api_url = value.to_string();
            }
            "BOT__USERNAME" => {
                self.bot.username = value.to_string();
            }
            "STORAGE__DATABASE" => {
                self.storage.database = PathBuf::from(value);
            }
            _ => {
                tracing::debug!("Unknown env config key: {}", path);
            }
        }
        Ok(())
    }

    /// Get the default configuration file path
    pub fn default_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir().ok_or_else(|| {
            ModlinkerError::Config("Cannot determine config directory".to_string())
        })?;

        Ok(config_dir.join("modlinker").join("config.toml"))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            meta: MetaConfig {
                schema_version: "1.0.0".to_string(),
                created_at: current_timestamp(),
                last_modified: current_timestamp(),
            },
            linker: LinkerConfig {
                current_version: "1.0".to_string(),
                max_results: MAX_RESULTS,
                max_length: MAX_LENGTH,
                footer: DEFAULT_FOOTER.to_string(),
            },
            catalog: CatalogConfig {
                app_id: 294100,
                browse_url: "https://steamcommunity.com/workshop/browse/".to_string(),
                item_url: "https://steamcommunity.com/sharedfiles/filedetails/?id=".to_string(),
                api_url: "https://api.steampowered.com".to_string(),
                api_key_env: "STEAM_KEY".to_string(),
                query_type: 3,
                timeout_secs: 10,
            },
            bot: BotConfig {
                username: "ModLinkerBot".to_string(),
                ratelimit_backoff: "60s".to_string(),
                max_post_attempts: 5,
            },
            storage: StorageConfig {
                database: PathBuf::from("~/.modlinker/analytics.sqlite"),
            },
        }
    }
}

fn parse_env<T: std::str::FromStr>(path: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| ModlinkerError::InvalidConfigValue {
            path: path.to_string(),
            message: format!("Cannot parse '{}' as a number", value),
        })
}

/// Parse a duration string (e.g., "60s", "500ms", "2m", "1h", "30")
pub fn parse_duration(value: &str) -> Option<Duration> {
    let value = value.trim();

    // Check "ms" before "s" because "ms" ends with "s"
    if let Some(ms) = value.strip_suffix("ms") {
        ms.parse().ok().map(Duration::from_millis)
    } else if let Some(secs) = value.strip_suffix('s') {
        secs.parse().ok().map(Duration::from_secs)
    } else if let Some(mins) = value.strip_suffix('m') {
        mins.parse::<u64>().ok().map(|m| Duration::from_secs(m * 60))
    } else if let Some(hours) = value.strip_suffix('h') {
        hours.parse::<u64>().ok().map(|h| Duration::from_secs(h * 3600))
    } else {
        value.parse().ok().map(Duration::from_secs)
    }
}

/// Expand a leading `~` to the home directory
pub fn expand_tilde(path: &Path) -> PathBuf {
    if let Ok(stripped) = path.strip_prefix("~") {
        if let Some(home) = dirs::home_dir() {
            return home.join(stripped);
        }
    }
    path.to_path_buf()
}
