use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {message}")]
    InvalidValue { name: String, message: String },
    #[error("failed to parse {name} as integer: {source}")]
    ParseInt {
        name: String,
        #[source]
        source: std::num::ParseIntError,
    },
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    // Database
    pub database_path: PathBuf,

    // Mediation API server
    pub web_host: String,
    pub web_port: u16,

    // Mediation API as seen from the bot
    pub api_base_url: String,
    pub api_auth_token: Option<String>,
    pub request_timeout: Duration,

    // Chat platform credentials (consumed by the dispatch adapter)
    pub bot_token: Option<String>,
    pub bot_app_id: Option<String>,
    pub bot_guild_id: Option<String>,

    // Authorization
    pub default_allowed_role_id: Option<String>,
    pub required_role_ids: Vec<String>,

    // Audit notifications
    pub log_webhook_url: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a variable that is set fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            database_path: PathBuf::from(env_or_default("DATABASE_PATH", "./data/topics.sqlite")),

            web_host: env_or_default("WEB_HOST", "0.0.0.0"),
            web_port: parse_env_u16("WEB_PORT", 8080)?,

            api_base_url: env_or_default("API_BASE_URL", "http://localhost:8080"),
            api_auth_token: optional_env("API_AUTH_TOKEN"),
            request_timeout: Duration::from_secs(parse_env_u64("REQUEST_TIMEOUT_SECS", 15)?),

            bot_token: optional_env("BOT_TOKEN"),
            bot_app_id: optional_env("BOT_APP_ID"),
            bot_guild_id: optional_env("BOT_GUILD_ID"),

            default_allowed_role_id: optional_env("DEFAULT_ALLOWED_ROLE_ID"),
            required_role_ids: parse_id_list(&env_or_default("REQUIRED_ROLE_IDS", "")),

            log_webhook_url: optional_env("LOG_WEBHOOK_URL"),
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.api_base_url.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "API_BASE_URL".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if self.request_timeout.is_zero() {
            return Err(ConfigError::InvalidValue {
                name: "REQUEST_TIMEOUT_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// A configuration with test-friendly defaults, independent of the
    /// process environment.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            database_path: PathBuf::from("./data/test.sqlite"),
            web_host: "127.0.0.1".to_string(),
            web_port: 0,
            api_base_url: "http://localhost:8080".to_string(),
            api_auth_token: None,
            request_timeout: Duration::from_secs(5),
            bot_token: None,
            bot_app_id: None,
            bot_guild_id: None,
            default_allowed_role_id: None,
            required_role_ids: Vec::new(),
            log_webhook_url: None,
        }
    }
}

fn optional_env(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.is_empty())
}

fn env_or_default(name: &str, default: &str) -> String {
    std::env::var(name)
        .ok()
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_env_u64(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

fn parse_env_u16(name: &str, default: u16) -> Result<u16, ConfigError> {
    match std::env::var(name) {
        Ok(val) if !val.is_empty() => val.parse().map_err(|e| ConfigError::ParseInt {
            name: name.to_string(),
            source: e,
        }),
        _ => Ok(default),
    }
}

/// Parse a comma-separated id list, trimming whitespace and dropping empties.
fn parse_id_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}
