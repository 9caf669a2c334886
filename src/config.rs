use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable: {0}")]
    MissingEnvVar(String),
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

    // Web Server
    pub web_host: String,
    pub web_port: u16,

    // Sessions
    pub session_ttl: Duration,

    // CMS (blog). The blog degrades to an empty list when unset.
    pub cms_api_url: String,
    pub cms_space_id: Option<String>,
    pub cms_access_token: Option<String>,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required environment variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Database
            database_path: PathBuf::from(env_or_default("DATABASE_PATH", "./data/forum.sqlite")),

            // Web Server
            web_host: env_or_default("WEB_HOST", "0.0.0.0"),
            web_port: parse_env_u16("WEB_PORT", 8080)?,

            // Sessions
            session_ttl: Duration::from_secs(parse_env_u64(
                "SESSION_TTL_SECS",
                30 * 24 * 3600,
            )?),

            // CMS
            cms_api_url: env_or_default("CMS_API_URL", "https://cdn.contentful.com"),
            cms_space_id: optional_env("CMS_SPACE_ID"),
            cms_access_token: optional_env("CMS_ACCESS_TOKEN"),
        })
    }

    /// Validate that the configuration is usable.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.web_host.is_empty() {
            return Err(ConfigError::InvalidValue {
                name: "WEB_HOST".to_string(),
                message: "cannot be empty".to_string(),
            });
        }
        if self.session_ttl.as_secs() == 0 {
            return Err(ConfigError::InvalidValue {
                name: "SESSION_TTL_SECS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        // A space id without a token (or vice versa) is a misconfiguration,
        // not a disabled blog.
        if self.cms_space_id.is_some() != self.cms_access_token.is_some() {
            return Err(ConfigError::InvalidValue {
                name: "CMS_SPACE_ID/CMS_ACCESS_TOKEN".to_string(),
                message: "must be set together".to_string(),
            });
        }
        Ok(())
    }

    /// Whether the CMS-backed blog is configured.
    #[must_use]
    pub fn cms_enabled(&self) -> bool {
        self.cms_space_id.is_some() && self.cms_access_token.is_some()
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
