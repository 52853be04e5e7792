//! Configuration loading for kom clients
//!
//! Supports loading the server location from (in order of priority):
//! 1. The `KOM_SERVER_URL` environment variable
//! 2. JSON file in the kom config directory
//! 3. The built-in default (a local httpkom instance)
//!
//! The id of the last logged-in session is kept in a separate file so a
//! client can resume it on the next start.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Server config filename in the kom config directory
const SERVER_FILE: &str = "server.json";

/// Stored session filename in the kom config directory
const SESSION_FILE: &str = "session.json";

/// Environment variable naming the httpkom base URL
pub const SERVER_URL_ENV: &str = "KOM_SERVER_URL";

pub const DEFAULT_BASE_URL: &str = "http://localhost:5001/";

pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT_SECS
}

/// Location of the httpkom server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerConfig {
    pub base_url: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl ServerConfig {
    /// Load the server config using the following priority:
    /// 1. `KOM_SERVER_URL` environment variable
    /// 2. JSON file (~/.config/kom/server.json)
    /// 3. Defaults
    pub fn load() -> Result<Self> {
        let mut server = if config::config_exists(SERVER_FILE) {
            config::load_json(SERVER_FILE)?
        } else {
            Self::default()
        };

        // The environment only overrides the URL, the timeout stays
        if let Some(base_url) = Self::url_from_env() {
            server.base_url = base_url;
        }

        server.validate()?;
        Ok(server)
    }

    /// Parse a server config from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        let server: Self = serde_json::from_str(json).context("Failed to parse server config")?;
        server.validate()?;
        Ok(server)
    }

    /// Persist this config to ~/.config/kom/server.json
    pub fn save(&self) -> Result<()> {
        self.validate()?;
        config::save_json(SERVER_FILE, self)
    }

    fn url_from_env() -> Option<String> {
        std::env::var(SERVER_URL_ENV)
            .ok()
            .filter(|url| !url.trim().is_empty())
    }

    fn validate(&self) -> Result<()> {
        url::Url::parse(self.base_url.trim())
            .with_context(|| format!("Invalid server URL: {}", self.base_url))?;
        Ok(())
    }

    /// Get the server config file path (~/.config/kom/server.json)
    pub fn default_path() -> Option<PathBuf> {
        config::config_path(SERVER_FILE)
    }
}

/// The session id persisted between runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionFile {
    pub session_id: String,
}

impl SessionFile {
    /// Load the stored session id, if there is one
    pub fn load() -> Result<Option<String>> {
        if !config::config_exists(SESSION_FILE) {
            return Ok(None);
        }
        let stored: Self = config::load_json(SESSION_FILE)?;
        Ok(Some(stored.session_id))
    }

    pub fn save(session_id: &str) -> Result<()> {
        config::save_json(
            SESSION_FILE,
            &Self {
                session_id: session_id.to_string(),
            },
        )
    }

    /// Forget the stored session id
    pub fn clear() -> Result<()> {
        config::remove(SESSION_FILE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_server_config() {
        let json = r#"{ "base_url": "https://kom.example/httpkom/", "timeout_secs": 5 }"#;

        let server = ServerConfig::from_json(json).unwrap();
        assert_eq!(server.base_url, "https://kom.example/httpkom/");
        assert_eq!(server.timeout_secs, 5);
    }

    #[test]
    fn test_timeout_defaults_when_missing() {
        let server = ServerConfig::from_json(r#"{ "base_url": "http://kom.example/" }"#).unwrap();
        assert_eq!(server.timeout_secs, DEFAULT_TIMEOUT_SECS);
    }

    #[test]
    fn test_invalid_url_is_rejected() {
        let result = ServerConfig::from_json(r#"{ "base_url": "no scheme here" }"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_missing_base_url_is_rejected() {
        assert!(ServerConfig::from_json(r#"{ "timeout_secs": 5 }"#).is_err());
    }

    #[test]
    fn test_default_points_at_local_server() {
        let server = ServerConfig::default();
        assert_eq!(server.base_url, DEFAULT_BASE_URL);
        assert!(server.validate().is_ok());
    }
}
