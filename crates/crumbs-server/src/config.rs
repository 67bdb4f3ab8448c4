//! RON configuration for the HTTP server

use crumbs_service::{ServiceConfig, WritePolicy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Root configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ServerConfig {
    /// Listen address (e.g., "0.0.0.0:8000")
    #[serde(default = "default_listen")]
    pub listen: String,
    /// Database file; in-memory when absent
    #[serde(default)]
    pub database: Option<PathBuf>,
    /// RON catalog file or directory used to seed an empty database.
    /// The built-in starter set is used when absent.
    #[serde(default)]
    pub catalog: Option<PathBuf>,
    #[serde(default)]
    pub write_policy: WritePolicy,
    #[serde(default = "default_leaderboard_limit")]
    pub leaderboard_limit: usize,
    /// Filter used when RUST_LOG is unset
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
    /// Value of Access-Control-Allow-Origin
    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_listen() -> String {
    "0.0.0.0:8000".to_string()
}

fn default_leaderboard_limit() -> usize {
    ServiceConfig::default().leaderboard_limit
}

fn default_log_filter() -> String {
    "info".to_string()
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: default_listen(),
            database: None,
            catalog: None,
            write_policy: WritePolicy::default(),
            leaderboard_limit: default_leaderboard_limit(),
            log_filter: default_log_filter(),
            cors_origin: default_cors_origin(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from a RON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path.as_ref())?;
        Self::parse(&content)
    }

    /// Like [`load`](Self::load), but a missing file is `Ok(None)`
    pub fn load_optional(path: impl AsRef<Path>) -> Result<Option<Self>, ConfigError> {
        if !path.as_ref().exists() {
            return Ok(None);
        }
        Self::load(path).map(Some)
    }

    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        let config: ServerConfig = ron::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.listen_addr()?;
        if self.leaderboard_limit == 0 {
            return Err(ConfigError::Validation(
                "leaderboard_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr, ConfigError> {
        self.listen.parse().map_err(|_| {
            ConfigError::Validation(format!("invalid listen address: {}", self.listen))
        })
    }

    pub fn service_config(&self) -> ServiceConfig {
        ServiceConfig {
            write_policy: self.write_policy,
            leaderboard_limit: self.leaderboard_limit,
        }
    }
}

/// Configuration error
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("Validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = ServerConfig::parse("()").unwrap();
        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.listen_addr().unwrap().port(), 8000);
        assert_eq!(config.service_config(), ServiceConfig::default());
    }

    #[test]
    fn test_full_config() {
        let config = ServerConfig::parse(
            r#"(
                listen: "127.0.0.1:9000",
                database: Some("data/crumbs.db"),
                catalog: Some("content/upgrades.ron"),
                write_policy: Versioned(max_retries: 5),
                leaderboard_limit: 20,
                log_filter: "crumbs_service=debug",
                cors_origin: "http://localhost:3000",
            )"#,
        )
        .unwrap();

        assert_eq!(config.database, Some(PathBuf::from("data/crumbs.db")));
        assert_eq!(
            config.service_config().write_policy,
            WritePolicy::Versioned { max_retries: 5 }
        );
        assert_eq!(config.leaderboard_limit, 20);
    }

    #[test]
    fn test_invalid_listen_address() {
        let err = ServerConfig::parse(r#"(listen: "not an address")"#).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
    }

    #[test]
    fn test_zero_leaderboard_limit_rejected() {
        assert!(ServerConfig::parse("(leaderboard_limit: 0)").is_err());
    }

    #[test]
    fn test_missing_file_is_none() {
        let missing = ServerConfig::load_optional("does/not/exist.ron").unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_bundled_config_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("../../config/server.ron");
        let config = ServerConfig::load(path).unwrap();
        assert!(config.catalog.is_some());
    }
}
