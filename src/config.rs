//! Server configuration file.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub pagination: PaginationConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub listen: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:3000".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: Option<String>,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            max_connections: 10,
            acquire_timeout_secs: 5,
        }
    }
}

/// Page size applied when a request omits `limit`, and the cap on it
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(default)]
pub struct PaginationConfig {
    pub default_limit: usize,
    pub max_limit: usize,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            default_limit: 20,
            max_limit: 100,
        }
    }
}

impl PaginationConfig {
    /// Resolve a raw `limit` query value.
    ///
    /// Missing, unparsable or zero values fall back to the default; anything
    /// larger than the cap is clamped.
    pub fn resolve(&self, raw: Option<&str>) -> usize {
        let limit = raw
            .and_then(|s| s.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(self.default_limit);
        limit.min(self.max_limit)
    }
}

impl Config {
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path).context("Failed to read config file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: Config = toml::from_str(
            r#"
            [database]
            url = "postgres://localhost/cartographer"

            [pagination]
            max_limit = 50
            "#,
        )
        .unwrap();

        assert_eq!(config.server.listen, "0.0.0.0:3000");
        assert_eq!(
            config.database.url.as_deref(),
            Some("postgres://localhost/cartographer")
        );
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.pagination.default_limit, 20);
        assert_eq!(config.pagination.max_limit, 50);
    }

    #[test]
    fn test_resolve_limit() {
        let pagination = PaginationConfig::default();
        assert_eq!(pagination.resolve(None), 20);
        assert_eq!(pagination.resolve(Some("5")), 5);
        assert_eq!(pagination.resolve(Some("500")), 100);
        assert_eq!(pagination.resolve(Some("0")), 20);
        assert_eq!(pagination.resolve(Some("abc")), 20);
        assert_eq!(pagination.resolve(Some("-3")), 20);
    }

    #[test]
    fn test_missing_file() {
        let err = Config::load_from_file("/nonexistent/cartographer.toml").unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
