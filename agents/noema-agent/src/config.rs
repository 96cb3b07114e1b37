//! Agent configuration
//!
//! Defaults, then an optional TOML file, then environment variables.
//! Command-line flags are applied last by the binary.
//!
//! | Variable | Field |
//! |---|---|
//! | `NOEMA_HOST` | `host` |
//! | `PORT` | `port` |
//! | `NOEMA_MAX_BODY_SIZE` | `max_body_size` |
//! | `NOEMA_LOG_FORMAT` | `log_format` (`json` or `pretty`) |
//! | `NOEMA_METRICS_ENABLED` | `metrics_enabled` |

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

use crate::error::{AgentError, Result};

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
}

impl FromStr for LogFormat {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            other => Err(AgentError::config_error(format!(
                "Unknown log format '{}'",
                other
            ))),
        }
    }
}

/// Runtime configuration for the agent
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AgentConfig {
    /// Address to bind
    pub host: String,
    /// Port to listen on
    pub port: u16,
    /// Maximum request body size in bytes
    pub max_body_size: usize,
    /// Log output format
    pub log_format: LogFormat,
    /// Whether to record and expose Prometheus metrics
    pub metrics_enabled: bool,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8000,
            max_body_size: 1024 * 1024, // 1MB
            log_format: LogFormat::Json,
            metrics_enabled: true,
        }
    }
}

impl AgentConfig {
    /// Defaults overlaid with the process environment
    pub fn from_env() -> Result<Self> {
        Self::default().overlay_env(|key| std::env::var(key).ok())
    }

    /// Load from an optional TOML file, then overlay the process environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let base = match path {
            Some(path) => Self::from_toml_file(path)?,
            None => Self::default(),
        };
        base.overlay_env(|key| std::env::var(key).ok())
    }

    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Apply environment overrides read through `lookup`
    pub fn overlay_env<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup("NOEMA_HOST") {
            self.host = host;
        }
        if let Some(port) = lookup("PORT") {
            self.port = parse_var("PORT", &port)?;
        }
        if let Some(size) = lookup("NOEMA_MAX_BODY_SIZE") {
            self.max_body_size = parse_var("NOEMA_MAX_BODY_SIZE", &size)?;
        }
        if let Some(format) = lookup("NOEMA_LOG_FORMAT") {
            self.log_format = format.parse()?;
        }
        if let Some(enabled) = lookup("NOEMA_METRICS_ENABLED") {
            self.metrics_enabled = parse_var("NOEMA_METRICS_ENABLED", &enabled)?;
        }
        Ok(self)
    }

    /// Socket address string for binding
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parse_var<T: FromStr>(name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| AgentError::config_error(format!("Invalid value for {}: '{}'", name, value)))
}
