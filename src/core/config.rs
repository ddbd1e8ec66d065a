//! Configuration management for the gate server.
//!
//! This module provides a centralized configuration structure that can be
//! populated from environment variables (optionally via a `.env` file) or
//! defaults.

use super::transport::TransportConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::{info, warn};

/// Main configuration structure for the gate server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server identification and metadata.
    pub server: ServerConfig,

    /// Logging configuration.
    pub logging: LoggingConfig,

    /// Transport configuration.
    pub transport: TransportConfig,

    /// Workspace root and denylists.
    pub security: SecurityConfig,
}

/// Server identification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// The name of the server as reported to clients.
    pub name: String,

    /// The version of the server.
    pub version: String,
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level filter (e.g., "info", "debug", "trace").
    pub level: String,
}

/// Configuration for the security validator.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Workspace root. Defaults to the current directory when unset.
    pub work_dir: Option<PathBuf>,

    /// Forbidden command substrings. `None` keeps the built-in list.
    pub forbidden_commands: Option<Vec<String>>,

    /// Forbidden path entries. `None` keeps the built-in list.
    pub forbidden_paths: Option<Vec<String>>,

    /// Additional roots in which file operations are allowed.
    #[serde(default)]
    pub allowed_dirs: Vec<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig {
                name: "agent-gate".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            logging: LoggingConfig {
                level: "info".to_string(),
            },
            transport: TransportConfig::default(),
            security: SecurityConfig::default(),
        }
    }
}

impl Config {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables are expected to be prefixed with `MCP_`.
    /// For example: `MCP_SERVER_NAME`, `MCP_WORK_DIR`.
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let mut config = Self::default();

        if let Ok(name) = std::env::var("MCP_SERVER_NAME") {
            config.server.name = name;
        }

        if let Ok(level) = std::env::var("MCP_LOG_LEVEL") {
            config.logging.level = level;
        }

        config.transport = TransportConfig::from_env();
        config.security = SecurityConfig::from_env();

        config
    }
}

impl SecurityConfig {
    /// Load the security section from `MCP_WORK_DIR`, `MCP_FORBIDDEN_COMMANDS`,
    /// `MCP_FORBIDDEN_PATHS` and `MCP_ALLOWED_DIRS`.
    pub fn from_env() -> Self {
        let mut security = Self::default();

        if let Ok(work_dir) = std::env::var("MCP_WORK_DIR") {
            security.work_dir = Some(PathBuf::from(work_dir));
            info!("Workspace root set to {:?}", security.work_dir);
        } else {
            warn!("MCP_WORK_DIR not set - using the current directory as workspace root");
        }

        if let Ok(commands) = std::env::var("MCP_FORBIDDEN_COMMANDS") {
            let commands = split_list(&commands);
            info!("Forbidden commands overridden ({} entries)", commands.len());
            security.forbidden_commands = Some(commands);
        }

        if let Ok(paths) = std::env::var("MCP_FORBIDDEN_PATHS") {
            let paths = split_list(&paths);
            info!("Forbidden paths overridden ({} entries)", paths.len());
            security.forbidden_paths = Some(paths);
        }

        if let Some(dirs) = std::env::var_os("MCP_ALLOWED_DIRS") {
            security.allowed_dirs = std::env::split_paths(&dirs)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
            info!("Additional allowed directories: {:?}", security.allowed_dirs);
        }

        security
    }
}

/// Split a comma-separated list, dropping blank entries.
fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}
