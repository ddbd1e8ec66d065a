//! Agent Gate Entry Point
//!
//! Initializes logging, loads configuration, builds the security validator
//! and serves the gate tools over the configured transport.

use std::sync::Arc;

use anyhow::Result;
use tracing::{Level, info};
use tracing_subscriber::{EnvFilter, fmt};

use agent_gate::core::{Config, McpServer, SecurityValidator, TransportService};

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env();

    init_logging(&config.logging.level);

    info!("Starting {} v{}", config.server.name, config.server.version);

    let validator = Arc::new(SecurityValidator::from_config(&config.security));
    info!(
        "Security policy loaded: {} forbidden commands, {} forbidden paths, {} extra allowed dirs",
        validator.forbidden_commands().len(),
        validator.forbidden_paths().len(),
        validator.allowed_dirs().len()
    );

    let transport = TransportService::new(config.transport.clone());
    let server = McpServer::with_validator(config, validator);

    transport.run(server).await?;

    info!("Server shutting down");

    Ok(())
}

/// Initialize the logging subsystem.
///
/// `RUST_LOG` directives are honored; `level` sets the baseline.
fn init_logging(level: &str) {
    let level = match level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let filter = EnvFilter::from_default_env().add_directive(level.into());

    // stdout carries the MCP stream in stdio mode
    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}
