//! Core module containing shared infrastructure components.
//!
//! This module provides the security validation layer together with the
//! configuration, error handling, server lifecycle and transport plumbing
//! that expose it to MCP clients.

pub mod config;
pub mod error;
pub mod security;
pub mod server;
pub mod transport;

pub use config::{Config, SecurityConfig};
pub use error::{Error, Result};
pub use security::{SecurityError, SecurityValidator, ToolClass};
pub use server::McpServer;
pub use transport::{TransportConfig, TransportService};
