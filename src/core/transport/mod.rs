//! Transport layer for the gate server.
//!
//! - **STDIO** (feature `stdio`, default): one session over stdin/stdout
//! - **TCP** (feature `tcp`): one session per connection
//! - **HTTP** (feature `http`): stateless JSON-RPC over POST
//!
//! Every transport serves the same [`McpServer`](crate::core::McpServer)
//! and therefore the same validator.

mod config;
mod error;
mod service;

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "tcp")]
pub mod tcp;

#[cfg(feature = "stdio")]
pub mod stdio;

pub use config::TransportConfig;
pub use error::{TransportError, TransportResult};
pub use service::TransportService;

#[cfg(feature = "tcp")]
pub use config::TcpConfig;

#[cfg(feature = "http")]
pub use config::HttpConfig;
