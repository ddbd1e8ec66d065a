//! Agent Gate Library
//!
//! A security gate that decides whether a tool invocation proposed by an
//! autonomous agent may run. Shell commands are screened for chaining and
//! substitution syntax and a denylist; file paths are confined to a
//! workspace root, checked against sensitive locations and resolved through
//! symlinks.
//!
//! # Architecture
//!
//! - **core**: the security layer (`core::security`) plus configuration,
//!   error handling, the MCP server and its transports
//! - **domains**: MCP tools that expose the gate to clients
//!
//! # Example
//!
//! ```rust,no_run
//! use agent_gate::SecurityValidator;
//! use serde_json::json;
//!
//! let validator = SecurityValidator::new("/srv/workspace");
//!
//! assert!(validator.check_permission("bash", &json!({ "command": "ls -la" })).is_ok());
//! assert!(validator.check_permission("bash", &json!({ "command": "ls && rm -rf ~" })).is_err());
//! assert!(validator.check_permission("read_file", &json!({ "path": "../../etc/passwd" })).is_err());
//! ```

pub mod core;
pub mod domains;

// Re-export commonly used types for convenience
pub use core::{Config, Error, McpServer, Result, SecurityError, SecurityValidator};
