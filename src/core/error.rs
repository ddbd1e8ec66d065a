//! Error types and handling for the MCP server.
//!
//! This module defines a unified error type that can represent errors from
//! the security layer, the tools domain and external dependencies.

use thiserror::Error;

/// A specialized Result type for gate server operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for the gate server.
#[derive(Debug, Error)]
pub enum Error {
    /// Error originating from the tools domain.
    #[error("Tool error: {0}")]
    Tool(#[from] crate::domains::tools::ToolError),

    /// A tool invocation was denied by the security layer.
    #[error("Permission denied: {0}")]
    Security(#[from] crate::core::security::SecurityError),

    /// Error from the transport layer.
    #[error("Transport error: {0}")]
    Transport(#[from] crate::core::transport::TransportError),

    /// Configuration-related errors.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create a new configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// The security denial behind this error, if any.
    pub fn as_security(&self) -> Option<&crate::core::security::SecurityError> {
        match self {
            Self::Security(e) => Some(e),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::security::SecurityError;

    #[test]
    fn test_security_error_converts() {
        let err: Error = SecurityError::ShellInjectionDetected.into();
        assert!(err.to_string().starts_with("Permission denied"));
        assert_eq!(
            err.as_security().map(SecurityError::kind),
            Some("shell_injection_detected")
        );
    }

    #[test]
    fn test_config_error_is_not_security() {
        assert!(Error::config("bad").as_security().is_none());
    }
}
