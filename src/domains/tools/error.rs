//! Tool-specific error types.

use thiserror::Error;

/// Errors that can occur while dispatching a gate tool call.
///
/// A security denial is not a tool error: it is reported as a decision in
/// the tool result.
#[derive(Debug, Error)]
pub enum ToolError {
    /// The requested tool was not found.
    #[error("Tool not found: {0}")]
    NotFound(String),

    /// Invalid arguments were provided to the tool.
    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    /// The tool result could not be serialized.
    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl ToolError {
    /// Create a new "not found" error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create a new "invalid arguments" error.
    pub fn invalid_arguments(msg: impl Into<String>) -> Self {
        Self::InvalidArguments(msg.into())
    }
}
