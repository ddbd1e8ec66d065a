//! Tool Registry - central registration and dispatch for all tools.
//!
//! This module provides:
//! - A registry of all available tools
//! - HTTP dispatch for tool calls (when http feature is enabled)
//! - Tool metadata for listing

use std::sync::Arc;
#[cfg(feature = "http")]
use tracing::warn;

use rmcp::model::Tool;

use crate::core::security::SecurityValidator;
#[cfg(feature = "http")]
use crate::domains::tools::ToolError;

use super::definitions::{CheckPermissionTool, ValidateCommandTool, ValidatePathTool};

/// Tool registry - manages all available tools.
pub struct ToolRegistry {
    #[cfg_attr(not(feature = "http"), allow(dead_code))]
    validator: Arc<SecurityValidator>,
}

impl ToolRegistry {
    /// Create a new tool registry backed by `validator`.
    pub fn new(validator: Arc<SecurityValidator>) -> Self {
        Self { validator }
    }

    /// Get all tool names.
    pub fn tool_names(&self) -> Vec<&'static str> {
        vec![
            CheckPermissionTool::NAME,
            ValidateCommandTool::NAME,
            ValidatePathTool::NAME,
        ]
    }

    /// Get all tools as Tool models (metadata).
    pub fn get_all_tools() -> Vec<Tool> {
        vec![
            CheckPermissionTool::to_tool(),
            ValidateCommandTool::to_tool(),
            ValidatePathTool::to_tool(),
        ]
    }

    /// Dispatch an HTTP tool call to the appropriate handler.
    #[cfg(feature = "http")]
    pub fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> Result<serde_json::Value, ToolError> {
        let validator = self.validator.clone();
        match name {
            CheckPermissionTool::NAME => CheckPermissionTool::http_handler(arguments, validator),
            ValidateCommandTool::NAME => ValidateCommandTool::http_handler(arguments, validator),
            ValidatePathTool::NAME => ValidatePathTool::http_handler(arguments, validator),
            _ => {
                warn!("Unknown tool requested: {}", name);
                Err(ToolError::not_found(name))
            }
        }
    }
}
