//! Gate tools: expose the security validator to MCP clients.
//!
//! This module also holds the decision type shared by all gate tools.

pub mod check_permission;
pub mod validate_command;
pub mod validate_path;

pub use check_permission::{CheckPermissionParams, CheckPermissionTool};
pub use validate_command::{ValidateCommandParams, ValidateCommandTool};
pub use validate_path::{ValidatePathParams, ValidatePathTool};

use rmcp::model::{CallToolResult, Content};
use schemars::JsonSchema;
use serde::Serialize;

use crate::core::security::SecurityError;

/// Structured outcome of a gate check (JSON format for AI agents).
#[derive(Debug, Clone, Serialize, JsonSchema)]
pub struct GateDecision {
    /// Whether the invocation may proceed.
    pub allowed: bool,
    /// What was checked: a tool name, a command or a path.
    pub subject: String,
    /// Canonical path, for path checks that passed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub canonical_path: Option<String>,
    /// Machine-readable denial code (e.g. "shell_injection_detected").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<String>,
    /// Human-readable denial reason.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl GateDecision {
    pub fn allow(subject: impl Into<String>) -> Self {
        Self {
            allowed: true,
            subject: subject.into(),
            canonical_path: None,
            error_kind: None,
            reason: None,
        }
    }

    pub fn deny(subject: impl Into<String>, error: &SecurityError) -> Self {
        Self {
            allowed: false,
            subject: subject.into(),
            canonical_path: None,
            error_kind: Some(error.kind().to_string()),
            reason: Some(error.to_string()),
        }
    }

    /// One-line summary for the text content of the tool result.
    pub fn summary(&self) -> String {
        match (self.allowed, &self.reason) {
            (true, _) => format!("ALLOWED: {}", self.subject),
            (false, Some(reason)) => format!("DENIED: {} ({})", self.subject, reason),
            (false, None) => format!("DENIED: {}", self.subject),
        }
    }

    /// Text summary + structured content.
    ///
    /// A denial is a successful check, so `is_error` stays false.
    pub fn into_call_result(self) -> CallToolResult {
        CallToolResult {
            content: vec![Content::text(self.summary())],
            structured_content: serde_json::to_value(&self).ok(),
            is_error: Some(false),
            meta: None,
        }
    }
}
