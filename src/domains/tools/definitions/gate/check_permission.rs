//! Permission check tool definition.
//!
//! Lets an agent host ask whether a proposed tool invocation may run before
//! it executes anything.

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, schema_for_type},
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{info, instrument};

use super::GateDecision;
use crate::core::security::SecurityValidator;
#[cfg(feature = "http")]
use crate::domains::tools::ToolError;

// ============================================================================
// Tool Parameters
// ============================================================================

/// Parameters for the permission check tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct CheckPermissionParams {
    /// Name of the tool the agent wants to invoke (e.g. "bash", "write_file").
    pub tool_name: String,

    /// The arguments the agent proposes for that tool.
    #[serde(default)]
    pub params: serde_json::Value,
}

// ============================================================================
// Tool Definition
// ============================================================================

/// Permission check tool - routes a proposed invocation to the right validator.
pub struct CheckPermissionTool;

impl CheckPermissionTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "check_permission";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Check whether a proposed tool invocation may run. Shell tools are screened for command chaining, substitution and dangerous commands; file tools are confined to the workspace; delete only accepts regular files. Unknown tools are allowed. Call this before executing any tool and abort if allowed=false.";

    /// Execute the tool logic (for STDIO/TCP transport via rmcp).
    #[instrument(skip_all, fields(tool = %params.tool_name))]
    pub fn execute(params: &CheckPermissionParams, validator: &SecurityValidator) -> CallToolResult {
        info!("Permission check requested for '{}'", params.tool_name);

        let decision = match validator.check_permission(&params.tool_name, &params.params) {
            Ok(()) => GateDecision::allow(&params.tool_name),
            Err(e) => GateDecision::deny(&params.tool_name, &e),
        };

        decision.into_call_result()
    }

    /// HTTP handler for this tool (for HTTP transport).
    #[cfg(feature = "http")]
    pub fn http_handler(
        arguments: serde_json::Value,
        validator: Arc<SecurityValidator>,
    ) -> Result<serde_json::Value, ToolError> {
        let params: CheckPermissionParams = serde_json::from_value(arguments)
            .map_err(|e| ToolError::invalid_arguments(e.to_string()))?;

        let result = Self::execute(&params, &validator);

        Ok(serde_json::to_value(&result)?)
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<CheckPermissionParams>().into(),
            annotations: None,
            output_schema: Some(schema_for_type::<GateDecision>().into()),
            icons: None,
            meta: None,
            title: None,
        }
    }

    /// Create a ToolRoute for STDIO/TCP transport.
    pub fn create_route<S>(validator: Arc<SecurityValidator>) -> ToolRoute<S>
    where
        S: Send + Sync + 'static,
    {
        ToolRoute::new_dyn(Self::to_tool(), move |ctx: ToolCallContext<'_, S>| {
            let args = ctx.arguments.clone().unwrap_or_default();
            let validator = validator.clone();
            async move {
                let params: CheckPermissionParams =
                    serde_json::from_value(serde_json::Value::Object(args))
                        .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
                Ok(Self::execute(&params, &validator))
            }
            .boxed()
        })
    }
}

// ============================================================================
// Tests
// ============================================================================
