//! Path validation tool definition.

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, schema_for_type},
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::{instrument, warn};

use super::GateDecision;
use crate::core::security::SecurityValidator;
#[cfg(feature = "http")]
use crate::domains::tools::ToolError;

/// Parameters for the path validation tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ValidatePathParams {
    /// Path to check, absolute or relative to the workspace root.
    pub path: String,
}

/// Path validation tool - confines a path to the workspace.
pub struct ValidatePathTool;

impl ValidatePathTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "validate_path";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Check a file path without modifying it. Relative paths are resolved against the workspace root. Rejects traversal outside the workspace, sensitive system paths and symlinks whose target escapes. Returns the canonical path when allowed.";

    /// Execute the tool logic (for STDIO/TCP transport via rmcp).
    #[instrument(skip_all, fields(path = %params.path))]
    pub fn execute(params: &ValidatePathParams, validator: &SecurityValidator) -> CallToolResult {
        let decision = match validator.validate_path(&params.path) {
            Ok(canonical) => GateDecision {
                canonical_path: Some(canonical.to_string_lossy().into_owned()),
                ..GateDecision::allow(&params.path)
            },
            Err(e) => {
                warn!("Path rejected: {}", e);
                GateDecision::deny(&params.path, &e)
            }
        };

        decision.into_call_result()
    }

    /// HTTP handler for this tool (for HTTP transport).
    #[cfg(feature = "http")]
    pub fn http_handler(
        arguments: serde_json::Value,
        validator: Arc<SecurityValidator>,
    ) -> Result<serde_json::Value, ToolError> {
        let params: ValidatePathParams = serde_json::from_value(arguments)
            .map_err(|e| ToolError::invalid_arguments(e.to_string()))?;

        let result = Self::execute(&params, &validator);

        Ok(serde_json::to_value(&result)?)
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<ValidatePathParams>().into(),
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
                let params: ValidatePathParams =
                    serde_json::from_value(serde_json::Value::Object(args))
                        .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
                Ok(Self::execute(&params, &validator))
            }
            .boxed()
        })
    }
}
