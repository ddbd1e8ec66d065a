//! Command validation tool definition.

use futures::FutureExt;
use rmcp::{
    ErrorData as McpError,
    handler::server::tool::{ToolCallContext, ToolRoute, schema_for_type},
    model::{CallToolResult, Tool},
};
use schemars::JsonSchema;
use serde::Deserialize;
use std::sync::Arc;
use tracing::instrument;

use super::GateDecision;
use crate::core::security::SecurityValidator;
#[cfg(feature = "http")]
use crate::domains::tools::ToolError;

/// Parameters for the command validation tool.
#[derive(Debug, Clone, Deserialize, JsonSchema)]
pub struct ValidateCommandParams {
    /// The shell command line to check.
    pub command: String,
}

/// Command validation tool - screens a shell command line.
pub struct ValidateCommandTool;

impl ValidateCommandTool {
    /// Tool name as registered in MCP.
    pub const NAME: &'static str = "validate_command";

    /// Tool description shown to clients.
    pub const DESCRIPTION: &'static str = "Check a shell command line without running it. Rejects command substitution, chaining (&&, ||, ;, &), line breaks, IFS tricks and configured dangerous commands. Plain pipelines are allowed.";

    /// Execute the tool logic (for STDIO/TCP transport via rmcp).
    #[instrument(skip_all)]
    pub fn execute(params: &ValidateCommandParams, validator: &SecurityValidator) -> CallToolResult {
        let decision = match validator.validate_command(&params.command) {
            Ok(()) => GateDecision::allow(&params.command),
            Err(e) => GateDecision::deny(&params.command, &e),
        };

        decision.into_call_result()
    }

    /// HTTP handler for this tool (for HTTP transport).
    #[cfg(feature = "http")]
    pub fn http_handler(
        arguments: serde_json::Value,
        validator: Arc<SecurityValidator>,
    ) -> Result<serde_json::Value, ToolError> {
        let params: ValidateCommandParams = serde_json::from_value(arguments)
            .map_err(|e| ToolError::invalid_arguments(e.to_string()))?;

        let result = Self::execute(&params, &validator);

        Ok(serde_json::to_value(&result)?)
    }

    /// Create a Tool model for this tool (metadata).
    pub fn to_tool() -> Tool {
        Tool {
            name: Self::NAME.into(),
            description: Some(Self::DESCRIPTION.into()),
            input_schema: schema_for_type::<ValidateCommandParams>().into(),
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
                let params: ValidateCommandParams =
                    serde_json::from_value(serde_json::Value::Object(args))
                        .map_err(|e| McpError::invalid_params(e.to_string(), None))?;
                Ok(Self::execute(&params, &validator))
            }
            .boxed()
        })
    }
}
