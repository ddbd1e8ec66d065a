//! Tool Router - builds the rmcp ToolRouter from the gate tools.
//!
//! Each tool knows how to create its own route; every route shares the
//! same validator instance.

use std::sync::Arc;

use rmcp::handler::server::tool::ToolRouter;

use crate::core::security::SecurityValidator;

use super::definitions::{CheckPermissionTool, ValidateCommandTool, ValidatePathTool};

/// Build the tool router with all registered tools.
pub fn build_tool_router<S>(validator: Arc<SecurityValidator>) -> ToolRouter<S>
where
    S: Send + Sync + 'static,
{
    ToolRouter::new()
        .with_route(CheckPermissionTool::create_route(validator.clone()))
        .with_route(ValidateCommandTool::create_route(validator.clone()))
        .with_route(ValidatePathTool::create_route(validator))
}
