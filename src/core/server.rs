//! MCP Server implementation and lifecycle management.
//!
//! The server owns one [`SecurityValidator`] and exposes it through the
//! gate tools defined in `domains/tools/definitions/`. The ToolRouter is
//! built in `domains/tools/router.rs`.

use rmcp::{ServerHandler, handler::server::tool::ToolRouter, model::*, tool_handler};
use std::sync::Arc;
use tracing::info;

use super::config::Config;
use super::security::SecurityValidator;
use crate::domains::tools::build_tool_router;

#[cfg(feature = "http")]
use crate::domains::tools::ToolRegistry;

const INSTRUCTIONS: &str = "Security gate for agent tool invocations. Call check_permission with the tool name and its proposed arguments before executing any tool, and abort the invocation when allowed=false. validate_command and validate_path check a single command line or path.";

/// The main MCP server handler.
#[derive(Clone)]
pub struct McpServer {
    /// Server configuration.
    config: Arc<Config>,

    /// Validator shared by every tool route and connection.
    validator: Arc<SecurityValidator>,

    /// Tool router for handling tool calls.
    tool_router: ToolRouter<Self>,
}

impl McpServer {
    /// Create a new MCP server, building the validator from the
    /// configuration's security section.
    pub fn new(config: Config) -> Self {
        let validator = Arc::new(SecurityValidator::from_config(&config.security));
        Self::with_validator(config, validator)
    }

    /// Create a server around an existing validator.
    pub fn with_validator(config: Config, validator: Arc<SecurityValidator>) -> Self {
        info!("Gate server using workspace {:?}", validator.work_dir());

        Self {
            tool_router: build_tool_router::<Self>(validator.clone()),
            config: Arc::new(config),
            validator,
        }
    }

    /// Get the server name.
    pub fn name(&self) -> &str {
        &self.config.server.name
    }

    /// Get the server version.
    pub fn version(&self) -> &str {
        &self.config.server.version
    }

    /// Get the server configuration.
    pub fn config(&self) -> &Arc<Config> {
        &self.config
    }

    /// Get the validator behind the gate tools.
    pub fn validator(&self) -> &Arc<SecurityValidator> {
        &self.validator
    }

    /// Instructions sent to clients on initialization.
    pub fn instructions(&self) -> &'static str {
        INSTRUCTIONS
    }

    // ========================================================================
    // HTTP Transport Support Methods
    // ========================================================================

    /// List all available tools (for HTTP transport).
    pub fn list_tools(&self) -> Vec<serde_json::Value> {
        self.tool_router
            .list_all()
            .into_iter()
            .map(|t| {
                serde_json::json!({
                    "name": t.name,
                    "description": t.description,
                    "inputSchema": t.input_schema,
                    "outputSchema": t.output_schema
                })
            })
            .collect()
    }

    /// Call a tool by name (for HTTP transport).
    #[cfg(feature = "http")]
    pub fn call_tool(
        &self,
        name: &str,
        arguments: serde_json::Value,
    ) -> crate::core::Result<serde_json::Value> {
        let registry = ToolRegistry::new(self.validator.clone());
        Ok(registry.call_tool(name, arguments)?)
    }
}

/// ServerHandler implementation with tool_handler macro for automatic tool routing.
#[tool_handler]
impl ServerHandler for McpServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            instructions: Some(INSTRUCTIONS.to_string()),
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: self.config.server.name.clone(),
                version: self.config.server.version.clone(),
                ..Default::default()
            },
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::SecurityConfig;
    use tempfile::TempDir;

    fn test_config(dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.security = SecurityConfig {
            work_dir: Some(dir.path().to_path_buf()),
            ..SecurityConfig::default()
        };
        config
    }

    #[test]
    fn test_server_lists_gate_tools() {
        let temp_dir = TempDir::new().unwrap();
        let server = McpServer::new(test_config(&temp_dir));

        let tools = server.list_tools();
        assert_eq!(tools.len(), 3);
        assert!(tools.iter().any(|t| t["name"] == "check_permission"));
    }

    #[test]
    fn test_server_validator_uses_configured_workspace() {
        let temp_dir = TempDir::new().unwrap();
        let server = McpServer::new(test_config(&temp_dir));

        let canonical = std::fs::canonicalize(temp_dir.path()).unwrap();
        assert_eq!(server.validator().work_dir(), canonical);
    }

    #[test]
    fn test_get_info_enables_tools() {
        let temp_dir = TempDir::new().unwrap();
        let server = McpServer::new(test_config(&temp_dir));

        let info = server.get_info();
        assert!(info.capabilities.tools.is_some());
        assert!(info.capabilities.resources.is_none());
        assert_eq!(info.server_info.name, "agent-gate");
    }

    #[cfg(feature = "http")]
    #[test]
    fn test_call_unknown_tool_is_tool_error() {
        let temp_dir = TempDir::new().unwrap();
        let server = McpServer::new(test_config(&temp_dir));

        let result = server.call_tool("nope", serde_json::json!({}));
        assert!(matches!(result, Err(crate::core::Error::Tool(_))));
    }
}
