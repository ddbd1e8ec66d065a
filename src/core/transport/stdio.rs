//! Gate served over the process's own stdin/stdout.
//!
//! The agent host spawns the gate as a child process and keeps one MCP
//! session open for its lifetime. Logs go to stderr.

use rmcp::ServiceExt;
use tracing::info;

use super::{TransportError, TransportResult};
use crate::core::McpServer;

pub struct StdioTransport;

impl StdioTransport {
    /// Handle permission checks until the host closes stdin.
    pub async fn run(server: McpServer) -> TransportResult<()> {
        let session = server
            .serve(rmcp::transport::stdio())
            .await
            .map_err(|e| TransportError::init(format!("stdio handshake failed: {e}")))?;

        info!("Agent host connected over stdio");

        let reason = session
            .waiting()
            .await
            .map_err(|e| TransportError::Service(e.to_string()))?;

        info!("Agent host session closed: {:?}", reason);
        Ok(())
    }
}
