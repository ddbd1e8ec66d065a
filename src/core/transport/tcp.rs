//! TCP transport implementation.
//!
//! Each accepted connection gets its own MCP session. All sessions share
//! the server's validator, so a policy change is seen by every client.

use rmcp::ServiceExt;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tracing::{info, warn};

use super::{TransportError, TransportResult, config::TcpConfig};
use crate::core::McpServer;

/// Back-off after a failed `accept`.
const ACCEPT_RETRY_DELAY: Duration = Duration::from_millis(100);

/// TCP transport handler.
pub struct TcpTransport {
    config: TcpConfig,
}

impl TcpTransport {
    /// Create a new TCP transport with the given config.
    pub fn new(config: TcpConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Accept connections until the process is stopped.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let addr = self.address();

        let listener = TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        info!("Ready - listening on {}", addr);

        loop {
            match listener.accept().await {
                Ok((stream, peer)) => {
                    if let Err(e) = stream.set_nodelay(true) {
                        warn!("Failed to set TCP_NODELAY for {}: {}", peer, e);
                    }
                    tokio::spawn(Self::serve_client(server.clone(), stream, peer));
                }
                Err(e) => {
                    warn!("Failed to accept connection: {}", e);
                    tokio::time::sleep(ACCEPT_RETRY_DELAY).await;
                }
            }
        }
    }

    async fn serve_client(server: McpServer, stream: TcpStream, peer: SocketAddr) {
        let service = match server.serve(stream).await {
            Ok(service) => service,
            Err(e) => {
                warn!("Handshake with {} failed: {}", peer, e);
                return;
            }
        };

        info!("Client {} connected", peer);

        match service.waiting().await {
            Ok(reason) => info!("Client {} disconnected: {:?}", peer, reason),
            Err(e) => warn!("Session with {} ended with error: {}", peer, e),
        }
    }
}
