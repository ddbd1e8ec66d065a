//! Runs the gate on whichever transport the configuration selects.

use tracing::{error, info};

use super::{TransportConfig, TransportResult};
use crate::core::McpServer;

#[cfg(feature = "stdio")]
use super::stdio::StdioTransport;

#[cfg(feature = "tcp")]
use super::tcp::TcpTransport;

#[cfg(feature = "http")]
use super::http::HttpTransport;

/// Binds one [`TransportConfig`] to a gate server.
pub struct TransportService {
    config: TransportConfig,
}

impl TransportService {
    pub fn new(config: TransportConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Serve `server` until the stdio session or the network listener ends.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        info!(
            transport = %self.config.description(),
            workspace = ?server.validator().work_dir(),
            "Serving permission checks"
        );

        let outcome = match self.config {
            #[cfg(feature = "stdio")]
            TransportConfig::Stdio => StdioTransport::run(server).await,
            #[cfg(feature = "tcp")]
            TransportConfig::Tcp(cfg) => TcpTransport::new(cfg).run(server).await,
            #[cfg(feature = "http")]
            TransportConfig::Http(cfg) => HttpTransport::new(cfg).run(server).await,
        };

        if let Err(e) = &outcome {
            error!("Gate transport stopped: {}", e);
        }
        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_keeps_config() {
        let service = TransportService::new(TransportConfig::default());
        assert_eq!(
            service.config().description(),
            TransportConfig::default().description()
        );
    }
}
