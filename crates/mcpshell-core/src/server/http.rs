//! Serving MCP handlers over streamable HTTP

use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use rmcp::transport::streamable_http_server::session::local::LocalSessionManager;
use rmcp::transport::streamable_http_server::{StreamableHttpServerConfig, StreamableHttpService};
use rmcp::ServerHandler;
use tokio::net::TcpListener;

use crate::logging::Logger;
use crate::shell::DEFAULT_COMMAND_TIMEOUT;

/// Path the MCP endpoint is mounted at
pub const MCP_PATH: &str = "/mcp";

/// Where and how a tool server listens
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub path: String,
    /// Applied to commands that do not set their own timeout
    pub default_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            path: MCP_PATH.to_string(),
            default_timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            ..Default::default()
        }
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub async fn bind(&self) -> io::Result<TcpListener> {
        TcpListener::bind(self.address()).await
    }
}

/// Router with the MCP endpoint mounted at `path`
///
/// `factory` is called once per MCP session.
pub fn mcp_router<S, F>(path: &str, factory: F) -> axum::Router
where
    S: ServerHandler,
    F: Fn() -> Result<S, io::Error> + Send + Sync + 'static,
{
    let service = StreamableHttpService::new(
        factory,
        LocalSessionManager::default().into(),
        StreamableHttpServerConfig::default(),
    );
    axum::Router::new().nest_service(path, service)
}

/// Serve until `shutdown` resolves
pub async fn serve_http<S, F, Sd>(
    listener: TcpListener,
    path: &str,
    factory: F,
    shutdown: Sd,
    logger: Arc<dyn Logger>,
) -> io::Result<()>
where
    S: ServerHandler,
    F: Fn() -> Result<S, io::Error> + Send + Sync + 'static,
    Sd: Future<Output = ()> + Send + 'static,
{
    let local: SocketAddr = listener.local_addr()?;
    logger.info(&format!("[McpServer] Listening on http://{}{}", local, path));

    axum::serve(listener, mcp_router(path, factory))
        .with_graceful_shutdown(shutdown)
        .await?;

    logger.info("[McpServer] Server stopped");
    Ok(())
}
