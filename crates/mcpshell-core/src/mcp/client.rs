//! MCP client using the official rmcp SDK
//!
//! Connects to MCP servers over streamable HTTP or a child process' stdio.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use rmcp::{
    model::{CallToolRequestParams, CallToolResult, ClientCapabilities, ClientInfo, Implementation, Tool},
    service::RunningService,
    transport::{
        streamable_http_client::StreamableHttpClientTransportConfig,
        StreamableHttpClientTransport, TokioChildProcess,
    },
    RoleClient, ServiceExt,
};
use serde_json::Value;
use thiserror::Error;
use tokio::process::Command;

use crate::config::ServerEntry;
use crate::logging::Logger;

use super::transport::{RemoteTool, ToolOutput, ToolTransport};

/// MCP client errors
#[derive(Error, Debug)]
pub enum McpError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Initialization failed: {0}")]
    InitializationFailed(String),

    #[error("Tool call failed: {0}")]
    ToolCallFailed(String),

    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

pub type McpResult<T> = Result<T, McpError>;

/// Connection to a single MCP server
pub struct McpClient {
    name: String,
    client: RunningService<RoleClient, ClientInfo>,
    logger: Arc<dyn Logger>,
}

fn client_info() -> ClientInfo {
    ClientInfo {
        meta: None,
        protocol_version: Default::default(),
        capabilities: ClientCapabilities::default(),
        client_info: Implementation {
            name: "mcpshell".to_string(),
            title: Some("mcpshell".to_string()),
            version: env!("CARGO_PKG_VERSION").to_string(),
            website_url: None,
            icons: None,
        },
    }
}

impl McpClient {
    /// Connect according to a `mcp_servers.json` entry
    pub async fn connect(
        name: &str,
        entry: &ServerEntry,
        logger: Arc<dyn Logger>,
    ) -> McpResult<Self> {
        match entry {
            ServerEntry::Remote(remote) => {
                Self::connect_http(name, &remote.url, &remote.headers, remote.auth.as_deref(), logger)
                    .await
            }
            ServerEntry::Stdio(stdio) => {
                Self::connect_stdio(name, &stdio.command, &stdio.args, &stdio.env, logger).await
            }
        }
    }

    /// Connect to an MCP server over HTTP (Streamable HTTP transport)
    pub async fn connect_http(
        name: &str,
        url: &str,
        headers: &HashMap<String, String>,
        auth: Option<&str>,
        logger: Arc<dyn Logger>,
    ) -> McpResult<Self> {
        logger.info(&format!("[McpClient] Connecting to '{}' over HTTP: {}", name, url));

        let mut config = StreamableHttpClientTransportConfig::with_uri(url.to_string());
        if let Some(token) = auth.filter(|t| !t.is_empty()) {
            config = config.auth_header(token.to_string());
        }

        let transport = if headers.is_empty() {
            StreamableHttpClientTransport::from_config(config)
        } else {
            let http = reqwest::Client::builder()
                .default_headers(header_map(headers)?)
                .build()
                .map_err(|e| McpError::ConnectionFailed(e.to_string()))?;
            StreamableHttpClientTransport::with_client(http, config)
        };

        let client = client_info()
            .serve(transport)
            .await
            .map_err(|e| McpError::InitializationFailed(e.to_string()))?;

        logger.info(&format!("[McpClient] Connected to '{}'", name));

        Ok(Self {
            name: name.to_string(),
            client,
            logger,
        })
    }

    /// Spawn an MCP server and talk to it over stdio
    pub async fn connect_stdio(
        name: &str,
        command: &str,
        args: &[String],
        env: &HashMap<String, String>,
        logger: Arc<dyn Logger>,
    ) -> McpResult<Self> {
        logger.info(&format!(
            "[McpClient] Starting '{}' over stdio: {} {}",
            name,
            command,
            args.join(" ")
        ));

        let mut cmd = Command::new(command);
        cmd.args(args).envs(env);

        let transport = TokioChildProcess::new(cmd)
            .map_err(|e| McpError::ConnectionFailed(format!("{}: {}", command, e)))?;

        let client = client_info()
            .serve(transport)
            .await
            .map_err(|e| McpError::InitializationFailed(e.to_string()))?;

        logger.info(&format!("[McpClient] Connected to '{}'", name));

        Ok(Self {
            name: name.to_string(),
            client,
            logger,
        })
    }

    /// Logical server name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Raw rmcp tool list
    pub async fn list_mcp_tools(&self) -> McpResult<Vec<Tool>> {
        let result = self
            .client
            .list_tools(Default::default())
            .await
            .map_err(|e| McpError::Protocol(e.to_string()))?;

        self.logger.info(&format!(
            "[McpClient] '{}' listed {} tools",
            self.name,
            result.tools.len()
        ));

        Ok(result.tools)
    }

    /// Call a tool by name, returning the raw rmcp result
    pub async fn call_mcp_tool(&self, name: &str, arguments: Value) -> McpResult<CallToolResult> {
        self.logger.info(&format!("[McpClient] Calling tool: {}", name));

        let arguments = match arguments {
            Value::Object(map) => Some(map),
            Value::Null => None,
            other => {
                return Err(McpError::ToolCallFailed(format!(
                    "arguments for '{}' must be a JSON object, got {}",
                    name, other
                )))
            }
        };

        let params = CallToolRequestParams {
            meta: None,
            name: name.to_owned().into(),
            arguments,
            task: None,
        };

        self.client
            .call_tool(params)
            .await
            .map_err(|e| McpError::ToolCallFailed(e.to_string()))
    }

    /// Get server info
    pub fn server_info(&self) -> Option<&Implementation> {
        self.client.peer_info().map(|info| &info.server_info)
    }

    /// Close the connection
    pub async fn close(self) -> McpResult<()> {
        self.logger.info(&format!("[McpClient] Closing connection to '{}'", self.name));
        self.client
            .cancel()
            .await
            .map_err(|e| McpError::Protocol(e.to_string()))?;
        Ok(())
    }
}

#[async_trait]
impl ToolTransport for McpClient {
    fn server_name(&self) -> &str {
        &self.name
    }

    async fn list_tools(&self) -> McpResult<Vec<RemoteTool>> {
        Ok(self
            .list_mcp_tools()
            .await?
            .into_iter()
            .map(RemoteTool::from)
            .collect())
    }

    async fn call_tool(&self, name: &str, arguments: Value) -> McpResult<ToolOutput> {
        self.call_mcp_tool(name, arguments).await.map(ToolOutput::from)
    }
}

impl std::fmt::Debug for McpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("McpClient").field("name", &self.name).finish()
    }
}

fn header_map(headers: &HashMap<String, String>) -> McpResult<HeaderMap> {
    let mut map = HeaderMap::new();
    for (key, value) in headers {
        let name = HeaderName::from_bytes(key.as_bytes())
            .map_err(|e| McpError::ConnectionFailed(format!("invalid header name '{}': {}", key, e)))?;
        let value = HeaderValue::from_str(value)
            .map_err(|e| McpError::ConnectionFailed(format!("invalid value for header '{}': {}", key, e)))?;
        map.insert(name, value);
    }
    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;

    #[test]
    fn test_header_map() {
        let mut headers = HashMap::new();
        headers.insert("X-Team".to_string(), "core".to_string());
        let map = header_map(&headers).unwrap();
        assert_eq!(map.get("x-team").unwrap(), "core");

        let mut bad = HashMap::new();
        bad.insert("bad header".to_string(), "v".to_string());
        assert!(matches!(header_map(&bad), Err(McpError::ConnectionFailed(_))));
    }

    #[tokio::test]
    async fn test_connect_stdio_missing_binary() {
        let result = McpClient::connect_stdio(
            "ghost",
            "mcpshell-definitely-not-a-real-binary",
            &[],
            &HashMap::new(),
            Arc::new(NoOpLogger::new()),
        )
        .await;
        assert!(result.is_err());
    }
}
