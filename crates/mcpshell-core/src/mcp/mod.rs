//! MCP (Model Context Protocol) client side
//!
//! `McpClient` wraps an rmcp session to one server; `ToolTransport` is the
//! seam discovery and dispatch are written against; `ServerPool` holds one
//! transport per configured server.
//!
//! # Example
//!
//! ```rust,ignore
//! use mcpshell_core::mcp::McpClient;
//!
//! let client = McpClient::connect_http("bash", "http://localhost:8080/mcp", &headers, None, logger).await?;
//! let tools = client.list_tools().await?;
//! let output = client.call_tool("execute_bash", json!({ "cmd": "pwd" })).await?;
//! ```

mod client;
mod transport;
mod pool;

pub use client::{McpClient, McpError, McpResult};
pub use transport::{RemoteTool, ToolOutput, ToolTransport};
pub use pool::{ConnectFailure, ServerPool};
