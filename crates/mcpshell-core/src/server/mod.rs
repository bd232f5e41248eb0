//! MCP tool servers
//!
//! ```text
//! axum ─► /mcp ─► StreamableHttpService ─► BashServer | ShellServer (one per session)
//!                                               │
//!                                          ShellSession ─► CommandRunner
//! ```

mod handlers;
mod http;

pub use handlers::{BashServer, ShellServer};
pub use http::{mcp_router, serve_http, ServerConfig, MCP_PATH};
