//! Configuration loading
//!
//! - `McpConfig`: the `mcp_servers.json` server list
//! - `ModelSettings`: model API settings from the environment
//! - `load_dotenv`: `.env` discovery

mod error;
mod servers;
mod model;

pub use error::{ConfigError, ConfigResult};
pub use servers::{
    default_config_paths, expand_env_vars, McpConfig, RemoteServer, RemoteTransport,
    ServerEntry, StdioServer, CONFIG_FILE_NAME,
};
pub use model::{
    load_dotenv, mcp_server_url, ModelSettings, DEFAULT_MCP_SERVER_URL, DEFAULT_MODEL,
};
