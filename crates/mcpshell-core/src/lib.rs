//! mcpshell core
//!
//! Chat with a Gemini model while it calls tools on MCP servers, and the
//! shell-execution MCP servers themselves.
//!
//! ## Tool discovery
//!
//! Every configured server is asked for its tool catalog once per session.
//! The results land in a `CapabilityRegistry`, which is rendered into the
//! system instruction and used to route the model's tool calls back to the
//! server that owns each tool.
//!
//! ```rust,ignore
//! use mcpshell_core::{discover_capabilities, synthesize_instruction, CapabilityRegistry};
//!
//! let (pool, _failed) = ServerPool::connect(&config, logger.clone()).await;
//! let mut registry = CapabilityRegistry::with_policy(config.duplicate_policy);
//! let report = discover_capabilities(pool.transports(), &mut registry, NamingScheme::Auto, &*logger).await;
//!
//! let instruction = synthesize_instruction(&registry, chrono::Local::now().date_naive());
//! let router = ToolRouter::new(Arc::new(registry), pool, logger.clone());
//! ```
//!
//! ## Shell servers
//!
//! `server::BashServer` and `server::ShellServer` expose `set_cwd` and
//! command execution over streamable HTTP at `/mcp`; see `shell` for the
//! execution model.

pub mod types;
pub mod secrets;
pub mod logging;
pub mod config;
pub mod providers;
pub mod mcp;
pub mod tools;
pub mod instructions;
pub mod chat;
pub mod shell;
pub mod server;

// Re-export commonly used types
pub use types::{
    ChatMessage, ContentPart, MessageRole, MessageContent,
    Tool, ToolCall, ToolResult,
    StreamChunk,
    CancellationToken,
};

pub use secrets::{
    SecretStore, SecretInfo, SecretStoreError, SecretStoreResult,
    EnvSecretStore, MemorySecretStore, ChainSecretStore,
};

pub use logging::{Logger, SharedLogger, NoOpLogger, TracingLogger, FileLogger, FanoutLogger};

pub use config::{ConfigError, ConfigResult, McpConfig, ModelSettings, ServerEntry};

pub use mcp::{McpClient, McpError, McpResult, RemoteTool, ServerPool, ToolOutput, ToolTransport};

pub use tools::{
    discover_capabilities, CapabilityRegistry, DiscoveryReport, MergePolicy, NamingScheme,
    RegistryError, ToolDescriptor, ToolDispatcher, ToolRouter,
};

pub use instructions::{synthesize_instruction, NO_TOOLS_INSTRUCTION};

pub use providers::{GenaiProvider, MockProvider, Provider, ProviderError, ProviderResult};

pub use chat::{ChatError, ChatEvent, ChatResult, ChatSession, ChatTurn, ConversationStats};

pub use shell::{
    CommandOutput, CommandRunner, ShellError, ShellFlavor, ShellResult, ShellSession,
    WorkingDirectory,
};

pub use server::{BashServer, ServerConfig, ShellServer};
