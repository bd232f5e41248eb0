//! Startup shared by the tool server binaries

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Args;
use mcpshell_core::server::{serve_http, BashServer, ServerConfig, ShellServer, MCP_PATH};
use mcpshell_core::{
    CommandRunner, FanoutLogger, FileLogger, Logger, ShellFlavor, ShellSession, TracingLogger,
    WorkingDirectory,
};

/// Flags common to both tool servers
#[derive(Args, Debug, Clone)]
pub struct ServerArgs {
    /// Address to bind
    #[arg(long, env = "MCP_HOST", default_value = "0.0.0.0")]
    pub host: String,

    /// Port to listen on
    #[arg(long, env = "MCP_PORT", default_value_t = 8080)]
    pub port: u16,

    /// Default command timeout in seconds
    #[arg(long, default_value_t = 300)]
    pub timeout_secs: u64,

    /// Log file, appended to alongside console output
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl ServerArgs {
    pub fn config(&self) -> ServerConfig {
        ServerConfig::new(self.host.clone(), self.port)
            .with_default_timeout(Duration::from_secs(self.timeout_secs))
    }
}

/// Which tool set to serve
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolServerKind {
    Bash,
    Shell,
}

impl ToolServerKind {
    /// Display name and default log file
    pub fn names(self) -> (&'static str, &'static str) {
        match self {
            ToolServerKind::Bash => ("Bash", "mcp_bash_server.log"),
            ToolServerKind::Shell => ("Shell", "mcp_shell_server.log"),
        }
    }

    fn flavor(self) -> ShellFlavor {
        match self {
            ToolServerKind::Bash => ShellFlavor::Bash,
            ToolServerKind::Shell => ShellFlavor::System,
        }
    }
}

fn build_logger(kind: ToolServerKind, args: &ServerArgs) -> Result<Arc<dyn Logger>> {
    let (name, default_log) = kind.names();
    let path = args.log_file.clone().unwrap_or_else(|| PathBuf::from(default_log));
    let file = FileLogger::open(&path, format!("mcp_{}_server", name.to_lowercase()))
        .with_context(|| format!("Failed to open log file {}", path.display()))?;

    Ok(Arc::new(
        FanoutLogger::default()
            .with(Arc::new(TracingLogger::with_component(format!("{}-server", name.to_lowercase()))))
            .with(Arc::new(file)),
    ))
}

/// Run a tool server until Ctrl-C
pub async fn run_tool_server(kind: ToolServerKind, args: ServerArgs) -> Result<()> {
    let logger = build_logger(kind, &args)?;
    let (name, _) = kind.names();
    let config = args.config();

    logger.info(&format!("MCP {} server initialized", name));
    logger.info(&format!("Server will run on {}:{}", config.host, config.port));

    let directory = WorkingDirectory::from_process().context("Failed to read current directory")?;
    logger.info(&format!("Initial working directory: {}", directory.get().display()));

    let runner = CommandRunner::new(kind.flavor(), logger.clone())
        .with_default_timeout(config.default_timeout);
    let shell = ShellSession::new(directory, runner, logger.clone());

    let listener = config
        .bind()
        .await
        .with_context(|| format!("Failed to bind {}", config.address()))?;

    logger.info(&format!("Starting MCP {} server with streamable-http transport...", name));
    let shutdown = {
        let logger = logger.clone();
        async move {
            let _ = tokio::signal::ctrl_c().await;
            logger.info("Server stopped by user");
        }
    };

    let served = match kind {
        ToolServerKind::Bash => {
            let template = BashServer::new(shell);
            serve_http(listener, MCP_PATH, move || Ok(template.fork()), shutdown, logger.clone()).await
        }
        ToolServerKind::Shell => {
            let template = ShellServer::new(shell);
            serve_http(listener, MCP_PATH, move || Ok(template.fork()), shutdown, logger.clone()).await
        }
    };

    if let Err(e) = &served {
        logger.error(&format!("Server error: {}", e));
    }
    served.context("MCP server failed")
}
