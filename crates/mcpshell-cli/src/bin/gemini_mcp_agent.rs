//! Gemini chat agent attached to one MCP server
//!
//! By default it talks to the bash server; `--shell` targets the OS-aware
//! shell server and tells the model which OS it is driving.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use mcpshell_cli::model::gemini_provider;
use mcpshell_cli::repl::run_chat_repl;
use mcpshell_cli::telemetry::init_tracing;
use mcpshell_cli::term::{paint, BOLD, GRAY, PURPLE, RED};
use mcpshell_core::config::mcp_server_url;
use mcpshell_core::instructions::{assistant_instruction, shell_environment_instruction};
use mcpshell_core::{
    discover_capabilities, CapabilityRegistry, ChatSession, Logger, McpClient, NamingScheme,
    ServerPool, ToolRouter, ToolTransport, TracingLogger,
};
use serde_json::json;

#[derive(Parser, Debug)]
#[command(author, version, about = "Chat with Gemini using tools from one MCP server", long_about = None)]
struct Cli {
    /// MCP endpoint to connect to
    #[arg(long, env = "MCP_SERVER_URL")]
    server_url: Option<String>,

    /// Target the shell server: ask for its OS and adapt the instruction
    #[arg(long)]
    shell: bool,
}

async fn host_os(client: &McpClient) -> Result<String> {
    let output = client.call_tool("get_os_info", json!({})).await?;
    if output.is_error {
        bail!("get_os_info failed: {}", output.text());
    }
    Ok(output.text().trim().to_string())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("warn");
    let cli = Cli::parse();
    let logger: Arc<dyn Logger> = Arc::new(TracingLogger::with_component("agent"));

    let provider = gemini_provider(logger.clone())?;
    let url = cli.server_url.unwrap_or_else(mcp_server_url);
    let server_name = if cli.shell { "shell" } else { "bash" };

    let client = match McpClient::connect_http(server_name, &url, &HashMap::new(), None, logger.clone()).await {
        Ok(client) => Arc::new(client),
        Err(e) => {
            println!("{}", paint(RED, format!("Error connecting to {} server: {}", server_name, e)));
            println!("{}", paint(GRAY, "Please ensure the server is running and accessible."));
            return Ok(());
        }
    };

    let now = chrono::Local::now();
    let instruction = if cli.shell {
        let os_info = host_os(&client).await.context("Failed to query the shell server")?;
        println!("🤖 Shell server is running on: {}", os_info);
        shell_environment_instruction(&os_info, &now)
    } else {
        assistant_instruction(&now)
    };

    let pool = ServerPool::new().with(client);
    let mut registry = CapabilityRegistry::new();
    let report =
        discover_capabilities(pool.transports(), &mut registry, NamingScheme::Auto, &*logger).await;
    logger.info(&format!("Registered {} tool(s)", report.registered.len()));

    let router = ToolRouter::new(Arc::new(registry), pool, logger.clone());
    let mut session = ChatSession::new(provider, logger.clone())
        .with_system_instruction(instruction)
        .with_dispatcher(Arc::new(router));

    println!("{}", paint(&format!("{BOLD}{PURPLE}"), "🤖 Gemini MCP Agent Ready"));
    println!("{}\n", paint(GRAY, "Type 'exit' to quit"));

    run_chat_repl(&mut session).await
}
