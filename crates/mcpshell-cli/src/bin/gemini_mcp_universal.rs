//! Universal Gemini client
//!
//! Connects to every server in `mcp_servers.json`, registers all of their
//! tools, prints the generated system instruction and starts the chat.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use mcpshell_cli::model::gemini_provider;
use mcpshell_cli::repl::run_chat_repl;
use mcpshell_cli::telemetry::init_tracing;
use mcpshell_cli::term::{paint, BOLD, GRAY, GREEN, RED, YELLOW};
use mcpshell_core::config::ConfigError;
use mcpshell_core::{
    discover_capabilities, synthesize_instruction, CapabilityRegistry, ChatSession, Logger,
    McpConfig, NamingScheme, ServerPool, ToolRouter, TracingLogger,
};

#[derive(Parser, Debug)]
#[command(author, version, about = "Chat with Gemini using tools from every configured MCP server", long_about = None)]
struct Cli {
    /// Server list; defaults to ./mcp_servers.json, then the user config dir
    #[arg(short, long, env = "MCP_SERVERS_CONFIG")]
    config: Option<PathBuf>,

    /// Tool naming: always prefix with the server name, or never
    #[arg(long, value_parser = ["auto", "prefixed", "bare"], default_value = "auto")]
    naming: String,
}

fn naming_scheme(value: &str) -> NamingScheme {
    match value {
        "prefixed" => NamingScheme::Prefixed,
        "bare" => NamingScheme::Bare,
        _ => NamingScheme::Auto,
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("warn");
    let cli = Cli::parse();
    let logger: Arc<dyn Logger> = Arc::new(TracingLogger::with_component("universal"));

    println!("{}", paint(BOLD, "--- Gemini Universal MCP Client ---"));

    let config = match McpConfig::discover(cli.config.as_deref()) {
        Ok(config) => config,
        Err(ConfigError::NotFound(paths)) => {
            let tried: Vec<String> = paths.iter().map(|p| p.display().to_string()).collect();
            println!("{}", paint(RED, format!("❌ Configuration file not found at: {}", tried.join(", "))));
            println!("{}", paint(GRAY, "   Please make sure 'mcp_servers.json' exists."));
            return Ok(());
        }
        Err(e) => {
            println!("{}", paint(RED, format!("❌ {}", e)));
            return Ok(());
        }
    };

    let provider = match gemini_provider(logger.clone()) {
        Ok(provider) => provider,
        Err(e) => {
            println!("{}", paint(RED, format!("❌ Failed to initialize clients: {:#}", e)));
            return Ok(());
        }
    };

    println!("{}", paint(BOLD, "🤖 Starting dynamic discovery of all MCP server capabilities..."));
    let (pool, failures) = ServerPool::connect(&config, logger.clone()).await;
    for failure in &failures {
        println!(
            "{}",
            paint(RED, format!("❌ Error connecting to '{}': {}", failure.server, failure.error))
        );
    }
    if !failures.is_empty() {
        println!("{}", paint(GRAY, "   Please ensure all configured MCP servers are running and accessible."));
    }

    let mut registry = CapabilityRegistry::with_policy(config.duplicate_policy);
    let report = discover_capabilities(
        pool.transports(),
        &mut registry,
        naming_scheme(&cli.naming).for_configured(config.servers.len()),
        &*logger,
    )
    .await;

    for skipped in &report.skipped {
        println!(
            "{}",
            paint(RED, format!("❌ Error during capability discovery on '{}': {}", skipped.server, skipped.error))
        );
    }
    for collision in &report.collisions {
        println!(
            "{}",
            paint(
                YELLOW,
                format!(
                    "⚠️ Duplicate tool '{}' from '{}' and '{}' ({}): keeping '{}'",
                    collision.qualified_name,
                    collision.kept_server,
                    collision.dropped_server,
                    collision.policy,
                    collision.kept_server
                )
            )
        );
    }
    if report.is_empty() {
        println!("{}", paint(YELLOW, "⚠️ No tools found on any connected servers."));
    } else {
        for name in &report.registered {
            println!("  {}", paint(GREEN, format!("✅ Discovered and registered tool: {}", name)));
        }
        println!("{}", paint(GREEN, "✨ Capability discovery complete!"));
    }

    let instruction = synthesize_instruction(&registry, chrono::Local::now().date_naive());
    println!("\n--- Generated System Instruction for LLM ---");
    println!("{}", instruction);
    println!("------------------------------------------\n");

    let router = ToolRouter::new(Arc::new(registry), pool, logger.clone());
    let mut session = ChatSession::new(provider, logger.clone())
        .with_system_instruction(instruction)
        .with_dispatcher(Arc::new(router));

    println!("{}", paint(BOLD, "🤖 Universal MCP Agent Ready. Type 'exit' to quit."));
    println!("{}\n", paint(GRAY, "Commands: 'exit', 'history', 'clear', 'stats'"));

    run_chat_repl(&mut session).await
}
