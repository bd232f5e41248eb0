//! MCP server exposing `set_cwd` and `execute_bash` over streamable HTTP

use anyhow::Result;
use clap::Parser;
use mcpshell_cli::serve::{run_tool_server, ServerArgs, ToolServerKind};
use mcpshell_cli::telemetry::init_tracing;

#[derive(Parser, Debug)]
#[command(author, version, about = "Bash command MCP server", long_about = None)]
struct Cli {
    #[command(flatten)]
    server: ServerArgs,
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("info");
    let cli = Cli::parse();
    run_tool_server(ToolServerKind::Bash, cli.server).await
}
