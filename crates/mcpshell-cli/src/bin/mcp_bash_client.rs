//! Direct client for the bash MCP server
//!
//! `mcp-bash-client test` runs a scripted smoke test; without arguments it
//! opens a `bash>` prompt that sends each line to `execute_bash`.

use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use mcpshell_cli::telemetry::init_tracing;
use mcpshell_cli::term::print_flush;
use mcpshell_core::config::mcp_server_url;
use mcpshell_core::{Logger, McpClient, McpResult, ToolOutput, ToolTransport, TracingLogger};
use serde_json::json;
use tokio::io::{AsyncBufReadExt, BufReader};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// List tools, change to /tmp and run `pwd` and `ls -la`
    Test,
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Talk to the bash MCP server directly", long_about = None)]
struct Cli {
    /// Run the scripted smoke test instead of the interactive prompt
    #[arg(value_enum)]
    mode: Option<Mode>,

    /// MCP endpoint of the bash server
    #[arg(long, env = "MCP_SERVER_URL")]
    server_url: Option<String>,
}

fn describe(output: &ToolOutput) -> String {
    let status = if output.is_error { "error" } else { "ok" };
    format!("{} {:?}", status, output.blocks)
}

async fn smoke_test(client: &McpClient, logger: &dyn Logger) -> Result<()> {
    let tools = client.list_tools().await.context("Failed to list tools")?;
    let names: Vec<&str> = tools.iter().map(|t| t.name.as_str()).collect();
    logger.info(&format!("Available tools: {:?}", names));

    logger.info("Testing set_cwd...");
    let result = client.call_tool("set_cwd", json!({"path": "/tmp"})).await?;
    logger.info(&format!("set_cwd result: {}", describe(&result)));

    logger.info("Testing execute_bash with pwd...");
    let result = client.call_tool("execute_bash", json!({"cmd": "pwd"})).await?;
    logger.info(&format!("pwd result: {}", describe(&result)));

    logger.info("Testing execute_bash with ls -la...");
    let result = client.call_tool("execute_bash", json!({"cmd": "ls -la"})).await?;
    logger.info(&format!("ls result: {}", describe(&result)));

    Ok(())
}

fn print_output(output: &ToolOutput) {
    if output.is_error {
        println!("error: {}", output.text().trim());
        return;
    }

    let stdout = output.block(0).trim();
    let stderr = output.block(1).trim();
    if !stdout.is_empty() {
        println!("output: {}", stdout);
    }
    if !stderr.is_empty() {
        println!("error: {}", stderr);
    }
}

async fn interactive(client: &McpClient, logger: &dyn Logger) -> Result<()> {
    logger.info("Connected. Type 'exit' to quit");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print_flush("bash> ");
        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read from stdin")?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(command) = line else { break };

        if command.trim().eq_ignore_ascii_case("exit") {
            break;
        }
        if command.trim().is_empty() {
            continue;
        }

        logger.info(&format!("Executing command: {}", command));
        match client.call_tool("execute_bash", json!({ "cmd": command })).await {
            Ok(output) => print_output(&output),
            Err(e) => logger.error(&format!("Error while executing command: {}", e)),
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing("info");
    let cli = Cli::parse();
    let logger: Arc<dyn Logger> = Arc::new(TracingLogger::with_component("bash-client"));

    let url = cli.server_url.unwrap_or_else(mcp_server_url);
    logger.info(&format!("Connecting to MCP bash server at {}...", url));
    let client = McpClient::connect_http("bash", &url, &HashMap::new(), None, logger.clone())
        .await
        .with_context(|| format!("Failed to connect to {}", url))?;
    logger.info("Connected!");

    let outcome = match cli.mode {
        Some(Mode::Test) => smoke_test(&client, &*logger).await,
        None => interactive(&client, &*logger).await,
    };

    finish(outcome, client.close().await, &*logger)
}

/// The session's outcome wins; a failed close is only logged
fn finish(outcome: Result<()>, closed: McpResult<()>, logger: &dyn Logger) -> Result<()> {
    if let Err(e) = closed {
        logger.warn(&format!("Error while closing the connection: {}", e));
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcpshell_core::{McpError, NoOpLogger};

    #[test]
    fn test_close_error_does_not_hide_outcome() {
        let failed = finish(
            Err(anyhow::anyhow!("set_cwd failed")),
            Err(McpError::Protocol("already closed".into())),
            &NoOpLogger,
        );
        assert_eq!(failed.unwrap_err().to_string(), "set_cwd failed");

        let ok = finish(Ok(()), Err(McpError::Protocol("already closed".into())), &NoOpLogger);
        assert!(ok.is_ok());
    }
}
