//! MCP handlers exposing the shell tools
//!
//! `BashServer` offers `set_cwd` and `execute_bash`; `ShellServer` adds
//! `get_os_info` and runs commands through the platform shell as
//! `execute_shell`.

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, Implementation, ServerCapabilities, ServerInfo};
use rmcp::service::{RequestContext, RoleServer};
use rmcp::ErrorData;
use rmcp::{tool, tool_handler, tool_router};

use crate::shell::{ExecuteArgs, SetDirectoryArgs, ShellRequest, ShellResult, ShellResponse, ShellSession};
use crate::types::CancellationToken;

/// Run a request, cancelling the command if the client cancels the call
async fn run(
    shell: &ShellSession,
    request: ShellRequest,
    context: Option<&RequestContext<RoleServer>>,
) -> Result<CallToolResult, ErrorData> {
    let cancel = CancellationToken::new();
    let watcher = context.map(|ctx| {
        let ct = ctx.ct.clone();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            ct.cancelled().await;
            trigger.cancel();
        })
    });

    let outcome = shell.handle(request, &cancel).await;
    if let Some(watcher) = watcher {
        watcher.abort();
    }
    Ok(to_call_result(outcome))
}

/// Tool failures are reported in-band so the model sees them
fn to_call_result(outcome: ShellResult<ShellResponse>) -> CallToolResult {
    match outcome {
        Ok(response) => {
            CallToolResult::success(response.blocks().into_iter().map(Content::text).collect())
        }
        Err(e) => CallToolResult::error(vec![Content::text(e.to_string())]),
    }
}

fn server_info(instructions: &str) -> ServerInfo {
    ServerInfo {
        capabilities: ServerCapabilities::builder().enable_tools().build(),
        server_info: Implementation::from_build_env(),
        instructions: Some(instructions.to_string()),
        ..Default::default()
    }
}

/// Bash command server
#[derive(Clone)]
pub struct BashServer {
    shell: ShellSession,
    tool_router: ToolRouter<Self>,
}

impl BashServer {
    pub fn new(shell: ShellSession) -> Self {
        Self {
            shell,
            tool_router: Self::tool_router(),
        }
    }

    pub fn shell(&self) -> &ShellSession {
        &self.shell
    }

    /// Handler for a new MCP session, with its own working directory
    pub fn fork(&self) -> Self {
        Self::new(self.shell.fork())
    }
}

#[tool_router]
impl BashServer {
    #[tool(description = "Set the session working directory for bash commands. Returns a confirmation message.")]
    async fn set_cwd(
        &self,
        Parameters(args): Parameters<SetDirectoryArgs>,
    ) -> Result<CallToolResult, ErrorData> {
        run(&self.shell, ShellRequest::SetDirectory(args), None).await
    }

    #[tool(description = "Run a bash command in the session working directory. Returns stdout and stderr as two text blocks.")]
    async fn execute_bash(
        &self,
        Parameters(args): Parameters<ExecuteArgs>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        run(&self.shell, ShellRequest::Execute(args), Some(&context)).await
    }
}

#[tool_handler]
impl rmcp::ServerHandler for BashServer {
    fn get_info(&self) -> ServerInfo {
        server_info(
            "Bash command execution.\n\n\
             Tools:\n\
             • set_cwd: change the working directory used by later commands\n\
             • execute_bash: run a command line with bash and return (stdout, stderr)",
        )
    }
}

/// OS-aware shell command server
#[derive(Clone)]
pub struct ShellServer {
    shell: ShellSession,
    tool_router: ToolRouter<Self>,
}

impl ShellServer {
    pub fn new(shell: ShellSession) -> Self {
        Self {
            shell,
            tool_router: Self::tool_router(),
        }
    }

    pub fn shell(&self) -> &ShellSession {
        &self.shell
    }

    /// Handler for a new MCP session, with its own working directory
    pub fn fork(&self) -> Self {
        Self::new(self.shell.fork())
    }
}

#[tool_router]
impl ShellServer {
    #[tool(description = "Get the operating system of the server, e.g. \"Linux\", \"Windows\" or \"Darwin\".")]
    async fn get_os_info(&self) -> Result<CallToolResult, ErrorData> {
        run(&self.shell, ShellRequest::OsInfo, None).await
    }

    #[tool(description = "Set the session working directory for shell commands. Returns a confirmation message.")]
    async fn set_cwd(
        &self,
        Parameters(args): Parameters<SetDirectoryArgs>,
    ) -> Result<CallToolResult, ErrorData> {
        run(&self.shell, ShellRequest::SetDirectory(args), None).await
    }

    #[tool(description = "Run a shell command in the session working directory. Returns stdout and stderr as two text blocks.")]
    async fn execute_shell(
        &self,
        Parameters(args): Parameters<ExecuteArgs>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        run(&self.shell, ShellRequest::Execute(args), Some(&context)).await
    }
}

#[tool_handler]
impl rmcp::ServerHandler for ShellServer {
    fn get_info(&self) -> ServerInfo {
        server_info(
            "Shell command execution for the server's operating system.\n\n\
             Tools:\n\
             • get_os_info: name of the host OS, to pick the right command syntax\n\
             • set_cwd: change the working directory used by later commands\n\
             • execute_shell: run a command line with the system shell and return (stdout, stderr)",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::{Logger, NoOpLogger};
    use crate::shell::{CommandRunner, ShellFlavor, WorkingDirectory};
    use rmcp::model::RawContent;
    use std::sync::Arc;
    use tempfile::tempdir;

    fn shell(dir: &std::path::Path, flavor: ShellFlavor) -> ShellSession {
        let logger: Arc<dyn Logger> = Arc::new(NoOpLogger);
        ShellSession::new(
            WorkingDirectory::new(dir),
            CommandRunner::new(flavor, logger.clone()),
            logger,
        )
    }

    fn texts(result: &CallToolResult) -> Vec<String> {
        result
            .content
            .iter()
            .map(|c| match &c.raw {
                RawContent::Text(t) => t.text.clone(),
                other => panic!("expected text content, got {:?}", other),
            })
            .collect()
    }

    #[test]
    fn test_bash_tool_list() {
        let dir = tempdir().unwrap();
        let server = BashServer::new(shell(dir.path(), ShellFlavor::Bash));
        let mut names: Vec<_> = server
            .tool_router
            .list_all()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["execute_bash", "set_cwd"]);
    }

    #[test]
    fn test_descriptions_name_session_directory() {
        let dir = tempdir().unwrap();
        let bash = BashServer::new(shell(dir.path(), ShellFlavor::Bash));
        let system = ShellServer::new(shell(dir.path(), ShellFlavor::System));

        let tools = bash
            .tool_router
            .list_all()
            .into_iter()
            .chain(system.tool_router.list_all());
        for tool in tools.filter(|t| t.name != "get_os_info") {
            let description = tool.description.as_deref().unwrap_or_default();
            assert!(description.contains("session working directory"), "{}", tool.name);
            assert!(!description.contains("global"), "{}", tool.name);
        }
    }

    #[test]
    fn test_shell_tool_list_and_info() {
        use rmcp::ServerHandler;

        let dir = tempdir().unwrap();
        let server = ShellServer::new(shell(dir.path(), ShellFlavor::System));
        let mut names: Vec<_> = server
            .tool_router
            .list_all()
            .into_iter()
            .map(|t| t.name.to_string())
            .collect();
        names.sort();
        assert_eq!(names, vec!["execute_shell", "get_os_info", "set_cwd"]);

        let instructions = server.get_info().instructions.unwrap();
        assert!(instructions.contains("get_os_info"));
    }

    #[tokio::test]
    async fn test_set_cwd_reports_invalid_directory_in_band() {
        let dir = tempdir().unwrap();
        let server = BashServer::new(shell(dir.path(), ShellFlavor::Bash));
        let missing = dir.path().join("missing");

        let result = server
            .set_cwd(Parameters(SetDirectoryArgs {
                path: missing.to_string_lossy().into_owned(),
            }))
            .await
            .unwrap();

        assert_eq!(result.is_error, Some(true));
        assert_eq!(texts(&result), vec![format!("Invalid directory: {}", missing.display())]);
        assert_eq!(server.shell().directory().get(), dir.path());
    }

    #[tokio::test]
    async fn test_set_cwd_confirms() {
        let start = tempdir().unwrap();
        let target = tempdir().unwrap();
        let server = ShellServer::new(shell(start.path(), ShellFlavor::System));

        let result = server
            .set_cwd(Parameters(SetDirectoryArgs {
                path: target.path().to_string_lossy().into_owned(),
            }))
            .await
            .unwrap();

        assert_ne!(result.is_error, Some(true));
        assert_eq!(
            texts(&result),
            vec![format!("Working directory set to: {}", target.path().display())]
        );
    }

    #[tokio::test]
    async fn test_get_os_info() {
        let dir = tempdir().unwrap();
        let server = ShellServer::new(shell(dir.path(), ShellFlavor::System));
        let result = server.get_os_info().await.unwrap();
        assert_eq!(texts(&result), vec![crate::shell::os_name()]);
    }

    #[test]
    fn test_fork_gets_own_directory() {
        let start = tempdir().unwrap();
        let other = tempdir().unwrap();
        let server = BashServer::new(shell(start.path(), ShellFlavor::Bash));
        let forked = server.fork();

        server.shell().directory().set(other.path()).unwrap();
        assert_eq!(forked.shell().directory().get(), start.path());
    }

    #[test]
    fn test_command_output_blocks() {
        let result = to_call_result(Ok(ShellResponse::Output(crate::shell::CommandOutput {
            stdout: String::new(),
            stderr: "err\n".into(),
            exit_code: Some(1),
        })));
        assert_ne!(result.is_error, Some(true));
        assert_eq!(texts(&result), vec![String::new(), "err\n".to_string()]);
    }
}
