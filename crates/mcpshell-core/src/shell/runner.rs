//! Subprocess execution with timeout and cancellation

use std::path::Path;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use tokio::process::Command;

use crate::logging::{truncate_for_log, Logger};
use crate::types::CancellationToken;

use super::error::{ShellError, ShellResult};

/// Default limit for a single command
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(300);

/// Output is cut to this many characters in log lines
const LOG_PREVIEW_CHARS: usize = 200;

/// Command interpreter used to run command strings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ShellFlavor {
    /// `bash -c`
    Bash,
    /// `sh -c`, or `cmd /C` on Windows
    #[default]
    System,
}

impl ShellFlavor {
    /// Program and flag preceding the command string
    pub fn program(&self) -> (&'static str, &'static str) {
        match self {
            ShellFlavor::Bash => ("bash", "-c"),
            ShellFlavor::System if cfg!(windows) => ("cmd", "/C"),
            ShellFlavor::System => ("sh", "-c"),
        }
    }

    /// Tool-facing name, as in "Executing bash command"
    pub fn label(&self) -> &'static str {
        match self {
            ShellFlavor::Bash => "bash",
            ShellFlavor::System => "shell",
        }
    }

    fn command(&self, cmd: &str) -> Command {
        let (program, flag) = self.program();
        let mut command = Command::new(program);
        command.arg(flag).arg(cmd);
        command
    }
}

/// Captured result of one command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    pub stdout: String,
    pub stderr: String,
    /// `None` when the process was ended by a signal
    pub exit_code: Option<i32>,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.exit_code == Some(0)
    }
}

/// Runs command strings through a shell
#[derive(Clone)]
pub struct CommandRunner {
    flavor: ShellFlavor,
    default_timeout: Duration,
    logger: Arc<dyn Logger>,
}

impl CommandRunner {
    pub fn new(flavor: ShellFlavor, logger: Arc<dyn Logger>) -> Self {
        Self {
            flavor,
            default_timeout: DEFAULT_COMMAND_TIMEOUT,
            logger,
        }
    }

    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    pub fn flavor(&self) -> ShellFlavor {
        self.flavor
    }

    pub fn default_timeout(&self) -> Duration {
        self.default_timeout
    }

    /// Run `cmd` in `cwd` and wait for it
    ///
    /// `timeout` falls back to the runner's default. On timeout or
    /// cancellation the whole process group is killed.
    pub async fn run(
        &self,
        cmd: &str,
        cwd: &Path,
        timeout: Option<Duration>,
        cancel: &CancellationToken,
    ) -> ShellResult<CommandOutput> {
        if cmd.trim().is_empty() {
            return Err(ShellError::EmptyCommand);
        }
        let timeout = timeout.unwrap_or(self.default_timeout);
        let label = self.flavor.label();

        self.logger.info(&format!("Executing {} command: {}", label, cmd));
        self.logger.info(&format!("Working directory: {}", cwd.display()));

        let mut command = self.flavor.command(cmd);
        command
            .current_dir(cwd)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        #[cfg(unix)]
        command.process_group(0);

        let child = command.spawn().map_err(|source| ShellError::Spawn {
            program: self.flavor.program().0.to_string(),
            source,
        })?;
        let pid = child.id();

        let output = tokio::select! {
            output = child.wait_with_output() => output?,
            _ = tokio::time::sleep(timeout) => {
                kill_process_group(pid);
                self.logger.error(&format!("Command timed out after {}s: {}", timeout.as_secs(), cmd));
                return Err(ShellError::TimedOut(timeout));
            }
            _ = cancel.cancelled() => {
                kill_process_group(pid);
                self.logger.warn(&format!("Command cancelled: {}", cmd));
                return Err(ShellError::Cancelled);
            }
        };

        let result = CommandOutput {
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            exit_code: output.status.code(),
        };

        match result.exit_code {
            Some(code) => self.logger.info(&format!("Command completed with return code: {}", code)),
            None => self.logger.info("Command terminated by signal"),
        }
        if !result.stdout.is_empty() {
            self.logger.info(&format!("stdout: {}", truncate_for_log(&result.stdout, LOG_PREVIEW_CHARS)));
        }
        if !result.stderr.is_empty() {
            self.logger.warn(&format!("stderr: {}", truncate_for_log(&result.stderr, LOG_PREVIEW_CHARS)));
        }

        Ok(result)
    }
}

impl std::fmt::Debug for CommandRunner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandRunner")
            .field("flavor", &self.flavor)
            .field("default_timeout", &self.default_timeout)
            .finish()
    }
}

/// Kill the group led by `pid`; the child was started as its own group leader
#[cfg(unix)]
fn kill_process_group(pid: Option<u32>) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    if let Some(pid) = pid.and_then(|p| i32::try_from(p).ok()) {
        // ESRCH just means everything already exited
        let _ = killpg(Pid::from_raw(pid), Signal::SIGKILL);
    }
}

/// Without process groups, `kill_on_drop` reaps the direct child
#[cfg(not(unix))]
fn kill_process_group(_pid: Option<u32>) {}
