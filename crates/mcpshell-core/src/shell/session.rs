//! One client's view of the shell tools

use std::sync::Arc;
use std::time::Duration;

use crate::logging::Logger;
use crate::types::CancellationToken;

use super::directory::WorkingDirectory;
use super::error::ShellResult;
use super::platform::os_name;
use super::request::{ShellRequest, ShellResponse};
use super::runner::CommandRunner;

/// Working directory plus runner, handling `ShellRequest`s
#[derive(Clone)]
pub struct ShellSession {
    directory: WorkingDirectory,
    runner: CommandRunner,
    logger: Arc<dyn Logger>,
}

impl std::fmt::Debug for ShellSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShellSession")
            .field("directory", &self.directory)
            .field("runner", &self.runner)
            .finish()
    }
}

impl ShellSession {
    pub fn new(directory: WorkingDirectory, runner: CommandRunner, logger: Arc<dyn Logger>) -> Self {
        Self {
            directory,
            runner,
            logger,
        }
    }

    pub fn directory(&self) -> &WorkingDirectory {
        &self.directory
    }

    pub fn runner(&self) -> &CommandRunner {
        &self.runner
    }

    /// Same runner, fresh directory state starting where this one is
    pub fn fork(&self) -> Self {
        Self {
            directory: self.directory.fork(),
            runner: self.runner.clone(),
            logger: self.logger.clone(),
        }
    }

    pub async fn handle(
        &self,
        request: ShellRequest,
        cancel: &CancellationToken,
    ) -> ShellResult<ShellResponse> {
        match request {
            ShellRequest::SetDirectory(args) => {
                self.logger.info(&format!(
                    "[ShellSession] Attempting to set working directory to: {}",
                    args.path
                ));
                match self.directory.set(&args.path) {
                    Ok(path) => {
                        self.logger.info(&format!(
                            "[ShellSession] Working directory successfully set to: {}",
                            path.display()
                        ));
                        Ok(ShellResponse::DirectoryChanged(path))
                    }
                    Err(e) => {
                        self.logger.error(&format!("[ShellSession] {}", e));
                        Err(e)
                    }
                }
            }
            ShellRequest::Execute(args) => {
                let timeout = args.timeout_secs.map(Duration::from_secs);
                let cwd = self.directory.get();
                let output = self.runner.run(&args.cmd, &cwd, timeout, cancel).await?;
                Ok(ShellResponse::Output(output))
            }
            ShellRequest::OsInfo => {
                self.logger.info("[ShellSession] Request for OS info received.");
                let name = os_name();
                self.logger.info(&format!("[ShellSession] Returning OS info: {}", name));
                Ok(ShellResponse::OsInfo(name))
            }
        }
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use crate::shell::{ExecuteArgs, SetDirectoryArgs, ShellError, ShellFlavor};
    use tempfile::tempdir;

    fn session(dir: &std::path::Path) -> ShellSession {
        let logger: Arc<dyn Logger> = Arc::new(NoOpLogger);
        ShellSession::new(
            WorkingDirectory::new(dir),
            CommandRunner::new(ShellFlavor::Bash, logger.clone()),
            logger,
        )
    }

    fn set(path: &std::path::Path) -> ShellRequest {
        ShellRequest::SetDirectory(SetDirectoryArgs {
            path: path.to_string_lossy().into_owned(),
        })
    }

    #[tokio::test]
    async fn test_set_directory_then_pwd() {
        let start = tempdir().unwrap();
        let target = tempdir().unwrap();
        let shell = session(start.path());
        let cancel = CancellationToken::new();

        let changed = shell.handle(set(target.path()), &cancel).await.unwrap();
        assert_eq!(changed, ShellResponse::DirectoryChanged(target.path().to_path_buf()));

        let response = shell
            .handle(ShellRequest::Execute(ExecuteArgs::new("pwd -P")), &cancel)
            .await
            .unwrap();
        let ShellResponse::Output(output) = response else {
            panic!("expected command output");
        };
        let expected = target.path().canonicalize().unwrap();
        assert_eq!(output.stdout.trim_end(), expected.to_string_lossy());
    }

    #[tokio::test]
    async fn test_invalid_directory() {
        let start = tempdir().unwrap();
        let shell = session(start.path());

        let err = shell
            .handle(set(&start.path().join("missing")), &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ShellError::InvalidDirectory(_)));
        assert_eq!(shell.directory().get(), start.path());
    }

    #[tokio::test]
    async fn test_execute_timeout_from_args() {
        let start = tempdir().unwrap();
        let shell = session(start.path());
        let request = ShellRequest::Execute(ExecuteArgs {
            cmd: "sleep 30".into(),
            timeout_secs: Some(1),
        });

        let err = shell.handle(request, &CancellationToken::new()).await.unwrap_err();
        assert!(matches!(err, ShellError::TimedOut(d) if d == Duration::from_secs(1)));
    }

    #[tokio::test]
    async fn test_os_info() {
        let start = tempdir().unwrap();
        let response = session(start.path())
            .handle(ShellRequest::OsInfo, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(response, ShellResponse::OsInfo(os_name()));
    }

    #[tokio::test]
    async fn test_forked_sessions_do_not_share_directory() {
        let start = tempdir().unwrap();
        let other = tempdir().unwrap();
        let first = session(start.path());
        let second = first.fork();

        first.handle(set(other.path()), &CancellationToken::new()).await.unwrap();
        assert_eq!(first.directory().get(), other.path());
        assert_eq!(second.directory().get(), start.path());
    }
}
