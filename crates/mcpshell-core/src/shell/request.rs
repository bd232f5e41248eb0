//! Typed requests and responses of the shell tools

use std::path::PathBuf;

use rmcp::schemars::{self, JsonSchema};
use serde::{Deserialize, Serialize};

use super::runner::CommandOutput;

/// Arguments of `set_cwd`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct SetDirectoryArgs {
    #[schemars(description = "The absolute path to use as the new working directory")]
    pub path: String,
}

/// Arguments of `execute_bash` / `execute_shell`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ExecuteArgs {
    #[schemars(description = "The shell command to execute")]
    pub cmd: String,
    #[schemars(description = "Seconds before the command is killed (default: server timeout)")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl ExecuteArgs {
    pub fn new(cmd: impl Into<String>) -> Self {
        Self {
            cmd: cmd.into(),
            timeout_secs: None,
        }
    }
}

/// One call to the shell tools
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellRequest {
    SetDirectory(SetDirectoryArgs),
    Execute(ExecuteArgs),
    OsInfo,
}

/// Result of a `ShellRequest`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellResponse {
    DirectoryChanged(PathBuf),
    Output(CommandOutput),
    OsInfo(String),
}

impl ShellResponse {
    /// Text blocks returned to tool clients
    ///
    /// Command output is always two blocks, stdout then stderr, even when
    /// either is empty.
    pub fn blocks(&self) -> Vec<String> {
        match self {
            ShellResponse::DirectoryChanged(path) => {
                vec![format!("Working directory set to: {}", path.display())]
            }
            ShellResponse::Output(output) => vec![output.stdout.clone(), output.stderr.clone()],
            ShellResponse::OsInfo(name) => vec![name.clone()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_execute_args_timeout_is_optional() {
        let args: ExecuteArgs = serde_json::from_value(json!({"cmd": "ls"})).unwrap();
        assert_eq!(args, ExecuteArgs::new("ls"));

        let args: ExecuteArgs =
            serde_json::from_value(json!({"cmd": "sleep 5", "timeout_secs": 1})).unwrap();
        assert_eq!(args.timeout_secs, Some(1));

        assert!(serde_json::from_value::<ExecuteArgs>(json!({"command": "ls"})).is_err());
    }

    #[test]
    fn test_schema_requires_path() {
        let schema = serde_json::to_value(schemars::schema_for!(SetDirectoryArgs)).unwrap();
        assert_eq!(schema["required"], json!(["path"]));
    }

    #[test]
    fn test_blocks() {
        let output = ShellResponse::Output(CommandOutput {
            stdout: "hello\n".into(),
            stderr: String::new(),
            exit_code: Some(0),
        });
        assert_eq!(output.blocks(), vec!["hello\n".to_string(), String::new()]);

        let changed = ShellResponse::DirectoryChanged(PathBuf::from("/tmp"));
        assert_eq!(changed.blocks(), vec!["Working directory set to: /tmp".to_string()]);
    }
}
