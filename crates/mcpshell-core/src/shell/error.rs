//! Shell tool error types

use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

/// Failures of the command-execution tools
///
/// A non-zero exit status is not an error; it is reported in
/// `CommandOutput::exit_code`.
#[derive(Error, Debug)]
pub enum ShellError {
    #[error("Invalid directory: {}", .0.display())]
    InvalidDirectory(PathBuf),

    #[error("Command is empty")]
    EmptyCommand,

    #[error("Failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Command timed out after {}s", .0.as_secs())]
    TimedOut(Duration),

    #[error("Command cancelled")]
    Cancelled,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ShellResult<T> = Result<T, ShellError>;
