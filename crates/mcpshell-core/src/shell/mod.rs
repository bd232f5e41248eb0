//! Command execution tools
//!
//! A `ShellSession` pairs a `WorkingDirectory` with a `CommandRunner`.
//! Commands run through a real shell, so metacharacters are honored and
//! anyone with tool access can run anything as the server's user.

mod directory;
mod error;
mod platform;
mod request;
mod runner;
mod session;

pub use directory::WorkingDirectory;
pub use error::{ShellError, ShellResult};
pub use platform::os_name;
pub use request::{ExecuteArgs, SetDirectoryArgs, ShellRequest, ShellResponse};
pub use runner::{CommandOutput, CommandRunner, ShellFlavor, DEFAULT_COMMAND_TIMEOUT};
pub use session::ShellSession;
