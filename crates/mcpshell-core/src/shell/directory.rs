//! Working directory state of one shell session

use std::path::{Path, PathBuf};
use std::sync::Arc;

use parking_lot::RwLock;

use super::error::{ShellError, ShellResult};

/// Directory commands run in
///
/// Clones share the same directory. Each MCP session owns its own
/// `WorkingDirectory`, so one client changing directory is invisible to
/// another.
#[derive(Debug, Clone)]
pub struct WorkingDirectory {
    current: Arc<RwLock<PathBuf>>,
}

impl WorkingDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            current: Arc::new(RwLock::new(path.into())),
        }
    }

    /// Start in the process's current directory
    pub fn from_process() -> ShellResult<Self> {
        Ok(Self::new(std::env::current_dir()?))
    }

    pub fn get(&self) -> PathBuf {
        self.current.read().clone()
    }

    /// Change directory
    ///
    /// Relative paths resolve against the current directory. The path is
    /// stored as given, not canonicalized. When `path` is not an existing
    /// directory the state is left untouched.
    pub fn set(&self, path: impl AsRef<Path>) -> ShellResult<PathBuf> {
        let path = path.as_ref();
        let mut current = self.current.write();
        let target = current.join(path);
        if path.as_os_str().is_empty() || !target.is_dir() {
            return Err(ShellError::InvalidDirectory(path.to_path_buf()));
        }
        *current = target.clone();
        Ok(target)
    }

    /// A new, independent state starting at the same directory
    pub fn fork(&self) -> Self {
        Self::new(self.get())
    }
}
