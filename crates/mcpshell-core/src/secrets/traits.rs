//! Core traits and types for API key lookup

use thiserror::Error;

/// Where a secret was found
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretInfo {
    pub available: bool,
    /// Name of the store that answered (useful for chain stores)
    pub source: String,
}

impl SecretInfo {
    pub fn new(available: bool, source: impl Into<String>) -> Self {
        Self {
            available,
            source: source.into(),
        }
    }

    pub fn not_found() -> Self {
        Self::new(false, "none")
    }
}

/// Errors raised when a required secret cannot be produced
#[derive(Error, Debug)]
pub enum SecretStoreError {
    #[error("Secret not found: {key} (checked: {checked})")]
    NotFound { key: String, checked: String },

    #[error("No secret stores configured")]
    NoStores,
}

pub type SecretStoreResult<T> = Result<T, SecretStoreError>;

/// Read-only source of API keys
///
/// A key may be a provider name (`gemini`), which the store maps to its own
/// naming scheme, or a literal variable name (`GEMINI_API_KEY`).
pub trait SecretStore: Send + Sync {
    /// Human-readable name of this store
    fn name(&self) -> &str;

    /// Retrieve a secret by key
    fn get(&self, key: &str) -> Option<String>;

    /// Check if a secret exists
    fn has(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Get information about a secret
    fn get_info(&self, key: &str) -> SecretInfo {
        if self.has(key) {
            SecretInfo::new(true, self.name())
        } else {
            SecretInfo::not_found()
        }
    }

    /// Like `get`, but a missing secret is an error
    fn require(&self, key: &str) -> SecretStoreResult<String> {
        self.get(key).ok_or_else(|| SecretStoreError::NotFound {
            key: key.to_string(),
            checked: self.name().to_string(),
        })
    }
}
