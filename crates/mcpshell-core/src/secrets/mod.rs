//! API key lookup
//!
//! Keys come from, in order: an explicit `--api-key` flag (held in a
//! `MemorySecretStore`) and the environment (`EnvSecretStore`).

mod traits;
mod env_store;
mod memory_store;
mod chain_store;

pub use traits::{SecretStore, SecretInfo, SecretStoreError, SecretStoreResult};
pub use env_store::EnvSecretStore;
pub use memory_store::MemorySecretStore;
pub use chain_store::ChainSecretStore;
