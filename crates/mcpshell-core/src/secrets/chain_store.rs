//! Chained secret store with fallback

use std::sync::Arc;

use super::traits::{SecretInfo, SecretStore, SecretStoreError, SecretStoreResult};

/// Consults several stores in order and returns the first hit
#[derive(Clone)]
pub struct ChainSecretStore {
    stores: Vec<Arc<dyn SecretStore>>,
    name: String,
}

impl ChainSecretStore {
    /// Build a chain; an empty list is rejected
    pub fn new(stores: Vec<Arc<dyn SecretStore>>) -> SecretStoreResult<Self> {
        if stores.is_empty() {
            return Err(SecretStoreError::NoStores);
        }
        let name = format!(
            "chain({})",
            stores.iter().map(|s| s.name()).collect::<Vec<_>>().join(" -> ")
        );
        Ok(Self { stores, name })
    }

    pub fn stores(&self) -> &[Arc<dyn SecretStore>] {
        &self.stores
    }
}

impl std::fmt::Debug for ChainSecretStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainSecretStore").field("name", &self.name).finish()
    }
}

impl SecretStore for ChainSecretStore {
    fn name(&self) -> &str {
        &self.name
    }

    fn get(&self, key: &str) -> Option<String> {
        self.stores.iter().find_map(|store| store.get(key))
    }

    fn get_info(&self, key: &str) -> SecretInfo {
        self.stores
            .iter()
            .find(|store| store.has(key))
            .map(|store| SecretInfo::new(true, store.name()))
            .unwrap_or_else(SecretInfo::not_found)
    }
}
