//! Environment variable secret store

use std::collections::HashMap;
use std::env;

use once_cell::sync::Lazy;

use super::traits::SecretStore;

/// Provider names and the variables checked for them, in order
static ENV_VAR_MAP: Lazy<HashMap<&'static str, Vec<&'static str>>> = Lazy::new(|| {
    let mut m = HashMap::new();
    m.insert("gemini", vec!["GEMINI_API_KEY", "GOOGLE_API_KEY"]);
    m.insert("google", vec!["GEMINI_API_KEY", "GOOGLE_API_KEY"]);
    m
});

/// Secret store backed by the process environment
///
/// `.env` files are folded in by `config::load_dotenv` before the store is
/// consulted. Unknown keys are treated as variable names.
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvSecretStore;

impl EnvSecretStore {
    pub fn new() -> Self {
        Self
    }

    /// Variables consulted for `key`
    pub fn env_vars_for(key: &str) -> Vec<String> {
        match ENV_VAR_MAP.get(key.to_lowercase().as_str()) {
            Some(vars) => vars.iter().map(|v| v.to_string()).collect(),
            None => vec![key.to_string()],
        }
    }
}

impl SecretStore for EnvSecretStore {
    fn name(&self) -> &str {
        "env"
    }

    fn get(&self, key: &str) -> Option<String> {
        Self::env_vars_for(key)
            .into_iter()
            .filter_map(|var| env::var(var).ok())
            .find(|value| !value.trim().is_empty())
    }
}
