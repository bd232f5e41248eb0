//! Model settings from the environment

use std::path::PathBuf;

use crate::secrets::SecretStore;

use super::error::{ConfigError, ConfigResult};

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_MCP_SERVER_URL: &str = "http://localhost:8080/mcp";

/// Everything needed to talk to the model API
#[derive(Clone, PartialEq)]
pub struct ModelSettings {
    pub api_key: String,
    /// Endpoint override from `GEMINI_BASE_URL`
    pub base_url: Option<String>,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: Option<u32>,
}

impl std::fmt::Debug for ModelSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelSettings")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .finish()
    }
}

impl ModelSettings {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: None,
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.0,
            max_tokens: None,
        }
    }

    /// Read `GEMINI_BASE_URL` and `GEMINI_MODEL`; the key comes from `secrets`
    pub fn from_env(secrets: &dyn SecretStore) -> ConfigResult<Self> {
        let api_key = secrets
            .get("gemini")
            .ok_or_else(|| ConfigError::MissingApiKey("GEMINI_API_KEY".to_string()))?;

        let mut settings = Self::new(api_key);
        settings.base_url = non_empty_var("GEMINI_BASE_URL");
        if let Some(model) = non_empty_var("GEMINI_MODEL") {
            settings.model = model;
        }
        Ok(settings)
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }
}

/// `MCP_SERVER_URL`, or the local default
pub fn mcp_server_url() -> String {
    non_empty_var("MCP_SERVER_URL").unwrap_or_else(|| DEFAULT_MCP_SERVER_URL.to_string())
}

/// Load the nearest `.env` (current directory or an ancestor)
///
/// Returns the file that was loaded. A missing file is not an error.
pub fn load_dotenv() -> ConfigResult<Option<PathBuf>> {
    match dotenvy::dotenv() {
        Ok(path) => Ok(Some(path)),
        Err(e) if e.not_found() => Ok(None),
        Err(e) => Err(ConfigError::Other(format!("Failed to load .env: {}", e))),
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::secrets::MemorySecretStore;

    #[test]
    fn test_missing_key_is_config_error() {
        let secrets = MemorySecretStore::new();
        let err = ModelSettings::from_env(&secrets).unwrap_err();
        assert!(matches!(err, ConfigError::MissingApiKey(_)));
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn test_from_env_defaults() {
        let secrets = MemorySecretStore::new().with_secret("gemini", "key-1");
        let settings = ModelSettings::from_env(&secrets).unwrap();
        assert_eq!(settings.api_key, "key-1");
        assert_eq!(settings.temperature, 0.0);
        assert!(!settings.model.is_empty());
    }

    #[test]
    fn test_builders() {
        let settings = ModelSettings::new("k")
            .with_model("gemini-2.0-flash")
            .with_base_url("http://proxy.local/")
            .with_max_tokens(1024);
        assert_eq!(settings.model, "gemini-2.0-flash");
        assert_eq!(settings.base_url.as_deref(), Some("http://proxy.local/"));
        assert_eq!(settings.max_tokens, Some(1024));
    }

    #[test]
    fn test_debug_redacts_key() {
        let rendered = format!("{:?}", ModelSettings::new("super-secret"));
        assert!(!rendered.contains("super-secret"));
    }
}
