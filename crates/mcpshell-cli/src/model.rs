//! Gemini provider from the environment

use std::sync::Arc;

use anyhow::{Context, Result};
use mcpshell_core::config::load_dotenv;
use mcpshell_core::{EnvSecretStore, GenaiProvider, Logger, ModelSettings, Provider};

/// Load `.env`, read model settings and build the Gemini provider
pub fn gemini_provider(logger: Arc<dyn Logger>) -> Result<Arc<dyn Provider>> {
    if let Some(path) = load_dotenv().context("Failed to read .env")? {
        logger.debug(&format!("Loaded environment from {}", path.display()));
    }

    let settings = ModelSettings::from_env(&EnvSecretStore)
        .context("Set GEMINI_API_KEY in the environment or a .env file")?;
    logger.info(&format!(
        "Using model {} ({})",
        settings.model,
        settings.base_url.as_deref().unwrap_or("default endpoint")
    ));

    let provider = GenaiProvider::new(settings, logger).context("Failed to create Gemini client")?;
    Ok(Arc::new(provider))
}
