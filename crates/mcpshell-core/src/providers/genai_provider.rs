//! GenaiProvider - Gemini through the genai crate

use async_trait::async_trait;
use futures::{stream, StreamExt};
use std::sync::Arc;

use genai::chat::{ChatRequest, ChatStreamEvent};

use crate::config::ModelSettings;
use crate::logging::Logger;
use crate::types::{CancellationToken, ChatMessage};

use super::error::{ProviderError, ProviderResult};
use super::genai_adapter::{
    create_client, from_genai_event, to_genai_messages, to_genai_options, to_genai_tools,
};
use super::traits::{Provider, StreamChatOptions, StreamResponse};

const PROVIDER_ID: &str = "gemini";

/// Gemini chat provider
pub struct GenaiProvider {
    settings: ModelSettings,
    client: genai::Client,
    logger: Arc<dyn Logger>,
}

impl GenaiProvider {
    pub fn new(settings: ModelSettings, logger: Arc<dyn Logger>) -> ProviderResult<Self> {
        if settings.api_key.trim().is_empty() {
            return Err(ProviderError::missing_api_key(PROVIDER_ID));
        }
        let client = create_client(&settings.api_key, settings.base_url.as_deref());
        Ok(Self {
            settings,
            client,
            logger,
        })
    }

    pub fn settings(&self) -> &ModelSettings {
        &self.settings
    }
}

#[async_trait]
impl Provider for GenaiProvider {
    fn name(&self) -> &str {
        PROVIDER_ID
    }

    fn model(&self) -> &str {
        &self.settings.model
    }

    async fn stream_chat(
        &self,
        messages: Vec<ChatMessage>,
        options: StreamChatOptions,
        cancel_token: CancellationToken,
    ) -> ProviderResult<StreamResponse> {
        self.logger.info(&format!(
            "[GenaiProvider] stream_chat called: model={}, messages={}",
            self.settings.model,
            messages.len()
        ));

        let mut chat_req = ChatRequest::new(to_genai_messages(messages)?);

        if let Some(tools) = &options.tools {
            chat_req = chat_req.with_tools(to_genai_tools(tools.clone()));
        }

        let options = StreamChatOptions {
            temperature: options.temperature.or(Some(self.settings.temperature as f32)),
            max_tokens: options.max_tokens.or(self.settings.max_tokens),
            ..options
        };
        let genai_options = to_genai_options(&options);

        let chat_stream = self
            .client
            .exec_chat_stream(&self.settings.model, chat_req, Some(&genai_options))
            .await
            .map_err(|e| ProviderError::api_error(PROVIDER_ID, 500, e.to_string()))?;

        self.logger.debug("[GenaiProvider] Stream started");

        let logger = Arc::clone(&self.logger);

        let stream = chat_stream
            .stream
            .map(move |result| {
                if cancel_token.is_cancelled() {
                    logger.info("[GenaiProvider] Stream cancelled");
                    return vec![Err(ProviderError::Cancelled)];
                }

                match result {
                    Ok(event) => {
                        match &event {
                            ChatStreamEvent::Chunk(c) => logger.debug(&format!(
                                "[GenaiProvider] Chunk ({} chars)",
                                c.content.len()
                            )),
                            ChatStreamEvent::End(_) => logger.debug("[GenaiProvider] End"),
                            _ => {}
                        }
                        from_genai_event(event)
                    }
                    Err(e) => {
                        logger.error(&format!("[GenaiProvider] Stream error: {}", e));
                        vec![Err(ProviderError::api_error(PROVIDER_ID, 500, e.to_string()))]
                    }
                }
            })
            .flat_map(stream::iter);

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;

    #[test]
    fn test_requires_key() {
        let result = GenaiProvider::new(ModelSettings::new(" "), Arc::new(NoOpLogger::new()));
        assert!(matches!(result, Err(ProviderError::MissingApiKey { .. })));
    }

    #[test]
    fn test_name_and_model() {
        let settings = ModelSettings::new("test-key")
            .with_model("gemini-2.5-flash")
            .with_base_url("http://localhost:9999");
        let provider = GenaiProvider::new(settings, Arc::new(NoOpLogger::new())).unwrap();
        assert_eq!(provider.name(), "gemini");
        assert_eq!(provider.model(), "gemini-2.5-flash");
        assert_eq!(provider.settings().base_url.as_deref(), Some("http://localhost:9999"));
    }
}
