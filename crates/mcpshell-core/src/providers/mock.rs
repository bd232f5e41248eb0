//! Mock provider for testing
//!
//! Deterministic responses without network access, including scripted
//! tool calls so the chat loop can be exercised end to end.

use async_trait::async_trait;
use futures::{stream, StreamExt};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use super::error::{ProviderError, ProviderResult};
use super::traits::{Provider, StreamChatOptions, StreamResponse};
use crate::logging::Logger;
use crate::types::{CancellationToken, ChatMessage, MessageRole, StreamChunk, ToolCall};

/// One scripted model response
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MockTurn {
    pub chunks: Vec<String>,
    pub tool_calls: Vec<ToolCall>,
}

impl MockTurn {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            chunks: vec![text.into()],
            tool_calls: vec![],
        }
    }

    pub fn tool_call(call: ToolCall) -> Self {
        Self {
            chunks: vec![],
            tool_calls: vec![call],
        }
    }

    pub fn with_chunk(mut self, chunk: impl Into<String>) -> Self {
        self.chunks.push(chunk.into());
        self
    }

    pub fn with_tool_call(mut self, call: ToolCall) -> Self {
        self.tool_calls.push(call);
        self
    }
}

/// Mock response mode
#[derive(Debug, Clone, Default)]
pub enum MockMode {
    /// Echo back the last user message
    #[default]
    Echo,
    /// Return a fixed response
    Fixed(String),
    /// Play scripted turns in order, one per request; then answer with empty text
    Script(Vec<MockTurn>),
    /// Fail after `delay_chunks` text chunks
    Error { message: String, delay_chunks: usize },
}

/// What the provider was asked, for assertions
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub messages: Vec<ChatMessage>,
    pub options: StreamChatOptions,
}

/// Mock LLM provider for testing
pub struct MockProvider {
    mode: MockMode,
    script: Mutex<VecDeque<MockTurn>>,
    requests: Mutex<Vec<RecordedRequest>>,
    chunk_delay_ms: u64,
    logger: Arc<dyn Logger>,
}

impl MockProvider {
    pub fn new(mode: MockMode, logger: Arc<dyn Logger>) -> Self {
        let script = match &mode {
            MockMode::Script(turns) => turns.iter().cloned().collect(),
            _ => VecDeque::new(),
        };
        Self {
            mode,
            script: Mutex::new(script),
            requests: Mutex::new(Vec::new()),
            chunk_delay_ms: 0,
            logger,
        }
    }

    pub fn echo(logger: Arc<dyn Logger>) -> Self {
        Self::new(MockMode::Echo, logger)
    }

    pub fn fixed(response: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self::new(MockMode::Fixed(response.into()), logger)
    }

    pub fn scripted(turns: Vec<MockTurn>, logger: Arc<dyn Logger>) -> Self {
        Self::new(MockMode::Script(turns), logger)
    }

    pub fn error(message: impl Into<String>, logger: Arc<dyn Logger>) -> Self {
        Self::new(
            MockMode::Error {
                message: message.into(),
                delay_chunks: 0,
            },
            logger,
        )
    }

    /// Delay between chunks
    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.chunk_delay_ms = delay_ms;
        self
    }

    /// Requests received so far
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    fn last_user_text(messages: &[ChatMessage]) -> String {
        messages
            .iter()
            .rev()
            .filter(|m| m.role == MessageRole::User)
            .map(|m| m.joined_text())
            .find(|t| !t.is_empty())
            .unwrap_or_else(|| "Hello from MockProvider!".to_string())
    }

    fn next_turn(&self, messages: &[ChatMessage]) -> (MockTurn, Option<String>) {
        match &self.mode {
            MockMode::Echo => (
                MockTurn::text(format!("Echo: {}", Self::last_user_text(messages))),
                None,
            ),
            MockMode::Fixed(response) => (MockTurn::text(response.clone()), None),
            MockMode::Script(_) => (self.script.lock().pop_front().unwrap_or_default(), None),
            MockMode::Error {
                message,
                delay_chunks,
            } => {
                let turn = MockTurn {
                    chunks: (0..*delay_chunks)
                        .map(|i| format!("Chunk {} before error. ", i))
                        .collect(),
                    tool_calls: vec![],
                };
                (turn, Some(message.clone()))
            }
        }
    }
}

#[async_trait]
impl Provider for MockProvider {
    fn name(&self) -> &str {
        "mock"
    }

    fn model(&self) -> &str {
        "mock-model"
    }

    async fn stream_chat(
        &self,
        messages: Vec<ChatMessage>,
        options: StreamChatOptions,
        cancel_token: CancellationToken,
    ) -> ProviderResult<StreamResponse> {
        let (turn, error) = self.next_turn(&messages);
        self.logger.debug(&format!(
            "MockProvider: {} chunk(s), {} tool call(s)",
            turn.chunks.len(),
            turn.tool_calls.len()
        ));
        self.requests.lock().push(RecordedRequest { messages, options });

        let mut items: Vec<ProviderResult<StreamChunk>> =
            turn.chunks.into_iter().map(|c| Ok(StreamChunk::text(c))).collect();
        items.extend(turn.tool_calls.into_iter().map(|c| Ok(StreamChunk::tool_call(c))));
        if let Some(message) = error {
            items.push(Err(ProviderError::Other(format!("Mock error: {}", message))));
        }

        let delay_ms = self.chunk_delay_ms;
        let stream = stream::iter(items.into_iter().enumerate()).then(move |(i, item)| {
            let cancel = cancel_token.clone();
            async move {
                if i > 0 && delay_ms > 0 {
                    tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                }
                if cancel.is_cancelled() {
                    return Err(ProviderError::Cancelled);
                }
                item
            }
        });

        Ok(Box::pin(stream))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use serde_json::json;

    fn test_logger() -> Arc<dyn Logger> {
        Arc::new(NoOpLogger::new())
    }

    async fn collect(provider: &MockProvider, input: &str) -> Vec<ProviderResult<StreamChunk>> {
        provider
            .stream_chat(vec![ChatMessage::user(input)], StreamChatOptions::default(), CancellationToken::new())
            .await
            .expect("stream should start")
            .collect()
            .await
    }

    #[tokio::test]
    async fn test_echo_mode() {
        let provider = MockProvider::echo(test_logger());
        let chunks = collect(&provider, "Hello, world!").await;
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].as_ref().unwrap().as_text(), Some("Echo: Hello, world!"));
    }

    #[tokio::test]
    async fn test_fixed_mode() {
        let provider = MockProvider::fixed("This is a test response.", test_logger());
        let chunks = collect(&provider, "Anything").await;
        assert_eq!(chunks[0].as_ref().unwrap().as_text(), Some("This is a test response."));
    }

    #[tokio::test]
    async fn test_script_plays_in_order() {
        let call = ToolCall::new("c1", "execute_bash", json!({"cmd": "ls"}));
        let provider = MockProvider::scripted(
            vec![
                MockTurn::text("Let me look. ").with_tool_call(call.clone()),
                MockTurn::text("Done."),
            ],
            test_logger(),
        );

        let first = collect(&provider, "list files").await;
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].as_ref().unwrap().as_text(), Some("Let me look. "));
        assert_eq!(first[1].as_ref().unwrap().as_tool_call(), Some(&call));

        let second = collect(&provider, "next").await;
        assert_eq!(second[0].as_ref().unwrap().as_text(), Some("Done."));

        // Script exhausted
        assert!(collect(&provider, "again").await.is_empty());
        assert_eq!(provider.request_count(), 3);
        assert_eq!(provider.requests()[1].messages[0].joined_text(), "next");
    }

    #[tokio::test]
    async fn test_error_mode() {
        let provider = MockProvider::error("Test error message", test_logger());
        let chunks = collect(&provider, "Anything").await;
        assert_eq!(chunks.len(), 1);
        assert!(chunks[0].is_err());
    }

    #[tokio::test]
    async fn test_cancellation() {
        let provider = MockProvider::scripted(
            vec![MockTurn::text("one").with_chunk("two").with_chunk("three")],
            test_logger(),
        )
        .with_delay(10);
        let cancel = CancellationToken::new();

        let mut stream = provider
            .stream_chat(vec![ChatMessage::user("go")], StreamChatOptions::default(), cancel.clone())
            .await
            .unwrap();

        assert!(stream.next().await.unwrap().is_ok());
        cancel.cancel();
        assert!(matches!(stream.next().await, Some(Err(ProviderError::Cancelled))));
    }
}
