//! Chat session with an automatic tool-calling loop

use std::sync::Arc;

use futures::StreamExt;
use thiserror::Error;

use crate::logging::Logger;
use crate::providers::{Provider, ProviderError, StreamChatOptions};
use crate::tools::ToolDispatcher;
use crate::types::{
    CancellationToken, ChatMessage, ContentPart, MessageRole, StreamChunk, ToolCall, ToolResult,
};

use super::history::{conversation_stats, history_entries, ConversationStats, HistoryEntry};

/// Model round trips that may end in tool calls before the loop gives up
pub const DEFAULT_MAX_TOOL_TURNS: usize = 30;

/// Errors from a chat turn
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Provider error: {0}")]
    Provider(ProviderError),

    #[error("Chat turn cancelled")]
    Cancelled,
}

impl From<ProviderError> for ChatError {
    fn from(err: ProviderError) -> Self {
        match err {
            ProviderError::Cancelled => ChatError::Cancelled,
            other => ChatError::Provider(other),
        }
    }
}

pub type ChatResult<T> = Result<T, ChatError>;

/// Progress reported while a turn runs
#[derive(Debug, Clone, PartialEq)]
pub enum ChatEvent {
    /// Streamed model text
    Text(String),
    /// The model asked for a tool
    ToolCall(ToolCall),
    /// A tool answered
    ToolResult(ToolResult),
    /// The tool-turn cap was reached; the turn ends with what was produced
    TurnLimitReached(usize),
}

/// Outcome of one user turn
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ChatTurn {
    /// All model text produced during the turn
    pub text: String,
    /// Tool calls dispatched during the turn, in order
    pub tool_calls: Vec<ToolCall>,
    pub turn_limit_reached: bool,
}

/// A conversation with one model and an optional tool surface
pub struct ChatSession {
    provider: Arc<dyn Provider>,
    dispatcher: Option<Arc<dyn ToolDispatcher>>,
    system_instruction: Option<String>,
    history: Vec<ChatMessage>,
    temperature: Option<f32>,
    max_tokens: Option<u32>,
    max_tool_turns: usize,
    logger: Arc<dyn Logger>,
}

impl ChatSession {
    pub fn new(provider: Arc<dyn Provider>, logger: Arc<dyn Logger>) -> Self {
        Self {
            provider,
            dispatcher: None,
            system_instruction: None,
            history: Vec::new(),
            temperature: None,
            max_tokens: None,
            max_tool_turns: DEFAULT_MAX_TOOL_TURNS,
            logger,
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    /// Offer the dispatcher's tools to the model
    pub fn with_dispatcher(mut self, dispatcher: Arc<dyn ToolDispatcher>) -> Self {
        self.dispatcher = Some(dispatcher);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }

    pub fn with_max_tokens(mut self, max_tokens: u32) -> Self {
        self.max_tokens = Some(max_tokens);
        self
    }

    pub fn with_max_tool_turns(mut self, turns: usize) -> Self {
        self.max_tool_turns = turns;
        self
    }

    pub fn system_instruction(&self) -> Option<&str> {
        self.system_instruction.as_deref()
    }

    /// Conversation so far, without the system instruction
    pub fn history(&self) -> &[ChatMessage] {
        &self.history
    }

    pub fn history_entries(&self) -> Vec<HistoryEntry> {
        history_entries(&self.history)
    }

    pub fn stats(&self) -> ConversationStats {
        conversation_stats(&self.history)
    }

    /// Forget the conversation; the system instruction stays
    pub fn clear(&mut self) {
        self.logger.info(&format!(
            "[ChatSession] Clearing {} message(s)",
            self.history.len()
        ));
        self.history.clear();
    }

    fn options(&self) -> StreamChatOptions {
        let mut options = StreamChatOptions::new();
        options.temperature = self.temperature;
        options.max_tokens = self.max_tokens;
        match &self.dispatcher {
            Some(dispatcher) => options.with_tools(dispatcher.tools()),
            None => options,
        }
    }

    fn request_messages(&self) -> Vec<ChatMessage> {
        self.system_instruction
            .iter()
            .map(ChatMessage::system)
            .chain(self.history.iter().cloned())
            .collect()
    }

    async fn dispatch(&self, call: &ToolCall) -> ToolResult {
        match &self.dispatcher {
            Some(dispatcher) => dispatcher.dispatch(call).await,
            None => ToolResult::error(call, format!("Error: no tools are available to call '{}'", call.name)),
        }
    }

    /// Send user input and run the model until it stops calling tools
    ///
    /// On error the history is rolled back to where it was before the call.
    pub async fn send(
        &mut self,
        input: &str,
        cancel: CancellationToken,
        on_event: &mut (dyn FnMut(ChatEvent) + Send),
    ) -> ChatResult<ChatTurn> {
        let checkpoint = self.history.len();
        self.history.push(ChatMessage::user(input));

        let outcome = self.run_turn(&cancel, on_event).await;
        if outcome.is_err() {
            self.history.truncate(checkpoint);
        }
        outcome
    }

    /// Record the model's final text; an empty reply leaves no message
    fn push_reply(&mut self, text: String) {
        if text.is_empty() {
            self.logger.debug("[ChatSession] Empty model reply, nothing recorded");
            return;
        }
        self.history.push(ChatMessage::assistant(text));
    }

    async fn run_turn(
        &mut self,
        cancel: &CancellationToken,
        on_event: &mut (dyn FnMut(ChatEvent) + Send),
    ) -> ChatResult<ChatTurn> {
        let options = self.options();
        let mut turn = ChatTurn::default();
        let mut tool_turns = 0;

        loop {
            if cancel.is_cancelled() {
                return Err(ChatError::Cancelled);
            }

            let mut stream = self
                .provider
                .stream_chat(self.request_messages(), options.clone(), cancel.clone())
                .await?;

            let mut text = String::new();
            let mut calls = Vec::new();
            while let Some(chunk) = stream.next().await {
                match chunk? {
                    StreamChunk::Text { text: delta } => {
                        text.push_str(&delta);
                        on_event(ChatEvent::Text(delta));
                    }
                    StreamChunk::ToolCall { tool_call } => calls.push(tool_call),
                    StreamChunk::ToolCallDelta { .. } => {}
                }
            }
            turn.text.push_str(&text);

            if calls.is_empty() {
                self.push_reply(text);
                return Ok(turn);
            }

            if tool_turns >= self.max_tool_turns {
                self.logger.warn(&format!(
                    "[ChatSession] Stopping after {} tool turns; {} call(s) not executed",
                    tool_turns,
                    calls.len()
                ));
                on_event(ChatEvent::TurnLimitReached(tool_turns));
                self.push_reply(text);
                turn.turn_limit_reached = true;
                return Ok(turn);
            }
            tool_turns += 1;

            let mut parts = Vec::with_capacity(calls.len() + 1);
            if !text.is_empty() {
                parts.push(ContentPart::text(text));
            }
            parts.extend(
                calls
                    .iter()
                    .map(|c| ContentPart::tool_use(c.id.clone(), c.name.clone(), c.input.clone())),
            );
            self.history.push(ChatMessage::with_parts(MessageRole::Assistant, parts));

            let mut results = Vec::with_capacity(calls.len());
            for call in calls {
                if cancel.is_cancelled() {
                    return Err(ChatError::Cancelled);
                }
                self.logger.info(&format!("[ChatSession] Calling tool {}", call.name));
                on_event(ChatEvent::ToolCall(call.clone()));

                let result = self.dispatch(&call).await;
                on_event(ChatEvent::ToolResult(result.clone()));
                results.push(ContentPart::tool_result(
                    result.call_id,
                    result.name,
                    result.content,
                    result.is_error,
                ));
                turn.tool_calls.push(call);
            }
            self.history.push(ChatMessage::with_parts(MessageRole::User, results));
        }
    }
}
