//! Adapter between mcpshell types and genai types

use std::future::Future;
use std::pin::Pin;

use genai::chat::{
    ChatMessage as GenaiMessage, ChatOptions as GenaiOptions, ChatRole as GenaiRole,
    ChatStreamEvent, MessageContent as GenaiContent, Tool as GenaiTool,
    ToolCall as GenaiToolCall, ToolResponse as GenaiToolResponse,
};
use genai::resolver::{AuthData, AuthResolver, Endpoint, ServiceTargetResolver};
use genai::{adapter::AdapterKind, Client, ModelIden, ServiceTarget};
use serde_json::{json, Value};

use crate::types::{
    ChatMessage, ContentPart, MessageContent, MessageRole, StreamChunk, Tool, ToolCall, ToolResult,
};

use super::error::{ProviderError, ProviderResult};
use super::traits::StreamChatOptions;

/// Public Gemini endpoint used when no override is configured
pub const GEMINI_DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/";

// ============================================================================
// Message Conversion: mcpshell -> genai
// ============================================================================

pub fn to_genai_role(role: MessageRole) -> GenaiRole {
    match role {
        MessageRole::System => GenaiRole::System,
        MessageRole::User => GenaiRole::User,
        MessageRole::Assistant => GenaiRole::Assistant,
    }
}

fn text_message(role: MessageRole, text: String) -> GenaiMessage {
    let content = GenaiContent::from(text);
    match role {
        MessageRole::System => GenaiMessage::system(content),
        MessageRole::User => GenaiMessage::user(content),
        MessageRole::Assistant => GenaiMessage::assistant(content),
    }
}

/// Build a genai tool call from its parts
pub fn to_genai_tool_call(id: String, name: String, input: Value) -> ProviderResult<GenaiToolCall> {
    let call = serde_json::from_value(json!({
        "call_id": id,
        "fn_name": name,
        "fn_arguments": input,
    }))?;
    Ok(call)
}

/// Convert one message; structured messages may expand into several
///
/// Text parts become a plain message, tool-use parts one assistant
/// tool-call message, and each tool result its own tool-response message.
/// Empty text produces nothing; Gemini rejects empty parts.
pub fn to_genai_message(msg: ChatMessage) -> ProviderResult<Vec<GenaiMessage>> {
    let parts = match msg.content {
        MessageContent::Text(text) if text.is_empty() => return Ok(Vec::new()),
        MessageContent::Text(text) => return Ok(vec![text_message(msg.role, text)]),
        MessageContent::Parts(parts) => parts,
    };

    let mut text = String::new();
    let mut calls = Vec::new();
    let mut responses = Vec::new();

    for part in parts {
        match part {
            ContentPart::Text { text: t } => text.push_str(&t),
            ContentPart::ToolUse { id, name, input } => {
                calls.push(to_genai_tool_call(id, name, input)?);
            }
            ContentPart::ToolResult {
                tool_use_id,
                content,
                ..
            } => responses.push(GenaiMessage::from(GenaiToolResponse::new(tool_use_id, content))),
        }
    }

    let mut out = Vec::new();
    if !text.is_empty() {
        out.push(text_message(msg.role, text));
    }
    if !calls.is_empty() {
        out.push(GenaiMessage::from(calls));
    }
    out.extend(responses);
    Ok(out)
}

/// Convert a conversation to genai messages
pub fn to_genai_messages(messages: Vec<ChatMessage>) -> ProviderResult<Vec<GenaiMessage>> {
    let mut out = Vec::with_capacity(messages.len());
    for msg in messages {
        out.extend(to_genai_message(msg)?);
    }
    Ok(out)
}

// ============================================================================
// Tool Conversion: mcpshell -> genai
// ============================================================================

pub fn to_genai_tool(tool: Tool) -> GenaiTool {
    let mut genai_tool = GenaiTool::new(&tool.name).with_description(&tool.description);

    if let Some(schema) = tool.input_schema {
        genai_tool = genai_tool.with_schema(schema);
    }

    genai_tool
}

pub fn to_genai_tools(tools: Vec<Tool>) -> Vec<GenaiTool> {
    tools.into_iter().map(to_genai_tool).collect()
}

pub fn to_genai_tool_response(result: ToolResult) -> GenaiToolResponse {
    GenaiToolResponse::new(result.call_id, result.content)
}

// ============================================================================
// Options Conversion: mcpshell -> genai
// ============================================================================

pub fn to_genai_options(options: &StreamChatOptions) -> GenaiOptions {
    let mut genai_opts = GenaiOptions::default();

    if let Some(temp) = options.temperature {
        genai_opts = genai_opts.with_temperature(temp as f64);
    }

    if let Some(max_tokens) = options.max_tokens {
        genai_opts = genai_opts.with_max_tokens(max_tokens);
    }

    // Tool calls are only reported on the End event when captured
    genai_opts.with_capture_tool_calls(true)
}

// ============================================================================
// Response Conversion: genai -> mcpshell
// ============================================================================

pub fn from_genai_tool_call(tc: &GenaiToolCall) -> ToolCall {
    ToolCall {
        id: tc.call_id.clone(),
        name: tc.fn_name.clone(),
        input: tc.fn_arguments.clone(),
    }
}

/// Convert a genai stream event into zero or more chunks
pub fn from_genai_event(event: ChatStreamEvent) -> Vec<ProviderResult<StreamChunk>> {
    match event {
        ChatStreamEvent::Chunk(chunk) => vec![Ok(StreamChunk::Text {
            text: chunk.content,
        })],
        ChatStreamEvent::ToolCallChunk(chunk) => vec![Ok(StreamChunk::ToolCallDelta {
            id: chunk.tool_call.call_id,
            name: Some(chunk.tool_call.fn_name),
            input_delta: Some(chunk.tool_call.fn_arguments.to_string()),
        })],
        ChatStreamEvent::End(end) => match end.captured_tool_calls() {
            Some(tool_calls) => tool_calls
                .iter()
                .map(|tc| Ok(StreamChunk::tool_call(from_genai_tool_call(tc))))
                .collect(),
            None => vec![],
        },
        ChatStreamEvent::Start
        | ChatStreamEvent::ReasoningChunk(_)
        | ChatStreamEvent::ThoughtSignatureChunk(_) => vec![],
    }
}

// ============================================================================
// Client Creation
// ============================================================================

/// Endpoint for a `GEMINI_BASE_URL` override
///
/// The override names the service root, as the official SDKs expect; the
/// API version segment is appended when missing.
pub fn gemini_endpoint(base_url: &str) -> String {
    let trimmed = base_url.trim().trim_end_matches('/');
    if trimmed.ends_with("/v1beta") || trimmed.ends_with("/v1") {
        format!("{}/", trimmed)
    } else {
        format!("{}/v1beta/", trimmed)
    }
}

/// Gemini client with an explicit key and optional endpoint override
///
/// The key never comes from genai's own environment lookup.
pub fn create_client(api_key: &str, base_url: Option<&str>) -> Client {
    let auth_key = api_key.to_string();
    let auth_resolver = AuthResolver::from_resolver_async_fn(
        move |_model_iden: ModelIden| -> Pin<Box<dyn Future<Output = genai::resolver::Result<Option<AuthData>>> + Send>> {
            let key = auth_key.clone();
            Box::pin(async move { Ok(Some(AuthData::from_single(key))) })
        },
    );

    let endpoint = base_url
        .filter(|u| !u.trim().is_empty())
        .map(gemini_endpoint);

    let target_resolver = ServiceTargetResolver::from_resolver_fn(
        move |target: ServiceTarget| -> Result<ServiceTarget, genai::resolver::Error> {
            let ServiceTarget { endpoint: default_endpoint, auth, model } = target;

            let endpoint = match &endpoint {
                Some(url) => Endpoint::from_owned(url.clone()),
                None => default_endpoint,
            };

            Ok(ServiceTarget {
                endpoint,
                auth,
                model: ModelIden::new(AdapterKind::Gemini, model.model_name.clone()),
            })
        },
    );

    Client::builder()
        .with_auth_resolver(auth_resolver)
        .with_service_target_resolver(target_resolver)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_conversion() {
        assert!(matches!(to_genai_role(MessageRole::System), GenaiRole::System));
        assert!(matches!(to_genai_role(MessageRole::User), GenaiRole::User));
        assert!(matches!(to_genai_role(MessageRole::Assistant), GenaiRole::Assistant));
    }

    #[test]
    fn test_text_message_conversion() {
        let converted = to_genai_message(ChatMessage::user("Hello, world!")).unwrap();
        assert_eq!(converted.len(), 1);
        assert!(matches!(converted[0].role, GenaiRole::User));
    }

    #[test]
    fn test_empty_text_is_dropped() {
        assert!(to_genai_message(ChatMessage::assistant("")).unwrap().is_empty());

        let messages = vec![
            ChatMessage::user("hi"),
            ChatMessage::assistant(""),
            ChatMessage::user("still there?"),
        ];
        let converted = to_genai_messages(messages).unwrap();
        assert_eq!(converted.len(), 2);
        assert!(converted.iter().all(|m| matches!(m.role, GenaiRole::User)));
    }

    #[test]
    fn test_tool_turns_expand() {
        let assistant = ChatMessage::with_parts(
            MessageRole::Assistant,
            vec![
                ContentPart::text("Let me check."),
                ContentPart::tool_use("c1", "execute_bash", json!({"cmd": "pwd"})),
                ContentPart::tool_use("c2", "get_os_info", json!({})),
            ],
        );
        let converted = to_genai_message(assistant).unwrap();
        assert_eq!(converted.len(), 2);
        assert!(converted.iter().all(|m| matches!(m.role, GenaiRole::Assistant)));

        let results = ChatMessage::with_parts(
            MessageRole::User,
            vec![
                ContentPart::tool_result("c1", "execute_bash", "/tmp\n", false),
                ContentPart::tool_result("c2", "get_os_info", "Linux", false),
            ],
        );
        let converted = to_genai_message(results).unwrap();
        assert_eq!(converted.len(), 2);
        assert!(converted.iter().all(|m| matches!(m.role, GenaiRole::Tool)));
    }

    #[test]
    fn test_tool_call_round_trip() {
        let call = to_genai_tool_call("c1".into(), "set_cwd".into(), json!({"path": "/tmp"})).unwrap();
        assert_eq!(call.fn_name, "set_cwd");

        let back = from_genai_tool_call(&call);
        assert_eq!(back, ToolCall::new("c1", "set_cwd", json!({"path": "/tmp"})));
    }

    #[test]
    fn test_tool_conversion() {
        let tool = Tool::new("execute_bash", "Run a command").with_schema(json!({
            "type": "object",
            "properties": { "cmd": { "type": "string" } }
        }));

        let genai_tool = to_genai_tool(tool);
        assert_eq!(genai_tool.name, "execute_bash");
    }

    #[test]
    fn test_options() {
        let options = StreamChatOptions::new().with_temperature(0.0).with_max_tokens(100);
        let genai_opts = to_genai_options(&options);
        assert_eq!(genai_opts.temperature, Some(0.0));
        assert_eq!(genai_opts.max_tokens, Some(100));
        assert_eq!(genai_opts.capture_tool_calls, Some(true));
    }

    #[test]
    fn test_start_event_yields_nothing() {
        assert!(from_genai_event(ChatStreamEvent::Start).is_empty());
    }

    #[test]
    fn test_gemini_endpoint() {
        assert_eq!(
            gemini_endpoint("https://proxy.example.com"),
            "https://proxy.example.com/v1beta/"
        );
        assert_eq!(
            gemini_endpoint("https://proxy.example.com/"),
            "https://proxy.example.com/v1beta/"
        );
        assert_eq!(
            gemini_endpoint("https://proxy.example.com/v1beta"),
            "https://proxy.example.com/v1beta/"
        );
        assert_eq!(gemini_endpoint(GEMINI_DEFAULT_ENDPOINT), GEMINI_DEFAULT_ENDPOINT);
    }
}
