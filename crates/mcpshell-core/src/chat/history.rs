//! Conversation history views: numbered entries and counters

use crate::logging::truncate_for_log;
use crate::types::{ChatMessage, ContentPart, MessageRole};

/// Text longer than this is cut in history listings
pub const HISTORY_PREVIEW_CHARS: usize = 100;

/// Piece of a history entry, in display order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HistorySegment {
    Text(String),
    FunctionCall(String),
    FunctionResponse(String),
}

/// One numbered message in a history listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    /// 1-based position
    pub index: usize,
    pub role: MessageRole,
    /// Empty when the message carries nothing printable
    pub segments: Vec<HistorySegment>,
}

/// Counters over a conversation
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversationStats {
    pub total_messages: usize,
    pub user_messages: usize,
    pub model_responses: usize,
    pub function_calls: usize,
    pub function_responses: usize,
}

impl std::fmt::Display for ConversationStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} user messages, {} model responses, {} function calls, {} function responses",
            self.user_messages, self.model_responses, self.function_calls, self.function_responses
        )
    }
}

fn segments(message: &ChatMessage) -> Vec<HistorySegment> {
    if let Some(text) = message.text() {
        return if text.is_empty() {
            vec![]
        } else {
            vec![HistorySegment::Text(truncate_for_log(text, HISTORY_PREVIEW_CHARS))]
        };
    }

    message
        .parts()
        .iter()
        .filter_map(|part| match part {
            ContentPart::Text { text } if text.is_empty() => None,
            ContentPart::Text { text } => {
                Some(HistorySegment::Text(truncate_for_log(text, HISTORY_PREVIEW_CHARS)))
            }
            ContentPart::ToolUse { name, .. } => Some(HistorySegment::FunctionCall(name.clone())),
            ContentPart::ToolResult { name, .. } => {
                Some(HistorySegment::FunctionResponse(name.clone()))
            }
        })
        .collect()
}

/// Numbered entries for `messages`
pub fn history_entries(messages: &[ChatMessage]) -> Vec<HistoryEntry> {
    messages
        .iter()
        .enumerate()
        .map(|(i, message)| HistoryEntry {
            index: i + 1,
            role: message.role,
            segments: segments(message),
        })
        .collect()
}

/// Count messages by kind
///
/// Messages that only carry tool results count as function responses,
/// not user messages.
pub fn conversation_stats(messages: &[ChatMessage]) -> ConversationStats {
    messages.iter().fold(
        ConversationStats {
            total_messages: messages.len(),
            ..Default::default()
        },
        |mut stats, message| {
            let results = message.tool_result_count();
            match message.role {
                MessageRole::User if results == 0 => stats.user_messages += 1,
                MessageRole::Assistant => stats.model_responses += 1,
                _ => {}
            }
            stats.function_calls += message.tool_use_count();
            stats.function_responses += results;
            stats
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn conversation() -> Vec<ChatMessage> {
        vec![
            ChatMessage::user("list files in /tmp"),
            ChatMessage::with_parts(
                MessageRole::Assistant,
                vec![ContentPart::tool_use("c1", "execute_bash", json!({"cmd": "ls /tmp"}))],
            ),
            ChatMessage::with_parts(
                MessageRole::User,
                vec![ContentPart::tool_result("c1", "execute_bash", "a\nb\n", false)],
            ),
            ChatMessage::assistant("x".repeat(150)),
        ]
    }

    #[test]
    fn test_entries() {
        let entries = history_entries(&conversation());
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].index, 1);
        assert_eq!(
            entries[0].segments,
            vec![HistorySegment::Text("list files in /tmp".to_string())]
        );
        assert_eq!(
            entries[1].segments,
            vec![HistorySegment::FunctionCall("execute_bash".to_string())]
        );
        assert_eq!(
            entries[2].segments,
            vec![HistorySegment::FunctionResponse("execute_bash".to_string())]
        );

        let HistorySegment::Text(long) = &entries[3].segments[0] else {
            panic!("expected text");
        };
        assert_eq!(long.chars().count(), HISTORY_PREVIEW_CHARS + 3);
        assert!(long.ends_with("..."));
    }

    #[test]
    fn test_empty_message_has_no_segments() {
        let entries = history_entries(&[ChatMessage::assistant("")]);
        assert!(entries[0].segments.is_empty());
    }

    #[test]
    fn test_stats() {
        let stats = conversation_stats(&conversation());
        assert_eq!(
            stats,
            ConversationStats {
                total_messages: 4,
                user_messages: 1,
                model_responses: 2,
                function_calls: 1,
                function_responses: 1,
            }
        );
        assert_eq!(
            stats.to_string(),
            "1 user messages, 2 model responses, 1 function calls, 1 function responses"
        );
    }
}
