//! Chat sessions
//!
//! `ChatSession` keeps the conversation and drives the tool-calling loop:
//!
//! ```text
//! user input ─► Provider::stream_chat ─► text chunks ─► caller
//!                      ▲                  tool calls
//!                      │                      │
//!                      └── tool results ◄── ToolDispatcher
//! ```

mod history;
mod session;

pub use history::{
    conversation_stats, history_entries, ConversationStats, HistoryEntry, HistorySegment,
    HISTORY_PREVIEW_CHARS,
};
pub use session::{ChatError, ChatEvent, ChatResult, ChatSession, ChatTurn, DEFAULT_MAX_TOOL_TURNS};
