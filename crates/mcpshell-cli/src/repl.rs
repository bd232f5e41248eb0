//! Interactive chat loop shared by the Gemini agents

use anyhow::{Context, Result};
use mcpshell_core::chat::{ConversationStats, HistoryEntry, HistorySegment};
use mcpshell_core::logging::truncate_for_log;
use mcpshell_core::{CancellationToken, ChatError, ChatEvent, ChatSession};
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::term::{paint, print_flush, BLUE, BOLD, CYAN, GRAY, GREEN, PURPLE, RED, RESET, WHITE, YELLOW};

/// Tool results are previewed up to this many characters
const RESULT_PREVIEW_CHARS: usize = 200;

/// What a line typed at the prompt asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplCommand<'a> {
    Exit,
    History,
    Stats,
    Clear,
    /// Blank line
    Skip,
    Message(&'a str),
}

impl<'a> ReplCommand<'a> {
    pub fn parse(line: &'a str) -> Self {
        let trimmed = line.trim();
        match trimmed.to_lowercase().as_str() {
            "" => ReplCommand::Skip,
            "exit" => ReplCommand::Exit,
            "history" => ReplCommand::History,
            "stats" => ReplCommand::Stats,
            "clear" => ReplCommand::Clear,
            _ => ReplCommand::Message(trimmed),
        }
    }
}

/// Numbered history listing with the statistics footer
pub fn render_history(entries: &[HistoryEntry], stats: &ConversationStats) -> String {
    if entries.is_empty() {
        return paint(GRAY, "No conversation history.");
    }

    let mut out = paint(
        BOLD,
        format!("--- Conversation History ({} messages) ---", entries.len()),
    );
    for entry in entries {
        out.push('\n');
        out.push_str(&format!("{CYAN}[{}] {}: {RESET}", entry.index, entry.role));
        if entry.segments.is_empty() {
            out.push_str(&paint(GRAY, "[No content]"));
        }
        let rendered: Vec<String> = entry
            .segments
            .iter()
            .map(|segment| match segment {
                HistorySegment::Text(text) => paint(WHITE, text),
                HistorySegment::FunctionCall(name) => paint(YELLOW, format!("[Function Call: {name}]")),
                HistorySegment::FunctionResponse(name) => {
                    paint(GREEN, format!("[Function Response: {name}]"))
                }
            })
            .collect();
        out.push_str(&rendered.join(" "));
    }
    out.push('\n');
    out.push_str(&paint(BOLD, "----------------------------------------"));
    out.push('\n');
    out.push_str(&paint(GRAY, format!("Statistics: {stats}")));
    out
}

/// Statistics block for the `stats` command
pub fn render_stats(stats: &ConversationStats) -> String {
    if stats.total_messages == 0 {
        return paint(GRAY, "No conversation history.");
    }

    [
        paint(BOLD, "--- Conversation Statistics ---"),
        paint(CYAN, format!("Total messages: {}", stats.total_messages)),
        paint(BLUE, format!("User messages: {}", stats.user_messages)),
        paint(GREEN, format!("Model responses: {}", stats.model_responses)),
        paint(YELLOW, format!("Function calls: {}", stats.function_calls)),
        paint(PURPLE, format!("Function responses: {}", stats.function_responses)),
        paint(BOLD, "------------------------------"),
    ]
    .join("\n")
}

fn print_event(event: ChatEvent) {
    match event {
        ChatEvent::Text(text) => print_flush(paint(GREEN, text)),
        ChatEvent::ToolCall(call) => {
            println!();
            println!("{}", paint(CYAN, format!("Calling tool '{}' with args: {}", call.name, call.input)));
        }
        ChatEvent::ToolResult(result) if result.is_error => {
            println!(
                "{}",
                paint(RED, format!("Tool '{}' failed: {}", result.name, result.content))
            );
        }
        ChatEvent::ToolResult(result) => {
            println!(
                "{}",
                paint(GRAY, format!(
                    "Tool '{}' returned: {}",
                    result.name,
                    truncate_for_log(result.content.trim_end(), RESULT_PREVIEW_CHARS)
                ))
            );
        }
        ChatEvent::TurnLimitReached(turns) => {
            println!();
            println!("{}", paint(YELLOW, format!("Maximum tool turns ({turns}) reached.")));
        }
    }
}

/// Run the prompt loop until `exit`, EOF or Ctrl-C at the prompt
///
/// Ctrl-C while the model is answering only cancels that turn.
pub async fn run_chat_repl(session: &mut ChatSession) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        print_flush(format!("{BOLD}{BLUE}You: {RESET}"));

        let line = tokio::select! {
            line = lines.next_line() => line.context("Failed to read from stdin")?,
            _ = tokio::signal::ctrl_c() => None,
        };
        let Some(line) = line else {
            println!("\n{}", paint(GRAY, "Goodbye!"));
            return Ok(());
        };

        match ReplCommand::parse(&line) {
            ReplCommand::Skip => continue,
            ReplCommand::Exit => {
                println!("\n{}", paint(GRAY, "Goodbye!"));
                return Ok(());
            }
            ReplCommand::History => {
                println!("{}", render_history(&session.history_entries(), &session.stats()));
            }
            ReplCommand::Stats => println!("{}", render_stats(&session.stats())),
            ReplCommand::Clear => {
                session.clear();
                println!("{}", paint(GREEN, "Conversation history cleared."));
            }
            ReplCommand::Message(text) => {
                print_flush(format!("{BOLD}{GREEN}Gemini: {RESET}"));

                let cancel = CancellationToken::new();
                let trigger = cancel.clone();
                let watcher = tokio::spawn(async move {
                    if tokio::signal::ctrl_c().await.is_ok() {
                        trigger.cancel();
                    }
                });

                let mut on_event = print_event;
                let outcome = session.send(text, cancel, &mut on_event).await;
                watcher.abort();

                match outcome {
                    Ok(_) => println!("\n"),
                    Err(ChatError::Cancelled) => println!("\n{}\n", paint(YELLOW, "Interrupted.")),
                    Err(e) => println!("\n{}\n", paint(RED, format!("Error: {e}"))),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mcpshell_core::chat::{conversation_stats, history_entries};
    use mcpshell_core::{ChatMessage, ContentPart, MessageRole};
    use serde_json::json;

    #[test]
    fn test_parse_commands() {
        assert_eq!(ReplCommand::parse("EXIT"), ReplCommand::Exit);
        assert_eq!(ReplCommand::parse("  history "), ReplCommand::History);
        assert_eq!(ReplCommand::parse("stats"), ReplCommand::Stats);
        assert_eq!(ReplCommand::parse("Clear"), ReplCommand::Clear);
        assert_eq!(ReplCommand::parse("   "), ReplCommand::Skip);
        assert_eq!(ReplCommand::parse(" list /tmp "), ReplCommand::Message("list /tmp"));
    }

    #[test]
    fn test_render_empty() {
        let stats = ConversationStats::default();
        assert!(render_history(&[], &stats).contains("No conversation history."));
        assert!(render_stats(&stats).contains("No conversation history."));
    }

    #[test]
    fn test_render_history() {
        let messages = vec![
            ChatMessage::user("what is in /tmp?"),
            ChatMessage::with_parts(
                MessageRole::Assistant,
                vec![ContentPart::tool_use("c1", "execute_bash", json!({"cmd": "ls /tmp"}))],
            ),
            ChatMessage::with_parts(
                MessageRole::User,
                vec![ContentPart::tool_result("c1", "execute_bash", "a", false)],
            ),
            ChatMessage::assistant(""),
        ];
        let out = render_history(&history_entries(&messages), &conversation_stats(&messages));

        assert!(out.contains("--- Conversation History (4 messages) ---"));
        assert!(out.contains("[1] user: "));
        assert!(out.contains("what is in /tmp?"));
        assert!(out.contains("[2] model: "));
        assert!(out.contains("[Function Call: execute_bash]"));
        assert!(out.contains("[Function Response: execute_bash]"));
        assert!(out.contains("[No content]"));
        assert!(out.contains(
            "Statistics: 1 user messages, 2 model responses, 1 function calls, 1 function responses"
        ));
    }

    #[test]
    fn test_render_stats() {
        let stats = ConversationStats {
            total_messages: 3,
            user_messages: 1,
            model_responses: 1,
            function_calls: 1,
            function_responses: 0,
        };
        let out = render_stats(&stats);
        assert!(out.contains("Total messages: 3"));
        assert!(out.contains("Function calls: 1"));
    }
}
