//! Logging abstractions shared by clients and servers

mod traits;
mod noop;
mod tracing_logger;
mod file_logger;
mod fanout;

pub use traits::{Logger, SharedLogger};
pub use noop::NoOpLogger;
pub use tracing_logger::TracingLogger;
pub use file_logger::{FileLogger, LogLevel};
pub use fanout::FanoutLogger;

/// Shorten `text` to `max` characters, appending `...` when cut
pub fn truncate_for_log(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => format!("{}...", &text[..idx]),
        None => text.to_string(),
    }
}
