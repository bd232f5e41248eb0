//! ANSI colors for terminal output

pub const BLUE: &str = "\x1b[94m";
pub const GREEN: &str = "\x1b[92m";
pub const YELLOW: &str = "\x1b[93m";
pub const RED: &str = "\x1b[91m";
pub const PURPLE: &str = "\x1b[95m";
pub const CYAN: &str = "\x1b[96m";
pub const WHITE: &str = "\x1b[97m";
pub const GRAY: &str = "\x1b[90m";
pub const BOLD: &str = "\x1b[1m";
pub const RESET: &str = "\x1b[0m";

/// `text` wrapped in `color` and a reset
pub fn paint(color: &str, text: impl std::fmt::Display) -> String {
    format!("{color}{text}{RESET}")
}

/// Print without a newline and flush, for prompts and streamed text
pub fn print_flush(text: impl std::fmt::Display) {
    use std::io::Write;

    print!("{text}");
    let _ = std::io::stdout().flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_paint() {
        assert_eq!(paint(RED, "Error"), "\x1b[91mError\x1b[0m");
        assert_eq!(paint(&format!("{BOLD}{BLUE}"), "You: "), "\x1b[1m\x1b[94mYou: \x1b[0m");
    }
}
