//! System instructions handed to the model
//!
//! [`synthesize_instruction`] renders the capability registry into a prompt
//! listing every callable tool. The other templates are static text with the
//! current date (and, for the shell agent, the host OS) filled in.

use std::fmt::Display;

use chrono::{DateTime, NaiveDate, TimeZone};

use crate::tools::CapabilityRegistry;

/// Returned when discovery found nothing
pub const NO_TOOLS_INSTRUCTION: &str =
    "You are a helpful assistant. No external tools are available.";

const DATE_GUIDANCE: &str = "Any dates before this are in the past, and any dates after this are in the future. When dealing with modern entities/companies/people, and the user asks for the 'latest', 'most recent', 'today's', etc. don't assume your knowledge is up to date;";

const LANGUAGE_GUIDANCE: &str =
    "You can and should speak any language the user asks you to speak or use the language of the user.";

/// Render the registry as a system prompt
///
/// Tools appear in registry order with names and descriptions copied
/// verbatim.
pub fn synthesize_instruction(registry: &CapabilityRegistry, date: NaiveDate) -> String {
    if registry.is_empty() {
        return NO_TOOLS_INSTRUCTION.to_string();
    }

    let header = format!(
        "You are a powerful AI assistant connected to multiple external systems via tools.\n\
         The current date is {}.\n\
         To use a tool, you must respond with a `ToolCall` object for the corresponding function.\n\
         Here are the tools available to you:\n",
        date.format("%Y-%m-%d")
    );

    let tools = registry
        .iter()
        .map(|tool| {
            format!(
                "- Function Name: `{}`\n  Description: {}",
                tool.qualified_name, tool.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    header + &tools
}

/// Instruction for the single-server chat agent
pub fn assistant_instruction<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!(
        "{}\n{}\n{}",
        date_preamble(now),
        DATE_GUIDANCE,
        LANGUAGE_GUIDANCE
    )
}

/// Instruction for the agent attached to the OS-aware shell server
pub fn shell_environment_instruction<Tz>(os_info: &str, now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!(
        "{}\nYou are connected to a shell environment. The operating system is {os}.\n\
         You must use shell commands that are compatible with {os}. For example, if the OS is Windows, use 'dir' instead of 'ls'.\n\
         {}\n{}",
        date_preamble(now),
        DATE_GUIDANCE,
        LANGUAGE_GUIDANCE,
        os = os_info
    )
}

fn date_preamble<Tz>(now: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    format!(
        "Very important: The user's timezone is {}. The current date is {}.",
        now.format("%Z"),
        now.format("%Y-%m-%d")
    )
}
