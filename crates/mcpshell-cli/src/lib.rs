//! Shared plumbing for the mcpshell binaries

pub mod term;
pub mod telemetry;
pub mod model;
pub mod repl;
pub mod serve;
