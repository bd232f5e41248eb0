//! Capability discovery and tool dispatch
//!
//! ```text
//!  ServerPool ──list_tools──▶ discover_capabilities ──▶ CapabilityRegistry
//!                                                          │
//!  ChatSession ──ToolCall──▶ ToolRouter ──lookup───────────┘
//!                               │
//!                               └──call_tool──▶ owning server
//! ```

mod naming;
mod registry;
mod discovery;
mod router;

pub use naming::{qualify, sanitize_tool_name, NamingScheme};
pub use registry::{
    CapabilityRegistry, InsertOutcome, MergePolicy, RegistryError, RegistryResult, ToolDescriptor,
};
pub use discovery::{discover_capabilities, Collision, DiscoveryReport, SkippedServer};
pub use router::{ToolDispatcher, ToolRouter};
