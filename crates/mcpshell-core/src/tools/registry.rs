//! Capability registry
//!
//! Maps qualified tool names to their descriptions, remembering which
//! server owns each tool. Entries iterate in insertion order.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::types::Tool;

/// A tool the model may call
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    /// Name exposed to the model, unique within the registry
    pub qualified_name: String,
    pub description: String,
    /// Owning server
    pub server: String,
    /// Name on the owning server
    pub tool_name: String,
    pub input_schema: Value,
}

impl ToolDescriptor {
    pub fn new(
        qualified_name: impl Into<String>,
        description: impl Into<String>,
        server: impl Into<String>,
        tool_name: impl Into<String>,
    ) -> Self {
        Self {
            qualified_name: qualified_name.into(),
            description: description.into(),
            server: server.into(),
            tool_name: tool_name.into(),
            input_schema: serde_json::json!({ "type": "object", "properties": {} }),
        }
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.input_schema = schema;
        self
    }
}

impl From<&ToolDescriptor> for Tool {
    fn from(d: &ToolDescriptor) -> Self {
        Tool::new(&d.qualified_name, &d.description).with_schema(d.input_schema.clone())
    }
}

/// What happens when a qualified name is registered twice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergePolicy {
    /// The later entry replaces the earlier one, keeping its position
    #[default]
    Overwrite,
    /// The earlier entry is kept and the later one dropped
    KeepFirst,
    /// The later entry is refused with `RegistryError::DuplicateTool`
    Reject,
}

impl std::fmt::Display for MergePolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MergePolicy::Overwrite => write!(f, "overwrite"),
            MergePolicy::KeepFirst => write!(f, "keep-first"),
            MergePolicy::Reject => write!(f, "reject"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Duplicate tool '{name}': already registered by '{existing_server}', refused from '{server}'")]
    DuplicateTool {
        name: String,
        existing_server: String,
        server: String,
    },
}

pub type RegistryResult<T> = Result<T, RegistryError>;

/// Result of a successful insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Added,
    /// An entry from `previous_server` was overwritten
    Replaced { previous_server: String },
    /// The new entry was dropped in favor of the one from `kept_server`
    Ignored { kept_server: String },
}

/// Qualified name to descriptor, in insertion order
#[derive(Debug, Clone, Default)]
pub struct CapabilityRegistry {
    entries: Vec<ToolDescriptor>,
    index: HashMap<String, usize>,
    policy: MergePolicy,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_policy(policy: MergePolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    pub fn policy(&self) -> MergePolicy {
        self.policy
    }

    /// Register a tool, applying the merge policy on name collisions
    pub fn insert(&mut self, descriptor: ToolDescriptor) -> RegistryResult<InsertOutcome> {
        let Some(&pos) = self.index.get(&descriptor.qualified_name) else {
            self.index
                .insert(descriptor.qualified_name.clone(), self.entries.len());
            self.entries.push(descriptor);
            return Ok(InsertOutcome::Added);
        };

        let existing_server = self.entries[pos].server.clone();
        match self.policy {
            MergePolicy::Overwrite => {
                self.entries[pos] = descriptor;
                Ok(InsertOutcome::Replaced {
                    previous_server: existing_server,
                })
            }
            MergePolicy::KeepFirst => Ok(InsertOutcome::Ignored {
                kept_server: existing_server,
            }),
            MergePolicy::Reject => Err(RegistryError::DuplicateTool {
                name: descriptor.qualified_name,
                existing_server,
                server: descriptor.server,
            }),
        }
    }

    pub fn get(&self, qualified_name: &str) -> Option<&ToolDescriptor> {
        self.index.get(qualified_name).map(|&pos| &self.entries[pos])
    }

    pub fn contains(&self, qualified_name: &str) -> bool {
        self.index.contains_key(qualified_name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ToolDescriptor> {
        self.entries.iter()
    }

    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|d| d.qualified_name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry; the policy is kept
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }

    /// Tool definitions for the model API
    pub fn to_tools(&self) -> Vec<Tool> {
        self.entries.iter().map(Tool::from).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn desc(name: &str, description: &str, server: &str) -> ToolDescriptor {
        ToolDescriptor::new(name, description, server, name)
    }

    #[test]
    fn test_insertion_order() {
        let mut registry = CapabilityRegistry::new();
        registry.insert(desc("zeta", "z", "a")).unwrap();
        registry.insert(desc("alpha", "a", "a")).unwrap();
        registry.insert(desc("mid", "m", "b")).unwrap();

        assert_eq!(registry.names(), vec!["zeta", "alpha", "mid"]);
        assert_eq!(registry.len(), 3);
        assert!(registry.contains("alpha"));
        assert_eq!(registry.get("mid").unwrap().server, "b");
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let mut registry = CapabilityRegistry::new();
        registry.insert(desc("run", "first", "one")).unwrap();
        registry.insert(desc("other", "x", "one")).unwrap();

        let outcome = registry.insert(desc("run", "second", "two")).unwrap();
        assert_eq!(
            outcome,
            InsertOutcome::Replaced {
                previous_server: "one".to_string()
            }
        );
        assert_eq!(registry.names(), vec!["run", "other"]);
        assert_eq!(registry.get("run").unwrap().description, "second");
        assert_eq!(registry.get("run").unwrap().server, "two");
    }

    #[test]
    fn test_keep_first() {
        let mut registry = CapabilityRegistry::with_policy(MergePolicy::KeepFirst);
        registry.insert(desc("run", "first", "one")).unwrap();
        let outcome = registry.insert(desc("run", "second", "two")).unwrap();

        assert_eq!(
            outcome,
            InsertOutcome::Ignored {
                kept_server: "one".to_string()
            }
        );
        assert_eq!(registry.get("run").unwrap().description, "first");
    }

    #[test]
    fn test_reject() {
        let mut registry = CapabilityRegistry::with_policy(MergePolicy::Reject);
        registry.insert(desc("run", "first", "one")).unwrap();
        let err = registry.insert(desc("run", "second", "two")).unwrap_err();

        assert_eq!(
            err.to_string(),
            "Duplicate tool 'run': already registered by 'one', refused from 'two'"
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.get("run").unwrap().description, "first");
    }

    #[test]
    fn test_clear_keeps_policy() {
        let mut registry = CapabilityRegistry::with_policy(MergePolicy::Reject);
        registry.insert(desc("run", "first", "one")).unwrap();
        registry.clear();

        assert!(registry.is_empty());
        assert!(registry.get("run").is_none());
        assert_eq!(registry.policy(), MergePolicy::Reject);
        registry.insert(desc("run", "again", "one")).unwrap();
    }

    #[test]
    fn test_to_tools() {
        let mut registry = CapabilityRegistry::new();
        registry
            .insert(desc("pwd", "Print dir", "bash").with_schema(serde_json::json!({"type": "object"})))
            .unwrap();
        let tools = registry.to_tools();
        assert_eq!(tools.len(), 1);
        assert_eq!(tools[0].name, "pwd");
        assert_eq!(tools[0].description, "Print dir");
        assert!(tools[0].input_schema.is_some());
    }

    #[test]
    fn test_policy_serde() {
        let policy: MergePolicy = serde_json::from_str("\"keep-first\"").unwrap();
        assert_eq!(policy, MergePolicy::KeepFirst);
        assert_eq!(MergePolicy::Reject.to_string(), "reject");
    }
}
