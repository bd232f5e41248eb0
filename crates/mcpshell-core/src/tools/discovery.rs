//! One-shot capability discovery across all connected servers

use std::sync::Arc;

use crate::logging::Logger;
use crate::mcp::ToolTransport;

use super::naming::{qualify, NamingScheme};
use super::registry::{
    CapabilityRegistry, InsertOutcome, MergePolicy, RegistryError, ToolDescriptor,
};

/// A server whose catalog could not be fetched
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedServer {
    pub server: String,
    pub error: String,
}

/// Two servers offering the same qualified name
#[derive(Debug, Clone, PartialEq)]
pub struct Collision {
    pub qualified_name: String,
    /// Server whose entry is in the registry afterwards
    pub kept_server: String,
    /// Server whose entry was overwritten, ignored or refused
    pub dropped_server: String,
    pub policy: MergePolicy,
}

/// What a discovery pass did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiscoveryReport {
    /// Qualified names, in the order they were registered
    pub registered: Vec<String>,
    pub skipped: Vec<SkippedServer>,
    pub collisions: Vec<Collision>,
}

impl DiscoveryReport {
    pub fn is_empty(&self) -> bool {
        self.registered.is_empty()
    }
}

/// Query every transport once and fill `registry`
///
/// A transport that fails to list its tools is logged and skipped. Finding
/// no tools at all only produces a warning. Callers wanting to re-run
/// discovery must `clear()` the registry first.
///
/// `NamingScheme::Auto` counts `transports`; callers working from a config
/// should settle it with `NamingScheme::for_configured` first.
pub async fn discover_capabilities(
    transports: &[Arc<dyn ToolTransport>],
    registry: &mut CapabilityRegistry,
    naming: NamingScheme,
    logger: &dyn Logger,
) -> DiscoveryReport {
    let mut report = DiscoveryReport::default();
    let prefixed = naming.prefixes(transports.len());

    logger.info(&format!(
        "[CapabilityRegistry] Discovering tools from {} server(s), policy={}",
        transports.len(),
        registry.policy()
    ));

    for transport in transports {
        let server = transport.server_name();

        let tools = match transport.list_tools().await {
            Ok(tools) => tools,
            Err(e) => {
                logger.error(&format!(
                    "[CapabilityRegistry] Failed to list tools from '{}': {}",
                    server, e
                ));
                report.skipped.push(SkippedServer {
                    server: server.to_string(),
                    error: e.to_string(),
                });
                continue;
            }
        };

        for tool in tools {
            let qualified_name = qualify(server, &tool.name, prefixed);
            let descriptor = ToolDescriptor {
                qualified_name: qualified_name.clone(),
                description: tool.description.unwrap_or_default(),
                server: server.to_string(),
                tool_name: tool.name,
                input_schema: tool.input_schema,
            };

            match registry.insert(descriptor) {
                Ok(InsertOutcome::Added) => {
                    logger.debug(&format!("[CapabilityRegistry] Registered {}", qualified_name));
                    report.registered.push(qualified_name);
                }
                Ok(InsertOutcome::Replaced { previous_server }) => {
                    logger.warn(&format!(
                        "[CapabilityRegistry] '{}' from '{}' overwrites the one from '{}'",
                        qualified_name, server, previous_server
                    ));
                    report.collisions.push(Collision {
                        qualified_name,
                        kept_server: server.to_string(),
                        dropped_server: previous_server,
                        policy: MergePolicy::Overwrite,
                    });
                }
                Ok(InsertOutcome::Ignored { kept_server }) => {
                    logger.warn(&format!(
                        "[CapabilityRegistry] '{}' from '{}' ignored, keeping the one from '{}'",
                        qualified_name, server, kept_server
                    ));
                    report.collisions.push(Collision {
                        qualified_name,
                        kept_server,
                        dropped_server: server.to_string(),
                        policy: MergePolicy::KeepFirst,
                    });
                }
                Err(e) => {
                    logger.warn(&format!("[CapabilityRegistry] {}", e));
                    let RegistryError::DuplicateTool {
                        name,
                        existing_server,
                        server: refused,
                    } = e;
                    report.collisions.push(Collision {
                        qualified_name: name,
                        kept_server: existing_server,
                        dropped_server: refused,
                        policy: MergePolicy::Reject,
                    });
                }
            }
        }
    }

    if registry.is_empty() {
        logger.warn("[CapabilityRegistry] No tools found on any connected servers");
    } else {
        logger.info(&format!(
            "[CapabilityRegistry] Discovery complete: {} tool(s)",
            registry.len()
        ));
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logging::NoOpLogger;
    use crate::mcp::{McpError, McpResult, RemoteTool, ToolOutput};
    use async_trait::async_trait;
    use serde_json::Value;

    struct FakeServer {
        name: &'static str,
        tools: Vec<(&'static str, &'static str)>,
        broken: bool,
    }

    impl FakeServer {
        fn new(name: &'static str, tools: Vec<(&'static str, &'static str)>) -> Arc<dyn ToolTransport> {
            Arc::new(Self { name, tools, broken: false })
        }

        fn broken(name: &'static str) -> Arc<dyn ToolTransport> {
            Arc::new(Self { name, tools: vec![], broken: true })
        }
    }

    #[async_trait]
    impl ToolTransport for FakeServer {
        fn server_name(&self) -> &str {
            self.name
        }

        async fn list_tools(&self) -> McpResult<Vec<RemoteTool>> {
            if self.broken {
                return Err(McpError::ConnectionFailed("connection refused".to_string()));
            }
            Ok(self
                .tools
                .iter()
                .map(|(name, desc)| RemoteTool::new(*name, *desc))
                .collect())
        }

        async fn call_tool(&self, _name: &str, _arguments: Value) -> McpResult<ToolOutput> {
            Ok(ToolOutput::default())
        }
    }

    #[tokio::test]
    async fn test_single_server_uses_bare_names() {
        let transports = vec![FakeServer::new("bash", vec![("set_cwd", "cd"), ("execute_bash", "run")])];
        let mut registry = CapabilityRegistry::new();

        let report = discover_capabilities(&transports, &mut registry, NamingScheme::Auto, &NoOpLogger).await;

        assert_eq!(report.registered, vec!["set_cwd", "execute_bash"]);
        assert_eq!(registry.get("execute_bash").unwrap().tool_name, "execute_bash");
    }

    #[tokio::test]
    async fn test_multiple_servers_are_prefixed() {
        let transports = vec![
            FakeServer::new("bash", vec![("execute_bash", "run")]),
            FakeServer::new("shell", vec![("get_os_info", "os")]),
        ];
        let mut registry = CapabilityRegistry::new();

        discover_capabilities(&transports, &mut registry, NamingScheme::Auto, &NoOpLogger).await;

        assert_eq!(registry.names(), vec!["bash_execute_bash", "shell_get_os_info"]);
        let d = registry.get("shell_get_os_info").unwrap();
        assert_eq!(d.server, "shell");
        assert_eq!(d.tool_name, "get_os_info");
    }

    #[tokio::test]
    async fn test_later_server_wins_on_overlap() {
        let transports = vec![
            FakeServer::new("first", vec![("run", "from first"), ("only_first", "x")]),
            FakeServer::new("second", vec![("run", "from second")]),
        ];
        let mut registry = CapabilityRegistry::new();

        let report = discover_capabilities(&transports, &mut registry, NamingScheme::Bare, &NoOpLogger).await;

        assert_eq!(registry.get("run").unwrap().description, "from second");
        assert_eq!(registry.get("run").unwrap().server, "second");
        assert_eq!(registry.names(), vec!["run", "only_first"]);
        assert_eq!(report.collisions.len(), 1);
        assert_eq!(report.collisions[0].kept_server, "second");
        assert_eq!(report.collisions[0].dropped_server, "first");
    }

    #[tokio::test]
    async fn test_keep_first_and_reject_policies() {
        let transports = vec![
            FakeServer::new("first", vec![("run", "from first")]),
            FakeServer::new("second", vec![("run", "from second")]),
        ];

        for policy in [MergePolicy::KeepFirst, MergePolicy::Reject] {
            let mut registry = CapabilityRegistry::with_policy(policy);
            let report =
                discover_capabilities(&transports, &mut registry, NamingScheme::Bare, &NoOpLogger).await;

            assert_eq!(registry.get("run").unwrap().description, "from first");
            assert_eq!(report.collisions[0].policy, policy);
            assert_eq!(report.collisions[0].kept_server, "first");
            assert_eq!(report.collisions[0].dropped_server, "second");
        }
    }

    #[tokio::test]
    async fn test_failing_server_is_skipped() {
        let transports = vec![
            FakeServer::broken("down"),
            FakeServer::new("up", vec![("ping", "pong")]),
        ];
        let mut registry = CapabilityRegistry::new();

        let report = discover_capabilities(&transports, &mut registry, NamingScheme::Auto, &NoOpLogger).await;

        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].server, "down");
        assert!(report.skipped[0].error.contains("connection refused"));
        assert_eq!(registry.names(), vec!["up_ping"]);
    }

    #[tokio::test]
    async fn test_no_tools_is_not_an_error() {
        let transports = vec![FakeServer::new("empty", vec![])];
        let mut registry = CapabilityRegistry::new();

        let report = discover_capabilities(&transports, &mut registry, NamingScheme::Auto, &NoOpLogger).await;

        assert!(report.is_empty());
        assert!(report.skipped.is_empty());
        assert!(registry.is_empty());
    }
}
