//! Dispatch of model tool calls to the owning server

use std::sync::Arc;

use async_trait::async_trait;

use crate::logging::Logger;
use crate::mcp::{McpError, ServerPool};
use crate::types::{Tool, ToolCall, ToolResult};

use super::registry::CapabilityRegistry;

/// Anything that can turn a tool call into a tool result
#[async_trait]
pub trait ToolDispatcher: Send + Sync {
    /// Tool definitions offered to the model
    fn tools(&self) -> Vec<Tool>;

    /// Execute a call; failures come back as error results
    async fn dispatch(&self, call: &ToolCall) -> ToolResult;
}

/// Routes calls through the registry to the server that owns the tool
pub struct ToolRouter {
    registry: Arc<CapabilityRegistry>,
    pool: ServerPool,
    logger: Arc<dyn Logger>,
}

impl ToolRouter {
    pub fn new(registry: Arc<CapabilityRegistry>, pool: ServerPool, logger: Arc<dyn Logger>) -> Self {
        Self { registry, pool, logger }
    }

    pub fn registry(&self) -> &CapabilityRegistry {
        &self.registry
    }

    async fn try_dispatch(&self, call: &ToolCall) -> Result<ToolResult, McpError> {
        let descriptor = self
            .registry
            .get(&call.name)
            .ok_or_else(|| McpError::UnknownTool(call.name.clone()))?;

        let transport = self
            .pool
            .get(&descriptor.server)
            .ok_or_else(|| McpError::ConnectionFailed(format!("server '{}' is not connected", descriptor.server)))?;

        let output = transport
            .call_tool(&descriptor.tool_name, call.input.clone())
            .await?;

        Ok(if output.is_error {
            ToolResult::error(call, output.text())
        } else {
            ToolResult::success(call, output.text())
        })
    }
}

#[async_trait]
impl ToolDispatcher for ToolRouter {
    fn tools(&self) -> Vec<Tool> {
        self.registry.to_tools()
    }

    async fn dispatch(&self, call: &ToolCall) -> ToolResult {
        self.logger.info(&format!("[ToolRouter] Dispatching {}", call.name));

        match self.try_dispatch(call).await {
            Ok(result) => result,
            Err(e) => {
                self.logger.error(&format!("[ToolRouter] {} failed: {}", call.name, e));
                ToolResult::error(call, format!("Error: {}", e))
            }
        }
    }
}
