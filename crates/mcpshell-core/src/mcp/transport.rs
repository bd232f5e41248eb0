//! The seam between discovery/dispatch and a concrete MCP connection

use async_trait::async_trait;
use rmcp::model::{CallToolResult, RawContent, Tool};
use serde_json::Value;

use super::client::McpResult;

/// A tool as advertised by a server's catalog
#[derive(Debug, Clone, PartialEq)]
pub struct RemoteTool {
    pub name: String,
    pub description: Option<String>,
    pub input_schema: Value,
}

impl RemoteTool {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: Some(description.into()),
            input_schema: serde_json::json!({ "type": "object", "properties": {} }),
        }
    }

    pub fn with_schema(mut self, schema: Value) -> Self {
        self.input_schema = schema;
        self
    }
}

impl From<Tool> for RemoteTool {
    fn from(tool: Tool) -> Self {
        Self {
            name: tool.name.to_string(),
            description: tool.description.map(|d| d.to_string()),
            input_schema: Value::Object((*tool.input_schema).clone()),
        }
    }
}

/// Text blocks returned by a tool call
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ToolOutput {
    pub blocks: Vec<String>,
    pub is_error: bool,
}

impl ToolOutput {
    pub fn success(blocks: Vec<String>) -> Self {
        Self { blocks, is_error: false }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            blocks: vec![message.into()],
            is_error: true,
        }
    }

    /// All blocks joined with newlines, skipping empty ones
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .filter(|b| !b.is_empty())
            .cloned()
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Block at `index`, or an empty string
    pub fn block(&self, index: usize) -> &str {
        self.blocks.get(index).map(String::as_str).unwrap_or("")
    }
}

impl From<CallToolResult> for ToolOutput {
    fn from(result: CallToolResult) -> Self {
        let blocks = result
            .content
            .iter()
            .map(|content| match &content.raw {
                RawContent::Text(text) => text.text.clone(),
                RawContent::Image(img) => format!("[image: {}]", img.mime_type),
                RawContent::ResourceLink(link) => format!("[resource-link: {}]", link.uri),
                _ => "[unsupported content]".to_string(),
            })
            .collect();

        Self {
            blocks,
            is_error: result.is_error.unwrap_or(false),
        }
    }
}

/// A named connection to one tool server
#[async_trait]
pub trait ToolTransport: Send + Sync {
    /// Logical server name from the configuration
    fn server_name(&self) -> &str;

    /// Fetch the server's tool catalog
    async fn list_tools(&self) -> McpResult<Vec<RemoteTool>>;

    /// Invoke a tool by its server-local name
    async fn call_tool(&self, name: &str, arguments: Value) -> McpResult<ToolOutput>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use rmcp::model::Content;

    #[test]
    fn test_output_from_call_result() {
        let result = CallToolResult::success(vec![Content::text("hello\n"), Content::text("")]);
        let output = ToolOutput::from(result);
        assert_eq!(output.blocks, vec!["hello\n", ""]);
        assert!(!output.is_error);
        assert_eq!(output.block(0), "hello\n");
        assert_eq!(output.block(1), "");
        assert_eq!(output.block(7), "");
        assert_eq!(output.text(), "hello\n");

        let failed = ToolOutput::from(CallToolResult::error(vec![Content::text("bad dir")]));
        assert!(failed.is_error);
        assert_eq!(failed.text(), "bad dir");
    }

    #[test]
    fn test_remote_tool_builders() {
        let tool = RemoteTool::new("pwd", "Print directory")
            .with_schema(serde_json::json!({"type": "object"}));
        assert_eq!(tool.description.as_deref(), Some("Print directory"));
        assert_eq!(tool.input_schema["type"], "object");
    }
}
