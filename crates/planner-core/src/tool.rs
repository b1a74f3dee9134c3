//! Tool System
//!
//! Tools the interactive loop offers to the model. The registry is filled
//! before a session starts and is read-only afterwards.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{AgentError, Result};
use crate::function::{FunctionCall, FunctionDeclaration, ParameterSchema};

/// Tool call request from the LLM with decoded arguments
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool identifier
    pub name: String,

    /// Arguments as key-value pairs
    pub arguments: Map<String, Value>,
}

impl TryFrom<&FunctionCall> for ToolCall {
    type Error = AgentError;

    fn try_from(call: &FunctionCall) -> Result<Self> {
        Ok(Self {
            name: call.name.clone(),
            arguments: call.parse_arguments()?,
        })
    }
}

/// Result from tool execution
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolResult {
    /// Tool that was called
    pub name: String,

    /// Whether execution succeeded
    pub success: bool,

    /// Output (observation text or error)
    pub output: String,
}

impl ToolResult {
    pub fn success(name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            success: true,
            output: output.into(),
        }
    }

    pub fn failure(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            success: false,
            output: error.into(),
        }
    }
}

/// Tool trait - implement to add new capabilities
#[async_trait]
pub trait Tool: Send + Sync {
    /// Declaration sent to the model
    fn declaration(&self) -> FunctionDeclaration;

    /// Tool name; matches the declaration name
    fn name(&self) -> String {
        self.declaration().name
    }

    /// Execute the tool with given arguments
    async fn execute(&self, call: &ToolCall) -> Result<ToolResult>;

    /// Validate arguments before execution
    fn validate(&self, call: &ToolCall) -> Result<()> {
        self.declaration().validate(&call.arguments)
    }
}

/// Registry for available tools
#[derive(Default)]
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new tool
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.tools.insert(tool.name(), Arc::new(tool));
    }

    /// Get a tool by exact name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.get(name).cloned()
    }

    /// Execute a tool call
    pub async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
        let tool = self
            .get(&call.name)
            .ok_or_else(|| AgentError::ToolNotFound(call.name.clone()))?;

        tool.validate(call)?;
        tool.execute(call).await
    }

    /// All tool declarations, ordered by name
    pub fn declarations(&self) -> Vec<FunctionDeclaration> {
        let mut decls: Vec<_> = self.tools.values().map(|t| t.declaration()).collect();
        decls.sort_by(|a, b| a.name.cmp(&b.name));
        decls
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

// ============================================================================
// Built-in Tools
// ============================================================================

const DEFAULT_SEARCH_ANSWER: &str =
    "Lebron James has played for the Cavaliers, Heat, and the Lakers.";

/// Search tool stand-in: answers every query with a configured observation
pub struct GoogleTool {
    answer: String,
}

impl GoogleTool {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
        }
    }
}

impl Default for GoogleTool {
    fn default() -> Self {
        Self::new(DEFAULT_SEARCH_ANSWER)
    }
}

#[async_trait]
impl Tool for GoogleTool {
    fn declaration(&self) -> FunctionDeclaration {
        FunctionDeclaration::new("google", "Query the Google search engine")
            .param(ParameterSchema::string("query").required())
    }

    async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
        let query = call
            .arguments
            .get("query")
            .and_then(Value::as_str)
            .ok_or_else(|| AgentError::ToolValidation("Missing query".into()))?;

        tracing::debug!(%query, "search");
        Ok(ToolResult::success("google", self.answer.clone()))
    }
}

/// DateTime tool - returns current time
pub struct DateTimeTool;

#[async_trait]
impl Tool for DateTimeTool {
    fn declaration(&self) -> FunctionDeclaration {
        FunctionDeclaration::new("datetime", "Get the current date and time (UTC)").param(
            ParameterSchema::string("format")
                .describe("Output format: 'iso', 'human', or 'unix'")
                .one_of(vec![json!("iso"), json!("human"), json!("unix")]),
        )
    }

    async fn execute(&self, call: &ToolCall) -> Result<ToolResult> {
        let format = call
            .arguments
            .get("format")
            .and_then(Value::as_str)
            .unwrap_or("human");

        let now = chrono::Utc::now();

        let output = match format {
            "iso" => now.to_rfc3339(),
            "unix" => now.timestamp().to_string(),
            "human" => now.format("%A, %B %d, %Y at %H:%M:%S UTC").to_string(),
            other => {
                return Ok(ToolResult::failure(
                    "datetime",
                    format!("Unknown format '{other}'"),
                ));
            }
        };

        Ok(ToolResult::success("datetime", output))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(GoogleTool::default());
        registry.register(DateTimeTool);
        registry
    }

    fn call(name: &str, arguments: &Value) -> ToolCall {
        ToolCall::try_from(&FunctionCall::new(name, arguments.to_string())).unwrap()
    }

    #[test]
    fn test_tool_registry() {
        let registry = registry();

        assert_eq!(registry.len(), 2);
        assert!(!registry.is_empty());
        assert!(registry.get("google").is_some());
        assert!(registry.get("Google").is_none());

        let decls = registry.declarations();
        let names: Vec<&str> = decls.iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["datetime", "google"]);
        assert_eq!(decls[1].parameters_schema()["required"], json!(["query"]));
    }

    #[tokio::test]
    async fn test_google_returns_configured_answer() {
        let mut registry = ToolRegistry::new();
        registry.register(GoogleTool::new("Paris"));

        let result = registry
            .execute(&call("google", &json!({"query": "capital of France"})))
            .await
            .unwrap();
        assert!(result.success);
        assert_eq!(result.output, "Paris");
    }

    #[tokio::test]
    async fn test_missing_required_argument() {
        let err = registry()
            .execute(&call("google", &json!({})))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::ToolValidation(_)));
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let err = registry()
            .execute(&call("bing", &json!({"query": "x"})))
            .await
            .unwrap_err();
        assert!(matches!(err, AgentError::ToolNotFound(name) if name == "bing"));
    }

    #[tokio::test]
    async fn test_datetime_formats() {
        let registry = registry();
        let unix = registry
            .execute(&call("datetime", &json!({"format": "unix"})))
            .await
            .unwrap();
        assert!(unix.output.parse::<i64>().is_ok());

        let bad = registry
            .execute(&call("datetime", &json!({"format": "roman"})))
            .await
            .unwrap();
        assert!(!bad.success);
    }
}
