//! Tool system for the research agent
//!
//! Each tool is stateless: it receives named JSON arguments, runs to
//! completion, and returns a [`ToolResult`]. The [`ToolRegistry`] is the
//! binding an orchestrating agent talks to: it lists tool descriptions and
//! dispatches calls after validating arguments against each tool's schema.

use crate::config::AgentConfig;
use crate::error::ToolFailure;
use crate::tool_span;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use std::future::Future;
use thiserror::Error;
use tracing::{error, Instrument};

pub mod builtin;
pub mod result;

pub use result::ToolResult;

/// Interface every research tool implements
#[async_trait]
pub trait Tool: Send + Sync {
    /// Name, description and JSON schema of the parameters
    fn describe(&self) -> ToolDescription;

    /// Run the tool with already-validated parameters
    ///
    /// Implementations absorb every failure into the returned result.
    async fn execute(&self, parameters: &Value) -> ToolResult<Value>;
}

/// Tool description handed to the agent runtime as a function declaration
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDescription {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

/// Generate a parameter schema for a tool from its argument struct
pub fn parameter_schema<T: schemars::JsonSchema>() -> Value {
    let schema = schemars::schema_for!(T);
    serde_json::to_value(schema).unwrap_or_else(|_| json!({"type": "object"}))
}

/// Decode tool arguments, reporting bad shapes as `invalid_input`
pub fn parse_parameters<T: DeserializeOwned>(parameters: &Value) -> Result<T, ToolFailure> {
    let parameters = if parameters.is_null() {
        json!({})
    } else {
        parameters.clone()
    };
    serde_json::from_value(parameters)
        .map_err(|e| ToolFailure::invalid_input(format!("Invalid tool arguments: {e}")))
}

/// Run a tool body on its own task so that a panic becomes an `unexpected` result
pub async fn absorb_panics<T, F>(tool_name: &'static str, body: F) -> ToolResult<T>
where
    T: Send + 'static,
    F: Future<Output = ToolResult<T>> + Send + 'static,
{
    match tokio::spawn(body).await {
        Ok(result) => result,
        Err(join_error) => {
            error!(tool = tool_name, error = %join_error, "Tool call aborted");
            ToolResult::Error(ToolFailure::unexpected(format!(
                "{tool_name} failed unexpectedly: {join_error}"
            )))
        }
    }
}

/// Registry of the tools exposed to the agent
pub struct ToolRegistry {
    tools: BTreeMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: BTreeMap::new(),
        }
    }

    /// Registry holding the three builtin research tools
    pub fn with_builtin_tools(config: &AgentConfig) -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(builtin::CurrentTimeTool::new()));
        registry.register(Box::new(builtin::WebSearchTool::new(config.search.clone())));
        registry.register(Box::new(builtin::PageFetchTool::from_config(&config.fetch)));
        registry
    }

    /// Add a tool, replacing any tool already registered under the same name
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.describe().name;
        self.tools.insert(name, tool);
    }

    /// Descriptions of every registered tool, ordered by name
    pub fn descriptions(&self) -> Vec<ToolDescription> {
        self.tools.values().map(|tool| tool.describe()).collect()
    }

    /// Execute a tool with validated parameters
    pub async fn execute_tool(
        &self,
        tool_name: &str,
        parameters: &Value,
    ) -> Result<ToolResult<Value>, ToolError> {
        let tool = self
            .tools
            .get(tool_name)
            .ok_or_else(|| ToolError::UnknownTool(tool_name.to_string()))?;

        let parameters = if parameters.is_null() {
            json!({})
        } else {
            parameters.clone()
        };
        Self::validate_parameters(&tool.describe(), &parameters)?;

        let span = tool_span!(tool = tool_name);
        Ok(tool.execute(&parameters).instrument(span).await)
    }

    fn validate_parameters(
        description: &ToolDescription,
        parameters: &Value,
    ) -> Result<(), ToolError> {
        let validator = jsonschema::validator_for(&description.parameters)
            .map_err(|e| ToolError::SchemaError(format!("Schema compilation error: {e}")))?;

        validator.validate(parameters).map_err(|errors| {
            let error_messages: Vec<String> = errors
                .map(|e| format!("At '{}': {}", e.instance_path, e))
                .collect();
            ToolError::ValidationError(error_messages.join("; "))
        })
    }

    pub fn list_tools(&self) -> Vec<String> {
        self.tools.keys().cloned().collect()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Errors raised by the registry itself, before a tool is entered
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),
    #[error("Parameter validation failed: {0}")]
    ValidationError(String),
    #[error("Schema error: {0}")]
    SchemaError(String),
}

impl From<ToolError> for ToolFailure {
    fn from(error: ToolError) -> Self {
        match error {
            ToolError::UnknownTool(_) | ToolError::ValidationError(_) => {
                ToolFailure::invalid_input(error.to_string())
            }
            ToolError::SchemaError(_) => ToolFailure::unexpected(error.to_string()),
        }
    }
}
