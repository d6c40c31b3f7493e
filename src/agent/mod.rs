//! Agent binding
//!
//! Bundles what the external orchestrating agent needs: its name, model,
//! instruction and the tool registry. The reasoning loop itself runs in the
//! agent runtime; this binding only answers "which tools exist" and "run this
//! tool call".

pub mod instruction;

use crate::bootstrap::RuntimeContext;
use crate::config::AgentConfig;
use crate::error::ToolFailure;
use crate::tools::{ToolDescription, ToolRegistry, ToolResult};
use serde_json::Value;
use tracing::warn;

pub use instruction::DEFAULT_INSTRUCTION;

/// Tools plus instruction, ready to hand to an agent runtime
pub struct AgentBinding {
    name: String,
    model: String,
    instruction: String,
    runtime: RuntimeContext,
    registry: ToolRegistry,
}

impl AgentBinding {
    /// Build the binding with the builtin tools
    pub fn new(config: &AgentConfig, runtime: RuntimeContext) -> Self {
        Self::with_registry(config, runtime, ToolRegistry::with_builtin_tools(config))
    }

    /// Build the binding around a caller-supplied registry
    pub fn with_registry(
        config: &AgentConfig,
        runtime: RuntimeContext,
        registry: ToolRegistry,
    ) -> Self {
        let instruction = config
            .agent
            .instruction
            .clone()
            .filter(|text| !text.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_INSTRUCTION.to_string());

        Self {
            name: config.agent.name.clone(),
            model: config.agent.model.clone(),
            instruction,
            runtime,
            registry,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn instruction(&self) -> &str {
        &self.instruction
    }

    pub fn runtime(&self) -> &RuntimeContext {
        &self.runtime
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }

    /// Function declarations for the model, one per tool
    pub fn tool_declarations(&self) -> Vec<ToolDescription> {
        self.registry.descriptions()
    }

    /// Handle one tool call from the model
    ///
    /// Registry errors (unknown tool, invalid arguments) are folded into an
    /// error result, so the model always receives a well-formed mapping.
    pub async fn handle_tool_call(&self, tool_name: &str, arguments: &Value) -> Value {
        let result = match self.registry.execute_tool(tool_name, arguments).await {
            Ok(result) => result,
            Err(e) => {
                warn!(tool = tool_name, error = %e, "Rejected tool call");
                ToolResult::Error(ToolFailure::from(e))
            }
        };
        result.into_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn runtime() -> RuntimeContext {
        RuntimeContext {
            project_id: Some("test-project".to_string()),
            location: "global".to_string(),
            use_vertexai: true,
        }
    }

    #[test]
    fn test_default_instruction_is_used() {
        let binding = AgentBinding::new(&AgentConfig::default(), runtime());

        assert_eq!(binding.name(), "deep_search_agent");
        assert_eq!(binding.instruction(), DEFAULT_INSTRUCTION);
        assert_eq!(binding.tool_declarations().len(), 3);
    }

    #[test]
    fn test_instruction_override() {
        let mut config = AgentConfig::default();
        config.agent.instruction = Some("Be brief.".to_string());

        let binding = AgentBinding::new(&config, runtime());
        assert_eq!(binding.instruction(), "Be brief.");
    }

    #[test]
    fn test_instruction_mentions_every_tool() {
        let binding = AgentBinding::new(&AgentConfig::default(), runtime());
        for declaration in binding.tool_declarations() {
            assert!(
                binding.instruction().contains(&declaration.name),
                "instruction does not mention {}",
                declaration.name
            );
        }
    }

    #[tokio::test]
    async fn test_unknown_tool_call_becomes_error_mapping() {
        let binding = AgentBinding::new(&AgentConfig::default(), runtime());
        let value = binding.handle_tool_call("delete_everything", &json!({})).await;

        assert_eq!(value["status"], "error");
        assert_eq!(value["kind"], "invalid_input");
    }

    #[tokio::test]
    async fn test_clock_call_succeeds() {
        let binding = AgentBinding::new(&AgentConfig::default(), runtime());
        let value = binding.handle_tool_call("get_current_time", &json!({})).await;

        assert_eq!(value["status"], "success");
    }
}
