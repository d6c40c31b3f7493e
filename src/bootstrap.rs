//! Explicit process initialization
//!
//! Resolves the cloud settings the model client needs into a
//! [`RuntimeContext`]. `main` calls [`initialize`] once before building the
//! agent binding. Nothing here mutates the process environment.

use crate::config::{AgentConfig, CloudSection, ConfigError};
use serde::Serialize;
use tracing::{info, warn};

/// Resolved cloud settings handed to the agent binding
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuntimeContext {
    /// Project id, absent when neither the config nor the environment provides one
    pub project_id: Option<String>,
    pub location: String,
    pub use_vertexai: bool,
}

impl RuntimeContext {
    /// Project id, required by a model client that routes through Vertex AI
    pub fn require_project(&self) -> Result<&str, ConfigError> {
        self.project_id
            .as_deref()
            .ok_or_else(|| ConfigError::EnvVarNotFound("cloud project id".to_string()))
    }
}

/// Resolve cloud settings once at startup
///
/// A missing project id is logged rather than fatal: the tools themselves do
/// not need it, only the hosted model client does.
pub fn initialize(cloud: &CloudSection) -> Result<RuntimeContext, ConfigError> {
    if cloud.location.trim().is_empty() {
        return Err(ConfigError::InvalidConfig(
            "cloud.location must not be empty".to_string(),
        ));
    }

    let project_id = cloud
        .project
        .clone()
        .filter(|project| !project.trim().is_empty())
        .or_else(|| AgentConfig::get_env_var_required(&cloud.project_env).ok());

    if project_id.is_none() && cloud.use_vertexai {
        warn!(
            project_env = %cloud.project_env,
            "No cloud project configured; model calls through Vertex AI will fail"
        );
    }

    let context = RuntimeContext {
        project_id,
        location: cloud.location.clone(),
        use_vertexai: cloud.use_vertexai,
    };

    info!(
        location = %context.location,
        use_vertexai = context.use_vertexai,
        has_project = context.project_id.is_some(),
        "Runtime initialized"
    );

    Ok(context)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cloud(project: Option<&str>, project_env: &str) -> CloudSection {
        CloudSection {
            project: project.map(str::to_string),
            project_env: project_env.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_explicit_project_wins() {
        let context = initialize(&cloud(Some("my-project"), "RESEARCH_AGENT_TEST_NO_PROJECT"))
            .unwrap();

        assert_eq!(context.project_id.as_deref(), Some("my-project"));
        assert_eq!(context.location, "global");
        assert!(context.use_vertexai);
    }

    #[test]
    fn test_project_from_environment() {
        std::env::set_var("RESEARCH_AGENT_TEST_BOOTSTRAP_PROJECT", "env-project");
        let context =
            initialize(&cloud(None, "RESEARCH_AGENT_TEST_BOOTSTRAP_PROJECT")).unwrap();

        assert_eq!(context.require_project().unwrap(), "env-project");
    }

    #[test]
    fn test_missing_project_is_not_fatal() {
        let context = initialize(&cloud(None, "RESEARCH_AGENT_TEST_NO_PROJECT")).unwrap();

        assert!(context.project_id.is_none());
        assert!(matches!(
            context.require_project(),
            Err(ConfigError::EnvVarNotFound(_))
        ));
    }

    #[test]
    fn test_blank_location_is_rejected() {
        let mut section = cloud(Some("p"), "X");
        section.location = " ".to_string();

        assert!(matches!(
            initialize(&section),
            Err(ConfigError::InvalidConfig(_))
        ));
    }
}
