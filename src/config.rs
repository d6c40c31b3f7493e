//! Configuration for the research agent
//!
//! Loaded from a TOML file. Every section is optional; missing sections and
//! fields fall back to defaults. Secrets are never stored in the file: the
//! configuration names the environment variables that hold them, and tools
//! read those variables on each call.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AgentConfig {
    #[serde(default)]
    pub agent: AgentSection,
    #[serde(default)]
    pub cloud: CloudSection,
    #[serde(default)]
    pub search: SearchSection,
    #[serde(default)]
    pub fetch: FetchSection,
}

/// Agent binding handed to the external orchestrator
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct AgentSection {
    /// Agent name reported to the runtime
    pub name: String,
    /// Hosted model identifier
    pub model: String,
    /// Override for the built-in agent instruction
    pub instruction: Option<String>,
}

impl Default for AgentSection {
    fn default() -> Self {
        Self {
            name: "deep_search_agent".to_string(),
            model: "gemini-3-flash-preview".to_string(),
            instruction: None,
        }
    }
}

/// Cloud project settings consumed by the model client
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct CloudSection {
    /// Explicit project id; takes precedence over `project_env`
    pub project: Option<String>,
    /// Environment variable containing the project id
    pub project_env: String,
    /// Model serving location
    pub location: String,
    /// Route model calls through Vertex AI
    pub use_vertexai: bool,
}

impl Default for CloudSection {
    fn default() -> Self {
        Self {
            project: None,
            project_env: "GOOGLE_CLOUD_PROJECT".to_string(),
            location: "global".to_string(),
            use_vertexai: true,
        }
    }
}

/// Search tool settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchSection {
    /// Environment variable containing the search API key
    pub api_key_env: String,
    /// Environment variable containing the search engine (context) id
    pub engine_id_env: String,
    /// Custom Search JSON API endpoint
    pub base_url: String,
    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for SearchSection {
    fn default() -> Self {
        Self {
            api_key_env: "GOOGLE_SEARCH_API_KEY".to_string(),
            engine_id_env: "GOOGLE_SEARCH_CX".to_string(),
            base_url: "https://www.googleapis.com/customsearch/v1".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Page fetch tool settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FetchSection {
    /// Maximum number of characters of extracted text returned to the agent
    pub max_content_chars: usize,
    /// Downloads larger than this many bytes are rejected
    pub max_download_bytes: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// User-Agent header sent with downloads
    pub user_agent: String,
}

impl Default for FetchSection {
    fn default() -> Self {
        Self {
            max_content_chars: 10_000,
            max_download_bytes: 5 * 1024 * 1024,
            timeout_secs: 30,
            user_agent: format!("research-agent/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl AgentConfig {
    /// Load and validate configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: AgentConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        require_non_blank("agent.name", &self.agent.name)?;
        require_non_blank("agent.model", &self.agent.model)?;
        require_non_blank("cloud.project_env", &self.cloud.project_env)?;
        require_non_blank("cloud.location", &self.cloud.location)?;
        require_non_blank("search.api_key_env", &self.search.api_key_env)?;
        require_non_blank("search.engine_id_env", &self.search.engine_id_env)?;

        url::Url::parse(&self.search.base_url).map_err(|e| {
            ConfigError::InvalidConfig(format!(
                "search.base_url '{}' is not a valid URL: {e}",
                self.search.base_url
            ))
        })?;

        if self.search.timeout_secs == 0 || self.fetch.timeout_secs == 0 {
            return Err(ConfigError::InvalidConfig(
                "timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.fetch.max_content_chars == 0 {
            return Err(ConfigError::InvalidConfig(
                "fetch.max_content_chars must be greater than zero".to_string(),
            ));
        }
        if self.fetch.max_download_bytes == 0 {
            return Err(ConfigError::InvalidConfig(
                "fetch.max_download_bytes must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }

    /// Read a required environment variable, treating empty values as unset
    pub fn get_env_var_required(env_var_name: &str) -> Result<String, ConfigError> {
        std::env::var(env_var_name)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .ok_or_else(|| ConfigError::EnvVarNotFound(env_var_name.to_string()))
    }
}

fn require_non_blank(field: &str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::InvalidConfig(format!("{field} must not be empty")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AgentConfig::from_toml_str("").unwrap();

        assert_eq!(config, AgentConfig::default());
        assert_eq!(config.search.api_key_env, "GOOGLE_SEARCH_API_KEY");
        assert_eq!(config.search.engine_id_env, "GOOGLE_SEARCH_CX");
        assert_eq!(config.fetch.max_content_chars, 10_000);
        assert_eq!(config.cloud.location, "global");
    }

    #[test]
    fn test_partial_section_keeps_other_defaults() {
        let config = AgentConfig::from_toml_str(
            r#"
[fetch]
max_content_chars = 500
"#,
        )
        .unwrap();

        assert_eq!(config.fetch.max_content_chars, 500);
        assert_eq!(config.fetch.timeout_secs, 30);
        assert_eq!(config.search, SearchSection::default());
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        let result = AgentConfig::from_toml_str(
            r#"
[search]
timeout_secs = 0
"#,
        );
        assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
    }

    #[test]
    fn test_blank_env_var_name_is_rejected() {
        let result = AgentConfig::from_toml_str(
            r#"
[search]
api_key_env = "  "
"#,
        );
        assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
    }

    #[test]
    fn test_invalid_base_url_is_rejected() {
        let result = AgentConfig::from_toml_str(
            r#"
[search]
base_url = "not a url"
"#,
        );
        assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
    }

    #[test]
    fn test_malformed_toml_is_parse_error() {
        let result = AgentConfig::from_toml_str("[search");
        assert!(matches!(result, Err(ConfigError::TomlParse(_))));
    }

    #[test]
    fn test_missing_env_var() {
        let result = AgentConfig::get_env_var_required("RESEARCH_AGENT_TEST_UNSET_VARIABLE");
        assert!(matches!(result, Err(ConfigError::EnvVarNotFound(_))));
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let config = AgentConfig::default();
        let rendered = toml::to_string_pretty(&config).unwrap();
        assert_eq!(AgentConfig::from_toml_str(&rendered).unwrap(), config);
    }
}
