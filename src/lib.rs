//! Research Agent - tool layer for a conversational research assistant
//!
//! An external, tool-calling language model answers user questions with three
//! stateless tools provided by this crate:
//! - `search_google`: Google Custom Search results (title, link, snippet)
//! - `visit_webpage`: main-body text of a page, boilerplate removed
//! - `get_current_time`: the local date and time
//!
//! Every tool returns a [`ToolResult`], serialized as a mapping with a
//! `status` of `"success"` or `"error"`. Tools never propagate failures: the
//! agent always receives data it can reason about.
//!
//! # Quick Start
//!
//! ```rust
//! use research_agent::tools::builtin::CurrentTimeTool;
//!
//! let result = CurrentTimeTool::new().current_time();
//! assert!(result.is_success());
//!
//! let value = result.into_value();
//! assert_eq!(value["status"], "success");
//! ```

pub mod agent;
pub mod bootstrap;
pub mod config;
pub mod error;
pub mod observability;
pub mod testing;
pub mod tools;

pub use agent::AgentBinding;
pub use bootstrap::RuntimeContext;
pub use config::{AgentConfig, ConfigError};
pub use error::{ErrorKind, ToolFailure};
pub use tools::{Tool, ToolDescription, ToolError, ToolRegistry, ToolResult};
