//! Tagged result type returned by every tool
//!
//! Serializes to the mapping the orchestrating agent consumes:
//! `{"status": "success", ...payload}` or
//! `{"status": "error", "kind": "...", "message": "..."}`.

use crate::error::{ErrorKind, ToolFailure};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Outcome of a single tool call
///
/// The payload type `T` must serialize as a JSON object so its fields can be
/// flattened next to the `status` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum ToolResult<T> {
    Success(T),
    Error(ToolFailure),
}

impl<T> ToolResult<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, ToolResult::Success(_))
    }

    /// Payload of a successful call
    pub fn payload(&self) -> Option<&T> {
        match self {
            ToolResult::Success(payload) => Some(payload),
            ToolResult::Error(_) => None,
        }
    }

    /// Failure of an unsuccessful call
    pub fn failure(&self) -> Option<&ToolFailure> {
        match self {
            ToolResult::Success(_) => None,
            ToolResult::Error(failure) => Some(failure),
        }
    }
}

impl<T> From<Result<T, ToolFailure>> for ToolResult<T> {
    fn from(result: Result<T, ToolFailure>) -> Self {
        match result {
            Ok(payload) => ToolResult::Success(payload),
            Err(failure) => ToolResult::Error(failure),
        }
    }
}

impl<T: Serialize> ToolResult<T> {
    /// Convert into the JSON mapping handed back to the agent
    ///
    /// A payload that cannot be serialized becomes an `unexpected` error
    /// mapping, so the caller always receives a well-formed result.
    pub fn into_value(self) -> Value {
        match serde_json::to_value(&self) {
            Ok(value) => value,
            Err(e) => json!({
                "status": "error",
                "kind": ErrorKind::Unexpected,
                "message": format!("Failed to serialize tool result: {e}"),
            }),
        }
    }

    /// Erase the payload type for dynamic dispatch through the registry
    pub fn into_dynamic(self) -> ToolResult<Value> {
        match self {
            ToolResult::Success(payload) => match serde_json::to_value(payload) {
                Ok(value) => ToolResult::Success(value),
                Err(e) => ToolResult::Error(ToolFailure::unexpected(format!(
                    "Failed to serialize tool result: {e}"
                ))),
            },
            ToolResult::Error(failure) => ToolResult::Error(failure),
        }
    }
}
