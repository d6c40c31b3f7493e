//! Failure taxonomy shared by every research tool
//!
//! Tools never return `Err` or panic across their boundary. Every failure is
//! classified into an [`ErrorKind`] and carried as data inside a
//! [`ToolFailure`], which the orchestrating agent can reason about.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of a failure message handed to the model
const MAX_MESSAGE_LEN: usize = 500;

static SECRET_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(password|token|key|secret|cx)[=:]\s*[^\s&]+")
        .expect("secret pattern is a valid regex")
});

static SENSITIVE_PATH_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/[a-zA-Z0-9._/-]+/(secrets?|\.ssh|\.aws|\.config)/[a-zA-Z0-9._/-]+")
        .expect("path pattern is a valid regex")
});

/// Classification of a tool failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Required environment configuration is missing; detected before any network attempt
    Configuration,
    /// The network request failed or returned no usable payload
    Transport,
    /// The payload arrived but was unusable after processing
    Content,
    /// Arguments were well-formed JSON but semantically unusable (e.g. a blank query)
    InvalidInput,
    /// Anything else, caught generically at the tool boundary
    Unexpected,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Configuration => "configuration",
            ErrorKind::Transport => "transport",
            ErrorKind::Content => "content",
            ErrorKind::InvalidInput => "invalid_input",
            ErrorKind::Unexpected => "unexpected",
        };
        f.write_str(name)
    }
}

/// Error branch of a tool result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolFailure {
    pub kind: ErrorKind,
    pub message: String,
}

impl ToolFailure {
    /// Build a failure, sanitizing the message before it leaves the tool
    pub fn new<S: Into<String>>(kind: ErrorKind, message: S) -> Self {
        Self {
            kind,
            message: sanitize_error_message(&message.into()),
        }
    }

    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    pub fn transport<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::Transport, message)
    }

    pub fn content<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::Content, message)
    }

    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::InvalidInput, message)
    }

    pub fn unexpected<S: Into<String>>(message: S) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }
}

impl fmt::Display for ToolFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} error: {}", self.kind, self.message)
    }
}

impl std::error::Error for ToolFailure {}

/// Redact credentials and sensitive paths, and cap the length
///
/// reqwest error strings embed the full request URL, which for the search API
/// carries the API key as a query parameter.
pub fn sanitize_error_message(message: &str) -> String {
    let mut sanitized = SECRET_PATTERN
        .replace_all(message, "${1}=***")
        .to_string();

    sanitized = SENSITIVE_PATH_PATTERN
        .replace_all(&sanitized, "/***REDACTED***/")
        .to_string();

    if sanitized.chars().count() > MAX_MESSAGE_LEN {
        let truncate_suffix = "...[truncated]";
        let keep = MAX_MESSAGE_LEN - truncate_suffix.len();
        sanitized = sanitized.chars().take(keep).collect::<String>() + truncate_suffix;
    }

    sanitized
}
