//! Observability for the research agent
//!
//! Structured logging via `tracing`; see [`logging`] for the environment
//! variables that control it.

pub mod logging;

pub use logging::{init_default_logging, init_logging, parse_level, LogFormat};

// Span macro for structured logging
pub use logging::tool_span;
