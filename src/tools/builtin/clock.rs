//! Current-time tool
//!
//! Reports the host's local wall-clock time. Reading the clock is treated as
//! infallible, so this tool only ever returns a success result.

use crate::tools::{parameter_schema, Tool, ToolDescription, ToolResult};
use async_trait::async_trait;
use chrono::{DateTime, Local, TimeZone};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt::Display;

pub const TOOL_NAME: &str = "get_current_time";

/// `chrono` format of the returned timestamp, e.g. `2025-03-14 09:26:53 Friday`
pub const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S %A";

/// The tool takes no arguments
#[derive(Debug, Default, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CurrentTimeParams {}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentTime {
    pub current_time: String,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CurrentTimeTool;

impl CurrentTimeTool {
    pub fn new() -> Self {
        Self
    }

    /// Read the local clock and format it
    pub fn current_time(&self) -> ToolResult<CurrentTime> {
        ToolResult::Success(CurrentTime {
            current_time: format_timestamp(&Local::now()),
        })
    }
}

/// Format any zoned timestamp with [`TIME_FORMAT`] (pure function)
pub fn format_timestamp<Tz>(timestamp: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: Display,
{
    timestamp.format(TIME_FORMAT).to_string()
}

#[async_trait]
impl Tool for CurrentTimeTool {
    fn describe(&self) -> ToolDescription {
        ToolDescription {
            name: TOOL_NAME.to_string(),
            description: "Returns the current local date and time as 'YYYY-MM-DD HH:MM:SS Weekday'. \
                Use it when the user asks for today's date or the time, or when a question needs \
                a temporal baseline (e.g. 'how long ago was X?')."
                .to_string(),
            parameters: parameter_schema::<CurrentTimeParams>(),
        }
    }

    async fn execute(&self, _parameters: &Value) -> ToolResult<Value> {
        self.current_time().into_dynamic()
    }
}
