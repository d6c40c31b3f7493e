//! Web search tool implementation
//!
//! Queries the Google Custom Search JSON API and returns the title, link and
//! snippet of each hit in upstream relevance order. Credentials are read from
//! the environment on every call and never cached.

use crate::config::{AgentConfig, SearchSection};
use crate::error::ToolFailure;
use crate::tools::{
    absorb_panics, parameter_schema, parse_parameters, Tool, ToolDescription, ToolResult,
};
use async_trait::async_trait;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, warn};

pub const TOOL_NAME: &str = "search_google";

/// Result count used when the caller does not ask for one
pub const DEFAULT_NUM_RESULTS: i64 = 5;

/// Largest page the Custom Search API returns in one request
pub const MAX_NUM_RESULTS: i64 = 10;

fn default_num_results() -> i64 {
    DEFAULT_NUM_RESULTS
}

/// Arguments accepted by the search tool
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SearchParams {
    /// The search string. Make it specific, e.g. "current CEO of Google".
    pub query: String,
    /// Number of results (1-10, default 5). Out-of-range values are clamped.
    #[serde(default = "default_num_results")]
    pub num_results: i64,
}

/// A validated search request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    text: String,
    num_results: u8,
}

impl SearchQuery {
    /// Validate the query text and clamp the result count into `1..=10`
    pub fn new(text: &str, num_results: i64) -> Result<Self, ToolFailure> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ToolFailure::invalid_input("Search query must not be empty."));
        }

        let clamped = num_results.clamp(1, MAX_NUM_RESULTS);
        if clamped != num_results {
            warn!(
                requested = num_results,
                used = clamped,
                "num_results outside 1..={MAX_NUM_RESULTS}, clamping"
            );
        }

        Ok(Self {
            text: text.to_string(),
            num_results: clamped as u8,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn num_results(&self) -> u8 {
        self.num_results
    }
}

/// One normalized search hit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResultItem {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub link: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

/// Success payload of the search tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResults {
    pub query: String,
    pub count: usize,
    /// Upstream estimate of the total number of matching pages
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total_results: Option<u64>,
    pub results: Vec<SearchResultItem>,
}

/// API key and engine id, resolved per call
#[derive(Clone)]
struct SearchCredentials {
    api_key: String,
    engine_id: String,
}

impl SearchCredentials {
    fn from_env(settings: &SearchSection) -> Result<Self, ToolFailure> {
        match (
            AgentConfig::get_env_var_required(&settings.api_key_env),
            AgentConfig::get_env_var_required(&settings.engine_id_env),
        ) {
            (Ok(api_key), Ok(engine_id)) => Ok(Self { api_key, engine_id }),
            _ => Err(ToolFailure::configuration(format!(
                "Missing Service Configuration. Environment variables {} or {} are not set.",
                settings.api_key_env, settings.engine_id_env
            ))),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CustomSearchResponse {
    #[serde(default)]
    items: Vec<RawSearchItem>,
    #[serde(rename = "searchInformation")]
    search_information: Option<SearchInformation>,
}

#[derive(Debug, Deserialize)]
struct RawSearchItem {
    title: Option<String>,
    link: Option<String>,
    snippet: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SearchInformation {
    #[serde(rename = "totalResults")]
    total_results: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    error: ApiErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ApiErrorDetail {
    message: String,
}

/// Web search tool backed by the Custom Search JSON API
#[derive(Debug, Clone)]
pub struct WebSearchTool {
    settings: SearchSection,
}

impl WebSearchTool {
    pub fn new(settings: SearchSection) -> Self {
        Self { settings }
    }

    /// Run one search; every failure is returned as an error result
    pub async fn search(&self, query: &str, num_results: i64) -> ToolResult<SearchResults> {
        let settings = self.settings.clone();
        let query = query.to_string();
        absorb_panics(TOOL_NAME, async move {
            let result: ToolResult<SearchResults> =
                Self::run_search(&settings, &query, num_results).await.into();
            result
        })
        .await
    }

    async fn run_search(
        settings: &SearchSection,
        query: &str,
        num_results: i64,
    ) -> Result<SearchResults, ToolFailure> {
        let request = SearchQuery::new(query, num_results)?;

        let credentials = SearchCredentials::from_env(settings).map_err(|failure| {
            warn!("{}", failure.message);
            failure
        })?;

        debug!(query = request.text(), num = request.num_results(), "Searching");

        let response = Self::fetch_results(settings, &credentials, &request)
            .await
            .map_err(|failure| {
                error!(query = request.text(), "Search failed: {}", failure.message);
                failure
            })?;

        let results =
            Self::parse_search_response(query, usize::from(request.num_results()), response);
        debug!(query = request.text(), count = results.count, "Search complete");
        Ok(results)
    }

    /// Issue the request (impure I/O)
    ///
    /// The client is built per call so no connection outlives it.
    async fn fetch_results(
        settings: &SearchSection,
        credentials: &SearchCredentials,
        query: &SearchQuery,
    ) -> Result<CustomSearchResponse, ToolFailure> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()
            .map_err(|e| ToolFailure::unexpected(format!("Failed to build HTTP client: {e}")))?;

        let num = query.num_results().to_string();
        let response = client
            .get(&settings.base_url)
            .query(&[
                ("key", credentials.api_key.as_str()),
                ("cx", credentials.engine_id.as_str()),
                ("q", query.text()),
                ("num", num.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ToolFailure::transport(format!("Search request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ToolFailure::transport(Self::describe_api_error(
                status.as_u16(),
                &body,
            )));
        }

        response
            .json::<CustomSearchResponse>()
            .await
            .map_err(|e| ToolFailure::transport(format!("Failed to parse search response: {e}")))
    }

    /// Prefer the API's own error message over the raw body (pure function)
    fn describe_api_error(status: u16, body: &str) -> String {
        let detail = serde_json::from_str::<ApiErrorBody>(body)
            .map(|parsed| parsed.error.message)
            .unwrap_or_else(|_| {
                if body.trim().is_empty() {
                    "empty response body".to_string()
                } else {
                    body.trim().to_string()
                }
            });
        format!("Search API error ({status}): {detail}")
    }

    /// Keep title/link/snippet of the first `limit` hits in upstream order (pure function)
    ///
    /// `query` is echoed back exactly as the caller wrote it.
    fn parse_search_response(
        query: &str,
        limit: usize,
        response: CustomSearchResponse,
    ) -> SearchResults {
        let results: Vec<SearchResultItem> = response
            .items
            .into_iter()
            .filter_map(|item| {
                item.link.map(|link| SearchResultItem {
                    title: item.title,
                    link,
                    snippet: item.snippet,
                })
            })
            .take(limit)
            .collect();

        let total_results = response
            .search_information
            .and_then(|info| info.total_results)
            .and_then(|total| total.parse().ok());

        SearchResults {
            query: query.to_string(),
            count: results.len(),
            total_results,
            results,
        }
    }
}

#[async_trait]
impl Tool for WebSearchTool {
    fn describe(&self) -> ToolDescription {
        ToolDescription {
            name: TOOL_NAME.to_string(),
            description: "Performs a Google search. Use it for current events, facts outside your \
                training data, or to verify claims against external sources. Returns only titles, \
                links and snippets; use visit_webpage to read a page in full."
                .to_string(),
            parameters: parameter_schema::<SearchParams>(),
        }
    }

    async fn execute(&self, parameters: &Value) -> ToolResult<Value> {
        let params = match parse_parameters::<SearchParams>(parameters) {
            Ok(params) => params,
            Err(failure) => return ToolResult::Error(failure),
        };
        self.search(&params.query, params.num_results)
            .await
            .into_dynamic()
    }
}
