//! Page fetch tool implementation
//!
//! Downloads one URL and returns its main-body text. The call is a strict
//! two-stage pipeline:
//!
//! 1. download: any transport problem (network error, timeout, non-2xx
//!    status, empty or oversized body) ends the call with a `transport` error
//!    and extraction never runs;
//! 2. extract: boilerplate removal with Mozilla Readability (`article_scraper`)
//!    followed by HTML to text conversion. No usable text ends the call with a
//!    `content` error.
//!
//! The extracted text is capped at a fixed number of characters, with an
//! explicit note when the cap cuts it.

use crate::config::FetchSection;
use crate::error::ToolFailure;
use crate::tools::builtin::html_text::html_to_text;
use crate::tools::{
    absorb_panics, parameter_schema, parse_parameters, Tool, ToolDescription, ToolResult,
};
use article_scraper::Readability;
use async_trait::async_trait;
use encoding_rs::{Encoding, UTF_8};
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::header::CONTENT_TYPE;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

pub const TOOL_NAME: &str = "visit_webpage";

pub const DEFAULT_MAX_CONTENT_CHARS: usize = 10_000;

const EXTRACTION_FAILED_MESSAGE: &str = "Downloaded page but failed to extract text. \
    The page might be empty or purely JavaScript-based.";

/// Arguments accepted by the page fetch tool
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct PageFetchParams {
    /// The full URL to visit (must start with http:// or https://)
    pub url: String,
}

/// Success payload of the page fetch tool
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContent {
    pub content: String,
    pub original_url: String,
    pub truncated: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Why the download stage produced nothing usable
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DownloadError {
    #[error("request failed: {0}")]
    Request(String),
    #[error("server responded with HTTP {0}")]
    Status(u16),
    #[error("empty response body")]
    EmptyBody,
    #[error("response of {size} bytes exceeds the {limit} byte limit")]
    TooLarge { size: u64, limit: usize },
    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

/// Download stage of the pipeline
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn download(&self, url: &str) -> Result<String, DownloadError>;
}

/// Extraction stage of the pipeline; `None` means no usable text
#[async_trait]
pub trait Extractor: Send + Sync {
    async fn extract(&self, html: &str, url: &str) -> Option<String>;
}

/// Downloads pages over HTTP with a per-call client
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    timeout: Duration,
    user_agent: String,
    max_download_bytes: usize,
}

impl HttpDownloader {
    pub fn new(settings: &FetchSection) -> Self {
        Self {
            timeout: Duration::from_secs(settings.timeout_secs),
            user_agent: settings.user_agent.clone(),
            max_download_bytes: settings.max_download_bytes,
        }
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn download(&self, url: &str) -> Result<String, DownloadError> {
        let client = reqwest::Client::builder()
            .timeout(self.timeout)
            .user_agent(self.user_agent.as_str())
            .build()
            .map_err(|e| DownloadError::Client(e.to_string()))?;

        let mut response = client
            .get(url)
            .send()
            .await
            .map_err(|e| DownloadError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::Status(status.as_u16()));
        }

        let limit = self.max_download_bytes;
        if let Some(size) = response.content_length() {
            if size > limit as u64 {
                return Err(DownloadError::TooLarge { size, limit });
            }
        }

        let declared_charset = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .and_then(charset_from_content_type);

        // Chunked responses carry no length, so the cap is enforced while reading
        let mut bytes = Vec::new();
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| DownloadError::Request(e.to_string()))?
        {
            let size = bytes.len() + chunk.len();
            if size > limit {
                return Err(DownloadError::TooLarge {
                    size: size as u64,
                    limit,
                });
            }
            bytes.extend_from_slice(&chunk);
        }

        let body = decode_body(&bytes, declared_charset.as_deref());
        if body.trim().is_empty() {
            return Err(DownloadError::EmptyBody);
        }
        Ok(body)
    }
}

static META_CHARSET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?i)<meta[^>]+charset\s*=\s*["']?([a-z0-9_:.\-]+)"#)
        .expect("meta charset regex should compile")
});

/// Bytes scanned for a `<meta charset>` declaration
const META_SNIFF_BYTES: usize = 1024;

/// Charset parameter of a `Content-Type` header value
fn charset_from_content_type(content_type: &str) -> Option<String> {
    content_type.split(';').skip(1).find_map(|param| {
        let (key, value) = param.split_once('=')?;
        key.trim()
            .eq_ignore_ascii_case("charset")
            .then(|| value.trim().trim_matches(|c: char| c == '"' || c == '\'').to_string())
            .filter(|charset| !charset.is_empty())
    })
}

/// Decode a page body: header charset, then `<meta charset>`, then UTF-8
///
/// A byte order mark wins over all of them.
fn decode_body(bytes: &[u8], declared_charset: Option<&str>) -> String {
    let encoding = declared_charset
        .and_then(|label| Encoding::for_label(label.as_bytes()))
        .or_else(|| {
            let head = String::from_utf8_lossy(&bytes[..bytes.len().min(META_SNIFF_BYTES)]);
            META_CHARSET
                .captures(&head)
                .and_then(|captures| Encoding::for_label(captures[1].as_bytes()))
        })
        .unwrap_or(UTF_8);

    let (text, used, had_errors) = encoding.decode(bytes);
    if had_errors {
        debug!(encoding = used.name(), "Page body had malformed byte sequences");
    }
    text.into_owned()
}

/// Readability-based boilerplate removal with a plain conversion fallback
#[derive(Debug, Default, Clone, Copy)]
pub struct ReadabilityExtractor;

impl ReadabilityExtractor {
    pub fn new() -> Self {
        Self
    }

    async fn readable_article(html: &str, url: &str) -> Option<String> {
        let base_url = match Url::parse(url) {
            Ok(parsed) => parsed,
            Err(_) => {
                debug!("Failed to parse URL '{url}', skipping Readability");
                return None;
            }
        };

        // article_scraper can panic on malformed HTML
        let html_owned = html.to_string();
        let result = tokio::task::spawn_blocking(move || {
            std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                tokio::runtime::Handle::current()
                    .block_on(async { Readability::extract(&html_owned, Some(base_url)).await })
            }))
        })
        .await;

        match result {
            Ok(Ok(Ok(article_html))) => Some(html_to_text(&article_html)),
            Ok(Ok(Err(e))) => {
                debug!("Readability extraction failed for '{url}': {e}");
                None
            }
            Ok(Err(_panic)) => {
                warn!("Readability panicked on '{url}', falling back to plain conversion");
                None
            }
            Err(e) => {
                warn!("Readability task failed for '{url}': {e}");
                None
            }
        }
    }
}

#[async_trait]
impl Extractor for ReadabilityExtractor {
    async fn extract(&self, html: &str, url: &str) -> Option<String> {
        Self::readable_article(html, url)
            .await
            .filter(|text| !text.trim().is_empty())
            .or_else(|| Some(html_to_text(html)))
            .filter(|text| !text.trim().is_empty())
    }
}

/// Cut `text` to its first `max_chars` characters (pure function)
///
/// Returns the text and whether anything was removed.
pub fn truncate_content(mut text: String, max_chars: usize) -> (String, bool) {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => {
            text.truncate(byte_index);
            (text, true)
        }
        None => (text, false),
    }
}

fn download_failure_message(url: &str, error: &DownloadError) -> String {
    format!(
        "Failed to download content from {url}. The site might block bots or return empty content. ({error})"
    )
}

/// Page fetch tool; the pipeline stages are pluggable for testing
pub struct PageFetchTool<D = HttpDownloader, E = ReadabilityExtractor> {
    downloader: Arc<D>,
    extractor: Arc<E>,
    max_content_chars: usize,
}

impl PageFetchTool {
    pub fn from_config(settings: &FetchSection) -> Self {
        Self::with_components(
            HttpDownloader::new(settings),
            ReadabilityExtractor::new(),
            settings.max_content_chars,
        )
    }
}

impl<D, E> PageFetchTool<D, E>
where
    D: Downloader + 'static,
    E: Extractor + 'static,
{
    pub fn with_components(downloader: D, extractor: E, max_content_chars: usize) -> Self {
        Self {
            downloader: Arc::new(downloader),
            extractor: Arc::new(extractor),
            max_content_chars,
        }
    }

    pub fn downloader(&self) -> &D {
        &self.downloader
    }

    pub fn extractor(&self) -> &E {
        &self.extractor
    }

    /// Visit one page; every failure is returned as an error result
    pub async fn visit(&self, url: &str) -> ToolResult<PageContent> {
        let downloader = Arc::clone(&self.downloader);
        let extractor = Arc::clone(&self.extractor);
        let max_chars = self.max_content_chars;
        let url = url.to_string();

        absorb_panics(TOOL_NAME, async move {
            let result: ToolResult<PageContent> =
                run_pipeline(downloader.as_ref(), extractor.as_ref(), &url, max_chars)
                    .await
                    .into();
            result
        })
        .await
    }
}

async fn run_pipeline<D, E>(
    downloader: &D,
    extractor: &E,
    url: &str,
    max_chars: usize,
) -> Result<PageContent, ToolFailure>
where
    D: Downloader + ?Sized,
    E: Extractor + ?Sized,
{
    info!(url, "Browsing URL");

    let html = downloader.download(url).await.map_err(|e| {
        warn!(url, error = %e, "Download failed");
        ToolFailure::transport(download_failure_message(url, &e))
    })?;
    debug!(url, bytes = html.len(), "Downloaded page");

    let text = extractor
        .extract(&html, url)
        .await
        .filter(|text| !text.trim().is_empty())
        .ok_or_else(|| {
            warn!(url, "Extraction produced no text");
            ToolFailure::content(EXTRACTION_FAILED_MESSAGE)
        })?;

    let (content, truncated) = truncate_content(text, max_chars);
    debug!(url, chars = max_chars, truncated, "Extracted page text");

    Ok(PageContent {
        content,
        original_url: url.to_string(),
        truncated,
        note: truncated
            .then(|| format!("Content truncated to the first {max_chars} characters.")),
    })
}

#[async_trait]
impl<D, E> Tool for PageFetchTool<D, E>
where
    D: Downloader + 'static,
    E: Extractor + 'static,
{
    fn describe(&self) -> ToolDescription {
        ToolDescription {
            name: TOOL_NAME.to_string(),
            description: format!(
                "Visits a web page and extracts its main text content, without navigation, ads \
                or footers. Use it to read an article found with search_google in full. Text \
                longer than {} characters is truncated.",
                self.max_content_chars
            ),
            parameters: parameter_schema::<PageFetchParams>(),
        }
    }

    async fn execute(&self, parameters: &Value) -> ToolResult<Value> {
        let params = match parse_parameters::<PageFetchParams>(parameters) {
            Ok(params) => params,
            Err(failure) => return ToolResult::Error(failure),
        };
        self.visit(&params.url).await.into_dynamic()
    }
}
