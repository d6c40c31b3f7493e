//! Mock implementations for testing
//!
//! Provides mock `Downloader` and `Extractor` stages that record how often
//! they were called, so tests can assert which pipeline stages ran.

use crate::tools::builtin::{DownloadError, Downloader, Extractor};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Mock download stage with a canned response
#[derive(Debug)]
pub struct MockDownloader {
    response: Result<String, DownloadError>,
    calls: Arc<AtomicUsize>,
}

impl MockDownloader {
    pub fn returning<S: Into<String>>(html: S) -> Self {
        Self {
            response: Ok(html.into()),
            calls: Arc::default(),
        }
    }

    pub fn failing(error: DownloadError) -> Self {
        Self {
            response: Err(error),
            calls: Arc::default(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Downloader for MockDownloader {
    async fn download(&self, _url: &str) -> Result<String, DownloadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.response.clone()
    }
}

/// Mock extraction stage with a canned result
#[derive(Debug)]
pub struct MockExtractor {
    output: Option<String>,
    should_panic: bool,
    calls: Arc<AtomicUsize>,
}

impl MockExtractor {
    pub fn returning<S: Into<String>>(text: S) -> Self {
        Self {
            output: Some(text.into()),
            should_panic: false,
            calls: Arc::default(),
        }
    }

    /// Extraction that finds no usable text
    pub fn empty() -> Self {
        Self {
            output: None,
            should_panic: false,
            calls: Arc::default(),
        }
    }

    /// Extraction that panics, as a buggy HTML library might
    pub fn panicking() -> Self {
        Self {
            output: None,
            should_panic: true,
            calls: Arc::default(),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Extractor for MockExtractor {
    async fn extract(&self, _html: &str, _url: &str) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.should_panic {
            panic!("mock extractor panicked");
        }
        self.output.clone()
    }
}
