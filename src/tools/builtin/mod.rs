//! Builtin research tools
//!
//! Each tool lives in its own module with pure helpers separated from I/O.

pub mod clock;
pub mod html_text;
pub mod page_fetch;
pub mod web_search;

pub use clock::{CurrentTime, CurrentTimeTool};
pub use page_fetch::{
    DownloadError, Downloader, Extractor, HttpDownloader, PageContent, PageFetchTool,
    ReadabilityExtractor,
};
pub use web_search::{SearchQuery, SearchResultItem, SearchResults, WebSearchTool};
