//! Error types for fetching, page parsing, field resolution, and crawling.

use thiserror::Error;

/// Failure to retrieve a page from the directory.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The server answered with a non-success status.
    #[error("request to {url} failed with status {status}")]
    Status { url: String, status: u16 },

    /// The request never produced a response (connect, timeout, TLS, ...).
    #[error("failed to send request to {url}")]
    Transport {
        url: String,
        #[source]
        source: wreq::Error,
    },

    /// The response body could not be read.
    #[error("failed to read response body from {url}")]
    Body {
        url: String,
        #[source]
        source: wreq::Error,
    },
}

impl FetchError {
    /// Returns true for failures worth retrying. Builder and URL errors are not.
    pub fn is_transient(&self) -> bool {
        match self {
            FetchError::Status { status, .. } => *status >= 500 || *status == 429,
            FetchError::Transport { source, .. } => source.is_timeout() || source.is_connect(),
            FetchError::Body { .. } => true,
        }
    }
}

/// The page did not have the shape the crawler expects.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ParseError {
    /// An expected container is missing, usually because the site layout changed.
    #[error("page has no element matching '{selector}'")]
    MissingContainer { selector: String },

    /// An entity page without a heading cannot produce a record.
    #[error("entity page has no name heading")]
    MissingName,
}

/// A single contact field could not be resolved. Never leaves the extractor.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("no '{label}' link in contact section")]
    NotFound { label: &'static str },

    #[error("'{label}' link has no href")]
    MissingHref { label: &'static str },

    #[error("'{label}' value is malformed: {reason}")]
    Malformed { label: &'static str, reason: String },
}

/// Errors that stop a crawl, or a region within it.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("unexpected page structure at {url}")]
    Structural {
        url: String,
        #[source]
        source: ParseError,
    },

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("failed to export region '{region}'")]
    Export {
        region: String,
        #[source]
        source: anyhow::Error,
    },
}

impl CrawlError {
    /// Wraps a parse failure with the page it happened on.
    pub fn structural(url: impl Into<String>, source: ParseError) -> Self {
        CrawlError::Structural { url: url.into(), source }
    }
}
