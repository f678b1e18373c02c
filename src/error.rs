//! Error taxonomy for a scrape run.
//!
//! Only [`LinksError`] and [`WriteError`] are fatal. Everything that can go
//! wrong for a single URL is folded into [`UrlError`] and downgraded to a
//! warning by the dispatcher in [`crate::pipeline`].

use std::io;
use thiserror::Error;

/// A site tag that cannot be processed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigurationError {
    #[error("scraper '{0}' is not supported")]
    UnsupportedSite(String),

    #[error("data source '{0}' is not available in the links file")]
    SourceNotInLinks(String),
}

/// Network, timeout or HTTP-level failure for one URL.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("unexpected HTTP status {0}")]
    Status(u16),

    #[error("failed to read response body: {0}")]
    Body(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_body() || e.is_decode() {
            FetchError::Body(e.to_string())
        } else {
            FetchError::Network(e.to_string())
        }
    }
}

/// A required selector matched nothing on the page.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExtractionFailure {
    #[error("missing required field '{0}'")]
    MissingRequiredField(&'static str),
}

/// Why a single URL was skipped.
#[derive(Debug, Error)]
pub enum UrlError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Extraction(#[from] ExtractionFailure),
}

/// The links file could not be loaded. Aborts the run before any fetch.
#[derive(Debug, Error)]
pub enum LinksError {
    #[error("failed to read links file '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("links file '{path}' is not valid JSON: {source}")]
    Json {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

/// The graph could not be serialized or saved.
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),

    #[error("failed to serialize RDF/XML: {0}")]
    Xml(String),
}
