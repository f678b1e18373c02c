//! URL normalization before fetch and for provenance.
//!
//! Input URLs are percent-decoded once and then re-encoded by the WHATWG URL
//! parser. A link that was pasted already encoded (or encoded twice) ends up
//! in the same canonical form as a raw one, and that canonical form is what
//! gets fetched and recorded.

use crate::error::FetchError;
use std::borrow::Cow;
use url::Url;

/// Decode then re-encode `raw_url` into the form handed to the HTTP client.
///
/// Invalid UTF-8 after decoding keeps the raw input. A URL the parser
/// rejects becomes [`FetchError::InvalidUrl`] so it is skipped like any
/// other fetch failure.
pub fn normalize_for_fetch(raw_url: &str) -> Result<String, FetchError> {
    let trimmed = raw_url.trim();
    let decoded = urlencoding::decode(trimmed).unwrap_or(Cow::Borrowed(trimmed));
    Url::parse(&decoded)
        .map(String::from)
        .map_err(|e| FetchError::InvalidUrl {
            url: raw_url.to_string(),
            reason: e.to_string(),
        })
}

/// The literal stored as a product's `hasSourceURL`.
///
/// Takes the URL returned by [`normalize_for_fetch`] and records it
/// verbatim. Normalizing again would decode a second time, so an input
/// like `a%252Fb` would be recorded differently from what was requested.
pub fn record_for_provenance(fetch_url: &str) -> String {
    fetch_url.to_string()
}
