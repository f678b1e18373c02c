//! Page fetching.
//!
//! The dispatcher only depends on the [`PageFetcher`] trait so that a run can
//! be driven against canned pages in tests. [`HttpFetcher`] is the real
//! implementation backed by `reqwest`.
//!
//! There is no retry or backoff: a failed request is terminal for that URL.

use crate::error::FetchError;
use std::time::{Duration, Instant};
use tracing::{debug, instrument};

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Trait for fetching the HTML body of a product page.
pub trait PageFetcher {
    /// Fetch `url` and return the response body.
    ///
    /// Non-success HTTP statuses are errors.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// `reqwest`-backed fetcher with a bounded per-request timeout.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpFetcher {
    /// Build a client that gives up on a request after `timeout`.
    pub fn new(timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .user_agent(format!(
                "Mozilla/5.0 (compatible; product_graph/{})",
                env!("CARGO_PKG_VERSION")
            ))
            .timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()
            .map_err(|e| FetchError::Network(e.to_string()))?;
        Ok(Self { client, timeout })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

impl PageFetcher for HttpFetcher {
    #[instrument(level = "debug", skip(self))]
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let t0 = Instant::now();
        let response = self
            .client
            .get(url)
            .header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            )
            .send()
            .await?;

        let status = response.status();
        debug!(status = status.as_u16(), "Response status code");
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        debug!(
            bytes = body.len(),
            elapsed_ms = t0.elapsed().as_millis() as u64,
            "Fetched page"
        );
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::url_utils::{normalize_for_fetch, record_for_provenance};
    use httpmock::prelude::*;

    const PAGE: &str = "<html><body><h1>Widget A</h1></body></html>";

    #[tokio::test]
    async fn test_fetch_returns_body() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET).path("/p1");
                then.status(200).body(PAGE);
            })
            .await;

        let fetcher = HttpFetcher::new(DEFAULT_TIMEOUT).unwrap();
        let body = fetcher.fetch(&server.url("/p1")).await.unwrap();

        assert_eq!(body, PAGE);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/gone");
                then.status(404);
            })
            .await;

        let fetcher = HttpFetcher::new(DEFAULT_TIMEOUT).unwrap();
        let err = fetcher.fetch(&server.url("/gone")).await.unwrap_err();
        assert!(matches!(err, FetchError::Status(404)));
    }

    #[tokio::test]
    async fn test_slow_response_times_out() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/slow");
                then.status(200)
                    .body(PAGE)
                    .delay(Duration::from_millis(1500));
            })
            .await;

        let fetcher = HttpFetcher::new(Duration::from_millis(200)).unwrap();
        let err = fetcher.fetch(&server.url("/slow")).await.unwrap_err();
        assert!(matches!(err, FetchError::Timeout));
    }

    #[tokio::test]
    async fn test_recorded_url_fetches_same_page() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/p1");
                then.status(200).body(PAGE);
            })
            .await;

        let fetcher = HttpFetcher::new(DEFAULT_TIMEOUT).unwrap();
        let fetch_url = normalize_for_fetch(&server.url("/p%31")).unwrap();
        let first = fetcher.fetch(&fetch_url).await.unwrap();
        let second = fetcher
            .fetch(&record_for_provenance(&fetch_url))
            .await
            .unwrap();

        assert_eq!(first, second);
        assert_eq!(first, PAGE);
    }
}
