//! Document fetcher - run an ordered plan of transport attempts for one URL.
//!
//! The plan is the primary transport N times with a short pause between
//! attempts, then (when enabled) one attempt through the reader proxy. The
//! first attempt that meets its success condition wins.

use tracing::{debug, info, warn};

use crate::error::{FetchError, FetchFailure, FetchResult};
use crate::traits::transport::Transport;
use crate::types::config::FetchConfig;
use crate::types::document::{FetchVia, FetchedDocument};

/// One step of the fetch plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// GET the URL directly; needs 2xx and a body above the content threshold
    Primary,
    /// GET the URL through the reader proxy; needs 2xx
    Reader,
}

impl Strategy {
    fn via(self) -> FetchVia {
        match self {
            Self::Primary => FetchVia::Primary,
            Self::Reader => FetchVia::Reader,
        }
    }
}

/// Fetches documents through a [`Transport`] following [`FetchConfig`].
///
/// # Example
///
/// ```rust,ignore
/// let fetcher = DocumentFetcher::new(HttpTransport::new(&config)?, config);
/// let doc = fetcher.fetch("https://example.com/price-history").await?;
/// ```
pub struct DocumentFetcher<T: Transport> {
    transport: T,
    config: FetchConfig,
}

impl<T: Transport> DocumentFetcher<T> {
    pub fn new(transport: T, config: FetchConfig) -> Self {
        Self { transport, config }
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// The ordered attempts this fetcher will make.
    pub fn plan(&self) -> Vec<Strategy> {
        let mut plan = vec![Strategy::Primary; self.config.primary_attempts.max(1)];
        if self.config.use_reader_fallback {
            plan.push(Strategy::Reader);
        }
        plan
    }

    /// Reader proxy URL for `url`: the scheme is stripped and the rest is
    /// appended to the reader base.
    pub fn reader_url(&self, url: &str) -> String {
        let without_scheme = url.find("://").map_or(url, |idx| &url[idx + 3..]);
        format!(
            "{}/{}",
            self.config.reader_base_url.trim_end_matches('/'),
            without_scheme
        )
    }

    /// Fetch a document, walking the plan until an attempt succeeds.
    pub async fn fetch(&self, url: &str) -> Result<FetchedDocument, FetchFailure> {
        if url::Url::parse(url).is_err() {
            return Err(FetchFailure {
                url: url.to_string(),
                attempts: 0,
                last_error: FetchError::InvalidUrl {
                    url: url.to_string(),
                },
            });
        }

        let plan = self.plan();
        let mut attempts = 0;
        let mut last_error = None;

        for (i, strategy) in plan.iter().copied().enumerate() {
            if i > 0 && strategy == Strategy::Primary && !self.config.retry_delay.is_zero() {
                tokio::time::sleep(self.config.retry_delay).await;
            }

            attempts += 1;
            match self.attempt(strategy, url).await {
                Ok(body) => {
                    if strategy == Strategy::Reader {
                        info!(url = %url, "Fetched via reader fallback");
                    }
                    debug!(
                        url = %url,
                        attempt = attempts,
                        strategy = ?strategy,
                        bytes = body.len(),
                        "Fetch succeeded"
                    );
                    return Ok(FetchedDocument::new(url, body, strategy.via()));
                }
                Err(e) => {
                    debug!(
                        url = %url,
                        attempt = attempts,
                        strategy = ?strategy,
                        error = %e,
                        "Fetch attempt failed"
                    );
                    last_error = Some(e);
                }
            }
        }

        let last_error = last_error.unwrap_or_else(|| FetchError::InvalidUrl {
            url: url.to_string(),
        });
        warn!(url = %url, attempts, error = %last_error, "Fetch plan exhausted");

        Err(FetchFailure {
            url: url.to_string(),
            attempts,
            last_error,
        })
    }

    async fn attempt(&self, strategy: Strategy, url: &str) -> FetchResult<String> {
        match strategy {
            Strategy::Primary => {
                let response = self.transport.get(url).await?;
                if !response.is_success() {
                    return Err(FetchError::Status {
                        status: response.status,
                    });
                }
                if response.content_length() <= self.config.min_content_length {
                    return Err(FetchError::InsufficientContent {
                        length: response.content_length(),
                        minimum: self.config.min_content_length,
                    });
                }
                Ok(response.body)
            }
            Strategy::Reader => {
                let response = self.transport.get(&self.reader_url(url)).await?;
                if !response.is_success() {
                    return Err(FetchError::Status {
                        status: response.status,
                    });
                }
                Ok(response.body)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTransport;
    use crate::traits::transport::TransportResponse;
    use std::time::Duration;

    const URL: &str = "https://shop.example.com/history";
    const READER: &str = "https://r.jina.ai/shop.example.com/history";

    fn config() -> FetchConfig {
        FetchConfig::default().with_retry_delay(Duration::ZERO)
    }

    fn long_body() -> String {
        format!("<html><body><p>{}</p></body></html>", "In 2020 it cost $50. ".repeat(20))
    }

    #[tokio::test]
    async fn test_primary_success_first_try() {
        let transport = MockTransport::new().with_response(URL, TransportResponse::ok(long_body()));
        let fetcher = DocumentFetcher::new(transport, config());

        let doc = fetcher.fetch(URL).await.unwrap();
        assert_eq!(doc.via, FetchVia::Primary);
        assert_eq!(doc.url, URL);
        assert_eq!(fetcher.transport().call_count(URL), 1);
    }

    #[tokio::test]
    async fn test_short_bodies_exhaust_plan_without_fallback() {
        let transport = MockTransport::new().with_response(URL, TransportResponse::ok("tiny!"));
        let fetcher = DocumentFetcher::new(transport, config());

        let err = fetcher.fetch(URL).await.unwrap_err();
        assert_eq!(err.attempts, 2);
        assert!(matches!(
            err.last_error,
            FetchError::InsufficientContent {
                length: 5,
                minimum: 256
            }
        ));
        assert_eq!(fetcher.transport().call_count(URL), 2);
        assert_eq!(fetcher.transport().call_count(READER), 0);
    }

    #[tokio::test]
    async fn test_reader_fallback_returns_body_verbatim() {
        let transport = MockTransport::new()
            .with_response(URL, TransportResponse::ok("tiny!"))
            .with_response(READER, TransportResponse::ok("Title: x\n\nIn 2021 it cost $60."));
        let fetcher = DocumentFetcher::new(transport, config().with_reader_fallback(true));

        let doc = fetcher.fetch(URL).await.unwrap();
        assert_eq!(doc.via, FetchVia::Reader);
        assert_eq!(doc.body, "Title: x\n\nIn 2021 it cost $60.");
        assert_eq!(fetcher.transport().call_count(URL), 2);
        assert_eq!(fetcher.transport().call_count(READER), 1);
    }

    #[tokio::test]
    async fn test_retry_recovers_on_second_primary() {
        let transport = MockTransport::new().with_sequence(
            URL,
            vec![TransportResponse::new(503, ""), TransportResponse::ok(long_body())],
        );
        let fetcher = DocumentFetcher::new(transport, config());

        let doc = fetcher.fetch(URL).await.unwrap();
        assert_eq!(doc.via, FetchVia::Primary);
        assert_eq!(fetcher.transport().call_count(URL), 2);
    }

    #[tokio::test]
    async fn test_failure_reports_last_error() {
        let transport = MockTransport::new()
            .with_response(URL, TransportResponse::new(403, "blocked"))
            .with_response(READER, TransportResponse::new(502, ""));
        let fetcher = DocumentFetcher::new(transport, config().with_reader_fallback(true));

        let err = fetcher.fetch(URL).await.unwrap_err();
        assert_eq!(err.attempts, 3);
        assert!(matches!(err.last_error, FetchError::Status { status: 502 }));
    }

    #[tokio::test]
    async fn test_invalid_url_makes_no_attempts() {
        let fetcher = DocumentFetcher::new(MockTransport::new(), config());
        let err = fetcher.fetch("not a url").await.unwrap_err();
        assert_eq!(err.attempts, 0);
        assert!(matches!(err.last_error, FetchError::InvalidUrl { .. }));
    }

    #[test]
    fn test_reader_url_strips_scheme() {
        let fetcher = DocumentFetcher::new(MockTransport::new(), config());
        assert_eq!(fetcher.reader_url(URL), READER);
        assert_eq!(
            fetcher.reader_url("http://a.example/p?q=1"),
            "https://r.jina.ai/a.example/p?q=1"
        );
    }

    #[test]
    fn test_plan_shape() {
        let fetcher = DocumentFetcher::new(MockTransport::new(), config());
        assert_eq!(fetcher.plan(), vec![Strategy::Primary, Strategy::Primary]);

        let fetcher =
            DocumentFetcher::new(MockTransport::new(), config().with_reader_fallback(true));
        assert_eq!(
            fetcher.plan(),
            vec![Strategy::Primary, Strategy::Primary, Strategy::Reader]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_delay_only_between_primary_attempts() {
        let delay = Duration::from_millis(750);
        let transport = MockTransport::new()
            .with_response(URL, TransportResponse::ok("tiny!"))
            .with_response(READER, TransportResponse::ok("Reader text with $20 in 2021"));
        let fetcher = DocumentFetcher::new(
            transport,
            FetchConfig::default()
                .with_retry_delay(delay)
                .with_reader_fallback(true),
        );

        let doc = fetcher.fetch(URL).await.unwrap();
        assert_eq!(doc.via, FetchVia::Reader);

        let calls = fetcher.transport().timed_calls();
        let urls: Vec<_> = calls.iter().map(|(u, _)| u.as_str()).collect();
        assert_eq!(urls, vec![URL, URL, READER]);

        let (first, second, reader) = (calls[0].1, calls[1].1, calls[2].1);
        assert!(second - first >= delay);
        assert!(reader - second < delay);
    }
}
