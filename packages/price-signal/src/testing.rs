//! Testing utilities including mock implementations.
//!
//! These let applications exercise fetching, scanning, and the trend service
//! without network access or an API key.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tokio::time::Instant;

use crate::error::{ConfigError, FetchError, FetchResult, PriceSignalError, Result};
use crate::traits::suggester::{SentimentAnalyzer, UrlSuggester};
use crate::traits::transport::{Transport, TransportResponse};
use crate::types::sentiment::{SentimentReport, UrlSuggestion};

/// A mock transport with canned responses per URL.
///
/// Unknown URLs answer 404. A URL configured with a sequence answers each
/// response in turn and then repeats the last one. The mock also records
/// the highest number of concurrent in-flight requests it has seen.
///
/// # Example
///
/// ```rust
/// use price_signal::testing::MockTransport;
/// use price_signal::traits::transport::TransportResponse;
///
/// let transport = MockTransport::new()
///     .with_response("https://example.com", TransportResponse::ok("<html>...</html>"))
///     .fail_url("https://down.example.com");
/// ```
#[derive(Default, Clone)]
pub struct MockTransport {
    responses: Arc<RwLock<HashMap<String, VecDeque<TransportResponse>>>>,
    failing: Arc<RwLock<HashSet<String>>>,
    delays: Arc<RwLock<HashMap<String, Duration>>>,
    default_delay: Option<Duration>,
    calls: Arc<RwLock<Vec<(String, Instant)>>>,
    in_flight: Arc<AtomicUsize>,
    max_in_flight: Arc<AtomicUsize>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always answer `url` with `response`.
    pub fn with_response(self, url: impl Into<String>, response: TransportResponse) -> Self {
        self.with_sequence(url, vec![response])
    }

    /// Answer `url` with each response in turn, repeating the last.
    pub fn with_sequence(self, url: impl Into<String>, responses: Vec<TransportResponse>) -> Self {
        self.responses
            .write()
            .unwrap()
            .insert(url.into(), responses.into());
        self
    }

    /// Make requests for `url` fail without a response.
    pub fn fail_url(self, url: impl Into<String>) -> Self {
        self.failing.write().unwrap().insert(url.into());
        self
    }

    /// Delay every request by `delay`.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.default_delay = Some(delay);
        self
    }

    /// Delay requests for one URL.
    pub fn with_delay_for(self, url: impl Into<String>, delay: Duration) -> Self {
        self.delays.write().unwrap().insert(url.into(), delay);
        self
    }

    /// Every URL requested, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().iter().map(|(url, _)| url.clone()).collect()
    }

    /// Every URL requested with the (tokio) instant the request started.
    pub fn timed_calls(&self) -> Vec<(String, Instant)> {
        self.calls.read().unwrap().clone()
    }

    /// How many times `url` was requested.
    pub fn call_count(&self, url: &str) -> usize {
        self.calls.read().unwrap().iter().filter(|(u, _)| u == url).count()
    }

    /// Highest number of requests that were in flight at once.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }

    fn next_response(&self, url: &str) -> FetchResult<TransportResponse> {
        if self.failing.read().unwrap().contains(url) {
            return Err(FetchError::Http(Box::new(std::io::Error::new(
                std::io::ErrorKind::ConnectionRefused,
                format!("connection refused: {}", url),
            ))));
        }

        let mut responses = self.responses.write().unwrap();
        let Some(queue) = responses.get_mut(url) else {
            return Ok(TransportResponse::new(404, "not found"));
        };
        let response = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };
        Ok(response.unwrap_or_else(|| TransportResponse::new(404, "not found")))
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(&self, url: &str) -> FetchResult<TransportResponse> {
        self.calls
            .write()
            .unwrap()
            .push((url.to_string(), Instant::now()));

        let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(now, Ordering::SeqCst);

        let delay = self
            .delays
            .read()
            .unwrap()
            .get(url)
            .copied()
            .or(self.default_delay);
        match delay {
            Some(d) => tokio::time::sleep(d).await,
            None => tokio::task::yield_now().await,
        }

        let result = self.next_response(url);
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        result
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// How a mock collaborator should fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MockFailure {
    /// Missing API key
    Config,
    /// Service answered with an error
    Collaborator,
    /// Service answered with something unparseable
    Parse,
}

impl MockFailure {
    fn into_error(self) -> PriceSignalError {
        match self {
            Self::Config => ConfigError::Missing("GROQ_API_KEY".to_string()).into(),
            Self::Collaborator => PriceSignalError::Collaborator(Box::new(std::io::Error::new(
                std::io::ErrorKind::Other,
                "mock service error",
            ))),
            Self::Parse => PriceSignalError::parse("mock response was not JSON"),
        }
    }
}

/// A mock URL suggester with canned suggestions per query.
///
/// Queries without canned suggestions get the default list (empty unless set).
#[derive(Default)]
pub struct MockSuggester {
    by_query: HashMap<String, Vec<UrlSuggestion>>,
    default: Vec<UrlSuggestion>,
    failure: Option<MockFailure>,
    calls: Arc<RwLock<Vec<(String, usize)>>>,
}

impl MockSuggester {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suggest these URLs for every query.
    pub fn with_urls<I, S>(mut self, urls: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.default = urls.into_iter().map(UrlSuggestion::new).collect();
        self
    }

    /// Suggest these entries for one query.
    pub fn with_suggestions(
        mut self,
        query: impl Into<String>,
        suggestions: Vec<UrlSuggestion>,
    ) -> Self {
        self.by_query.insert(query.into(), suggestions);
        self
    }

    /// Fail every call.
    pub fn failing(mut self, failure: MockFailure) -> Self {
        self.failure = Some(failure);
        self
    }

    /// `(query, max)` of every call.
    pub fn calls(&self) -> Vec<(String, usize)> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl UrlSuggester for MockSuggester {
    async fn suggest(&self, query: &str, max: usize) -> Result<Vec<UrlSuggestion>> {
        self.calls.write().unwrap().push((query.to_string(), max));

        if let Some(failure) = self.failure {
            return Err(failure.into_error());
        }

        let suggestions = self.by_query.get(query).unwrap_or(&self.default);
        Ok(suggestions.iter().take(max).cloned().collect())
    }
}

/// A mock sentiment analyzer returning one canned report.
#[derive(Default)]
pub struct MockSentimentAnalyzer {
    report: Option<SentimentReport>,
    failure: Option<MockFailure>,
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockSentimentAnalyzer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return `report` (with its topic replaced by the requested one).
    pub fn with_report(mut self, report: SentimentReport) -> Self {
        self.report = Some(report);
        self
    }

    pub fn failing(mut self, failure: MockFailure) -> Self {
        self.failure = Some(failure);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl SentimentAnalyzer for MockSentimentAnalyzer {
    async fn analyze(&self, topic: &str) -> Result<SentimentReport> {
        self.calls.write().unwrap().push(topic.to_string());

        if let Some(failure) = self.failure {
            return Err(failure.into_error());
        }

        match &self.report {
            Some(report) => Ok(SentimentReport {
                topic: topic.to_string(),
                ..report.clone()
            }),
            None => Err(MockFailure::Parse.into_error()),
        }
    }
}
