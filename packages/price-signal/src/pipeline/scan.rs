//! Scan orchestration - fetch, reduce, and extract many URLs concurrently.
//!
//! Each URL is an independent task. At most `max_concurrency` tasks are in
//! flight; the rest start in submission order as slots free up. A task's
//! failure never affects its siblings. Results are merged only after every
//! task has settled.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use thiserror::Error;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::error::FetchFailure;
use crate::fetchers::{reduce, DocumentFetcher};
use crate::pipeline::extract::extract;
use crate::pipeline::summarize::build_trend;
use crate::traits::transport::Transport;
use crate::types::config::ScanConfig;
use crate::types::observation::{RawObservation, SourceRef};
use crate::types::trend::TrendResult;

/// Why a scan task produced nothing.
#[derive(Debug, Error)]
pub enum TaskFailure {
    #[error(transparent)]
    Fetch(#[from] FetchFailure),

    #[error("scan deadline passed before the task settled")]
    DeadlineExceeded,
}

/// Outcome of one URL's fetch-reduce-extract task.
#[derive(Debug)]
pub enum TaskOutcome {
    /// At least one price was found
    Observed(Vec<RawObservation>),
    /// The document was fetched but held no price tokens
    NoSignal,
    Failed(TaskFailure),
}

/// Everything one scan produced, folded from the task outcomes.
#[derive(Debug, Default)]
pub struct ScanReport {
    /// Merged observations in task completion order
    pub observations: Vec<RawObservation>,

    /// URLs that produced observations
    pub observed: Vec<String>,

    /// URLs fetched without any price signal
    pub no_signal: Vec<String>,

    /// URLs whose task failed, with the reason
    pub failures: Vec<(String, TaskFailure)>,
}

impl ScanReport {
    /// Fold one task outcome into the report.
    pub fn record(&mut self, url: String, outcome: TaskOutcome) {
        match outcome {
            TaskOutcome::Observed(mut observations) => {
                self.observations.append(&mut observations);
                self.observed.push(url);
            }
            TaskOutcome::NoSignal => self.no_signal.push(url),
            TaskOutcome::Failed(reason) => self.failures.push((url, reason)),
        }
    }

    /// Number of tasks that settled.
    pub fn settled(&self) -> usize {
        self.observed.len() + self.no_signal.len() + self.failures.len()
    }

    /// Aggregate and summarize the merged observations.
    pub fn into_trend(self) -> TrendResult {
        build_trend(self.observations)
    }
}

impl FromIterator<(String, TaskOutcome)> for ScanReport {
    fn from_iter<I: IntoIterator<Item = (String, TaskOutcome)>>(iter: I) -> Self {
        let mut report = Self::default();
        for (url, outcome) in iter {
            report.record(url, outcome);
        }
        report
    }
}

/// Runs bounded-concurrency scans over candidate URLs.
///
/// # Example
///
/// ```rust,ignore
/// let scanner = ScanOrchestrator::new(Arc::new(fetcher), ScanConfig::default());
/// let trend = scanner.scan_trend(&urls).await;
/// println!("{} points, {}", trend.series.len(), trend.summary.direction);
/// ```
pub struct ScanOrchestrator<T: Transport> {
    fetcher: Arc<DocumentFetcher<T>>,
    config: ScanConfig,
}

impl<T: Transport> ScanOrchestrator<T> {
    pub fn new(fetcher: Arc<DocumentFetcher<T>>, config: ScanConfig) -> Self {
        Self { fetcher, config }
    }

    pub fn fetcher(&self) -> &Arc<DocumentFetcher<T>> {
        &self.fetcher
    }

    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Scan `urls` (truncated to `max_urls`) and fold every outcome.
    pub async fn scan(&self, urls: &[String]) -> ScanReport {
        let urls: Vec<&String> = urls.iter().take(self.config.max_urls).collect();
        let concurrency = self.config.max_concurrency.max(1);
        let deadline = self.config.deadline.map(|d| Instant::now() + d);

        info!(
            urls = urls.len(),
            concurrency,
            deadline_ms = self.config.deadline.map(|d| d.as_millis() as u64),
            "Starting scan"
        );

        let report: ScanReport = stream::iter(urls)
            .map(|url| async move {
                let outcome = match deadline {
                    Some(at) => tokio::time::timeout_at(at, self.run_task(url))
                        .await
                        .unwrap_or_else(|_| {
                            warn!(url = %url, "Scan deadline passed, task abandoned");
                            TaskOutcome::Failed(TaskFailure::DeadlineExceeded)
                        }),
                    None => self.run_task(url).await,
                };
                (url.clone(), outcome)
            })
            .buffer_unordered(concurrency)
            .collect::<Vec<_>>()
            .await
            .into_iter()
            .collect();

        info!(
            observed = report.observed.len(),
            no_signal = report.no_signal.len(),
            failed = report.failures.len(),
            observations = report.observations.len(),
            "Scan complete"
        );

        report
    }

    /// Scan `urls` and build the trend from whatever was observed.
    pub async fn scan_trend(&self, urls: &[String]) -> TrendResult {
        self.scan(urls).await.into_trend()
    }

    async fn run_task(&self, url: &str) -> TaskOutcome {
        let document = match self.fetcher.fetch(url).await {
            Ok(doc) => doc,
            Err(e) => {
                warn!(url = %url, error = %e, "Skipping URL after fetch failure");
                return TaskOutcome::Failed(e.into());
            }
        };

        let reduced = reduce(&document.body);
        let source = SourceRef::new(url).with_optional_title(reduced.title.clone());
        let observations = extract(&reduced.joined_text(), &source);

        debug!(
            url = %url,
            via = ?document.via,
            blocks = reduced.blocks.len(),
            observations = observations.len(),
            "Task settled"
        );

        if observations.is_empty() {
            TaskOutcome::NoSignal
        } else {
            TaskOutcome::Observed(observations)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockTransport;
    use crate::traits::transport::TransportResponse;
    use crate::types::config::FetchConfig;
    use std::time::Duration;

    fn page(body_text: &str) -> TransportResponse {
        TransportResponse::ok(format!(
            "<!DOCTYPE html><html><head><title>History</title></head><body><p>{}</p><p>{}</p></body></html>",
            body_text,
            "Filler paragraph so the page clears the minimum content length. ".repeat(5)
        ))
    }

    fn scanner(transport: MockTransport, scan: ScanConfig) -> ScanOrchestrator<MockTransport> {
        let fetch = FetchConfig::default().with_retry_delay(Duration::ZERO);
        ScanOrchestrator::new(Arc::new(DocumentFetcher::new(transport, fetch)), scan)
    }

    fn urls(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("https://site{}.example/p", i)).collect()
    }

    #[tokio::test]
    async fn test_failures_do_not_abort_siblings() {
        let urls = urls(5);
        let transport = MockTransport::new()
            .fail_url(&urls[0])
            .fail_url(&urls[1])
            .fail_url(&urls[2])
            .with_response(&urls[3], page("In 2020 it cost $50."))
            .with_response(&urls[4], page("In 2022 it cost $70."));

        let report = scanner(transport, ScanConfig::default()).scan(&urls).await;

        assert_eq!(report.settled(), 5);
        assert_eq!(report.failures.len(), 3);
        assert_eq!(report.observations.len(), 2);

        let trend = report.into_trend();
        assert_eq!(trend.series.len(), 2);
        assert_eq!(trend.series.points()[0].price, 50.0);
        assert_eq!(trend.series.points()[0].title.as_deref(), Some("History"));
    }

    #[tokio::test]
    async fn test_concurrency_bound_respected() {
        let urls = urls(8);
        let mut transport = MockTransport::new().with_delay(Duration::from_millis(20));
        for url in &urls {
            transport = transport.with_response(url, page("Now $10 in 2024."));
        }

        let scanner = scanner(transport, ScanConfig::default().with_max_concurrency(3));
        let report = scanner.scan(&urls).await;

        assert_eq!(report.observed.len(), 8);
        let transport = scanner.fetcher().transport();
        assert!(transport.max_in_flight() <= 3);
        assert!(transport.max_in_flight() >= 2);
    }

    #[tokio::test]
    async fn test_urls_truncated_before_fan_out() {
        let urls = urls(5);
        let scanner = scanner(MockTransport::new(), ScanConfig::default().with_max_urls(2));
        let report = scanner.scan(&urls).await;

        assert_eq!(report.settled(), 2);
        let transport = scanner.fetcher().transport();
        assert_eq!(transport.call_count(&urls[4]), 0);
    }

    #[tokio::test]
    async fn test_page_without_prices_is_no_signal() {
        let urls = urls(1);
        let transport = MockTransport::new().with_response(&urls[0], page("Nothing priced here."));
        let report = scanner(transport, ScanConfig::default()).scan(&urls).await;

        assert_eq!(report.no_signal, urls);
        assert!(report.into_trend().series.is_empty());
    }

    #[tokio::test]
    async fn test_deadline_fails_slow_tasks_and_keeps_fast_results() {
        let urls = urls(2);
        let transport = MockTransport::new()
            .with_response(&urls[0], page("In 2020 it cost $50."))
            .with_response(&urls[1], page("In 2021 it cost $60."))
            .with_delay_for(&urls[1], Duration::from_secs(5));

        let scan = ScanConfig::default().with_deadline(Duration::from_millis(100));
        let report = scanner(transport, scan).scan(&urls).await;

        assert_eq!(report.observed, vec![urls[0].clone()]);
        assert_eq!(report.failures.len(), 1);
        assert!(matches!(
            report.failures[0].1,
            TaskFailure::DeadlineExceeded
        ));
    }

    #[tokio::test]
    async fn test_empty_input() {
        let report = scanner(MockTransport::new(), ScanConfig::default())
            .scan(&[])
            .await;
        assert_eq!(report.settled(), 0);
        assert_eq!(report.into_trend(), TrendResult::empty());
    }
}
