//! Trend service - the three caller-facing operations.
//!
//! - `price_trend_search`: suggest URLs for a query, scan them, build a trend
//! - `scrape_price_from_url`: build a trend from one page, plus its metadata
//! - `sentiment_demand_analysis`: delegate to the sentiment collaborator

use std::sync::Arc;

use tracing::{info, warn};

use crate::error::{PriceSignalError, Result};
use crate::fetchers::{reduce, DocumentFetcher, HttpTransport};
use crate::pipeline::extract::extract;
use crate::pipeline::scan::ScanOrchestrator;
use crate::pipeline::summarize::build_trend;
use crate::traits::suggester::{SentimentAnalyzer, UrlSuggester};
use crate::traits::transport::Transport;
use crate::types::config::EngineConfig;
use crate::types::observation::SourceRef;
use crate::types::sentiment::SentimentReport;
use crate::types::trend::{ScrapedTrend, TrendResult};

/// Default number of results a search considers.
pub const DEFAULT_MAX_RESULTS: usize = 20;

/// Largest `max_results` a caller may ask for.
pub const MAX_RESULTS_LIMIT: usize = 50;

/// At most this many suggested sites are scanned per search.
pub const MAX_SITES: usize = 8;

/// Queries and topics shorter than this are rejected.
pub const MIN_QUERY_CHARS: usize = 2;

/// Price-trend engine over a transport and two collaborators.
///
/// # Example
///
/// ```rust,ignore
/// let config = EngineConfig::from_env()?;
/// let groq = Arc::new(GroqClient::from_config(&config)?);
/// let engine = PriceTrendEngine::from_config(&config, groq.clone(), groq)?;
///
/// let trend = engine.price_trend_search("iphone launch price", None).await?;
/// ```
pub struct PriceTrendEngine<T: Transport> {
    scanner: ScanOrchestrator<T>,
    suggester: Arc<dyn UrlSuggester>,
    analyzer: Arc<dyn SentimentAnalyzer>,
}

impl PriceTrendEngine<HttpTransport> {
    /// Build an engine that fetches over HTTP.
    pub fn from_config(
        config: &EngineConfig,
        suggester: Arc<dyn UrlSuggester>,
        analyzer: Arc<dyn SentimentAnalyzer>,
    ) -> Result<Self> {
        let transport = HttpTransport::new(&config.fetch)?;
        Ok(Self::new(transport, config, suggester, analyzer))
    }
}

impl<T: Transport> PriceTrendEngine<T> {
    pub fn new(
        transport: T,
        config: &EngineConfig,
        suggester: Arc<dyn UrlSuggester>,
        analyzer: Arc<dyn SentimentAnalyzer>,
    ) -> Self {
        let fetcher = Arc::new(DocumentFetcher::new(transport, config.fetch.clone()));
        Self {
            scanner: ScanOrchestrator::new(fetcher, config.scan.clone()),
            suggester,
            analyzer,
        }
    }

    pub fn scanner(&self) -> &ScanOrchestrator<T> {
        &self.scanner
    }

    /// Search the web for historic price signals and summarize them.
    ///
    /// A suggestion failure other than a configuration problem yields an
    /// empty trend rather than an error.
    pub async fn price_trend_search(
        &self,
        query: &str,
        max_results: Option<usize>,
    ) -> Result<TrendResult> {
        let query = validate_text("query", query)?;
        let max_results = max_results.unwrap_or(DEFAULT_MAX_RESULTS);
        if !(1..=MAX_RESULTS_LIMIT).contains(&max_results) {
            return Err(PriceSignalError::invalid_input(format!(
                "maxResults must be between 1 and {}, got {}",
                MAX_RESULTS_LIMIT, max_results
            )));
        }
        let max_sites = max_results.min(MAX_SITES);

        info!(query = %query, max_sites, "Price trend search");

        let suggestions = match self.suggester.suggest(query, max_sites).await {
            Ok(s) => s,
            Err(e) if e.is_config() => return Err(e),
            Err(e) => {
                warn!(query = %query, error = %e, "URL suggestion failed, returning empty trend");
                return Ok(TrendResult::empty());
            }
        };

        let urls: Vec<String> = suggestions
            .into_iter()
            .map(|s| s.url)
            .filter(|u| !u.trim().is_empty())
            .take(max_sites)
            .collect();

        let trend = self.scanner.scan_trend(&urls).await;

        info!(
            query = %query,
            points = trend.series.len(),
            direction = %trend.summary.direction,
            "Price trend search complete"
        );

        Ok(trend)
    }

    /// Scrape one page for price and date mentions.
    ///
    /// Unlike a search, a fetch failure here is returned to the caller.
    pub async fn scrape_price_from_url(&self, url: &str) -> Result<ScrapedTrend> {
        let parsed = url::Url::parse(url)
            .map_err(|e| PriceSignalError::invalid_input(format!("invalid URL {}: {}", url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(PriceSignalError::invalid_input(format!(
                "unsupported URL scheme: {}",
                parsed.scheme()
            )));
        }

        let document = self.scanner.fetcher().fetch(url).await?;
        let reduced = reduce(&document.body);
        let source = SourceRef::new(url).with_optional_title(reduced.title.clone());
        let trend = build_trend(extract(&reduced.joined_text(), &source));

        info!(
            url = %url,
            via = ?document.via,
            points = trend.series.len(),
            "Scraped page"
        );

        Ok(ScrapedTrend {
            trend,
            meta: reduced.meta(),
        })
    }

    /// Analyze public demand sentiment for a topic.
    pub async fn sentiment_demand_analysis(&self, topic: &str) -> Result<SentimentReport> {
        let topic = validate_text("topic", topic)?;
        info!(topic = %topic, "Sentiment demand analysis");

        let report = self.analyzer.analyze(topic).await?;
        report.validate().map_err(PriceSignalError::parse)?;
        Ok(report)
    }
}

fn validate_text<'a>(field: &str, value: &'a str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.chars().count() < MIN_QUERY_CHARS {
        return Err(PriceSignalError::invalid_input(format!(
            "{} must be at least {} characters",
            field, MIN_QUERY_CHARS
        )));
    }
    Ok(trimmed)
}
