//! Price-Signal Extraction & Trend Aggregation
//!
//! Mines unstructured web text for price mentions, anchors each mention to a
//! coarse date, and reduces everything into a deduplicated time series with
//! a start/end/direction summary.
//!
//! # Design
//!
//! - Extraction, aggregation, and summarization are pure and synchronous
//! - Fetching and URL suggestion sit behind traits so tests never touch the network
//! - Per-URL failures are recovered locally; only configuration and caller
//!   input errors abort an operation
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use price_signal::{ai::GroqClient, EngineConfig, PriceTrendEngine};
//!
//! let config = EngineConfig::from_env()?;
//! let groq = Arc::new(GroqClient::from_config(&config)?);
//! let engine = PriceTrendEngine::from_config(&config, groq.clone(), groq)?;
//!
//! let trend = engine.price_trend_search("concert ticket for Shawn Mendes", None).await?;
//! println!("{} -> {:?}", trend.summary.direction, trend.summary.pct_change);
//! ```
//!
//! Pure text extraction needs no I/O:
//!
//! ```rust
//! use price_signal::{build_trend, extract, SourceRef};
//!
//! let source = SourceRef::new("https://example.com/tickets");
//! let observations = extract("In March 2020, tickets cost $50. By March 2023 they were $80.", &source);
//! let trend = build_trend(observations);
//! assert_eq!(trend.series.len(), 2);
//! ```
//!
//! # Modules
//!
//! - [`pipeline`] - Tokenize, extract, aggregate, summarize, scan, and the trend service
//! - [`fetchers`] - HTTP transport, fetch plan, and document reduction
//! - [`ai`] - Groq client for URL suggestion and sentiment
//! - [`traits`] - Transport and collaborator seams
//! - [`types`] - Observations, series, trends, config
//! - [`security`] - Secret handling for API keys
//! - [`testing`] - Mock implementations for testing

pub mod ai;
pub mod error;
pub mod fetchers;
pub mod pipeline;
pub mod security;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{ConfigError, FetchError, FetchFailure, PriceSignalError, Result};
pub use fetchers::{reduce, DocumentFetcher, HttpTransport};
pub use pipeline::{
    aggregate, build_trend, extract, extract_at, summarize, PriceTrendEngine, ScanOrchestrator,
    ScanReport, TaskFailure, TaskOutcome,
};
pub use traits::{
    suggester::{SentimentAnalyzer, UrlSuggester},
    transport::{Transport, TransportResponse},
};
pub use types::{
    config::{EngineConfig, FetchConfig, GroqConfig, ScanConfig},
    document::{FetchVia, FetchedDocument, ReducedDocument},
    observation::{PricePoint, RawObservation, SourceRef},
    sentiment::{DemandLevel, OverallSentiment, SentimentReport, SentimentSource, UrlSuggestion},
    trend::{CanonicalSeries, Direction, ScrapedTrend, TrendResult, TrendSummary},
};
