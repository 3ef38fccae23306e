//! Collaborator traits for URL discovery and sentiment judgment.
//!
//! The engine never ranks or discovers documents itself. An external
//! service proposes candidate URLs for a query; the engine only truncates
//! the list and scans it.
//!
//! ```rust,ignore
//! let suggestions = suggester.suggest("iphone price history", 8).await?;
//! let urls: Vec<String> = suggestions.into_iter().map(|s| s.url).collect();
//! let trend = scanner.scan_trend(&urls).await;
//! ```

use async_trait::async_trait;

use crate::error::Result;
use crate::types::sentiment::{SentimentReport, UrlSuggestion};

/// Proposes candidate document URLs for a product/category query.
#[async_trait]
pub trait UrlSuggester: Send + Sync {
    /// Return up to `max` candidate URLs for `query`.
    async fn suggest(&self, query: &str, max: usize) -> Result<Vec<UrlSuggestion>>;
}

/// Produces a structured demand-sentiment judgment for a topic.
#[async_trait]
pub trait SentimentAnalyzer: Send + Sync {
    async fn analyze(&self, topic: &str) -> Result<SentimentReport>;
}
