//! Transport trait for pluggable document retrieval.
//!
//! A transport performs one GET and reports what came back. Retry,
//! fallback, and content thresholds are the fetcher's business; a
//! transport never retries on its own.
//!
//! # Usage
//!
//! ```rust,ignore
//! use price_signal::traits::transport::Transport;
//!
//! let response = transport.get("https://example.com/history").await?;
//! if response.is_success() {
//!     println!("{} bytes", response.body.len());
//! }
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::FetchResult;

/// What a single GET returned.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransportResponse {
    /// HTTP status code
    pub status: u16,

    /// Response body as text
    pub body: String,
}

impl TransportResponse {
    /// Create a response with a status and body.
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    /// A 200 response with the given body.
    pub fn ok(body: impl Into<String>) -> Self {
        Self::new(200, body)
    }

    /// Whether the status is 2xx.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Body length in bytes.
    pub fn content_length(&self) -> usize {
        self.body.len()
    }
}

/// One-shot document retrieval.
///
/// Implementations:
/// - `HttpTransport` - reqwest-backed GET with user agent and timeout
/// - `MockTransport` - canned responses for tests
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue a GET for `url`.
    ///
    /// Non-2xx statuses are returned as responses, not errors; errors are
    /// reserved for requests that produced no response at all.
    async fn get(&self, url: &str) -> FetchResult<TransportResponse>;

    /// Get the transport name (for logging/debugging).
    fn name(&self) -> &str {
        "unknown"
    }
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    async fn get(&self, url: &str) -> FetchResult<TransportResponse> {
        (**self).get(url).await
    }

    fn name(&self) -> &str {
        (**self).name()
    }
}
