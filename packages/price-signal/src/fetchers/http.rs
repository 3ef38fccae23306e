//! HTTP transport implementation.
//!
//! One GET per call, no retries. The client carries the configured user
//! agent, a browser-like `Accept` header, a redirect limit, and a
//! per-request timeout.

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use tracing::debug;

use crate::error::{ConfigError, ConfigResult, FetchError, FetchResult};
use crate::traits::transport::{Transport, TransportResponse};
use crate::types::config::FetchConfig;

/// Maximum redirects followed per request.
const MAX_REDIRECTS: usize = 5;

/// reqwest-backed transport.
///
/// # Example
///
/// ```rust,ignore
/// use price_signal::fetchers::HttpTransport;
/// use price_signal::types::config::FetchConfig;
///
/// let transport = HttpTransport::new(&FetchConfig::default())?;
/// let response = transport.get("https://example.com").await?;
/// ```
#[derive(Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport from fetch settings.
    pub fn new(config: &FetchConfig) -> ConfigResult<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_static(
                "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
            ),
        );
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en-US,en;q=0.5"));

        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .user_agent(config.user_agent.as_str())
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(ConfigError::HttpClient)?;

        Ok(Self { client })
    }

    /// Use a preconfigured client.
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(&self, url: &str) -> FetchResult<TransportResponse> {
        debug!(url = %url, "HTTP GET");

        let response = self.client.get(url).send().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else if e.is_builder() {
                FetchError::InvalidUrl {
                    url: url.to_string(),
                }
            } else {
                FetchError::Http(Box::new(e))
            }
        })?;

        let status = response.status().as_u16();

        let body = response.text().await.map_err(|e| {
            if e.is_timeout() {
                FetchError::Timeout {
                    url: url.to_string(),
                }
            } else {
                FetchError::Http(Box::new(e))
            }
        })?;

        debug!(url = %url, status, bytes = body.len(), "HTTP GET finished");

        Ok(TransportResponse::new(status, body))
    }

    fn name(&self) -> &str {
        "http"
    }
}
