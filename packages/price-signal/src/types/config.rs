//! Configuration types for fetching, scanning, and collaborators.
//!
//! Everything is read once into an [`EngineConfig`] at process start and
//! handed to the components that need it. No component reads the
//! environment on its own.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, ConfigResult};
use crate::security::ApiKey;

/// Default user agent for outbound requests.
pub const DEFAULT_USER_AGENT: &str = "PriceSignal/0.1 (+https://github.com/price-signal)";

/// Default maximum number of in-flight scan tasks.
pub const DEFAULT_MAX_CONCURRENCY: usize = 2;

/// Default reader proxy prefix.
pub const DEFAULT_READER_BASE_URL: &str = "https://r.jina.ai/";

/// Default chat-completions endpoint for the suggestion/sentiment client.
pub const DEFAULT_GROQ_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Default primary model.
pub const DEFAULT_GROQ_MODEL: &str = "llama-3.1-8b-instant";

/// Model used when the primary model is rejected.
pub const FALLBACK_GROQ_MODEL: &str = "openai/gpt-oss-20b";

/// Tuning for the document fetcher.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetchConfig {
    /// User agent sent on every request
    pub user_agent: String,

    /// Attempts against the primary transport
    pub primary_attempts: usize,

    /// Delay between primary attempts
    #[serde(with = "duration_millis")]
    pub retry_delay: Duration,

    /// Primary bodies must be longer than this to count as content.
    ///
    /// Guards against interstitial or anti-bot pages that answer 200
    /// with an almost empty body.
    pub min_content_length: usize,

    /// Try the reader proxy after the primary attempts fail
    pub use_reader_fallback: bool,

    /// Reader proxy prefix; the target URL is appended without its scheme
    pub reader_base_url: String,

    /// Per-request timeout
    #[serde(with = "duration_millis")]
    pub request_timeout: Duration,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            primary_attempts: 2,
            retry_delay: Duration::from_millis(500),
            min_content_length: 256,
            use_reader_fallback: false,
            reader_base_url: DEFAULT_READER_BASE_URL.to_string(),
            request_timeout: Duration::from_secs(20),
        }
    }
}

impl FetchConfig {
    /// Create a fetch config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the user agent.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the number of primary attempts (at least one).
    pub fn with_primary_attempts(mut self, attempts: usize) -> Self {
        self.primary_attempts = attempts.max(1);
        self
    }

    /// Set the delay between primary attempts.
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    /// Set the minimum content length.
    pub fn with_min_content_length(mut self, length: usize) -> Self {
        self.min_content_length = length;
        self
    }

    /// Enable or disable the reader fallback.
    pub fn with_reader_fallback(mut self, enabled: bool) -> Self {
        self.use_reader_fallback = enabled;
        self
    }

    /// Set the reader proxy prefix.
    pub fn with_reader_base_url(mut self, url: impl Into<String>) -> Self {
        self.reader_base_url = url.into();
        self
    }

    /// Set the per-request timeout.
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Tuning for the scan orchestrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Maximum in-flight fetch+extract tasks
    pub max_concurrency: usize,

    /// URLs beyond this many are dropped before fan-out
    pub max_urls: usize,

    /// Overall deadline for one scan; unsettled tasks fail when it passes
    #[serde(with = "option_duration_millis")]
    pub deadline: Option<Duration>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            max_urls: 8,
            deadline: Some(Duration::from_secs(90)),
        }
    }
}

impl ScanConfig {
    /// Create a scan config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set max concurrency (at least one).
    pub fn with_max_concurrency(mut self, concurrency: usize) -> Self {
        self.max_concurrency = concurrency.max(1);
        self
    }

    /// Set the URL cap.
    pub fn with_max_urls(mut self, max: usize) -> Self {
        self.max_urls = max;
        self
    }

    /// Set the overall deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Remove the overall deadline.
    pub fn without_deadline(mut self) -> Self {
        self.deadline = None;
        self
    }
}

/// Settings for the URL suggestion / sentiment collaborator.
#[derive(Debug, Clone)]
pub struct GroqConfig {
    /// API key; the client refuses to start without one
    pub api_key: Option<ApiKey>,

    /// Primary model
    pub model: String,

    /// Endpoint base URL
    pub base_url: String,
}

/// Process-wide configuration, constructed once and injected.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub fetch: FetchConfig,
    pub scan: ScanConfig,
    pub groq: GroqConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            fetch: FetchConfig::default(),
            scan: ScanConfig::default(),
            groq: GroqConfig {
                api_key: None,
                model: DEFAULT_GROQ_MODEL.to_string(),
                base_url: DEFAULT_GROQ_BASE_URL.to_string(),
            },
        }
    }
}

impl EngineConfig {
    /// Load configuration from environment variables.
    ///
    /// A `.env` file is honored when present.
    pub fn from_env() -> ConfigResult<Self> {
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> ConfigResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(user_agent) = lookup("USER_AGENT").filter(|v| !v.trim().is_empty()) {
            config.fetch.user_agent = user_agent;
        }

        let concurrency = first_set(&lookup, &["MAX_CONCURRENCY", "GROQ_MAX_CONCURRENCY"]);
        config.scan.max_concurrency = parse_concurrency(concurrency.as_deref());
        let reader_flag = first_set(&lookup, &["USE_READER_FALLBACK", "USE_JINA_READER"]);
        config.fetch.use_reader_fallback = reader_flag.as_deref() == Some("1");

        if let Some(reader) = lookup("READER_BASE_URL") {
            url::Url::parse(&reader).map_err(|e| ConfigError::Invalid {
                name: "READER_BASE_URL".to_string(),
                reason: e.to_string(),
            })?;
            config.fetch.reader_base_url = reader;
        }

        config.groq.api_key = lookup("GROQ_API_KEY").as_deref().and_then(ApiKey::parse);
        if let Some(model) = lookup("GROQ_MODEL").filter(|v| !v.trim().is_empty()) {
            config.groq.model = model;
        }

        Ok(config)
    }

    /// Replace the fetch config.
    pub fn with_fetch(mut self, fetch: FetchConfig) -> Self {
        self.fetch = fetch;
        self
    }

    /// Replace the scan config.
    pub fn with_scan(mut self, scan: ScanConfig) -> Self {
        self.scan = scan;
        self
    }
}

/// Value of the first variable in `names` that is set. Later names are
/// legacy aliases.
fn first_set<F>(lookup: &F, names: &[&str]) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    names.iter().find_map(|name| lookup(name))
}

/// Parse a concurrency setting. Missing, non-numeric, or non-positive values become the default.
pub fn parse_concurrency(raw: Option<&str>) -> usize {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|n| *n > 0)
        .map(|n| n as usize)
        .unwrap_or(DEFAULT_MAX_CONCURRENCY)
}

mod duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_millis() as u64)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_millis)
    }
}

mod option_duration_millis {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Option<Duration>, s: S) -> Result<S::Ok, S::Error> {
        match d {
            Some(d) => s.serialize_some(&(d.as_millis() as u64)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<Duration>, D::Error> {
        Option::<u64>::deserialize(d).map(|v| v.map(Duration::from_millis))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn test_parse_concurrency_coerces_bad_values() {
        assert_eq!(parse_concurrency(None), 2);
        assert_eq!(parse_concurrency(Some("0")), 2);
        assert_eq!(parse_concurrency(Some("-3")), 2);
        assert_eq!(parse_concurrency(Some("abc")), 2);
        assert_eq!(parse_concurrency(Some("6")), 6);
        assert_eq!(parse_concurrency(Some(" 4 ")), 4);
    }

    #[test]
    fn test_defaults_without_env() {
        let config = EngineConfig::from_lookup(|_| None).unwrap();
        assert_eq!(config.fetch.user_agent, DEFAULT_USER_AGENT);
        assert_eq!(config.scan.max_concurrency, 2);
        assert!(!config.fetch.use_reader_fallback);
        assert!(config.groq.api_key.is_none());
        assert_eq!(config.groq.model, DEFAULT_GROQ_MODEL);
    }

    #[test]
    fn test_from_lookup_reads_values() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            ("USER_AGENT", "TestBot/1.0"),
            ("MAX_CONCURRENCY", "5"),
            ("USE_READER_FALLBACK", "1"),
            ("GROQ_API_KEY", "gsk-test"),
            ("GROQ_MODEL", "llama-3.3-70b"),
        ]))
        .unwrap();

        assert_eq!(config.fetch.user_agent, "TestBot/1.0");
        assert_eq!(config.scan.max_concurrency, 5);
        assert!(config.fetch.use_reader_fallback);
        assert_eq!(config.groq.api_key.as_ref().map(ApiKey::expose), Some("gsk-test"));
        assert_eq!(config.groq.model, "llama-3.3-70b");
    }

    #[test]
    fn test_reader_fallback_needs_exact_flag() {
        let config =
            EngineConfig::from_lookup(lookup_from(&[("USE_READER_FALLBACK", "true")])).unwrap();
        assert!(!config.fetch.use_reader_fallback);
    }

    #[test]
    fn test_invalid_reader_url_rejected() {
        let err = EngineConfig::from_lookup(lookup_from(&[("READER_BASE_URL", "not a url")]))
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_builders_clamp() {
        let scan = ScanConfig::new().with_max_concurrency(0).with_max_urls(3);
        assert_eq!(scan.max_concurrency, 1);
        assert_eq!(scan.max_urls, 3);

        let fetch = FetchConfig::new().with_primary_attempts(0);
        assert_eq!(fetch.primary_attempts, 1);
    }

    #[test]
    fn test_legacy_variable_names_still_read() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            ("GROQ_MAX_CONCURRENCY", "6"),
            ("USE_JINA_READER", "1"),
        ]))
        .unwrap();
        assert_eq!(config.scan.max_concurrency, 6);
        assert!(config.fetch.use_reader_fallback);
    }

    #[test]
    fn test_current_names_win_over_legacy() {
        let config = EngineConfig::from_lookup(lookup_from(&[
            ("MAX_CONCURRENCY", "3"),
            ("GROQ_MAX_CONCURRENCY", "6"),
            ("USE_READER_FALLBACK", "0"),
            ("USE_JINA_READER", "1"),
        ]))
        .unwrap();
        assert_eq!(config.scan.max_concurrency, 3);
        assert!(!config.fetch.use_reader_fallback);
    }
}
