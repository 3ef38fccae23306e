//! Typed errors for the price-signal library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling.

use thiserror::Error;

/// Errors surfaced by the engine's caller-facing operations.
#[derive(Debug, Error)]
pub enum PriceSignalError {
    /// Required configuration is missing or invalid
    #[error("config error: {0}")]
    Config(#[from] ConfigError),

    /// A document could not be retrieved
    #[error(transparent)]
    Fetch(#[from] FetchFailure),

    /// A collaborator returned a structured response we could not read
    #[error("parse failure: {reason}")]
    Parse { reason: String },

    /// Caller-supplied input failed validation
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    /// Suggestion or sentiment service failed
    #[error("collaborator error: {0}")]
    Collaborator(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl PriceSignalError {
    /// Build a parse failure from anything displayable.
    pub fn parse(reason: impl Into<String>) -> Self {
        Self::Parse {
            reason: reason.into(),
        }
    }

    /// Build an invalid-input error from anything displayable.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Whether this error comes from process configuration.
    pub fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}

/// Configuration errors. Fatal to the operation that needs the value.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable was not set
    #[error("missing required environment variable: {0}")]
    Missing(String),

    /// A variable was set but could not be used
    #[error("invalid value for {name}: {reason}")]
    Invalid { name: String, reason: String },

    /// HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    HttpClient(#[source] reqwest::Error),
}

/// Errors from a single transport attempt.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Request could not be sent or body could not be read
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Non-success status code
    #[error("HTTP {status}")]
    Status { status: u16 },

    /// Success status, but the body is too short to be real content
    #[error("insufficient content: {length} bytes (minimum {minimum})")]
    InsufficientContent { length: usize, minimum: usize },

    /// Invalid URL format
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Request timed out
    #[error("timeout fetching: {url}")]
    Timeout { url: String },
}

/// A document could not be retrieved after every planned attempt.
#[derive(Debug, Error)]
#[error("fetch failed for {url} after {attempts} attempt(s): {last_error}")]
pub struct FetchFailure {
    /// URL the caller asked for
    pub url: String,

    /// Number of transport attempts made
    pub attempts: usize,

    /// Last observed error
    #[source]
    pub last_error: FetchError,
}

/// Result type alias for engine operations.
pub type Result<T> = std::result::Result<T, PriceSignalError>;

/// Result type alias for a single transport attempt.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for configuration loading.
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
