//! Collaborator API keys and model selection.
//!
//! Keys live in a `secrecy` box and print as `[REDACTED]`, so configs and
//! clients can derive `Debug` freely.

use secrecy::{ExposeSecret, SecretBox};
use std::fmt;

/// An API key that never shows up in logs or debug output.
pub struct ApiKey(SecretBox<str>);

impl ApiKey {
    pub fn new(value: impl Into<String>) -> Self {
        Self(SecretBox::new(value.into().into_boxed_str()))
    }

    /// Parse a raw configured value. Blank values count as unset.
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        (!trimmed.is_empty()).then(|| Self::new(trimmed))
    }

    /// The raw key, for the `Authorization` header only.
    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

impl Clone for ApiKey {
    fn clone(&self) -> Self {
        Self::new(self.expose())
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey([REDACTED])")
    }
}

impl From<&str> for ApiKey {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Key, endpoint, and model pair for a chat-completions collaborator.
#[derive(Debug, Clone)]
pub struct ServiceCredentials {
    pub api_key: ApiKey,

    /// Primary model identifier
    pub model: String,

    /// Model to retry with when the primary is rejected
    pub fallback_model: Option<String>,

    pub base_url: String,
}

impl ServiceCredentials {
    pub fn new(api_key: ApiKey, model: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key,
            model: model.into(),
            fallback_model: None,
            base_url: base_url.into(),
        }
    }

    /// Set the fallback model.
    pub fn with_fallback_model(mut self, model: impl Into<String>) -> Self {
        self.fallback_model = Some(model.into());
        self
    }
}
