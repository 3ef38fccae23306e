//! Groq implementation of the suggestion and sentiment traits.
//!
//! Talks to an OpenAI-compatible chat-completions endpoint in JSON mode.
//! When the primary model is rejected as decommissioned or invalid, the
//! request is retried once with the fallback model.
//!
//! # Example
//!
//! ```rust,ignore
//! use price_signal::ai::GroqClient;
//!
//! let groq = GroqClient::from_config(&EngineConfig::from_env()?)?;
//! let urls = groq.suggest("iphone price history", 8).await?;
//! ```

use std::sync::LazyLock;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::ai::prompts::{
    format_sentiment_prompt, format_suggest_prompt, SENTIMENT_PROMPT, SUGGEST_URLS_PROMPT,
};
use crate::error::{ConfigError, ConfigResult, PriceSignalError, Result};
use crate::security::ServiceCredentials;
use crate::traits::suggester::{SentimentAnalyzer, UrlSuggester};
use crate::types::config::{EngineConfig, DEFAULT_USER_AGENT, FALLBACK_GROQ_MODEL};
use crate::types::sentiment::{SentimentReport, UrlSuggestion};

/// Suggestion counts are clamped to this range.
pub const MIN_SUGGESTIONS: usize = 1;
pub const MAX_SUGGESTIONS: usize = 20;

const SUGGEST_TEMPERATURE: f32 = 0.3;
const SENTIMENT_TEMPERATURE: f32 = 0.2;
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

static MODEL_REJECTED_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)decommissioned|no longer supported|invalid model").unwrap()
});

static URL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"https?://[^\s"'<>]+"#).unwrap());

/// Non-2xx answer from the chat-completions endpoint.
#[derive(Debug, Error)]
#[error("Groq API error: {status} {body}")]
pub struct GroqApiError {
    pub status: u16,
    pub body: String,
}

/// Groq chat-completions client.
#[derive(Clone)]
pub struct GroqClient {
    client: reqwest::Client,
    credentials: ServiceCredentials,
}

impl GroqClient {
    /// Create a client with explicit credentials.
    pub fn new(credentials: ServiceCredentials, user_agent: &str) -> ConfigResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .user_agent(user_agent)
            .build()
            .map_err(ConfigError::HttpClient)?;
        Ok(Self {
            client,
            credentials,
        })
    }

    /// Create a client from engine configuration.
    ///
    /// Fails with [`ConfigError::Missing`] when no API key is configured.
    pub fn from_config(config: &EngineConfig) -> ConfigResult<Self> {
        let api_key = config
            .groq
            .api_key
            .clone()
            .ok_or_else(|| ConfigError::Missing("GROQ_API_KEY".to_string()))?;

        let credentials =
            ServiceCredentials::new(api_key, config.groq.model.clone(), config.groq.base_url.clone())
                .with_fallback_model(FALLBACK_GROQ_MODEL);

        let user_agent = if config.fetch.user_agent.is_empty() {
            DEFAULT_USER_AGENT
        } else {
            config.fetch.user_agent.as_str()
        };
        Self::new(credentials, user_agent)
    }

    /// Primary model name.
    pub fn model(&self) -> &str {
        &self.credentials.model
    }

    /// Run a JSON-mode completion, falling back to the secondary model once
    /// if the primary is rejected. Returns the first choice's content.
    async fn complete_json(&self, system: &str, user: &str, temperature: f32) -> Result<String> {
        let primary = self.credentials.model.as_str();

        let error = match self.call_model(primary, system, user, temperature).await? {
            Ok(content) => return Ok(content),
            Err(error) => error,
        };

        let fallback = self
            .credentials
            .fallback_model
            .as_deref()
            .filter(|f| *f != primary && is_model_rejection(&error.body));

        let Some(fallback) = fallback else {
            return Err(PriceSignalError::Collaborator(Box::new(error)));
        };

        warn!(
            model = %primary,
            fallback = %fallback,
            status = error.status,
            "Model rejected, retrying with fallback"
        );

        match self.call_model(fallback, system, user, temperature).await? {
            Ok(content) => Ok(content),
            Err(error) => Err(PriceSignalError::Collaborator(Box::new(error))),
        }
    }

    /// One request. The outer error is transport-level; the inner one is a
    /// non-2xx answer that may warrant a model fallback.
    async fn call_model(
        &self,
        model: &str,
        system: &str,
        user: &str,
        temperature: f32,
    ) -> Result<std::result::Result<String, GroqApiError>> {
        let request = ChatRequest {
            model: model.to_string(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: system.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: user.to_string(),
                },
            ],
            temperature,
            response_format: ResponseFormat {
                format_type: "json_object".to_string(),
            },
        };

        debug!(model = %model, "Groq chat completion");

        let response = self
            .client
            .post(format!(
                "{}/chat/completions",
                self.credentials.base_url.trim_end_matches('/')
            ))
            .bearer_auth(self.credentials.api_key.expose())
            .json(&request)
            .send()
            .await
            .map_err(|e| PriceSignalError::Collaborator(Box::new(e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Ok(Err(GroqApiError {
                status: status.as_u16(),
                body,
            }));
        }

        let chat: ChatResponse = response
            .json()
            .await
            .map_err(|e| PriceSignalError::parse(format!("chat response: {}", e)))?;

        Ok(Ok(chat.first_content().unwrap_or_default()))
    }
}

#[async_trait]
impl UrlSuggester for GroqClient {
    async fn suggest(&self, query: &str, max: usize) -> Result<Vec<UrlSuggestion>> {
        let max = max.clamp(MIN_SUGGESTIONS, MAX_SUGGESTIONS);
        let content = self
            .complete_json(
                SUGGEST_URLS_PROMPT,
                &format_suggest_prompt(query, max),
                SUGGEST_TEMPERATURE,
            )
            .await?;

        let suggestions = parse_suggestions(&content, max);
        debug!(query = %query, count = suggestions.len(), "URL suggestions");
        Ok(suggestions)
    }
}

#[async_trait]
impl SentimentAnalyzer for GroqClient {
    async fn analyze(&self, topic: &str) -> Result<SentimentReport> {
        let content = self
            .complete_json(
                SENTIMENT_PROMPT,
                &format_sentiment_prompt(topic),
                SENTIMENT_TEMPERATURE,
            )
            .await?;

        parse_sentiment(&content)
    }
}

/// Whether an error body says the model itself was refused.
pub fn is_model_rejection(body: &str) -> bool {
    MODEL_REJECTED_RE.is_match(body)
}

/// Read suggestions from a completion.
///
/// Expects `{"results":[...]}`; entries without a URL are dropped. Content
/// that is not valid JSON is scanned for bare http(s) URLs instead.
pub fn parse_suggestions(content: &str, max: usize) -> Vec<UrlSuggestion> {
    match serde_json::from_str::<SuggestionEnvelope>(content) {
        Ok(envelope) => envelope
            .results
            .into_iter()
            .filter_map(|raw| {
                let url = raw.url.filter(|u| !u.trim().is_empty())?;
                Some(UrlSuggestion {
                    url,
                    title: raw.title,
                    rationale: raw.rationale,
                })
            })
            .take(max)
            .collect(),
        Err(e) => {
            debug!(error = %e, "Suggestion content is not JSON, scanning for URLs");
            URL_RE
                .find_iter(content)
                .take(max)
                .map(|m| UrlSuggestion::new(m.as_str()))
                .collect()
        }
    }
}

/// Read a sentiment report from a completion.
pub fn parse_sentiment(content: &str) -> Result<SentimentReport> {
    let content = if content.trim().is_empty() {
        "{}"
    } else {
        content
    };
    let report: SentimentReport = serde_json::from_str(content)
        .map_err(|e| PriceSignalError::parse(format!("sentiment report: {}", e)))?;
    report.validate().map_err(PriceSignalError::parse)?;
    Ok(report)
}

// Request/Response types

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

impl ChatResponse {
    fn first_content(self) -> Option<String> {
        self.choices.into_iter().next()?.message?.content
    }
}

#[derive(Deserialize)]
struct ChatChoice {
    #[serde(default)]
    message: Option<ChatResponseMessage>,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Deserialize)]
struct SuggestionEnvelope {
    #[serde(default)]
    results: Vec<RawSuggestion>,
}

#[derive(Deserialize)]
struct RawSuggestion {
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    rationale: Option<String>,
}
