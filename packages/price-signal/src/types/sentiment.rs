//! Collaborator payloads - URL suggestions and sentiment reports.

use serde::{Deserialize, Serialize};

/// A candidate document URL proposed for a query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlSuggestion {
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Why the suggester thinks this page has price history
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rationale: Option<String>,
}

impl UrlSuggestion {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
            rationale: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OverallSentiment {
    Positive,
    Negative,
    Mixed,
    Neutral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DemandLevel {
    High,
    Medium,
    Low,
}

/// A source cited by a sentiment report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentSource {
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// Structured judgment of public demand sentiment for a topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SentimentReport {
    pub topic: String,

    pub overall_sentiment: OverallSentiment,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub demand_level: Option<DemandLevel>,

    /// Between 0 and 1
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time_window: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub key_drivers: Option<Vec<String>>,

    pub summary: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<SentimentSource>>,
}

impl SentimentReport {
    /// Check field ranges that the type system does not enforce.
    pub fn validate(&self) -> std::result::Result<(), String> {
        if let Some(c) = self.confidence {
            if !(0.0..=1.0).contains(&c) {
                return Err(format!("confidence {} outside [0, 1]", c));
            }
        }
        Ok(())
    }
}
