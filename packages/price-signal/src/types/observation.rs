//! Observation types - raw price sightings and canonical series points.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A reference to the document an observation came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceRef {
    /// Document URL
    pub url: String,

    /// Document title if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl SourceRef {
    /// Create a source reference without a title.
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: None,
        }
    }

    /// Set the title. Blank titles are treated as absent.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        let title = title.into();
        self.title = if title.trim().is_empty() {
            None
        } else {
            Some(title)
        };
        self
    }

    /// Set an optional title.
    pub fn with_optional_title(self, title: Option<String>) -> Self {
        match title {
            Some(t) => self.with_title(t),
            None => self,
        }
    }
}

/// An unconfirmed price sighting mined from text.
///
/// Produced by the pattern extractor and consumed only by the aggregator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawObservation {
    /// Parsed price value
    pub price: f64,

    /// ISO-like currency code if one was recognized
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    /// Resolved date at day granularity
    pub date: NaiveDate,

    /// URL of the originating document
    pub source_url: String,

    /// Title of the originating document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_title: Option<String>,

    /// The text the price was found in
    pub evidence_text: String,
}

impl RawObservation {
    /// Create an observation for a source.
    pub fn new(
        price: f64,
        currency: Option<String>,
        date: NaiveDate,
        source: &SourceRef,
        evidence_text: impl Into<String>,
    ) -> Self {
        Self {
            price,
            currency,
            date,
            source_url: source.url.clone(),
            source_title: source.title.clone(),
            evidence_text: evidence_text.into(),
        }
    }

    /// The deduplication key: `(date, price, source_url)`.
    ///
    /// Prices compare by bit pattern, i.e. exact numeric equality for the
    /// non-negative finite values the extractor produces.
    pub fn dedup_key(&self) -> (NaiveDate, u64, &str) {
        (self.date, self.price.to_bits(), self.source_url.as_str())
    }
}

/// One entry of a canonical series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    /// Observation date, serialized as `YYYY-MM-DD`
    pub date: NaiveDate,

    /// Price value
    pub price: f64,

    /// Currency code if known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    /// Source document URL
    pub source_url: String,

    /// Source document title
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Evidence text the price was found in
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snippet: Option<String>,
}

impl PricePoint {
    /// The deduplication key: `(date, price, source_url)`.
    pub fn dedup_key(&self) -> (NaiveDate, u64, &str) {
        (self.date, self.price.to_bits(), self.source_url.as_str())
    }

    /// Source reference for this point.
    pub fn source(&self) -> SourceRef {
        SourceRef {
            url: self.source_url.clone(),
            title: self.title.clone(),
        }
    }
}

impl From<RawObservation> for PricePoint {
    fn from(obs: RawObservation) -> Self {
        Self {
            date: obs.date,
            price: obs.price,
            currency: obs.currency,
            source_url: obs.source_url,
            title: obs.source_title,
            snippet: Some(obs.evidence_text).filter(|s| !s.is_empty()),
        }
    }
}
