//! Trend types - canonical series, summary, and result bundles.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use super::observation::{PricePoint, SourceRef};

/// A deduplicated, chronologically sorted price series.
///
/// Only the aggregator builds one from raw observations; afterwards it is
/// read-only. No two points share a `(date, price, source_url)` key and
/// dates never decrease.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CanonicalSeries {
    points: Vec<PricePoint>,
}

impl CanonicalSeries {
    pub(crate) fn from_sorted(points: Vec<PricePoint>) -> Self {
        Self { points }
    }

    /// The points in order.
    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    /// Iterate over the points.
    pub fn iter(&self) -> std::slice::Iter<'_, PricePoint> {
        self.points.iter()
    }

    /// Number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Whether the series has no points.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Chronologically first point.
    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    /// Chronologically last point.
    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    /// One source reference per distinct URL, in order of first appearance.
    pub fn sources(&self) -> Vec<SourceRef> {
        let mut sources: IndexMap<&str, SourceRef> = IndexMap::new();
        for point in &self.points {
            sources
                .entry(point.source_url.as_str())
                .or_insert_with(|| point.source());
        }
        sources.into_values().collect()
    }
}

impl<'a> IntoIterator for &'a CanonicalSeries {
    type Item = &'a PricePoint;
    type IntoIter = std::slice::Iter<'a, PricePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

/// Qualitative direction of net price movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Increase,
    Decrease,
    Flat,
    /// Empty series or zero baseline
    Unknown,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Increase => "increase",
            Self::Decrease => "decrease",
            Self::Flat => "flat",
            Self::Unknown => "unknown",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Scalar view of a canonical series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendSummary {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub start: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub absolute_change: Option<f64>,

    /// Percent change, rounded to two decimals
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pct_change: Option<f64>,

    pub direction: Direction,
}

impl TrendSummary {
    /// The summary of an empty series.
    pub fn unknown() -> Self {
        Self {
            currency: None,
            start: None,
            end: None,
            absolute_change: None,
            pct_change: None,
            direction: Direction::Unknown,
        }
    }
}

impl Default for TrendSummary {
    fn default() -> Self {
        Self::unknown()
    }
}

/// The bundle returned to callers: series, summary, and sources.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    pub series: CanonicalSeries,
    pub summary: TrendSummary,
    pub sources: Vec<SourceRef>,
}

impl TrendResult {
    /// An empty result with an unknown direction.
    pub fn empty() -> Self {
        Self::default()
    }
}

/// A trend built from one scraped page, plus the page's metadata.
///
/// `meta` holds `title` and every meta tag whose name mentions a date or
/// publication time, in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScrapedTrend {
    #[serde(flatten)]
    pub trend: TrendResult,

    pub meta: IndexMap<String, String>,
}
