//! Series aggregation - dedupe raw observations and order them by date.

use chrono::NaiveDate;
use indexmap::IndexMap;

use crate::types::observation::{PricePoint, RawObservation};
use crate::types::trend::CanonicalSeries;

/// Build a canonical series from raw observations.
///
/// Observations sharing `(date, price, source_url)` collapse to the first one
/// seen. The result is stably sorted by date, so equal dates keep their
/// first-seen order. Nothing is filtered by magnitude or currency.
pub fn aggregate(observations: impl IntoIterator<Item = RawObservation>) -> CanonicalSeries {
    dedupe_and_sort(observations.into_iter().map(PricePoint::from))
}

/// Re-aggregate an existing series' points.
///
/// A canonical series passes through unchanged.
pub fn reaggregate(series: &CanonicalSeries) -> CanonicalSeries {
    dedupe_and_sort(series.iter().cloned())
}

fn dedupe_and_sort(points: impl Iterator<Item = PricePoint>) -> CanonicalSeries {
    let mut unique: IndexMap<(NaiveDate, u64, String), PricePoint> = IndexMap::new();
    for point in points {
        let (date, price_bits, url) = point.dedup_key();
        let key = (date, price_bits, url.to_string());
        unique.entry(key).or_insert(point);
    }

    let mut sorted: Vec<PricePoint> = unique.into_values().collect();
    sorted.sort_by_key(|p| p.date);

    CanonicalSeries::from_sorted(sorted)
}
