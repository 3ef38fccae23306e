//! Trend summarization - reduce a canonical series to start/end/change/direction.

use crate::pipeline::aggregate::aggregate;
use crate::types::observation::RawObservation;
use crate::types::trend::{CanonicalSeries, Direction, TrendResult, TrendSummary};

/// Percent changes with a smaller magnitude than this count as flat.
pub const FLAT_THRESHOLD_PCT: f64 = 0.01;

/// Summarize a series.
///
/// Direction is decided on the unrounded percent change; only the reported
/// `pct_change` is rounded to two decimals.
pub fn summarize(series: &CanonicalSeries) -> TrendSummary {
    let (Some(first), Some(last)) = (series.first(), series.last()) else {
        return TrendSummary::unknown();
    };

    let start = first.price;
    let end = last.price;
    let absolute_change = end - start;
    let pct_change = (start != 0.0).then(|| absolute_change / start * 100.0);

    let direction = match pct_change {
        None => Direction::Unknown,
        Some(pct) if pct.abs() < FLAT_THRESHOLD_PCT => Direction::Flat,
        Some(pct) if pct > 0.0 => Direction::Increase,
        Some(_) => Direction::Decrease,
    };

    TrendSummary {
        currency: last.currency.clone().or_else(|| first.currency.clone()),
        start: Some(start),
        end: Some(end),
        absolute_change: Some(absolute_change),
        pct_change: pct_change.map(round2),
        direction,
    }
}

/// Aggregate observations and summarize them into a full result.
pub fn build_trend(observations: impl IntoIterator<Item = RawObservation>) -> TrendResult {
    let series = aggregate(observations);
    let summary = summarize(&series);
    let sources = series.sources();

    TrendResult {
        series,
        summary,
        sources,
    }
}

/// Round to two decimals. Adding zero folds `-0.0` into `0.0`.
fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0 + 0.0
}
