//! Pattern extraction - turn free text into raw price observations.
//!
//! Tokens come from [`tokenize`]; this module applies the resolution rules:
//! - currency: a code literal in the span wins, else the symbol table
//! - numeral: comma groups merge, then a dot is the decimal mark unless a
//!   comma follows it (`1.234,50`)
//! - date: first "Month YYYY", else first bare year, else the processing date

use chrono::{NaiveDate, Utc};

use crate::pipeline::tokenize::{tokenize, DateKind, DateToken, PriceToken, CURRENCY_CODES};
use crate::types::observation::{RawObservation, SourceRef};

/// Extract observations from `text`, dating undated text with today's UTC date.
pub fn extract(text: &str, source: &SourceRef) -> Vec<RawObservation> {
    extract_at(text, source, Utc::now().date_naive())
}

/// Extract observations from `text`, dating undated text with `today`.
///
/// Every price token in the text shares one resolved date.
pub fn extract_at(text: &str, source: &SourceRef, today: NaiveDate) -> Vec<RawObservation> {
    let tokens = tokenize(text);
    if tokens.prices.is_empty() {
        return Vec::new();
    }

    let date = resolve_date(&tokens.dates, today);

    tokens
        .prices
        .iter()
        .filter_map(|token| {
            let price = parse_numeral(&token.raw)?;
            Some(RawObservation::new(
                price,
                Some(resolve_currency(token).to_string()),
                date,
                source,
                text,
            ))
        })
        .collect()
}

/// Pick the single date for a text: first month-year, else first year, else `fallback`.
pub fn resolve_date(dates: &[DateToken], fallback: NaiveDate) -> NaiveDate {
    dates
        .iter()
        .find(|t| t.kind == DateKind::MonthYear)
        .or_else(|| dates.iter().find(|t| t.kind == DateKind::Year))
        .map(|t| t.resolved_date)
        .unwrap_or(fallback)
}

/// Currency code for a price token.
pub fn resolve_currency(token: &PriceToken) -> &'static str {
    let upper = token.raw.to_uppercase();
    CURRENCY_CODES
        .iter()
        .find(|code| upper.contains(*code))
        .copied()
        .unwrap_or_else(|| token.currency_hint.code())
}

/// Parse the numeral inside a price span.
///
/// Commas before a three-digit group are grouping. After that, a dot means
/// dot-decimal and remaining commas are dropped, except in the `1.234,50`
/// form where the dots group and the final comma is the decimal mark.
/// Without a dot the comma is the decimal mark. Parsing stops at the first
/// character that cannot continue the number, so `1.234.567` reads as 1.234.
///
/// Returns `None` when nothing numeric is left or the value is not finite.
pub fn parse_numeral(raw: &str) -> Option<f64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == ',')
        .collect();
    let merged = merge_comma_groups(&cleaned);

    let normalized = match (merged.rfind('.'), merged.rfind(',')) {
        (Some(dot), Some(comma)) if comma > dot => merged.replace('.', "").replace(',', "."),
        (Some(_), _) => merged.replace(',', ""),
        (None, _) => merged.replace(',', "."),
    };

    leading_decimal(&normalized)?
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
}

/// Drop commas that sit between a digit and exactly three digits.
fn merge_comma_groups(cleaned: &str) -> String {
    let bytes = cleaned.as_bytes();
    let mut merged = String::with_capacity(cleaned.len());
    for (i, c) in cleaned.char_indices() {
        if c == ',' && i > 0 && bytes[i - 1].is_ascii_digit() {
            let group = bytes[i + 1..].iter().take_while(|b| b.is_ascii_digit()).count();
            if group == 3 {
                continue;
            }
        }
        merged.push(c);
    }
    merged
}

/// Longest `digits[.digits]` prefix, or `None` if there is no digit.
fn leading_decimal(s: &str) -> Option<&str> {
    let int_len = s.bytes().take_while(u8::is_ascii_digit).count();
    let frac_len = match s[int_len..].strip_prefix('.') {
        Some(after) => match after.bytes().take_while(u8::is_ascii_digit).count() {
            0 => 0,
            n => n + 1,
        },
        None => 0,
    };
    (int_len + frac_len > 0).then(|| &s[..int_len + frac_len])
}
