//! Lexical scanning of free text into price and date tokens.
//!
//! The tokenizer only finds spans and classifies them. Turning a token into
//! a number, a currency code, or a single date for the whole text is done by
//! the resolution rules in [`crate::pipeline::extract`].

use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

/// Currency symbols and the code each maps to. Multi-character symbols come
/// first so `A$` is never read as `$`.
pub const CURRENCY_SYMBOLS: &[(&str, &str)] = &[
    ("A$", "AUD"),
    ("C$", "CAD"),
    ("$", "USD"),
    ("£", "GBP"),
    ("€", "EUR"),
    ("₹", "INR"),
    ("¥", "JPY"),
    ("₩", "KRW"),
];

/// Three-letter codes recognized after a numeral.
pub const CURRENCY_CODES: &[&str] = &["USD", "EUR", "GBP", "INR", "JPY", "AUD", "CAD", "KRW"];

pub const MONTH_NAMES: &[&str] = &[
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

/// 1-3 digits, 3-digit groups separated by comma/dot/space, optional 1-2 digit fraction.
const NUMERAL: &str = r"[0-9]{1,3}(?:[,.\s][0-9]{3})*(?:[.,][0-9]{1,2})?";

static PRICE_RE: LazyLock<Regex> = LazyLock::new(|| {
    let symbols = CURRENCY_SYMBOLS
        .iter()
        .map(|(s, _)| regex::escape(s))
        .collect::<Vec<_>>()
        .join("|");
    let codes = CURRENCY_CODES.join("|");
    Regex::new(&format!(
        r"(?i)(?P<symbol>{symbols})\s?(?:{NUMERAL})|(?:{NUMERAL})\s?(?P<code>{codes})"
    ))
    .unwrap()
});

static MONTH_YEAR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\b(?P<month>{})\s+(?P<year>20[0-9]{{2}}|19[0-9]{{2}})\b",
        MONTH_NAMES.join("|")
    ))
    .unwrap()
});

static YEAR_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b(?P<year>20[0-9]{2}|19[0-9]{2})\b").unwrap());

/// The lexical currency marker that made a span a price token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CurrencyHint {
    /// A symbol before the numeral in its canonical spelling (e.g. `A$`),
    /// with the code it maps to
    Symbol {
        symbol: &'static str,
        code: &'static str,
    },
    /// A code after the numeral (e.g. `EUR`)
    Code(&'static str),
}

impl CurrencyHint {
    /// The code this hint maps to on its own.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Symbol { code, .. } | Self::Code(code) => *code,
        }
    }
}

/// A recognized price span.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceToken {
    /// Matched text, verbatim
    pub raw: String,

    /// Marker that made this a price
    pub currency_hint: CurrencyHint,

    /// Byte offset of the span in the scanned text
    pub offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateKind {
    /// "March 2020"
    MonthYear,
    /// "2020"
    Year,
}

/// A recognized date span and the day it stands for.
#[derive(Debug, Clone, PartialEq)]
pub struct DateToken {
    pub raw: String,
    pub kind: DateKind,
    /// First day of the month or year
    pub resolved_date: NaiveDate,
    pub offset: usize,
}

/// All tokens found in one text, each list in text order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TokenStream {
    pub prices: Vec<PriceToken>,
    pub dates: Vec<DateToken>,
}

/// Scan `text` for price and date tokens.
pub fn tokenize(text: &str) -> TokenStream {
    TokenStream {
        prices: price_tokens(text),
        dates: date_tokens(text),
    }
}

/// Non-overlapping price spans, left to right.
pub fn price_tokens(text: &str) -> Vec<PriceToken> {
    PRICE_RE
        .captures_iter(text)
        .filter_map(|cap| {
            let whole = cap.get(0)?;
            let hint = if let Some(sym) = cap.name("symbol") {
                let (symbol, code) = lookup_symbol(sym.as_str())?;
                CurrencyHint::Symbol { symbol, code }
            } else {
                CurrencyHint::Code(canonical_code(cap.name("code")?.as_str())?)
            };
            Some(PriceToken {
                raw: whole.as_str().to_string(),
                currency_hint: hint,
                offset: whole.start(),
            })
        })
        .collect()
}

/// Month-year and bare-year spans, ordered by position.
///
/// A year inside a month-year span is reported twice, once per kind.
pub fn date_tokens(text: &str) -> Vec<DateToken> {
    let mut tokens: Vec<DateToken> = MONTH_YEAR_RE
        .captures_iter(text)
        .filter_map(|cap| {
            let whole = cap.get(0)?;
            let month = month_number(cap.name("month")?.as_str())?;
            let year: i32 = cap.name("year")?.as_str().parse().ok()?;
            Some(DateToken {
                raw: whole.as_str().to_string(),
                kind: DateKind::MonthYear,
                resolved_date: NaiveDate::from_ymd_opt(year, month, 1)?,
                offset: whole.start(),
            })
        })
        .collect();

    tokens.extend(YEAR_RE.captures_iter(text).filter_map(|cap| {
        let whole = cap.get(0)?;
        let year: i32 = whole.as_str().parse().ok()?;
        Some(DateToken {
            raw: whole.as_str().to_string(),
            kind: DateKind::Year,
            resolved_date: NaiveDate::from_ymd_opt(year, 1, 1)?,
            offset: whole.start(),
        })
    }));

    tokens.sort_by_key(|t| t.offset);
    tokens
}

/// Canonical spelling and code for a matched symbol.
fn lookup_symbol(matched: &str) -> Option<(&'static str, &'static str)> {
    CURRENCY_SYMBOLS
        .iter()
        .find(|(s, _)| s.eq_ignore_ascii_case(matched))
        .copied()
}

fn canonical_code(matched: &str) -> Option<&'static str> {
    CURRENCY_CODES
        .iter()
        .find(|c| c.eq_ignore_ascii_case(matched))
        .copied()
}

fn month_number(name: &str) -> Option<u32> {
    let lower = name.to_lowercase();
    MONTH_NAMES
        .iter()
        .position(|m| *m == lower)
        .map(|i| i as u32 + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raws(text: &str) -> Vec<String> {
        price_tokens(text).into_iter().map(|t| t.raw).collect()
    }

    #[test]
    fn test_symbol_prefixed_prices() {
        assert_eq!(raws("now $1,234.50 each"), vec!["$1,234.50"]);
        assert_eq!(raws("was £ 45"), vec!["£ 45"]);
        assert_eq!(raws("€12,5 or ₹999"), vec!["€12,5", "₹999"]);
    }

    #[test]
    fn test_code_suffixed_prices() {
        assert_eq!(raws("1.234,50 EUR"), vec!["1.234,50 EUR"]);
        assert_eq!(raws("costs 300usd"), vec!["300usd"]);
    }

    #[test]
    fn test_multi_char_symbols_win() {
        let tokens = price_tokens("A$80 and C$ 95");
        assert_eq!(tokens.len(), 2);
        assert_eq!(
            tokens[0].currency_hint,
            CurrencyHint::Symbol { symbol: "A$", code: "AUD" }
        );
        assert_eq!(
            tokens[1].currency_hint,
            CurrencyHint::Symbol { symbol: "C$", code: "CAD" }
        );
        assert_eq!(tokens[1].raw, "C$ 95");
    }

    #[test]
    fn test_bare_numbers_are_not_prices() {
        assert!(raws("sold 1,200 units in 2021").is_empty());
    }

    #[test]
    fn test_code_hint_is_canonicalized() {
        let tokens = price_tokens("500 jpy");
        assert_eq!(tokens[0].currency_hint, CurrencyHint::Code("JPY"));
        assert_eq!(tokens[0].currency_hint.code(), "JPY");
    }

    #[test]
    fn test_date_tokens_in_text_order() {
        let tokens = date_tokens("Back in 2019, then March 2020.");
        let kinds: Vec<_> = tokens.iter().map(|t| (t.kind, t.raw.as_str())).collect();
        assert_eq!(
            kinds,
            vec![
                (DateKind::Year, "2019"),
                (DateKind::MonthYear, "March 2020"),
                (DateKind::Year, "2020"),
            ]
        );
        assert_eq!(
            tokens[1].resolved_date,
            NaiveDate::from_ymd_opt(2020, 3, 1).unwrap()
        );
    }

    #[test]
    fn test_month_names_case_insensitive() {
        let tokens = date_tokens("DECEMBER 1999");
        assert_eq!(tokens[0].kind, DateKind::MonthYear);
        assert_eq!(
            tokens[0].resolved_date,
            NaiveDate::from_ymd_opt(1999, 12, 1).unwrap()
        );
    }

    #[test]
    fn test_years_outside_range_ignored() {
        assert!(date_tokens("in 1850 and 2150 and 20201").is_empty());
    }

    #[test]
    fn test_symbol_lookup() {
        assert_eq!(lookup_symbol("€"), Some(("€", "EUR")));
        assert_eq!(lookup_symbol("a$"), Some(("A$", "AUD")));
        assert_eq!(lookup_symbol("#"), None);
    }

    #[test]
    fn test_every_symbol_maps_to_a_known_code() {
        for (_, code) in CURRENCY_SYMBOLS {
            assert!(CURRENCY_CODES.contains(code));
        }
    }

    #[test]
    fn test_symbol_span_ends_at_numeral() {
        let tokens = price_tokens("$100 CAD");
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].raw, "$100");
        assert_eq!(tokens[0].currency_hint.code(), "USD");
    }
}
