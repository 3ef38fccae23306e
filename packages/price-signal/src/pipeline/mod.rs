//! Price-signal pipeline.
//!
//! The pipeline orchestrates:
//! - Tokenizing text into price and date tokens
//! - Resolving tokens into raw observations
//! - Aggregating observations into a canonical series
//! - Summarizing the series into a trend
//! - Scanning many URLs with bounded concurrency
//! - The caller-facing trend service

pub mod aggregate;
pub mod engine;
pub mod extract;
pub mod scan;
pub mod summarize;
pub mod tokenize;

pub use aggregate::aggregate;
pub use engine::{PriceTrendEngine, DEFAULT_MAX_RESULTS, MAX_SITES};
pub use extract::{extract, extract_at, parse_numeral, resolve_currency, resolve_date};
pub use scan::{ScanOrchestrator, ScanReport, TaskFailure, TaskOutcome};
pub use summarize::{build_trend, summarize};
pub use tokenize::{tokenize, CurrencyHint, DateKind, DateToken, PriceToken, TokenStream};
