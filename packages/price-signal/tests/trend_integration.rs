//! Integration tests for the trend service.
//!
//! These exercise the full flow with mock collaborators:
//! 1. Suggest candidate URLs
//! 2. Fetch each page (primary, then reader fallback)
//! 3. Reduce and extract price observations
//! 4. Aggregate and summarize

use std::sync::Arc;
use std::time::Duration;

use price_signal::testing::{MockSentimentAnalyzer, MockSuggester, MockTransport};
use price_signal::{
    Direction, EngineConfig, FetchConfig, PriceSignalError, PriceTrendEngine, ScanConfig,
    TransportResponse,
};
use tokio_test::{assert_err, assert_ok};

/// Helper to build an HTML page that clears the content threshold.
fn html_page(title: &str, paragraphs: &[&str]) -> TransportResponse {
    let body: String = paragraphs
        .iter()
        .map(|p| format!("<p>{}</p>", p))
        .collect();
    TransportResponse::ok(format!(
        "<!DOCTYPE html><html><head><title>{}</title></head><body>{}<p>{}</p></body></html>",
        title,
        body,
        "This page collects launch prices and retail history for the product line. ".repeat(4)
    ))
}

fn test_config() -> EngineConfig {
    EngineConfig::default()
        .with_fetch(FetchConfig::default().with_retry_delay(Duration::ZERO))
        .with_scan(ScanConfig::default().with_max_concurrency(2))
}

/// Helper to set up an engine over canned pages.
fn setup_engine(
    transport: MockTransport,
    suggester: MockSuggester,
    config: &EngineConfig,
) -> PriceTrendEngine<MockTransport> {
    PriceTrendEngine::new(
        transport,
        config,
        Arc::new(suggester),
        Arc::new(MockSentimentAnalyzer::new()),
    )
}

#[tokio::test]
async fn test_search_builds_trend_across_sites() {
    let urls = [
        "https://www.macrumors.com/iphone-price-history",
        "https://www.cnet.com/iphone-prices-by-year",
        "https://blocked.example/iphone",
    ];
    let transport = MockTransport::new()
        .with_response(
            urls[0],
            html_page(
                "iPhone price history",
                &["The iPhone 11 launched in September 2019 at $699."],
            ),
        )
        .with_response(
            urls[1],
            html_page("iPhone prices by year", &["In 2023 the base model cost $799."]),
        )
        .with_response(urls[2], TransportResponse::new(403, "Forbidden"));

    let engine = setup_engine(
        transport,
        MockSuggester::new().with_urls(urls),
        &test_config(),
    );

    let trend = assert_ok!(engine.price_trend_search("iphone", Some(10)).await);

    assert_eq!(trend.series.len(), 2);
    assert_eq!(trend.series.points()[0].date.to_string(), "2019-09-01");
    assert_eq!(trend.series.points()[1].date.to_string(), "2023-01-01");
    assert_eq!(trend.summary.currency.as_deref(), Some("USD"));
    assert_eq!(trend.summary.direction, Direction::Increase);
    assert_eq!(trend.summary.pct_change, Some(14.31));
    assert_eq!(
        trend.sources[0].title.as_deref(),
        Some("iPhone price history")
    );
}

#[tokio::test]
async fn test_three_of_five_failing_still_yields_two_points() {
    let urls: Vec<String> = (0..5).map(|i| format!("https://s{}.example/p", i)).collect();
    let mut transport = MockTransport::new();
    for url in &urls[..3] {
        transport = transport.fail_url(url);
    }
    transport = transport
        .with_response(&urls[3], html_page("A", &["In 2020 it cost $50."]))
        .with_response(&urls[4], html_page("B", &["In 2021 it cost $55."]));

    let engine = setup_engine(
        transport,
        MockSuggester::new().with_urls(urls.clone()),
        &test_config(),
    );

    let trend = assert_ok!(engine.price_trend_search("widgets", None).await);
    assert_eq!(trend.series.len(), 2);
    assert_eq!(trend.sources.len(), 2);
}

#[tokio::test]
async fn test_search_with_no_signal_is_unknown() {
    let url = "https://nothing.example/page";
    let transport = MockTransport::new().with_response(
        url,
        html_page("Reviews", &["A thoughtful review without any numbers at all."]),
    );
    let engine = setup_engine(transport, MockSuggester::new().with_urls([url]), &test_config());

    let trend = assert_ok!(engine.price_trend_search("widgets", None).await);
    assert!(trend.series.is_empty());
    assert_eq!(trend.summary.direction, Direction::Unknown);

    let json = serde_json::to_value(&trend).unwrap();
    assert_eq!(json["summary"], serde_json::json!({"direction": "unknown"}));
    assert_eq!(json["series"], serde_json::json!([]));
}

#[tokio::test]
async fn test_scrape_uses_reader_fallback_when_enabled() {
    let url = "https://spa.example/tickets";
    let transport = MockTransport::new()
        .with_response(url, TransportResponse::ok("<html></html>"))
        .with_response(
            "https://r.jina.ai/spa.example/tickets",
            TransportResponse::ok(
                "Title: Ticket prices\n\nIn March 2020, tickets cost $50. By March 2023 they were $80.",
            ),
        );

    let mut config = test_config();
    config.fetch = config.fetch.with_reader_fallback(true);
    let engine = setup_engine(transport, MockSuggester::new(), &config);

    let scraped = assert_ok!(engine.scrape_price_from_url(url).await);
    assert_eq!(scraped.trend.series.len(), 2);
    assert!(scraped
        .trend
        .series
        .iter()
        .all(|p| p.date.to_string() == "2020-03-01"));
    assert_eq!(scraped.trend.summary.direction, Direction::Increase);
    assert_eq!(scraped.meta["title"], "");
}

#[tokio::test]
async fn test_scrape_short_body_without_fallback_fails() {
    let url = "https://spa.example/tickets";
    let transport = MockTransport::new().with_response(url, TransportResponse::ok("12345"));
    let engine = setup_engine(transport, MockSuggester::new(), &test_config());

    let err = assert_err!(engine.scrape_price_from_url(url).await);
    assert!(matches!(err, PriceSignalError::Fetch(ref f) if f.attempts == 2));
}

#[tokio::test]
async fn test_output_shape_is_camel_case() {
    let url = "https://shop.example/history";
    let transport = MockTransport::new().with_response(
        url,
        html_page("History", &["Price in 2018: 1.234,50 EUR", "Price in 2022: 1.400,00 EUR"]),
    );
    let engine = setup_engine(transport, MockSuggester::new(), &test_config());

    let scraped = assert_ok!(engine.scrape_price_from_url(url).await);
    let json = serde_json::to_value(&scraped).unwrap();

    let point = &json["series"][0];
    assert_eq!(point["date"], "2018-01-01");
    assert_eq!(point["price"], 1234.5);
    assert_eq!(point["currency"], "EUR");
    assert_eq!(point["sourceUrl"], url);
    assert!(json["summary"].get("absoluteChange").is_some());
    assert!(json["summary"].get("pctChange").is_some());
    assert_eq!(json["sources"][0]["url"], url);
    assert_eq!(json["meta"]["title"], "History");
}

#[test]
fn test_config_from_lookup_coerces_concurrency() {
    for raw in ["0", "-3", "abc"] {
        let config = EngineConfig::from_lookup(|name| {
            (name == "MAX_CONCURRENCY").then(|| raw.to_string())
        })
        .unwrap();
        assert_eq!(config.scan.max_concurrency, 2);
    }
}
