//! Price trend CLI
//!
//! Runs the trend service operations from the command line and prints
//! the result as pretty JSON on stdout.

use std::sync::Arc;

use anyhow::{Context, Result};
use async_trait::async_trait;
use clap::{Parser, Subcommand};
use price_signal::ai::GroqClient;
use price_signal::error::{ConfigError, Result as EngineResult};
use price_signal::traits::suggester::{SentimentAnalyzer, UrlSuggester};
use price_signal::types::config::EngineConfig;
use price_signal::types::sentiment::{SentimentReport, UrlSuggestion};
use price_signal::PriceTrendEngine;
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "price-trend")]
#[command(about = "Extract historic price signals from the web")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for pages with price history and summarize the trend
    Search {
        query: String,
        /// Max results to analyze (default 20, max 50)
        #[arg(long)]
        max_results: Option<usize>,
    },

    /// Scrape one page for price/date mentions
    Scrape { url: String },

    /// Analyze public demand sentiment for a topic
    Sentiment { topic: String },
}

/// Stands in for the Groq client when no API key is set, so `scrape`
/// still works and the other commands report the missing key.
struct MissingApiKey;

#[async_trait]
impl UrlSuggester for MissingApiKey {
    async fn suggest(&self, _query: &str, _max: usize) -> EngineResult<Vec<UrlSuggestion>> {
        Err(ConfigError::Missing("GROQ_API_KEY".to_string()).into())
    }
}

#[async_trait]
impl SentimentAnalyzer for MissingApiKey {
    async fn analyze(&self, _topic: &str) -> EngineResult<SentimentReport> {
        Err(ConfigError::Missing("GROQ_API_KEY".to_string()).into())
    }
}

fn collaborators(
    config: &EngineConfig,
) -> Result<(Arc<dyn UrlSuggester>, Arc<dyn SentimentAnalyzer>)> {
    match GroqClient::from_config(config) {
        Ok(client) => {
            let client = Arc::new(client);
            let suggester: Arc<dyn UrlSuggester> = client.clone();
            let analyzer: Arc<dyn SentimentAnalyzer> = client;
            Ok((suggester, analyzer))
        }
        Err(ConfigError::Missing(name)) => {
            tracing::warn!("{} not set; search and sentiment are unavailable", name);
            let suggester: Arc<dyn UrlSuggester> = Arc::new(MissingApiKey);
            let analyzer: Arc<dyn SentimentAnalyzer> = Arc::new(MissingApiKey);
            Ok((suggester, analyzer))
        }
        Err(e) => Err(e).context("Failed to create Groq client"),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!(
        "{}",
        serde_json::to_string_pretty(value).context("Failed to serialize output")?
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,price_signal=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = EngineConfig::from_env().context("Failed to load configuration")?;
    let (suggester, analyzer) = collaborators(&config)?;
    let engine = PriceTrendEngine::from_config(&config, suggester, analyzer)
        .context("Failed to create engine")?;

    match cli.command {
        Commands::Search { query, max_results } => {
            let trend = engine
                .price_trend_search(&query, max_results)
                .await
                .context("price_trend_search failed")?;
            print_json(&trend)
        }
        Commands::Scrape { url } => {
            let scraped = engine
                .scrape_price_from_url(&url)
                .await
                .context("scrape_price_from_url failed")?;
            print_json(&scraped)
        }
        Commands::Sentiment { topic } => {
            let report = engine
                .sentiment_demand_analysis(&topic)
                .await
                .context("sentiment_demand_analysis failed")?;
            print_json(&report)
        }
    }
}
