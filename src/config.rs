//! Run configuration from an optional TOML file plus the environment.
//!
//! A missing or empty file yields `Config::default()`. Unknown keys are
//! accepted but logged, so typos show up in the run log. The Finnhub API key
//! may come from the file or from `FINNHUB_API_KEY`; the environment wins.
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::feed::{default_feeds, FeedDescriptor, FetchSettings};
use crate::market::{ChartClient, QuoteClient, DEFAULT_SYMBOLS};
use crate::news::NewsLimits;

/// Environment variable holding the Finnhub API key.
pub const API_KEY_ENV: &str = "FINNHUB_API_KEY";

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid TOML in config file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Config file too large: {0}")]
    TooLarge(String),

    #[error("FINNHUB_API_KEY is not set (export it or add finnhub_api_key to the config file)")]
    MissingApiKey,
}

// ============================================================================
// Configuration Struct
// ============================================================================

/// Immutable settings for one run, passed into each job.
///
/// Every field has a default so any subset of keys can be given.
/// `Debug` masks the API key.
#[derive(Deserialize)]
#[serde(default)]
pub struct Config {
    /// News snapshot path
    pub news_output: PathBuf,
    /// Live quote snapshot path
    pub quotes_output: PathBuf,
    /// Historical price CSV path
    pub history_output: PathBuf,

    /// Entries taken from each feed before normalization
    pub max_articles_per_feed: usize,
    /// Articles in the final snapshot
    pub max_total_articles: usize,
    /// Recency threshold in days
    pub max_age_days: i64,

    pub request_timeout_secs: u64,
    /// Courtesy pause between feeds
    pub feed_delay_ms: u64,
    /// Pause between quote calls (Finnhub free tier: 60 calls/minute)
    pub quote_delay_ms: u64,
    pub quote_timeout_secs: u64,
    pub history_delay_ms: u64,
    /// How far back to fetch when no price history exists yet
    pub history_backfill_days: i64,

    pub symbols: Vec<String>,
    pub finnhub_base_url: String,
    pub chart_base_url: String,

    #[serde(deserialize_with = "deserialize_secret")]
    pub finnhub_api_key: Option<SecretString>,

    /// Feeds to poll; replaces the built-in list when present in the file
    pub feeds: Vec<FeedDescriptor>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            news_output: PathBuf::from("data/franchise_news.json"),
            quotes_output: PathBuf::from("data/live_ticker.json"),
            history_output: PathBuf::from("data/franchise_stocks.csv"),
            max_articles_per_feed: 20,
            max_total_articles: 100,
            max_age_days: 30,
            request_timeout_secs: 15,
            feed_delay_ms: 500,
            quote_delay_ms: 1100,
            quote_timeout_secs: 10,
            history_delay_ms: 250,
            history_backfill_days: 365 * 10,
            symbols: DEFAULT_SYMBOLS.iter().map(|s| s.to_string()).collect(),
            finnhub_base_url: "https://finnhub.io/api/v1".to_string(),
            chart_base_url: "https://query1.finance.yahoo.com".to_string(),
            finnhub_api_key: None,
            feeds: default_feeds(),
        }
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("news_output", &self.news_output)
            .field("quotes_output", &self.quotes_output)
            .field("history_output", &self.history_output)
            .field("max_articles_per_feed", &self.max_articles_per_feed)
            .field("max_total_articles", &self.max_total_articles)
            .field("max_age_days", &self.max_age_days)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("feed_delay_ms", &self.feed_delay_ms)
            .field("quote_delay_ms", &self.quote_delay_ms)
            .field("quote_timeout_secs", &self.quote_timeout_secs)
            .field("history_delay_ms", &self.history_delay_ms)
            .field("history_backfill_days", &self.history_backfill_days)
            .field("symbols", &self.symbols.len())
            .field("finnhub_base_url", &self.finnhub_base_url)
            .field("chart_base_url", &self.chart_base_url)
            .field(
                "finnhub_api_key",
                &self.finnhub_api_key.as_ref().map(|_| "[REDACTED]"),
            )
            .field("feeds", &self.feeds.len())
            .finish()
    }
}

fn deserialize_secret<'de, D>(deserializer: D) -> Result<Option<SecretString>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.map(SecretString::from))
}

const KNOWN_KEYS: [&str; 17] = [
    "news_output",
    "quotes_output",
    "history_output",
    "max_articles_per_feed",
    "max_total_articles",
    "max_age_days",
    "request_timeout_secs",
    "feed_delay_ms",
    "quote_delay_ms",
    "quote_timeout_secs",
    "history_delay_ms",
    "history_backfill_days",
    "symbols",
    "finnhub_base_url",
    "chart_base_url",
    "finnhub_api_key",
    "feeds",
];

impl Config {
    /// Maximum config file size (1 MB).
    const MAX_FILE_SIZE: u64 = 1_048_576;

    /// Loads the file at `path` and applies the environment override for
    /// the API key.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load_file(path)?;
        Ok(config.with_api_key_override(std::env::var(API_KEY_ENV).ok()))
    }

    /// Loads configuration from a TOML file only.
    ///
    /// - Missing file → `Ok(Config::default())`
    /// - Empty file → `Ok(Config::default())`
    /// - Invalid TOML → `Err(ConfigError::Parse)` with line number info
    /// - Unknown keys → accepted, logged as warning
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::metadata(path) {
            Ok(meta) if meta.len() > Self::MAX_FILE_SIZE => {
                return Err(ConfigError::TooLarge(format!(
                    "Config file is {} bytes (max {} bytes)",
                    meta.len(),
                    Self::MAX_FILE_SIZE
                )));
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "No config file found, using defaults");
                return Ok(Self::default());
            }
            Err(e) => return Err(ConfigError::Io(e)),
            Ok(_) => {}
        }

        let content = std::fs::read_to_string(path)?;
        if content.trim().is_empty() {
            tracing::debug!(path = %path.display(), "Config file is empty, using defaults");
            return Ok(Self::default());
        }

        if let Ok(raw) = content.parse::<toml::Table>() {
            for key in raw.keys() {
                if !KNOWN_KEYS.contains(&key.as_str()) {
                    tracing::warn!(key = %key, "Unknown key in config file, ignoring");
                }
            }
        }

        let config: Config = toml::from_str(&content)?;
        tracing::info!(
            path = %path.display(),
            feeds = config.feeds.len(),
            symbols = config.symbols.len(),
            "Loaded configuration"
        );
        Ok(config)
    }

    /// Replaces the file's API key with `env_key` when that is non-empty.
    pub fn with_api_key_override(mut self, env_key: Option<String>) -> Self {
        if let Some(key) = env_key.filter(|k| !k.trim().is_empty()) {
            self.finnhub_api_key = Some(SecretString::from(key));
        }
        self
    }

    /// The Finnhub API key, required by the quote job.
    pub fn require_api_key(&self) -> Result<&SecretString, ConfigError> {
        self.finnhub_api_key
            .as_ref()
            .filter(|k| !k.expose_secret().trim().is_empty())
            .ok_or(ConfigError::MissingApiKey)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn fetch_settings(&self) -> FetchSettings {
        FetchSettings {
            timeout: self.request_timeout(),
            max_entries: self.max_articles_per_feed,
            delay: Duration::from_millis(self.feed_delay_ms),
        }
    }

    pub fn news_limits(&self) -> NewsLimits {
        NewsLimits {
            max_age_days: self.max_age_days,
            max_total: self.max_total_articles,
        }
    }

    pub fn quote_client<'a>(
        &'a self,
        http: &'a reqwest::Client,
        api_key: &'a SecretString,
    ) -> QuoteClient<'a> {
        QuoteClient {
            http,
            base_url: &self.finnhub_base_url,
            api_key,
            timeout: Duration::from_secs(self.quote_timeout_secs),
            delay: Duration::from_millis(self.quote_delay_ms),
        }
    }

    pub fn chart_client<'a>(&'a self, http: &'a reqwest::Client) -> ChartClient<'a> {
        ChartClient {
            http,
            base_url: &self.chart_base_url,
            timeout: self.request_timeout(),
            delay: Duration::from_millis(self.history_delay_ms),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
