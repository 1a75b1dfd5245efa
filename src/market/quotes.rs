use chrono::{DateTime, Utc};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use super::symbols::finnhub_symbol;
use crate::http::{get_bytes, FetchError};

/// Label written on every quote and on the snapshot.
pub const QUOTE_SOURCE: &str = "finnhub";

#[derive(Debug, Error)]
pub enum QuoteError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// Finnhub answers unknown symbols with `c: 0`
    #[error("No valid price returned")]
    NoPrice,
    #[error("Invalid quote endpoint: {0}")]
    InvalidEndpoint(#[from] url::ParseError),
}

/// Body of Finnhub's `/quote` response.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FinnhubQuote {
    /// Current price
    pub c: Option<f64>,
    pub h: Option<f64>,
    pub l: Option<f64>,
    pub o: Option<f64>,
    /// Previous close
    pub pc: Option<f64>,
    /// Unix seconds
    pub t: Option<i64>,
}

/// One symbol's quote as the ticker widget reads it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub price: f64,
    pub change: f64,
    pub change_percent: f64,
    pub is_positive: bool,
    pub is_negative: bool,
    pub high: f64,
    pub low: f64,
    pub open: f64,
    pub previous_close: f64,
    pub timestamp: i64,
    pub source: String,
}

/// The live ticker file: every successful quote plus run metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteSnapshot {
    pub quotes: BTreeMap<String, Quote>,
    pub fetched_at: DateTime<Utc>,
    pub count: usize,
    pub source: String,
}

/// Where and how to ask Finnhub for quotes.
pub struct QuoteClient<'a> {
    pub http: &'a reqwest::Client,
    pub base_url: &'a str,
    pub api_key: &'a SecretString,
    pub timeout: Duration,
    /// Pause between consecutive symbols
    pub delay: Duration,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Turns a raw Finnhub response into a [`Quote`] for `symbol`.
///
/// Missing high/low/open fall back to the current price and a missing
/// previous close to the current price (zero change). `now_ts` stands in
/// for a missing timestamp.
pub fn quote_from_response(
    symbol: &str,
    raw: &FinnhubQuote,
    now_ts: i64,
) -> Result<Quote, QuoteError> {
    let current = raw.c.filter(|c| *c > 0.0).ok_or(QuoteError::NoPrice)?;
    let prev_close = raw.pc.unwrap_or(current);

    let change = current - prev_close;
    let change_percent = if prev_close > 0.0 {
        change / prev_close * 100.0
    } else {
        0.0
    };

    Ok(Quote {
        symbol: symbol.to_string(),
        price: round2(current),
        change: round2(change),
        change_percent: round2(change_percent),
        is_positive: change > 0.0,
        is_negative: change < 0.0,
        high: round2(raw.h.unwrap_or(current)),
        low: round2(raw.l.unwrap_or(current)),
        open: round2(raw.o.unwrap_or(current)),
        previous_close: round2(prev_close),
        timestamp: raw.t.filter(|t| *t > 0).unwrap_or(now_ts),
        source: QUOTE_SOURCE.to_string(),
    })
}

impl QuoteClient<'_> {
    /// Fetches one quote. `symbol` is the tracked (Yahoo-style) symbol; the
    /// returned quote keeps it even when Finnhub is asked for an alias.
    pub async fn fetch_quote(&self, symbol: &str) -> Result<Quote, QuoteError> {
        let endpoint = format!("{}/quote", self.base_url.trim_end_matches('/'));
        let url = Url::parse_with_params(
            &endpoint,
            &[
                ("symbol", finnhub_symbol(symbol)),
                ("token", self.api_key.expose_secret()),
            ],
        )?;

        let bytes = get_bytes(self.http, url, "application/json", self.timeout).await?;
        let raw: FinnhubQuote =
            serde_json::from_slice(&bytes).map_err(|e| FetchError::Parse(e.to_string()))?;
        quote_from_response(symbol, &raw, Utc::now().timestamp())
    }

    /// Fetches every symbol in order with a fixed pause between calls.
    ///
    /// Failed symbols are logged and left out of the snapshot.
    pub async fn fetch_all(&self, symbols: &[String]) -> QuoteSnapshot {
        let total = symbols.len();
        let mut quotes = BTreeMap::new();

        for (i, symbol) in symbols.iter().enumerate() {
            if i > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            match self.fetch_quote(symbol).await {
                Ok(quote) => {
                    tracing::info!(
                        symbol = %symbol,
                        progress = format!("{}/{}", i + 1, total),
                        price = quote.price,
                        change_percent = quote.change_percent,
                        "Fetched quote"
                    );
                    quotes.insert(symbol.clone(), quote);
                }
                Err(e) => {
                    tracing::warn!(symbol = %symbol, error = %e, "Quote fetch failed, skipping");
                }
            }
        }

        tracing::info!(fetched = quotes.len(), total = total, "Quote run finished");
        QuoteSnapshot {
            count: quotes.len(),
            quotes,
            fetched_at: Utc::now(),
            source: QUOTE_SOURCE.to_string(),
        }
    }
}
