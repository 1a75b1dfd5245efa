//! Daily price history: the CSV store, the Yahoo chart client and the
//! merge that keeps the store continuous across runs.
//!
//! The store is the one file that is not a pure snapshot. Each run reads it,
//! works out which days are missing, fetches only those and rewrites the
//! whole file with old and new rows merged on `(date, symbol)`.

use chrono::{DateTime, Days, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use url::Url;

use crate::http::{get_bytes, FetchError};

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    /// The chart endpoint answered with an `error` object
    #[error("Chart API error: {0}")]
    Api(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("Failed to read price store: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid chart base URL: {0}")]
    InvalidBaseUrl(String),
}

/// One day of one symbol, as stored in the CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceRow {
    pub date: NaiveDate,
    pub symbol: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    #[serde(rename = "adjClose")]
    pub adj_close: f64,
    pub volume: u64,
}

/// Inclusive range of calendar days to fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl FetchWindow {
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Unix seconds at midnight UTC opening the window.
    pub fn period1(&self) -> i64 {
        midnight_utc(self.start)
    }

    /// Unix seconds at midnight UTC after the last day (exclusive bound).
    pub fn period2(&self) -> i64 {
        midnight_utc(self.end.checked_add_days(Days::new(1)).unwrap_or(self.end))
    }
}

fn midnight_utc(date: NaiveDate) -> i64 {
    date.and_time(NaiveTime::MIN).and_utc().timestamp()
}

/// Days still missing from the store.
///
/// With a `latest` date the window is `latest + 1 ..= today`, and `None`
/// when that is empty. Without one, the last `backfill_days` are fetched.
pub fn compute_window(
    latest: Option<NaiveDate>,
    today: NaiveDate,
    backfill_days: i64,
) -> Option<FetchWindow> {
    let start = match latest {
        Some(latest) => latest.checked_add_days(Days::new(1))?,
        None => today
            .checked_sub_days(Days::new(backfill_days.max(0) as u64))
            .unwrap_or(NaiveDate::MIN),
    };
    (start <= today).then_some(FetchWindow { start, end: today })
}

/// Merges persisted and freshly fetched rows.
///
/// A later row replaces an earlier one with the same `(date, symbol)`, and
/// `fresh` counts as later than `existing`. Output is sorted by date then
/// symbol.
pub fn merge_rows(existing: Vec<PriceRow>, fresh: Vec<PriceRow>) -> Vec<PriceRow> {
    let mut merged: BTreeMap<(NaiveDate, String), PriceRow> = BTreeMap::new();
    for row in existing.into_iter().chain(fresh) {
        merged.insert((row.date, row.symbol.clone()), row);
    }
    merged.into_values().collect()
}

/// Reads the CSV store. A missing file is an empty store.
pub fn read_store(path: &Path) -> Result<Vec<PriceRow>, HistoryError> {
    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut reader = csv::Reader::from_reader(file);
    let rows = reader
        .deserialize()
        .collect::<Result<Vec<PriceRow>, csv::Error>>()?;
    Ok(rows)
}

// ============================================================================
// Chart endpoint
// ============================================================================

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    #[serde(default)]
    result: Option<Vec<ChartResult>>,
    #[serde(default)]
    error: Option<ChartApiError>,
}

#[derive(Debug, Deserialize)]
struct ChartApiError {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    description: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteSeries>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteSeries {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

/// Parses a chart response into rows that fall inside `window`.
///
/// Bars with any missing price are dropped; a missing volume is 0.
pub fn parse_chart(
    symbol: &str,
    body: &[u8],
    window: FetchWindow,
) -> Result<Vec<PriceRow>, HistoryError> {
    let response: ChartResponse =
        serde_json::from_slice(body).map_err(|e| FetchError::Parse(e.to_string()))?;

    if let Some(err) = response.chart.error {
        let message = match (err.code, err.description) {
            (Some(code), Some(description)) => format!("{code}: {description}"),
            (code, description) => code.or(description).unwrap_or_else(|| "unknown".into()),
        };
        return Err(HistoryError::Api(message));
    }

    let Some(result) = response.chart.result.and_then(|r| r.into_iter().next()) else {
        return Ok(Vec::new());
    };
    let series = result.indicators.quote.into_iter().next().unwrap_or_default();

    let at = |values: &[Option<f64>], i: usize| values.get(i).copied().flatten();
    let rows = result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, ts)| {
            let date = DateTime::from_timestamp(*ts, 0)?.date_naive();
            if !window.contains(date) {
                return None;
            }
            let close = at(&series.close, i)?;
            Some(PriceRow {
                date,
                symbol: symbol.to_string(),
                open: at(&series.open, i)?,
                high: at(&series.high, i)?,
                low: at(&series.low, i)?,
                close,
                adj_close: close,
                volume: at(&series.volume, i).map_or(0, |v| v.max(0.0) as u64),
            })
        })
        .collect();
    Ok(rows)
}

/// Daily-bar client for the Yahoo chart endpoint.
pub struct ChartClient<'a> {
    pub http: &'a reqwest::Client,
    pub base_url: &'a str,
    pub timeout: Duration,
    /// Pause between consecutive symbols
    pub delay: Duration,
}

impl ChartClient<'_> {
    fn chart_url(&self, symbol: &str, window: FetchWindow) -> Result<Url, HistoryError> {
        let mut url =
            Url::parse(self.base_url).map_err(|e| HistoryError::InvalidBaseUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| HistoryError::InvalidBaseUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(["v8", "finance", "chart", symbol]);
        url.query_pairs_mut()
            .append_pair("period1", &window.period1().to_string())
            .append_pair("period2", &window.period2().to_string())
            .append_pair("interval", "1d");
        Ok(url)
    }

    /// Fetches daily bars for one symbol.
    pub async fn fetch_daily_bars(
        &self,
        symbol: &str,
        window: FetchWindow,
    ) -> Result<Vec<PriceRow>, HistoryError> {
        let url = self.chart_url(symbol, window)?;
        let body = get_bytes(self.http, url, "application/json", self.timeout).await?;
        parse_chart(symbol, &body, window)
    }

    /// Fetches every symbol in order. Failures and empty results are logged
    /// and contribute no rows.
    pub async fn fetch_all(&self, symbols: &[String], window: FetchWindow) -> Vec<PriceRow> {
        let mut rows = Vec::new();

        for (i, symbol) in symbols.iter().enumerate() {
            if i > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }

            match self.fetch_daily_bars(symbol, window).await {
                Ok(bars) if bars.is_empty() => {
                    tracing::warn!(symbol = %symbol, "No bars returned");
                }
                Ok(bars) => {
                    tracing::info!(symbol = %symbol, rows = bars.len(), "Fetched daily bars");
                    rows.extend(bars);
                }
                Err(e) => {
                    tracing::warn!(symbol = %symbol, error = %e, "Daily bar fetch failed, skipping");
                }
            }
        }
        rows
    }
}

/// Result of one history run.
#[derive(Debug)]
pub enum HistoryOutcome {
    /// Store already covers today; nothing to write
    UpToDate { latest: NaiveDate },
    /// New rows merged; `rows` is the full store to write back
    Updated {
        window: FetchWindow,
        fetched: usize,
        rows: Vec<PriceRow>,
    },
    /// Every symbol failed or came back empty
    NoData { window: FetchWindow },
}

/// Reads the store at `store`, fetches the missing window and merges.
///
/// Nothing is written here; the caller persists `Updated` rows.
pub async fn run_history(
    client: &ChartClient<'_>,
    symbols: &[String],
    store: &Path,
    today: NaiveDate,
    backfill_days: i64,
) -> Result<HistoryOutcome, HistoryError> {
    let existing = read_store(store)?;
    let latest = existing.iter().map(|row| row.date).max();

    let Some(window) = compute_window(latest, today, backfill_days) else {
        // compute_window only declines when a latest date exists
        let latest = latest.unwrap_or(today);
        tracing::info!(latest = %latest, "Price store is already up to date");
        return Ok(HistoryOutcome::UpToDate { latest });
    };

    tracing::info!(
        store = %store.display(),
        existing_rows = existing.len(),
        start = %window.start,
        end = %window.end,
        symbols = symbols.len(),
        "Fetching daily bars"
    );

    let fresh = client.fetch_all(symbols, window).await;
    if fresh.is_empty() {
        return Ok(HistoryOutcome::NoData { window });
    }

    let fetched = fresh.len();
    let rows = merge_rows(existing, fresh);
    Ok(HistoryOutcome::Updated {
        window,
        fetched,
        rows,
    })
}
