use std::time::Duration;

use super::entry::RawEntry;
use super::parser::parse_feed;
use super::registry::FeedDescriptor;
use crate::http::{get_bytes, FetchError};

const FEED_ACCEPT: &str = "application/rss+xml, application/atom+xml, application/xml, text/xml, */*";

/// Per-run fetch limits.
#[derive(Debug, Clone, Copy)]
pub struct FetchSettings {
    /// Bound on one feed's request, body included
    pub timeout: Duration,
    /// Entries kept per feed, counted before normalization
    pub max_entries: usize,
    /// Pause between consecutive feeds
    pub delay: Duration,
}

/// Result of fetching one feed.
///
/// Carries the descriptor for correlation and either the (capped) raw entries
/// or the error that made this feed contribute nothing.
#[derive(Debug)]
pub struct FeedOutcome<'a> {
    pub feed: &'a FeedDescriptor,
    pub result: Result<Vec<RawEntry>, FetchError>,
}

/// Fetches every feed in order, one at a time.
///
/// A failing feed is logged and recorded in its [`FeedOutcome`]; it never
/// stops the remaining feeds. Outcomes are returned in input order.
pub async fn fetch_all<'a>(
    client: &reqwest::Client,
    feeds: &'a [FeedDescriptor],
    settings: FetchSettings,
) -> Vec<FeedOutcome<'a>> {
    let mut outcomes = Vec::with_capacity(feeds.len());

    for (i, feed) in feeds.iter().enumerate() {
        if i > 0 && !settings.delay.is_zero() {
            tokio::time::sleep(settings.delay).await;
        }

        let result = fetch_one(client, feed, settings).await;
        match &result {
            Ok(entries) => tracing::info!(
                feed = %feed.display_name,
                entries = entries.len(),
                "Fetched feed"
            ),
            Err(e) => tracing::warn!(
                feed = %feed.display_name,
                url = %feed.url,
                error = %e,
                "Feed fetch failed, skipping"
            ),
        }
        outcomes.push(FeedOutcome { feed, result });
    }

    outcomes
}

/// Fetches and parses a single feed, keeping at most `max_entries` entries.
///
/// # Errors
///
/// - [`FetchError::Network`] - Connection or TLS errors
/// - [`FetchError::Timeout`] - Request exceeded `settings.timeout`
/// - [`FetchError::HttpStatus`] - Non-2xx HTTP response
/// - [`FetchError::EmptyBody`] - Nothing to parse
/// - [`FetchError::ResponseTooLarge`] - Response exceeded 10MB
/// - [`FetchError::Parse`] - Invalid RSS/Atom XML
pub async fn fetch_one(
    client: &reqwest::Client,
    feed: &FeedDescriptor,
    settings: FetchSettings,
) -> Result<Vec<RawEntry>, FetchError> {
    let bytes = get_bytes(client, feed.url.as_str(), FEED_ACCEPT, settings.timeout).await?;
    tracing::debug!(feed = %feed.display_name, bytes = bytes.len(), "Downloaded feed body");

    let mut entries = parse_feed(&bytes).map_err(|e| FetchError::Parse(e.to_string()))?;
    if entries.len() > settings.max_entries {
        tracing::debug!(
            feed = %feed.display_name,
            found = entries.len(),
            kept = settings.max_entries,
            "Capping feed entries"
        );
        entries.truncate(settings.max_entries);
    }
    Ok(entries)
}
