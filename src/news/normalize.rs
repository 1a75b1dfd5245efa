use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use sha2::{Digest, Sha256};

use super::types::{Article, SkipReason};
use crate::feed::{FeedDescriptor, RawEntry};
use crate::util::{clean_text, validate_link};

/// Title used when an entry has none.
pub const UNTITLED: &str = "Untitled";

/// Hex characters kept from the identity hash.
const ID_LEN: usize = 16;

type DateSource = fn(&RawEntry) -> Option<DateTime<Utc>>;

/// Date sources in precedence order: structured fields first, then free text.
const DATE_SOURCES: [(&str, DateSource); 4] = [
    ("published_parsed", |e| e.published_parsed),
    ("updated_parsed", |e| e.updated_parsed),
    ("published", |e| e.published.as_deref().and_then(parse_date_text)),
    ("updated", |e| e.updated.as_deref().and_then(parse_date_text)),
];

/// Formats with an explicit offset, tried after RFC 3339 and RFC 2822.
const OFFSET_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%a, %d %b %Y %H:%M:%S %z",
];

/// Formats without an offset; values are taken as UTC.
const NAIVE_DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
];

const DATE_FORMATS: [&str; 5] = ["%Y-%m-%d", "%d/%m/%Y", "%B %d, %Y", "%b %d, %Y", "%d %B %Y"];

/// Maps one raw entry to an [`Article`], or says why it was skipped.
///
/// Field-level problems never escape: a missing title becomes
/// [`UNTITLED`], a missing or unusable date becomes `fetched_at` (with
/// `published_estimated` set), and only a missing or invalid link drops the
/// entry.
pub fn normalize_entry(
    entry: &RawEntry,
    feed: &FeedDescriptor,
    fetched_at: DateTime<Utc>,
) -> Result<Article, SkipReason> {
    let raw_link = entry
        .link
        .as_deref()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .ok_or(SkipReason::MissingLink)?;
    let url = validate_link(raw_link)
        .map_err(|e| SkipReason::InvalidLink(e.to_string()))?
        .to_string();

    let title = entry
        .title
        .as_deref()
        .map(clean_text)
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string());

    let summary = entry
        .summary
        .as_deref()
        .or(entry.description.as_deref())
        .map(clean_text)
        .filter(|s| !s.is_empty());

    let author = entry
        .author
        .as_deref()
        .map(str::trim)
        .filter(|a| !a.is_empty())
        .map(str::to_string);

    let published_raw = entry
        .published
        .as_deref()
        .or(entry.updated.as_deref())
        .map(str::trim)
        .filter(|d| !d.is_empty())
        .map(str::to_string);

    let (published_at, published_estimated) = match resolve_published(entry) {
        Some(dt) => (dt, false),
        None => (fetched_at, true),
    };

    Ok(Article {
        id: article_id(feed.slug.as_deref(), &url),
        title,
        url,
        summary,
        source_name: feed.display_name.clone(),
        source_feed_url: feed.url.clone(),
        source_type: feed.kind,
        category: feed.category_label().to_string(),
        author,
        published_at,
        published_estimated,
        published_raw,
        fetched_at,
    })
}

/// Derives the article id: SHA-256 over `"{slug}-{url}"` (or the bare URL
/// when the feed has no slug), hex-encoded and cut to 16 characters.
pub fn article_id(slug: Option<&str>, url: &str) -> String {
    let digest = match slug {
        Some(slug) => Sha256::digest(format!("{slug}-{url}").as_bytes()),
        None => Sha256::digest(url.as_bytes()),
    };
    let mut hex = format!("{:x}", digest);
    hex.truncate(ID_LEN);
    hex
}

/// Walks [`DATE_SOURCES`] in order and returns the first usable timestamp.
pub fn resolve_published(entry: &RawEntry) -> Option<DateTime<Utc>> {
    DATE_SOURCES.iter().find_map(|(field, read)| {
        let found = read(entry);
        if found.is_some() {
            tracing::trace!(field = *field, "Resolved entry date");
        }
        found
    })
}

/// Parses a free-text date in any of the formats feeds are known to use.
///
/// Returns `None` rather than failing; callers decide on the fallback.
pub fn parse_date_text(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(text, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(text, format) {
            return Some(naive.and_utc());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(text, format) {
            return date.and_hms_opt(0, 0, 0).map(|naive| naive.and_utc());
        }
    }

    tracing::debug!(date = %text, "Unrecognised date format");
    None
}
