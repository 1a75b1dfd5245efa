use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::feed::SourceKind;

/// Canonical article record written to the news snapshot.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub id: String,
    pub title: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    pub source_name: String,
    pub source_feed_url: String,
    pub source_type: SourceKind,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub published_at: DateTime<Utc>,
    /// Set when the feed gave no usable date and `published_at` is the fetch time
    #[serde(default)]
    pub published_estimated: bool,
    /// Date text exactly as the feed wrote it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_raw: Option<String>,
    pub fetched_at: DateTime<Utc>,
}

/// Why an entry produced no article.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("entry has no link")]
    MissingLink,
    #[error("entry link rejected: {0}")]
    InvalidLink(String),
}
