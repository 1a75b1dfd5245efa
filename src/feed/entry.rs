use chrono::{DateTime, Utc};

/// One item from a parsed feed, before normalization.
///
/// Every field may be missing. Free-text dates are kept next to their
/// structured counterparts so the normalizer can fall back from one to the
/// other in a fixed order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    pub published: Option<String>,
    pub published_parsed: Option<DateTime<Utc>>,
    pub updated: Option<String>,
    pub updated_parsed: Option<DateTime<Utc>>,
    pub author: Option<String>,
}
