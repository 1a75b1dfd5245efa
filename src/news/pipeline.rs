use chrono::{DateTime, Utc};

use super::dedup::dedup_by_url;
use super::normalize::{article_id, normalize_entry};
use super::rank::rank_and_limit;
use super::recency::filter_recent;
use super::types::Article;
use crate::config::Config;
use crate::feed::{fetch_all, FeedDescriptor, FeedOutcome, SourceKind, DEFAULT_CATEGORY};

/// Title of the sentinel article written when a run produces nothing.
pub const PLACEHOLDER_TITLE: &str = "No news available";

const FALLBACK_SITE: &str = "https://www.franchisetimes.com/";
const FALLBACK_SOURCE: &str = "Franchise Times";

/// Output bounds for one snapshot.
#[derive(Debug, Clone, Copy)]
pub struct NewsLimits {
    pub max_age_days: i64,
    pub max_total: usize,
}

/// Counters collected while building a snapshot, logged at the end of a run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub feeds_ok: usize,
    pub feeds_failed: usize,
    pub entries_seen: usize,
    pub entries_skipped: usize,
    pub normalized: usize,
    pub after_dedup: usize,
    pub after_recency: usize,
    pub published: usize,
}

/// Everything a news run produced.
#[derive(Debug)]
pub struct NewsRun {
    /// Final list, sorted newest first and bounded
    pub articles: Vec<Article>,
    pub stats: RunStats,
    /// True when `articles` holds only the sentinel record
    pub placeholder: bool,
}

/// Fetches every configured feed and builds the snapshot.
///
/// Individual feed and entry failures are counted, logged and skipped. When
/// nothing survives, the snapshot is a single placeholder article so the
/// site shows an explicit "no news" notice instead of an empty widget.
pub async fn run(config: &Config, client: &reqwest::Client) -> NewsRun {
    let fetched_at = Utc::now();
    let outcomes = fetch_all(client, &config.feeds, config.fetch_settings()).await;

    let mut stats = RunStats::default();
    let articles = normalize_outcomes(&outcomes, fetched_at, &mut stats);
    let articles = assemble(articles, config.news_limits(), Utc::now(), &mut stats);

    if articles.is_empty() {
        if stats.feeds_ok == 0 {
            tracing::warn!(
                feeds = stats.feeds_failed,
                "Every feed failed, writing placeholder snapshot"
            );
        } else {
            tracing::warn!("No recent articles found, writing placeholder snapshot");
        }
        return NewsRun {
            articles: vec![placeholder_article(&config.feeds, fetched_at)],
            stats,
            placeholder: true,
        };
    }

    NewsRun {
        articles,
        stats,
        placeholder: false,
    }
}

/// Normalizes every entry of every successful feed, in feed order.
pub fn normalize_outcomes(
    outcomes: &[FeedOutcome<'_>],
    fetched_at: DateTime<Utc>,
    stats: &mut RunStats,
) -> Vec<Article> {
    let mut articles = Vec::new();

    for outcome in outcomes {
        let entries = match &outcome.result {
            Ok(entries) => entries,
            Err(_) => {
                stats.feeds_failed += 1;
                continue;
            }
        };
        stats.feeds_ok += 1;

        for (index, entry) in entries.iter().enumerate() {
            stats.entries_seen += 1;
            match normalize_entry(entry, outcome.feed, fetched_at) {
                Ok(article) => articles.push(article),
                Err(reason) => {
                    stats.entries_skipped += 1;
                    tracing::debug!(
                        feed = %outcome.feed.display_name,
                        entry = index,
                        reason = %reason,
                        "Skipping entry"
                    );
                }
            }
        }
    }

    stats.normalized = articles.len();
    articles
}

/// Deduplicates, filters by age, then sorts and truncates.
pub fn assemble(
    articles: Vec<Article>,
    limits: NewsLimits,
    now: DateTime<Utc>,
    stats: &mut RunStats,
) -> Vec<Article> {
    let unique = dedup_by_url(articles);
    stats.after_dedup = unique.len();

    let recent = filter_recent(unique, limits.max_age_days, now);
    stats.after_recency = recent.len();

    let ranked = rank_and_limit(recent, limits.max_total);
    stats.published = ranked.len();

    tracing::info!(
        normalized = stats.normalized,
        after_dedup = stats.after_dedup,
        after_recency = stats.after_recency,
        published = stats.published,
        max_age_days = limits.max_age_days,
        "Assembled news snapshot"
    );
    ranked
}

/// Sentinel article pointing at the first registered publication.
pub fn placeholder_article(feeds: &[FeedDescriptor], now: DateTime<Utc>) -> Article {
    let first = feeds.first();
    let url = first
        .and_then(FeedDescriptor::site_root)
        .unwrap_or_else(|| FALLBACK_SITE.to_string());
    let source_name = first
        .map(|f| f.display_name.clone())
        .unwrap_or_else(|| FALLBACK_SOURCE.to_string());

    Article {
        id: article_id(None, &url),
        title: PLACEHOLDER_TITLE.to_string(),
        source_feed_url: first.map(|f| f.url.clone()).unwrap_or_else(|| url.clone()),
        url,
        summary: None,
        source_name,
        source_type: SourceKind::Rss,
        category: DEFAULT_CATEGORY.to_string(),
        author: None,
        published_at: now,
        published_estimated: true,
        published_raw: None,
        fetched_at: now,
    }
}
