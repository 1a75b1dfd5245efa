use std::collections::HashSet;

use super::types::Article;

/// Keeps the first article seen for each URL, preserving input order.
///
/// Identity is the exact URL string; dates, titles and sources are ignored.
pub fn dedup_by_url(articles: Vec<Article>) -> Vec<Article> {
    let mut seen: HashSet<String> = HashSet::with_capacity(articles.len());
    articles
        .into_iter()
        .filter(|a| seen.insert(a.url.clone()))
        .collect()
}
