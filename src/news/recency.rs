use chrono::{DateTime, Utc};

use super::types::Article;

/// Whether an article is young enough to publish.
///
/// Age is counted in whole days (rounded down); an article exactly
/// `max_age_days` old is kept. Articles with an estimated date and articles
/// dated in the future are kept.
pub fn is_recent(article: &Article, max_age_days: i64, now: DateTime<Utc>) -> bool {
    if article.published_estimated {
        return true;
    }
    let age = now.signed_duration_since(article.published_at);
    age.num_days() <= max_age_days
}

/// Drops articles older than `max_age_days` relative to `now`.
pub fn filter_recent(articles: Vec<Article>, max_age_days: i64, now: DateTime<Utc>) -> Vec<Article> {
    articles
        .into_iter()
        .filter(|a| is_recent(a, max_age_days, now))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::news::test_support::article;
    use chrono::{Duration, TimeZone};
    use proptest::prelude::*;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 10, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_boundary_day_kept() {
        // 30 days and 23 hours old still counts as 30 whole days
        let a = article("http://x/a", now() - Duration::days(30) - Duration::hours(23));
        assert!(is_recent(&a, 30, now()));

        let b = article("http://x/b", now() - Duration::days(31));
        assert!(!is_recent(&b, 30, now()));
    }

    #[test]
    fn test_future_dates_kept() {
        let a = article("http://x/a", now() + Duration::days(2));
        assert!(is_recent(&a, 30, now()));
    }

    #[test]
    fn test_estimated_dates_kept() {
        let mut a = article("http://x/a", now() - Duration::days(400));
        a.published_estimated = true;
        assert!(is_recent(&a, 30, now()));
    }

    #[test]
    fn test_filter_preserves_order() {
        let input = vec![
            article("http://x/old", now() - Duration::days(90)),
            article("http://x/b", now() - Duration::days(3)),
            article("http://x/a", now() - Duration::days(1)),
        ];
        let urls: Vec<_> = filter_recent(input, 30, now())
            .into_iter()
            .map(|a| a.url)
            .collect();
        assert_eq!(urls, vec!["http://x/b", "http://x/a"]);
    }

    proptest! {
        #[test]
        fn prop_filter_idempotent(
            ages in proptest::collection::vec(-5i64..90, 0..30),
            max_age in 0i64..60,
        ) {
            let input: Vec<Article> = ages
                .iter()
                .enumerate()
                .map(|(i, days)| article(&format!("http://x/{i}"), now() - Duration::hours(days * 24 + 7)))
                .collect();

            let once = filter_recent(input, max_age, now());
            let twice = filter_recent(once.clone(), max_age, now());
            prop_assert_eq!(once, twice);
        }
    }
}
