use super::types::Article;

/// Sorts newest first and keeps at most `max_total` articles.
///
/// The sort is stable, so articles with equal `published_at` keep their
/// input order.
pub fn rank_and_limit(mut articles: Vec<Article>, max_total: usize) -> Vec<Article> {
    articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    articles.truncate(max_total);
    articles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::news::test_support::article;
    use chrono::{Duration, TimeZone, Utc};
    use proptest::prelude::*;

    #[test]
    fn test_newest_first_and_truncated() {
        let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let input = vec![
            article("http://x/1", base + Duration::days(1)),
            article("http://x/3", base + Duration::days(3)),
            article("http://x/2", base + Duration::days(2)),
        ];
        let urls: Vec<_> = rank_and_limit(input, 2).into_iter().map(|a| a.url).collect();
        assert_eq!(urls, vec!["http://x/3", "http://x/2"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let t = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        let input = vec![
            article("http://x/first", t),
            article("http://x/newer", t + Duration::hours(1)),
            article("http://x/second", t),
        ];
        let urls: Vec<_> = rank_and_limit(input, 10).into_iter().map(|a| a.url).collect();
        assert_eq!(
            urls,
            vec!["http://x/newer", "http://x/first", "http://x/second"]
        );
    }

    proptest! {
        #[test]
        fn prop_sorted_and_bounded(
            offsets in proptest::collection::vec(0i64..10_000, 0..60),
            max_total in 0usize..50,
        ) {
            let base = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
            let input: Vec<Article> = offsets
                .iter()
                .enumerate()
                .map(|(i, m)| article(&format!("http://x/{i}"), base + Duration::minutes(*m)))
                .collect();
            let expected_len = input.len().min(max_total);

            let output = rank_and_limit(input, max_total);
            prop_assert_eq!(output.len(), expected_len);
            for pair in output.windows(2) {
                prop_assert!(pair[0].published_at >= pair[1].published_at);
            }
        }
    }
}
