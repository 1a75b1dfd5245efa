use chrono::{DateTime, Utc};
use feed_rs::model::{Entry, Link};
use feed_rs::parser::{self, ParseFeedError};
use std::cell::RefCell;
use std::rc::Rc;

use super::entry::RawEntry;

/// Date text of one entry as it appeared in the feed.
#[derive(Debug, Clone, Default)]
struct DateText {
    published: Option<String>,
    updated: Option<String>,
}

/// Parses an RSS/Atom body into loosely-typed entries.
///
/// Timestamps `feed-rs` recognises arrive as `published_parsed` and
/// `updated_parsed`. The original date text is kept in `published` and
/// `updated` so the normalizer can try its own formats when `feed-rs` gave
/// up.
pub fn parse_feed(bytes: &[u8]) -> Result<Vec<RawEntry>, ParseFeedError> {
    let feed = parser::parse(bytes)?;
    let mut texts = date_texts(bytes).into_iter();

    let entries = feed
        .entries
        .into_iter()
        .map(|entry| raw_entry(entry, texts.next().unwrap_or_default()))
        .collect();
    Ok(entries)
}

/// Recovers each entry's date text, in entry order.
///
/// `feed-rs` drops the text once its own parser has run, so this runs a
/// second parse whose timestamp parser records every string it is handed
/// and returns the string's index as a stand-in timestamp.
fn date_texts(bytes: &[u8]) -> Vec<DateText> {
    let seen: Rc<RefCell<Vec<String>>> = Rc::default();
    let recorder = Rc::clone(&seen);
    let recording = parser::Builder::new()
        .timestamp_parser(move |text| {
            let mut texts = recorder.borrow_mut();
            texts.push(text.trim().to_string());
            DateTime::from_timestamp(texts.len() as i64 - 1, 0)
        })
        .build();

    let Ok(feed) = recording.parse(bytes) else {
        return Vec::new();
    };

    let texts = seen.borrow();
    let lookup = |stamp: Option<DateTime<Utc>>| {
        let index = usize::try_from(stamp?.timestamp()).ok()?;
        texts.get(index).filter(|t| !t.is_empty()).cloned()
    };
    let dates: Vec<DateText> = feed
        .entries
        .iter()
        .map(|entry| DateText {
            published: lookup(entry.published),
            updated: lookup(entry.updated),
        })
        .collect();
    dates
}

fn raw_entry(entry: Entry, dates: DateText) -> RawEntry {
    let link = pick_link(&entry.links).map(|l| l.href.clone());
    let author = entry
        .authors
        .first()
        .map(|p| p.name.trim().to_string())
        .filter(|n| !n.is_empty());

    RawEntry {
        title: entry.title.map(|t| t.content),
        link,
        summary: entry.summary.map(|s| s.content),
        description: entry.content.and_then(|c| c.body),
        published: dates.published,
        published_parsed: entry.published,
        updated: dates.updated,
        updated_parsed: entry.updated,
        author,
    }
}

/// Prefers the entry's alternate (article) link over enclosures, comments
/// and other relations.
fn pick_link(links: &[Link]) -> Option<&Link> {
    links
        .iter()
        .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
        .or_else(|| links.first())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    const RSS: &str = r#"<?xml version="1.0"?>
<rss version="2.0"><channel>
    <title>Trade Press</title>
    <item>
        <title>Burger chain signs 40-unit deal</title>
        <link>https://press.example.com/burger-deal</link>
        <description>&lt;p&gt;Expansion in the &lt;b&gt;Midwest&lt;/b&gt;&lt;/p&gt;</description>
        <pubDate>Mon, 03 Jun 2024 14:30:00 GMT</pubDate>
        <author>desk@press.example.com (News Desk)</author>
    </item>
    <item>
        <title>No link here</title>
    </item>
</channel></rss>"#;

    const ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
    <title>Atom Source</title>
    <id>urn:feed</id>
    <updated>2024-05-01T00:00:00Z</updated>
    <entry>
        <title>Fitness brand IPO</title>
        <id>urn:entry:1</id>
        <link rel="replies" href="https://atom.example.com/fitness#comments"/>
        <link rel="alternate" href="https://atom.example.com/fitness"/>
        <updated>2024-05-02T08:00:00Z</updated>
        <summary>Gym franchisor files to go public.</summary>
    </entry>
</feed>"#;

    #[test]
    fn test_parse_rss_entries() {
        let entries = parse_feed(RSS.as_bytes()).unwrap();
        assert_eq!(entries.len(), 2);

        let first = &entries[0];
        assert_eq!(first.title.as_deref(), Some("Burger chain signs 40-unit deal"));
        assert_eq!(
            first.link.as_deref(),
            Some("https://press.example.com/burger-deal")
        );
        assert_eq!(
            first.published_parsed,
            Some(Utc.with_ymd_and_hms(2024, 6, 3, 14, 30, 0).unwrap())
        );
        assert!(first.summary.as_deref().unwrap().contains("Midwest"));

        assert!(entries[1].link.is_none());
    }

    #[test]
    fn test_parse_atom_prefers_alternate_link() {
        let entries = parse_feed(ATOM.as_bytes()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].link.as_deref(),
            Some("https://atom.example.com/fitness")
        );
        assert_eq!(
            entries[0].updated_parsed,
            Some(Utc.with_ymd_and_hms(2024, 5, 2, 8, 0, 0).unwrap())
        );
    }

    fn rss_with_pub_date(date: &str) -> String {
        format!(
            r#"<?xml version="1.0"?><rss version="2.0"><channel><title>T</title>
<item><title>Story</title><link>https://press.example.com/story</link><pubDate>{date}</pubDate></item>
<item><title>Undated</title><link>https://press.example.com/undated</link></item>
</channel></rss>"#
        )
    }

    #[test]
    fn test_unrecognised_pub_date_text_is_kept() {
        let cases = [
            ("June 3, 2024", Utc.with_ymd_and_hms(2024, 6, 3, 0, 0, 0).unwrap()),
            (
                "2024-06-03 14:30:00",
                Utc.with_ymd_and_hms(2024, 6, 3, 14, 30, 0).unwrap(),
            ),
            ("03/06/2024", Utc.with_ymd_and_hms(2024, 6, 3, 0, 0, 0).unwrap()),
        ];

        for (text, expected) in cases {
            let entries = parse_feed(rss_with_pub_date(text).as_bytes()).unwrap();
            assert_eq!(entries.len(), 2);
            assert_eq!(entries[0].published_parsed, None, "{text}");
            assert_eq!(entries[0].published.as_deref(), Some(text));
            assert_eq!(
                crate::news::resolve_published(&entries[0]),
                Some(expected),
                "{text}"
            );

            assert_eq!(entries[1].published, None);
            assert_eq!(entries[1].updated, None);
        }
    }

    #[test]
    fn test_recognised_pub_date_keeps_text_and_value() {
        let entries =
            parse_feed(rss_with_pub_date("Mon, 03 Jun 2024 14:30:00 GMT").as_bytes()).unwrap();
        assert_eq!(
            entries[0].published_parsed,
            Some(Utc.with_ymd_and_hms(2024, 6, 3, 14, 30, 0).unwrap())
        );
        assert_eq!(
            entries[0].published.as_deref(),
            Some("Mon, 03 Jun 2024 14:30:00 GMT")
        );
    }

    #[test]
    fn test_parse_garbage_fails() {
        assert!(parse_feed(b"<not valid xml").is_err());
    }
}
