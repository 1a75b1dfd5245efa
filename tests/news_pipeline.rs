//! End-to-end news runs against mock feeds.
//!
//! Each test starts its own mock server and points a config's feed list at
//! it, then checks the snapshot the pipeline would write.

use chrono::{Duration, Utc};
use franchise_feeds::config::Config;
use franchise_feeds::feed::{FeedDescriptor, SourceKind};
use franchise_feeds::http::build_client;
use franchise_feeds::news::pipeline::{self, PLACEHOLDER_TITLE};
use franchise_feeds::news::Article;
use franchise_feeds::sink::write_json_atomic;
use pretty_assertions::assert_eq;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn rss(items: &[(&str, &str, i64)]) -> String {
    let now = Utc::now();
    let items: String = items
        .iter()
        .map(|(title, link, days_old)| {
            format!(
                "<item><title>{title}</title><link>{link}</link>\
                 <description>&lt;p&gt;About {title}&lt;/p&gt;</description>\
                 <pubDate>{}</pubDate></item>",
                (now - Duration::days(*days_old)).to_rfc2822()
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0"?><rss version="2.0"><channel><title>Mock</title>{items}</channel></rss>"#
    )
}

fn feed(server: &MockServer, route: &str, name: &str) -> FeedDescriptor {
    FeedDescriptor {
        url: format!("{}{route}", server.uri()),
        display_name: name.to_string(),
        category: Some("trade_press".into()),
        status: None,
        kind: SourceKind::Rss,
        slug: Some(name.to_lowercase().replace(' ', "_")),
    }
}

fn config(feeds: Vec<FeedDescriptor>) -> Config {
    Config {
        feeds,
        feed_delay_ms: 0,
        request_timeout_secs: 1,
        ..Config::default()
    }
}

#[tokio::test]
async fn test_timed_out_source_does_not_block_others() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(rss(&[("Slow", "https://a.example.com/slow", 0)]))
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/b"))
        .respond_with(ResponseTemplate::new(200).set_body_string(rss(&[
            ("One", "https://b.example.com/1", 3),
            ("Two", "https://b.example.com/2", 1),
            ("Three", "https://b.example.com/3", 2),
        ])))
        .mount(&server)
        .await;

    let config = config(vec![feed(&server, "/a", "Source A"), feed(&server, "/b", "Source B")]);
    let client = build_client(config.request_timeout()).unwrap();
    let run = pipeline::run(&config, &client).await;

    assert!(!run.placeholder);
    assert_eq!(run.stats.feeds_failed, 1);
    assert_eq!(run.stats.feeds_ok, 1);
    let urls: Vec<_> = run.articles.iter().map(|a| a.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://b.example.com/2",
            "https://b.example.com/3",
            "https://b.example.com/1",
        ]
    );
    assert!(run.articles.iter().all(|a| a.source_name == "Source B"));
    assert_eq!(run.articles[0].summary.as_deref(), Some("About Two"));
}

#[tokio::test]
async fn test_duplicates_and_stale_entries_removed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/first"))
        .respond_with(ResponseTemplate::new(200).set_body_string(rss(&[
            ("Shared", "https://news.example.com/shared", 1),
            ("Old", "https://news.example.com/old", 90),
        ])))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/second"))
        .respond_with(ResponseTemplate::new(200).set_body_string(rss(&[
            ("Shared again", "https://news.example.com/shared", 0),
            ("Local link", "http://localhost/internal", 0),
        ])))
        .mount(&server)
        .await;

    let config = config(vec![
        feed(&server, "/first", "First"),
        feed(&server, "/second", "Second"),
    ]);
    let client = build_client(config.request_timeout()).unwrap();
    let run = pipeline::run(&config, &client).await;

    assert_eq!(run.articles.len(), 1);
    assert_eq!(run.articles[0].title, "Shared");
    assert_eq!(run.articles[0].source_name, "First");
    assert_eq!(run.stats.entries_skipped, 1);
}

#[tokio::test]
async fn test_all_sources_failing_writes_placeholder() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/broken"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/garbage"))
        .respond_with(ResponseTemplate::new(200).set_body_string("definitely not a feed"))
        .mount(&server)
        .await;

    let config = config(vec![
        feed(&server, "/broken", "Broken"),
        feed(&server, "/garbage", "Garbage"),
    ]);
    let client = build_client(config.request_timeout()).unwrap();
    let run = pipeline::run(&config, &client).await;

    assert!(run.placeholder);
    assert_eq!(run.stats.feeds_failed, 2);
    assert_eq!(run.articles.len(), 1);
    assert_eq!(run.articles[0].title, PLACEHOLDER_TITLE);
    assert!(run.articles[0].published_estimated);

    // Snapshot on disk is a one-element array, never an empty file
    let dir = std::env::temp_dir().join("franchise_feeds_placeholder_snapshot");
    std::fs::remove_dir_all(&dir).ok();
    let output = dir.join("news.json");
    write_json_atomic(&output, &run.articles).unwrap();
    let written: Vec<Article> = serde_json::from_slice(&std::fs::read(&output).unwrap()).unwrap();
    assert_eq!(written, run.articles);
    std::fs::remove_dir_all(&dir).ok();
}
