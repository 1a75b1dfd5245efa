use serde::{Deserialize, Serialize};
use url::Url;

/// Category assigned when a descriptor does not name one.
pub const DEFAULT_CATEGORY: &str = "general";

/// Category every Google News entry is filed under, whatever the descriptor says.
pub const GOOGLE_NEWS_CATEGORY: &str = "google_news";

/// What kind of source a feed is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// A trade publication's own RSS/Atom feed
    #[default]
    Rss,
    /// A Google News topic search rendered as RSS
    GoogleNews,
}

/// How sure we are that a feed URL is real.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedStatus {
    Confirmed,
    BestGuess,
}

/// A feed to poll, defined at configuration time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedDescriptor {
    pub url: String,
    #[serde(rename = "name")]
    pub display_name: String,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub status: Option<FeedStatus>,
    #[serde(default)]
    pub kind: SourceKind,
    /// Stable short identifier mixed into article ids when present.
    #[serde(default)]
    pub slug: Option<String>,
}

impl FeedDescriptor {
    fn rss(url: &str, name: &str, category: &str, status: FeedStatus) -> Self {
        Self {
            url: url.to_string(),
            display_name: name.to_string(),
            category: Some(category.to_string()),
            status: Some(status),
            kind: SourceKind::Rss,
            slug: None,
        }
    }

    fn google_news(url: &str, name: &str) -> Self {
        Self {
            url: url.to_string(),
            display_name: name.to_string(),
            category: None,
            status: Some(FeedStatus::Confirmed),
            kind: SourceKind::GoogleNews,
            slug: None,
        }
    }

    /// Category written on every article from this feed.
    pub fn category_label(&self) -> &str {
        match self.kind {
            SourceKind::GoogleNews => GOOGLE_NEWS_CATEGORY,
            SourceKind::Rss => self
                .category
                .as_deref()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or(DEFAULT_CATEGORY),
        }
    }

    /// Scheme and host of the feed URL, e.g. `https://www.franchisetimes.com/`.
    pub fn site_root(&self) -> Option<String> {
        let url = Url::parse(&self.url).ok()?;
        let host = url.host_str()?;
        Some(format!("{}://{}/", url.scheme(), host))
    }
}

/// Built-in feed list: trade press, directories, research, associations,
/// then Google News topic searches.
pub fn default_feeds() -> Vec<FeedDescriptor> {
    use FeedStatus::{BestGuess, Confirmed};

    vec![
        // Trade press
        FeedDescriptor::rss(
            "https://www.franchisetimes.com/feed/",
            "Franchise Times",
            "trade_press",
            BestGuess,
        ),
        FeedDescriptor::rss(
            "https://www.qsrmagazine.com/feed/",
            "QSR Magazine",
            "trade_press",
            BestGuess,
        ),
        FeedDescriptor::rss(
            "https://www.bluemaumau.org/feed",
            "Blue MauMau",
            "trade_press",
            BestGuess,
        ),
        FeedDescriptor::rss(
            "https://franchisingmagazineusa.com/feed",
            "Franchising Magazine USA",
            "trade_press",
            Confirmed,
        ),
        FeedDescriptor::rss(
            "https://1851franchise.com/feed/",
            "1851 Franchise",
            "trade_press",
            BestGuess,
        ),
        FeedDescriptor::rss(
            "https://www.franchisewire.com/feed/",
            "FranchiseWire",
            "trade_press",
            BestGuess,
        ),
        // Portals and directories
        FeedDescriptor::rss(
            "https://www.franchisedirect.com/blog/feed/",
            "Franchise Direct Blog",
            "directory",
            BestGuess,
        ),
        FeedDescriptor::rss(
            "https://www.franchisegator.com/articles/feed/",
            "Franchise Gator",
            "directory",
            BestGuess,
        ),
        FeedDescriptor::rss(
            "https://www.entrepreneur.com/topic/franchises.rss",
            "Entrepreneur",
            "directory",
            BestGuess,
        ),
        FeedDescriptor::rss(
            "https://www.franchising.com/news/rss.xml",
            "Franchising.com",
            "directory",
            BestGuess,
        ),
        // Research and reviews
        FeedDescriptor::rss(
            "https://franchisebusinessreview.com/feed/",
            "Franchise Business Review",
            "research",
            BestGuess,
        ),
        FeedDescriptor::rss(
            "https://www.vettedbiz.com/feed",
            "Vetted Biz",
            "research",
            Confirmed,
        ),
        // Associations
        FeedDescriptor::rss(
            "https://www.franchise.org/blog/rss",
            "IFA FranBlog",
            "association",
            BestGuess,
        ),
        FeedDescriptor::rss(
            "https://www.franchise.org/blog/feed",
            "IFA FranBlog (alt)",
            "association",
            BestGuess,
        ),
        // Google News topic searches
        FeedDescriptor::google_news(
            "https://news.google.com/rss/search?q=franchise+news&hl=en-US&gl=US&ceid=US:en",
            "Google News - Franchise News",
        ),
        FeedDescriptor::google_news(
            "https://news.google.com/rss/search?q=franchising+OR+franchisor&hl=en-US&gl=US&ceid=US:en",
            "Google News - Franchising",
        ),
        FeedDescriptor::google_news(
            "https://news.google.com/rss/search?q=%22private+equity%22+franchise+acquisition&hl=en-US&gl=US&ceid=US:en",
            "Google News - PE & Acquisitions",
        ),
    ]
}
