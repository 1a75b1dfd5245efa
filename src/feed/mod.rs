//! Feed sources and retrieval.
//!
//! - [`registry`] - the static list of feeds to poll
//! - [`fetcher`] - one sequential, single-attempt GET per feed
//! - [`parser`] - RSS/Atom bodies into loosely-typed [`RawEntry`] records
//!
//! Nothing here decides what an article looks like; that is the job of
//! [`crate::news`].

mod entry;
mod fetcher;
mod parser;
mod registry;

pub use entry::RawEntry;
pub use fetcher::{fetch_all, fetch_one, FeedOutcome, FetchSettings};
pub use parser::parse_feed;
pub use registry::{
    default_feeds, FeedDescriptor, FeedStatus, SourceKind, DEFAULT_CATEGORY, GOOGLE_NEWS_CATEGORY,
};
