//! Article normalization and snapshot assembly.
//!
//! Raw feed entries flow through four stages:
//!
//! 1. [`normalize_entry`] - one [`RawEntry`](crate::feed::RawEntry) to one [`Article`] (or a skip)
//! 2. [`dedup_by_url`] - first occurrence of each URL wins
//! 3. [`filter_recent`] - drop anything older than the recency threshold
//! 4. [`rank_and_limit`] - newest first, bounded length
//!
//! [`pipeline::run`] wires these to the feed fetcher.

mod dedup;
mod normalize;
pub mod pipeline;
mod rank;
mod recency;
mod types;

pub use dedup::dedup_by_url;
pub use normalize::{article_id, normalize_entry, parse_date_text, resolve_published, UNTITLED};
pub use pipeline::{NewsLimits, NewsRun, RunStats};
pub use rank::rank_and_limit;
pub use recency::{filter_recent, is_recent};
pub use types::{Article, SkipReason};
