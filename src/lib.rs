//! Franchise-industry news and stock data snapshots for a static site.
//!
//! Three jobs share one configuration and one HTTP client:
//!
//! - **news**: syndication feeds → normalized, deduplicated, recent, ranked
//!   articles → JSON array
//! - **quotes**: Finnhub live quotes → JSON object keyed by symbol
//! - **history**: Yahoo daily bars → merged into a CSV price store

pub mod config;
pub mod feed;
pub mod http;
pub mod market;
pub mod news;
pub mod sink;
pub mod util;
