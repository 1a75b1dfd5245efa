//! Text and link helpers shared by the normalizer.
//!
//! - **Text cleanup**: markup stripping, whitespace collapse, length caps
//! - **Link validation**: only public http(s) links reach the snapshot

mod link;
mod text;

pub use link::{validate_link, LinkError};
pub use text::{clean_text, collapse_whitespace, strip_tags, truncate_chars, TEXT_BUDGET};
