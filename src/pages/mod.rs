//! Page decoders.
//!
//! Each decoder turns one parsed site page into one typed record. Decoders
//! are pure: they never touch the network or the session, and they fail
//! with [`ClientError::Extraction`](crate::error::ClientError::Extraction)
//! rather than guess when a page does not match the layout they know.

mod bookshelf;
mod chapter;
mod listing;
mod novel_index;
mod novel_info;

pub use bookshelf::parse_bookshelf;
pub use chapter::{IMAGE_SENTINEL, image_urls, parse_chapter_content};
pub use listing::parse_listing;
pub use novel_index::parse_novel_index;
pub use novel_info::parse_novel_info;

use crate::error::ClientError;
use scraper::Html;

/// Parses `text` into a tree and runs `decode` on it.
///
/// The tree never outlives this call, so callers can hold the result across
/// an `.await`.
pub fn decode_page<T>(
    text: &str,
    decode: impl FnOnce(&Html) -> Result<T, ClientError>,
) -> Result<T, ClientError> {
    let doc = Html::parse_document(text);
    decode(&doc)
}
