//! Typed records decoded from site pages.
//!
//! Every record is built fresh by a page decoder and handed to the caller
//! by value. Blocks the site omits under some conditions are modelled as
//! explicit variants rather than a spread of optional fields.

use crate::error::ClientError;
use serde::Serialize;
use std::str::FromStr;

/// Whether a novel's detail block is published or withdrawn for copyright.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "details", rename_all = "snake_case")]
pub enum Availability<T> {
    /// Detail block present.
    Active(T),
    /// Copyright takedown; the page omits the detail block.
    Withdrawn,
}

impl<T> Availability<T> {
    /// Returns the detail block if present.
    pub fn details(&self) -> Option<&T> {
        match self {
            Availability::Active(details) => Some(details),
            Availability::Withdrawn => None,
        }
    }

    pub fn is_withdrawn(&self) -> bool {
        matches!(self, Availability::Withdrawn)
    }
}

/// Detail block of a novel page that is only shown when not withdrawn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NovelStats {
    /// Last update date (YYYY-MM-DD).
    pub last_updated: String,
    /// Total length in characters.
    pub word_count: u64,
    /// Current popularity rating, e.g. "E级".
    pub popularity_level: String,
    /// Popularity trend rating, e.g. "B级".
    pub trending_level: String,
    /// Title of the newest chapter.
    pub latest_section: String,
}

/// Novel detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NovelInfo {
    pub aid: u32,
    pub title: String,
    pub author: String,
    pub status: String,
    pub intro: String,
    pub tags: Vec<String>,
    /// Publishing label, e.g. "电击文库".
    pub press: String,
    pub availability: Availability<NovelStats>,
    /// True if the novel has an anime adaptation.
    pub animation: bool,
}

impl NovelInfo {
    /// True unless the novel was withdrawn for copyright.
    pub fn copyright(&self) -> bool {
        !self.availability.is_withdrawn()
    }

    pub fn last_updated(&self) -> Option<&str> {
        self.availability.details().map(|s| s.last_updated.as_str())
    }

    pub fn word_count(&self) -> Option<u64> {
        self.availability.details().map(|s| s.word_count)
    }

    pub fn latest_section(&self) -> Option<&str> {
        self.availability.details().map(|s| s.latest_section.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Chapter {
    pub cid: u32,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Volume {
    pub vid: u32,
    pub title: String,
    pub chapters: Vec<Chapter>,
}

/// Chapter index of a novel, volumes in page order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NovelIndex {
    pub aid: u32,
    pub title: String,
    pub author: String,
    pub volumes: Vec<Volume>,
}

impl NovelIndex {
    /// Total number of chapters across all volumes.
    pub fn chapter_count(&self) -> usize {
        self.volumes.iter().map(|v| v.chapters.len()).sum()
    }
}

/// Detail columns of a listing row, absent for withdrawn novels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingStats {
    pub last_updated: String,
    /// Length as displayed by the listing, e.g. "245K".
    pub word_count: String,
}

/// One row of a search result or toplist page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchItem {
    pub aid: u32,
    pub title: String,
    pub author: String,
    pub press: String,
    pub availability: Availability<ListingStats>,
    pub status: String,
    pub tags: Vec<String>,
    pub intro_preview: String,
    /// False when the row's sixth info child has `class="hottext"`, compared
    /// as the whole attribute value.
    pub copyright: bool,
    pub animation: bool,
}

impl From<NovelInfo> for SearchItem {
    fn from(info: NovelInfo) -> Self {
        let availability = match info.availability {
            Availability::Active(stats) => Availability::Active(ListingStats {
                last_updated: stats.last_updated,
                word_count: stats.word_count.to_string(),
            }),
            Availability::Withdrawn => Availability::Withdrawn,
        };
        let copyright = !availability.is_withdrawn();

        Self {
            aid: info.aid,
            title: info.title,
            author: info.author,
            press: info.press,
            availability,
            status: info.status,
            tags: info.tags,
            intro_preview: info.intro,
            copyright,
            animation: info.animation,
        }
    }
}

/// Pagination cursor.
///
/// `now` lies in `1..=end`. `next` is always `now + 1` and is not clamped
/// to `end`; callers check `has_next` before following it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageControl {
    pub now: u32,
    pub previous: u32,
    pub next: u32,
    pub begin: u32,
    pub end: u32,
}

impl PageControl {
    /// Cursor for a result set that fits on one page.
    pub fn single() -> Self {
        Self {
            now: 1,
            previous: 1,
            next: 1,
            begin: 1,
            end: 1,
        }
    }

    pub fn has_next(&self) -> bool {
        self.now < self.end
    }
}

impl FromStr for PageControl {
    type Err = ClientError;

    /// Parses the "current/total" pagination string.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (now, end) = s
            .trim()
            .split_once('/')
            .ok_or_else(|| ClientError::invalid("page_control", s))?;
        let now: u32 = now
            .trim()
            .parse()
            .map_err(|_| ClientError::invalid("page_control", s))?;
        let end: u32 = end
            .trim()
            .parse()
            .map_err(|_| ClientError::invalid("page_control", s))?;
        if now == 0 || now > end {
            return Err(ClientError::invalid("page_control", s));
        }
        let next = now
            .checked_add(1)
            .ok_or_else(|| ClientError::invalid("page_control", s))?;

        Ok(Self {
            now,
            previous: if now == 1 { 1 } else { now - 1 },
            next,
            begin: 1,
            end,
        })
    }
}

/// A page of search or toplist results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchResult {
    pub results: Vec<SearchItem>,
    pub page_control: PageControl,
}

/// Reading position saved on a bookshelf entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Bookmark {
    Bookmarked { title: String, cid: u32 },
    Unbookmarked,
}

/// One novel on the user's bookshelf.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookshelfItem {
    pub aid: u32,
    /// Bookshelf category the entry belongs to.
    pub bid: u32,
    pub title: String,
    pub author: String,
    pub latest_section: String,
    pub latest_section_cid: u32,
    pub bookmark: Bookmark,
    pub last_updated: String,
    pub finished: bool,
    pub updated_after_last_reading: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_control_first_page() {
        let page: PageControl = "1/12".parse().unwrap();
        assert_eq!(page.now, 1);
        assert_eq!(page.previous, 1);
        assert_eq!(page.next, 2);
        assert_eq!(page.begin, 1);
        assert_eq!(page.end, 12);
        assert!(page.has_next());
    }

    #[test]
    fn test_page_control_middle_and_last_page() {
        let page: PageControl = "5/12".parse().unwrap();
        assert_eq!(page.previous, 4);
        assert_eq!(page.next, 6);

        // next is not clamped on the last page
        let last: PageControl = "12/12".parse().unwrap();
        assert_eq!(last.next, 13);
        assert!(!last.has_next());
    }

    #[test]
    fn test_page_control_rejects_garbage() {
        assert!("".parse::<PageControl>().is_err());
        assert!("3".parse::<PageControl>().is_err());
        assert!("a/3".parse::<PageControl>().is_err());
        assert!("0/3".parse::<PageControl>().is_err());
    }

    #[test]
    fn test_page_control_rejects_out_of_range() {
        assert!(matches!(
            "5/3".parse::<PageControl>(),
            Err(ClientError::InvalidValue { field: "page_control", .. })
        ));
        assert!(matches!(
            "4294967295/4294967295".parse::<PageControl>(),
            Err(ClientError::InvalidValue { field: "page_control", .. })
        ));
        let last: PageControl = "4294967294/4294967295".parse().unwrap();
        assert_eq!(last.next, u32::MAX);
    }

    #[test]
    fn test_search_item_from_withdrawn_info() {
        let info = NovelInfo {
            aid: 1,
            title: "t".into(),
            author: "a".into(),
            status: "s".into(),
            intro: "i".into(),
            tags: vec!["x".into()],
            press: "p".into(),
            availability: Availability::Withdrawn,
            animation: true,
        };
        assert!(!info.copyright());
        assert_eq!(info.word_count(), None);

        let item = SearchItem::from(info);
        assert!(!item.copyright);
        assert!(item.availability.is_withdrawn());
        assert_eq!(item.intro_preview, "i");
        assert!(item.animation);
    }
}
