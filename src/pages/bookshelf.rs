//! Bookshelf page (`bookcase.php`).

use crate::error::ClientError;
use crate::extract::{Select, extract_text, query_number, text_of};
use crate::models::{Bookmark, BookshelfItem};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

/// Marker shown before titles updated since they were last read.
const UPDATED_MARKER: &str = "新";

/// Finished novels carry a bracketed marker such as "[完]".
const FINISHED_PREFIX: char = '[';

struct Selectors {
    rows: Selector,
    title_cell: Selector,
    author: Selector,
    latest_section: Selector,
    bookmark: Selector,
    last_updated: Selector,
}

impl Selectors {
    fn new() -> Self {
        let cell = |n: u32, rest: &str| {
            Selector::parse(&format!("td:nth-of-type({n}){rest}")).unwrap()
        };
        Self {
            rows: Selector::parse("#checkform > table:nth-of-type(1) > tbody > tr").unwrap(),
            title_cell: cell(2, ""),
            author: cell(3, " > a"),
            latest_section: cell(4, " > a[href]"),
            bookmark: cell(5, " > a"),
            last_updated: cell(6, ""),
        }
    }
}

static SELECTORS: LazyLock<Selectors> = LazyLock::new(Selectors::new);

/// Decodes the bookshelf listing.
///
/// Header and footer rows are centered; spacer rows have a single cell.
/// Both are skipped.
pub fn parse_bookshelf(doc: &Html) -> Result<Vec<BookshelfItem>, ClientError> {
    let sel = &*SELECTORS;
    let mut items = Vec::new();

    for row in doc.select(&sel.rows) {
        if row.value().attr("align") == Some("center") {
            continue;
        }
        if row.children().filter_map(ElementRef::wrap).count() <= 1 {
            continue;
        }
        items.push(parse_row(row, sel)?);
    }

    tracing::debug!(items = items.len(), "decoded bookshelf");
    Ok(items)
}

fn parse_row(row: ElementRef<'_>, sel: &Selectors) -> Result<BookshelfItem, ClientError> {
    let title_cell = row
        .first(&sel.title_cell)
        .ok_or_else(|| ClientError::Extraction("bookshelf title cell".to_string()))?;
    let title = TitleCell::parse(title_cell)?;
    let href = title.link.value().attr("href").unwrap_or_default();

    let latest = row
        .first(&sel.latest_section)
        .ok_or_else(|| ClientError::Extraction("bookshelf latest section".to_string()))?;

    let bookmark = match row.first(&sel.bookmark) {
        Some(link) if !text_of(link).is_empty() => Bookmark::Bookmarked {
            title: text_of(link),
            cid: query_number(link.value().attr("href").unwrap_or_default(), "cid")?,
        },
        _ => Bookmark::Unbookmarked,
    };

    Ok(BookshelfItem {
        aid: query_number(href, "aid")?,
        bid: query_number(href, "bid")?,
        title: text_of(title.link),
        author: extract_text(row, &sel.author, "bookshelf author")?,
        latest_section: text_of(latest),
        latest_section_cid: query_number(latest.value().attr("href").unwrap_or_default(), "cid")?,
        bookmark,
        last_updated: extract_text(row, &sel.last_updated, "bookshelf last updated")?,
        finished: title.finished,
        updated_after_last_reading: title.updated,
    })
}

/// Title cell: optional status markers followed by the title link.
struct TitleCell<'a> {
    link: ElementRef<'a>,
    finished: bool,
    updated: bool,
}

impl<'a> TitleCell<'a> {
    fn parse(cell: ElementRef<'a>) -> Result<Self, ClientError> {
        let mut finished = false;
        let mut updated = false;

        for child in cell.children().filter_map(ElementRef::wrap) {
            if child.value().attr("href").is_some() {
                return Ok(Self {
                    link: child,
                    finished,
                    updated,
                });
            }
            let marker = text_of(child);
            if marker == UPDATED_MARKER {
                updated = true;
            } else if marker.starts_with(FINISHED_PREFIX) {
                finished = true;
            }
        }

        Err(ClientError::Extraction("bookshelf title link".to_string()))
    }
}
