//! Search result and toplist pages.
//!
//! Both pages render the same grid of novel cards. Each card has a cover
//! column and an info column; the info column's second paragraph holds
//! "更新:date/字数:size/status[/动画]" for active novels and only
//! "status[/动画]" for withdrawn ones.

use crate::error::ClientError;
use crate::extract::{Select, after_ascii_colon, extract_text, htm_number, split_tags, text_of};
use crate::models::{Availability, ListingStats, PageControl, SearchItem, SearchResult};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

struct Selectors {
    /// Cell holding the card grid; cards are its child elements.
    grid: Selector,
    title_link: Selector,
    /// "作者:x/分类:y"
    byline: Selector,
    /// "更新:date/字数:size/status"
    details: Selector,
    tags: Selector,
    intro: Selector,
    /// Marker row shown for withdrawn novels; the class must be exactly `hottext`.
    highlight: Selector,
    page_stats: Selector,
}

impl Selectors {
    fn new() -> Self {
        let info = "div:nth-of-type(2)";
        Self {
            grid: Selector::parse("#content > table > tbody > tr > td").unwrap(),
            title_link: Selector::parse(&format!("{info} > b > a[href]")).unwrap(),
            byline: Selector::parse(&format!("{info} > p:nth-of-type(1)")).unwrap(),
            details: Selector::parse(&format!("{info} > p:nth-of-type(2)")).unwrap(),
            tags: Selector::parse(&format!("{info} > p:nth-of-type(3) > span")).unwrap(),
            intro: Selector::parse(&format!("{info} > p:nth-of-type(4)")).unwrap(),
            highlight: Selector::parse(&format!(r#"{info} > [class="hottext"]:nth-child(6)"#))
                .unwrap(),
            page_stats: Selector::parse("#pagestats").unwrap(),
        }
    }
}

static SELECTORS: LazyLock<Selectors> = LazyLock::new(Selectors::new);

/// Decodes a search result or toplist page.
pub fn parse_listing(doc: &Html) -> Result<SearchResult, ClientError> {
    let sel = &*SELECTORS;
    let grid = doc
        .first(&sel.grid)
        .ok_or_else(|| ClientError::Extraction("result grid".to_string()))?;

    let results = grid
        .children()
        .filter_map(ElementRef::wrap)
        .map(|card| parse_card(card, sel))
        .collect::<Result<Vec<_>, _>>()?;

    let page_control = extract_text(doc, &sel.page_stats, "page stats")?.parse::<PageControl>()?;
    tracing::debug!(items = results.len(), "decoded listing page");

    Ok(SearchResult {
        results,
        page_control,
    })
}

fn parse_card(card: ElementRef<'_>, sel: &Selectors) -> Result<SearchItem, ClientError> {
    let link = card
        .first(&sel.title_link)
        .ok_or_else(|| ClientError::Extraction("result title".to_string()))?;
    let aid = htm_number(link.value().attr("href").unwrap_or_default())?;

    let details = extract_text(card, &sel.details, "result details")?;
    let (availability, status, animation) = parse_details(&details)?;

    let byline = extract_text(card, &sel.byline, "result byline")?;
    let (author, press) = parse_byline(&byline)?;

    let intro = extract_text(card, &sel.intro, "result intro")?;
    let intro_preview = intro
        .split_once(':')
        .map(|(_, rest)| rest.to_string())
        .ok_or_else(|| ClientError::invalid("intro_preview", intro.as_str()))?;

    Ok(SearchItem {
        aid,
        title: text_of(link),
        author,
        press,
        availability,
        status,
        tags: split_tags(&extract_text(card, &sel.tags, "result tags")?),
        intro_preview,
        copyright: card.count(&sel.highlight) == 0,
        animation,
    })
}

/// Splits the slash-separated details line.
///
/// Fewer than three segments means the novel is withdrawn and only status
/// (plus an optional anime flag) remains.
fn parse_details(
    text: &str,
) -> Result<(Availability<ListingStats>, String, bool), ClientError> {
    let parts: Vec<&str> = text.split('/').map(str::trim).collect();

    if parts.len() < 3 {
        return Ok((Availability::Withdrawn, parts[0].to_string(), parts.len() == 2));
    }

    let stats = ListingStats {
        last_updated: after_ascii_colon(parts[0], "last_updated")?.to_string(),
        word_count: after_ascii_colon(parts[1], "word_count")?.to_string(),
    };
    Ok((Availability::Active(stats), parts[2].to_string(), parts.len() == 4))
}

/// Splits the byline into author and press.
///
/// Simplified pages separate the two with "/", while traditional pages lose
/// that character to an encoding defect and leave a double space instead.
fn parse_byline(text: &str) -> Result<(String, String), ClientError> {
    let (author, press) = text
        .split_once('/')
        .or_else(|| text.split_once("  "))
        .ok_or_else(|| ClientError::invalid("byline", text))?;

    Ok((
        after_ascii_colon(author, "author")?.to_string(),
        after_ascii_colon(press, "press")?.to_string(),
    ))
}
