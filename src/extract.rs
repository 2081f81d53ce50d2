//! Field lookup helpers shared by the page decoders.

use crate::error::ClientError;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

/// Full-width colon used by simplified pages.
const COLON: char = '：';

/// Presentation-form colon emitted by some traditional pages.
const COLON_VERTICAL: char = '︰';

/// Anything that can be searched with a CSS selector.
///
/// Matches borrow from the document (`'t`), not from the receiver, so a
/// node found under a temporary `ElementRef` can outlive it.
pub(crate) trait Select<'t>: Copy {
    fn first(self, selector: &Selector) -> Option<ElementRef<'t>>;
    fn count(self, selector: &Selector) -> usize;
}

impl<'t> Select<'t> for &'t Html {
    fn first(self, selector: &Selector) -> Option<ElementRef<'t>> {
        self.select(selector).next()
    }

    fn count(self, selector: &Selector) -> usize {
        self.select(selector).count()
    }
}

impl<'t> Select<'t> for ElementRef<'t> {
    fn first(self, selector: &Selector) -> Option<ElementRef<'t>> {
        self.select(selector).next()
    }

    fn count(self, selector: &Selector) -> usize {
        self.select(selector).count()
    }
}

/// Concatenated, trimmed text of an element and its descendants.
pub(crate) fn text_of(elem: ElementRef<'_>) -> String {
    elem.text().collect::<String>().trim().to_string()
}

/// Returns the text of the first node matching `selector`.
///
/// `what` names the field for the error message. Fails if nothing matches
/// or the match has no text; conditionally absent nodes must be checked with
/// [`Select::count`] first.
pub(crate) fn extract_text<'t>(
    root: impl Select<'t>,
    selector: &Selector,
    what: &str,
) -> Result<String, ClientError> {
    let elem = root
        .first(selector)
        .ok_or_else(|| ClientError::Extraction(what.to_string()))?;
    let text = text_of(elem);
    if text.is_empty() {
        return Err(ClientError::Extraction(format!("{what} (empty)")));
    }
    Ok(text)
}

/// Like [`extract_text`], then drops the "label：" prefix.
pub(crate) fn extract_labeled<'t>(
    root: impl Select<'t>,
    selector: &Selector,
    what: &str,
) -> Result<String, ClientError> {
    let text = extract_text(root, selector, what)?;
    strip_label(&text).ok_or_else(|| ClientError::Extraction(format!("{what} (no label separator)")))
}

/// Splits on "︰" if present, otherwise on "："; returns the second segment.
pub(crate) fn strip_label(text: &str) -> Option<String> {
    let sep = if text.contains(COLON_VERTICAL) {
        COLON_VERTICAL
    } else {
        COLON
    };
    text.split(sep).nth(1).map(|s| s.trim().to_string())
}

/// Returns the text after the first ASCII colon, as used on listing pages.
pub(crate) fn after_ascii_colon<'a>(text: &'a str, field: &'static str) -> Result<&'a str, ClientError> {
    text.split_once(':')
        .map(|(_, value)| value.trim())
        .ok_or_else(|| ClientError::invalid(field, text))
}

/// Reads a numeric query parameter such as `cid=123` from a link.
pub(crate) fn query_number(href: &str, key: &'static str) -> Result<u32, ClientError> {
    static PARAM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[?&;]?(\w+)=(\d+)").unwrap());

    PARAM
        .captures_iter(href)
        .find(|caps| &caps[1] == key)
        .and_then(|caps| caps[2].parse().ok())
        .ok_or_else(|| ClientError::invalid(key, href))
}

/// Reads the novel id from a `.../1234.htm` style link.
pub(crate) fn htm_number(href: &str) -> Result<u32, ClientError> {
    static HTM_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+)\.htm").unwrap());

    HTM_ID
        .captures(href)
        .and_then(|caps| caps[1].parse().ok())
        .ok_or_else(|| ClientError::invalid("aid", href))
}

/// Splits a tag line on spaces, dropping empty entries.
pub(crate) fn split_tags(text: &str) -> Vec<String> {
    text.split([' ', '\u{3000}'])
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}
