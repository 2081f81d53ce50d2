//! Chapter text page (`reader.php?aid=&cid=`).

use crate::error::ClientError;
use crate::extract::Select;
use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

/// Marker wrapped around each illustration URL in chapter text.
pub const IMAGE_SENTINEL: &str = "<!--image-->";

struct Selectors {
    content: Selector,
    image_link: Selector,
}

impl Selectors {
    fn new() -> Self {
        Self {
            content: Selector::parse("#content").unwrap(),
            image_link: Selector::parse("a[href]").unwrap(),
        }
    }
}

static SELECTORS: LazyLock<Selectors> = LazyLock::new(Selectors::new);

/// Decodes a chapter page into text with inline image markers.
///
/// Walks the direct children of the content container. Each `div` child is
/// an illustration holder and becomes `<!--image-->URL<!--image-->`; text
/// following any child element is kept verbatim. Text ahead of the first
/// child element is the container's own padding and is not part of the
/// chapter.
pub fn parse_chapter_content(doc: &Html) -> Result<String, ClientError> {
    let sel = &*SELECTORS;
    let content = doc
        .first(&sel.content)
        .ok_or_else(|| ClientError::Extraction("chapter content".to_string()))?;

    let mut out = String::new();
    let mut seen_child = false;

    for node in content.children() {
        match node.value() {
            Node::Text(text) if seen_child => out.push_str(text),
            Node::Text(_) => {}
            Node::Element(elem) => {
                seen_child = true;
                if elem.name() == "div" {
                    let holder = ElementRef::wrap(node)
                        .and_then(|holder| holder.first(&sel.image_link))
                        .ok_or_else(|| ClientError::Extraction("illustration link".to_string()))?;
                    let href = holder.value().attr("href").unwrap_or_default();
                    out.push_str(IMAGE_SENTINEL);
                    out.push_str(href);
                    out.push_str(IMAGE_SENTINEL);
                }
            }
            Node::Comment(_) => seen_child = true,
            _ => {}
        }
    }

    Ok(out)
}

/// Splits decoded chapter text into prose and image URLs, in order.
pub fn image_urls(content: &str) -> Vec<&str> {
    content
        .split(IMAGE_SENTINEL)
        .skip(1)
        .step_by(2)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_and_images_interleave_in_order() {
        let doc = Html::parse_document(
            r#"<html><body><div id="content">
<ul id="contentdp">广告</ul>第一段<br>第二段
<div class="divimage"><a href="https://pic.wenku8.com/1.jpg" target="_blank"><img src="https://pic.wenku8.com/1.jpg"></a></div>第三段<br>
<div class="divimage"><a href="https://pic.wenku8.com/2.jpg"><img src="x"></a></div>
</div></body></html>"#,
        );
        let text = parse_chapter_content(&doc).unwrap();

        assert_eq!(
            text,
            "第一段第二段\n<!--image-->https://pic.wenku8.com/1.jpg<!--image-->第三段\n<!--image-->https://pic.wenku8.com/2.jpg<!--image-->\n"
        );
        assert_eq!(
            image_urls(&text),
            vec!["https://pic.wenku8.com/1.jpg", "https://pic.wenku8.com/2.jpg"]
        );
    }

    #[test]
    fn test_plain_text_has_no_sentinels() {
        let doc = Html::parse_document(
            r#"<div id="content"><br>line one<br>line two</div>"#,
        );
        let text = parse_chapter_content(&doc).unwrap();
        assert_eq!(text, "line oneline two");
        assert!(!text.contains(IMAGE_SENTINEL));
        assert!(image_urls(&text).is_empty());
    }

    #[test]
    fn test_missing_container() {
        let doc = Html::parse_document("<p>nothing</p>");
        assert!(matches!(
            parse_chapter_content(&doc),
            Err(ClientError::Extraction(_))
        ));
    }
}
