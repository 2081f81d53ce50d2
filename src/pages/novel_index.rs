//! Chapter index page (`reader.php?aid=`).

use crate::error::ClientError;
use crate::extract::{Select, extract_labeled, extract_text, query_number, text_of};
use crate::models::{Chapter, NovelIndex, Volume};
use scraper::{Html, Selector};
use std::sync::LazyLock;

struct Selectors {
    title: Selector,
    author: Selector,
    /// Volume headers and chapter cells, in document order.
    cells: Selector,
    link: Selector,
}

impl Selectors {
    fn new() -> Self {
        Self {
            title: Selector::parse("#title").unwrap(),
            author: Selector::parse("#info").unwrap(),
            cells: Selector::parse("table.css td.vcss, table.css td.ccss").unwrap(),
            link: Selector::parse("a[href]").unwrap(),
        }
    }
}

static SELECTORS: LazyLock<Selectors> = LazyLock::new(Selectors::new);

/// Decodes a chapter index page.
///
/// Chapters listed before the first volume header are dropped, as are
/// chapter cells without a link (padding cells at the end of a row).
pub fn parse_novel_index(doc: &Html, aid: u32) -> Result<NovelIndex, ClientError> {
    let sel = &*SELECTORS;
    let mut volumes = Vec::new();
    let mut current: Option<Volume> = None;

    for cell in doc.select(&sel.cells) {
        let elem = cell.value();
        if elem.classes().any(|class| class == "vcss") {
            let raw_vid = elem.attr("vid").unwrap_or_default();
            let vid = raw_vid
                .trim()
                .parse()
                .map_err(|_| ClientError::invalid("vid", raw_vid))?;
            if let Some(done) = current.replace(Volume {
                vid,
                title: text_of(cell),
                chapters: Vec::new(),
            }) {
                volumes.push(done);
            }
        } else if let Some(volume) = current.as_mut() {
            let Some(link) = cell.first(&sel.link) else {
                continue;
            };
            let href = link.value().attr("href").unwrap_or_default();
            volume.chapters.push(Chapter {
                cid: query_number(href, "cid")?,
                title: text_of(link),
            });
        }
    }
    volumes.extend(current);

    tracing::debug!(aid, volumes = volumes.len(), "decoded novel index");

    Ok(NovelIndex {
        aid,
        title: extract_text(doc, &sel.title, "index title")?,
        author: extract_labeled(doc, &sel.author, "index author")?,
        volumes,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX: &str = r#"<html><body>
<div id="title">刀剑神域</div>
<div id="info">作者：川原砾</div>
<table class="css">
  <tr><td class="ccss"><a href="reader.php?aid=1&cid=1">孤儿章节</a></td></tr>
  <tr><td class="vcss" colspan="4" vid="100">第一卷 艾恩葛朗特</td></tr>
  <tr>
    <td class="ccss"><a href="reader.php?aid=1&cid=101">序章</a></td>
    <td class="ccss"><a href="https://www.wenku8.net/novel/0/1/102.htm?cid=102">第一章</a></td>
    <td class="ccss">&nbsp;</td>
  </tr>
  <tr><td class="vcss" colspan="4" vid="200">第二卷 仙境</td></tr>
  <tr><td class="ccss"><a href="reader.php?aid=1&cid=201">插图</a></td></tr>
  <tr><td class="other"><a href="reader.php?aid=1&cid=999">无关</a></td></tr>
</table>
</body></html>"#;

    #[test]
    fn test_volumes_in_document_order() {
        let index = parse_novel_index(&Html::parse_document(INDEX), 1).unwrap();

        assert_eq!(index.aid, 1);
        assert_eq!(index.title, "刀剑神域");
        assert_eq!(index.author, "川原砾");
        assert_eq!(index.volumes.len(), 2);

        let first = &index.volumes[0];
        assert_eq!(first.vid, 100);
        assert_eq!(first.title, "第一卷 艾恩葛朗特");
        let cids: Vec<u32> = first.chapters.iter().map(|c| c.cid).collect();
        assert_eq!(cids, vec![101, 102]);
        assert_eq!(first.chapters[0].title, "序章");

        let second = &index.volumes[1];
        assert_eq!(second.vid, 200);
        assert_eq!(second.chapters.len(), 1);
        assert_eq!(second.chapters[0].cid, 201);
        assert_eq!(index.chapter_count(), 3);
    }

    #[test]
    fn test_empty_table() {
        let doc = Html::parse_document(
            r#"<div id="title">t</div><div id="info">作者：a</div><table class="css"></table>"#,
        );
        let index = parse_novel_index(&doc, 9).unwrap();
        assert!(index.volumes.is_empty());
    }

    #[test]
    fn test_bad_volume_id() {
        let doc = Html::parse_document(
            r#"<div id="title">t</div><div id="info">作者：a</div>
<table class="css"><tr><td class="vcss" vid="x">v</td></tr></table>"#,
        );
        assert!(matches!(
            parse_novel_index(&doc, 9),
            Err(ClientError::InvalidValue { field: "vid", .. })
        ));
    }
}
