//! Novel detail page (`articleinfo.php`).
//!
//! The page is two layout tables: the first holds the title and the
//! label/value header row, the second the badge column and the text
//! column. Withdrawn novels replace the popularity line with a notice
//! containing a line break and drop the latest-chapter block, which moves
//! the intro from the sixth span to the fourth.

use crate::error::ClientError;
use crate::extract::{Select, extract_labeled, extract_text, split_tags, strip_label};
use crate::models::{Availability, NovelInfo, NovelStats};
use scraper::{Html, Selector};
use std::sync::LazyLock;

const HEADER: &str = "#content > div:nth-of-type(1) > table:nth-of-type(1) > tbody";
const BODY: &str = "#content > div:nth-of-type(1) > table:nth-of-type(2) > tbody > tr";

/// CSS selectors used for parsing.
struct Selectors {
    title: Selector,
    press: Selector,
    author: Selector,
    status: Selector,
    last_updated: Selector,
    word_count: Selector,
    /// Anime badge in the left column.
    animation: Selector,
    tags: Selector,
    /// "热度：X级，趋势：Y级" line.
    popularity: Selector,
    /// Line break inside the popularity line, only present when withdrawn.
    takedown_marker: Selector,
    latest_section: Selector,
    intro: Selector,
    intro_withdrawn: Selector,
}

impl Selectors {
    fn new() -> Self {
        let header = |row: u32, cell: u32| {
            Selector::parse(&format!(
                "{HEADER} > tr:nth-of-type({row}) > td:nth-of-type({cell})"
            ))
            .unwrap()
        };
        let text_span = |n: u32, rest: &str| {
            Selector::parse(&format!(
                "{BODY} > td:nth-of-type(2) > span:nth-of-type({n}){rest}"
            ))
            .unwrap()
        };

        Self {
            title: Selector::parse(&format!(
                "{HEADER} > tr:nth-of-type(1) > td table td:nth-of-type(1) > span > b"
            ))
            .unwrap(),
            press: header(2, 1),
            author: header(2, 2),
            status: header(2, 3),
            last_updated: header(2, 4),
            word_count: header(2, 5),
            animation: Selector::parse(&format!("{BODY} > td:nth-of-type(1) > span > b")).unwrap(),
            tags: text_span(1, " > b"),
            popularity: text_span(2, " > b"),
            takedown_marker: text_span(2, " > b > br"),
            latest_section: text_span(4, " > a"),
            intro: text_span(6, ""),
            intro_withdrawn: text_span(4, ""),
        }
    }
}

static SELECTORS: LazyLock<Selectors> = LazyLock::new(Selectors::new);

/// Decodes a novel detail page.
pub fn parse_novel_info(doc: &Html, aid: u32) -> Result<NovelInfo, ClientError> {
    let sel = &*SELECTORS;
    let withdrawn = doc.count(&sel.takedown_marker) > 0;

    let (availability, intro) = if withdrawn {
        (Availability::Withdrawn, joined_text(doc, &sel.intro_withdrawn))
    } else {
        let stats = parse_stats(doc, sel)?;
        (Availability::Active(stats), joined_text(doc, &sel.intro))
    };

    Ok(NovelInfo {
        aid,
        title: extract_text(doc, &sel.title, "novel title")?,
        author: extract_labeled(doc, &sel.author, "author")?,
        status: extract_labeled(doc, &sel.status, "status")?,
        intro,
        tags: split_tags(&extract_labeled(doc, &sel.tags, "tags")?),
        press: extract_labeled(doc, &sel.press, "press")?,
        availability,
        animation: doc.count(&sel.animation) > 0,
    })
}

fn parse_stats(doc: &Html, sel: &Selectors) -> Result<NovelStats, ClientError> {
    let raw_count = extract_labeled(doc, &sel.word_count, "word count")?;
    let word_count = raw_count
        .trim_end_matches('字')
        .trim()
        .parse()
        .map_err(|_| ClientError::invalid("word_count", raw_count.as_str()))?;

    let popularity = extract_text(doc, &sel.popularity, "popularity")?;
    let mut ratings = popularity.split('，');
    let mut rating = |what: &str| {
        ratings
            .next()
            .and_then(strip_label)
            .ok_or_else(|| ClientError::Extraction(format!("{what} in {popularity:?}")))
    };
    let popularity_level = rating("popularity level")?;
    let trending_level = rating("trending level")?;

    Ok(NovelStats {
        last_updated: extract_labeled(doc, &sel.last_updated, "last updated")?,
        word_count,
        popularity_level,
        trending_level,
        latest_section: extract_text(doc, &sel.latest_section, "latest section")?,
    })
}

/// All descendant text of the first match, untrimmed; empty if absent.
fn joined_text(doc: &Html, selector: &Selector) -> String {
    doc.first(selector)
        .map(|elem| elem.text().collect::<String>())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(popularity: &str, spans_after: &str, badge: bool) -> Html {
        let badge = if badge { "<span><b>动画化作品</b></span>" } else { "" };
        Html::parse_document(&format!(
            r#"<html><body><div id="content"><div>
<table>
  <tr><td colspan="5"><table><tr>
    <td><span><b>魔法禁书目录</b></span></td><td>[收藏]</td>
  </tr></table></td></tr>
  <tr>
    <td>文库分类：电击文库</td>
    <td>小说作者：镰池和马</td>
    <td>文章状态：已完结</td>
    <td>最后更新：2011-05-09</td>
    <td>全文长度：3265617字</td>
  </tr>
</table>
<table><tr>
  <td>{badge}</td>
  <td>
    <span><b>作品Tags：科幻 校园 战斗</b></span><br>
    <span><b>{popularity}</b></span><br>
    {spans_after}
  </td>
</tr></table>
</div></div></body></html>"#
        ))
    }

    fn active_page() -> Html {
        page(
            "作品热度：A级，热度上升指数：C级",
            r#"<span>最近章节：</span><span><a href="reader.php?aid=1&cid=2">第22卷 后记</a></span>
<span>内容简介：</span><span>学园都市<br>的故事。</span>"#,
            true,
        )
    }

    #[test]
    fn test_active_novel_has_all_stats() {
        let info = parse_novel_info(&active_page(), 1).unwrap();

        assert_eq!(info.aid, 1);
        assert_eq!(info.title, "魔法禁书目录");
        assert_eq!(info.press, "电击文库");
        assert_eq!(info.author, "镰池和马");
        assert_eq!(info.status, "已完结");
        assert_eq!(info.tags, vec!["科幻", "校园", "战斗"]);
        assert!(info.copyright());
        assert!(info.animation);

        let stats = info.availability.details().unwrap();
        assert_eq!(stats.last_updated, "2011-05-09");
        assert_eq!(stats.word_count, 3265617);
        assert_eq!(stats.popularity_level, "A级");
        assert_eq!(stats.trending_level, "C级");
        assert_eq!(stats.latest_section, "第22卷 后记");
        assert_eq!(info.intro, "学园都市的故事。");
    }

    #[test]
    fn test_withdrawn_novel_omits_stats() {
        let doc = page(
            "因版权问题，本书已下架<br>请支持正版",
            r#"<span>内容简介：</span><span>被下架的简介</span>"#,
            false,
        );
        let info = parse_novel_info(&doc, 2).unwrap();

        assert!(!info.copyright());
        assert_eq!(info.availability, Availability::Withdrawn);
        assert_eq!(info.last_updated(), None);
        assert_eq!(info.word_count(), None);
        assert_eq!(info.latest_section(), None);
        assert_eq!(info.intro, "被下架的简介");
        assert!(!info.animation);
        assert_eq!(info.author, "镰池和马");
    }

    #[test]
    fn test_traditional_separator() {
        let doc = Html::parse_document(
            &active_page()
                .root_element()
                .html()
                .replace("小说作者：", "小說作者︰"),
        );
        let info = parse_novel_info(&doc, 1).unwrap();
        assert_eq!(info.author, "镰池和马");
    }

    #[test]
    fn test_bad_word_count_is_invalid_value() {
        let doc = Html::parse_document(
            &active_page()
                .root_element()
                .html()
                .replace("3265617字", "很多字"),
        );
        let err = parse_novel_info(&doc, 1).unwrap_err();
        assert!(matches!(err, ClientError::InvalidValue { field: "word_count", .. }));
    }

    #[test]
    fn test_unknown_layout_fails() {
        let doc = Html::parse_document("<html><body><p>维护中</p></body></html>");
        assert!(matches!(
            parse_novel_info(&doc, 1),
            Err(ClientError::Extraction(_))
        ));
    }
}
