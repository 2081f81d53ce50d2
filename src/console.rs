//! Terminal output for the CLI.
//!
//! Status lines get a colored label; records are printed as short
//! human-readable blocks. Colors follow TTY detection and `NO_COLOR`.

use crate::models::{
    Availability, Bookmark, BookshelfItem, NovelIndex, NovelInfo, SearchItem, SearchResult,
};
use std::io::{self, IsTerminal};

#[derive(Debug, Clone, Copy)]
pub enum Style {
    Bold,
    Dim,
    Red,
    Green,
    Yellow,
    Blue,
    Magenta,
    Cyan,
    Gray,
}

impl Style {
    fn code(self) -> &'static str {
        match self {
            Style::Bold => "1",
            Style::Dim => "2",
            Style::Red => "31",
            Style::Green => "32",
            Style::Yellow => "33",
            Style::Blue => "34",
            Style::Magenta => "35",
            Style::Cyan => "36",
            Style::Gray => "90",
        }
    }
}

const RESET: &str = "\x1b[0m";

/// Console output handler with color support detection.
#[derive(Debug)]
pub struct Console {
    colors_enabled: bool,
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

impl Console {
    /// Colors are off when `NO_COLOR` is set or stdout is not a terminal.
    pub fn new() -> Self {
        let colors_enabled = std::env::var("NO_COLOR").is_err() && io::stdout().is_terminal();
        Self { colors_enabled }
    }

    pub fn with_colors(enabled: bool) -> Self {
        Self {
            colors_enabled: enabled,
        }
    }

    /// Applies ANSI styles to text if colors are enabled.
    pub fn style(&self, text: &str, styles: &[Style]) -> String {
        if !self.colors_enabled || styles.is_empty() {
            return text.to_string();
        }

        let codes: Vec<&str> = styles.iter().map(|s| s.code()).collect();
        format!("\x1b[{}m{}{}", codes.join(";"), text, RESET)
    }

    /// Creates a colored label like `[INFO]`.
    pub fn label(&self, label: &str, color: Style) -> String {
        format!("[{}]", self.style(label, &[color, Style::Bold]))
    }

    pub fn info(&self, message: &str) {
        eprintln!("{} {}", self.label("INFO", Style::Blue), message);
    }

    pub fn success(&self, message: &str) {
        eprintln!("{} {}", self.label("OK", Style::Green), message);
    }

    pub fn warning(&self, message: &str) {
        eprintln!("{} {}", self.label("WARN", Style::Yellow), message);
    }

    pub fn error(&self, message: &str) {
        eprintln!("{} {}", self.label("ERROR", Style::Red), message);
    }

    pub fn muted(&self, text: &str) -> String {
        self.style(text, &[Style::Gray, Style::Dim])
    }

    fn heading(&self, text: &str) -> String {
        self.style(text, &[Style::Magenta, Style::Bold])
    }

    fn field(&self, name: &str, value: &str) -> String {
        format!("  {} {}", self.style(&format!("{name}:"), &[Style::Cyan]), value)
    }

    /// Renders a novel's detail record.
    pub fn format_novel_info(&self, info: &NovelInfo) -> String {
        let mut lines = vec![
            self.heading(&format!("{} ({})", info.title, info.aid)),
            self.field("author", &info.author),
            self.field("press", &info.press),
            self.field("status", &info.status),
            self.field("tags", &info.tags.join(", ")),
        ];

        match &info.availability {
            Availability::Active(stats) => {
                lines.push(self.field("updated", &stats.last_updated));
                lines.push(self.field("words", &stats.word_count.to_string()));
                lines.push(self.field(
                    "heat",
                    &format!("{} / trend {}", stats.popularity_level, stats.trending_level),
                ));
                lines.push(self.field("latest", &stats.latest_section));
            }
            Availability::Withdrawn => {
                lines.push(self.style("  withdrawn for copyright", &[Style::Red]));
            }
        }
        if info.animation {
            lines.push(self.style("  has an anime adaptation", &[Style::Yellow]));
        }
        lines.push(String::new());
        lines.push(info.intro.trim().to_string());
        lines.join("\n")
    }

    /// Renders the volume/chapter tree.
    pub fn format_novel_index(&self, index: &NovelIndex) -> String {
        let mut lines = vec![self.heading(&format!(
            "{} / {} ({} chapters)",
            index.title,
            index.author,
            index.chapter_count()
        ))];

        for volume in &index.volumes {
            lines.push(self.style(&volume.title, &[Style::Bold]));
            for chapter in &volume.chapters {
                lines.push(format!(
                    "  {} {}",
                    self.muted(&format!("{:>6}", chapter.cid)),
                    chapter.title
                ));
            }
        }
        lines.join("\n")
    }

    /// Renders one page of search or toplist results.
    pub fn format_search_result(&self, result: &SearchResult) -> String {
        let mut lines: Vec<String> = result
            .results
            .iter()
            .map(|item| self.format_search_item(item))
            .collect();

        let page = &result.page_control;
        lines.push(self.muted(&format!("page {}/{}", page.now, page.end)));
        lines.join("\n")
    }

    fn format_search_item(&self, item: &SearchItem) -> String {
        let state = match &item.availability {
            Availability::Active(stats) => {
                format!("{} {} {}", item.status, stats.word_count, stats.last_updated)
            }
            Availability::Withdrawn => format!("{} withdrawn", item.status),
        };
        format!(
            "{} {} {}\n  {}",
            self.muted(&format!("{:>5}", item.aid)),
            self.style(&item.title, &[Style::Bold]),
            self.muted(&format!("[{} / {}] {}", item.author, item.press, state)),
            item.intro_preview.trim()
        )
    }

    /// Renders bookshelf rows.
    pub fn format_bookshelf(&self, items: &[BookshelfItem]) -> String {
        if items.is_empty() {
            return self.muted("bookshelf is empty");
        }

        items
            .iter()
            .map(|item| {
                let mut flags = String::new();
                if item.updated_after_last_reading {
                    flags.push_str(&self.style("new ", &[Style::Green]));
                }
                if item.finished {
                    flags.push_str(&self.muted("finished "));
                }
                let bookmark = match &item.bookmark {
                    Bookmark::Bookmarked { title, .. } => title.as_str(),
                    Bookmark::Unbookmarked => "-",
                };
                format!(
                    "{} {}{}\n  latest: {}  bookmark: {}  {}",
                    self.muted(&format!("{:>5}", item.aid)),
                    flags,
                    self.style(&item.title, &[Style::Bold]),
                    item.latest_section,
                    bookmark,
                    self.muted(&item.last_updated)
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Chapter, NovelStats, PageControl, Volume};

    #[test]
    fn test_style_disabled() {
        let console = Console::with_colors(false);
        assert_eq!(console.style("hello", &[Style::Red]), "hello");
        assert_eq!(console.label("INFO", Style::Blue), "[INFO]");
    }

    #[test]
    fn test_style_enabled() {
        let console = Console::with_colors(true);
        let styled = console.style("hello", &[Style::Bold, Style::Red]);
        assert!(styled.starts_with("\x1b[1;31m"));
        assert!(styled.ends_with(RESET));
    }

    fn info(availability: Availability<NovelStats>) -> NovelInfo {
        NovelInfo {
            aid: 1,
            title: "魔法禁书目录".into(),
            author: "镰池和马".into(),
            status: "已完结".into(),
            intro: "  学园都市  ".into(),
            tags: vec!["科幻".into(), "校园".into()],
            press: "电击文库".into(),
            availability,
            animation: true,
        }
    }

    #[test]
    fn test_format_novel_info() {
        let console = Console::with_colors(false);

        let text = console.format_novel_info(&info(Availability::Active(NovelStats {
            last_updated: "2011-05-09".into(),
            word_count: 3265617,
            popularity_level: "A级".into(),
            trending_level: "C级".into(),
            latest_section: "后记".into(),
        })));
        assert!(text.starts_with("魔法禁书目录 (1)"));
        assert!(text.contains("  words: 3265617"));
        assert!(text.contains("  tags: 科幻, 校园"));
        assert!(text.ends_with("\n学园都市"));

        let text = console.format_novel_info(&info(Availability::Withdrawn));
        assert!(text.contains("withdrawn"));
        assert!(!text.contains("words:"));
    }

    #[test]
    fn test_format_index_and_empty_listing() {
        let console = Console::with_colors(false);
        let index = NovelIndex {
            aid: 1,
            title: "书".into(),
            author: "某人".into(),
            volumes: vec![Volume {
                vid: 10,
                title: "第一卷".into(),
                chapters: vec![Chapter {
                    cid: 11,
                    title: "序章".into(),
                }],
            }],
        };
        assert_eq!(
            console.format_novel_index(&index),
            "书 / 某人 (1 chapters)\n第一卷\n      11 序章"
        );

        let result = SearchResult {
            results: Vec::new(),
            page_control: PageControl::single(),
        };
        assert_eq!(console.format_search_result(&result), "page 1/1");
        assert_eq!(console.format_bookshelf(&[]), "bookshelf is empty");
    }
}
