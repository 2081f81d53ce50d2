//! Language variants and the request enumerations the site understands.
//!
//! The site serves simplified Chinese pages in GBK and traditional Chinese
//! pages in Big5. The same encoding is used to decode responses and to
//! percent-encode outgoing text, so both directions live here.

use encoding_rs::{BIG5, Encoding, GBK};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_encode};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;
use std::str::FromStr;

/// Characters left as-is when percent-encoding query values.
const QUERY_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'.')
    .remove(b'_')
    .remove(b'~');

/// Page language requested from the site.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Lang {
    /// Simplified Chinese, served as GBK.
    #[default]
    #[serde(rename = "zh_CN")]
    ZhCn,
    /// Traditional Chinese, served as Big5.
    #[serde(rename = "zh_TW")]
    ZhTw,
}

impl Lang {
    /// Value of the `charset` query parameter.
    pub fn charset(self) -> &'static str {
        match self {
            Lang::ZhCn => "gbk",
            Lang::ZhTw => "big5",
        }
    }

    /// Character encoding used by pages rendered in this language.
    pub fn encoding(self) -> &'static Encoding {
        match self {
            Lang::ZhCn => GBK,
            Lang::ZhTw => BIG5,
        }
    }

    /// Decodes a response body. Malformed sequences become U+FFFD.
    pub fn decode<'a>(self, bytes: &'a [u8]) -> Cow<'a, str> {
        let (text, _, _) = self.encoding().decode(bytes);
        text
    }

    /// Percent-encodes `text` in this language's encoding for use in a query.
    pub fn encode_query(self, text: &str) -> String {
        let (bytes, _, _) = self.encoding().encode(text);
        percent_encode(&bytes, QUERY_VALUE).to_string()
    }
}

impl fmt::Display for Lang {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Lang::ZhCn => f.write_str("zh_CN"),
            Lang::ZhTw => f.write_str("zh_TW"),
        }
    }
}

impl FromStr for Lang {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace('-', "_").as_str() {
            "zh_cn" | "gbk" => Ok(Lang::ZhCn),
            "zh_tw" | "big5" => Ok(Lang::ZhTw),
            other => Err(format!("unknown language variant: {other}")),
        }
    }
}

/// How long the site should keep the login cookie alive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoginValidity {
    /// Browser session only.
    #[default]
    None,
    OneDay,
    OneMonth,
    OneYear,
}

impl LoginValidity {
    /// Value of the `usercookie` login form field, in seconds.
    pub fn as_form_value(self) -> &'static str {
        match self {
            LoginValidity::None => "0",
            LoginValidity::OneDay => "86400",
            LoginValidity::OneMonth => "2592000",
            LoginValidity::OneYear => "315360000",
        }
    }
}

/// Which field a keyword search matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMethod {
    Name,
    Author,
}

impl SearchMethod {
    /// Value of the `searchtype` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            SearchMethod::Name => "articlename",
            SearchMethod::Author => "articleauthor",
        }
    }
}

/// Toplist ordering keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NovelSortMethod {
    AllVisit,
    AllVote,
    MonthVisit,
    MonthVote,
    WeekVisit,
    WeekVote,
    DayVisit,
    DayVote,
    /// Most recently added.
    PostDate,
    /// Most recently updated.
    LastUpdate,
    /// Most bookmarked.
    GoodNum,
    /// Longest first.
    Size,
    /// Finished novels.
    FullFlag,
    /// Novels with an anime adaptation.
    Anime,
}

impl NovelSortMethod {
    const ALL: [NovelSortMethod; 14] = [
        NovelSortMethod::AllVisit,
        NovelSortMethod::AllVote,
        NovelSortMethod::MonthVisit,
        NovelSortMethod::MonthVote,
        NovelSortMethod::WeekVisit,
        NovelSortMethod::WeekVote,
        NovelSortMethod::DayVisit,
        NovelSortMethod::DayVote,
        NovelSortMethod::PostDate,
        NovelSortMethod::LastUpdate,
        NovelSortMethod::GoodNum,
        NovelSortMethod::Size,
        NovelSortMethod::FullFlag,
        NovelSortMethod::Anime,
    ];

    /// Value of the `sort` query parameter.
    pub fn as_str(self) -> &'static str {
        match self {
            NovelSortMethod::AllVisit => "allvisit",
            NovelSortMethod::AllVote => "allvote",
            NovelSortMethod::MonthVisit => "monthvisit",
            NovelSortMethod::MonthVote => "monthvote",
            NovelSortMethod::WeekVisit => "weekvisit",
            NovelSortMethod::WeekVote => "weekvote",
            NovelSortMethod::DayVisit => "dayvisit",
            NovelSortMethod::DayVote => "dayvote",
            NovelSortMethod::PostDate => "postdate",
            NovelSortMethod::LastUpdate => "lastupdate",
            NovelSortMethod::GoodNum => "goodnum",
            NovelSortMethod::Size => "size",
            NovelSortMethod::FullFlag => "fullflag",
            NovelSortMethod::Anime => "anime",
        }
    }
}

impl FromStr for NovelSortMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|sort| sort.as_str() == key)
            .ok_or_else(|| format!("unknown sort key: {s}"))
    }
}
