//! Client facade over the site.
//!
//! Every operation maps to one page type: build the URL, apply the session
//! guard, fetch through the [`Transport`], check the status, decode the body
//! in the requested language and hand the page to its decoder.

use crate::config::Config;
use crate::error::ClientError;
use crate::lang::{Lang, LoginValidity, NovelSortMethod, SearchMethod};
use crate::models::{BookshelfItem, NovelIndex, NovelInfo, PageControl, SearchItem, SearchResult};
use crate::pages::{
    decode_page, parse_bookshelf, parse_chapter_content, parse_listing, parse_novel_index,
    parse_novel_info,
};
use crate::session::{Cooldown, Session};
use crate::transport::{HttpTransport, RawResponse, Transport};
use url::Url;

/// Cookie that carries the site session.
const SESSION_COOKIE: &str = "PHPSESSID";

/// Value of the login form's submit button, already GBK percent-encoded.
const LOGIN_SUBMIT: &str = "%26%23160%3B%B5%C7%26%23160%3B%26%23160%3B%C2%BC%26%23160%3B";

/// Client for one wenku8 account.
///
/// Instances are independent: each owns its transport, session token and
/// search cooldown.
pub struct Wenku8Client {
    transport: Box<dyn Transport>,
    endpoint: Url,
    image_host: Url,
    session: Session,
    search_cooldown: Cooldown,
}

impl Wenku8Client {
    /// Creates a client with an HTTP transport built from `config`.
    pub fn new(config: &Config) -> Result<Self, ClientError> {
        let transport = HttpTransport::new(&config.client)?;
        Self::with_transport(config, Box::new(transport))
    }

    /// Creates a client on top of a caller-supplied transport.
    pub fn with_transport(
        config: &Config,
        transport: Box<dyn Transport>,
    ) -> Result<Self, ClientError> {
        Ok(Self {
            transport,
            endpoint: parse_url(&config.site.endpoint)?,
            image_host: parse_url(&config.site.image_host)?,
            session: Session::new(),
            search_cooldown: Cooldown::new(config.client.search_cooldown()),
        })
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_authenticated()
    }

    pub fn session_token(&self) -> Option<String> {
        self.session.token()
    }

    /// Logs in and returns the session token.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        validity: LoginValidity,
    ) -> Result<String, ClientError> {
        let url = self.site_url("/login.php")?;
        let gbk = Lang::ZhCn;
        let body = format!(
            "username={}&password={}&usercookie={}&action=login&submit={}",
            gbk.encode_query(username),
            gbk.encode_query(password),
            validity.as_form_value(),
            LOGIN_SUBMIT,
        );

        self.transport.post_form(&url, body).await?.check_status()?;

        let token = self
            .transport
            .cookie(&self.endpoint, SESSION_COOKIE)
            .filter(|token| !token.is_empty())
            .ok_or_else(|| ClientError::LoginFailed("no session cookie issued".to_string()))?;

        self.session.establish(token.clone());
        tracing::info!(username, "logged in");
        Ok(token)
    }

    /// Fetches a novel's detail page.
    pub async fn get_novel_info(&self, aid: u32, lang: Lang) -> Result<NovelInfo, ClientError> {
        self.session.ensure_authenticated()?;
        let url = self.site_url(&format!(
            "/modules/article/articleinfo.php?id={aid}&charset={}",
            lang.charset()
        ))?;
        let text = self.fetch_text(&url, lang).await?.1;
        decode_page(&text, |doc| parse_novel_info(doc, aid))
    }

    /// Fetches a novel's chapter index.
    pub async fn get_novel_index(&self, aid: u32, lang: Lang) -> Result<NovelIndex, ClientError> {
        self.session.ensure_authenticated()?;
        let url = self.site_url(&format!(
            "/modules/article/reader.php?aid={aid}&charset={}",
            lang.charset()
        ))?;
        let text = self.fetch_text(&url, lang).await?.1;
        decode_page(&text, |doc| parse_novel_index(doc, aid))
    }

    /// Fetches one chapter's text, with illustrations as sentinel-wrapped URLs.
    pub async fn get_novel_content(
        &self,
        aid: u32,
        cid: u32,
        lang: Lang,
    ) -> Result<String, ClientError> {
        self.session.ensure_authenticated()?;
        let url = self.site_url(&format!(
            "/modules/article/reader.php?aid={aid}&cid={cid}&charset={}",
            lang.charset()
        ))?;
        let text = self.fetch_text(&url, lang).await?.1;
        decode_page(&text, parse_chapter_content)
    }

    /// Searches by title or author.
    ///
    /// Searches are paced by the configured cooldown. When the site finds a
    /// single match it redirects straight to the novel page; that novel is
    /// returned as a one-item result.
    pub async fn search_novel(
        &self,
        keyword: &str,
        method: SearchMethod,
        page: u32,
        lang: Lang,
    ) -> Result<SearchResult, ClientError> {
        self.session.ensure_authenticated()?;
        let url = self.site_url(&format!(
            "/modules/article/search.php?searchtype={}&searchkey={}&page={page}&charset={}",
            method.as_str(),
            lang.encode_query(keyword),
            lang.charset()
        ))?;

        self.search_cooldown
            .run(async {
                let (final_url, text) = self.fetch_text(&url, lang).await?;
                match redirected_aid(&final_url) {
                    Some(aid) => {
                        tracing::debug!(aid, "search redirected to a single novel");
                        let info = self.get_novel_info(aid, lang).await?;
                        Ok(SearchResult {
                            results: vec![SearchItem::from(info)],
                            page_control: PageControl::single(),
                        })
                    }
                    None => decode_page(&text, parse_listing),
                }
            })
            .await
    }

    pub async fn search_novel_by_name(
        &self,
        keyword: &str,
        page: u32,
        lang: Lang,
    ) -> Result<SearchResult, ClientError> {
        self.search_novel(keyword, SearchMethod::Name, page, lang)
            .await
    }

    pub async fn search_novel_by_author(
        &self,
        keyword: &str,
        page: u32,
        lang: Lang,
    ) -> Result<SearchResult, ClientError> {
        self.search_novel(keyword, SearchMethod::Author, page, lang)
            .await
    }

    /// Fetches one page of a toplist.
    pub async fn get_novel_list(
        &self,
        sort: NovelSortMethod,
        page: u32,
        lang: Lang,
    ) -> Result<SearchResult, ClientError> {
        self.session.ensure_authenticated()?;
        let url = self.site_url(&format!(
            "/modules/article/toplist.php?sort={}&page={page}&charset={}",
            sort.as_str(),
            lang.charset()
        ))?;
        let text = self.fetch_text(&url, lang).await?.1;
        decode_page(&text, parse_listing)
    }

    /// Fetches the bookshelf; `bid` 0 lists every category.
    pub async fn get_bookshelf(
        &self,
        bid: u32,
        lang: Lang,
    ) -> Result<Vec<BookshelfItem>, ClientError> {
        self.session.ensure_authenticated()?;
        let url = self.site_url(&format!(
            "/modules/article/bookcase.php?classid={bid}&charset={}",
            lang.charset()
        ))?;
        let text = self.fetch_text(&url, lang).await?.1;
        decode_page(&text, parse_bookshelf)
    }

    /// URL of a novel's cover image.
    pub fn cover_url(&self, aid: u32) -> Result<Url, ClientError> {
        let path = format!("image/{}/{aid}/{aid}s.jpg", aid / 1000);
        self.image_host
            .join(&path)
            .map_err(|e| ClientError::InvalidUrl(format!("{path}: {e}")))
    }

    /// Downloads a novel's cover image.
    pub async fn get_novel_cover(&self, aid: u32) -> Result<Vec<u8>, ClientError> {
        let url = self.cover_url(aid)?;
        self.fetch_bytes(&url).await
    }

    /// Downloads any image, such as an illustration URL from chapter text.
    pub async fn get_picture(&self, url: &str) -> Result<Vec<u8>, ClientError> {
        let url = parse_url(url)?;
        self.fetch_bytes(&url).await
    }

    async fn fetch_bytes(&self, url: &Url) -> Result<Vec<u8>, ClientError> {
        Ok(self.transport.get(url).await?.check_status()?.body)
    }

    /// Fetches a page and decodes it; returns the final URL and the text.
    async fn fetch_text(&self, url: &Url, lang: Lang) -> Result<(Url, String), ClientError> {
        let RawResponse { url, body, .. } = self.transport.get(url).await?.check_status()?;
        let text = lang.decode(&body).into_owned();
        Ok((url, text))
    }

    fn site_url(&self, path_and_query: &str) -> Result<Url, ClientError> {
        self.endpoint
            .join(path_and_query)
            .map_err(|e| ClientError::InvalidUrl(format!("{path_and_query}: {e}")))
    }
}

fn parse_url(raw: &str) -> Result<Url, ClientError> {
    Url::parse(raw).map_err(|e| ClientError::InvalidUrl(format!("{raw}: {e}")))
}

/// Novel id of a search that landed on a novel page (`.../1234.htm`).
fn redirected_aid(url: &Url) -> Option<u32> {
    let last = url.path_segments()?.next_back()?;
    last.strip_suffix(".htm")?.parse().ok()
}
