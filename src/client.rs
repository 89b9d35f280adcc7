use reqwest::{StatusCode, Url};
use std::time::Duration;

use crate::config::CONFIG;
use crate::data_models::SearchResponse;
use crate::error::{LibgenError, Result};
use crate::parser;

/// Which column of the catalog a query is matched against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchCriteria {
    #[default]
    Any,
    Title,
    Authors,
    Series,
}

impl SearchCriteria {
    fn as_param(self) -> &'static str {
        match self {
            SearchCriteria::Any => "",
            SearchCriteria::Title => "title",
            SearchCriteria::Authors => "authors",
            SearchCriteria::Series => "series",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchOptions {
    /// Upper bound on the number of results returned.
    pub limit: Option<usize>,
    /// Per-request timeout; falls back to the client's default.
    pub timeout: Option<Duration>,
    pub criteria: SearchCriteria,
    /// Language name as the site spells it, e.g. `English`.
    pub language: Option<String>,
    /// File extension filter, e.g. `epub`.
    pub format: Option<String>,
    /// 1-based listing page; the first page when unset.
    pub page: Option<u32>,
}

impl SearchOptions {
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn criteria(mut self, criteria: SearchCriteria) -> Self {
        self.criteria = criteria;
        self
    }

    pub fn language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }
}

/// Client for the fiction section of Library Genesis.
///
/// Every operation makes a single request. Further listing pages are
/// fetched by searching again with [`SearchOptions::page`].
pub struct LibgenClient {
    http: reqwest::Client,
    base_url: Url,
    download_base_url: Url,
    timeout: Duration,
}

impl LibgenClient {
    /// Create a client against explicit hosts. Useful for tests pointing at a
    /// local mock server.
    pub fn new(base_url: &str, download_base_url: &str, timeout: Duration) -> Result<Self> {
        Self::with_user_agent(
            base_url,
            download_base_url,
            timeout,
            crate::config::DEFAULT_USER_AGENT,
        )
    }

    /// Create a client using environment configuration.
    pub fn from_config() -> Result<Self> {
        Self::with_user_agent(
            &CONFIG.base_url,
            &CONFIG.download_base_url,
            CONFIG.timeout,
            &CONFIG.user_agent,
        )
    }

    fn with_user_agent(
        base_url: &str,
        download_base_url: &str,
        timeout: Duration,
        user_agent: &str,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .build()
            .map_err(|e| LibgenError::from_reqwest(base_url, e))?;

        Ok(LibgenClient {
            http,
            base_url: parse_base(base_url)?,
            download_base_url: parse_base(download_base_url)?,
            timeout,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Listing URL for `query`. Pages are 1-based; page 1 carries no page
    /// parameter.
    pub fn search_url(&self, query: &str, options: &SearchOptions, page: u32) -> Result<Url> {
        let mut url = self.base_url.join("fiction/")?;
        {
            let mut pairs = url.query_pairs_mut();
            pairs
                .append_pair("q", query.trim())
                .append_pair("criteria", options.criteria.as_param())
                .append_pair("language", options.language.as_deref().unwrap_or(""))
                .append_pair("format", options.format.as_deref().unwrap_or(""));
            if page > 1 {
                pairs.append_pair("page", &page.to_string());
            }
        }
        Ok(url)
    }

    /// Page holding the direct download link for `md5`. Identifiers that
    /// are not hex fail with `NotFound`.
    pub fn detail_url(&self, md5: &str) -> Result<Url> {
        Ok(self
            .download_base_url
            .join(&format!("fiction/{}", normalize_md5(md5)?))?)
    }

    /// The catalog's own page for `md5`, meant for a browser.
    pub fn catalog_url(&self, md5: &str) -> Result<Url> {
        Ok(self
            .base_url
            .join(&format!("fiction/{}", normalize_md5(md5)?))?)
    }

    pub async fn search(&self, query: &str, options: &SearchOptions) -> Result<SearchResponse> {
        if query.trim().is_empty() {
            log::debug!("empty query, skipping request");
            return Ok(SearchResponse::default());
        }
        if options.limit == Some(0) {
            return Ok(SearchResponse::default());
        }

        let timeout = options.timeout.unwrap_or(self.timeout);
        let page = options.page.unwrap_or(1).max(1);
        let url = self.search_url(query, options, page)?;
        log::info!("searching {url}");
        let html = self.fetch(&url, timeout).await?;
        let mut response = parser::parse_search_page(&html, &url, page);

        if let Some(limit) = options.limit {
            response.results.truncate(limit);
        }
        if response.is_empty() {
            log::info!("no results for {query:?}");
        }
        Ok(response)
    }

    /// Resolves the direct download URL for a search result.
    pub async fn download_url(&self, md5: &str) -> Result<String> {
        self.download_url_with_timeout(md5, self.timeout).await
    }

    pub async fn download_url_with_timeout(&self, md5: &str, timeout: Duration) -> Result<String> {
        let not_found = || LibgenError::NotFound {
            md5: md5.to_string(),
        };

        let url = self.detail_url(md5)?;
        log::info!("resolving download link from {url}");
        let html = match self.fetch(&url, timeout).await {
            Err(LibgenError::Status { status, .. }) if status == StatusCode::NOT_FOUND => {
                return Err(not_found());
            }
            other => other?,
        };

        match parser::parse_download_page(&html, &url) {
            Some(link) => {
                log::debug!("download link for {md5}: {link}");
                Ok(link)
            }
            None => {
                log::warn!("no download link on {url}, layout changed or unknown md5");
                Err(not_found())
            }
        }
    }

    async fn fetch(&self, url: &Url, timeout: Duration) -> Result<String> {
        let res = self
            .http
            .get(url.clone())
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| LibgenError::from_reqwest(url.as_str(), e))?;

        let status = res.status();
        if !status.is_success() {
            return Err(LibgenError::Status {
                url: url.to_string(),
                status,
            });
        }

        res.text()
            .await
            .map_err(|e| LibgenError::from_reqwest(url.as_str(), e))
    }
}

/// Base URLs are joined against, so they need a trailing slash.
fn parse_base(raw: &str) -> Result<Url> {
    let raw = raw.trim();
    if raw.ends_with('/') {
        Ok(Url::parse(raw)?)
    } else {
        Ok(Url::parse(&format!("{raw}/"))?)
    }
}

fn normalize_md5(md5: &str) -> Result<String> {
    let md5 = md5.trim();
    if !parser::is_md5(md5) {
        return Err(LibgenError::NotFound {
            md5: md5.to_string(),
        });
    }
    Ok(md5.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> LibgenClient {
        LibgenClient::new(
            "https://libgen.example",
            "https://dl.example/",
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_search_url() {
        let client = client();
        let url = client
            .search_url(" the hobbit ", &SearchOptions::default(), 1)
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://libgen.example/fiction/?q=the+hobbit&criteria=&language=&format="
        );

        let options = SearchOptions::default()
            .criteria(SearchCriteria::Authors)
            .language("English")
            .format("epub");
        let url = client.search_url("tolkien & co", &options, 3).unwrap();
        assert_eq!(
            url.as_str(),
            "https://libgen.example/fiction/?q=tolkien+%26+co&criteria=authors&language=English&format=epub&page=3"
        );
    }

    #[test]
    fn test_detail_and_catalog_urls() {
        let client = client();
        assert_eq!(
            client.detail_url(" ABCDEF0123 ").unwrap().as_str(),
            "https://dl.example/fiction/abcdef0123"
        );
        assert_eq!(
            client.catalog_url("ABCDEF0123").unwrap().as_str(),
            "https://libgen.example/fiction/abcdef0123"
        );
    }

    #[test]
    fn test_non_hex_md5_is_not_found() {
        let client = client();
        for md5 in ["", "   ", "../../search.php?req=x", "abc/def", "zz12"] {
            assert!(
                matches!(client.detail_url(md5), Err(LibgenError::NotFound { .. })),
                "{md5:?} should be rejected"
            );
            assert!(matches!(
                client.catalog_url(md5),
                Err(LibgenError::NotFound { .. })
            ));
        }
    }

    #[test]
    fn test_invalid_base_url() {
        let res = LibgenClient::new("not a url", "https://dl.example", Duration::from_secs(1));
        assert!(matches!(res, Err(LibgenError::InvalidUrl(_))));
    }
}
