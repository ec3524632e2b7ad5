//! Result page layouts of the supported search engines
//!
//! Each engine serves an HTML results page. [`EngineProfile`] records where
//! to send the query, how pages are addressed, and which CSS selectors pick
//! out a result's title, link and snippet.

use oracle_application::SearchError;
use oracle_domain::{SearchEngine, SearchResult};
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};

/// How to query one engine and read its results page.
#[derive(Debug, Clone, Copy)]
pub struct EngineProfile {
    pub endpoint: &'static str,
    pub query_param: &'static str,
    pub page_param: &'static str,
    /// Increment of the page parameter between pages
    pub page_step: usize,
    /// Value of the page parameter for the first page
    pub first_page: usize,
    pub result: &'static str,
    pub title: &'static str,
    pub link: &'static str,
    pub snippet: &'static str,
    /// Query parameter carrying the target of the engine's own redirect links
    pub redirect_param: Option<&'static str>,
}

impl EngineProfile {
    pub fn for_engine(engine: SearchEngine) -> Self {
        match engine {
            SearchEngine::Google => Self {
                endpoint: "https://www.google.com/search",
                query_param: "q",
                page_param: "start",
                page_step: 10,
                first_page: 0,
                result: "div.g",
                title: "h3",
                link: "a[href]",
                snippet: "div.VwiC3b, div[data-sncf], span.st",
                redirect_param: Some("q"),
            },
            SearchEngine::Bing => Self {
                endpoint: "https://www.bing.com/search",
                query_param: "q",
                page_param: "first",
                page_step: 10,
                first_page: 1,
                result: "li.b_algo",
                title: "h2",
                link: "h2 a[href]",
                snippet: "div.b_caption p, p.b_lineclamp2, p.b_algoSlug",
                redirect_param: None,
            },
            SearchEngine::Yahoo => Self {
                endpoint: "https://search.yahoo.com/search",
                query_param: "p",
                page_param: "b",
                page_step: 10,
                first_page: 1,
                result: "div.algo",
                title: "h3",
                link: "h3 a[href], a[href]",
                snippet: "div.compText p, div.compText",
                redirect_param: None,
            },
            SearchEngine::DuckDuckGo => Self {
                endpoint: "https://html.duckduckgo.com/html/",
                query_param: "q",
                page_param: "s",
                page_step: 30,
                first_page: 0,
                result: "div.result",
                title: "a.result__a",
                link: "a.result__a",
                snippet: ".result__snippet",
                redirect_param: Some("uddg"),
            },
            SearchEngine::Brave => Self {
                endpoint: "https://search.brave.com/search",
                query_param: "q",
                page_param: "offset",
                page_step: 1,
                first_page: 0,
                result: "div.snippet[data-type=\"web\"]",
                title: ".title",
                link: "a[href]",
                snippet: ".snippet-description, .generic-snippet .content",
                redirect_param: None,
            },
        }
    }

    /// Page parameter value for the zero-based `page`.
    pub fn page_value(&self, page: usize) -> String {
        (self.first_page + page * self.page_step).to_string()
    }

    /// Extract results from a results page, in page order.
    ///
    /// Results without a title, a usable link, or a snippet are skipped.
    pub fn parse_results(&self, page_url: &Url, html: &str) -> Result<Vec<SearchResult>, SearchError> {
        let result_sel = selector(self.result)?;
        let title_sel = selector(self.title)?;
        let link_sel = selector(self.link)?;
        let snippet_sel = selector(self.snippet)?;

        let document = Html::parse_document(html);
        let results = document
            .select(&result_sel)
            .filter_map(|item| {
                let title = first_text(item, &title_sel)?;
                let href = item
                    .select(&link_sel)
                    .find_map(|a| a.value().attr("href"))?;
                let url = resolve_link(page_url, href, self.redirect_param)?;
                let snippet = first_text(item, &snippet_sel)?;
                Some(SearchResult::new(title, url, snippet))
            })
            .collect();

        Ok(results)
    }
}

fn selector(css: &str) -> Result<Selector, SearchError> {
    Selector::parse(css)
        .map_err(|e| SearchError::ParseError(format!("bad selector '{}': {:?}", css, e)))
}

/// Text of the first match of `sel` under `item`, whitespace collapsed.
fn first_text(item: ElementRef<'_>, sel: &Selector) -> Option<String> {
    item.select(sel)
        .map(|el| el.text().collect::<Vec<_>>().join(" "))
        .map(|text| text.split_whitespace().collect::<Vec<_>>().join(" "))
        .find(|text| !text.is_empty())
}

/// Turn an `href` into an absolute http(s) URL.
///
/// Engines that wrap results in their own redirect (`/url?q=...`,
/// `//duckduckgo.com/l/?uddg=...`) carry the target in a query parameter.
fn resolve_link(page_url: &Url, href: &str, redirect_param: Option<&str>) -> Option<String> {
    let url = page_url.join(href).ok()?;

    if let Some(param) = redirect_param
        && is_same_site(&url, page_url)
        && let Some((_, target)) = url.query_pairs().find(|(k, _)| k == param)
    {
        let target = Url::parse(&target).ok()?;
        return matches!(target.scheme(), "http" | "https").then(|| target.to_string());
    }

    matches!(url.scheme(), "http" | "https").then(|| url.to_string())
}

/// Whether `url` points back at the engine (e.g. duckduckgo.com for html.duckduckgo.com).
fn is_same_site(url: &Url, page_url: &Url) -> bool {
    fn site(host: &str) -> String {
        let parts: Vec<&str> = host.split('.').collect();
        parts[parts.len().saturating_sub(2)..].join(".")
    }
    match (url.host_str(), page_url.host_str()) {
        (Some(a), Some(b)) => site(a) == site(b),
        _ => false,
    }
}
