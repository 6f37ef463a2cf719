//! Paginated `GET` requests against the REST API

use crate::config::{AuthScheme, ClientConfig, Pagination};
use crate::error::{ClientError, ClientResult, FetchError};
use crate::link;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, AUTHORIZATION, LINK};
use reqwest::Url;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

const NEXT_PAGE_HEADER: &str = "x-next-page";
const PRIVATE_TOKEN: HeaderName = HeaderName::from_static("private-token");

/// What the `X-Next-Page` header said about the following page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageHint {
    /// Header not sent
    Unknown,
    /// Header names the next page number
    Next(u32),
    /// Header sent but empty: this was the last page
    Last,
}

/// One page of a collection
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    /// `rel="next"` target from the `Link` header
    pub next_link: Option<String>,
    pub next_page: PageHint,
}

/// Every record fetched for one collection
///
/// `error` is set when pagination stopped early; `items` then holds the
/// records of the pages that did arrive.
#[derive(Debug)]
pub struct Collected<T> {
    pub items: Vec<T>,
    pub pages: u32,
    pub error: Option<FetchError>,
}

impl<T> Collected<T> {
    pub fn complete(items: Vec<T>, pages: u32) -> Self {
        Self {
            items,
            pages,
            error: None,
        }
    }

    pub fn failed(items: Vec<T>, pages: u32, error: FetchError) -> Self {
        Self {
            items,
            pages,
            error: Some(error),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }

    /// Split into records and the error, if any
    pub fn into_parts(self) -> (Vec<T>, Option<FetchError>) {
        (self.items, self.error)
    }
}

impl<T> Default for Collected<T> {
    fn default() -> Self {
        Self::complete(Vec::new(), 0)
    }
}

/// Thin wrapper over `reqwest::Client` carrying auth and paging settings
#[derive(Debug, Clone)]
pub struct RestClient {
    http: reqwest::Client,
    api_root: String,
    config: ClientConfig,
    cancel: CancellationToken,
}

impl RestClient {
    /// Build a client; the token is installed as a default header
    pub fn new(config: ClientConfig) -> ClientResult<Self> {
        let api_root = config.api_root();
        Url::parse(&api_root).map_err(|e| ClientError::InvalidBaseUrl {
            url: config.base_url.clone(),
            message: e.to_string(),
        })?;

        let mut headers = HeaderMap::new();
        let mut auth = match config.auth {
            AuthScheme::PrivateToken => HeaderValue::from_str(&config.token),
            AuthScheme::Bearer => HeaderValue::from_str(&format!("Bearer {}", config.token)),
        }
        .map_err(|_| ClientError::InvalidToken)?;
        auth.set_sensitive(true);
        match config.auth {
            AuthScheme::PrivateToken => headers.insert(PRIVATE_TOKEN, auth),
            AuthScheme::Bearer => headers.insert(AUTHORIZATION, auth),
        };

        let http = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(config.timeout)
            .user_agent(concat!("varaudit/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            api_root,
            config,
            cancel: CancellationToken::new(),
        })
    }

    /// Abandon pagination, including the request in flight, once `cancel` fires
    #[must_use]
    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Absolute URL for an API path such as `/groups/4/variables`
    pub fn endpoint(&self, path: &str, query: &[(&str, String)]) -> Result<Url, FetchError> {
        let raw = format!("{}/{}", self.api_root, path.trim_start_matches('/'));
        let mut url = Url::parse(&raw).map_err(|e| FetchError::InvalidUrl(format!("{raw}: {e}")))?;
        {
            let mut pairs = url.query_pairs_mut();
            for (name, value) in query {
                pairs.append_pair(name, value);
            }
            pairs.append_pair("per_page", &self.config.per_page.to_string());
        }
        Ok(url)
    }

    /// Fetch a single page
    pub async fn fetch_page<T: DeserializeOwned>(&self, url: Url) -> Result<Page<T>, FetchError> {
        if !self.config.request_delay.is_zero() {
            tokio::time::sleep(self.config.request_delay).await;
        }

        let url_str = url.to_string();
        log::debug!("GET {url_str}");

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| FetchError::from_reqwest(&url_str, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url_str,
                status: status.as_u16(),
            });
        }

        let next_link = response
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(link::next_link);
        let next_page = parse_page_hint(response.headers());

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::from_reqwest(&url_str, e))?;
        let items: Vec<T> = serde_json::from_slice(&body).map_err(|source| FetchError::Decode {
            url: url_str,
            source,
        })?;

        Ok(Page {
            items,
            next_link,
            next_page,
        })
    }

    /// Fetch every page of a collection
    ///
    /// Stops on an empty page, on a missing continuation, on the page
    /// ceiling, on cancellation, or on the first failed request. Never
    /// retries.
    pub async fn fetch_all<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        pagination: Pagination,
    ) -> Collected<T> {
        let mut items = Vec::new();
        let mut pages = 0u32;

        let base = match self.endpoint(path, query) {
            Ok(url) => url,
            Err(e) => return Collected::failed(items, pages, e),
        };
        let mut page_number = 1u32;
        let mut url = match pagination {
            Pagination::PageNumber => with_page(&base, page_number),
            Pagination::LinkHeader => base.clone(),
        };

        loop {
            if self.cancel.is_cancelled() {
                let error = FetchError::Cancelled {
                    url: url.to_string(),
                };
                return Collected::failed(items, pages, error);
            }
            if pages >= self.config.max_pages {
                let error = FetchError::PageLimit {
                    url: base.to_string(),
                    limit: self.config.max_pages,
                };
                return Collected::failed(items, pages, error);
            }

            let fetched = tokio::select! {
                biased;
                () = self.cancel.cancelled() => Err(FetchError::Cancelled {
                    url: url.to_string(),
                }),
                result = self.fetch_page::<T>(url.clone()) => result,
            };
            let page: Page<T> = match fetched {
                Ok(page) => page,
                Err(e) => {
                    log::debug!("Pagination of {path} stopped after {pages} pages: {e}");
                    return Collected::failed(items, pages, e);
                }
            };
            pages += 1;

            if page.items.is_empty() {
                break;
            }
            items.extend(page.items);

            match pagination {
                Pagination::PageNumber => {
                    page_number = match page.next_page {
                        PageHint::Last => break,
                        PageHint::Next(n) if n > page_number => n,
                        PageHint::Next(_) | PageHint::Unknown => {
                            let Some(next) = page_number.checked_add(1) else {
                                let error = FetchError::InvalidUrl(format!(
                                    "{base}: page number past {page_number}"
                                ));
                                return Collected::failed(items, pages, error);
                            };
                            next
                        }
                    };
                    url = with_page(&base, page_number);
                }
                Pagination::LinkHeader => {
                    let Some(next) = page.next_link else { break };
                    let next = match Url::parse(&next) {
                        Ok(next) => next,
                        Err(e) => {
                            let error = FetchError::InvalidUrl(format!("{next}: {e}"));
                            return Collected::failed(items, pages, error);
                        }
                    };
                    if next.origin() != base.origin() {
                        let error = FetchError::ForeignLink {
                            url: next.to_string(),
                            expected: base.origin().ascii_serialization(),
                        };
                        return Collected::failed(items, pages, error);
                    }
                    if next == url {
                        log::warn!("Next link of {path} points at itself; stopping");
                        break;
                    }
                    url = next;
                }
            }
        }

        Collected::complete(items, pages)
    }
}

fn with_page(base: &Url, page: u32) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut().append_pair("page", &page.to_string());
    url
}

fn parse_page_hint(headers: &HeaderMap) -> PageHint {
    match headers.get(NEXT_PAGE_HEADER).and_then(|v| v.to_str().ok()) {
        None => PageHint::Unknown,
        Some(v) if v.trim().is_empty() => PageHint::Last,
        Some(v) => v.trim().parse().map_or(PageHint::Unknown, PageHint::Next),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> RestClient {
        RestClient::new(ClientConfig::new("https://gitlab.example.com", "secret").with_per_page(50))
            .expect("client")
    }

    #[test]
    fn endpoint_adds_query_and_page_size() {
        let url = client()
            .endpoint("/groups", &[("top_level_only", "true".to_string())])
            .expect("url");
        assert_eq!(
            url.as_str(),
            "https://gitlab.example.com/api/v4/groups?top_level_only=true&per_page=50"
        );
    }

    #[test]
    fn page_hint_from_headers() {
        let mut headers = HeaderMap::new();
        assert_eq!(parse_page_hint(&headers), PageHint::Unknown);

        headers.insert(NEXT_PAGE_HEADER, HeaderValue::from_static(""));
        assert_eq!(parse_page_hint(&headers), PageHint::Last);

        headers.insert(NEXT_PAGE_HEADER, HeaderValue::from_static("3"));
        assert_eq!(parse_page_hint(&headers), PageHint::Next(3));
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        let err = RestClient::new(ClientConfig::new("not a url", "t")).unwrap_err();
        assert!(matches!(err, ClientError::InvalidBaseUrl { .. }));
    }

    #[test]
    fn token_with_newline_is_rejected() {
        let err = RestClient::new(ClientConfig::new("https://h", "bad\ntoken")).unwrap_err();
        assert!(matches!(err, ClientError::InvalidToken));
    }
}
