//! Client configuration

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::time::Duration;

/// Default request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Default pause before each request
pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_millis(100);

/// Default page size sent as `per_page`
pub const DEFAULT_PER_PAGE: u32 = 100;

/// Default ceiling on pages fetched for one collection
pub const DEFAULT_MAX_PAGES: u32 = 1000;

/// How continuation is discovered for a paginated collection
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Pagination {
    /// Increment `page` until an empty page (or an empty `X-Next-Page`)
    PageNumber,
    /// Follow the `rel="next"` entry of the `Link` header
    #[default]
    LinkHeader,
}

impl FromStr for Pagination {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "page" | "page-number" | "offset" => Ok(Pagination::PageNumber),
            "link" | "link-header" | "keyset" => Ok(Pagination::LinkHeader),
            _ => Err(format!("Invalid pagination style: {s}")),
        }
    }
}

/// Header used to present the access token
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AuthScheme {
    /// `PRIVATE-TOKEN: <token>`
    #[default]
    PrivateToken,
    /// `Authorization: Bearer <token>`
    Bearer,
}

impl FromStr for AuthScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "private-token" | "private" => Ok(AuthScheme::PrivateToken),
            "bearer" | "oauth" => Ok(AuthScheme::Bearer),
            _ => Err(format!("Invalid auth scheme: {s}")),
        }
    }
}

/// Settings for [`crate::RestClient`]
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Instance URL, e.g. `https://gitlab.example.com` (`/api/v4` is appended)
    pub base_url: String,
    /// Access token
    pub token: String,
    /// How the token is sent
    pub auth: AuthScheme,
    /// Per-request timeout
    pub timeout: Duration,
    /// Pause before every request
    pub request_delay: Duration,
    /// `per_page` query parameter
    pub per_page: u32,
    /// Maximum pages fetched for a single collection
    pub max_pages: u32,
}

impl ClientConfig {
    /// Create a config with default timing and paging
    #[must_use]
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            auth: AuthScheme::default(),
            timeout: DEFAULT_TIMEOUT,
            request_delay: DEFAULT_REQUEST_DELAY,
            per_page: DEFAULT_PER_PAGE,
            max_pages: DEFAULT_MAX_PAGES,
        }
    }

    #[must_use]
    pub fn with_auth(mut self, auth: AuthScheme) -> Self {
        self.auth = auth;
        self
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_request_delay(mut self, delay: Duration) -> Self {
        self.request_delay = delay;
        self
    }

    #[must_use]
    pub fn with_per_page(mut self, per_page: u32) -> Self {
        self.per_page = per_page;
        self
    }

    #[must_use]
    pub fn with_max_pages(mut self, max_pages: u32) -> Self {
        self.max_pages = max_pages;
        self
    }

    /// API root, e.g. `https://gitlab.example.com/api/v4`
    pub fn api_root(&self) -> String {
        let base = self.base_url.trim_end_matches('/');
        if base.ends_with("/api/v4") {
            base.to_string()
        } else {
            format!("{base}/api/v4")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_root_appends_version_once() {
        let cfg = ClientConfig::new("https://gitlab.example.com/", "t");
        assert_eq!(cfg.api_root(), "https://gitlab.example.com/api/v4");

        let cfg = ClientConfig::new("https://gitlab.example.com/api/v4", "t");
        assert_eq!(cfg.api_root(), "https://gitlab.example.com/api/v4");
    }

    #[test]
    fn pagination_parses_aliases() {
        assert_eq!("page".parse::<Pagination>(), Ok(Pagination::PageNumber));
        assert_eq!("LINK".parse::<Pagination>(), Ok(Pagination::LinkHeader));
        assert!("cursor".parse::<Pagination>().is_err());
    }

    #[test]
    fn auth_scheme_parses() {
        assert_eq!("bearer".parse::<AuthScheme>(), Ok(AuthScheme::Bearer));
        assert_eq!(
            "private-token".parse::<AuthScheme>(),
            Ok(AuthScheme::PrivateToken)
        );
    }
}
