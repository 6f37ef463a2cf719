//! Error types for the REST client

use thiserror::Error;

/// Result type for client construction
pub type ClientResult<T> = Result<T, ClientError>;

/// Errors raised while building a client
#[derive(Error, Debug)]
pub enum ClientError {
    /// Base URL could not be parsed
    #[error("Invalid base URL '{url}': {message}")]
    InvalidBaseUrl { url: String, message: String },

    /// Token contains bytes that are not allowed in a header value
    #[error("Access token is not a valid header value")]
    InvalidToken,

    /// Underlying HTTP client could not be built
    #[error("Failed to build HTTP client: {0}")]
    Build(#[from] reqwest::Error),
}

/// Errors that end pagination of a single collection
///
/// These never abort an audit. The caller turns them into warnings for the
/// entity whose collection was being listed.
#[derive(Error, Debug)]
pub enum FetchError {
    /// Connection, DNS or body transfer failure
    #[error("Request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// No response within the configured timeout
    #[error("Request to {url} timed out")]
    Timeout { url: String },

    /// Server answered with a non-2xx status
    #[error("HTTP {status} from {url}")]
    Status { url: String, status: u16 },

    /// Body was not the expected JSON array
    #[error("Failed to decode response from {url}: {source}")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// Endpoint or continuation link was not a valid URL
    #[error("Invalid request URL: {0}")]
    InvalidUrl(String),

    /// Pagination ran past the configured page ceiling
    #[error("Stopped after {limit} pages of {url}")]
    PageLimit { url: String, limit: u32 },

    /// Next link points at a different scheme, host or port than the API
    #[error("Refusing to follow next link to {url}: not on {expected}")]
    ForeignLink { url: String, expected: String },

    /// Audit was cancelled before the collection finished
    #[error("Cancelled while fetching {url}")]
    Cancelled { url: String },
}

impl FetchError {
    /// Classify a reqwest error raised while sending or reading a request
    pub(crate) fn from_reqwest(url: &str, source: reqwest::Error) -> Self {
        if source.is_timeout() {
            Self::Timeout {
                url: url.to_string(),
            }
        } else {
            Self::Transport {
                url: url.to_string(),
                source,
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled { .. })
    }

    /// HTTP status code, when the failure was a non-2xx response
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
