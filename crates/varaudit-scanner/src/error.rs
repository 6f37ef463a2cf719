//! Error types for the auditor

use thiserror::Error;
use varaudit_client::FetchError;

/// Result type for audit operations
pub type ScanResult<T> = Result<T, ScanError>;

/// Errors that end an audit
///
/// Failures below the top-level listings are warnings, not errors.
#[derive(Error, Debug)]
pub enum ScanError {
    /// A top-level listing returned nothing before failing
    #[error("Failed to list {collection}: {source}")]
    InitialListing {
        collection: &'static str,
        #[source]
        source: FetchError,
    },

    /// Failed to serialize the report
    #[error("Failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}
