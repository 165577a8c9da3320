//! Typed errors for the discovery library.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to provide
//! strongly-typed, composable error handling. Per-request failures
//! (fetch, extract) are contained inside the connector loop and never
//! propagate to the caller; only lifecycle misuse surfaces as a return
//! value.

use thiserror::Error;

/// Lifecycle errors surfaced to callers of [`Connector::start`].
///
/// [`Connector::start`]: crate::worker::Connector::start
#[derive(Debug, Error)]
pub enum WorkerError {
    /// The connector's processing loop was already started
    #[error("connector already started: {source_name}")]
    AlreadyStarted {
        /// Display name of the offending connector
        source_name: String,
    },
}

/// Errors surfaced by a [`Fetcher`] implementation.
///
/// [`Fetcher`]: crate::fetch::Fetcher
#[derive(Debug, Error)]
pub enum FetchError {
    /// Transport-level failure
    #[error("HTTP error: {0}")]
    Http(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Non-success HTTP status
    #[error("HTTP status {status} for {url}")]
    Status {
        /// The status code received
        status: u16,
        /// The URL that was fetched
        url: String,
    },

    /// Request timed out
    #[error("timeout fetching: {url}")]
    Timeout {
        /// The URL that timed out
        url: String,
    },

    /// URL could not be parsed into a request
    #[error("invalid URL: {url}")]
    InvalidUrl {
        /// The offending URL
        url: String,
    },
}

/// Errors produced while extracting findings from a raw payload.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The source's own success indicator signaled no data.
    ///
    /// A normal "no data for this domain" outcome, not a connector fault;
    /// logged at lower severity than transport failures.
    #[error("source reported failure: {code}")]
    ReportedFailure {
        /// The indicator value the source returned
        code: String,
    },

    /// The payload failed structural parsing
    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Result type alias for fetch operations.
pub type FetchResult<T> = std::result::Result<T, FetchError>;

/// Result type alias for extraction operations.
pub type ExtractResult<T> = std::result::Result<T, ExtractError>;
