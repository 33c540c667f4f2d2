use thiserror::Error;

/// Error type shared by every fallible operation in the crate.
///
/// Failures local to one unit of work (a row, a page past the first, a single
/// ticker lookup) are absorbed and counted by the stage that owns them; only
/// failures that make the whole run infeasible surface as an `IrError`.
#[derive(Debug, Error)]
pub enum IrError {
    /// Transport-level failure from the HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A base URL override or a built request URL failed to parse.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// A response body could not be decoded as JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Any unsuccessful status not covered by a more specific variant.
    #[error("Unexpected response status: {status} at {url}")]
    Status {
        /// The HTTP status code.
        status: u16,
        /// The URL that returned the error.
        url: String,
    },

    /// The server returned 404 for the requested resource.
    #[error("Resource not found at {url}")]
    NotFound {
        /// The URL that returned 404.
        url: String,
    },

    /// The server returned 429 after all retries were exhausted.
    #[error("Rate limited at {url}")]
    RateLimited {
        /// The URL that returned 429.
        url: String,
    },

    /// The server returned a 5xx status after all retries were exhausted.
    #[error("Server error: {status} at {url}")]
    ServerError {
        /// The HTTP status code.
        status: u16,
        /// The URL that returned the error.
        url: String,
    },

    /// The screener source could not be reached at all: the very first page
    /// request failed, so there is no partial data to return.
    #[error("Screener source unavailable: {0}")]
    SourceUnavailable(String),

    /// The data received was in an unexpected format or missed a required field.
    #[error("Data format unexpected or missing field: {0}")]
    Data(String),

    /// An invalid configuration was supplied (e.g. a negative factor weight).
    /// Rejected before any network activity occurs.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// No valid transactions survived normalization; there is nothing to rank.
    #[error("no valid rows after normalization")]
    EmptyRun,
}
