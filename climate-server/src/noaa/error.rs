//! Upstream feed error types.

/// Errors that can occur while fetching a NOAA feed.
///
/// Row-level format problems are not errors: they are skipped and counted
/// by the parsers instead.
#[derive(Debug, thiserror::Error)]
pub enum FeedError {
    /// The HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// The configured base URL cannot have feed paths appended
    #[error("invalid base URL {url}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },

    /// Request failed before a response arrived (connection, timeout, ...)
    #[error("network error fetching {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Upstream answered with a non-success status
    #[error("{url} not available (status {status})")]
    Status { url: String, status: u16 },

    /// Response body could not be read to the end
    #[error("failed to read {url}: {source}")]
    Io {
        url: String,
        #[source]
        source: std::io::Error,
    },
}

impl FeedError {
    /// The upstream status code, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            FeedError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}
