//! Upload error type for retry classification.

use thiserror::Error;

/// Error returned by a single object upload (transport failure, HTTP error,
/// or local read failure). Kept concrete so we can classify and decide
/// retries before converting to anyhow.
#[derive(Debug, Error)]
pub enum UploadError {
    /// reqwest reported an error (timeout, connection, body, etc.).
    #[error(transparent)]
    Network(#[from] reqwest::Error),
    /// Object store responded with a non-2xx status.
    #[error("HTTP {0}")]
    Http(u16),
    /// Local file read failed. Not retried.
    #[error("read failed: {0}")]
    Read(#[from] std::io::Error),
    /// Destination key could not form a valid object URL. Not retried.
    #[error("invalid destination key: {0}")]
    Key(String),
}
