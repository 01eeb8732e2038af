//! Classify HTTP status, reqwest and IO errors into retry policy error kinds.

use super::error::UploadError;
use super::policy::ErrorKind;

/// Classify an HTTP status code for retry decisions.
pub fn classify_http_status(code: u16) -> ErrorKind {
    match code {
        429 | 503 => ErrorKind::Throttled,
        408 => ErrorKind::Timeout,
        500..=599 => ErrorKind::Http5xx(code),
        _ => ErrorKind::Other,
    }
}

/// Classify an IO error (local reads are not retried; socket-level kinds are).
pub fn classify_io_error(err: &std::io::Error) -> ErrorKind {
    use std::io::ErrorKind as Io;
    match err.kind() {
        Io::TimedOut => ErrorKind::Timeout,
        Io::ConnectionRefused
        | Io::ConnectionReset
        | Io::ConnectionAborted
        | Io::NotConnected
        | Io::BrokenPipe => ErrorKind::Connection,
        _ => ErrorKind::Other,
    }
}

/// Classify an upload error into a retry error kind.
pub fn classify(err: &UploadError) -> ErrorKind {
    match err {
        UploadError::Http(code) => classify_http_status(*code),
        UploadError::Network(e) => {
            if e.is_timeout() {
                ErrorKind::Timeout
            } else if let Some(status) = e.status() {
                classify_http_status(status.as_u16())
            } else if e.is_connect() || e.is_request() || e.is_body() {
                ErrorKind::Connection
            } else {
                ErrorKind::Other
            }
        }
        UploadError::Read(e) => classify_io_error(e),
        UploadError::Key(_) => ErrorKind::Other,
    }
}
