//! Retry and backoff policy for single-object uploads.
//!
//! This module encapsulates error classification (timeouts, throttling,
//! connection failures) and exponential backoff decisions so that the
//! uploader can apply a consistent per-item policy. The wrapped operation
//! must be idempotent (a keyed overwrite): repetition is guaranteed,
//! exactly-once delivery is not.

mod classify;
mod error;
mod policy;
mod run;

pub use classify::{classify, classify_http_status, classify_io_error};
pub use error::UploadError;
pub use policy::{ErrorKind, RetryDecision, RetryPolicy};
pub use run::run_with_retry;
