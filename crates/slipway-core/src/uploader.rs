//! Sequential uploader: one task at a time, each wrapped in the retry
//! policy. A failed item is recorded and does not abort its siblings.

use crate::retry::{run_with_retry, RetryPolicy};
use crate::stage::UploadTask;
use crate::store::{content_type_for, ObjectStore};
use anyhow::Result;
use sha2::{Digest, Sha256};

/// Outcome of one upload task.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    pub key: String,
    pub size: u64,
    pub sha256: String,
    /// None on success; the final error rendered as text otherwise.
    pub error: Option<String>,
}

impl UploadOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

/// Per-item results for a whole run, in task order.
#[derive(Debug, Default)]
pub struct UploadReport {
    pub items: Vec<UploadOutcome>,
}

impl UploadReport {
    pub fn failed_count(&self) -> usize {
        self.items.iter().filter(|i| !i.succeeded()).count()
    }

    pub fn all_succeeded(&self) -> bool {
        self.failed_count() == 0
    }
}

pub fn sha256_hex(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    hex::encode(hasher.finalize())
}

/// Upload every task in order. Local read failures and exhausted retries
/// both become item-level failures; the report carries the full picture.
pub async fn upload_all<S: ObjectStore + ?Sized>(
    store: &S,
    policy: &RetryPolicy,
    tasks: &[UploadTask],
) -> Result<UploadReport> {
    let mut report = UploadReport::default();

    for task in tasks {
        let outcome = upload_one(store, policy, task).await;
        match &outcome.error {
            None => tracing::info!("uploaded {} ({} bytes)", outcome.key, outcome.size),
            Some(err) => tracing::warn!("upload of {} failed: {}", outcome.key, err),
        }
        report.items.push(outcome);
    }

    Ok(report)
}

async fn upload_one<S: ObjectStore + ?Sized>(
    store: &S,
    policy: &RetryPolicy,
    task: &UploadTask,
) -> UploadOutcome {
    let bytes = match tokio::fs::read(&task.local_path).await {
        Ok(bytes) => bytes,
        Err(err) => {
            return UploadOutcome {
                key: task.key.clone(),
                size: task.size,
                sha256: String::new(),
                error: Some(format!("read {}: {}", task.local_path.display(), err)),
            }
        }
    };

    let digest = sha256_hex(&bytes);
    let content_type = content_type_for(&task.key);
    let result = run_with_retry(policy, || store.put(&task.key, &bytes, content_type)).await;

    UploadOutcome {
        key: task.key.clone(),
        size: bytes.len() as u64,
        sha256: digest,
        error: result.err().map(|e| e.to_string()),
    }
}
