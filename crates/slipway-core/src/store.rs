//! Object store client: keyed overwrites into an S3-compatible bucket.

use crate::config::StoreConfig;
use crate::retry::UploadError;
use anyhow::{Context, Result};
use async_trait::async_trait;
use url::Url;

/// A destination for keyed object writes. `put` must be an idempotent
/// overwrite: the retry fragment may repeat a partially applied write.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), UploadError>;
}

/// HTTP implementation: `PUT {endpoint}/{bucket}/{key}`.
pub struct HttpObjectStore {
    http: reqwest::Client,
    endpoint: Url,
    bucket: String,
    token: Option<String>,
}

impl HttpObjectStore {
    pub fn new(cfg: &StoreConfig, token: Option<String>) -> Result<Self> {
        let endpoint = Url::parse(&cfg.endpoint)
            .with_context(|| format!("invalid object store endpoint: {}", cfg.endpoint))?;
        Ok(Self {
            http: reqwest::Client::new(),
            endpoint,
            bucket: cfg.bucket.clone(),
            token,
        })
    }

    fn object_url(&self, key: &str) -> Result<Url, UploadError> {
        let path = format!("{}/{}", self.bucket, key.trim_start_matches('/'));
        self.endpoint
            .join(&path)
            .map_err(|_| UploadError::Key(key.to_string()))
    }
}

#[async_trait]
impl ObjectStore for HttpObjectStore {
    async fn put(&self, key: &str, bytes: &[u8], content_type: &str) -> Result<(), UploadError> {
        let url = self.object_url(key)?;
        let mut req = self
            .http
            .put(url)
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes.to_vec());
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }
        let resp = req.send().await?;
        if !resp.status().is_success() {
            return Err(UploadError::Http(resp.status().as_u16()));
        }
        Ok(())
    }
}

/// Guess a content type from the destination key's extension.
pub fn content_type_for(key: &str) -> &'static str {
    let ext = key.rsplit('.').next().unwrap_or("");
    match ext {
        "html" | "htm" => "text/html",
        "css" => "text/css",
        "js" | "mjs" => "application/javascript",
        "json" | "map" => "application/json",
        "svg" => "image/svg+xml",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "ico" => "image/x-icon",
        "txt" => "text/plain",
        "xml" => "application/xml",
        "wasm" => "application/wasm",
        "woff" => "font/woff",
        "woff2" => "font/woff2",
        "gz" | "tgz" => "application/gzip",
        _ => "application/octet-stream",
    }
}
