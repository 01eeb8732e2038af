//! Platform API client: create deployments, fetch status, fetch build logs.

mod types;

pub use types::{DeployManifest, DeployState, Deployment, ManifestEntry};

use crate::config::PlatformConfig;
use crate::poll::{Observation, StatusProbe};
use anyhow::{Context, Result};
use async_trait::async_trait;
use url::Url;

/// JSON client for the hosted build platform.
pub struct PlatformClient {
    http: reqwest::Client,
    base: Url,
    project: String,
    token: String,
}

impl PlatformClient {
    pub fn new(cfg: &PlatformConfig, token: String) -> Result<Self> {
        let base = Url::parse(&cfg.base_url)
            .with_context(|| format!("invalid platform base URL: {}", cfg.base_url))?;
        Ok(Self {
            http: reqwest::Client::new(),
            base,
            project: cfg.project.clone(),
            token,
        })
    }

    fn endpoint(&self, suffix: &str) -> Result<Url> {
        let path = format!("v1/projects/{}/{}", self.project, suffix);
        self.base
            .join(&path)
            .with_context(|| format!("failed to build endpoint URL for {path}"))
    }

    /// Register a new deployment for the uploaded objects. Returns the
    /// provider-assigned handle.
    pub async fn create_deployment(&self, manifest: &DeployManifest) -> Result<Deployment> {
        let url = self.endpoint("deployments")?;
        let resp = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(manifest)
            .send()
            .await
            .context("create deployment request failed")?;
        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("create deployment returned HTTP {status}: {body}");
        }
        let deployment: Deployment = resp
            .json()
            .await
            .context("create deployment response was not valid JSON")?;
        tracing::info!("created deployment {}", deployment.id);
        Ok(deployment)
    }

    /// Re-fetch the current status of a deployment.
    pub async fn deployment_status(&self, id: &str) -> Result<DeployState> {
        let url = self.endpoint(&format!("deployments/{id}"))?;
        let resp = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .context("status request failed")?;
        if !resp.status().is_success() {
            anyhow::bail!("status request returned HTTP {}", resp.status());
        }
        let deployment: Deployment = resp
            .json()
            .await
            .context("status response was not valid JSON")?;
        Ok(deployment.status)
    }

    /// Fetch build logs for a deployment (used as failure diagnostics).
    pub async fn build_logs(&self, id: &str) -> Result<String> {
        let url = self.endpoint(&format!("deployments/{id}/logs"))?;
        let resp = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await
            .context("log request failed")?;
        if !resp.status().is_success() {
            anyhow::bail!("log request returned HTTP {}", resp.status());
        }
        resp.text().await.context("log body was not readable")
    }
}

/// Poll probe for one deployment id.
pub struct DeploymentProbe<'a> {
    client: &'a PlatformClient,
    id: String,
}

impl<'a> DeploymentProbe<'a> {
    pub fn new(client: &'a PlatformClient, id: impl Into<String>) -> Self {
        Self {
            client,
            id: id.into(),
        }
    }
}

#[async_trait]
impl StatusProbe for DeploymentProbe<'_> {
    async fn fetch(&mut self) -> Result<Observation> {
        let state = self.client.deployment_status(&self.id).await?;
        Ok(state.observe())
    }

    async fn diagnostics(&mut self) -> Option<String> {
        match self.client.build_logs(&self.id).await {
            Ok(logs) if !logs.is_empty() => Some(logs),
            Ok(_) => None,
            Err(err) => {
                tracing::warn!("diagnostic log fetch failed: {err:#}");
                None
            }
        }
    }
}
