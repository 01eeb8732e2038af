//! `slipway status <id>` – one status fetch, printed.

use anyhow::{Context, Result};
use slipway_core::config::SlipwayConfig;
use slipway_core::platform::PlatformClient;

pub async fn run_status(cfg: &SlipwayConfig, id: &str) -> Result<()> {
    let token = cfg
        .secrets
        .platform_token
        .clone()
        .context("SLIPWAY_API_TOKEN is not set")?;
    let client = PlatformClient::new(&cfg.platform, token)?;
    let state = client.deployment_status(id).await?;
    println!("{} {}", id, state.label());
    Ok(())
}
