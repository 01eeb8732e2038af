//! `slipway logs <id>` – fetch build logs for a deployment.

use anyhow::{Context, Result};
use slipway_core::config::SlipwayConfig;
use slipway_core::platform::PlatformClient;

pub async fn run_logs(cfg: &SlipwayConfig, id: &str) -> Result<()> {
    let token = cfg
        .secrets
        .platform_token
        .clone()
        .context("SLIPWAY_API_TOKEN is not set")?;
    let client = PlatformClient::new(&cfg.platform, token)?;
    let logs = client.build_logs(id).await?;
    if logs.is_empty() {
        println!("No logs for deployment {id}.");
    } else {
        print!("{logs}");
    }
    Ok(())
}
