//! `slipway pull-schema` – refresh the local schema from the live database.

use anyhow::Result;
use slipway_core::config::SlipwayConfig;
use slipway_core::schema::pull_schema;

pub async fn run_pull_schema(cfg: &SlipwayConfig) -> Result<()> {
    let stdout = pull_schema(&cfg.schema).await?;
    if !stdout.is_empty() {
        print!("{stdout}");
    }
    println!("Schema pull complete.");
    Ok(())
}
