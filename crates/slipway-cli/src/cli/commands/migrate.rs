//! `slipway migrate` – apply pending SQL migrations via psql.

use anyhow::{bail, Context, Result};
use slipway_core::config::SlipwayConfig;
use slipway_core::migrate::run_migrations;

pub async fn run_migrate(cfg: &SlipwayConfig) -> Result<()> {
    let database_url = cfg
        .secrets
        .database_url
        .clone()
        .context("DATABASE_URL is not set")?;

    let report = run_migrations(&cfg.migrate, &database_url).await?;

    for filename in &report.applied {
        println!("applied {filename}");
    }
    if report.applied.is_empty() && report.failed.is_none() {
        println!(
            "Nothing to do ({} migrations already applied).",
            report.already_applied
        );
    }

    if let Some(failed) = report.failed {
        // Earlier migrations stay recorded; psql commits per statement and
        // the failing file's partial effects are left to the operator.
        bail!(
            "migration {} failed after {} applied: {}",
            failed.filename,
            report.applied.len(),
            failed.detail
        );
    }
    Ok(())
}
