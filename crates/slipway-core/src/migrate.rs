//! SQL migration runner over an external `psql`.
//!
//! The tracking table is append-only: filenames recorded there are never
//! reapplied. A failing migration stops the run but keeps the rows for the
//! ones already applied; the external tool commits per statement and this
//! runner deliberately does not try to roll that back.

use crate::config::MigrateConfig;
use crate::exec;
use anyhow::{Context, Result};
use std::collections::BTreeSet;
use std::fs;
use std::path::Path;

/// A migration that stopped the run.
#[derive(Debug, Clone)]
pub struct FailedMigration {
    pub filename: String,
    pub detail: String,
}

/// What one `migrate` run did.
#[derive(Debug, Default)]
pub struct MigrationReport {
    /// Filenames applied this run, in order.
    pub applied: Vec<String>,
    /// Filenames already recorded in the tracking table.
    pub already_applied: usize,
    /// Set when a migration failed; everything before it stays applied.
    pub failed: Option<FailedMigration>,
}

/// Apply every pending `*.sql` file in name order.
pub async fn run_migrations(cfg: &MigrateConfig, database_url: &str) -> Result<MigrationReport> {
    ensure_tracking_table(cfg, database_url).await?;

    let applied = applied_filenames(cfg, database_url).await?;
    let on_disk = migration_files(&cfg.migrations_dir)?;
    let pending = pending_migrations(&on_disk, &applied);

    let mut report = MigrationReport {
        already_applied: on_disk.len() - pending.len(),
        ..Default::default()
    };

    for filename in pending {
        let path = cfg.migrations_dir.join(&filename);
        let path_str = path.to_string_lossy();
        tracing::info!("applying migration {filename}");
        let result = exec::run(
            &cfg.psql_bin,
            [
                database_url,
                "-v",
                "ON_ERROR_STOP=1",
                "-f",
                path_str.as_ref(),
            ],
        )
        .await;

        match result {
            Ok(_) => {
                record_applied(cfg, database_url, &filename).await?;
                report.applied.push(filename);
            }
            Err(err) => {
                report.failed = Some(FailedMigration {
                    filename,
                    detail: err.to_string(),
                });
                break;
            }
        }
    }

    Ok(report)
}

async fn ensure_tracking_table(cfg: &MigrateConfig, database_url: &str) -> Result<()> {
    let ddl = format!(
        "CREATE TABLE IF NOT EXISTS {} (filename text PRIMARY KEY, applied_at timestamptz NOT NULL DEFAULT now())",
        cfg.tracking_table
    );
    exec::run(
        &cfg.psql_bin,
        [database_url, "-v", "ON_ERROR_STOP=1", "-c", ddl.as_str()],
    )
    .await
    .context("failed to ensure migration tracking table")?;
    Ok(())
}

/// Read every recorded filename once, up front.
async fn applied_filenames(cfg: &MigrateConfig, database_url: &str) -> Result<BTreeSet<String>> {
    let query = format!("SELECT filename FROM {} ORDER BY filename", cfg.tracking_table);
    let out = exec::run(&cfg.psql_bin, [database_url, "-tA", "-c", query.as_str()])
        .await
        .context("failed to read migration tracking table")?;
    Ok(parse_filename_rows(&out.stdout))
}

async fn record_applied(cfg: &MigrateConfig, database_url: &str, filename: &str) -> Result<()> {
    let insert = format!(
        "INSERT INTO {} (filename) VALUES ('{}')",
        cfg.tracking_table,
        sql_escape(filename)
    );
    exec::run(
        &cfg.psql_bin,
        [database_url, "-v", "ON_ERROR_STOP=1", "-c", insert.as_str()],
    )
    .await
    .with_context(|| format!("failed to record migration {filename}"))?;
    Ok(())
}

/// `*.sql` files in the migrations directory, name-sorted.
fn migration_files(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    let entries =
        fs::read_dir(dir).with_context(|| format!("failed to read {}", dir.display()))?;
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.ends_with(".sql") && entry.file_type()?.is_file() {
            names.push(name);
        }
    }
    names.sort();
    Ok(names)
}

/// Files on disk minus files already recorded, preserving disk order.
fn pending_migrations(on_disk: &[String], applied: &BTreeSet<String>) -> Vec<String> {
    on_disk
        .iter()
        .filter(|name| !applied.contains(*name))
        .cloned()
        .collect()
}

/// Parse `psql -tA` output: one filename per line, blanks ignored.
fn parse_filename_rows(stdout: &str) -> BTreeSet<String> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty())
        .map(str::to_string)
        .collect()
}

/// Double single quotes for a SQL string literal.
fn sql_escape(s: &str) -> String {
    s.replace('\'', "''")
}
