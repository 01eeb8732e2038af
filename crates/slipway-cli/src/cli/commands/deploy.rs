//! `slipway deploy` – stage, upload, create a deployment, wait for it.

use anyhow::{bail, Context, Result};
use slipway_core::archive;
use slipway_core::config::{SlipwayConfig, UploadMode};
use slipway_core::platform::{
    DeployManifest, DeploymentProbe, ManifestEntry, PlatformClient,
};
use slipway_core::poll::{poll_until_terminal, PollError, PollPolicy};
use slipway_core::retry::RetryPolicy;
use slipway_core::stage::{stage, StageOptions, StagePlan, UploadTask};
use slipway_core::store::HttpObjectStore;
use slipway_core::uploader::{upload_all, UploadReport};
use std::path::PathBuf;

pub async fn run_deploy(
    cfg: &SlipwayConfig,
    root: Option<PathBuf>,
    archive_flag: bool,
    no_wait: bool,
) -> Result<()> {
    let root = match root {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    let plan = stage(&StageOptions {
        root: root.clone(),
        exclude_dirs: cfg.build.exclude_dirs.clone(),
        max_file_bytes: cfg.build.max_file_bytes,
        output_marker: cfg.build.output_marker.clone(),
    })?;
    for warning in &plan.warnings {
        eprintln!("warning: {warning}");
    }
    if plan.is_empty() {
        bail!("nothing to deploy under {}", root.display());
    }
    println!(
        "Staged {} artifacts and {} sources.",
        plan.artifacts.len(),
        plan.sources.len()
    );

    let token = cfg
        .secrets
        .platform_token
        .clone()
        .context("SLIPWAY_API_TOKEN is not set")?;
    let store = HttpObjectStore::new(&cfg.store, cfg.secrets.store_token.clone())?;
    let policy = cfg
        .retry
        .as_ref()
        .map(RetryPolicy::from)
        .unwrap_or_default();

    let archive_mode = archive_flag || cfg.build.upload_mode == UploadMode::Archive;
    let mut manifest = DeployManifest {
        files: Vec::new(),
        archive: None,
    };

    // Artifacts always go up one object per file.
    let report = upload_all(&store, &policy, &plan.artifacts).await?;
    check_report(&report, "artifact")?;
    manifest.files.extend(entries(&report));

    if archive_mode {
        manifest.archive = Some(upload_source_archive(cfg, &root, &plan, &store, &policy).await?);
    } else {
        let report = upload_all(&store, &policy, &plan.sources).await?;
        check_report(&report, "source")?;
        manifest.files.extend(entries(&report));
    }

    let client = PlatformClient::new(&cfg.platform, token)?;
    let deployment = client.create_deployment(&manifest).await?;
    println!("Created deployment {}.", deployment.id);

    if no_wait {
        println!("Not waiting; check later with: slipway status {}", deployment.id);
        return Ok(());
    }

    let poll_policy = PollPolicy::from(&cfg.poll);
    let mut probe = DeploymentProbe::new(&client, deployment.id.clone());
    match poll_until_terminal(&poll_policy, &mut probe).await {
        Ok(()) => {
            println!("Deployment {} is ready.", deployment.id);
            Ok(())
        }
        Err(PollError::Failed {
            status,
            diagnostics,
        }) => {
            if let Some(logs) = diagnostics {
                eprintln!("--- build logs ---\n{logs}");
            }
            bail!("deployment {} ended in state '{}'", deployment.id, status);
        }
        Err(PollError::TimedOut { attempts }) => {
            // Ambiguous: the build may still finish. Do not report failure.
            bail!(
                "deployment {} was not terminal after {} checks; inspect it with: slipway status {}",
                deployment.id,
                attempts,
                deployment.id
            );
        }
        Err(err @ PollError::Fetch(_)) => Err(err.into()),
    }
}

fn check_report(report: &UploadReport, what: &str) -> Result<()> {
    if !report.all_succeeded() {
        bail!(
            "{} of {} {} uploads failed; deployment not created",
            report.failed_count(),
            report.items.len(),
            what
        );
    }
    Ok(())
}

fn entries(report: &UploadReport) -> Vec<ManifestEntry> {
    report
        .items
        .iter()
        .map(|item| ManifestEntry {
            key: item.key.clone(),
            size: item.size,
            sha256: item.sha256.clone(),
        })
        .collect()
}

async fn upload_source_archive(
    cfg: &SlipwayConfig,
    root: &std::path::Path,
    plan: &StagePlan,
    store: &HttpObjectStore,
    policy: &RetryPolicy,
) -> Result<String> {
    let bundle = archive::bundle_sources(root, &plan.sources).await?;
    let size = std::fs::metadata(&bundle.tarball)?.len();
    let key = format!("{}/source.tar.gz", cfg.platform.project);
    let task = UploadTask {
        local_path: bundle.tarball.clone(),
        key: key.clone(),
        size,
    };

    let report = upload_all(store, policy, std::slice::from_ref(&task)).await?;
    check_report(&report, "archive")?;
    tracing::debug!("source archive sha256 {}", report.items[0].sha256);
    Ok(key)
}
