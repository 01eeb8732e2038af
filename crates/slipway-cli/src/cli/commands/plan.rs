//! `slipway plan` – show what a deploy would upload, without the network.

use anyhow::Result;
use slipway_core::config::SlipwayConfig;
use slipway_core::stage::{stage, StageOptions, UploadTask};
use std::path::PathBuf;

pub fn run_plan(cfg: &SlipwayConfig, root: Option<PathBuf>) -> Result<()> {
    let root = match root {
        Some(dir) => dir,
        None => std::env::current_dir()?,
    };

    let plan = stage(&StageOptions {
        root,
        exclude_dirs: cfg.build.exclude_dirs.clone(),
        max_file_bytes: cfg.build.max_file_bytes,
        output_marker: cfg.build.output_marker.clone(),
    })?;

    print_tasks("ARTIFACT", &plan.artifacts);
    print_tasks("SOURCE", &plan.sources);
    for warning in &plan.warnings {
        println!("{:<10} {}", "SKIPPED", warning);
    }
    println!(
        "{} files to upload, {} skipped.",
        plan.task_count(),
        plan.warnings.len()
    );
    Ok(())
}

fn print_tasks(category: &str, tasks: &[UploadTask]) {
    for task in tasks {
        println!("{:<10} {:<12} {}", category, task.size, task.key);
    }
}
