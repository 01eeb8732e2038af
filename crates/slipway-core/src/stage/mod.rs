//! File staging: walk a project tree and bucket files into upload tasks.
//!
//! Files under the build-output marker become "artifact" tasks with the
//! marker segment stripped from their destination key; everything else
//! becomes a "source" task keyed by its full relative path. Symlinks are
//! never followed or listed, excluded directory names are skipped before
//! any size check, and oversized files are dropped with one warning each.

mod walk;

#[cfg(test)]
mod tests;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Staging rules for one run.
#[derive(Debug, Clone)]
pub struct StageOptions {
    /// Root of the project tree.
    pub root: PathBuf,
    /// Directory names skipped entirely (e.g. dependency caches).
    pub exclude_dirs: Vec<String>,
    /// Files larger than this are skipped with a warning.
    pub max_file_bytes: u64,
    /// Path segment that marks build output. Matched against whole
    /// directory segments, never the file name itself.
    pub output_marker: String,
}

/// One file to upload: local path, destination key, size in bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadTask {
    pub local_path: PathBuf,
    pub key: String,
    pub size: u64,
}

/// Result of a staging run: two ordered task lists plus warnings.
/// Ordering follows the name-sorted directory walk, stable within one run.
#[derive(Debug, Default)]
pub struct StagePlan {
    /// Built output, keyed with the marker segment stripped.
    pub artifacts: Vec<UploadTask>,
    /// Original sources, keyed by full relative path.
    pub sources: Vec<UploadTask>,
    /// One entry per skipped-for-size file.
    pub warnings: Vec<String>,
}

impl StagePlan {
    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty() && self.sources.is_empty()
    }

    pub fn task_count(&self) -> usize {
        self.artifacts.len() + self.sources.len()
    }
}

/// Walk `opts.root` and classify every regular file into an upload task.
pub fn stage(opts: &StageOptions) -> Result<StagePlan> {
    let marker = opts.output_marker.trim_matches('/');
    let mut plan = StagePlan::default();

    let files = walk::walk_files(&opts.root, &opts.exclude_dirs)
        .with_context(|| format!("failed to walk {}", opts.root.display()))?;

    for (path, size) in files {
        let rel = path
            .strip_prefix(&opts.root)
            .with_context(|| format!("walked path {} is outside root", path.display()))?;
        if size > opts.max_file_bytes {
            plan.warnings.push(format!(
                "skipping {} ({} bytes exceeds {} byte limit)",
                rel.display(),
                size,
                opts.max_file_bytes
            ));
            continue;
        }
        match destination_key(rel, marker) {
            Destination::Artifact(key) => plan.artifacts.push(UploadTask {
                local_path: path,
                key,
                size,
            }),
            Destination::Source(key) => plan.sources.push(UploadTask {
                local_path: path,
                key,
                size,
            }),
        }
    }

    tracing::debug!(
        "staged {} artifacts, {} sources, {} warnings under {}",
        plan.artifacts.len(),
        plan.sources.len(),
        plan.warnings.len(),
        opts.root.display()
    );
    Ok(plan)
}

enum Destination {
    Artifact(String),
    Source(String),
}

/// Compute the destination key for a relative path. If a directory segment
/// equals the marker, that segment is removed exactly once (first match)
/// and the file routes to the artifact list.
fn destination_key(rel: &Path, marker: &str) -> Destination {
    let segments: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    // The final component is the file name; only directory segments can
    // match the marker (a file literally named "dist" is still a source).
    let dir_count = segments.len().saturating_sub(1);
    let hit = (!marker.is_empty())
        .then(|| segments[..dir_count].iter().position(|s| s == marker))
        .flatten();

    match hit {
        Some(i) => {
            let mut kept = segments;
            kept.remove(i);
            Destination::Artifact(kept.join("/"))
        }
        None => Destination::Source(segments.join("/")),
    }
}
