//! Recursive directory walk with symlink and name exclusions.

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};

/// Enumerate regular files under `root`, depth-first in name-sorted order.
///
/// Symlinks are skipped unconditionally (no cycles, no traversal outside
/// the root); directories whose name appears in `exclude_dirs` are skipped
/// without descending.
pub(super) fn walk_files(root: &Path, exclude_dirs: &[String]) -> Result<Vec<(PathBuf, u64)>> {
    let mut out = Vec::new();
    walk_dir(root, exclude_dirs, &mut out)?;
    Ok(out)
}

fn walk_dir(dir: &Path, exclude_dirs: &[String], out: &mut Vec<(PathBuf, u64)>) -> Result<()> {
    let mut entries: Vec<_> = fs::read_dir(dir)
        .with_context(|| format!("failed to read directory {}", dir.display()))?
        .collect::<std::io::Result<_>>()?;
    entries.sort_by_key(|e| e.file_name());

    for entry in entries {
        let path = entry.path();
        // symlink_metadata never follows the link.
        let meta = fs::symlink_metadata(&path)
            .with_context(|| format!("failed to stat {}", path.display()))?;
        if meta.file_type().is_symlink() {
            tracing::debug!("skipping symlink {}", path.display());
            continue;
        }
        if meta.is_dir() {
            let name = entry.file_name();
            let excluded = exclude_dirs.iter().any(|d| d.as_str() == name);
            if excluded {
                tracing::debug!("skipping excluded directory {}", path.display());
                continue;
            }
            walk_dir(&path, exclude_dirs, out)?;
        } else if meta.is_file() {
            out.push((path, meta.len()));
        }
        // Anything else (fifo, socket, device) is ignored.
    }
    Ok(())
}
