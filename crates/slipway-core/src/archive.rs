//! Source archive bundling via the external `tar` binary.

use crate::exec;
use crate::stage::UploadTask;
use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A staged source archive. The tarball lives inside `staging`; dropping
/// the bundle removes it.
pub struct SourceBundle {
    pub tarball: PathBuf,
    _staging: TempDir,
}

/// Bundle the source task list into one gzipped tar, rooted at `root`.
/// Paths are fed to tar via a list file so keys with spaces survive.
pub async fn bundle_sources(root: &Path, sources: &[UploadTask]) -> Result<SourceBundle> {
    if sources.is_empty() {
        bail!("nothing to bundle: source list is empty");
    }

    let staging = TempDir::new().context("failed to create archive staging dir")?;
    let list_path = staging.path().join("sources.list");
    let tarball = staging.path().join("source.tar.gz");

    let list = file_list(root, sources)?;
    tokio::fs::write(&list_path, list)
        .await
        .context("failed to write tar file list")?;

    let root_str = root.to_string_lossy();
    let tarball_str = tarball.to_string_lossy();
    let list_str = list_path.to_string_lossy();
    exec::run(
        "tar",
        [
            "-czf",
            tarball_str.as_ref(),
            "-C",
            root_str.as_ref(),
            "-T",
            list_str.as_ref(),
        ],
    )
    .await
    .context("tar invocation failed")?;

    tracing::info!("bundled {} source files into {}", sources.len(), tarball.display());
    Ok(SourceBundle {
        tarball,
        _staging: staging,
    })
}

/// Newline-separated paths relative to the archive root.
fn file_list(root: &Path, sources: &[UploadTask]) -> Result<String> {
    let mut list = String::new();
    for task in sources {
        let rel = task
            .local_path
            .strip_prefix(root)
            .with_context(|| format!("{} is outside {}", task.local_path.display(), root.display()))?;
        list.push_str(&rel.to_string_lossy());
        list.push('\n');
    }
    Ok(list)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn task(root: &Path, rel: &str) -> UploadTask {
        UploadTask {
            local_path: root.join(rel),
            key: rel.to_string(),
            size: 1,
        }
    }

    #[test]
    fn file_list_is_relative_to_root() {
        let root = Path::new("/proj");
        let list = file_list(
            root,
            &[task(root, "src/app.ts"), task(root, "package.json")],
        )
        .unwrap();
        assert_eq!(list, "src/app.ts\npackage.json\n");
    }

    #[test]
    fn file_outside_root_is_rejected() {
        let root = Path::new("/proj");
        let stray = UploadTask {
            local_path: PathBuf::from("/elsewhere/x.ts"),
            key: "x.ts".to_string(),
            size: 1,
        };
        assert!(file_list(root, &[stray]).is_err());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn bundles_real_files_with_system_tar() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("src")).unwrap();
        std::fs::write(root.join("src/app.ts"), b"export {}").unwrap();

        let bundle = bundle_sources(root, &[task(root, "src/app.ts")])
            .await
            .unwrap();
        let meta = std::fs::metadata(&bundle.tarball).unwrap();
        assert!(meta.len() > 0);
    }

    #[tokio::test]
    async fn empty_source_list_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        assert!(bundle_sources(dir.path(), &[]).await.is_err());
    }
}
