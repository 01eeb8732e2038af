use super::*;
use std::fs;
use tempfile::tempdir;

fn opts(root: &Path) -> StageOptions {
    StageOptions {
        root: root.to_path_buf(),
        exclude_dirs: vec!["node_modules".to_string()],
        max_file_bytes: 1024 * 1024,
        output_marker: "dist".to_string(),
    }
}

fn write(root: &Path, rel: &str, bytes: usize) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, vec![b'x'; bytes]).unwrap();
}

fn keys(tasks: &[UploadTask]) -> Vec<&str> {
    tasks.iter().map(|t| t.key.as_str()).collect()
}

#[test]
fn worked_example_buckets_and_exclusions() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "dist/index.html", 10);
    write(root, "src/app.ts", 20);
    // Huge, but inside an excluded directory: name exclusion wins before
    // the size check, so no warning is recorded.
    write(root, "node_modules/x/y.js", 2 * 1024 * 1024);
    #[cfg(unix)]
    std::os::unix::fs::symlink(root.join("src/app.ts"), root.join("link")).unwrap();

    let plan = stage(&opts(root)).unwrap();
    assert_eq!(keys(&plan.artifacts), ["index.html"]);
    assert_eq!(keys(&plan.sources), ["src/app.ts"]);
    assert!(plan.warnings.is_empty());

    let artifact = &plan.artifacts[0];
    assert_eq!(artifact.size, 10);
    assert_eq!(artifact.local_path, root.join("dist/index.html"));
}

#[test]
fn oversized_files_get_one_warning_each_and_no_task() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "src/ok.ts", 100);
    write(root, "assets/big.bin", 2048);
    write(root, "dist/huge.map", 4096);

    let mut o = opts(root);
    o.max_file_bytes = 1024;
    let plan = stage(&o).unwrap();

    assert_eq!(keys(&plan.sources), ["src/ok.ts"]);
    assert!(plan.artifacts.is_empty());
    assert_eq!(plan.warnings.len(), 2);
    assert!(plan.warnings.iter().any(|w| w.contains("assets/big.bin")));
    assert!(plan.warnings.iter().any(|w| w.contains("huge.map")));
}

#[cfg(unix)]
#[test]
fn symlinked_directories_are_not_followed() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "real/file.txt", 5);
    std::os::unix::fs::symlink(root.join("real"), root.join("alias")).unwrap();

    let plan = stage(&opts(root)).unwrap();
    assert_eq!(keys(&plan.sources), ["real/file.txt"]);
}

#[test]
fn marker_segment_is_stripped_exactly_once() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "packages/app/dist/js/main.js", 8);
    write(root, "dist/dist/nested.css", 8);

    let plan = stage(&opts(root)).unwrap();
    let mut got = keys(&plan.artifacts);
    got.sort();
    assert_eq!(got, ["dist/nested.css", "packages/app/js/main.js"]);
}

#[test]
fn file_named_like_marker_stays_a_source() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "tools/dist", 8);

    let plan = stage(&opts(root)).unwrap();
    assert!(plan.artifacts.is_empty());
    assert_eq!(keys(&plan.sources), ["tools/dist"]);
}

#[test]
fn walk_order_is_stable_within_a_run() {
    let dir = tempdir().unwrap();
    let root = dir.path();
    write(root, "b.txt", 1);
    write(root, "a.txt", 1);
    write(root, "c/inner.txt", 1);

    let first = stage(&opts(root)).unwrap();
    let second = stage(&opts(root)).unwrap();
    assert_eq!(keys(&first.sources), keys(&second.sources));
    assert_eq!(keys(&first.sources), ["a.txt", "b.txt", "c/inner.txt"]);
}

#[test]
fn empty_root_yields_empty_plan() {
    let dir = tempdir().unwrap();
    let plan = stage(&opts(dir.path())).unwrap();
    assert!(plan.is_empty());
    assert_eq!(plan.task_count(), 0);
    assert!(plan.warnings.is_empty());
}
