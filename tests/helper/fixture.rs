//! Package tree fixtures on disk

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::json;
use tempfile::TempDir;

use version_check::config::DEFAULT_MANIFEST_NAME;

/// Write a manifest for `name` into `<root>/<name>/versioncheck.json`
pub fn write_manifest(root: &Path, name: &str, version: &str, depends: &[(&str, &str)]) -> PathBuf {
    let dir = root.join(name);
    fs::create_dir_all(&dir).unwrap();

    let depends: Vec<_> = depends
        .iter()
        .map(|(dep, constraint)| json!({ "name": dep, "version": constraint }))
        .collect();
    let manifest = json!({
        "name": name,
        "version": version,
        "depends": depends,
    });

    let path = dir.join(DEFAULT_MANIFEST_NAME);
    fs::write(&path, serde_json::to_string_pretty(&manifest).unwrap()).unwrap();
    path
}

/// The `a -> b -> c` tree, with `c` at the given version
pub fn abc_tree(c_version: &str) -> TempDir {
    let dir = TempDir::new().unwrap();
    write_manifest(dir.path(), "a", "0.1.0", &[("b", ">=0.1.0")]);
    write_manifest(dir.path(), "b", "0.1.0", &[("c", ">=0.1.0")]);
    write_manifest(dir.path(), "c", c_version, &[]);
    dir
}
