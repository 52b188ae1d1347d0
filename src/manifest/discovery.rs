//! Manifest discovery across one or more search roots

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

/// Build the list of search roots.
///
/// Roots come from the command line, then the environment, then the config
/// file. They are made absolute, and any root that sits inside another root
/// within `depth` levels is dropped since the outer search already covers
/// it. Returns `.` when nothing is configured.
pub fn construct_roots(
    cli_roots: &[PathBuf],
    env_roots: Option<OsString>,
    config_roots: &[PathBuf],
    depth: usize,
) -> Vec<PathBuf> {
    let env_roots: Vec<PathBuf> = env_roots
        .map(|value| std::env::split_paths(&value).collect())
        .unwrap_or_default();

    let mut roots: Vec<PathBuf> = cli_roots
        .iter()
        .chain(env_roots.iter())
        .chain(config_roots.iter())
        .filter(|root| !root.as_os_str().is_empty())
        .map(|root| std::path::absolute(root).unwrap_or_else(|_| root.clone()))
        .collect();

    roots.sort_by_key(|root| root.components().count());
    roots.dedup();

    let mut kept: Vec<PathBuf> = Vec::with_capacity(roots.len());
    for root in roots {
        let covered = kept.iter().any(|outer| {
            root.strip_prefix(outer)
                .is_ok_and(|rest| rest.components().count() < depth)
        });
        if covered {
            info!("Removing duplicate path {} from list of root paths", root.display());
        } else {
            kept.push(root);
        }
    }

    if kept.is_empty() {
        kept.push(PathBuf::from("."));
    }
    kept
}

/// Find all files named `file_name` at most `depth` directories below each root.
///
/// Directories under any blacklisted path are not entered. The result is
/// sorted and free of duplicates so loading order is stable.
pub fn find_manifests(
    roots: &[PathBuf],
    file_name: &str,
    depth: usize,
    blacklist: &[PathBuf],
) -> Vec<PathBuf> {
    info!("Searching {} roots", roots.len());

    let mut manifests = Vec::new();
    let mut dirs_checked = 0usize;

    for root in roots {
        debug!("path = {}", root.display());

        let walker = WalkDir::new(root)
            .max_depth(depth + 1)
            .follow_links(true)
            .into_iter()
            .filter_entry(|entry| !is_blacklisted(entry.path(), blacklist));

        for entry in walker.filter_map(|e| e.ok()) {
            if entry.file_type().is_dir() {
                dirs_checked += 1;
            } else if entry.file_name() == file_name {
                manifests.push(entry.into_path());
            }
        }
    }

    manifests.sort();
    manifests.dedup();

    info!(
        "Found {} package files in {} directories",
        manifests.len(),
        dirs_checked
    );
    manifests
}

fn is_blacklisted(path: &Path, blacklist: &[PathBuf]) -> bool {
    blacklist.iter().any(|blocked| path.starts_with(blocked))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "{}").unwrap();
    }

    #[test]
    fn construct_roots_defaults_to_current_dir() {
        assert_eq!(construct_roots(&[], None, &[], 3), vec![PathBuf::from(".")]);
    }

    #[test]
    fn construct_roots_merges_cli_env_and_config_roots() {
        let env = std::env::join_paths(["/work/env1", "/work/env2"]).unwrap();

        let roots = construct_roots(
            &[PathBuf::from("/work/cli")],
            Some(env),
            &[PathBuf::from("/srv/config")],
            1,
        );

        assert_eq!(
            roots,
            vec![
                PathBuf::from("/work/cli"),
                PathBuf::from("/work/env1"),
                PathBuf::from("/work/env2"),
                PathBuf::from("/srv/config"),
            ]
        );
    }

    #[test]
    fn construct_roots_drops_roots_covered_by_a_parent() {
        let roots = construct_roots(
            &[
                PathBuf::from("/work/a/b"),
                PathBuf::from("/work"),
                PathBuf::from("/work"),
                PathBuf::from("/work/a/b/c/d/e"),
            ],
            None,
            &[],
            3,
        );

        // /work/a/b is two levels below /work, /work/a/b/c/d/e is five
        assert_eq!(
            roots,
            vec![PathBuf::from("/work"), PathBuf::from("/work/a/b/c/d/e")]
        );
    }

    #[test]
    fn find_manifests_respects_depth() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("versioncheck.json"));
        touch(&dir.path().join("a/versioncheck.json"));
        touch(&dir.path().join("a/b/versioncheck.json"));
        touch(&dir.path().join("a/b/c/versioncheck.json"));

        let found = find_manifests(&[dir.path().to_path_buf()], "versioncheck.json", 2, &[]);

        assert_eq!(
            found,
            vec![
                dir.path().join("a/b/versioncheck.json"),
                dir.path().join("a/versioncheck.json"),
                dir.path().join("versioncheck.json"),
            ]
        );
    }

    #[test]
    fn find_manifests_skips_blacklisted_paths_and_other_files() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("a/versioncheck.json"));
        touch(&dir.path().join("a/package.json"));
        touch(&dir.path().join("build/a/versioncheck.json"));

        let found = find_manifests(
            &[dir.path().to_path_buf()],
            "versioncheck.json",
            3,
            &[dir.path().join("build")],
        );

        assert_eq!(found, vec![dir.path().join("a/versioncheck.json")]);
    }

    #[test]
    fn find_manifests_deduplicates_overlapping_roots() {
        let dir = TempDir::new().unwrap();
        touch(&dir.path().join("a/versioncheck.json"));

        let found = find_manifests(
            &[dir.path().to_path_buf(), dir.path().join("a")],
            "versioncheck.json",
            3,
            &[],
        );

        assert_eq!(found, vec![dir.path().join("a/versioncheck.json")]);
    }
}
