//! Load a package graph from manifest files

use std::io;
use std::path::{Path, PathBuf};

#[cfg(test)]
use mockall::automock;
use tracing::{debug, info, warn};

use crate::manifest::traits::ManifestParser;
use crate::manifest::types::Manifest;
use crate::package::graph::{Package, PackageGraph};
use crate::version::constraint::VersionConstraint;
use crate::version::error::LoadError;
use crate::version::semver::parse_version;

/// Where manifest files come from
#[cfg_attr(test, automock)]
pub trait ManifestSource {
    /// Manifest paths in the order they should be loaded
    fn manifest_paths(&self) -> Vec<PathBuf>;

    /// Read one manifest
    fn read_manifest(&self, path: &Path) -> io::Result<String>;
}

/// Manifests on the local filesystem
pub struct FsManifestSource {
    paths: Vec<PathBuf>,
}

impl FsManifestSource {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

impl ManifestSource for FsManifestSource {
    fn manifest_paths(&self) -> Vec<PathBuf> {
        self.paths.clone()
    }

    fn read_manifest(&self, path: &Path) -> io::Result<String> {
        std::fs::read_to_string(path)
    }
}

/// Load every manifest from `source` and build a validated graph.
///
/// With `keep_going`, manifests that cannot be read or parsed are skipped
/// with a warning. Graph errors (duplicate names, cycles) are always fatal.
pub fn load_graph<S, P>(source: &S, parser: &P, keep_going: bool) -> Result<PackageGraph, LoadError>
where
    S: ManifestSource + ?Sized,
    P: ManifestParser + ?Sized,
{
    let mut packages = Vec::new();

    for path in source.manifest_paths() {
        debug!("Loading {}", path.display());
        match load_package(source, parser, &path) {
            Ok(package) => packages.push(package),
            Err(e) if keep_going => {
                warn!("Keep going is set, ignoring invalid package {}: {}", path.display(), e);
            }
            Err(e) => return Err(e),
        }
    }

    if packages.is_empty() {
        return Err(LoadError::NoPackages);
    }

    let graph = PackageGraph::new(packages)?;
    info!("Loading and parsing complete, {} packages", graph.len());
    Ok(graph)
}

fn load_package<S, P>(source: &S, parser: &P, path: &Path) -> Result<Package, LoadError>
where
    S: ManifestSource + ?Sized,
    P: ManifestParser + ?Sized,
{
    let content = source.read_manifest(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    let manifest = parser.parse(&content).map_err(|source| LoadError::Manifest {
        path: path.to_path_buf(),
        source,
    })?;

    let package = package_from_manifest(manifest)?;
    Ok(match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => package.with_path(dir),
        _ => package,
    })
}

/// Convert a parsed manifest into a package, validating its version and constraints.
pub fn package_from_manifest(manifest: Manifest) -> Result<Package, LoadError> {
    let version = parse_version(&manifest.version).ok_or_else(|| LoadError::InvalidVersion {
        package: manifest.name.clone(),
        version: manifest.version.clone(),
    })?;

    let mut package = Package::new(manifest.name, version);
    for dependency in manifest.depends {
        let constraint: VersionConstraint =
            dependency
                .version
                .parse()
                .map_err(|source| LoadError::Constraint {
                    package: package.name().to_string(),
                    dependency: dependency.name.clone(),
                    source,
                })?;
        package = package.with_dependency(dependency.name, constraint);
    }
    Ok(package)
}
