//! Manifest types as they appear on disk

use serde::Deserialize;

/// A package description loaded from a manifest file
///
/// Keys other than `name`, `version` and `depends` are ignored so manifests
/// can carry tool-specific data.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Manifest {
    /// Package name, unique within a build
    pub name: String,
    /// Declared version of the package itself (e.g. "0.1.0")
    pub version: String,
    /// Direct dependencies in declaration order
    #[serde(default)]
    pub depends: Vec<DependencySpec>,
}

/// A dependency entry in a manifest
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DependencySpec {
    pub name: String,
    /// Constraint on the dependency's declared version (e.g. ">=0.1.0")
    #[serde(default = "any_version")]
    pub version: String,
}

fn any_version() -> String {
    "*".to_string()
}
