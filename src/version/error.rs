use std::path::PathBuf;

use thiserror::Error;

use crate::manifest::traits::ParseError;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintError {
    #[error("Empty version constraint")]
    Empty,

    #[error("Invalid version constraint '{0}'")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("Duplicate package '{0}'")]
    DuplicatePackage(String),

    #[error("Package name is empty")]
    EmptyName,

    #[error("Circular dependency: {}", .cycle.join(" -> "))]
    CycleDetected { cycle: Vec<String> },

    #[error("Package not found: {0}")]
    PackageNotFound(String),
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid manifest {}: {source}", .path.display())]
    Manifest {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("Invalid version '{version}' for package '{package}'")]
    InvalidVersion { package: String, version: String },

    #[error("Invalid constraint on '{dependency}' in package '{package}': {source}")]
    Constraint {
        package: String,
        dependency: String,
        #[source]
        source: ConstraintError,
    },

    #[error("No packages found")]
    NoPackages,

    #[error(transparent)]
    Graph(#[from] GraphError),
}
