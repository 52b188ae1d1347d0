//! Version-consistency check over a package graph
//!
//! A check walks the graph depth-first from a root, following dependencies in
//! declaration order. At each package it first evaluates the constraints on
//! its direct dependencies, reporting the first one that is missing or has a
//! version outside its constraint, and only then descends into them. The
//! first failure wins; nothing is aggregated.

use std::collections::HashSet;
use std::fmt;

use semver::Version;
use tracing::debug;

use crate::package::graph::{Package, PackageGraph};
use crate::version::constraint::VersionConstraint;
use crate::version::error::GraphError;

/// Outcome of a check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckResult {
    Pass,
    Fail(CheckFailure),
}

impl CheckResult {
    pub fn is_pass(&self) -> bool {
        matches!(self, CheckResult::Pass)
    }

    pub fn failure(&self) -> Option<&CheckFailure> {
        match self {
            CheckResult::Pass => None,
            CheckResult::Fail(failure) => Some(failure),
        }
    }

    /// Name of the offending package, if the check failed
    pub fn offender(&self) -> Option<&str> {
        self.failure().map(CheckFailure::package)
    }
}

/// Why a check failed
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckFailure {
    /// A dependency's declared version does not satisfy its dependent's constraint
    VersionMismatch {
        package: String,
        found: Version,
        required: VersionConstraint,
        required_by: String,
    },
    /// A dependency names a package that is not part of the graph
    UnresolvedDependency { package: String, required_by: String },
}

impl CheckFailure {
    /// The offending package
    pub fn package(&self) -> &str {
        match self {
            CheckFailure::VersionMismatch { package, .. }
            | CheckFailure::UnresolvedDependency { package, .. } => package,
        }
    }

    /// The package whose constraint was violated
    pub fn required_by(&self) -> &str {
        match self {
            CheckFailure::VersionMismatch { required_by, .. }
            | CheckFailure::UnresolvedDependency { required_by, .. } => required_by,
        }
    }
}

impl fmt::Display for CheckFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckFailure::VersionMismatch {
                package,
                found,
                required,
                required_by,
            } => write!(
                f,
                "version mismatch: {package} {found} does not satisfy {required} required by {required_by}"
            ),
            CheckFailure::UnresolvedDependency {
                package,
                required_by,
            } => write!(f, "unresolved dependency: {package} required by {required_by}"),
        }
    }
}

/// Check the package named `root`.
///
/// An unknown root is a caller error, not a check outcome.
pub fn check(graph: &PackageGraph, root: &str) -> Result<CheckResult, GraphError> {
    let package = graph
        .get(root)
        .ok_or_else(|| GraphError::PackageNotFound(root.to_string()))?;
    Ok(check_package(graph, package))
}

/// Check a package that is known to be part of `graph`.
pub(crate) fn check_package(graph: &PackageGraph, package: &Package) -> CheckResult {
    let mut passed = HashSet::new();
    let result = visit(graph, package, &mut passed);
    debug!("Check of {} finished: {:?}", package, result);
    result
}

fn visit<'g>(
    graph: &'g PackageGraph,
    package: &'g Package,
    passed: &mut HashSet<&'g str>,
) -> CheckResult {
    if passed.contains(package.name()) {
        return CheckResult::Pass;
    }

    let mut resolved = Vec::with_capacity(package.dependencies().len());
    for dependency in package.dependencies() {
        let Some(upstream) = graph.resolve(dependency) else {
            return CheckResult::Fail(CheckFailure::UnresolvedDependency {
                package: dependency.name.clone(),
                required_by: package.name().to_string(),
            });
        };

        if !dependency.constraint.satisfies(upstream.version()) {
            return CheckResult::Fail(CheckFailure::VersionMismatch {
                package: upstream.name().to_string(),
                found: upstream.version().clone(),
                required: dependency.constraint.clone(),
                required_by: package.name().to_string(),
            });
        }

        debug!(
            "{} satisfies {} required by {}",
            upstream,
            dependency.constraint,
            package.name()
        );
        resolved.push(upstream);
    }

    for upstream in resolved {
        let result = visit(graph, upstream, passed);
        if !result.is_pass() {
            return result;
        }
    }

    passed.insert(package.name());
    CheckResult::Pass
}
