//! Immutable package dependency graph
//!
//! Packages are kept in load order and dependencies in declaration order, so
//! every traversal over the graph is deterministic. A graph can only be
//! constructed if its resolved edges form a DAG; dependencies on packages
//! that are not part of the graph are kept and surface when checking.

use std::collections::HashSet;
use std::fmt;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use semver::Version;
use tracing::debug;

use crate::package::binding::PackageBinding;
use crate::version::constraint::VersionConstraint;
use crate::version::error::GraphError;

/// A direct dependency: the package it names and the constraint placed on it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub name: String,
    pub constraint: VersionConstraint,
}

/// A dependency of some package in a closure that no package in the graph provides
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MissingDependency<'g> {
    pub required_by: &'g Package,
    pub dependency: &'g Dependency,
}

impl fmt::Display for MissingDependency<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{} (required by {})",
            self.dependency.name,
            self.dependency.constraint,
            self.required_by.name
        )
    }
}

/// A named package with a declared version and ordered direct dependencies
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Package {
    name: String,
    version: Version,
    dependencies: Vec<Dependency>,
    path: Option<PathBuf>,
}

impl Package {
    pub fn new(name: impl Into<String>, version: Version) -> Self {
        Self {
            name: name.into(),
            version,
            dependencies: Vec::new(),
            path: None,
        }
    }

    /// Append a dependency, keeping declaration order
    pub fn with_dependency(mut self, name: impl Into<String>, constraint: VersionConstraint) -> Self {
        self.dependencies.push(Dependency {
            name: name.into(),
            constraint,
        });
        self
    }

    /// Record the directory the package was loaded from
    pub fn with_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> &Version {
        &self.version
    }

    pub fn dependencies(&self) -> &[Dependency] {
        &self.dependencies
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }
}

impl fmt::Display for Package {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.name, self.version)
    }
}

#[derive(Debug, Default)]
pub struct PackageGraph {
    packages: IndexMap<String, Package>,
}

impl PackageGraph {
    /// Build a graph, rejecting empty or duplicate names and dependency cycles.
    pub fn new(packages: impl IntoIterator<Item = Package>) -> Result<Self, GraphError> {
        let mut map = IndexMap::new();
        for package in packages {
            if package.name.trim().is_empty() {
                return Err(GraphError::EmptyName);
            }
            if map.contains_key(package.name()) {
                return Err(GraphError::DuplicatePackage(package.name));
            }
            map.insert(package.name.clone(), package);
        }

        let graph = Self { packages: map };
        if let Some(cycle) = graph.find_cycle() {
            return Err(GraphError::CycleDetected { cycle });
        }

        debug!("Built package graph with {} packages", graph.len());
        Ok(graph)
    }

    pub fn get(&self, name: &str) -> Option<&Package> {
        self.packages.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.packages.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.packages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.packages.is_empty()
    }

    /// All packages in load order
    pub fn packages(&self) -> impl Iterator<Item = &Package> {
        self.packages.values()
    }

    /// The package a dependency refers to, if it is part of the graph
    pub fn resolve(&self, dependency: &Dependency) -> Option<&Package> {
        self.packages.get(&dependency.name)
    }

    /// The check protocol binding for a package
    pub fn binding(&self, name: &str) -> Option<PackageBinding<'_>> {
        self.get(name).map(|package| PackageBinding::new(self, package))
    }

    fn require(&self, name: &str) -> Result<&Package, GraphError> {
        self.get(name)
            .ok_or_else(|| GraphError::PackageNotFound(name.to_string()))
    }

    /// Find the first cycle among resolved edges, as a path that starts and
    /// ends with the same package.
    fn find_cycle(&self) -> Option<Vec<String>> {
        let mut visited = HashSet::new();
        let mut stack = Vec::new();

        self.packages
            .keys()
            .find_map(|name| self.find_cycle_dfs(name, &mut visited, &mut stack))
    }

    fn find_cycle_dfs<'g>(
        &'g self,
        name: &'g str,
        visited: &mut HashSet<&'g str>,
        stack: &mut Vec<&'g str>,
    ) -> Option<Vec<String>> {
        if let Some(start) = stack.iter().position(|on_stack| *on_stack == name) {
            let mut cycle: Vec<String> = stack[start..].iter().map(|s| s.to_string()).collect();
            cycle.push(name.to_string());
            return Some(cycle);
        }
        if !visited.insert(name) {
            return None;
        }

        stack.push(name);
        let package = self.packages.get(name)?;
        for dependency in &package.dependencies {
            if self.contains(&dependency.name)
                && let Some(cycle) = self.find_cycle_dfs(&dependency.name, visited, stack)
            {
                return Some(cycle);
            }
        }
        stack.pop();
        None
    }

    /// Depth-first dump of the dependency tree below `root`.
    ///
    /// Each line is `name:version`, indented two spaces per level. Constraints
    /// a dependency does not satisfy are appended, and dependencies that are
    /// not part of the graph are shown with their constraint and `(missing)`.
    pub fn tree(&self, root: &str) -> Result<Vec<String>, GraphError> {
        let root = self.require(root)?;
        let mut lines = Vec::new();
        self.tree_lines(root, 0, &mut lines);
        Ok(lines)
    }

    fn tree_lines(&self, package: &Package, level: usize, lines: &mut Vec<String>) {
        lines.push(format!("{}{}", "  ".repeat(level), package));
        for dependency in &package.dependencies {
            match self.resolve(dependency) {
                Some(resolved) if dependency.constraint.satisfies(&resolved.version) => {
                    self.tree_lines(resolved, level + 1, lines);
                }
                Some(resolved) => {
                    lines.push(format!(
                        "{}{} (requires {})",
                        "  ".repeat(level + 1),
                        resolved,
                        dependency.constraint
                    ));
                }
                None => lines.push(format!(
                    "{}{}:{} (missing)",
                    "  ".repeat(level + 1),
                    dependency.name,
                    dependency.constraint
                )),
            }
        }
    }

    /// Packages in the closure of `root`, dependencies before dependents.
    ///
    /// Each package appears once; siblings keep declaration order and `root`
    /// comes last. Unresolved dependencies are skipped.
    pub fn build_order(&self, root: &str) -> Result<Vec<&Package>, GraphError> {
        let root = self.require(root)?;
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        self.post_order(root, &mut seen, &mut order);
        Ok(order)
    }

    fn post_order<'g>(
        &'g self,
        package: &'g Package,
        seen: &mut HashSet<&'g str>,
        order: &mut Vec<&'g Package>,
    ) {
        if !seen.insert(package.name()) {
            return;
        }
        for dependency in &package.dependencies {
            if let Some(resolved) = self.resolve(dependency) {
                self.post_order(resolved, seen, order);
            }
        }
        order.push(package);
    }

    /// Packages `name` depends on.
    ///
    /// Direct dependencies come in declaration order. With `recursive`, the
    /// whole closure is returned with dependencies before dependents, each
    /// package once. Unresolved dependencies are skipped; see [`Self::missing`].
    pub fn upstreams(&self, name: &str, recursive: bool) -> Result<Vec<&Package>, GraphError> {
        let package = self.require(name)?;
        if !recursive {
            let mut direct: Vec<&Package> = Vec::new();
            for resolved in package.dependencies.iter().filter_map(|d| self.resolve(d)) {
                if !direct.iter().any(|p| p.name == resolved.name) {
                    direct.push(resolved);
                }
            }
            return Ok(direct);
        }

        let mut order = self.build_order(name)?;
        order.pop();
        Ok(order)
    }

    /// Every unresolved dependency in the closure of `root`.
    ///
    /// Unlike a check, which stops at the first problem, this walks the whole
    /// closure depth-first in declaration order.
    pub fn missing(&self, root: &str) -> Result<Vec<MissingDependency<'_>>, GraphError> {
        let root = self.require(root)?;
        let mut seen = HashSet::new();
        let mut missing = Vec::new();
        self.collect_missing(root, &mut seen, &mut missing);
        Ok(missing)
    }

    fn collect_missing<'g>(
        &'g self,
        package: &'g Package,
        seen: &mut HashSet<&'g str>,
        missing: &mut Vec<MissingDependency<'g>>,
    ) {
        if !seen.insert(package.name()) {
            return;
        }
        for dependency in &package.dependencies {
            match self.resolve(dependency) {
                Some(resolved) => self.collect_missing(resolved, seen, missing),
                None => missing.push(MissingDependency {
                    required_by: package,
                    dependency,
                }),
            }
        }
    }

    /// Packages that depend on `name`, in load order.
    ///
    /// With `recursive`, dependents of dependents are included as well, each
    /// package at most once.
    pub fn downstreams(&self, name: &str, recursive: bool) -> Vec<&Package> {
        let mut found: Vec<&Package> = Vec::new();
        let mut pending = vec![name];

        while let Some(target) = pending.pop() {
            for package in self.packages.values() {
                let depends_on_target = package.dependencies.iter().any(|d| d.name == target);
                if depends_on_target && !found.iter().any(|f| f.name == package.name) {
                    found.push(package);
                    if recursive {
                        pending.push(package.name());
                    }
                }
            }
        }

        found.sort_by_key(|package| self.packages.get_index_of(package.name()));
        found
    }
}
