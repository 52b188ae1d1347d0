//! The per-package check protocol
//!
//! Every package in a graph exposes the same three operations: its name, a
//! human-readable diagnostic report, and a version-consistency check of
//! itself and everything below it.

use std::io::{self, Write};

use tracing::warn;

use crate::package::checker::{CheckResult, check_package};
use crate::package::graph::{Package, PackageGraph};

/// Operations every package binding provides
pub trait VersionCheck {
    /// The package's own name. Constant and non-empty.
    fn name(&self) -> &str;

    /// Write name, version and dependencies to `sink`.
    ///
    /// Never fails; a sink that rejects the write is logged and ignored.
    fn info(&self, sink: &mut dyn Write);

    /// Check this package's dependencies, recursively.
    fn check(&self) -> CheckResult;
}

/// A package together with the graph it belongs to
#[derive(Debug, Clone, Copy)]
pub struct PackageBinding<'g> {
    graph: &'g PackageGraph,
    package: &'g Package,
}

impl<'g> PackageBinding<'g> {
    pub(crate) fn new(graph: &'g PackageGraph, package: &'g Package) -> Self {
        Self { graph, package }
    }

    pub fn package(&self) -> &'g Package {
        self.package
    }

    fn write_info(&self, sink: &mut dyn Write) -> io::Result<()> {
        let package = self.package;
        writeln!(sink, "name: {}", package.name())?;
        writeln!(sink, "version: {}", package.version())?;
        if let Some(path) = package.path() {
            writeln!(sink, "path: {}", path.display())?;
        }

        if package.dependencies().is_empty() {
            return writeln!(sink, "depends: none");
        }

        writeln!(sink, "depends:")?;
        for dependency in package.dependencies() {
            match self.graph.resolve(dependency) {
                Some(resolved) => writeln!(
                    sink,
                    "  {} {} (found {})",
                    dependency.name,
                    dependency.constraint,
                    resolved.version()
                )?,
                None => writeln!(
                    sink,
                    "  {} {} (missing)",
                    dependency.name, dependency.constraint
                )?,
            }
        }
        Ok(())
    }
}

impl VersionCheck for PackageBinding<'_> {
    fn name(&self) -> &str {
        self.package.name()
    }

    fn info(&self, sink: &mut dyn Write) {
        if let Err(e) = self.write_info(sink) {
            warn!("Failed to write info for {}: {}", self.package, e);
        }
    }

    fn check(&self) -> CheckResult {
        check_package(self.graph, self.package)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use semver::Version;

    fn graph() -> PackageGraph {
        PackageGraph::new([
            Package::new("a", Version::new(0, 1, 0))
                .with_path("/work/a")
                .with_dependency("b", ">=0.1.0".parse().unwrap())
                .with_dependency("d", "1.*".parse().unwrap()),
            Package::new("b", Version::new(0, 1, 0)),
        ])
        .unwrap()
    }

    struct BrokenSink;

    impl Write for BrokenSink {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::BrokenPipe, "closed"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn name_is_constant() {
        let graph = graph();
        let binding = graph.binding("a").unwrap();

        let names: Vec<String> = (0..3).map(|_| binding.name().to_string()).collect();

        assert_eq!(names, vec!["a", "a", "a"]);
    }

    #[test]
    fn info_lists_version_path_and_dependencies() {
        let graph = graph();
        let mut out = Vec::new();

        graph.binding("a").unwrap().info(&mut out);

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "name: a\n\
             version: 0.1.0\n\
             path: /work/a\n\
             depends:\n  \
             b >=0.1.0 (found 0.1.0)\n  \
             d 1.* (missing)\n"
        );
    }

    #[test]
    fn info_for_leaf_package() {
        let graph = graph();
        let mut out = Vec::new();

        graph.binding("b").unwrap().info(&mut out);

        assert_eq!(
            String::from_utf8(out).unwrap(),
            "name: b\nversion: 0.1.0\ndepends: none\n"
        );
    }

    #[test]
    fn info_ignores_sink_errors() {
        let graph = graph();
        graph.binding("a").unwrap().info(&mut BrokenSink);
    }

    #[test]
    fn check_goes_through_the_graph() {
        let graph = graph();

        assert_eq!(graph.binding("a").unwrap().check().offender(), Some("d"));
        assert!(graph.binding("b").unwrap().check().is_pass());
    }

    #[test]
    fn binding_for_unknown_package_is_none() {
        assert!(graph().binding("zzz").is_none());
    }
}
