//! Check many root packages at once
//!
//! Each root only reads its own part of the immutable graph, so the checks
//! run side by side on the blocking pool with no coordination.

use std::sync::Arc;

use futures::future::join_all;
use tokio::task::JoinError;
use tracing::{debug, info};

use crate::package::checker::{CheckResult, check};
use crate::package::graph::PackageGraph;
use crate::version::error::GraphError;

/// Result of checking one root
#[derive(Debug)]
pub struct RootCheck {
    pub root: String,
    pub result: Result<CheckResult, GraphError>,
}

/// Check every root concurrently, returning results in input order.
pub async fn check_workspace(
    graph: Arc<PackageGraph>,
    roots: Vec<String>,
) -> Result<Vec<RootCheck>, JoinError> {
    info!("Checking {} root packages", roots.len());

    let tasks = roots.into_iter().map(|root| {
        let graph = Arc::clone(&graph);
        tokio::task::spawn_blocking(move || {
            let result = check(&graph, &root);
            debug!("Finished {}", root);
            RootCheck { root, result }
        })
    });

    join_all(tasks).await.into_iter().collect()
}

/// Check every package in the graph.
pub async fn check_all(graph: Arc<PackageGraph>) -> Result<Vec<RootCheck>, JoinError> {
    let roots = graph.packages().map(|p| p.name().to_string()).collect();
    check_workspace(graph, roots).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::graph::Package;
    use semver::Version;

    fn graph() -> Arc<PackageGraph> {
        Arc::new(
            PackageGraph::new([
                Package::new("a", Version::new(0, 1, 0))
                    .with_dependency("b", ">=0.1.0".parse().unwrap()),
                Package::new("b", Version::new(0, 1, 0))
                    .with_dependency("c", ">=0.2.0".parse().unwrap()),
                Package::new("c", Version::new(0, 1, 0)),
                Package::new("x", Version::new(2, 0, 0)),
            ])
            .unwrap(),
        )
    }

    #[tokio::test]
    async fn check_workspace_keeps_input_order() {
        let roots = vec!["x".to_string(), "a".to_string(), "nope".to_string()];

        let results = check_workspace(graph(), roots).await.unwrap();

        let summary: Vec<(&str, Option<&str>)> = results
            .iter()
            .map(|r| {
                (
                    r.root.as_str(),
                    r.result.as_ref().ok().and_then(CheckResult::offender),
                )
            })
            .collect();
        assert_eq!(summary, vec![("x", None), ("a", Some("c")), ("nope", None)]);
        assert_eq!(
            results[2].result,
            Err(GraphError::PackageNotFound("nope".to_string()))
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn check_all_covers_every_package() {
        let results = check_all(graph()).await.unwrap();

        let failing: Vec<&str> = results
            .iter()
            .filter(|r| !matches!(r.result, Ok(CheckResult::Pass)))
            .map(|r| r.root.as_str())
            .collect();
        assert_eq!(results.len(), 4);
        assert_eq!(failing, vec!["a", "b"]);
    }
}
