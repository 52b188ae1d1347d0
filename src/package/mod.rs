//! Package graph and the version-consistency check protocol
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐     ┌─────────────┐     ┌─────────────┐
//! │  Manifests  │────▶│   Loader    │────▶│    Graph    │
//! │ (discovery) │     │ (validate)  │     │    (DAG)    │
//! └─────────────┘     └─────────────┘     └─────────────┘
//!                                                │
//!                                                ▼
//!                     ┌─────────────┐     ┌─────────────┐
//!                     │  Workspace  │────▶│   Checker   │
//!                     │ (many roots)│     │ (DFS check) │
//!                     └─────────────┘     └─────────────┘
//! ```
//!
//! # Modules
//!
//! - [`graph`]: Immutable package graph with cycle rejection and queries
//! - [`binding`]: `VersionCheck` protocol (`name`, `info`, `check`) per package
//! - [`checker`]: Depth-first, first-failure-wins constraint check
//! - [`loader`]: Manifest source seam and graph loading
//! - [`workspace`]: Concurrent checks over many root packages

pub mod binding;
pub mod checker;
pub mod graph;
pub mod loader;
pub mod workspace;
