//! Dependency graph version-consistency checker
//!
//! Packages declare a version and constraints on the versions of their direct
//! dependencies. A check walks the graph from a root package and reports the
//! first dependency whose declared version does not satisfy its dependent's
//! constraint, or that is missing from the graph altogether.

pub mod config;
pub mod manifest;
pub mod package;
pub mod version;
