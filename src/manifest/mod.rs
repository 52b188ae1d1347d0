//! Package manifest parsing and discovery
//!
//! # Modules
//!
//! - [`traits`]: Parser trait and parse errors
//! - [`types`]: Manifest data as written on disk
//! - [`json`]: JSON manifest parser
//! - [`discovery`]: Root list construction and manifest file search

pub mod discovery;
pub mod json;
pub mod traits;
pub mod types;
