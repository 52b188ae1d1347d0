//! Version parsing and constraint evaluation
//!
//! # Modules
//!
//! - [`semver`]: Declared version parsing, including partial versions
//! - [`constraint`]: Constraints one package places on another (`>=1.0`, `1.2.*`, ranges)
//! - [`error`]: Error types for constraints, graph construction and loading

pub mod constraint;
pub mod error;
pub mod semver;
