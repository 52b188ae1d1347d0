//! Shared test utilities

pub mod fixture;

#[allow(unused_imports)]
pub use fixture::*;
