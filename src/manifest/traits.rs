//! Parser trait definition

use crate::manifest::types::Manifest;

/// Trait for parsing package manifest files
pub trait ManifestParser: Send + Sync {
    /// Parse the content into a manifest
    fn parse(&self, content: &str) -> Result<Manifest, ParseError>;
}

/// Error type for parsing operations
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    /// The file is well-formed but does not describe a package
    #[error("Failed to parse manifest: {0}")]
    ParseFailed(String),

    /// Invalid syntax in the file
    #[error("Invalid syntax: {0}")]
    InvalidSyntax(String),
}
