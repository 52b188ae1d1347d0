//! JSON manifest parser

use tracing::warn;

use crate::manifest::traits::{ManifestParser, ParseError};
use crate::manifest::types::Manifest;

/// Parser for JSON package manifests with a fixed file name
pub struct JsonManifestParser {
    file_name: String,
}

impl JsonManifestParser {
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
        }
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl Default for JsonManifestParser {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MANIFEST_NAME)
    }
}

impl ManifestParser for JsonManifestParser {
    fn parse(&self, content: &str) -> Result<Manifest, ParseError> {
        let mut manifest: Manifest = serde_json::from_str(content).map_err(|e| {
            warn!("Failed to parse manifest JSON: {}", e);
            if e.is_data() {
                ParseError::ParseFailed(e.to_string())
            } else {
                ParseError::InvalidSyntax(e.to_string())
            }
        })?;

        trim_in_place(&mut manifest.name);
        for dep in &mut manifest.depends {
            trim_in_place(&mut dep.name);
        }

        if manifest.name.is_empty() {
            return Err(ParseError::ParseFailed("package name is empty".to_string()));
        }

        if let Some(dep) = manifest.depends.iter().find(|dep| dep.name.is_empty()) {
            return Err(ParseError::ParseFailed(format!(
                "dependency with empty name (constraint '{}')",
                dep.version
            )));
        }

        Ok(manifest)
    }
}

fn trim_in_place(name: &mut String) {
    if name.trim().len() != name.len() {
        *name = name.trim().to_string();
    }
}
