use serde::Deserialize;
use std::path::{Path, PathBuf};

// =============================================================================
// Defaults
// =============================================================================

/// File name of a package manifest
pub const DEFAULT_MANIFEST_NAME: &str = "versioncheck.json";

/// How many directory levels below a root are searched for manifests
pub const DEFAULT_SEARCH_DEPTH: usize = 3;

/// Environment variable holding extra search roots (OS path-list syntax)
pub const ROOT_ENV_VAR: &str = "VERSION_CHECK_ROOT";

/// Checker configuration structure
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default, rename_all = "camelCase")]
pub struct CheckerConfig {
    /// Search roots in addition to those given on the command line
    pub roots: Vec<PathBuf>,
    /// Directory levels searched below each root
    pub depth: usize,
    /// Manifest file name to look for
    pub manifest_name: String,
    /// Skip malformed manifests instead of failing
    pub keep_going: bool,
    /// Paths never searched
    pub blacklist_paths: Vec<PathBuf>,
    pub log: LogConfig,
}

impl Default for CheckerConfig {
    fn default() -> Self {
        Self {
            roots: Vec::new(),
            depth: DEFAULT_SEARCH_DEPTH,
            manifest_name: DEFAULT_MANIFEST_NAME.to_string(),
            keep_going: false,
            blacklist_paths: Vec::new(),
            log: LogConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Default, PartialEq)]
#[serde(default)]
pub struct LogConfig {
    /// Filter directive used when RUST_LOG is unset (e.g. "info")
    pub level: Option<String>,
    /// Write logs to this file in addition to stderr
    pub file: Option<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

impl CheckerConfig {
    /// Load configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load an explicitly given config, or the default config file if it exists.
    ///
    /// An explicit path must exist. A missing default file yields the defaults.
    pub fn load_or_default(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let path = config_path();
                if path.is_file() {
                    Self::load(&path)
                } else {
                    Ok(Self::default())
                }
            }
        }
    }
}

/// Returns the path to the config directory for version-check.
/// Uses $XDG_CONFIG_HOME/version-check if XDG_CONFIG_HOME is set,
/// otherwise falls back to ~/.config/version-check,
/// or ./version-check if neither is available.
pub fn config_dir() -> PathBuf {
    config_dir_with_env(std::env::var("XDG_CONFIG_HOME").ok(), dirs::home_dir())
}

/// Returns the path to the default config file.
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

fn config_dir_with_env(xdg_config_home: Option<String>, home_dir: Option<PathBuf>) -> PathBuf {
    let config_dir = xdg_config_home
        .filter(|dir| !dir.is_empty())
        .map(PathBuf::from)
        .or_else(|| home_dir.map(|home| home.join(".config")))
        .unwrap_or_else(|| PathBuf::from("."));

    config_dir.join("version-check")
}
