//! Scan configuration.
//!
//! Settings are layered, lowest precedence first: defaults, a JSON config
//! document (Srcfile keys, read from a file or stdin), environment variables,
//! then command-line flags. The resulting value is threaded through the
//! pipeline; nothing here touches process-global state.
//!
//! # Environment Variables
//!
//! - `GOSCAN_IMPORT_PATH`: import path root of the scanned repository
//! - `GOSCAN_SKIP_GODEPS`: ignore the `Godeps/_workspace` convention (true|false)
//! - `GOSCAN_LOG_LEVEL`, `GOSCAN_LOG_JSON`: see [`crate::util::logging`]
//!
//! # Config document
//!
//! ```json
//! {
//!   "GOPATH": "vendor",
//!   "PkgPatterns": ["example.com/app/..."],
//!   "SkipGodeps": false,
//!   "ImportPath": "example.com/app"
//! }
//! ```

use crate::fs::FileSystem;
use serde::{Deserialize, Serialize};
use std::env;
use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const ENV_IMPORT_PATH: &str = "GOSCAN_IMPORT_PATH";
pub const ENV_SKIP_GODEPS: &str = "GOSCAN_SKIP_GODEPS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to decode config {path}: {source}")]
    DecodeError {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// Failed to parse configuration value
    #[error("Failed to parse {field}: {error}")]
    ParseError { field: String, error: String },

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Scan settings, named as in a Srcfile's `Config` section.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Extra GOPATH entries, joined with the OS list separator. Relative
    /// entries are resolved against the scan root.
    #[serde(rename = "GOPATH", default, skip_serializing_if = "String::is_empty")]
    pub gopath: String,

    /// Keep only units whose name matches one of these patterns.
    #[serde(rename = "PkgPatterns", default, skip_serializing_if = "Vec::is_empty")]
    pub pkg_patterns: Vec<String>,

    /// Do not descend into `Godeps/_workspace` nor add it to the GOPATH.
    #[serde(rename = "SkipGodeps", default)]
    pub skip_godeps: bool,

    /// Import path of the scan root.
    #[serde(rename = "ImportPath", default, skip_serializing_if = "Option::is_none")]
    pub import_path: Option<String>,
}

impl ScanConfig {
    /// Decode a config document. `source` names the input in errors.
    pub fn from_reader(reader: impl Read, source: &str) -> Result<Self, ConfigError> {
        serde_json::from_reader(reader).map_err(|e| ConfigError::DecodeError {
            path: source.to_string(),
            source: e,
        })
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            source: e,
        })?;
        Self::from_reader(std::io::BufReader::new(file), &path.display().to_string())
    }

    /// Overlay `GOSCAN_*` environment variables.
    pub fn apply_env(&mut self) -> Result<(), ConfigError> {
        if let Ok(import_path) = env::var(ENV_IMPORT_PATH) {
            if !import_path.is_empty() {
                self.import_path = Some(import_path);
            }
        }

        if let Ok(value) = env::var(ENV_SKIP_GODEPS) {
            self.skip_godeps =
                value
                    .to_lowercase()
                    .parse::<bool>()
                    .map_err(|e| ConfigError::ParseError {
                        field: ENV_SKIP_GODEPS.to_string(),
                        error: e.to_string(),
                    })?;
        }

        Ok(())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.pkg_patterns.iter().any(|p| p.trim().is_empty()) {
            return Err(ConfigError::ValidationFailed(
                "PkgPatterns must not contain empty patterns".to_string(),
            ));
        }

        if let Some(import_path) = &self.import_path {
            if import_path.starts_with('/') || import_path.ends_with('/') {
                return Err(ConfigError::ValidationFailed(format!(
                    "Invalid ImportPath: {}. Must not start or end with '/'",
                    import_path
                )));
            }
        }

        Ok(())
    }

    /// GOPATH entries in order, empty entries dropped.
    pub fn gopath_dirs(&self) -> Vec<PathBuf> {
        if self.gopath.is_empty() {
            return Vec::new();
        }
        env::split_paths(&self.gopath)
            .filter(|p| !p.as_os_str().is_empty())
            .collect()
    }

    /// Import path root for unit names: `ImportPath` if set, else the module
    /// path declared by a `go.mod` at the scan root.
    pub fn import_root(&self, fs: &dyn FileSystem, root: &Path) -> Option<String> {
        if let Some(import_path) = &self.import_path {
            return Some(import_path.clone());
        }

        let go_mod = root.join("go.mod");
        let content = fs.read_to_string(&go_mod).ok()?;
        module_path(&content)
    }
}

/// The `module` directive of a go.mod file.
fn module_path(go_mod: &str) -> Option<String> {
    go_mod.lines().find_map(|line| {
        let line = line.split("//").next().unwrap_or("").trim();
        let rest = line.strip_prefix("module")?;
        if !rest.starts_with(char::is_whitespace) {
            return None;
        }
        let module = rest.trim().trim_matches('"');
        (!module.is_empty()).then(|| module.to_string())
    })
}

impl fmt::Display for ScanConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Scan Configuration:")?;
        writeln!(f, "  GOPATH: {}", self.gopath)?;
        writeln!(f, "  PkgPatterns: {}", self.pkg_patterns.join(", "))?;
        writeln!(f, "  SkipGodeps: {}", self.skip_godeps)?;
        if let Some(import_path) = &self.import_path {
            writeln!(f, "  ImportPath: {}", import_path)?;
        }
        Ok(())
    }
}
