//! Lockfiles that pin vendored dependencies to revisions.
//!
//! `Godeps/Godeps.json` is written by godep, `vendor/vendor.json` by
//! govendor. Both reduce to an import path to revision table.

use crate::fs::FileSystem;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LockfileError {
    #[error("no lockfile at {}", .0.display())]
    Missing(PathBuf),

    #[error("unable to read {}: {message}", path.display())]
    Unreadable { path: PathBuf, message: String },

    #[error("unable to parse {}: {source}", path.display())]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct GodepDependency {
    #[serde(default)]
    pub import_path: String,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub rev: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Godeps {
    #[serde(default)]
    pub import_path: String,
    #[serde(default)]
    pub go_version: String,
    #[serde(default)]
    pub packages: Vec<String>,
    #[serde(default)]
    pub deps: Vec<GodepDependency>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct GovendorDependency {
    #[serde(default, alias = "Path")]
    pub path: String,
    #[serde(default, alias = "Revision")]
    pub revision: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Govendor {
    #[serde(default, alias = "Package")]
    pub package: Vec<GovendorDependency>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockfileFormat {
    Godeps,
    Govendor,
}

impl LockfileFormat {
    /// Consulted in this order; later formats win on shared import paths.
    pub const ORDERED: [LockfileFormat; 2] = [LockfileFormat::Godeps, LockfileFormat::Govendor];

    pub fn name(&self) -> &'static str {
        match self {
            LockfileFormat::Godeps => "Godeps",
            LockfileFormat::Govendor => "govendor",
        }
    }

    pub fn relative_path(&self) -> &'static Path {
        match self {
            LockfileFormat::Godeps => Path::new("Godeps/Godeps.json"),
            LockfileFormat::Govendor => Path::new("vendor/vendor.json"),
        }
    }

    fn parse(&self, content: &str) -> Result<HashMap<String, String>, serde_json::Error> {
        Ok(match self {
            LockfileFormat::Godeps => serde_json::from_str::<Godeps>(content)?
                .deps
                .into_iter()
                .map(|dep| (dep.import_path, dep.rev))
                .collect(),
            LockfileFormat::Govendor => serde_json::from_str::<Govendor>(content)?
                .package
                .into_iter()
                .map(|dep| (dep.path, dep.revision))
                .collect(),
        })
    }

    /// Import path to revision table from the lockfile under `root`.
    pub fn load(
        &self,
        fs: &dyn FileSystem,
        root: &Path,
    ) -> Result<HashMap<String, String>, LockfileError> {
        let path = root.join(self.relative_path());
        if !fs.is_file(&path) {
            return Err(LockfileError::Missing(path));
        }

        let content = fs
            .read_to_string(&path)
            .map_err(|e| LockfileError::Unreadable {
                path: path.clone(),
                message: e.to_string(),
            })?;

        self.parse(&content)
            .map_err(|source| LockfileError::Malformed { path, source })
    }
}
