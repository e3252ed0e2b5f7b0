//! State threaded through the scan phases.

use crate::commit::CommitLookup;
use crate::config::ScanConfig;
use crate::fs::FileSystem;
use crate::package::{PackageFacts, PackageRecognizer};
use crate::unit::SourceUnit;
use crate::vendor::{to_slash, VendorIdentity};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

/// Directories checked for a vendored GOPATH when none is configured.
const AUTO_GOPATH_DIRS: [&str; 2] = ["vendor", "Godeps/_workspace"];

/// A package found by the walk, with its slash-separated directory relative
/// to the scan root.
#[derive(Debug, Clone)]
pub struct FoundPackage {
    pub rel_dir: String,
    pub facts: PackageFacts,
}

/// A unit plus the vendoring convention that applies to it.
#[derive(Debug, Clone)]
pub struct ScannedUnit {
    pub unit: SourceUnit,
    pub identity: VendorIdentity,
}

impl ScannedUnit {
    pub fn is_vendored(&self) -> bool {
        self.identity.is_vendored()
    }
}

pub struct ScanContext {
    pub fs: Arc<dyn FileSystem>,
    pub recognizer: Arc<dyn PackageRecognizer>,
    pub vcs: Arc<dyn CommitLookup>,
    pub config: ScanConfig,
    pub root: PathBuf,

    /// Effective GOPATH entries, configured or auto-detected.
    pub gopath: Vec<PathBuf>,
    /// True when `gopath` was detected rather than configured.
    pub auto_gopath: bool,

    pub packages: Vec<FoundPackage>,
    pub units: Vec<ScannedUnit>,
}

impl ScanContext {
    pub fn new(
        fs: Arc<dyn FileSystem>,
        recognizer: Arc<dyn PackageRecognizer>,
        vcs: Arc<dyn CommitLookup>,
        config: ScanConfig,
        root: PathBuf,
    ) -> Self {
        let configured = config.gopath_dirs();
        let (gopath, auto_gopath) = if configured.is_empty() {
            let detected = detect_gopath(fs.as_ref(), &root, config.skip_godeps);
            let auto = !detected.is_empty();
            (detected, auto)
        } else {
            (configured, false)
        };

        Self {
            fs,
            recognizer,
            vcs,
            config,
            root,
            gopath,
            auto_gopath,
            packages: Vec::new(),
            units: Vec::new(),
        }
    }

    /// Slash-separated path of `path` relative to the scan root.
    pub fn relative(&self, path: &Path) -> Result<String> {
        let rel = path.strip_prefix(&self.root).with_context(|| {
            format!(
                "{} is not under scan root {}",
                path.display(),
                self.root.display()
            )
        })?;
        Ok(to_slash(rel))
    }

    /// The effective GOPATH, relative to the scan root where possible and
    /// joined with the OS list separator.
    pub fn relative_gopath(&self) -> Result<String> {
        let dirs = self.gopath.iter().map(|dir| {
            if dir.is_absolute() {
                dir.strip_prefix(&self.root)
                    .map(|rel| PathBuf::from(to_slash(rel)))
                    .unwrap_or_else(|_| dir.clone())
            } else {
                dir.clone()
            }
        });
        let joined = std::env::join_paths(dirs).context("GOPATH entry contains a list separator")?;
        Ok(joined.to_string_lossy().to_string())
    }

    pub fn into_units(self) -> Vec<SourceUnit> {
        self.units.into_iter().map(|scanned| scanned.unit).collect()
    }
}

/// `vendor/src` and `Godeps/_workspace/src` trees under the root act as
/// GOPATH entries when the caller configured none.
fn detect_gopath(fs: &dyn FileSystem, root: &Path, skip_godeps: bool) -> Vec<PathBuf> {
    AUTO_GOPATH_DIRS
        .iter()
        .filter(|dir| !(skip_godeps && dir.starts_with("Godeps")))
        .filter(|dir| fs.is_dir(&root.join(dir).join("src")))
        .map(|dir| {
            info!(
                "Adding {} to GOPATH (auto-detected Go vendored dependencies source dir {}/src). \
                 Set GOPATH in the config to override.",
                dir, dir
            );
            PathBuf::from(dir)
        })
        .collect()
}
