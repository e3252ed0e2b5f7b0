//! Package recognition: deciding whether a directory holds a Go package and
//! what is in it.

pub mod constraint;
pub mod facts;
pub mod go_list;
pub mod native;

pub use facts::{FileRole, ImportRole, PackageFacts, Position};
pub use go_list::{GoCommand, GoListRecognizer, GoListRunner};
pub use native::NativeRecognizer;

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RecognizeError {
    /// The directory holds no buildable Go files. Expected, never reported.
    #[error("no buildable Go source files in {}", .0.display())]
    NotAPackage(PathBuf),

    /// The directory looks like a package but cannot be loaded.
    #[error("invalid package in {}: {message}", dir.display())]
    Invalid { dir: PathBuf, message: String },

    /// The package listing as a whole could not be produced. Fatal.
    #[error("package listing failed: {0}")]
    Listing(String),
}

impl RecognizeError {
    pub fn invalid(dir: &Path, message: impl Into<String>) -> Self {
        Self::Invalid {
            dir: dir.to_path_buf(),
            message: message.into(),
        }
    }

    pub fn is_fatal(&self) -> bool {
        matches!(self, RecognizeError::Listing(_))
    }
}

/// Given a directory, report the package it holds.
pub trait PackageRecognizer: Send + Sync {
    fn name(&self) -> &'static str;

    fn recognize(&self, dir: &Path) -> Result<PackageFacts, RecognizeError>;
}
