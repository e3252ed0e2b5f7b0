//! Commit attribution sources: the live VCS and the lockfiles that pin
//! vendored dependencies.

mod git;
mod lockfile;

pub use git::GitCli;
pub use lockfile::{
    GodepDependency, Godeps, Govendor, GovendorDependency, LockfileError, LockfileFormat,
};

use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum VcsError {
    #[error("{0} command not found")]
    Unavailable(String),

    #[error("commit lookup failed in {}: {message}", dir.display())]
    Failed { dir: PathBuf, message: String },
}

/// Source of the latest commit touching a directory.
pub trait CommitLookup: Send + Sync {
    fn name(&self) -> &'static str;

    fn is_available(&self) -> bool;

    fn latest_commit(&self, dir: &Path) -> Result<String, VcsError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vcs_error_messages() {
        assert_eq!(
            VcsError::Unavailable("git".to_string()).to_string(),
            "git command not found"
        );
        let err = VcsError::Failed {
            dir: PathBuf::from("/repo/sub"),
            message: "not a git repository".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "commit lookup failed in /repo/sub: not a git repository"
        );
    }
}
