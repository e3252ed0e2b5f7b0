use super::{CommitLookup, VcsError};
use std::path::Path;
use std::process::{Command, Stdio};
use tracing::debug;

/// Commit lookup through the `git` command line.
#[derive(Debug, Clone)]
pub struct GitCli {
    program: String,
}

impl Default for GitCli {
    fn default() -> Self {
        Self::new()
    }
}

impl GitCli {
    pub fn new() -> Self {
        Self::with_program("git")
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl CommitLookup for GitCli {
    fn name(&self) -> &'static str {
        "git"
    }

    fn is_available(&self) -> bool {
        Command::new(&self.program)
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|status| status.success())
            .unwrap_or(false)
    }

    fn latest_commit(&self, dir: &Path) -> Result<String, VcsError> {
        let args = ["log", "-1", "--format=%H"];
        debug!(dir = %dir.display(), "Running {} {}", self.program, args.join(" "));

        let output = Command::new(&self.program)
            .args(args)
            .current_dir(dir)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| match e.kind() {
                std::io::ErrorKind::NotFound if !dir.exists() => VcsError::Failed {
                    dir: dir.to_path_buf(),
                    message: "directory does not exist".to_string(),
                },
                std::io::ErrorKind::NotFound => VcsError::Unavailable(self.program.clone()),
                _ => VcsError::Failed {
                    dir: dir.to_path_buf(),
                    message: e.to_string(),
                },
            })?;

        if !output.status.success() {
            return Err(VcsError::Failed {
                dir: dir.to_path_buf(),
                message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        let commit = String::from_utf8_lossy(&output.stdout)
            .trim_matches(|c: char| c == '\'' || c.is_whitespace())
            .to_string();
        if commit.is_empty() {
            return Err(VcsError::Failed {
                dir: dir.to_path_buf(),
                message: "no commits".to_string(),
            });
        }
        Ok(commit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn git(dir: &Path, args: &[&str]) -> bool {
        Command::new("git")
            .args(args)
            .current_dir(dir)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }

    #[test]
    fn test_missing_program_is_unavailable() {
        let vcs = GitCli::with_program("goscan-no-such-vcs");
        assert!(!vcs.is_available());

        let temp = TempDir::new().unwrap();
        let err = vcs.latest_commit(temp.path()).unwrap_err();
        assert!(matches!(err, VcsError::Unavailable(_)));
    }

    #[test]
    fn test_latest_commit_in_repository() {
        let vcs = GitCli::new();
        if !vcs.is_available() {
            return;
        }

        let temp = TempDir::new().unwrap();
        let dir = temp.path();
        assert!(git(dir, &["init", "-q"]));
        std::fs::write(dir.join("a.go"), "package a\n").unwrap();
        assert!(git(dir, &["add", "a.go"]));
        assert!(git(
            dir,
            &[
                "-c",
                "user.name=test",
                "-c",
                "user.email=test@example.com",
                "-c",
                "commit.gpgsign=false",
                "commit",
                "-q",
                "-m",
                "init"
            ]
        ));

        let commit = vcs.latest_commit(dir).unwrap();
        assert_eq!(commit.len(), 40);
        assert!(commit.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_outside_repository_fails() {
        let vcs = GitCli::new();
        if !vcs.is_available() {
            return;
        }

        let temp = TempDir::new().unwrap();
        let err = vcs.latest_commit(temp.path()).unwrap_err();
        assert!(matches!(err, VcsError::Failed { .. }));
    }
}
