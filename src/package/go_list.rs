//! Recognizer backed by the Go toolchain's `go list`.

use super::{PackageFacts, PackageRecognizer, RecognizeError};
use crate::vendor::to_slash;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::sync::{Arc, OnceLock};
use tracing::{debug, info, trace};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListError {
    #[serde(default)]
    err: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ListedPackage {
    #[serde(flatten)]
    facts: PackageFacts,
    #[serde(default)]
    error: Option<ListError>,
}

type Listing = HashMap<PathBuf, ListedPackage>;

fn decode_listing(output: &[u8]) -> Result<Listing, String> {
    let mut listing = Listing::new();
    let stream = serde_json::Deserializer::from_slice(output).into_iter::<ListedPackage>();
    for package in stream {
        let package = package.map_err(|e| format!("failed to decode go list output: {}", e))?;
        listing.insert(PathBuf::from(&package.facts.dir), package);
    }
    Ok(listing)
}

/// Runs `go list -e -json <patterns>` in a directory and returns stdout.
pub trait GoListRunner: Send + Sync {
    fn list(&self, dir: &Path, patterns: &[&str]) -> Result<Vec<u8>, String>;
}

/// The `go` binary on `PATH`.
#[derive(Debug, Default, Clone, Copy)]
pub struct GoCommand;

impl GoListRunner for GoCommand {
    fn list(&self, dir: &Path, patterns: &[&str]) -> Result<Vec<u8>, String> {
        let output = Command::new("go")
            .args(["list", "-e", "-json"])
            .args(patterns)
            .current_dir(dir)
            .stdin(Stdio::null())
            .output()
            .map_err(|e| format!("failed to run go list: {}", e))?;

        if !output.status.success() {
            return Err(format!(
                "go list exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }
        Ok(output.stdout)
    }
}

/// Answers recognizer queries from previously captured output: the
/// `./...` listing, and nothing for any other pattern.
struct CapturedListing(Vec<u8>);

impl GoListRunner for CapturedListing {
    fn list(&self, _dir: &Path, patterns: &[&str]) -> Result<Vec<u8>, String> {
        if patterns == [ALL_PACKAGES] {
            Ok(self.0.clone())
        } else {
            Ok(Vec::new())
        }
    }
}

const ALL_PACKAGES: &str = "./...";

/// `./...` never matches directories under `vendor` or whose name starts
/// with `_`; those are listed one at a time.
fn outside_wildcard(rel_dir: &str) -> bool {
    rel_dir
        .split('/')
        .any(|seg| seg == "vendor" || seg.starts_with('_'))
}

/// Runs `go list -e -json ./...` once per scan, on first use, and answers
/// directory queries from that listing. Directories the wildcard cannot
/// reach get their own `go list` run.
pub struct GoListRecognizer {
    scan_root: PathBuf,
    runner: Arc<dyn GoListRunner>,
    listing: OnceLock<Result<Listing, String>>,
}

impl GoListRecognizer {
    pub fn new(scan_root: PathBuf) -> Self {
        Self::with_runner(scan_root, Arc::new(GoCommand))
    }

    pub fn with_runner(scan_root: PathBuf, runner: Arc<dyn GoListRunner>) -> Self {
        Self {
            scan_root,
            runner,
            listing: OnceLock::new(),
        }
    }

    /// Builds a recognizer from already captured `go list -json ./...` output.
    pub fn from_output(scan_root: PathBuf, output: &[u8]) -> Self {
        Self::with_runner(scan_root, Arc::new(CapturedListing(output.to_vec())))
    }

    fn run_listing(&self) -> Result<Listing, String> {
        info!("Listing packages with go list in {}", self.scan_root.display());
        let output = self.runner.list(&self.scan_root, &[ALL_PACKAGES])?;
        let listing = decode_listing(&output)?;
        debug!("go list reported {} package(s)", listing.len());
        Ok(listing)
    }

    fn listing(&self) -> Result<&Listing, RecognizeError> {
        self.listing
            .get_or_init(|| self.run_listing())
            .as_ref()
            .map_err(|message| RecognizeError::Listing(message.clone()))
    }

    /// Lists a single directory. Failures only affect that directory.
    fn list_directly(
        &self,
        dir: &Path,
        rel_dir: &str,
    ) -> Result<Option<ListedPackage>, RecognizeError> {
        let pattern = format!("./{}", rel_dir);
        trace!(dir = %rel_dir, "Listing directory outside ./...");
        let output = self
            .runner
            .list(&self.scan_root, &[pattern.as_str()])
            .map_err(|message| RecognizeError::invalid(dir, message))?;
        let mut listing =
            decode_listing(&output).map_err(|message| RecognizeError::invalid(dir, message))?;
        Ok(listing.remove(dir))
    }
}

fn facts_of(dir: &Path, package: &ListedPackage) -> Result<PackageFacts, RecognizeError> {
    let mut facts = package.facts.clone();
    if let Some(error) = &package.error {
        if !facts.has_buildable_files() {
            return Err(RecognizeError::invalid(dir, error.err.clone()));
        }
        facts.diagnostics.push(error.err.clone());
    }
    Ok(facts)
}

impl PackageRecognizer for GoListRecognizer {
    fn name(&self) -> &'static str {
        "go-list"
    }

    fn recognize(&self, dir: &Path) -> Result<PackageFacts, RecognizeError> {
        let listing = self.listing()?;
        if let Some(package) = listing.get(dir) {
            return facts_of(dir, package);
        }

        let rel_dir = dir.strip_prefix(&self.scan_root).map(to_slash).unwrap_or_default();
        if rel_dir.is_empty() || rel_dir == "." || !outside_wildcard(&rel_dir) {
            return Err(RecognizeError::NotAPackage(dir.to_path_buf()));
        }

        match self.list_directly(dir, &rel_dir)? {
            Some(package) => facts_of(dir, &package),
            None => Err(RecognizeError::NotAPackage(dir.to_path_buf())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    const LISTING: &str = r#"{
	"Dir": "/repo",
	"ImportPath": "example.com/repo",
	"Name": "repo",
	"Root": "/repo",
	"GoFiles": ["repo.go"],
	"Imports": ["fmt"]
}
{
	"Dir": "/repo/broken",
	"ImportPath": "example.com/repo/broken",
	"Error": {"Err": "no Go files in /repo/broken"}
}
{
	"Dir": "/repo/partial",
	"ImportPath": "example.com/repo/partial",
	"Name": "partial",
	"GoFiles": ["p.go"],
	"Error": {"Err": "cannot find package \"missing\""}
}
"#;

    #[test]
    fn test_recognize_listed_package() {
        let recognizer = GoListRecognizer::from_output(PathBuf::from("/repo"), LISTING.as_bytes());
        let facts = recognizer.recognize(Path::new("/repo")).unwrap();

        assert_eq!(facts.import_path, "example.com/repo");
        assert_eq!(facts.go_files, vec!["repo.go"]);
        assert_eq!(facts.imports, vec!["fmt"]);
    }

    #[test]
    fn test_unlisted_directory_is_not_a_package() {
        let recognizer = GoListRecognizer::from_output(PathBuf::from("/repo"), LISTING.as_bytes());
        let err = recognizer.recognize(Path::new("/repo/docs")).unwrap_err();
        assert!(matches!(err, RecognizeError::NotAPackage(_)));
    }

    #[test]
    fn test_errored_package_without_files_is_invalid() {
        let recognizer = GoListRecognizer::from_output(PathBuf::from("/repo"), LISTING.as_bytes());
        let err = recognizer.recognize(Path::new("/repo/broken")).unwrap_err();
        assert!(matches!(err, RecognizeError::Invalid { .. }));
    }

    #[test]
    fn test_errored_package_with_files_keeps_diagnostic() {
        let recognizer = GoListRecognizer::from_output(PathBuf::from("/repo"), LISTING.as_bytes());
        let facts = recognizer.recognize(Path::new("/repo/partial")).unwrap();
        assert_eq!(facts.diagnostics, vec!["cannot find package \"missing\""]);
    }

    #[test]
    fn test_undecodable_output_is_fatal() {
        let recognizer =
            GoListRecognizer::from_output(PathBuf::from("/repo"), b"{\"Dir\": \"/repo\"} not json");
        let err = recognizer.recognize(Path::new("/repo")).unwrap_err();
        assert!(err.is_fatal());
    }

    const VENDORED: &str = r#"{
	"Dir": "/repo/vendor/example.com/x",
	"ImportPath": "example.com/repo/vendor/example.com/x",
	"Name": "x",
	"GoFiles": ["x.go"],
	"Imports": ["strings"]
}
"#;

    /// Serves canned output per pattern and records every pattern asked for.
    struct RecordingRunner {
        outputs: HashMap<&'static str, Result<&'static str, &'static str>>,
        calls: Mutex<Vec<String>>,
    }

    impl RecordingRunner {
        fn new(outputs: &[(&'static str, Result<&'static str, &'static str>)]) -> Arc<Self> {
            Arc::new(Self {
                outputs: outputs.iter().cloned().collect(),
                calls: Mutex::new(Vec::new()),
            })
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl GoListRunner for RecordingRunner {
        fn list(&self, dir: &Path, patterns: &[&str]) -> Result<Vec<u8>, String> {
            assert_eq!(dir, Path::new("/repo"));
            let pattern = patterns.join(" ");
            self.calls.lock().unwrap().push(pattern.clone());
            match self.outputs.get(pattern.as_str()) {
                Some(Ok(out)) => Ok(out.as_bytes().to_vec()),
                Some(Err(message)) => Err(message.to_string()),
                None => Ok(Vec::new()),
            }
        }
    }

    #[test]
    fn test_vendored_directory_is_listed_on_its_own() {
        let runner = RecordingRunner::new(&[
            ("./...", Ok(LISTING)),
            ("./vendor/example.com/x", Ok(VENDORED)),
        ]);
        let recognizer = GoListRecognizer::with_runner(PathBuf::from("/repo"), runner.clone());

        let facts = recognizer
            .recognize(Path::new("/repo/vendor/example.com/x"))
            .unwrap();
        assert_eq!(facts.go_files, vec!["x.go"]);
        assert_eq!(facts.imports, vec!["strings"]);

        recognizer.recognize(Path::new("/repo")).unwrap();
        assert_eq!(runner.calls(), vec!["./...", "./vendor/example.com/x"]);
    }

    #[test]
    fn test_underscore_directory_is_listed_on_its_own() {
        let runner = RecordingRunner::new(&[("./...", Ok(LISTING))]);
        let recognizer = GoListRecognizer::with_runner(PathBuf::from("/repo"), runner.clone());

        let err = recognizer
            .recognize(Path::new("/repo/Godeps/_workspace/src/example.com/dep"))
            .unwrap_err();
        assert!(matches!(err, RecognizeError::NotAPackage(_)));
        assert_eq!(
            runner.calls(),
            vec!["./...", "./Godeps/_workspace/src/example.com/dep"]
        );
    }

    #[test]
    fn test_ordinary_unlisted_directory_is_not_listed_again() {
        let runner = RecordingRunner::new(&[("./...", Ok(LISTING))]);
        let recognizer = GoListRecognizer::with_runner(PathBuf::from("/repo"), runner.clone());

        let err = recognizer.recognize(Path::new("/repo/docs")).unwrap_err();
        assert!(matches!(err, RecognizeError::NotAPackage(_)));
        assert_eq!(runner.calls(), vec!["./..."]);
    }

    #[test]
    fn test_failed_directory_listing_is_not_fatal() {
        let runner = RecordingRunner::new(&[
            ("./...", Ok(LISTING)),
            ("./vendor/example.com/x", Err("go list exited with 1")),
        ]);
        let recognizer = GoListRecognizer::with_runner(PathBuf::from("/repo"), runner);

        let err = recognizer
            .recognize(Path::new("/repo/vendor/example.com/x"))
            .unwrap_err();
        assert!(matches!(err, RecognizeError::Invalid { .. }));
        assert!(!err.is_fatal());
    }

    #[test]
    fn test_captured_output_answers_vendored_directory_as_not_a_package() {
        let recognizer = GoListRecognizer::from_output(PathBuf::from("/repo"), LISTING.as_bytes());
        let err = recognizer
            .recognize(Path::new("/repo/vendor/example.com/x"))
            .unwrap_err();
        assert!(matches!(err, RecognizeError::NotAPackage(_)));
    }
}
