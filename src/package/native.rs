//! In-process Go package recognizer.
//!
//! Mirrors what Go's package loader decides for a single directory: which
//! files belong to the package, which are excluded by build constraints or
//! `_GOOS`/`_GOARCH` file name suffixes, and which import paths each group of
//! files pulls in. Only file headers are read; nothing is type-checked.

use super::constraint::Constraints;
use super::{FileRole, PackageFacts, PackageRecognizer, Position, RecognizeError};
use crate::fs::FileSystem;
use regex::Regex;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};
use tracing::trace;

const KNOWN_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "js", "linux",
    "nacl", "netbsd", "openbsd", "plan9", "solaris", "wasip1", "windows", "zos",
];

/// GOOS values that satisfy the `unix` build tag.
const UNIX_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "linux",
    "netbsd", "openbsd", "solaris",
];

const KNOWN_ARCH: &[&str] = &[
    "386", "amd64", "amd64p32", "arm", "armbe", "arm64", "arm64be", "loong64", "mips", "mipsle",
    "mips64", "mips64le", "mips64p32", "mips64p32le", "ppc", "ppc64", "ppc64le", "riscv",
    "riscv64", "s390", "s390x", "sparc", "sparc64", "wasm",
];

fn package_clause_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^package\s+([A-Za-z_][A-Za-z0-9_]*)").expect("package regex is valid")
    })
}

fn single_import_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^import\s+(?:[A-Za-z_.][A-Za-z0-9_]*\s+)?["`]([^"`]+)["`]"#)
            .expect("import regex is valid")
    })
}

fn block_import_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"^(?:[A-Za-z_.][A-Za-z0-9_]*\s+)?["`]([^"`]+)["`]"#)
            .expect("import regex is valid")
    })
}

/// What the header of one `.go` file declares.
#[derive(Debug, Default, PartialEq, Eq)]
struct GoFileHeader {
    package: String,
    imports: Vec<(String, usize)>,
    constraints: Constraints,
}

impl GoFileHeader {
    fn imports_cgo(&self) -> bool {
        self.imports.iter().any(|(path, _)| path == "C")
    }
}

fn parse_header(content: &str) -> Option<GoFileHeader> {
    let mut header = GoFileHeader::default();
    let mut in_comment = false;
    let mut in_import_block = false;
    let mut seen_package = false;

    for (index, raw) in content.lines().enumerate() {
        let line_no = index + 1;
        let mut line = raw.trim();

        if in_comment {
            match line.find("*/") {
                Some(end) => {
                    in_comment = false;
                    line = line[end + 2..].trim();
                }
                None => continue,
            }
        }
        while let Some(rest) = line.strip_prefix("/*") {
            match rest.find("*/") {
                Some(end) => line = rest[end + 2..].trim(),
                None => {
                    in_comment = true;
                    line = "";
                }
            }
        }
        if line.is_empty() {
            continue;
        }

        if !seen_package {
            if line.starts_with("//") {
                header.constraints.record(line);
                continue;
            }
            let caps = package_clause_re().captures(line)?;
            header.package = caps[1].to_string();
            seen_package = true;
            continue;
        }

        if line.starts_with("//") {
            continue;
        }

        if in_import_block {
            if line.starts_with(')') {
                in_import_block = false;
            } else if let Some(caps) = block_import_re().captures(line) {
                header.imports.push((caps[1].to_string(), line_no));
            }
            continue;
        }

        if let Some(rest) = line.strip_prefix("import") {
            let rest = rest.trim_start();
            if let Some(inner) = rest.strip_prefix('(') {
                let inner = inner.trim();
                if let Some(caps) = block_import_re().captures(inner) {
                    header.imports.push((caps[1].to_string(), line_no));
                }
                in_import_block = !inner.ends_with(')');
            } else if let Some(caps) = single_import_re().captures(line) {
                header.imports.push((caps[1].to_string(), line_no));
            }
            continue;
        }

        // First declaration ends the import section.
        break;
    }

    seen_package.then_some(header)
}

fn host_goos() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

fn host_goarch() -> &'static str {
    match std::env::consts::ARCH {
        "x86_64" => "amd64",
        "x86" => "386",
        "aarch64" => "arm64",
        "powerpc64" => "ppc64",
        "wasm32" => "wasm",
        other => other,
    }
}

/// Collects imports for one role as a sorted map of path to positions.
type ImportTable = BTreeMap<String, Vec<Position>>;

pub struct NativeRecognizer {
    fs: Arc<dyn FileSystem>,
    scan_root: PathBuf,
    import_root: Option<String>,
    goos: String,
    goarch: String,
}

impl NativeRecognizer {
    pub fn new(fs: Arc<dyn FileSystem>, scan_root: PathBuf, import_root: Option<String>) -> Self {
        Self {
            fs,
            scan_root,
            import_root,
            goos: host_goos().to_string(),
            goarch: host_goarch().to_string(),
        }
    }

    pub fn with_target(mut self, goos: &str, goarch: &str) -> Self {
        self.goos = goos.to_string();
        self.goarch = goarch.to_string();
        self
    }

    /// Build tags satisfied by the target: GOOS, GOARCH, `unix`, the `gc`
    /// toolchain with cgo, and every `go1.N` release tag.
    fn tag_matches(&self, tag: &str) -> bool {
        match tag {
            "gc" | "cgo" => true,
            "unix" => UNIX_OS.contains(&self.goos.as_str()),
            _ if tag.starts_with("go1.") => true,
            _ => self.os_matches(tag) || tag == self.goarch,
        }
    }

    fn os_matches(&self, tag: &str) -> bool {
        tag == self.goos
            || (tag == "linux" && self.goos == "android")
            || (tag == "solaris" && self.goos == "illumos")
            || (tag == "darwin" && self.goos == "ios")
    }

    /// Applies the `name_GOOS_GOARCH.go` convention.
    fn file_matches_target(&self, file_name: &str) -> bool {
        let stem = match file_name.find('.') {
            Some(dot) => &file_name[..dot],
            None => file_name,
        };
        let Some(underscore) = stem.find('_') else {
            return true;
        };
        let mut parts: Vec<&str> = stem[underscore..].split('_').collect();
        if parts.len() >= 2 && parts.last() == Some(&"test") {
            parts.pop();
        }

        let n = parts.len();
        if n >= 3 && KNOWN_OS.contains(&parts[n - 2]) && KNOWN_ARCH.contains(&parts[n - 1]) {
            return self.os_matches(parts[n - 2]) && parts[n - 1] == self.goarch;
        }
        if n >= 2 && KNOWN_OS.contains(&parts[n - 1]) {
            return self.os_matches(parts[n - 1]);
        }
        if n >= 2 && KNOWN_ARCH.contains(&parts[n - 1]) {
            return parts[n - 1] == self.goarch;
        }
        true
    }

    fn import_path_for(&self, dir: &Path) -> String {
        let rel: Vec<String> = dir
            .strip_prefix(&self.scan_root)
            .map(|p| {
                p.components()
                    .map(|c| c.as_os_str().to_string_lossy().to_string())
                    .collect()
            })
            .unwrap_or_default();
        let rel = rel.join("/");

        match (&self.import_root, rel.is_empty()) {
            (Some(root), true) => root.clone(),
            (Some(root), false) => format!("{}/{}", root.trim_end_matches('/'), rel),
            (None, true) => ".".to_string(),
            (None, false) => rel,
        }
    }
}

fn record_imports(table: &mut ImportTable, header: &GoFileHeader, file: &Path) {
    for (path, line) in &header.imports {
        table.entry(path.clone()).or_default().push(Position {
            filename: file.display().to_string(),
            line: *line,
        });
    }
}

impl PackageRecognizer for NativeRecognizer {
    fn name(&self) -> &'static str {
        "native"
    }

    fn recognize(&self, dir: &Path) -> Result<PackageFacts, RecognizeError> {
        let entries = self
            .fs
            .read_dir(dir)
            .map_err(|e| RecognizeError::invalid(dir, e.to_string()))?;

        let mut facts = PackageFacts {
            dir: dir.display().to_string(),
            import_path: self.import_path_for(dir),
            root: Some(self.scan_root.display().to_string()),
            ..Default::default()
        };

        let mut imports = ImportTable::new();
        let mut test_imports = ImportTable::new();
        let mut xtest_imports = ImportTable::new();
        let mut first_package: Option<(String, String)> = None;

        // Symlinks count as files unless they point at a directory.
        for entry in entries
            .iter()
            .filter(|e| !e.is_dir() && !self.fs.is_dir(e.path()))
        {
            let name = entry.file_name();
            if name.starts_with('.') || name.starts_with('_') {
                continue;
            }

            let Some(ext) = Path::new(name).extension().and_then(|e| e.to_str()) else {
                continue;
            };

            if ext != "go" {
                if let Some(role) = FileRole::from_extension(ext) {
                    if self.file_matches_target(name) {
                        facts.files_mut(role).push(name.to_string());
                    }
                }
                continue;
            }

            if !self.file_matches_target(name) {
                facts.ignored_go_files.push(name.to_string());
                continue;
            }

            let content = self
                .fs
                .read_to_string(entry.path())
                .map_err(|e| RecognizeError::invalid(dir, e.to_string()))?;
            let header = parse_header(&content).ok_or_else(|| {
                RecognizeError::invalid(dir, format!("{}: expected 'package' clause", name))
            })?;

            let excluded = !header.constraints.satisfied_by(|tag| self.tag_matches(tag));
            if excluded || header.package == "documentation" {
                facts.ignored_go_files.push(name.to_string());
                continue;
            }

            let is_test = name.ends_with("_test.go");
            let is_xtest = is_test && header.package.ends_with("_test");
            let package = if is_xtest {
                header
                    .package
                    .strip_suffix("_test")
                    .unwrap_or(&header.package)
                    .to_string()
            } else {
                header.package.clone()
            };

            match &first_package {
                None => first_package = Some((package.clone(), name.to_string())),
                Some((expected, first_file)) if !is_xtest && *expected != package => {
                    return Err(RecognizeError::invalid(
                        dir,
                        format!(
                            "found packages {} ({}) and {} ({})",
                            expected, first_file, package, name
                        ),
                    ));
                }
                Some(_) => {}
            }

            let file_path = entry.path();
            if is_xtest {
                facts.xtest_go_files.push(name.to_string());
                record_imports(&mut xtest_imports, &header, file_path);
            } else if is_test {
                facts.test_go_files.push(name.to_string());
                record_imports(&mut test_imports, &header, file_path);
            } else {
                if header.imports_cgo() {
                    facts.cgo_files.push(name.to_string());
                } else {
                    facts.go_files.push(name.to_string());
                }
                record_imports(&mut imports, &header, file_path);
            }
            trace!(file = %file_path.display(), package = %header.package, "classified Go file");
        }

        if !facts.has_buildable_files() {
            return Err(RecognizeError::NotAPackage(dir.to_path_buf()));
        }

        facts.name = first_package.map(|(name, _)| name).unwrap_or_default();
        facts.imports = imports.keys().cloned().collect();
        facts.test_imports = test_imports.keys().cloned().collect();
        facts.xtest_imports = xtest_imports.keys().cloned().collect();
        facts.import_pos = Some(imports);
        facts.test_import_pos = Some(test_imports);
        facts.xtest_import_pos = Some(xtest_imports);

        Ok(facts)
    }
}
