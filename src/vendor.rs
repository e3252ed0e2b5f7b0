//! Vendoring conventions.
//!
//! Three layouts embed third-party Go code inside a repository:
//!
//! - a GOPATH entry inside the repository (`vendor/src/...`,
//!   `Godeps/_workspace/src/...`) whose `src` tree holds import paths,
//! - the nested `vendor/` directory of Go 1.5+,
//! - the legacy Godeps workspace `Godeps/_workspace/src/`.
//!
//! Each is a rule mapping a unit directory (slash separated, relative to the
//! scan root) to the import path the code is known by.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VendorConvention {
    NestedVendor,
    GodepsWorkspace,
}

/// What a unit directory resolves to under the vendoring conventions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VendorIdentity {
    Local,
    /// Inside a configured GOPATH `src` tree: renamed, still emitted.
    GopathRelative(String),
    /// Third-party code: renamed for lookups, then dropped from the output.
    Vendored {
        convention: VendorConvention,
        import_path: String,
    },
}

impl VendorIdentity {
    /// The rewritten unit name, if any convention applies.
    pub fn import_path(&self) -> Option<&str> {
        match self {
            VendorIdentity::Local => None,
            VendorIdentity::GopathRelative(path) => Some(path),
            VendorIdentity::Vendored { import_path, .. } => Some(import_path),
        }
    }

    pub fn is_vendored(&self) -> bool {
        matches!(self, VendorIdentity::Vendored { .. })
    }
}

/// A convention marked by a path segment; the import path follows it.
struct SegmentConvention {
    convention: VendorConvention,
    segment: &'static str,
}

const SEGMENT_CONVENTIONS: [SegmentConvention; 2] = [
    SegmentConvention {
        convention: VendorConvention::NestedVendor,
        segment: "vendor",
    },
    SegmentConvention {
        convention: VendorConvention::GodepsWorkspace,
        segment: "Godeps/_workspace/src",
    },
];

impl SegmentConvention {
    /// Byte index where the innermost occurrence of the segment starts.
    fn find(&self, dir: &str) -> Option<usize> {
        let inner = format!("/{}/", self.segment);
        if let Some(i) = dir.rfind(&inner) {
            return Some(i + 1);
        }
        if dir.starts_with(&format!("{}/", self.segment)) {
            return Some(0);
        }
        None
    }

    /// `Some(identity)` when the segment occurs in `dir`, decided by what
    /// follows it.
    fn identify(&self, dir: &str) -> Option<Option<VendorIdentity>> {
        let start = self.find(dir)?;
        let rest = &dir[start + self.segment.len() + 1..];
        if rest.is_empty() || rest == "src" || rest.starts_with("src/") {
            return Some(None);
        }
        Some(Some(VendorIdentity::Vendored {
            convention: self.convention,
            import_path: rest.to_string(),
        }))
    }
}

/// Index of the innermost `vendor` segment in a slash-separated directory.
pub fn find_vendor(dir: &str) -> Option<usize> {
    SEGMENT_CONVENTIONS[0].find(dir)
}

/// Resolves unit directories to their externally visible import paths.
#[derive(Debug, Clone, Default)]
pub struct VendorResolver {
    gopath_src_dirs: Vec<String>,
}

impl VendorResolver {
    /// `gopath_dirs` are GOPATH entries relative to the scan root, or absolute
    /// paths under it. Entries outside the scan root never match.
    pub fn new(scan_root: &Path, gopath_dirs: &[PathBuf]) -> Self {
        let gopath_src_dirs = gopath_dirs
            .iter()
            .filter_map(|dir| {
                let rel = if dir.is_absolute() {
                    dir.strip_prefix(scan_root).ok()?.to_path_buf()
                } else {
                    dir.clone()
                };
                Some(to_slash(&rel.join("src")))
            })
            .collect();
        Self { gopath_src_dirs }
    }

    pub fn gopath_src_dirs(&self) -> &[String] {
        &self.gopath_src_dirs
    }

    pub fn resolve(&self, dir: &str) -> VendorIdentity {
        for convention in &SEGMENT_CONVENTIONS {
            if let Some(decided) = convention.identify(dir) {
                if let Some(identity) = decided {
                    return identity;
                }
                break;
            }
        }

        for src in &self.gopath_src_dirs {
            if dir == src {
                return VendorIdentity::GopathRelative(".".to_string());
            }
            if let Some(rest) = dir.strip_prefix(src.as_str()).and_then(|r| r.strip_prefix('/')) {
                return VendorIdentity::GopathRelative(rest.to_string());
            }
        }

        VendorIdentity::Local
    }
}

/// Slash-separated form of a relative path, `.` for the empty path.
pub fn to_slash(path: &Path) -> String {
    let parts: Vec<String> = path
        .components()
        .filter(|c| !matches!(c, std::path::Component::CurDir))
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect();
    if parts.is_empty() {
        ".".to_string()
    } else {
        parts.join("/")
    }
}

/// The vendor root (`.../vendor`) a unit directory sits under, skipping the
/// GOPATH-style `vendor/src/` layout.
pub fn vendor_root(dir: &str) -> Option<String> {
    let i = find_vendor(dir)?;
    if dir[i..].starts_with("vendor/src/") {
        return None;
    }
    Some(dir[..i + "vendor".len()].to_string())
}

/// Vendor roots usable from `unit_dir`, most specific first.
///
/// A root is usable when it hangs off the scan root or when the unit lives
/// below the root's parent directory.
pub fn visible_vendor_roots(unit_dir: &str, roots: &BTreeSet<String>) -> Vec<String> {
    let unit_prefix = format!("{}/", unit_dir);
    let mut visible: Vec<String> = roots
        .iter()
        .filter(|root| {
            let base = match root.rfind('/') {
                Some(i) => &root[..i],
                None => ".",
            };
            base == "." || unit_prefix.starts_with(&format!("{}/", base))
        })
        .cloned()
        .collect();

    visible.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));
    visible
}

#[cfg(test)]
mod tests {
    use super::*;
    use yare::parameterized;

    fn resolver() -> VendorResolver {
        VendorResolver::new(Path::new("/repo"), &[PathBuf::from("vendor")])
    }

    fn vendored(convention: VendorConvention, path: &str) -> VendorIdentity {
        VendorIdentity::Vendored {
            convention,
            import_path: path.to_string(),
        }
    }

    #[parameterized(
        root = { ".", VendorIdentity::Local },
        plain = { "pkg/util", VendorIdentity::Local },
        nested = { "vendor/github.com/a/b", vendored(VendorConvention::NestedVendor, "github.com/a/b") },
        deep = { "cmd/tool/vendor/golang.org/x/net", vendored(VendorConvention::NestedVendor, "golang.org/x/net") },
        innermost_wins = { "vendor/a/b/vendor/c/d", vendored(VendorConvention::NestedVendor, "c/d") },
        vendor_dir_itself = { "vendor", VendorIdentity::Local },
        similar_name = { "vendored/x", VendorIdentity::Local },
        godeps = { "Godeps/_workspace/src/github.com/a/b", vendored(VendorConvention::GodepsWorkspace, "github.com/a/b") },
        godeps_src_root = { "Godeps/_workspace/src", VendorIdentity::Local },
        gopath_src = { "vendor/src/example.com/x", VendorIdentity::GopathRelative("example.com/x".to_string()) },
        gopath_src_root = { "vendor/src", VendorIdentity::GopathRelative(".".to_string()) },
    )]
    fn test_resolve(dir: &str, expected: VendorIdentity) {
        assert_eq!(resolver().resolve(dir), expected);
    }

    #[test]
    fn test_gopath_src_not_vendored_without_gopath() {
        let resolver = VendorResolver::default();
        assert_eq!(resolver.resolve("vendor/src/example.com/x"), VendorIdentity::Local);
    }

    #[test]
    fn test_resolve_is_idempotent_on_resolved_names() {
        let resolver = resolver();
        for dir in ["vendor/github.com/a/b", "Godeps/_workspace/src/example.com/x"] {
            let first = resolver.resolve(dir);
            let name = first.import_path().unwrap();
            assert_eq!(resolver.resolve(name), VendorIdentity::Local);
        }
    }

    #[test]
    fn test_absolute_gopath_under_root() {
        let resolver = VendorResolver::new(
            Path::new("/repo"),
            &[PathBuf::from("/repo/Godeps/_workspace"), PathBuf::from("/elsewhere")],
        );
        assert_eq!(resolver.gopath_src_dirs(), &["Godeps/_workspace/src".to_string()]);
    }

    #[parameterized(
        top = { "vendor/github.com/a", Some("vendor") },
        nested = { "svc/vendor/github.com/a", Some("svc/vendor") },
        gopath_style = { "vendor/src/github.com/a", None },
        none = { "pkg/a", None },
    )]
    fn test_vendor_root(dir: &str, expected: Option<&str>) {
        assert_eq!(vendor_root(dir).as_deref(), expected);
    }

    #[test]
    fn test_visible_vendor_roots() {
        let roots: BTreeSet<String> = ["vendor", "svc/vendor", "other/vendor"]
            .into_iter()
            .map(String::from)
            .collect();

        assert_eq!(visible_vendor_roots(".", &roots), vec!["vendor"]);
        assert_eq!(
            visible_vendor_roots("svc/api", &roots),
            vec!["svc/vendor", "vendor"]
        );
        assert_eq!(visible_vendor_roots("svc", &roots), vec!["svc/vendor", "vendor"]);
        assert_eq!(visible_vendor_roots("svcx", &roots), vec!["vendor"]);
    }

    #[test]
    fn test_to_slash() {
        assert_eq!(to_slash(Path::new("")), ".");
        assert_eq!(to_slash(Path::new("./a/b")), "a/b");
        assert_eq!(to_slash(Path::new("vendor/src")), "vendor/src");
    }
}
