//! Per-directory package facts produced by a recognizer.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Role of a file within a package, in the order files are listed in a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileRole {
    Go,
    Cgo,
    IgnoredGo,
    C,
    Cxx,
    ObjectiveC,
    Header,
    Assembly,
    Swig,
    SwigCxx,
    Syso,
    Test,
    ExternalTest,
}

impl FileRole {
    /// Regular sources, then foreign-language, then generated, then tests.
    pub const ORDERED: [FileRole; 13] = [
        FileRole::Go,
        FileRole::Cgo,
        FileRole::IgnoredGo,
        FileRole::C,
        FileRole::Cxx,
        FileRole::ObjectiveC,
        FileRole::Header,
        FileRole::Assembly,
        FileRole::Swig,
        FileRole::SwigCxx,
        FileRole::Syso,
        FileRole::Test,
        FileRole::ExternalTest,
    ];

    /// Role for a non-Go file by extension, if the package loader tracks it.
    pub fn from_extension(ext: &str) -> Option<FileRole> {
        match ext {
            "c" => Some(FileRole::C),
            "cc" | "cpp" | "cxx" => Some(FileRole::Cxx),
            "m" => Some(FileRole::ObjectiveC),
            "h" | "hh" | "hpp" | "hxx" => Some(FileRole::Header),
            "s" | "S" => Some(FileRole::Assembly),
            "swig" => Some(FileRole::Swig),
            "swigcxx" => Some(FileRole::SwigCxx),
            "syso" => Some(FileRole::Syso),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImportRole {
    Regular,
    Test,
    ExternalTest,
}

impl ImportRole {
    pub const ORDERED: [ImportRole; 3] =
        [ImportRole::Regular, ImportRole::Test, ImportRole::ExternalTest];
}

/// Source position of an import, as `file:line`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Position {
    pub filename: String,
    pub line: usize,
}

/// Everything a recognizer reports about one Go package directory.
///
/// Field names follow the JSON emitted by `go list -json`, so the same record
/// decodes listing output and serializes into a unit's `Data` payload.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct PackageFacts {
    pub dir: String,
    pub name: String,
    pub import_path: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub import_comment: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub doc: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub root: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub src_root: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pkg_root: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bin_dir: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conflict_dir: Option<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub go_files: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub cgo_files: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub ignored_go_files: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub c_files: Vec<String>,
    #[serde(rename = "CXXFiles", skip_serializing_if = "Vec::is_empty")]
    pub cxx_files: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub m_files: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub h_files: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub s_files: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub swig_files: Vec<String>,
    #[serde(rename = "SwigCXXFiles", skip_serializing_if = "Vec::is_empty")]
    pub swig_cxx_files: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub syso_files: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub test_go_files: Vec<String>,
    #[serde(rename = "XTestGoFiles", skip_serializing_if = "Vec::is_empty")]
    pub xtest_go_files: Vec<String>,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub imports: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub test_imports: Vec<String>,
    #[serde(rename = "XTestImports", skip_serializing_if = "Vec::is_empty")]
    pub xtest_imports: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub import_pos: Option<BTreeMap<String, Vec<Position>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub test_import_pos: Option<BTreeMap<String, Vec<Position>>>,
    #[serde(rename = "XTestImportPos", skip_serializing_if = "Option::is_none")]
    pub xtest_import_pos: Option<BTreeMap<String, Vec<Position>>>,

    /// Non-fatal scanner messages about this package.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub diagnostics: Vec<String>,
}

impl PackageFacts {
    pub fn files(&self, role: FileRole) -> &[String] {
        match role {
            FileRole::Go => &self.go_files,
            FileRole::Cgo => &self.cgo_files,
            FileRole::IgnoredGo => &self.ignored_go_files,
            FileRole::C => &self.c_files,
            FileRole::Cxx => &self.cxx_files,
            FileRole::ObjectiveC => &self.m_files,
            FileRole::Header => &self.h_files,
            FileRole::Assembly => &self.s_files,
            FileRole::Swig => &self.swig_files,
            FileRole::SwigCxx => &self.swig_cxx_files,
            FileRole::Syso => &self.syso_files,
            FileRole::Test => &self.test_go_files,
            FileRole::ExternalTest => &self.xtest_go_files,
        }
    }

    pub fn files_mut(&mut self, role: FileRole) -> &mut Vec<String> {
        match role {
            FileRole::Go => &mut self.go_files,
            FileRole::Cgo => &mut self.cgo_files,
            FileRole::IgnoredGo => &mut self.ignored_go_files,
            FileRole::C => &mut self.c_files,
            FileRole::Cxx => &mut self.cxx_files,
            FileRole::ObjectiveC => &mut self.m_files,
            FileRole::Header => &mut self.h_files,
            FileRole::Assembly => &mut self.s_files,
            FileRole::Swig => &mut self.swig_files,
            FileRole::SwigCxx => &mut self.swig_cxx_files,
            FileRole::Syso => &mut self.syso_files,
            FileRole::Test => &mut self.test_go_files,
            FileRole::ExternalTest => &mut self.xtest_go_files,
        }
    }

    pub fn imports(&self, role: ImportRole) -> &[String] {
        match role {
            ImportRole::Regular => &self.imports,
            ImportRole::Test => &self.test_imports,
            ImportRole::ExternalTest => &self.xtest_imports,
        }
    }

    /// All files in role order.
    pub fn all_files(&self) -> impl Iterator<Item = &String> + '_ {
        FileRole::ORDERED
            .iter()
            .flat_map(move |role| self.files(*role).iter())
    }

    /// All imports across roles, possibly with duplicates.
    pub fn all_imports(&self) -> impl Iterator<Item = &String> + '_ {
        ImportRole::ORDERED
            .iter()
            .flat_map(move |role| self.imports(*role).iter())
    }

    /// True when at least one file would be compiled or tested.
    pub fn has_buildable_files(&self) -> bool {
        !self.go_files.is_empty()
            || !self.cgo_files.is_empty()
            || !self.test_go_files.is_empty()
            || !self.xtest_go_files.is_empty()
    }

    /// Drop fields that depend on where the scan ran.
    pub fn scrub(&mut self) {
        self.root = None;
        self.src_root = None;
        self.pkg_root = None;
        self.bin_dir = None;
        self.conflict_dir = None;
        self.import_pos = None;
        self.test_import_pos = None;
        self.xtest_import_pos = None;
    }
}
