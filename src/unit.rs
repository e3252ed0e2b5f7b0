//! Source units: one per recognized package, as emitted to downstream tools.

use crate::package::PackageFacts;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet, HashMap};

pub const UNIT_TYPE: &str = "GoPackage";

/// Operations every unit advertises, each left to automatic tool selection.
pub const DEFAULT_OPS: [&str; 2] = ["depresolve", "graph-all"];

/// A dependency edge: a bare import path until commits are attributed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Dependency {
    Resolved {
        #[serde(rename = "Name")]
        name: String,
        #[serde(rename = "Version")]
        version: String,
    },
    Import(String),
}

impl Dependency {
    pub fn name(&self) -> &str {
        match self {
            Dependency::Import(name) => name,
            Dependency::Resolved { name, .. } => name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct SourceUnit {
    pub name: String,
    #[serde(rename = "Type")]
    pub unit_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub dir: String,
    #[serde(default)]
    pub files: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub dependencies: Vec<Dependency>,
    #[serde(rename = "CommitID", default, skip_serializing_if = "String::is_empty")]
    pub commit_id: String,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub config: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<PackageFacts>,
    #[serde(default)]
    pub ops: BTreeMap<String, Option<String>>,
}

fn join_rel(dir: &str, file: &str) -> String {
    if dir == "." || dir.is_empty() {
        file.to_string()
    } else {
        format!("{}/{}", dir, file)
    }
}

impl SourceUnit {
    /// Fold a package into a unit rooted at `rel_dir` (slash separated,
    /// relative to the scan root).
    pub fn from_facts(mut facts: PackageFacts, rel_dir: &str) -> Self {
        let files = facts.all_files().map(|f| join_rel(rel_dir, f)).collect();

        let imports: BTreeSet<&String> = facts.all_imports().collect();
        let dependencies = imports
            .into_iter()
            .map(|import| Dependency::Import(import.clone()))
            .collect();

        let name = facts.import_path.clone();
        facts.dir = rel_dir.to_string();
        facts.scrub();

        Self {
            name,
            unit_type: UNIT_TYPE.to_string(),
            dir: rel_dir.to_string(),
            files,
            dependencies,
            commit_id: String::new(),
            config: Map::new(),
            data: Some(facts),
            ops: DEFAULT_OPS
                .iter()
                .map(|op| (op.to_string(), None))
                .collect(),
        }
    }

    /// Turn every edge into a `{Name, Version}` record, taking versions from
    /// `commits` (import path to commit ID) and leaving unknown ones empty.
    pub fn resolve_dependencies(&mut self, commits: &HashMap<String, String>) {
        for dep in &mut self.dependencies {
            let name = dep.name().to_string();
            let version = commits.get(&name).cloned().unwrap_or_default();
            *dep = Dependency::Resolved { name, version };
        }
    }

    pub fn set_config(&mut self, key: &str, value: impl Into<Value>) {
        self.config.insert(key.to_string(), value.into());
    }
}
