use crate::pipeline::context::{ScanContext, ScannedUnit};
use crate::pipeline::phase_trait::WorkflowPhase;
use crate::unit::SourceUnit;
use crate::vendor::VendorIdentity;
use anyhow::Result;
use tracing::debug;

/// Folds every found package into a source unit.
pub struct UnitsPhase;

impl WorkflowPhase for UnitsPhase {
    fn name(&self) -> &'static str {
        "UnitsPhase"
    }

    fn execute(&self, context: &mut ScanContext) -> Result<()> {
        let packages = std::mem::take(&mut context.packages);
        context.units = packages
            .into_iter()
            .map(|found| ScannedUnit {
                unit: SourceUnit::from_facts(found.facts, &found.rel_dir),
                identity: VendorIdentity::Local,
            })
            .collect();

        debug!("Built {} unit(s)", context.units.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScanConfig;
    use crate::fs::MockFileSystem;
    use crate::pipeline::context::tests::native_context;
    use crate::pipeline::phases::walk::WalkPhase;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_units_from_walk() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file(
            "main.go",
            "package main\n\nimport (\n\t\"fmt\"\n\t\"example.com/x\"\n)\n",
        );
        fs.add_file("main_test.go", "package main\n\nimport \"testing\"\n");
        fs.add_file("sub/sub.go", "package sub\n\nimport \"fmt\"\n");
        fs.add_file("sub/sub.c", "int f() { return 0; }\n");

        let mut context = native_context(fs, ScanConfig::default());
        WalkPhase.execute(&mut context).unwrap();
        UnitsPhase.execute(&mut context).unwrap();

        assert!(context.packages.is_empty());
        assert_eq!(context.units.len(), 2);

        let root = &context.units[0].unit;
        assert_eq!(root.name, ".");
        assert_eq!(root.dir, ".");
        assert_eq!(root.files, vec!["main.go", "main_test.go"]);
        let deps: Vec<&str> = root.dependencies.iter().map(|d| d.name()).collect();
        assert_eq!(deps, vec!["example.com/x", "fmt", "testing"]);

        let sub = &context.units[1].unit;
        assert_eq!(sub.files, vec!["sub/sub.go", "sub/sub.c"]);

        let mut seen = HashSet::new();
        for scanned in &context.units {
            for file in &scanned.unit.files {
                assert!(seen.insert(file.clone()), "{} listed twice", file);
            }
        }
    }
}
