use crate::pipeline::context::ScanContext;
use crate::pipeline::phase_trait::WorkflowPhase;
use anyhow::Result;
use tracing::debug;

/// Drops vendored units. Their names and commits have already been used by
/// the earlier phases; downstream they are dependencies, not units.
pub struct PrunePhase;

impl WorkflowPhase for PrunePhase {
    fn name(&self) -> &'static str {
        "PrunePhase"
    }

    fn execute(&self, context: &mut ScanContext) -> Result<()> {
        context.units.retain(|s| {
            if s.is_vendored() {
                debug!(unit = %s.unit.name, dir = %s.unit.dir, "Dropping vendored unit");
                false
            } else {
                true
            }
        });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ScanConfig;
    use crate::fs::MockFileSystem;
    use crate::pipeline::context::tests::native_context;
    use crate::pipeline::phases::{units::UnitsPhase, vendor_names::VendorNamesPhase, walk::WalkPhase};
    use std::sync::Arc;

    #[test]
    fn test_prunes_only_vendored_units() {
        let fs = Arc::new(MockFileSystem::new());
        fs.add_file("main.go", "package main\n");
        fs.add_file("vendor/src/example.com/x/x.go", "package x\n");
        fs.add_file("vendor/github.com/a/b/b.go", "package b\n");
        fs.add_file("Godeps/_workspace/src/example.com/g/g.go", "package g\n");

        let mut context = native_context(fs, ScanConfig::default());
        WalkPhase.execute(&mut context).unwrap();
        UnitsPhase.execute(&mut context).unwrap();
        VendorNamesPhase.execute(&mut context).unwrap();
        PrunePhase.execute(&mut context).unwrap();

        let names: Vec<&str> = context.units.iter().map(|s| s.unit.name.as_str()).collect();
        assert_eq!(names, vec![".", "example.com/x"]);
    }
}
