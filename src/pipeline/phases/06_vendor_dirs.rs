use crate::pipeline::context::ScanContext;
use crate::pipeline::phase_trait::WorkflowPhase;
use crate::vendor::{vendor_root, visible_vendor_roots};
use anyhow::Result;
use std::collections::BTreeSet;
use tracing::debug;

pub const VENDOR_DIRS_KEY: &str = "VendorDirs";

/// Records, per unit, the `vendor` directories its imports may resolve
/// into, nearest first. Only units kept by the package patterns contribute
/// roots; vendored ones still count since pruning comes later.
pub struct VendorDirsPhase;

impl WorkflowPhase for VendorDirsPhase {
    fn name(&self) -> &'static str {
        "VendorDirsPhase"
    }

    fn execute(&self, context: &mut ScanContext) -> Result<()> {
        let roots: BTreeSet<String> = context
            .units
            .iter()
            .filter_map(|s| vendor_root(&s.unit.dir))
            .collect();
        debug!("Found {} vendor root(s)", roots.len());

        if roots.is_empty() {
            return Ok(());
        }

        for scanned in &mut context.units {
            let visible = visible_vendor_roots(&scanned.unit.dir, &roots);
            if !visible.is_empty() {
                scanned.unit.set_config(VENDOR_DIRS_KEY, visible);
            }
        }

        Ok(())
    }
}
