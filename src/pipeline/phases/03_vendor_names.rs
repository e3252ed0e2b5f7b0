use crate::pipeline::context::ScanContext;
use crate::pipeline::phase_trait::WorkflowPhase;
use crate::vendor::VendorResolver;
use anyhow::Result;
use tracing::debug;

/// Renames units living under a vendoring convention to the import path
/// they are known by, and passes an auto-detected GOPATH on to every unit.
pub struct VendorNamesPhase;

impl WorkflowPhase for VendorNamesPhase {
    fn name(&self) -> &'static str {
        "VendorNamesPhase"
    }

    fn execute(&self, context: &mut ScanContext) -> Result<()> {
        let resolver = VendorResolver::new(&context.root, &context.gopath);

        for scanned in &mut context.units {
            let identity = resolver.resolve(&scanned.unit.dir);
            if let Some(name) = identity.import_path() {
                debug!(dir = %scanned.unit.dir, name, "Renaming vendored unit");
                scanned.unit.name = name.to_string();
                if let Some(data) = &mut scanned.unit.data {
                    data.import_path = name.to_string();
                }
            }
            scanned.identity = identity;
        }

        // Downstream tools never see the auto-detected value otherwise.
        if context.auto_gopath {
            let gopath = context.relative_gopath()?;
            for scanned in &mut context.units {
                scanned.unit.set_config("GOPATH", gopath.clone());
            }
        }

        Ok(())
    }
}
