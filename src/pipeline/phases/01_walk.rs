use crate::pipeline::context::{FoundPackage, ScanContext};
use crate::pipeline::phase_trait::WorkflowPhase;
use crate::package::RecognizeError;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::{debug, trace, warn};

const TESTDATA_DIR: &str = "testdata";
const GODEPS_WORKSPACE: &str = "Godeps/_workspace";

/// Depth-first walk from the scan root, recognizing a package in every
/// directory that is not excluded by name.
pub struct WalkPhase;

/// Hidden, underscore-prefixed and `testdata` directories are skipped, but
/// `Godeps/_workspace` is entered unless that convention is disabled.
fn should_descend(rel_dir: &str, name: &str, skip_godeps: bool) -> bool {
    let excluded = name.starts_with('.') || name.starts_with('_') || name == TESTDATA_DIR;
    if !excluded {
        return true;
    }
    !skip_godeps && (rel_dir == GODEPS_WORKSPACE || rel_dir.ends_with("/Godeps/_workspace"))
}

impl WalkPhase {
    fn visit(&self, context: &mut ScanContext, dir: &Path) -> Result<()> {
        let rel_dir = context.relative(dir)?;

        match context.recognizer.recognize(dir) {
            Ok(facts) => {
                trace!(dir = %rel_dir, import_path = %facts.import_path, "Found package");
                context.packages.push(FoundPackage { rel_dir, facts });
            }
            Err(RecognizeError::NotAPackage(_)) => {}
            Err(err) if err.is_fatal() => return Err(err.into()),
            Err(err) => {
                warn!(
                    "Error scanning {} for packages: {}. Ignoring source files in this directory.",
                    dir.display(),
                    err
                );
            }
        }

        let entries = context
            .fs
            .read_dir(dir)
            .with_context(|| format!("Failed to list {}", dir.display()))?;

        for entry in entries.iter().filter(|e| e.is_dir()) {
            let child_rel = context.relative(entry.path())?;
            if should_descend(&child_rel, entry.file_name(), context.config.skip_godeps) {
                self.visit(context, entry.path())?;
            } else {
                debug!(dir = %child_rel, "Skipping directory");
            }
        }

        Ok(())
    }
}

impl WorkflowPhase for WalkPhase {
    fn name(&self) -> &'static str {
        "WalkPhase"
    }

    fn execute(&self, context: &mut ScanContext) -> Result<()> {
        let root = context.root.clone();
        self.visit(context, &root)?;
        debug!("Walk found {} package(s)", context.packages.len());
        Ok(())
    }
}
