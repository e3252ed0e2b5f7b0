use crate::commit::{LockfileError, LockfileFormat};
use crate::pipeline::context::ScanContext;
use crate::pipeline::phase_trait::WorkflowPhase;
use anyhow::Result;
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// Attributes commits to units, from the VCS first and then from lockfiles,
/// and stamps every dependency edge with the commit of the unit it names.
pub struct CommitsPhase;

impl CommitsPhase {
    fn assign_vcs_commits(&self, context: &mut ScanContext) {
        let vcs = context.vcs.clone();
        if !vcs.is_available() {
            warn!(
                "{} command not found; units will have no commit ID from version control",
                vcs.name()
            );
            return;
        }

        for scanned in context.units.iter_mut().filter(|s| !s.is_vendored()) {
            let dir = match scanned.unit.dir.as_str() {
                "." => context.root.clone(),
                rel => context.root.join(rel),
            };
            match vcs.latest_commit(&dir) {
                Ok(commit) => {
                    debug!(unit = %scanned.unit.name, commit = %commit, "Commit from {}", vcs.name());
                    scanned.unit.commit_id = commit;
                }
                Err(err) => warn!("{}", err),
            }
        }
    }

    fn assign_lockfile_commits(&self, context: &mut ScanContext, format: LockfileFormat) {
        let revisions = match format.load(context.fs.as_ref(), &context.root) {
            Ok(revisions) => revisions,
            Err(LockfileError::Missing(_)) => {
                info!("No {} file found.", format.name());
                return;
            }
            Err(err) => {
                warn!("{}", err);
                return;
            }
        };

        for scanned in &mut context.units {
            if let Some(rev) = revisions.get(&scanned.unit.name) {
                debug!(unit = %scanned.unit.name, rev = %rev, "Commit from {}", format.name());
                scanned.unit.commit_id = rev.clone();
            }
        }
    }
}

impl WorkflowPhase for CommitsPhase {
    fn name(&self) -> &'static str {
        "CommitsPhase"
    }

    fn execute(&self, context: &mut ScanContext) -> Result<()> {
        self.assign_vcs_commits(context);
        for format in LockfileFormat::ORDERED {
            self.assign_lockfile_commits(context, format);
        }

        let commits: HashMap<String, String> = context
            .units
            .iter()
            .map(|s| (s.unit.name.clone(), s.unit.commit_id.clone()))
            .collect();
        for scanned in &mut context.units {
            scanned.unit.resolve_dependencies(&commits);
        }

        Ok(())
    }
}
