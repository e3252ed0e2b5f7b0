use super::context::ScanContext;
use super::phase_trait::WorkflowPhase;
use super::phases::{
    commits::CommitsPhase, patterns::PatternsPhase, prune::PrunePhase, units::UnitsPhase,
    vendor_dirs::VendorDirsPhase, vendor_names::VendorNamesPhase, walk::WalkPhase,
};
use crate::progress::{ProgressEvent, ProgressHandler};
use crate::unit::SourceUnit;
use anyhow::{Context, Result};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

/// Phases in execution order. Commits must see rewritten vendor names, and
/// vendored units are only dropped once every lookup has used them.
pub fn workflow_phases() -> Vec<Box<dyn WorkflowPhase>> {
    vec![
        Box::new(WalkPhase),
        Box::new(UnitsPhase),
        Box::new(VendorNamesPhase),
        Box::new(CommitsPhase),
        Box::new(PatternsPhase),
        Box::new(VendorDirsPhase),
        Box::new(PrunePhase),
    ]
}

pub struct PipelineOrchestrator {
    progress_handler: Option<Arc<dyn ProgressHandler>>,
}

impl PipelineOrchestrator {
    pub fn new(progress_handler: Option<Arc<dyn ProgressHandler>>) -> Self {
        Self { progress_handler }
    }

    fn notify(&self, event: ProgressEvent) {
        if let Some(handler) = &self.progress_handler {
            handler.on_progress(&event);
        }
    }

    pub fn execute(&self, mut context: ScanContext) -> Result<Vec<SourceUnit>> {
        let start = Instant::now();
        info!("Starting scan of {}", context.root.display());
        self.notify(ProgressEvent::Started {
            root: context.root.display().to_string(),
        });

        for phase in workflow_phases() {
            let phase_name = phase.name();
            self.notify(ProgressEvent::PhaseStarted { phase: phase_name });

            let phase_start = Instant::now();
            if let Err(err) = phase
                .execute(&mut context)
                .with_context(|| format!("Phase {} failed", phase_name))
            {
                self.notify(ProgressEvent::Failed {
                    error: format!("{:#}", err),
                });
                return Err(err);
            }

            self.notify(ProgressEvent::PhaseComplete {
                phase: phase_name,
                units: context.units.len(),
                elapsed: phase_start.elapsed(),
            });
            debug!("Phase {} complete", phase_name);
        }

        let units = context.into_units();
        self.notify(ProgressEvent::Completed {
            units: units.len(),
            total_time: start.elapsed(),
        });
        Ok(units)
    }
}
