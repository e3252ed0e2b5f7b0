use super::context::ScanContext;
use anyhow::Result;

/// One pass over the scan context. Phases run strictly in sequence.
pub trait WorkflowPhase: Send + Sync {
    fn name(&self) -> &'static str;

    fn execute(&self, context: &mut ScanContext) -> Result<()>;
}
