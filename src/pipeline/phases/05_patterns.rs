use crate::filter::PatternMatcher;
use crate::pipeline::context::ScanContext;
use crate::pipeline::phase_trait::WorkflowPhase;
use anyhow::{Context, Result};
use tracing::debug;

/// Keeps only units whose (final) name matches a configured pattern.
pub struct PatternsPhase;

impl WorkflowPhase for PatternsPhase {
    fn name(&self) -> &'static str {
        "PatternsPhase"
    }

    fn execute(&self, context: &mut ScanContext) -> Result<()> {
        let matcher = PatternMatcher::new(context.config.pkg_patterns.as_slice())
            .context("Invalid package pattern")?;
        if matcher.is_empty() {
            return Ok(());
        }

        let before = context.units.len();
        context.units.retain(|s| matcher.matches(&s.unit.name));
        debug!(
            "Patterns kept {} of {} unit(s)",
            context.units.len(),
            before
        );
        Ok(())
    }
}
