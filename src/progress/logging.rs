//! Logging-based progress handler

use super::{ProgressEvent, ProgressHandler};
use tracing::{debug, info, warn};

/// Handler that logs progress events using tracing
#[derive(Debug, Default, Clone, Copy)]
pub struct LoggingHandler;

impl ProgressHandler for LoggingHandler {
    fn on_progress(&self, event: &ProgressEvent) {
        match event {
            ProgressEvent::Started { root } => {
                info!(root = %root, "Scanning for Go packages");
            }
            ProgressEvent::PhaseStarted { phase } => {
                debug!(phase, "Phase started");
            }
            ProgressEvent::PhaseComplete {
                phase,
                units,
                elapsed,
            } => {
                debug!(
                    phase,
                    units,
                    elapsed_ms = elapsed.as_millis(),
                    "Phase complete"
                );
            }
            ProgressEvent::Completed { units, total_time } => {
                info!(
                    units,
                    total_time_ms = total_time.as_millis(),
                    "Scan complete"
                );
            }
            ProgressEvent::Failed { error } => {
                warn!(error = %error, "Scan failed");
            }
        }
    }
}
