//! Progress handler trait and events

use std::time::Duration;

/// Events emitted while a scan runs
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Started { root: String },

    PhaseStarted { phase: &'static str },

    /// `units` is the unit count once the phase finished.
    PhaseComplete {
        phase: &'static str,
        units: usize,
        elapsed: Duration,
    },

    Completed { units: usize, total_time: Duration },

    Failed { error: String },
}

pub trait ProgressHandler: Send + Sync {
    fn on_progress(&self, event: &ProgressEvent);
}
