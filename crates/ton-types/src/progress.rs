//! Phase reporting for long-running replays.
//!
//! A sink only observes: it receives a short label before each step that
//! may wait on the network or the emulator, and never influences control
//! flow.

pub trait ProgressSink: Send + Sync {
    fn phase(&self, label: &str);
}

/// Discards every label.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn phase(&self, _label: &str) {}
}

/// Emits each label as a `tracing` info event.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingProgress;

impl ProgressSink for TracingProgress {
    fn phase(&self, label: &str) {
        tracing::info!(phase = label, "replay progress");
    }
}

impl<F> ProgressSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn phase(&self, label: &str) {
        self(label)
    }
}
