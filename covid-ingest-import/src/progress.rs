//! Ingestion progress reporting.

/// Trait for receiving ingestion progress updates.
pub trait ImportProgress {
    /// Called after every date of one location has been written.
    fn on_location(&self, current: u64, label: &str);

    /// Called when a phase starts (e.g., "Ingesting recoveries from ...").
    fn on_phase(&self, message: &str);

    /// Called when the run has committed.
    fn on_complete(&self, message: &str);
}

/// A no-op progress reporter that discards all updates.
pub struct SilentProgress;

impl ImportProgress for SilentProgress {
    fn on_location(&self, _current: u64, _label: &str) {}
    fn on_phase(&self, _message: &str) {}
    fn on_complete(&self, _message: &str) {}
}

/// A progress reporter that logs to the `log` crate.
pub struct LogProgress;

impl ImportProgress for LogProgress {
    fn on_location(&self, current: u64, label: &str) {
        if current.is_multiple_of(100) {
            log::info!("  [{}] {}", current, label);
        }
    }

    fn on_phase(&self, message: &str) {
        log::info!("{}", message);
    }

    fn on_complete(&self, message: &str) {
        log::info!("{}", message);
    }
}
