use chrono::{DateTime, Utc};
use std::time::Duration;

/// Decides when periodic progress should be written to history.
///
/// Time comes from the caller's clock so that tests can drive it.
#[derive(Debug, Clone)]
pub struct ProgressTracker {
    /// Last time progress was saved
    last_progress_save: Option<DateTime<Utc>>,
    /// Minimum time between periodic saves
    save_interval: Duration,
}

impl ProgressTracker {
    pub fn new(save_interval: Duration) -> Self {
        Self {
            last_progress_save: None,
            save_interval,
        }
    }

    /// True when nothing was saved yet or the interval has elapsed
    pub fn should_save_progress(&self, now: DateTime<Utc>) -> bool {
        match self.last_progress_save {
            None => true,
            Some(last) => (now - last)
                .to_std()
                .is_ok_and(|elapsed| elapsed >= self.save_interval),
        }
    }

    pub fn mark_saved(&mut self, now: DateTime<Utc>) {
        self.last_progress_save = Some(now);
    }

    /// Forget the last save (e.g., when starting new media)
    pub fn reset_save_timer(&mut self) {
        self.last_progress_save = None;
    }
}
