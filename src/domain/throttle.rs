use std::time::{Duration, Instant};

/// Default minimum wall-clock gap between two progress writes.
pub const DEFAULT_SYNC_INTERVAL: Duration = Duration::from_secs(15);

/// Bounds how often progress is persisted, independently of how often the
/// player reports its position.
#[derive(Debug, Clone)]
pub struct SyncThrottle {
    interval: Duration,
    last_sync: Option<Instant>,
}

impl SyncThrottle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_sync: None,
        }
    }

    /// Returns true when a sync is due and starts a new window.
    ///
    /// The first call of a session is always due.
    pub fn should_sync(&mut self, now: Instant) -> bool {
        let due = match self.last_sync {
            None => true,
            Some(last) => now.saturating_duration_since(last) > self.interval,
        };
        if due {
            self.last_sync = Some(now);
        }
        due
    }

    /// Unconditional trigger (video end, manual completion).
    pub fn force(&mut self, now: Instant) {
        self.last_sync = Some(now);
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn last_sync(&self) -> Option<Instant> {
        self.last_sync
    }
}

impl Default for SyncThrottle {
    fn default() -> Self {
        Self::new(DEFAULT_SYNC_INTERVAL)
    }
}
