//! Watched-segment bookkeeping for a single playback session.
//!
//! The timeline is cut into fixed 10-second buckets. Every playback tick marks
//! the bucket it falls into; revisiting a bucket is a no-op, so seeking back and
//! forth never inflates the count.

use std::collections::BTreeSet;

/// Width of one watched segment, in seconds.
pub const SEGMENT_SECONDS: u64 = 10;

#[derive(Debug, Clone, Default)]
pub struct SegmentTracker {
    segments: BTreeSet<u64>,
    current_time: f64,
    high_water: f64,
}

impl SegmentTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a tracker from a persisted watched duration.
    ///
    /// Every bucket below `floor(watched / 10)` is assumed visited. This is an
    /// approximation of the previous session, not a replay.
    pub fn resume(watched_duration: u32) -> Self {
        let full_segments = u64::from(watched_duration) / SEGMENT_SECONDS;
        let current_time = f64::from(watched_duration);
        Self {
            segments: (0..full_segments).collect(),
            current_time,
            high_water: current_time,
        }
    }

    /// Record the playback position reported by the player.
    pub fn record_tick(&mut self, time: f64) {
        if !time.is_finite() || time < 0.0 {
            return;
        }

        self.current_time = time;
        self.segments.insert(segment_of(time));
        self.high_water = self.high_water.max(self.estimate());
    }

    /// Larger of the raw playback time and the segment-derived estimate.
    ///
    /// Never lower than a value already returned in this session.
    pub fn effective_watched(&self) -> f64 {
        self.high_water.max(self.estimate())
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn contains(&self, segment: u64) -> bool {
        self.segments.contains(&segment)
    }

    pub fn current_time(&self) -> f64 {
        self.current_time
    }

    fn estimate(&self) -> f64 {
        let from_segments = (self.segments.len() as u64 * SEGMENT_SECONDS) as f64;
        self.current_time.max(from_segments)
    }
}

fn segment_of(time: f64) -> u64 {
    (time / SEGMENT_SECONDS as f64).floor() as u64
}
