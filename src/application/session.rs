use crate::domain::completion::CompletionClassifier;
use crate::domain::progress::{ProgressUpdate, VideoId, WatchProgress};
use crate::domain::segments::SegmentTracker;
use crate::domain::throttle::SyncThrottle;
use std::time::{Duration, Instant};

/// Progress engine for one learner watching one video.
///
/// Every player variant feeds the same session: tracker first, then the
/// throttle decides whether the tick produces an update worth persisting.
/// The session's own numbers are what the UI shows, whether or not the last
/// flush reached the server.
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    video_id: VideoId,
    total_duration: u32,
    tracker: SegmentTracker,
    throttle: SyncThrottle,
    classifier: CompletionClassifier,
    completed: bool,
}

impl PlaybackSession {
    /// `total_duration` of 0 means not known yet.
    pub fn new(video_id: VideoId, total_duration: u32) -> Self {
        Self::with_tracker(video_id, total_duration, SegmentTracker::new(), false)
    }

    /// Continue from a stored progress row.
    pub fn resume(video_id: VideoId, total_duration: u32, stored: &WatchProgress) -> Self {
        Self::with_tracker(
            video_id,
            total_duration,
            SegmentTracker::resume(stored.watched_duration),
            stored.completed,
        )
    }

    fn with_tracker(
        video_id: VideoId,
        total_duration: u32,
        tracker: SegmentTracker,
        completed: bool,
    ) -> Self {
        Self {
            video_id,
            total_duration,
            tracker,
            throttle: SyncThrottle::default(),
            classifier: CompletionClassifier::default(),
            completed,
        }
    }

    pub fn with_sync_interval(mut self, interval: Duration) -> Self {
        self.throttle = SyncThrottle::new(interval);
        self
    }

    /// Metadata arrived after playback started.
    pub fn set_duration(&mut self, total_duration: u32) {
        self.total_duration = total_duration;
    }

    /// Playback position advanced. Returns an update when one is due.
    pub fn on_tick(&mut self, time: f64, now: Instant) -> Option<ProgressUpdate> {
        self.tracker.record_tick(time);
        if !self.throttle.should_sync(now) {
            return None;
        }
        Some(self.snapshot())
    }

    /// Playback reached the end of the video.
    pub fn on_ended(&mut self, now: Instant) -> ProgressUpdate {
        self.finish(now)
    }

    /// Learner explicitly marked the video as done.
    pub fn mark_complete(&mut self, now: Instant) -> ProgressUpdate {
        self.finish(now)
    }

    fn finish(&mut self, now: Instant) -> ProgressUpdate {
        self.throttle.force(now);
        self.completed = true;
        let watched_duration = if self.total_duration > 0 {
            self.total_duration
        } else {
            self.reported_watched()
        };
        // keep the local view consistent with what was sent
        self.tracker.record_tick(f64::from(watched_duration));
        ProgressUpdate {
            video_id: self.video_id,
            watched_duration,
            completed: true,
        }
    }

    /// Current state as an update, regardless of the throttle.
    pub fn snapshot(&mut self) -> ProgressUpdate {
        let watched_duration = self.reported_watched();
        self.completed |= self.classifier.is_complete(
            self.tracker.effective_watched(),
            f64::from(self.total_duration),
        );
        ProgressUpdate {
            video_id: self.video_id,
            watched_duration,
            completed: self.completed,
        }
    }

    /// Optimistic display percentage, 0..=100.
    pub fn percent(&self) -> f64 {
        if self.total_duration == 0 {
            return 0.0;
        }
        (self.tracker.effective_watched() * 100.0 / f64::from(self.total_duration)).clamp(0.0, 100.0)
    }

    pub fn effective_watched(&self) -> f64 {
        self.tracker.effective_watched()
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn video_id(&self) -> VideoId {
        self.video_id
    }

    pub fn total_duration(&self) -> u32 {
        self.total_duration
    }

    pub fn current_time(&self) -> f64 {
        self.tracker.current_time()
    }

    fn reported_watched(&self) -> u32 {
        let mut watched = self.tracker.effective_watched();
        if self.total_duration > 0 {
            watched = watched.min(f64::from(self.total_duration));
        }
        watched.floor().max(0.0) as u32
    }
}
