use super::video::Video;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub type UserId = i64;
pub type VideoId = i64;

/// Durable progress of one learner on one video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchProgress {
    pub user_id: UserId,
    pub video_id: VideoId,
    pub watched_duration: u32,
    pub completed: bool,
    pub last_watched_at: DateTime<Utc>,
}

impl WatchProgress {
    /// Apply an incoming report on top of the stored row (if any).
    ///
    /// Watched duration only grows and completion is sticky, so the result
    /// does not depend on the order in which reports arrive.
    pub fn merged(
        stored: Option<&WatchProgress>,
        user_id: UserId,
        video_id: VideoId,
        watched_duration: u32,
        completed: bool,
        now: DateTime<Utc>,
    ) -> WatchProgress {
        let (stored_watched, stored_completed) = stored
            .map(|row| (row.watched_duration, row.completed))
            .unwrap_or((0, false));

        WatchProgress {
            user_id,
            video_id,
            watched_duration: stored_watched.max(watched_duration),
            completed: stored_completed || completed,
            last_watched_at: now,
        }
    }
}

/// Body of `POST /api/progress`. The user comes from the session, never from here.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressUpdate {
    pub video_id: VideoId,
    pub watched_duration: u32,
    pub completed: bool,
}

/// Per-learner roll-up shown on the "my progress" page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary {
    pub total_videos: usize,
    pub completed_videos: usize,
    pub overall_percent: u32,
    pub total_duration: u64,
    pub watched_duration: u64,
}

impl ProgressSummary {
    /// Rows for videos missing from `videos` are ignored.
    pub fn compute(videos: &[Video], progress: &[WatchProgress]) -> Self {
        let total_videos = videos.len();
        let in_catalog: HashSet<VideoId> = videos.iter().map(|video| video.id).collect();
        let rows: Vec<&WatchProgress> = progress
            .iter()
            .filter(|row| in_catalog.contains(&row.video_id))
            .collect();

        let completed_videos = rows.iter().filter(|row| row.completed).count();
        let overall_percent = if total_videos > 0 {
            ((completed_videos as f64 / total_videos as f64) * 100.0).round() as u32
        } else {
            0
        };

        Self {
            total_videos,
            completed_videos,
            overall_percent,
            total_duration: videos
                .iter()
                .map(|video| u64::from(video.duration.unwrap_or(0)))
                .sum(),
            watched_duration: rows
                .iter()
                .map(|row| u64::from(row.watched_duration))
                .sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::video::Video;

    fn row(watched: u32, completed: bool) -> WatchProgress {
        WatchProgress {
            user_id: 1,
            video_id: 7,
            watched_duration: watched,
            completed,
            last_watched_at: Utc::now(),
        }
    }

    #[test]
    fn test_merge_without_stored_row_takes_incoming() {
        let merged = WatchProgress::merged(None, 1, 7, 50, false, Utc::now());
        assert_eq!(merged.watched_duration, 50);
        assert!(!merged.completed);
    }

    #[test]
    fn test_stale_report_does_not_regress() {
        let stored = row(90, true);
        let merged = WatchProgress::merged(Some(&stored), 1, 7, 10, false, Utc::now());

        assert_eq!(merged.watched_duration, 90);
        assert!(merged.completed);
    }

    #[test]
    fn test_update_serializes_camel_case() {
        let body: ProgressUpdate =
            serde_json::from_str(r#"{"videoId":3,"watchedDuration":42,"completed":false}"#)
                .unwrap();
        assert_eq!(
            body,
            ProgressUpdate {
                video_id: 3,
                watched_duration: 42,
                completed: false
            }
        );

        let json = serde_json::to_value(row(5, false)).unwrap();
        assert!(json.get("lastWatchedAt").is_some());
        assert_eq!(json["watchedDuration"], 5);
    }

    #[test]
    fn test_summary() {
        let videos = vec![
            Video::new(1, "Preflight", "local:a.mp4").with_duration(600),
            Video::new(2, "Taxi", "local:b.mp4").with_duration(300),
            Video::new(3, "Crosswind landing", "abc123"),
        ];
        let mut preflight = row(600, true);
        preflight.video_id = 1;
        let mut taxi = row(120, false);
        taxi.video_id = 2;
        let progress = vec![preflight, taxi];

        let summary = ProgressSummary::compute(&videos, &progress);

        assert_eq!(summary.total_videos, 3);
        assert_eq!(summary.completed_videos, 1);
        assert_eq!(summary.overall_percent, 33);
        assert_eq!(summary.total_duration, 900);
        assert_eq!(summary.watched_duration, 720);
    }

    #[test]
    fn test_summary_ignores_rows_of_removed_videos() {
        let videos = vec![Video::new(1, "Preflight", "local:a.mp4").with_duration(600)];
        let mut kept = row(600, true);
        kept.video_id = 1;
        let mut orphan = row(300, true);
        orphan.video_id = 2;

        let summary = ProgressSummary::compute(&videos, &[kept, orphan]);

        assert_eq!(summary.completed_videos, 1);
        assert_eq!(summary.overall_percent, 100);
        assert_eq!(summary.watched_duration, 600);
    }

    #[test]
    fn test_summary_without_videos() {
        let summary = ProgressSummary::compute(&[], &[]);
        assert_eq!(summary.overall_percent, 0);
    }
}
