use crate::domain::completion::CompletionClassifier;
use crate::domain::progress::{ProgressSummary, ProgressUpdate, UserId, VideoId, WatchProgress};
use crate::domain::video::Video;
use crate::ports::catalog::VideoCatalog;
use crate::ports::repository::ProgressRepository;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("Video {0} not found")]
    VideoNotFound(VideoId),

    #[error("Storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Server side of progress tracking: validates reports against the catalog
/// and forwards them to the repository.
pub struct ProgressService<R, C> {
    repo: R,
    catalog: C,
    classifier: CompletionClassifier,
}

impl<R, C> ProgressService<R, C>
where
    R: ProgressRepository,
    C: VideoCatalog,
{
    pub fn new(repo: R, catalog: C) -> Self {
        Self {
            repo,
            catalog,
            classifier: CompletionClassifier::default(),
        }
    }

    pub async fn list(&self, user_id: UserId) -> Result<Vec<WatchProgress>, ServiceError> {
        self.repo
            .get_user_progress(user_id)
            .await
            .map_err(ServiceError::Storage)
    }

    /// Persist one report from a playback session.
    ///
    /// With a known duration the watched time is capped at it and the
    /// threshold is re-checked; the result can only turn `completed` on.
    pub async fn record(
        &self,
        user_id: UserId,
        update: ProgressUpdate,
    ) -> Result<WatchProgress, ServiceError> {
        let video = self
            .catalog
            .get_video(update.video_id)
            .await
            .map_err(ServiceError::Storage)?
            .ok_or(ServiceError::VideoNotFound(update.video_id))?;

        let mut watched = update.watched_duration;
        let mut completed = update.completed;
        if let Some(duration) = video.duration.filter(|d| *d > 0) {
            watched = watched.min(duration);
            completed |= self
                .classifier
                .is_complete(f64::from(watched), f64::from(duration));
        }

        let row = self
            .repo
            .upsert_progress(user_id, update.video_id, watched, completed)
            .await
            .map_err(ServiceError::Storage)?;

        tracing::debug!(
            "User {} video {}: {}s watched, completed={}",
            user_id,
            row.video_id,
            row.watched_duration,
            row.completed
        );
        Ok(row)
    }

    pub async fn summary(&self, user_id: UserId) -> Result<ProgressSummary, ServiceError> {
        let videos = self
            .catalog
            .list_videos()
            .await
            .map_err(ServiceError::Storage)?;
        let progress = self.list(user_id).await?;
        Ok(ProgressSummary::compute(&videos, &progress))
    }

    pub async fn video(&self, video_id: VideoId) -> Result<Video, ServiceError> {
        self.catalog
            .get_video(video_id)
            .await
            .map_err(ServiceError::Storage)?
            .ok_or(ServiceError::VideoNotFound(video_id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;
    use crate::ports::catalog::MockVideoCatalog;
    use crate::ports::repository::MockProgressRepository;
    use chrono::Utc;
    use mockall::predicate::eq;

    fn catalog_with(video: Video) -> MockVideoCatalog {
        let mut catalog = MockVideoCatalog::new();
        catalog
            .expect_get_video()
            .returning(move |_| Ok(Some(video.clone())));
        catalog
    }

    #[tokio::test]
    async fn test_record_caps_watched_and_applies_threshold() {
        let mut repo = MockProgressRepository::new();
        repo.expect_upsert_progress()
            .with(eq(1), eq(5), eq(100), eq(true))
            .times(1)
            .returning(|user_id, video_id, watched, completed| {
                Ok(WatchProgress {
                    user_id,
                    video_id,
                    watched_duration: watched,
                    completed,
                    last_watched_at: Utc::now(),
                })
            });
        let service = ProgressService::new(
            repo,
            catalog_with(Video::new(5, "VOR tracking", "local:vor.mp4").with_duration(100)),
        );

        let row = service
            .record(
                1,
                ProgressUpdate {
                    video_id: 5,
                    watched_duration: 110,
                    completed: false,
                },
            )
            .await
            .unwrap();

        assert_eq!(row.watched_duration, 100);
        assert!(row.completed);
    }

    #[tokio::test]
    async fn test_record_without_duration_trusts_client() {
        let mut repo = MockProgressRepository::new();
        repo.expect_upsert_progress()
            .with(eq(1), eq(5), eq(42), eq(false))
            .times(1)
            .returning(|user_id, video_id, watched, completed| {
                Ok(WatchProgress {
                    user_id,
                    video_id,
                    watched_duration: watched,
                    completed,
                    last_watched_at: Utc::now(),
                })
            });
        let service = ProgressService::new(repo, catalog_with(Video::new(5, "Drive clip", "1AbCdEfGhIjKlMnOp")));

        let row = service
            .record(
                1,
                ProgressUpdate {
                    video_id: 5,
                    watched_duration: 42,
                    completed: false,
                },
            )
            .await
            .unwrap();
        assert!(!row.completed);
    }

    #[tokio::test]
    async fn test_record_unknown_video() {
        let mut repo = MockProgressRepository::new();
        repo.expect_upsert_progress().never();
        let mut catalog = MockVideoCatalog::new();
        catalog.expect_get_video().returning(|_| Ok(None));
        let service = ProgressService::new(repo, catalog);

        let err = service
            .record(
                1,
                ProgressUpdate {
                    video_id: 99,
                    watched_duration: 1,
                    completed: false,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::VideoNotFound(99)));
    }

    #[tokio::test]
    async fn test_storage_failure_is_reported() {
        let mut repo = MockProgressRepository::new();
        repo.expect_get_user_progress()
            .returning(|_| Err("connection refused".into()));
        let service = ProgressService::new(repo, MockVideoCatalog::new());

        let err = service.list(3).await.unwrap_err();
        assert!(matches!(err, ServiceError::Storage(_)));
    }

    #[tokio::test]
    async fn test_summary_over_memory_store() {
        let store = MemoryStore::with_videos([
            Video::new(1, "Preflight", "local:a.mp4").with_duration(100),
            Video::new(2, "Taxi", "local:b.mp4").with_duration(100),
        ]);
        let service = ProgressService::new(store.clone(), store);

        service
            .record(
                8,
                ProgressUpdate {
                    video_id: 1,
                    watched_duration: 85,
                    completed: false,
                },
            )
            .await
            .unwrap();
        service
            .record(
                8,
                ProgressUpdate {
                    video_id: 2,
                    watched_duration: 20,
                    completed: false,
                },
            )
            .await
            .unwrap();

        let summary = service.summary(8).await.unwrap();
        assert_eq!(summary.completed_videos, 1);
        assert_eq!(summary.overall_percent, 50);
        assert_eq!(summary.watched_duration, 105);
        assert_eq!(summary.total_duration, 200);
    }
}
