use crate::domain::progress::{UserId, VideoId, WatchProgress};
use async_trait::async_trait;
use std::error::Error;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    /// Insert or raise the progress row for (user, video).
    ///
    /// Watched duration never decreases and completion never reverts,
    /// whatever order concurrent calls land in.
    async fn upsert_progress(
        &self,
        user_id: UserId,
        video_id: VideoId,
        watched_duration: u32,
        completed: bool,
    ) -> Result<WatchProgress, Box<dyn Error + Send + Sync>>;

    /// All progress rows of a user
    async fn get_user_progress(
        &self,
        user_id: UserId,
    ) -> Result<Vec<WatchProgress>, Box<dyn Error + Send + Sync>>;

    /// Progress of one video, `None` if the user never reported any
    async fn get_video_progress(
        &self,
        user_id: UserId,
        video_id: VideoId,
    ) -> Result<Option<WatchProgress>, Box<dyn Error + Send + Sync>>;
}
