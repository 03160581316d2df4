use crate::domain::progress::VideoId;
use crate::domain::video::Video;
use async_trait::async_trait;
use std::error::Error;

/// Read side of the video catalog (metadata owned by the admin surface).
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait VideoCatalog: Send + Sync {
    async fn get_video(&self, video_id: VideoId) -> Result<Option<Video>, Box<dyn Error + Send + Sync>>;

    async fn list_videos(&self) -> Result<Vec<Video>, Box<dyn Error + Send + Sync>>;

    /// Register or replace a video entry
    async fn save_video(&self, video: &Video) -> Result<(), Box<dyn Error + Send + Sync>>;
}
