//! Redis VideoCatalog implementation.

use super::error::RepositoryError;
use super::pool::RedisPool;
use super::{video_key, VIDEO_INDEX};
use crate::domain::progress::VideoId;
use crate::domain::video::Video;
use crate::ports::catalog::VideoCatalog;
use async_trait::async_trait;
use deadpool_redis::redis::AsyncCommands;

#[async_trait]
impl VideoCatalog for RedisPool {
    async fn get_video(
        &self,
        video_id: VideoId,
    ) -> Result<Option<Video>, Box<dyn std::error::Error + Send + Sync>> {
        let mut conn = self.pool.get().await.map_err(RepositoryError::from)?;
        let json: Option<String> = conn
            .get(video_key(video_id))
            .await
            .map_err(RepositoryError::from)?;
        match json {
            Some(data) => Ok(Some(serde_json::from_str(&data)?)),
            None => Ok(None),
        }
    }

    async fn list_videos(&self) -> Result<Vec<Video>, Box<dyn std::error::Error + Send + Sync>> {
        let mut conn = self.pool.get().await.map_err(RepositoryError::from)?;
        let mut ids: Vec<VideoId> = conn
            .smembers(VIDEO_INDEX)
            .await
            .map_err(RepositoryError::from)?;
        ids.sort_unstable();

        let mut videos = Vec::with_capacity(ids.len());
        for id in ids {
            let json: Option<String> = conn.get(video_key(id)).await.map_err(RepositoryError::from)?;
            if let Some(data) = json {
                videos.push(serde_json::from_str(&data)?);
            }
        }
        Ok(videos)
    }

    async fn save_video(&self, video: &Video) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut conn = self.pool.get().await.map_err(RepositoryError::from)?;
        let json = serde_json::to_string(video)?;
        conn.set::<_, _, ()>(video_key(video.id), json)
            .await
            .map_err(RepositoryError::from)?;
        conn.sadd::<_, _, ()>(VIDEO_INDEX, video.id)
            .await
            .map_err(RepositoryError::from)?;
        Ok(())
    }
}
