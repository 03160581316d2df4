//! In-process store, used when no Redis URL is configured and in tests.

use crate::domain::progress::{UserId, VideoId, WatchProgress};
use crate::domain::video::Video;
use crate::ports::catalog::VideoCatalog;
use crate::ports::repository::ProgressRepository;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, HashMap};
use std::error::Error;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

#[derive(Clone, Default)]
pub struct MemoryStore {
    progress: Arc<Mutex<HashMap<(UserId, VideoId), WatchProgress>>>,
    videos: Arc<RwLock<BTreeMap<VideoId, Video>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_videos(videos: impl IntoIterator<Item = Video>) -> Self {
        let videos = videos.into_iter().map(|video| (video.id, video)).collect();
        Self {
            progress: Arc::default(),
            videos: Arc::new(RwLock::new(videos)),
        }
    }
}

#[async_trait]
impl ProgressRepository for MemoryStore {
    async fn upsert_progress(
        &self,
        user_id: UserId,
        video_id: VideoId,
        watched_duration: u32,
        completed: bool,
    ) -> Result<WatchProgress, Box<dyn Error + Send + Sync>> {
        // The lock spans read and write, so concurrent upserts serialize here.
        let mut rows = self.progress.lock().await;
        let merged = WatchProgress::merged(
            rows.get(&(user_id, video_id)),
            user_id,
            video_id,
            watched_duration,
            completed,
            Utc::now(),
        );
        rows.insert((user_id, video_id), merged.clone());
        Ok(merged)
    }

    async fn get_user_progress(
        &self,
        user_id: UserId,
    ) -> Result<Vec<WatchProgress>, Box<dyn Error + Send + Sync>> {
        let rows = self.progress.lock().await;
        let mut result: Vec<WatchProgress> = rows
            .values()
            .filter(|row| row.user_id == user_id)
            .cloned()
            .collect();
        result.sort_by_key(|row| row.video_id);
        Ok(result)
    }

    async fn get_video_progress(
        &self,
        user_id: UserId,
        video_id: VideoId,
    ) -> Result<Option<WatchProgress>, Box<dyn Error + Send + Sync>> {
        Ok(self.progress.lock().await.get(&(user_id, video_id)).cloned())
    }
}

#[async_trait]
impl VideoCatalog for MemoryStore {
    async fn get_video(&self, video_id: VideoId) -> Result<Option<Video>, Box<dyn Error + Send + Sync>> {
        Ok(self.videos.read().await.get(&video_id).cloned())
    }

    async fn list_videos(&self) -> Result<Vec<Video>, Box<dyn Error + Send + Sync>> {
        Ok(self.videos.read().await.values().cloned().collect())
    }

    async fn save_video(&self, video: &Video) -> Result<(), Box<dyn Error + Send + Sync>> {
        self.videos.write().await.insert(video.id, video.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_upsert_creates_row_lazily() {
        let store = MemoryStore::new();
        assert!(store.get_video_progress(1, 2).await.unwrap().is_none());

        let row = store.upsert_progress(1, 2, 30, false).await.unwrap();

        assert_eq!(row.watched_duration, 30);
        assert_eq!(store.get_video_progress(1, 2).await.unwrap(), Some(row));
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let store = MemoryStore::new();
        let first = store.upsert_progress(1, 2, 50, false).await.unwrap();
        let second = store.upsert_progress(1, 2, 50, false).await.unwrap();

        assert_eq!(first.watched_duration, second.watched_duration);
        assert_eq!(first.completed, second.completed);
        assert_eq!(store.get_user_progress(1).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_stale_sync_does_not_regress() {
        let store = MemoryStore::new();
        store.upsert_progress(1, 2, 90, true).await.unwrap();
        let row = store.upsert_progress(1, 2, 10, false).await.unwrap();

        assert!(row.completed);
        assert_eq!(row.watched_duration, 90);
    }

    #[tokio::test]
    async fn test_concurrent_upserts_keep_max_and_or() {
        let store = MemoryStore::new();
        let writes = (0..50u32).map(|i| {
            let store = store.clone();
            tokio::spawn(async move { store.upsert_progress(4, 9, i * 3, i == 17).await })
        });
        for handle in futures::future::join_all(writes).await {
            handle.unwrap().unwrap();
        }

        let row = store.get_video_progress(4, 9).await.unwrap().unwrap();
        assert_eq!(row.watched_duration, 147);
        assert!(row.completed);
    }

    #[tokio::test]
    async fn test_progress_is_scoped_per_user() {
        let store = MemoryStore::new();
        store.upsert_progress(1, 2, 10, false).await.unwrap();
        store.upsert_progress(1, 3, 20, false).await.unwrap();
        store.upsert_progress(2, 2, 30, false).await.unwrap();

        let rows = store.get_user_progress(1).await.unwrap();
        assert_eq!(
            rows.iter().map(|row| row.video_id).collect::<Vec<_>>(),
            vec![2, 3]
        );
    }

    #[tokio::test]
    async fn test_catalog_roundtrip() {
        let store = MemoryStore::with_videos([Video::new(1, "Preflight", "local:a.mp4")]);
        store
            .save_video(&Video::new(2, "Radio calls", "1AbCdEfGhIjKlMnOp").with_duration(420))
            .await
            .unwrap();

        assert_eq!(store.list_videos().await.unwrap().len(), 2);
        assert_eq!(
            store.get_video(2).await.unwrap().and_then(|v| v.duration),
            Some(420)
        );
        assert!(store.get_video(3).await.unwrap().is_none());
    }
}
