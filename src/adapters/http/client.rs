//! Outbound side: the playback client posting flushes to the progress API.

use super::auth::USER_HEADER;
use crate::domain::progress::{ProgressUpdate, UserId, VideoId, WatchProgress};
use crate::domain::video::Video;
use crate::ports::sink::ProgressSink;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::error::Error;
use std::time::Duration;
use thiserror::Error;

const TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Server answered {status}: {message}")]
    Status { status: u16, message: String },
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

pub struct HttpProgressSink {
    client: reqwest::Client,
    base_url: String,
    user_id: UserId,
}

impl HttpProgressSink {
    pub fn new(base_url: &str, user_id: UserId) -> Result<Self, SinkError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(TIMEOUT_SECS))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            user_id,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn post(&self, update: ProgressUpdate) -> Result<WatchProgress, SinkError> {
        let response = self
            .client
            .post(self.url("/api/progress"))
            .header(USER_HEADER, self.user_id.to_string())
            .json(&update)
            .send()
            .await?;

        Ok(checked(response).await?.json::<WatchProgress>().await?)
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, SinkError> {
        let response = self
            .client
            .get(self.url(path))
            .header(USER_HEADER, self.user_id.to_string())
            .send()
            .await?;

        Ok(checked(response).await?.json::<T>().await?)
    }

    /// Catalog entry of a video, to size the session.
    pub async fn video(&self, video_id: VideoId) -> Result<Video, SinkError> {
        self.get(&format!("/api/videos/{}", video_id)).await
    }

    /// Stored progress of this user on one video, to resume from.
    pub async fn stored_progress(&self, video_id: VideoId) -> Result<Option<WatchProgress>, SinkError> {
        let rows: Vec<WatchProgress> = self.get("/api/progress").await?;
        Ok(rows.into_iter().find(|row| row.video_id == video_id))
    }
}

async fn checked(response: reqwest::Response) -> Result<reqwest::Response, SinkError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let message = match response.json::<ErrorBody>().await {
        Ok(body) => body.message,
        Err(_) => status.canonical_reason().unwrap_or("unknown error").to_string(),
    };
    Err(SinkError::Status {
        status: status.as_u16(),
        message,
    })
}

#[async_trait]
impl ProgressSink for HttpProgressSink {
    async fn send(&self, update: ProgressUpdate) -> Result<WatchProgress, Box<dyn Error + Send + Sync>> {
        Ok(self.post(update).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::http::router;
    use crate::adapters::memory::MemoryStore;
    use crate::application::progress::ProgressService;
    use crate::ports::repository::ProgressRepository;
    use std::sync::Arc;

    async fn serve(store: &MemoryStore) -> String {
        let app = router(Arc::new(ProgressService::new(store.clone(), store.clone())));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/", addr)
    }

    #[tokio::test]
    async fn test_posts_update_as_user() {
        let store = MemoryStore::with_videos([
            Video::new(1, "Stall recovery", "local:stall.mp4").with_duration(300),
        ]);
        let sink = HttpProgressSink::new(&serve(&store).await, 7).unwrap();

        let row = sink
            .send(ProgressUpdate {
                video_id: 1,
                watched_duration: 60,
                completed: false,
            })
            .await
            .unwrap();

        assert_eq!(row.user_id, 7);
        assert_eq!(row.watched_duration, 60);
        assert_eq!(
            store.get_video_progress(7, 1).await.unwrap().map(|r| r.watched_duration),
            Some(60)
        );
    }

    #[tokio::test]
    async fn test_error_status_carries_server_message() {
        let store = MemoryStore::new();
        let sink = HttpProgressSink::new(&serve(&store).await, 7).unwrap();

        let err = sink
            .post(ProgressUpdate {
                video_id: 12,
                watched_duration: 5,
                completed: false,
            })
            .await
            .unwrap_err();

        match err {
            SinkError::Status { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Video 12 not found");
            }
            other => panic!("unexpected error {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreachable_server_is_request_error() {
        let sink = HttpProgressSink::new("http://127.0.0.1:1", 7).unwrap();

        let err = sink
            .post(ProgressUpdate {
                video_id: 1,
                watched_duration: 5,
                completed: false,
            })
            .await
            .unwrap_err();

        assert!(matches!(err, SinkError::Request(_)));
    }

    #[tokio::test]
    async fn test_reads_video_and_stored_progress() {
        let store = MemoryStore::with_videos([
            Video::new(4, "Night VFR", "1AbCdEfGhIjKlMnOp").with_duration(900),
        ]);
        store.upsert_progress(7, 4, 300, false).await.unwrap();
        let sink = HttpProgressSink::new(&serve(&store).await, 7).unwrap();

        let video = sink.video(4).await.unwrap();
        assert_eq!(video.duration, Some(900));
        assert!(video.thumbnail_url.is_some());

        let stored = sink.stored_progress(4).await.unwrap().unwrap();
        assert_eq!(stored.watched_duration, 300);
        assert!(sink.stored_progress(5).await.unwrap().is_none());
    }
}
