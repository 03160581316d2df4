use crate::domain::progress::{ProgressUpdate, WatchProgress};
use async_trait::async_trait;
use std::error::Error;

/// Write path used by the playback side to persist a progress flush.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProgressSink: Send + Sync {
    async fn send(&self, update: ProgressUpdate) -> Result<WatchProgress, Box<dyn Error + Send + Sync>>;
}
