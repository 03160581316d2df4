use crate::application::progress::ProgressService;
use crate::domain::progress::{ProgressUpdate, UserId, WatchProgress};
use crate::ports::catalog::VideoCatalog;
use crate::ports::repository::ProgressRepository;
use crate::ports::sink::ProgressSink;
use async_trait::async_trait;
use std::error::Error;
use std::sync::Arc;

/// Sink calling the progress service directly, for playback running in the
/// same process as the server.
pub struct LocalProgressSink<R, C> {
    service: Arc<ProgressService<R, C>>,
    user_id: UserId,
}

impl<R, C> LocalProgressSink<R, C> {
    pub fn new(service: Arc<ProgressService<R, C>>, user_id: UserId) -> Self {
        Self { service, user_id }
    }
}

#[async_trait]
impl<R, C> ProgressSink for LocalProgressSink<R, C>
where
    R: ProgressRepository + 'static,
    C: VideoCatalog + 'static,
{
    async fn send(&self, update: ProgressUpdate) -> Result<WatchProgress, Box<dyn Error + Send + Sync>> {
        Ok(self.service.record(self.user_id, update).await?)
    }
}
