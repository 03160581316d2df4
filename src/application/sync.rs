use crate::domain::progress::{ProgressUpdate, VideoId, WatchProgress};
use crate::ports::sink::ProgressSink;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;

/// Outcome of a background write, for the UI's non-blocking notifications.
#[derive(Debug, Clone, PartialEq)]
pub enum SyncNotice {
    Saved(WatchProgress),
    Failed { video_id: VideoId, message: String },
}

/// Write-behind task between a playback session and a progress sink.
///
/// `submit` never waits on the network. Failed writes are reported once and
/// not retried; the next throttle window sends fresher numbers anyway.
#[derive(Debug)]
pub struct SyncWriter {
    sender: mpsc::Sender<ProgressUpdate>,
    notices: broadcast::Sender<SyncNotice>,
    task: JoinHandle<()>,
}

impl SyncWriter {
    pub fn spawn<S>(sink: S, capacity: usize) -> Self
    where
        S: ProgressSink + 'static,
    {
        let (sender, mut receiver) = mpsc::channel::<ProgressUpdate>(capacity.max(1));
        let (notices, _) = broadcast::channel(100);
        let publisher = notices.clone();

        let task = tokio::spawn(async move {
            while let Some(update) = receiver.recv().await {
                let notice = match sink.send(update).await {
                    Ok(row) => SyncNotice::Saved(row),
                    Err(e) => {
                        tracing::warn!("Progress sync for video {} failed: {}", update.video_id, e);
                        SyncNotice::Failed {
                            video_id: update.video_id,
                            message: e.to_string(),
                        }
                    }
                };
                // nobody listening is fine
                let _ = publisher.send(notice);
            }
            tracing::debug!("Sync writer drained");
        });

        Self {
            sender,
            notices,
            task,
        }
    }

    /// Queue an update. Returns false when it was dropped.
    pub fn submit(&self, update: ProgressUpdate) -> bool {
        match self.sender.try_send(update) {
            Ok(()) => true,
            Err(mpsc::error::TrySendError::Full(update)) => {
                tracing::warn!(
                    "Sync queue full, dropping progress for video {}",
                    update.video_id
                );
                false
            }
            Err(mpsc::error::TrySendError::Closed(update)) => {
                tracing::warn!(
                    "Sync writer stopped, dropping progress for video {}",
                    update.video_id
                );
                false
            }
        }
    }

    /// Queue an update that must not be dropped, waiting for room if needed.
    pub async fn deliver(&self, update: ProgressUpdate) -> bool {
        match self.sender.send(update).await {
            Ok(()) => true,
            Err(mpsc::error::SendError(update)) => {
                tracing::error!(
                    "Sync writer stopped, completion of video {} not saved",
                    update.video_id
                );
                false
            }
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SyncNotice> {
        self.notices.subscribe()
    }

    /// Stop accepting updates and wait for queued ones to be written.
    pub async fn close(self) {
        drop(self.sender);
        if let Err(e) = self.task.await {
            tracing::error!("Sync writer task panicked: {}", e);
        }
    }
}

/// Log notices until the writer is gone. Returns how many were logged.
///
/// A lagging receiver skips what it missed and keeps listening.
pub async fn log_notices(mut notices: broadcast::Receiver<SyncNotice>) -> usize {
    let mut logged = 0;
    loop {
        match notices.recv().await {
            Ok(SyncNotice::Saved(row)) => tracing::info!(
                "Saved {}s of video {}, completed={}",
                row.watched_duration,
                row.video_id,
                row.completed
            ),
            Ok(SyncNotice::Failed { video_id, message }) => {
                tracing::warn!("Progress of video {} not saved: {}", video_id, message)
            }
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::warn!("Missed {} sync notices", skipped);
                continue;
            }
            Err(broadcast::error::RecvError::Closed) => return logged,
        }
        logged += 1;
    }
}
