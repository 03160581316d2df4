//! Player adapters: turn whatever a player variant can observe into
//! playback events for a [`PlaybackSession`].

use super::session::PlaybackSession;
use super::sync::SyncWriter;
use crate::domain::progress::WatchProgress;
use crate::domain::source::PlaybackMode;
use crate::domain::video::Video;
use futures::stream::{self, BoxStream};
use futures::{Stream, StreamExt};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackEvent {
    /// Playback position, in seconds
    Tick(f64),
    Ended,
    MarkComplete,
    /// Total duration became known (loaded metadata)
    DurationKnown(u32),
}

/// Event source backing a session.
#[derive(Debug)]
pub enum PlayerAdapter {
    /// A real media element forwarding its own events
    Native(mpsc::Receiver<PlaybackEvent>),
    /// Embed-only playback, driven by a one-second clock
    Simulated(SimulatedClock, CancellationToken),
}

impl PlayerAdapter {
    /// Pick the adapter the video's source supports.
    ///
    /// Native playback returns the sender the media element reports through.
    pub fn for_video(
        video: &Video,
        start_at: f64,
        cancel: CancellationToken,
    ) -> (Self, Option<mpsc::Sender<PlaybackEvent>>) {
        let mode = video
            .parsed_source()
            .map(|source| source.playback_mode())
            .unwrap_or(PlaybackMode::Embedded);

        match mode {
            PlaybackMode::Native => {
                let (sender, receiver) = mpsc::channel(64);
                (PlayerAdapter::Native(receiver), Some(sender))
            }
            PlaybackMode::Embedded => {
                let clock = SimulatedClock::new(start_at, video.duration.unwrap_or(0));
                (PlayerAdapter::Simulated(clock, cancel), None)
            }
        }
    }

    pub fn into_events(self) -> BoxStream<'static, PlaybackEvent> {
        match self {
            PlayerAdapter::Native(receiver) => native_events(receiver).boxed(),
            PlayerAdapter::Simulated(clock, cancel) => clock.events(cancel).boxed(),
        }
    }
}

fn native_events(receiver: mpsc::Receiver<PlaybackEvent>) -> impl Stream<Item = PlaybackEvent> {
    stream::unfold(receiver, |mut receiver| async move {
        receiver.recv().await.map(|event| (event, receiver))
    })
}

/// Fake playback clock for players that expose no media events.
#[derive(Debug, Clone)]
pub struct SimulatedClock {
    position: f64,
    duration: u32,
    period: Duration,
}

impl SimulatedClock {
    pub fn new(start_at: f64, duration: u32) -> Self {
        Self {
            position: start_at.max(0.0),
            duration,
            period: Duration::from_secs(1),
        }
    }

    /// One `Tick` per period, then `Ended` once the duration is reached.
    /// Stops without `Ended` when cancelled.
    pub fn events(self, cancel: CancellationToken) -> impl Stream<Item = PlaybackEvent> {
        let ticker = interval_at(Instant::now() + self.period, self.period);
        let step = self.period.as_secs_f64();

        stream::unfold(
            (ticker, self.position, self.duration, false, cancel),
            move |(mut ticker, position, duration, finished, cancel)| async move {
                if finished {
                    return None;
                }
                tokio::select! {
                    _ = cancel.cancelled() => None,
                    _ = ticker.tick() => {
                        let position = position + step;
                        if duration > 0 && position >= f64::from(duration) {
                            Some((PlaybackEvent::Ended, (ticker, position, duration, true, cancel)))
                        } else {
                            Some((PlaybackEvent::Tick(position), (ticker, position, duration, false, cancel)))
                        }
                    }
                }
            },
        )
    }
}

/// Open a session for a video, resuming stored progress when there is some.
pub fn start_session(video: &Video, stored: Option<&WatchProgress>) -> PlaybackSession {
    let duration = video.duration.unwrap_or(0);
    match stored {
        Some(row) => PlaybackSession::resume(video.id, duration, row),
        None => PlaybackSession::new(video.id, duration),
    }
}

/// Drive a session from an event stream until the stream ends.
///
/// Throttled flushes go to the writer without waiting. End-of-video and
/// mark-complete updates wait for queue room, since nothing resends them.
pub async fn run_playback<E>(
    mut session: PlaybackSession,
    events: E,
    writer: &SyncWriter,
) -> PlaybackSession
where
    E: Stream<Item = PlaybackEvent>,
{
    futures::pin_mut!(events);

    while let Some(event) = events.next().await {
        let now = Instant::now().into_std();
        match event {
            PlaybackEvent::Tick(time) => {
                if let Some(update) = session.on_tick(time, now) {
                    writer.submit(update);
                }
            }
            PlaybackEvent::Ended => {
                tracing::info!("Video {} finished", session.video_id());
                writer.deliver(session.on_ended(now)).await;
            }
            PlaybackEvent::MarkComplete => {
                writer.deliver(session.mark_complete(now)).await;
            }
            PlaybackEvent::DurationKnown(duration) => session.set_duration(duration),
        }
    }

    session
}
