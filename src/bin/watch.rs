//! Headless playback client
//!
//! Plays one video on a simulated clock and syncs progress to the API, the
//! way the embedded player does. Ctrl-C abandons the session.
//!
//! Usage: avilearn-watch <user-id> <video-id>

use avilearn::adapters::http::HttpProgressSink;
use avilearn::application::player::{run_playback, start_session, SimulatedClock};
use avilearn::application::sync::{log_notices, SyncWriter};
use avilearn::config::PlayerConfig;
use avilearn::domain::progress::{UserId, VideoId};
use tokio_util::sync::CancellationToken;

fn parse_args() -> Option<(UserId, VideoId)> {
    let mut args = std::env::args().skip(1);
    let user_id = args.next()?.parse().ok()?;
    let video_id = args.next()?.parse().ok()?;
    Some((user_id, video_id))
}

#[tokio::main]
async fn main() {
    let config = PlayerConfig::from_env();

    tracing_subscriber::fmt::init();

    let Some((user_id, video_id)) = parse_args() else {
        eprintln!("Usage: avilearn-watch <user-id> <video-id>");
        std::process::exit(2);
    };

    let sink = match HttpProgressSink::new(&config.api_base_url, user_id) {
        Ok(sink) => sink,
        Err(e) => {
            eprintln!("Failed to create HTTP client: {}", e);
            std::process::exit(1);
        }
    };

    let video = match sink.video(video_id).await {
        Ok(video) => video,
        Err(e) => {
            eprintln!("Failed to load video {}: {}", video_id, e);
            std::process::exit(1);
        }
    };
    let stored = match sink.stored_progress(video_id).await {
        Ok(stored) => stored,
        Err(e) => {
            tracing::warn!("Could not load stored progress, starting over: {}", e);
            None
        }
    };

    let session = start_session(&video, stored.as_ref()).with_sync_interval(config.sync_interval);
    let clock = SimulatedClock::new(session.current_time(), video.duration.unwrap_or(0));
    tracing::info!(
        "Playing \"{}\" from {:.0}s ({:.0}% watched)",
        video.title,
        session.current_time(),
        session.percent()
    );

    let writer = SyncWriter::spawn(sink, config.sync_queue_capacity);
    tokio::spawn(log_notices(writer.subscribe()));

    let cancel = CancellationToken::new();
    let stopper = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            stopper.cancel();
        }
    });

    let session = run_playback(session, clock.events(cancel), &writer).await;
    writer.close().await;

    println!(
        "{:.0}% watched{}",
        session.percent(),
        if session.is_completed() { ", completed" } else { "" }
    );
}
