//! Register a locally stored video in the Redis catalog
//!
//! Probes the file for its duration and stores it as a `local:` source.
//!
//! Usage: avilearn-register <video-id> <title> <path-to-file>

use avilearn::adapters::redis::RedisPool;
use avilearn::config::ServerConfig;
use avilearn::domain::media::probe_duration;
use avilearn::domain::source::VideoSource;
use avilearn::domain::video::Video;
use avilearn::ports::catalog::VideoCatalog;
use std::path::PathBuf;

#[tokio::main]
async fn main() {
    let config = ServerConfig::from_env();

    tracing_subscriber::fmt::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [id, title, path] = args.as_slice() else {
        eprintln!("Usage: avilearn-register <video-id> <title> <path-to-file>");
        std::process::exit(2);
    };
    let Ok(video_id) = id.parse() else {
        eprintln!("Invalid video id: {}", id);
        std::process::exit(2);
    };

    let path = PathBuf::from(path);
    let source = path
        .file_name()
        .and_then(|name| name.to_str())
        .and_then(|name| VideoSource::parse(&format!("local:{}", name)));
    let Some(source) = source else {
        eprintln!("Unusable file name: {:?}", path);
        std::process::exit(2);
    };

    let Some(redis_url) = &config.redis_url else {
        eprintln!("REDIS_URL must be set");
        std::process::exit(1);
    };
    let pool = match RedisPool::new(redis_url) {
        Ok(pool) => pool,
        Err(e) => {
            eprintln!("Failed to create Redis pool: {:?}", e);
            std::process::exit(1);
        }
    };

    let duration = match probe_duration(&path).await {
        Ok(duration) => duration,
        Err(e) => {
            eprintln!("Failed to probe {:?}: {}", path, e);
            std::process::exit(1);
        }
    };

    let video = Video::new(video_id, title.as_str(), source.to_stored()).with_duration(duration);
    if let Err(e) = pool.save_video(&video).await {
        eprintln!("Failed to save video: {}", e);
        std::process::exit(1);
    }
    tracing::info!("Registered video {} ({}s) as {}", video.id, duration, video.source);
}
