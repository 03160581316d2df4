//! Redis adapter.
//!
//! This module provides Redis-backed implementations of:
//! - `ProgressRepository` for watch progress (atomic upsert script)
//! - `VideoCatalog` for video metadata

mod catalog;
mod error;
mod pool;
mod repository;

pub use error::RepositoryError;
pub use pool::RedisPool;

/// Redis key constants
const PROGRESS_PREFIX: &str = "avilearn:progress:";
const USER_PROGRESS_PREFIX: &str = "avilearn:user_progress:";
const VIDEO_PREFIX: &str = "avilearn:video:";
const VIDEO_INDEX: &str = "avilearn:videos";

fn progress_key(user_id: i64, video_id: i64) -> String {
    format!("{}{}:{}", PROGRESS_PREFIX, user_id, video_id)
}

fn user_progress_key(user_id: i64) -> String {
    format!("{}{}", USER_PROGRESS_PREFIX, user_id)
}

fn video_key(video_id: i64) -> String {
    format!("{}{}", VIDEO_PREFIX, video_id)
}
