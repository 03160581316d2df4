//! Redis ProgressRepository implementation.

use super::error::RepositoryError;
use super::pool::RedisPool;
use super::{progress_key, user_progress_key};
use crate::domain::progress::{UserId, VideoId, WatchProgress};
use crate::ports::repository::ProgressRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use deadpool_redis::redis::{AsyncCommands, Script};
use std::collections::HashMap;
use std::sync::OnceLock;

/// Increase-only upsert, executed atomically on the server.
///
/// KEYS[1] progress hash, KEYS[2] per-user index set.
/// ARGV: watched, completed (0/1), timestamp, user id, video id.
const UPSERT_SCRIPT: &str = r#"
local stored = tonumber(redis.call('HGET', KEYS[1], 'watched_duration') or '0')
local watched = math.max(stored, tonumber(ARGV[1]))
local was_completed = redis.call('HGET', KEYS[1], 'completed')
local completed = '0'
if was_completed == '1' or ARGV[2] == '1' then
  completed = '1'
end
redis.call('HSET', KEYS[1],
  'user_id', ARGV[4],
  'video_id', ARGV[5],
  'watched_duration', watched,
  'completed', completed,
  'last_watched_at', ARGV[3])
redis.call('SADD', KEYS[2], ARGV[5])
return {tostring(watched), completed, ARGV[3]}
"#;

fn upsert_script() -> &'static Script {
    static SCRIPT: OnceLock<Script> = OnceLock::new();
    SCRIPT.get_or_init(|| Script::new(UPSERT_SCRIPT))
}

fn corrupt(key: &str, reason: impl Into<String>) -> RepositoryError {
    RepositoryError::CorruptRow {
        key: key.to_string(),
        reason: reason.into(),
    }
}

fn parse_timestamp(key: &str, raw: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(raw)
        .map(|ts| ts.with_timezone(&Utc))
        .map_err(|e| corrupt(key, format!("bad timestamp {:?}: {}", raw, e)))
}

fn parse_watched(key: &str, raw: &str) -> Result<u32, RepositoryError> {
    // Lua may hand back floats for large numbers
    raw.parse::<u32>()
        .or_else(|_| raw.parse::<f64>().map(|v| v.max(0.0) as u32))
        .map_err(|_| corrupt(key, format!("bad watched_duration {:?}", raw)))
}

fn row_from_hash(
    key: &str,
    user_id: UserId,
    video_id: VideoId,
    fields: &HashMap<String, String>,
) -> Result<WatchProgress, RepositoryError> {
    let field = |name: &str| {
        fields
            .get(name)
            .map(String::as_str)
            .ok_or_else(|| corrupt(key, format!("missing field {}", name)))
    };

    Ok(WatchProgress {
        user_id,
        video_id,
        watched_duration: parse_watched(key, field("watched_duration")?)?,
        completed: field("completed")? == "1",
        last_watched_at: parse_timestamp(key, field("last_watched_at")?)?,
    })
}

#[async_trait]
impl ProgressRepository for RedisPool {
    async fn upsert_progress(
        &self,
        user_id: UserId,
        video_id: VideoId,
        watched_duration: u32,
        completed: bool,
    ) -> Result<WatchProgress, Box<dyn std::error::Error + Send + Sync>> {
        let mut conn = self.pool.get().await.map_err(RepositoryError::from)?;
        let key = progress_key(user_id, video_id);
        let now = Utc::now().to_rfc3339();

        let (watched, done, at): (String, String, String) = upsert_script()
            .key(&key)
            .key(user_progress_key(user_id))
            .arg(watched_duration)
            .arg(if completed { 1 } else { 0 })
            .arg(&now)
            .arg(user_id)
            .arg(video_id)
            .invoke_async(&mut conn)
            .await
            .map_err(RepositoryError::from)?;

        Ok(WatchProgress {
            user_id,
            video_id,
            watched_duration: parse_watched(&key, &watched)?,
            completed: done == "1",
            last_watched_at: parse_timestamp(&key, &at)?,
        })
    }

    async fn get_user_progress(
        &self,
        user_id: UserId,
    ) -> Result<Vec<WatchProgress>, Box<dyn std::error::Error + Send + Sync>> {
        let mut conn = self.pool.get().await.map_err(RepositoryError::from)?;
        let mut video_ids: Vec<VideoId> = conn
            .smembers(user_progress_key(user_id))
            .await
            .map_err(RepositoryError::from)?;
        video_ids.sort_unstable();

        let mut rows = Vec::with_capacity(video_ids.len());
        for video_id in video_ids {
            let key = progress_key(user_id, video_id);
            let fields: HashMap<String, String> =
                conn.hgetall(&key).await.map_err(RepositoryError::from)?;
            if fields.is_empty() {
                // index entry outlived its row (cascade delete)
                continue;
            }
            rows.push(row_from_hash(&key, user_id, video_id, &fields)?);
        }
        Ok(rows)
    }

    async fn get_video_progress(
        &self,
        user_id: UserId,
        video_id: VideoId,
    ) -> Result<Option<WatchProgress>, Box<dyn std::error::Error + Send + Sync>> {
        let mut conn = self.pool.get().await.map_err(RepositoryError::from)?;
        let key = progress_key(user_id, video_id);
        let fields: HashMap<String, String> =
            conn.hgetall(&key).await.map_err(RepositoryError::from)?;
        if fields.is_empty() {
            return Ok(None);
        }
        Ok(Some(row_from_hash(&key, user_id, video_id, &fields)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fields(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_row_from_hash() {
        let row = row_from_hash(
            "k",
            1,
            2,
            &fields(&[
                ("watched_duration", "120"),
                ("completed", "1"),
                ("last_watched_at", "2026-03-01T10:00:00+00:00"),
            ]),
        )
        .unwrap();

        assert_eq!(row.watched_duration, 120);
        assert!(row.completed);
        assert_eq!(row.last_watched_at.to_rfc3339(), "2026-03-01T10:00:00+00:00");
    }

    #[test]
    fn test_row_from_hash_reports_missing_field() {
        let err = row_from_hash("k", 1, 2, &fields(&[("completed", "0")])).unwrap_err();
        assert!(matches!(err, RepositoryError::CorruptRow { .. }));
    }

    #[test]
    fn test_parse_watched_accepts_lua_float() {
        assert_eq!(parse_watched("k", "90").unwrap(), 90);
        assert_eq!(parse_watched("k", "90.0").unwrap(), 90);
        assert!(parse_watched("k", "ninety").is_err());
    }

    // Needs a live server: TEST_REDIS_URL=redis://127.0.0.1/ cargo test
    #[tokio::test]
    async fn test_redis_upsert_is_monotonic() {
        let url = match std::env::var("TEST_REDIS_URL") {
            Ok(url) => url,
            Err(_) => {
                println!("Skipping test: TEST_REDIS_URL not set");
                return;
            }
        };
        let repo = RedisPool::new(&url).unwrap();
        let user_id = Utc::now().timestamp_micros();

        let first = repo.upsert_progress(user_id, 1, 50, false).await.unwrap();
        let again = repo.upsert_progress(user_id, 1, 50, false).await.unwrap();
        assert_eq!(first.watched_duration, again.watched_duration);

        repo.upsert_progress(user_id, 1, 90, true).await.unwrap();
        let stale = repo.upsert_progress(user_id, 1, 10, false).await.unwrap();
        assert_eq!(stale.watched_duration, 90);
        assert!(stale.completed);

        let rows = repo.get_user_progress(user_id).await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(
            repo.get_video_progress(user_id, 1).await.unwrap(),
            Some(stale)
        );
    }
}
