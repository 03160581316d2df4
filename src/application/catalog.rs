use crate::domain::video::Video;
use crate::ports::catalog::VideoCatalog;
use std::error::Error;

/// Load catalog entries from a JSON array into a catalog.
///
/// Entries whose source is neither `local:` nor a Drive id are skipped.
/// Returns how many entries were saved.
pub async fn import_videos<C>(catalog: &C, json: &str) -> Result<usize, Box<dyn Error + Send + Sync>>
where
    C: VideoCatalog + ?Sized,
{
    let videos: Vec<Video> = serde_json::from_str(json)?;

    let mut saved = 0;
    for video in videos {
        if video.parsed_source().is_none() {
            tracing::warn!("Skipping video {}: unsupported source {:?}", video.id, video.source);
            continue;
        }
        catalog.save_video(&video).await?;
        saved += 1;
    }

    tracing::info!("Imported {} videos", saved);
    Ok(saved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::memory::MemoryStore;

    #[tokio::test]
    async fn test_import_skips_unplayable_sources() {
        let store = MemoryStore::new();
        let json = r#"[
            {"id": 1, "title": "Preflight", "source": "local:preflight.mp4", "duration": 600},
            {"id": 2, "title": "Radio", "source": "https://drive.google.com/file/d/1AbCdEfGhIjKlMnOp/view"},
            {"id": 3, "title": "Broken", "source": "ftp://nowhere"}
        ]"#;

        assert_eq!(import_videos(&store, json).await.unwrap(), 2);
        assert_eq!(store.get_video(1).await.unwrap().and_then(|v| v.duration), Some(600));
        assert!(store.get_video(3).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_import_rejects_malformed_json() {
        let store = MemoryStore::new();
        assert!(import_videos(&store, "{not json").await.is_err());
    }
}
