use super::progress::VideoId;
use super::source::VideoSource;
use serde::{Deserialize, Serialize};

/// Catalog entry for an instructional video.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Video {
    pub id: VideoId,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    /// `local:<file>` or a Google Drive file id
    pub source: String,
    /// Total length in seconds, when known
    #[serde(default)]
    pub duration: Option<u32>,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

impl Video {
    pub fn new(id: VideoId, title: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            description: None,
            source: source.into(),
            duration: None,
            thumbnail_url: None,
        }
    }

    pub fn with_duration(mut self, duration: u32) -> Self {
        self.duration = Some(duration);
        self
    }

    pub fn parsed_source(&self) -> Option<VideoSource> {
        VideoSource::parse(&self.source)
    }
}
