//! Where a video is played from, and which player adapter drives it.

use regex::Regex;
use serde::Serialize;
use std::sync::OnceLock;

const LOCAL_PREFIX: &str = "local:";
const LOCAL_VIDEO_ROUTE: &str = "/uploads/videos";
const DRIVE_BASE_URL: &str = "https://drive.google.com";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VideoSource {
    /// File stored by the platform itself
    Local { filename: String },
    /// File shared from Google Drive, only playable through an embed
    Drive { file_id: String },
}

/// How playback-time events are obtained for a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaybackMode {
    /// Real media element events
    Native,
    /// Embedded iframe without media events; a simulated clock drives progress
    Embedded,
}

fn drive_link_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?:/file/d/|[?&]id=)([A-Za-z0-9_-]{10,})").expect("valid drive link regex")
    })
}

fn drive_id_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_-]{10,}$").expect("valid drive id regex"))
}

impl VideoSource {
    /// Accepts `local:<file>`, a bare Drive file id, or a Drive share link.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();

        if let Some(filename) = raw.strip_prefix(LOCAL_PREFIX) {
            if filename.is_empty() || filename.contains("..") || filename.contains('/') {
                return None;
            }
            return Some(VideoSource::Local {
                filename: filename.to_string(),
            });
        }

        if drive_id_regex().is_match(raw) {
            return Some(VideoSource::Drive {
                file_id: raw.to_string(),
            });
        }

        drive_link_regex()
            .captures(raw)
            .and_then(|caps| caps.get(1))
            .map(|m| VideoSource::Drive {
                file_id: m.as_str().to_string(),
            })
    }

    pub fn playback_mode(&self) -> PlaybackMode {
        match self {
            VideoSource::Local { .. } => PlaybackMode::Native,
            VideoSource::Drive { .. } => PlaybackMode::Embedded,
        }
    }

    /// Canonical stored form (`local:<file>` or the Drive id).
    pub fn to_stored(&self) -> String {
        match self {
            VideoSource::Local { filename } => format!("{}{}", LOCAL_PREFIX, filename),
            VideoSource::Drive { file_id } => file_id.clone(),
        }
    }

    /// URL the player loads.
    pub fn stream_url(&self) -> String {
        match self {
            VideoSource::Local { filename } => format!("{}/{}", LOCAL_VIDEO_ROUTE, filename),
            VideoSource::Drive { file_id } => {
                format!("{}/file/d/{}/preview?usp=sharing&controls=1", DRIVE_BASE_URL, file_id)
            }
        }
    }

    pub fn thumbnail_url(&self, size: u32) -> Option<String> {
        match self {
            VideoSource::Local { .. } => None,
            VideoSource::Drive { file_id } => Some(format!(
                "{}/thumbnail?id={}&sz=s{}",
                DRIVE_BASE_URL, file_id, size
            )),
        }
    }
}
