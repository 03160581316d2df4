use super::auth::AuthUser;
use super::error::ApiError;
use crate::application::progress::ProgressService;
use crate::domain::progress::{ProgressSummary, ProgressUpdate, VideoId, WatchProgress};
use crate::domain::source::PlaybackMode;
use crate::domain::video::Video;
use crate::ports::catalog::VideoCatalog;
use crate::ports::repository::ProgressRepository;
use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

const THUMBNAIL_SIZE: u32 = 400;

type Service<R, C> = Arc<ProgressService<R, C>>;

/// Video metadata plus what a player needs to open it.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VideoResponse {
    #[serde(flatten)]
    pub video: Video,
    pub stream_url: Option<String>,
    pub playback_mode: Option<PlaybackMode>,
}

impl From<Video> for VideoResponse {
    fn from(mut video: Video) -> Self {
        let source = video.parsed_source();
        if video.thumbnail_url.is_none() {
            video.thumbnail_url = source
                .as_ref()
                .and_then(|s| s.thumbnail_url(THUMBNAIL_SIZE));
        }
        Self {
            stream_url: source.as_ref().map(|s| s.stream_url()),
            playback_mode: source.as_ref().map(|s| s.playback_mode()),
            video,
        }
    }
}

pub fn router<R, C>(service: Service<R, C>) -> Router
where
    R: ProgressRepository + 'static,
    C: VideoCatalog + 'static,
{
    Router::new()
        .route(
            "/api/progress",
            get(list_progress::<R, C>).post(record_progress::<R, C>),
        )
        .route("/api/progress/summary", get(progress_summary::<R, C>))
        .route("/api/videos/:id", get(get_video::<R, C>))
        .layer(TraceLayer::new_for_http())
        .with_state(service)
}

async fn list_progress<R, C>(
    State(service): State<Service<R, C>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<Vec<WatchProgress>>, ApiError>
where
    R: ProgressRepository,
    C: VideoCatalog,
{
    Ok(Json(service.list(user_id).await?))
}

async fn record_progress<R, C>(
    State(service): State<Service<R, C>>,
    AuthUser(user_id): AuthUser,
    body: Result<Json<ProgressUpdate>, JsonRejection>,
) -> Result<Json<WatchProgress>, ApiError>
where
    R: ProgressRepository,
    C: VideoCatalog,
{
    let Json(update) = body.map_err(|e| ApiError::bad_request(e.body_text()))?;
    Ok(Json(service.record(user_id, update).await?))
}

async fn progress_summary<R, C>(
    State(service): State<Service<R, C>>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<ProgressSummary>, ApiError>
where
    R: ProgressRepository,
    C: VideoCatalog,
{
    Ok(Json(service.summary(user_id).await?))
}

async fn get_video<R, C>(
    State(service): State<Service<R, C>>,
    _user: AuthUser,
    video_id: Result<Path<VideoId>, PathRejection>,
) -> Result<Json<VideoResponse>, ApiError>
where
    R: ProgressRepository,
    C: VideoCatalog,
{
    let Path(video_id) = video_id.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let video = service.video(video_id).await?;
    Ok(Json(video.into()))
}
