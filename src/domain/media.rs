use ffmpeg_next as ffmpeg;
use std::path::Path;

/// Container duration of a local video file, rounded to whole seconds.
pub async fn probe_duration(source: &Path) -> Result<u32, Box<dyn std::error::Error + Send + Sync>> {
    let source = source.to_path_buf();

    tokio::task::spawn_blocking(move || -> Result<u32, Box<dyn std::error::Error + Send + Sync>> {
        ffmpeg::init()?;

        let ictx = ffmpeg::format::input(&source)?;
        ictx.streams()
            .best(ffmpeg::media::Type::Video)
            .ok_or(ffmpeg::Error::StreamNotFound)?;

        // AV_NOPTS_VALUE or garbage from broken containers
        let raw = ictx.duration();
        if raw <= 0 {
            return Err(format!("No duration in {:?}", source).into());
        }

        let seconds = raw as f64 / f64::from(ffmpeg::ffi::AV_TIME_BASE);
        tracing::debug!("Probed {:?}: {:.3}s", source, seconds);
        Ok(seconds.round() as u32)
    })
    .await?
}
