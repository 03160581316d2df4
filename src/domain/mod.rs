//! Domain layer - Pure business logic.

pub mod completion;
pub mod progress;
pub mod segments;
pub mod source;
pub mod throttle;
pub mod video;

// Duration probing (requires ffmpeg-next)
#[cfg(feature = "probe")]
pub mod media;
