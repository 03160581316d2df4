//! AviLearn - Watch Progress Library
//!
//! Hexagonal Architecture:
//! - domain/: Pure business logic (segments, throttle, completion, sources)
//! - ports/: Trait definitions
//! - adapters/: Concrete implementations (memory, Redis, HTTP)
//! - application/: Playback session, write-behind sync, progress service
//! - config: Environment configuration
//!
//! # Features
//! - `probe`: ffmpeg-backed duration probing and the `avilearn-register` binary

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

// Re-exports for convenience
pub use application::session::PlaybackSession;
pub use config::{PlayerConfig, ServerConfig};
pub use domain::progress::{ProgressUpdate, WatchProgress};
