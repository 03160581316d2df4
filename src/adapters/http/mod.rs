//! HTTP adapters.
//!
//! Inbound: the progress API router. Outbound: the reqwest sink the
//! playback side uses to reach it.

pub mod auth;
pub mod client;
pub mod error;
mod routes;

pub use client::{HttpProgressSink, SinkError};
pub use routes::{router, VideoResponse};
