//! Application layer - Services built on the domain and ports.

pub mod catalog;
pub mod player;
pub mod progress;
pub mod session;
pub mod sync;
