//! Adapters - Concrete implementations of ports.

pub mod http;
pub mod inprocess;
pub mod memory;
pub mod redis;
