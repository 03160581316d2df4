//! Ports - Trait definitions.

pub mod catalog;
pub mod repository;
pub mod sink;
