//! Configuration for the server and playback sides.

use crate::domain::throttle::DEFAULT_SYNC_INTERVAL;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Configuration for the progress API server.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// HTTP server bind address
    pub addr: String,
    /// HTTP server port
    pub port: String,
    /// Redis connection URL; the in-memory store is used without one
    pub redis_url: Option<String>,
    /// JSON file with catalog entries loaded at start-up
    pub catalog_path: Option<String>,
}

impl ServerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        Self {
            addr: env::var("ADDR").unwrap_or_else(|_| String::from("127.0.0.1")),
            port: env::var("PORT").unwrap_or_else(|_| String::from("3000")),
            redis_url: env::var("REDIS_URL").ok().filter(|url| !url.trim().is_empty()),
            catalog_path: env::var("CATALOG_PATH").ok().filter(|path| !path.trim().is_empty()),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.addr, self.port)
    }
}

/// Configuration for a playback client syncing to the API.
#[derive(Clone, Debug)]
pub struct PlayerConfig {
    /// Base URL of the progress API
    pub api_base_url: String,
    /// Minimum time between two progress flushes
    pub sync_interval: Duration,
    /// Pending flushes kept before new ones are dropped
    pub sync_queue_capacity: usize,
}

impl PlayerConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();

        Self {
            api_base_url: env::var("API_BASE_URL")
                .unwrap_or_else(|_| String::from("http://127.0.0.1:3000")),
            sync_interval: Duration::from_secs(parse_or(
                env::var("SYNC_INTERVAL_SECS").ok(),
                DEFAULT_SYNC_INTERVAL.as_secs(),
            )),
            sync_queue_capacity: parse_or(env::var("SYNC_QUEUE_CAPACITY").ok(), 32),
        }
    }
}

fn parse_or<T: FromStr>(raw: Option<String>, default: T) -> T {
    match raw {
        Some(value) => match value.trim().parse() {
            Ok(parsed) => parsed,
            Err(_) => {
                tracing::warn!("Ignoring invalid setting {:?}, using default", value);
                default
            }
        },
        None => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_or() {
        assert_eq!(parse_or(Some(" 30 ".to_string()), 15u64), 30);
        assert_eq!(parse_or(Some("soon".to_string()), 15u64), 15);
        assert_eq!(parse_or::<usize>(None, 32), 32);
    }

    #[test]
    fn test_bind_address() {
        let config = ServerConfig {
            addr: "0.0.0.0".to_string(),
            port: "8080".to_string(),
            redis_url: None,
            catalog_path: None,
        };
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }
}
