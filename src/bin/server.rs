//! Progress API server
//!
//! Wires up:
//! - Storage (Redis when REDIS_URL is set, in-memory otherwise)
//! - Optional catalog import from CATALOG_PATH
//! - HTTP layer (progress and video routes)

use avilearn::adapters::http::router;
use avilearn::adapters::memory::MemoryStore;
use avilearn::adapters::redis::RedisPool;
use avilearn::application::catalog::import_videos;
use avilearn::application::progress::ProgressService;
use avilearn::config::ServerConfig;
use avilearn::ports::catalog::VideoCatalog;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

#[tokio::main]
async fn main() {
    let config = ServerConfig::from_env();

    tracing_subscriber::fmt::init();

    // 1. Adapters + application service
    let app = match &config.redis_url {
        Some(url) => {
            let pool = match RedisPool::new(url) {
                Ok(pool) => pool,
                Err(e) => {
                    eprintln!("Failed to create Redis pool: {:?}", e);
                    std::process::exit(1);
                }
            };
            if let Err(e) = pool.ping().await {
                eprintln!("Failed to connect to Redis: {:?}", e);
                std::process::exit(1);
            }
            seed_catalog(&pool, &config).await;
            router(Arc::new(ProgressService::new(pool.clone(), pool)))
        }
        None => {
            tracing::warn!("REDIS_URL not set, progress is kept in memory only");
            let store = MemoryStore::new();
            seed_catalog(&store, &config).await;
            router(Arc::new(ProgressService::new(store.clone(), store)))
        }
    };

    // 2. HTTP layer
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);
    let app = app.layer(cors);

    // 3. Start server
    let listener = tokio::net::TcpListener::bind(config.bind_address())
        .await
        .expect("Failed to bind TCP listener");
    tracing::info!("Listening at {}", config.bind_address());
    axum::serve(listener, app)
        .await
        .expect("Server failed to start");
}

async fn seed_catalog<C: VideoCatalog>(catalog: &C, config: &ServerConfig) {
    let Some(path) = &config.catalog_path else {
        return;
    };

    let json = match tokio::fs::read_to_string(path).await {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Failed to read catalog {}: {}", path, e);
            std::process::exit(1);
        }
    };
    if let Err(e) = import_videos(catalog, &json).await {
        eprintln!("Failed to import catalog {}: {}", path, e);
        std::process::exit(1);
    }
}
