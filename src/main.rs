mod config;
mod db;
mod models;
mod routes;
mod services;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::config::Config;
use crate::db::{create_pool, run_migrations};
use crate::services::{
    content::DirectoryContent, fetch::HttpFetcher, JobTracker, PlaylistService,
};

/// How often finished jobs are swept from the tracker
const JOB_CLEANUP_INTERVAL: Duration = Duration::from_secs(3600);

/// Application state shared across handlers
pub struct AppState {
    pub config: Config,
    pub service: Arc<PlaylistService>,
    pub jobs: JobTracker,
    pub start_time: Instant,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing/logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "playlist_sync_server=info,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().json())
        .init();

    // Load configuration
    let config = Config::from_env();
    let port = config.port;

    tracing::info!("Starting Playlist Sync Server v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        strategy = config.playlist_strategy.as_str(),
        batch = config.xtream_batch_size,
        "Ingestion settings"
    );

    // Initialize SQLite connection pool
    let pool = create_pool(&config).await?;
    tracing::info!("SQLite connected");

    // Run database migrations
    run_migrations(&pool).await?;

    // Initialize services
    let fetcher = HttpFetcher::new(&config.user_agent, config.fetch_timeout_ms, config.max_m3u_bytes())?;
    tracing::info!(
        "Fetcher initialized (timeout: {}ms, max size: {}MB)",
        config.fetch_timeout_ms,
        config.max_m3u_size_mb
    );

    let content = DirectoryContent::new(config.content_root.clone());
    let service = PlaylistService::new(pool, Arc::new(fetcher), Arc::new(content), config.clone());

    // Sweep finished jobs (runs in background)
    let jobs = JobTracker::new();
    let cleanup_jobs = jobs.clone();
    let retention = chrono::Duration::hours(config.job_retention_hours);
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(JOB_CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = cleanup_jobs.cleanup(retention).await;
            if removed > 0 {
                tracing::info!("Removed {} finished jobs", removed);
            }
        }
    });
    tracing::info!("Job cleanup task started (hourly)");

    // Build application state
    let state = Arc::new(AppState {
        config,
        service: Arc::new(service),
        jobs,
        start_time: Instant::now(),
    });

    // Build router
    let app = routes::router(state).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CompressionLayer::new())
            .layer(
                CorsLayer::new()
                    .allow_origin(Any)
                    .allow_methods(Any)
                    .allow_headers(Any),
            ),
    );

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
