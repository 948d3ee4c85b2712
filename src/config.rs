use std::env;
use std::path::PathBuf;

use crate::services::reconcile::PlaylistStrategy;

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub port: u16,

    // SQLite
    pub database_url: String,
    pub db_max_connections: u32,

    // Fetching
    pub fetch_timeout_ms: u64,
    pub max_m3u_size_mb: usize,
    pub user_agent: String,

    // Ingestion
    pub xtream_batch_size: usize,
    pub restore_batch_size: usize,
    pub playlist_strategy: PlaylistStrategy,

    // Local content
    pub local_storage_dir: PathBuf,
    pub content_root: PathBuf,

    // Jobs
    pub job_retention_hours: i64,
}

impl Config {
    /// Load configuration from environment variables with defaults
    pub fn from_env() -> Self {
        Self {
            // Server
            port: env::var("PORT")
                .unwrap_or_else(|_| "3001".to_string())
                .parse()
                .unwrap_or(3001),

            // SQLite
            database_url: env::var("DATABASE_URL")
                .unwrap_or_else(|_| "sqlite://playlists.db".to_string()),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "5".to_string())
                .parse()
                .unwrap_or(5),

            // Fetching
            fetch_timeout_ms: env::var("FETCH_TIMEOUT_MS")
                .unwrap_or_else(|_| "300000".to_string())
                .parse()
                .unwrap_or(300_000), // 5 minutes

            max_m3u_size_mb: env::var("MAX_M3U_SIZE_MB")
                .unwrap_or_else(|_| "500".to_string())
                .parse()
                .unwrap_or(500),

            // Use VLC user agent to avoid IPTV server blocks
            user_agent: env::var("USER_AGENT")
                .unwrap_or_else(|_| "VLC/3.0.20 LibVLC/3.0.20".to_string()),

            // Ingestion
            xtream_batch_size: env::var("XTREAM_BATCH_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(100),

            restore_batch_size: env::var("RESTORE_BATCH_SIZE")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(400),

            playlist_strategy: env::var("PLAYLIST_STRATEGY")
                .ok()
                .and_then(|v| PlaylistStrategy::parse(&v))
                .unwrap_or_default(),

            // Local content
            local_storage_dir: env::var("LOCAL_STORAGE_DIR")
                .unwrap_or_else(|_| ".local-playlists".to_string())
                .into(),
            content_root: env::var("CONTENT_ROOT")
                .unwrap_or_else(|_| ".content".to_string())
                .into(),

            // Jobs
            job_retention_hours: env::var("JOB_RETENTION_HOURS")
                .unwrap_or_else(|_| "24".to_string())
                .parse()
                .unwrap_or(24),
        }
    }

    pub fn max_m3u_bytes(&self) -> u64 {
        (self.max_m3u_size_mb as u64) * 1024 * 1024
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_env()
    }
}
