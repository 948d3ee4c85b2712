pub mod backup;
pub mod health;
pub mod jobs;
pub mod playlists;
pub mod streams;

use axum::{
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use std::sync::Arc;

use crate::services::IngestError;
use crate::AppState;

/// Error body returned by every handler
pub type ApiError = (StatusCode, Json<serde_json::Value>);

pub fn error_response(status: StatusCode, message: impl std::fmt::Display) -> ApiError {
    (status, Json(serde_json::json!({ "error": message.to_string() })))
}

impl From<IngestError> for (StatusCode, Json<serde_json::Value>) {
    fn from(err: IngestError) -> Self {
        let status = match &err {
            IngestError::PlaylistNotFound(_) | IngestError::StreamNotFound(_) => StatusCode::NOT_FOUND,
            IngestError::UnsupportedLocation(_)
            | IngestError::RefreshNotSupported(_)
            | IngestError::NotASeries(_) => StatusCode::BAD_REQUEST,
            IngestError::SourceUnreachable(_) | IngestError::HandshakeFailure(_) => StatusCode::BAD_GATEWAY,
            IngestError::Store(_) | IngestError::Io(_) => {
                tracing::error!("Request failed: {}", err);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        error_response(status, err)
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health endpoints
        .route("/", get(health::root))
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::metrics))
        .route("/ready", get(health::ready))
        .route("/live", get(health::live))
        // Playlists
        .route(
            "/api/playlists",
            get(playlists::list_playlists)
                .delete(playlists::unsubscribe)
                .patch(playlists::edit_playlist),
        )
        .route("/api/playlists/detail", get(playlists::get_playlist))
        .route("/api/playlists/watch", get(playlists::watch_playlist))
        .route("/api/playlists/categories/pin", post(playlists::pin_category))
        .route("/api/playlists/categories/hide", post(playlists::hide_category))
        // Ingestion jobs
        .route("/api/subscribe/m3u", post(jobs::subscribe_m3u))
        .route("/api/subscribe/xtream", post(jobs::subscribe_xtream))
        .route("/api/playlists/refresh", post(jobs::refresh_playlist))
        .route("/api/jobs/:id", get(jobs::get_job))
        .route("/api/jobs/:id/events", get(jobs::job_events))
        // Streams
        .route("/api/streams/:id", patch(streams::edit_stream))
        .route("/api/streams/:id/episodes", get(streams::get_episodes))
        // Backup
        .route("/api/backup", get(backup::export_backup))
        .route("/api/restore", post(backup::restore_backup))
        .with_state(state)
}
