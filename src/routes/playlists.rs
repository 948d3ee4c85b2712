use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    Json,
};
use futures::{Stream, StreamExt};
use std::convert::Infallible;
use std::sync::Arc;

use super::{error_response, ApiError};
use crate::models::playlist::{CategoryRequest, EditPlaylistRequest, PlaylistUrlQuery};
use crate::AppState;

/// GET /api/playlists - All playlists with their stream counts
pub async fn list_playlists(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.list_with_counts().await?))
}

/// GET /api/playlists/detail?url= - One playlist with its streams
pub async fn get_playlist(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PlaylistUrlQuery>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.get_with_streams(&query.url).await?))
}

/// DELETE /api/playlists?url= - Unsubscribe, removing the playlist and its streams
pub async fn unsubscribe(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PlaylistUrlQuery>,
) -> Result<impl IntoResponse, ApiError> {
    match state.service.unsubscribe(&query.url).await? {
        Some(playlist) => Ok(Json(serde_json::json!({
            "success": true,
            "playlist": playlist,
        }))),
        None => Err(error_response(
            StatusCode::NOT_FOUND,
            format!("Playlist not found: {}", query.url),
        )),
    }
}

/// PATCH /api/playlists - Rename and/or change the user agent.
/// An empty user agent clears the override.
pub async fn edit_playlist(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<EditPlaylistRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(title) = payload.title.as_deref() {
        if title.trim().is_empty() {
            return Err(error_response(StatusCode::BAD_REQUEST, "Title must not be empty"));
        }
        state.service.rename(&payload.url, title.trim()).await?;
    }

    if let Some(user_agent) = payload.user_agent.as_deref() {
        let user_agent = Some(user_agent.trim()).filter(|ua| !ua.is_empty());
        state.service.update_user_agent(&payload.url, user_agent).await?;
    }

    Ok(Json(state.service.get(&payload.url).await?))
}

/// POST /api/playlists/categories/pin - Toggle a pinned category
pub async fn pin_category(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let pinned = state
        .service
        .toggle_pinned_category(&payload.url, &payload.category)
        .await?;
    Ok(Json(serde_json::json!({ "pinnedCategories": pinned })))
}

/// POST /api/playlists/categories/hide - Toggle a hidden category
pub async fn hide_category(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CategoryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let hidden = state
        .service
        .toggle_hidden_category(&payload.url, &payload.category)
        .await?;
    Ok(Json(serde_json::json!({ "hiddenCategories": hidden })))
}

/// GET /api/playlists/watch?url= - Server-sent playlist snapshots.
/// A `null` payload means the playlist no longer exists.
pub async fn watch_playlist(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PlaylistUrlQuery>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let events = state.service.observe(&query.url).filter_map(|snapshot| async move {
        match snapshot {
            Ok(playlist) => Event::default().event("playlist").json_data(playlist).ok().map(Ok),
            Err(e) => {
                tracing::warn!("Playlist watch read failed: {}", e);
                None
            }
        }
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}
