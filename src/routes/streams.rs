use axum::{
    extract::{Path, State},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

use super::ApiError;
use crate::models::playlist::EditStreamRequest;
use crate::AppState;

/// PATCH /api/streams/:id - Update favourite, banned or seen
pub async fn edit_stream(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
    Json(payload): Json<EditStreamRequest>,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.service.edit_stream(id, &payload).await?))
}

/// GET /api/streams/:id/episodes - Episodes of an Xtream series stream
pub async fn get_episodes(
    State(state): State<Arc<AppState>>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let episodes = state.service.read_episodes(id).await?;
    tracing::debug!(stream = id, episodes = episodes.len(), "Episodes fetched");
    Ok(Json(episodes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::repository::{playlists, streams};
    use crate::models::playlist::{DataSource, Playlist, Stream};
    use crate::routes::{router, testing};
    use crate::services::fetch::testing::StaticFetcher;
    use axum::{body::Body, http::Request, http::StatusCode};
    use tower::ServiceExt;

    #[tokio::test]
    async fn test_edit_stream_and_episodes_of_m3u_stream() {
        let dir = tempfile::tempdir().unwrap();
        let state = testing::state(Arc::new(StaticFetcher::new()), dir.path()).await;
        let url = "http://example.com/list.m3u";
        {
            let mut conn = state.service.pool().acquire().await.unwrap();
            playlists::upsert(&mut conn, &Playlist::new("List", url, DataSource::M3u))
                .await
                .unwrap();
            streams::insert_or_replace_all(&mut conn, &[Stream::new("A", "http://a/1", "", url)])
                .await
                .unwrap();
        }
        let app = router(state);

        let response = app
            .clone()
            .oneshot(
                Request::patch("/api/streams/1")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"favourite": true, "seen": 1700000000000}"#))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = testing::json_body(response).await;
        assert_eq!(body["favourite"], true);
        assert_eq!(body["seen"], 1_700_000_000_000i64);

        let response = app
            .clone()
            .oneshot(Request::get("/api/streams/1/episodes").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let response = app
            .oneshot(Request::get("/api/streams/42/episodes").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
