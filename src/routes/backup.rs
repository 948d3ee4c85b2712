use axum::{
    body::Body,
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    Json,
};
use async_stream::stream;
use futures::{StreamExt, TryStreamExt};
use sqlx::SqlitePool;
use std::io;
use std::sync::Arc;
use tokio::sync::oneshot;
use tokio_util::io::{ReaderStream, StreamReader};

use super::ApiError;
use crate::services::backup;
use crate::AppState;

/// Pipe capacity between the exporter and the response body
const EXPORT_PIPE_BYTES: usize = 64 * 1024;

/// GET /api/backup - Stream a backup of all non-local playlists
pub async fn export_backup(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"playlists.backup\""),
        ],
        export_body(state.service.pool().clone()),
    )
}

/// Body fed by a background export; an export failure aborts the transfer
fn export_body(pool: SqlitePool) -> Body {
    let (mut writer, reader) = tokio::io::duplex(EXPORT_PIPE_BYTES);
    let (done_tx, done_rx) = oneshot::channel::<Result<(), String>>();

    tokio::spawn(async move {
        let result = backup::export(&pool, &mut writer).await.map(|_| ());
        if let Err(e) = &result {
            tracing::error!("Backup export failed: {}", e);
        }
        let _ = done_tx.send(result.map_err(|e| e.to_string()));
    });

    Body::from_stream(stream! {
        let mut chunks = ReaderStream::new(reader);
        while let Some(chunk) = chunks.next().await {
            yield chunk;
        }

        match done_rx.await {
            Ok(Ok(())) => {}
            Ok(Err(message)) => {
                yield Err(io::Error::new(io::ErrorKind::Other, message));
            }
            Err(_) => {
                yield Err(io::Error::new(io::ErrorKind::Other, "backup export stopped"));
            }
        }
    })
}

/// POST /api/restore - Restore playlists and streams from a backup body
pub async fn restore_backup(
    State(state): State<Arc<AppState>>,
    body: Body,
) -> Result<impl IntoResponse, ApiError> {
    let stream = body
        .into_data_stream()
        .map_err(|e| io::Error::new(io::ErrorKind::Other, e));
    let reader = StreamReader::new(stream);

    let summary = backup::import(state.service.pool(), reader, state.config.restore_batch_size).await?;

    Ok(Json(summary))
}
