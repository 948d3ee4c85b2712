use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        IntoResponse,
    },
    Json,
};
use futures::Stream;
use serde::Serialize;
use std::convert::Infallible;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::{error_response, ApiError};
use crate::models::playlist::{
    JobResponse, PlaylistUrlQuery, Progress, SubscribeM3uRequest, SubscribeXtreamRequest,
};
use crate::services::jobs::{JobState, JobTracker};
use crate::services::xtream::XtreamInput;
use crate::services::IngestError;
use crate::AppState;

/// Progress callback feeding a job, plus the task that applies updates in order
fn progress_reporter(jobs: JobTracker, id: Uuid) -> (impl Fn(Progress) + Send, JoinHandle<()>) {
    let (tx, mut rx) = mpsc::unbounded_channel::<Progress>();

    let forwarder = tokio::spawn(async move {
        while let Some(progress) = rx.recv().await {
            jobs.progress(id, progress).await;
        }
    });

    let report = move |progress: Progress| {
        let _ = tx.send(progress);
    };

    (report, forwarder)
}

async fn finish_job<T: Serialize>(jobs: &JobTracker, id: Uuid, result: Result<T, IngestError>) {
    match result {
        Ok(summary) => {
            let summary = serde_json::to_value(&summary).unwrap_or_default();
            tracing::info!(job = %id, summary = %summary, "Job completed");
            jobs.complete(id, summary).await;
        }
        Err(e) => {
            tracing::error!(job = %id, "Job failed: {}", e);
            jobs.fail(id, e.to_string()).await;
        }
    }
}

fn accepted(id: Uuid) -> (StatusCode, Json<JobResponse>) {
    (
        StatusCode::ACCEPTED,
        Json(JobResponse {
            job_id: id.to_string(),
            status: "running".to_string(),
        }),
    )
}

/// POST /api/subscribe/m3u - Subscribe an M3U playlist in the background
pub async fn subscribe_m3u(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SubscribeM3uRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.url.trim().is_empty() {
        return Err(error_response(StatusCode::BAD_REQUEST, "URL is required"));
    }

    let id = state.jobs.start("m3u", &payload.url).await;

    let state_clone = state.clone();
    tokio::spawn(async move {
        tracing::info!(job = %id, url = %payload.url, "M3U subscription started");

        let (progress, forwarder) = progress_reporter(state_clone.jobs.clone(), id);
        let result = state_clone
            .service
            .subscribe_m3u(&payload.title, &payload.url, progress)
            .await;
        let _ = forwarder.await;

        finish_job(&state_clone.jobs, id, result).await;
    });

    Ok(accepted(id))
}

/// POST /api/subscribe/xtream - Subscribe an Xtream account in the background
pub async fn subscribe_xtream(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SubscribeXtreamRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.basic_url.trim().is_empty() || payload.username.is_empty() {
        return Err(error_response(
            StatusCode::BAD_REQUEST,
            "basicUrl and username are required",
        ));
    }

    let input = XtreamInput::new(
        payload.basic_url.trim(),
        payload.username,
        payload.password,
        payload.kind,
    );
    let id = state.jobs.start("xtream", &input.basic_url).await;

    let state_clone = state.clone();
    let title = payload.title;
    tokio::spawn(async move {
        tracing::info!(job = %id, server = %input.basic_url, "Xtream subscription started");

        let (progress, forwarder) = progress_reporter(state_clone.jobs.clone(), id);
        let result = state_clone.service.subscribe_xtream(&title, input, progress).await;
        let _ = forwarder.await;

        finish_job(&state_clone.jobs, id, result).await;
    });

    Ok(accepted(id))
}

/// POST /api/playlists/refresh - Re-ingest a stored playlist in the background
pub async fn refresh_playlist(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<PlaylistUrlQuery>,
) -> Result<impl IntoResponse, ApiError> {
    // Fail fast on playlists that cannot be refreshed
    let playlist = state.service.get(&payload.url).await?;
    if playlist.from_local() {
        return Err(IngestError::RefreshNotSupported(payload.url).into());
    }

    let id = state.jobs.start("refresh", &payload.url).await;

    let state_clone = state.clone();
    tokio::spawn(async move {
        let (progress, forwarder) = progress_reporter(state_clone.jobs.clone(), id);
        let result = state_clone.service.refresh(&payload.url, progress).await;
        let _ = forwarder.await;

        finish_job(&state_clone.jobs, id, result).await;
    });

    Ok(accepted(id))
}

/// GET /api/jobs/:id - Current state of a job
pub async fn get_job(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .jobs
        .get(id)
        .await
        .map(Json)
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, format!("Job not found: {}", id)))
}

/// GET /api/jobs/:id/events - Server-sent job updates until the job finishes
pub async fn job_events(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, ApiError> {
    // Subscribe before reading so no update between the two is lost
    let mut updates = state.jobs.subscribe();
    let current = state
        .jobs
        .get(id)
        .await
        .ok_or_else(|| error_response(StatusCode::NOT_FOUND, format!("Job not found: {}", id)))?;

    let events = async_stream::stream! {
        let mut finished = current.state != JobState::Running;
        if let Ok(event) = Event::default().event("job").json_data(&current) {
            yield Ok(event);
        }

        while !finished {
            let job = match updates.recv().await {
                Ok(job) if job.id == id => job,
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(_)) => match state.jobs.get(id).await {
                    Some(job) => job,
                    None => break,
                },
                Err(broadcast::error::RecvError::Closed) => break,
            };

            finished = job.state != JobState::Running;
            if let Ok(event) = Event::default().event("job").json_data(&job) {
                yield Ok(event);
            }
        }
    };

    Ok(Sse::new(events).keep_alive(KeepAlive::default()))
}
