//! In-memory tracking of spawned ingestion jobs

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};
use uuid::Uuid;

use crate::models::playlist::Progress;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobState {
    Running,
    Completed,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStatus {
    pub id: Uuid,
    pub kind: String,
    pub target: String,
    pub state: JobState,
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<serde_json::Value>,
    pub started_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct JobTracker {
    jobs: Arc<RwLock<HashMap<Uuid, JobStatus>>>,
    events: broadcast::Sender<JobStatus>,
}

impl Default for JobTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl JobTracker {
    pub fn new() -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            jobs: Arc::new(RwLock::new(HashMap::new())),
            events,
        }
    }

    /// Register a running job and return its id
    pub async fn start(&self, kind: &str, target: &str) -> Uuid {
        let now = Utc::now();
        let status = JobStatus {
            id: Uuid::new_v4(),
            kind: kind.to_string(),
            target: target.to_string(),
            state: JobState::Running,
            count: 0,
            total: None,
            error: None,
            summary: None,
            started_at: now,
            updated_at: now,
            finished_at: None,
        };
        let id = status.id;

        self.jobs.write().await.insert(id, status.clone());
        let _ = self.events.send(status);

        id
    }

    pub async fn progress(&self, id: Uuid, progress: Progress) {
        self.update(id, |job| {
            job.count = progress.count;
            job.total = progress.total;
        })
        .await;
    }

    pub async fn complete(&self, id: Uuid, summary: serde_json::Value) {
        self.update(id, |job| {
            job.state = JobState::Completed;
            job.summary = Some(summary);
            job.finished_at = Some(Utc::now());
        })
        .await;
    }

    pub async fn fail(&self, id: Uuid, error: String) {
        self.update(id, |job| {
            job.state = JobState::Failed;
            job.error = Some(error);
            job.finished_at = Some(Utc::now());
        })
        .await;
    }

    async fn update(&self, id: Uuid, f: impl FnOnce(&mut JobStatus)) {
        let mut jobs = self.jobs.write().await;
        if let Some(job) = jobs.get_mut(&id) {
            f(job);
            job.updated_at = Utc::now();
            let _ = self.events.send(job.clone());
        }
    }

    pub async fn get(&self, id: Uuid) -> Option<JobStatus> {
        self.jobs.read().await.get(&id).cloned()
    }

    pub async fn running(&self) -> usize {
        self.jobs
            .read()
            .await
            .values()
            .filter(|job| job.state == JobState::Running)
            .count()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<JobStatus> {
        self.events.subscribe()
    }

    /// Drop finished jobs older than the retention window; returns how many were removed
    pub async fn cleanup(&self, retention: Duration) -> usize {
        let cutoff = Utc::now() - retention;
        let mut jobs = self.jobs.write().await;
        let before = jobs.len();
        jobs.retain(|_, job| job.finished_at.map(|t| t > cutoff).unwrap_or(true));
        before - jobs.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_job_lifecycle() {
        let tracker = JobTracker::new();
        let mut events = tracker.subscribe();

        let id = tracker.start("m3u", "http://example.com/list.m3u").await;
        tracker.progress(id, Progress::unknown_total(12)).await;
        tracker.complete(id, serde_json::json!({"inserted": 12})).await;

        let job = tracker.get(id).await.unwrap();
        assert_eq!(job.state, JobState::Completed);
        assert_eq!(job.count, 12);
        assert!(job.finished_at.is_some());

        assert_eq!(events.recv().await.unwrap().state, JobState::Running);
    }

    #[tokio::test]
    async fn test_cleanup_keeps_running_jobs() {
        let tracker = JobTracker::new();
        let running = tracker.start("xtream", "a").await;
        let failed = tracker.start("xtream", "b").await;
        tracker.fail(failed, "boom".to_string()).await;

        let removed = tracker.cleanup(Duration::zero() - Duration::seconds(1)).await;

        assert_eq!(removed, 1);
        assert!(tracker.get(running).await.is_some());
        assert!(tracker.get(failed).await.is_none());
    }
}
