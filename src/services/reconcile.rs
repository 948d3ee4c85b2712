//! Compare-and-update of a playlist's stored streams against a fresh fetch
//!
//! Streams are matched by url within one playlist. Fetched fields are
//! `title`, `group` and `cover`; user fields are `favourite`, `banned` and
//! `seen`. The whole pass runs in one SQLite transaction.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use std::collections::{HashMap, HashSet};
use tracing::info;

use crate::db::repository::streams;
use crate::models::playlist::Stream;

/// How stored user state survives a refresh
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaylistStrategy {
    /// Keep user fields of matched streams, delete unmatched ones
    #[default]
    Preserve,
    /// Like `Preserve`, but unmatched favourites are kept
    KeepFavourites,
    /// Overwrite matched streams completely, user fields included
    Replace,
}

impl PlaylistStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlaylistStrategy::Preserve => "preserve",
            PlaylistStrategy::KeepFavourites => "keep_favourites",
            PlaylistStrategy::Replace => "replace",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().replace('-', "_").as_str() {
            "preserve" => Some(PlaylistStrategy::Preserve),
            "keep_favourites" | "keep_favorites" => Some(PlaylistStrategy::KeepFavourites),
            "replace" => Some(PlaylistStrategy::Replace),
            _ => None,
        }
    }
}

/// Counts of one reconciliation pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReconcileOutcome {
    pub inserted: u64,
    pub updated: u64,
    pub deleted: u64,
}

/// Writes needed to turn the stored set into the fresh one
#[derive(Debug, Default)]
pub struct ReconcilePlan {
    pub inserts: Vec<Stream>,
    pub updates: Vec<Stream>,
    pub deletes: Vec<i64>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.inserts.is_empty() && self.updates.is_empty() && self.deletes.is_empty()
    }
}

fn merge(stored: &Stream, fresh: &Stream, strategy: PlaylistStrategy) -> Stream {
    match strategy {
        PlaylistStrategy::Replace => Stream {
            id: stored.id,
            playlist_url: stored.playlist_url.clone(),
            ..fresh.clone()
        },
        PlaylistStrategy::Preserve | PlaylistStrategy::KeepFavourites => Stream {
            title: fresh.title.clone(),
            group: fresh.group.clone(),
            cover: fresh.cover.clone(),
            ..stored.clone()
        },
    }
}

/// Pure diff of stored against fresh streams
pub fn plan(existing: &[Stream], fresh: &[Stream], strategy: PlaylistStrategy) -> ReconcilePlan {
    let stored_by_url: HashMap<&str, &Stream> =
        existing.iter().map(|s| (s.url.as_str(), s)).collect();

    let mut plan = ReconcilePlan::default();
    let mut fresh_urls: HashSet<&str> = HashSet::with_capacity(fresh.len());

    for candidate in fresh {
        // Duplicate urls in one fetch collapse to the first
        if !fresh_urls.insert(candidate.url.as_str()) {
            continue;
        }

        match stored_by_url.get(candidate.url.as_str()) {
            Some(stored) => {
                let merged = merge(stored, candidate, strategy);
                if &merged != *stored {
                    plan.updates.push(merged);
                }
            }
            None => plan.inserts.push(Stream {
                id: 0,
                ..candidate.clone()
            }),
        }
    }

    plan.deletes = existing
        .iter()
        .filter(|s| !fresh_urls.contains(s.url.as_str()))
        .filter(|s| !(strategy == PlaylistStrategy::KeepFavourites && s.favourite))
        .map(|s| s.id)
        .collect();

    plan
}

/// Reconcile the stored streams of `playlist_url` with `fresh` atomically
pub async fn compare_and_update(
    pool: &SqlitePool,
    playlist_url: &str,
    strategy: PlaylistStrategy,
    fresh: Vec<Stream>,
) -> Result<ReconcileOutcome, sqlx::Error> {
    let fresh: Vec<Stream> = fresh
        .into_iter()
        .map(|s| Stream {
            playlist_url: playlist_url.to_string(),
            ..s
        })
        .collect();

    let mut tx = pool.begin().await?;

    let existing = streams::find_by_playlist(&mut tx, playlist_url).await?;
    let plan = plan(&existing, &fresh, strategy);

    let outcome = if plan.is_empty() {
        ReconcileOutcome::default()
    } else {
        ReconcileOutcome {
            deleted: streams::delete_by_ids(&mut tx, &plan.deletes).await?,
            updated: streams::update_all(&mut tx, &plan.updates).await?,
            inserted: streams::insert_or_replace_all(&mut tx, &plan.inserts).await?,
        }
    };

    tx.commit().await?;

    info!(
        playlist = playlist_url,
        strategy = strategy.as_str(),
        inserted = outcome.inserted,
        updated = outcome.updated,
        deleted = outcome.deleted,
        "Reconciled playlist"
    );

    Ok(outcome)
}
