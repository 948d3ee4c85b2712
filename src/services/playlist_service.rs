//! Playlist operations shared by the HTTP layer and ingestion

use async_stream::stream;
use futures::Stream;
use sqlx::SqlitePool;
use std::sync::Arc;
use tokio_stream::{wrappers::BroadcastStream, StreamExt};
use tracing::info;

use crate::config::Config;
use crate::db::repository::playlists::{self, CategorySet};
use crate::db::repository::streams;
use crate::db::StoreEvents;
use crate::models::playlist::{
    EditStreamRequest, Playlist, PlaylistWithCount, PlaylistWithStreams, Stream as PlaylistStream,
};
use crate::services::content::ContentAccess;
use crate::services::error::IngestError;
use crate::services::fetch::Fetcher;

pub struct PlaylistService {
    pub(crate) pool: SqlitePool,
    pub(crate) fetcher: Arc<dyn Fetcher>,
    pub(crate) content: Arc<dyn ContentAccess>,
    pub(crate) config: Config,
    pub(crate) events: StoreEvents,
}

impl PlaylistService {
    pub fn new(
        pool: SqlitePool,
        fetcher: Arc<dyn Fetcher>,
        content: Arc<dyn ContentAccess>,
        config: Config,
    ) -> Self {
        Self {
            pool,
            fetcher,
            content,
            config,
            events: StoreEvents::new(),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn events(&self) -> &StoreEvents {
        &self.events
    }

    pub async fn list_with_counts(&self) -> Result<Vec<PlaylistWithCount>, IngestError> {
        Ok(playlists::list_with_counts(&self.pool).await?)
    }

    pub async fn get(&self, url: &str) -> Result<Playlist, IngestError> {
        playlists::find_by_url(&self.pool, url)
            .await?
            .ok_or_else(|| IngestError::PlaylistNotFound(url.to_string()))
    }

    pub async fn get_with_streams(&self, url: &str) -> Result<PlaylistWithStreams, IngestError> {
        let playlist = self.get(url).await?;
        let mut conn = self.pool.acquire().await?;
        let streams = streams::find_by_playlist(&mut conn, url).await?;

        Ok(PlaylistWithStreams { playlist, streams })
    }

    /// Delete a playlist and all of its streams in one transaction.
    /// Returns the removed playlist, or None when nothing was stored at `url`.
    pub async fn unsubscribe(&self, url: &str) -> Result<Option<Playlist>, IngestError> {
        let existing = playlists::find_by_url(&self.pool, url).await?;

        let mut tx = self.pool.begin().await?;
        let removed_streams = streams::delete_by_playlist(&mut tx, url).await?;
        playlists::delete_by_url(&mut tx, url).await?;
        tx.commit().await?;

        if existing.is_some() || removed_streams > 0 {
            info!(playlist = url, streams = removed_streams, "Unsubscribed playlist");
            self.events.notify(url);
        }

        Ok(existing)
    }

    pub async fn rename(&self, url: &str, title: &str) -> Result<(), IngestError> {
        if playlists::rename(&self.pool, url, title).await? == 0 {
            return Err(IngestError::PlaylistNotFound(url.to_string()));
        }
        self.events.notify(url);
        Ok(())
    }

    pub async fn update_user_agent(&self, url: &str, user_agent: Option<&str>) -> Result<(), IngestError> {
        if playlists::update_user_agent(&self.pool, url, user_agent).await? == 0 {
            return Err(IngestError::PlaylistNotFound(url.to_string()));
        }
        self.events.notify(url);
        Ok(())
    }

    pub async fn toggle_pinned_category(&self, url: &str, category: &str) -> Result<Vec<String>, IngestError> {
        self.toggle_category(url, CategorySet::Pinned, category).await
    }

    pub async fn toggle_hidden_category(&self, url: &str, category: &str) -> Result<Vec<String>, IngestError> {
        self.toggle_category(url, CategorySet::Hidden, category).await
    }

    async fn toggle_category(
        &self,
        url: &str,
        set: CategorySet,
        category: &str,
    ) -> Result<Vec<String>, IngestError> {
        let categories = playlists::toggle_category_in(&self.pool, url, set, category)
            .await?
            .ok_or_else(|| IngestError::PlaylistNotFound(url.to_string()))?;
        self.events.notify(url);
        Ok(categories)
    }

    /// Apply user edits to one stream
    pub async fn edit_stream(&self, id: i64, edit: &EditStreamRequest) -> Result<PlaylistStream, IngestError> {
        let stream = streams::find_by_id(&self.pool, id)
            .await?
            .ok_or(IngestError::StreamNotFound(id))?;

        if let Some(favourite) = edit.favourite {
            streams::set_favourite(&self.pool, id, favourite).await?;
        }
        if let Some(banned) = edit.banned {
            streams::set_banned(&self.pool, id, banned).await?;
        }
        if let Some(seen) = edit.seen {
            streams::mark_seen(&self.pool, id, seen).await?;
        }

        self.events.notify(&stream.playlist_url);

        streams::find_by_id(&self.pool, id)
            .await?
            .ok_or(IngestError::StreamNotFound(id))
    }

    /// Current playlist at `url`, then a fresh snapshot after every change to it
    pub fn observe(&self, url: &str) -> impl Stream<Item = Result<Option<Playlist>, sqlx::Error>> + Send + 'static {
        let pool = self.pool.clone();
        let url = url.to_string();
        let mut changes = BroadcastStream::new(self.events.subscribe());

        stream! {
            yield playlists::find_by_url(&pool, &url).await;

            while let Some(change) = changes.next().await {
                // A lagged receiver may have missed this url, so re-read
                if matches!(&change, Ok(changed) if *changed != url) {
                    continue;
                }
                yield playlists::find_by_url(&pool, &url).await;
            }
        }
    }
}
