//! Ingestion runs: M3U and Xtream subscribe, refresh, episode lookup

use futures::StreamExt;
use serde::Serialize;
use std::io::Cursor;
use std::path::Path;
use tracing::{info, warn};

use super::playlist_service::PlaylistService;
use crate::db::repository::{playlists, streams};
use crate::models::playlist::{DataSource, Playlist, Progress, Stream, XtreamKind};
use crate::services::batch::BatchBuffer;
use crate::services::content::{file_url, SourceLocation};
use crate::services::error::IngestError;
use crate::services::m3u_parser::M3uParser;
use crate::services::mapper::{self, category_names, CategoryNames, MapContext};
use crate::services::metrics;
use crate::services::reconcile::{compare_and_update, ReconcileOutcome};
use crate::services::xtream::{XtreamEntity, XtreamInput, XtreamParser, XtreamPlaylistUrl};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct M3uSummary {
    pub playlist_url: String,
    pub outcome: ReconcileOutcome,
    pub skipped: usize,
    pub duplicates: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct XtreamSummary {
    pub playlists: Vec<String>,
    pub written: u64,
    pub flushes: usize,
    pub skipped: usize,
    /// Enumeration ended early; already flushed batches stay committed
    pub partial: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "source", rename_all = "lowercase")]
pub enum RefreshSummary {
    M3u(M3uSummary),
    Xtream(XtreamSummary),
}

/// Per-kind mapping state of one Xtream run
struct KindTarget {
    ctx: MapContext,
    categories: CategoryNames,
}

impl PlaylistService {
    /// Fetch, parse and reconcile one M3U playlist.
    ///
    /// Progress is reported as `(0, None)` before fetching and `(n, None)`
    /// once the whole file is parsed.
    pub async fn subscribe_m3u(
        &self,
        title: &str,
        url: &str,
        progress: impl Fn(Progress) + Send,
    ) -> Result<M3uSummary, IngestError> {
        progress(Progress::unknown_total(0));

        let (playlist_url, bytes) = self.acquire_m3u(url).await.map_err(|e| {
            metrics::record_run("m3u", false);
            e
        })?;

        let mut entries = M3uParser::entries(Cursor::new(bytes));
        let fresh: Vec<Stream> = entries
            .by_ref()
            .map(|entry| mapper::m3u_stream(&entry, &playlist_url, 0))
            .collect();
        let (skipped, duplicates) = (entries.skipped(), entries.duplicates());

        progress(Progress::unknown_total(fresh.len()));
        metrics::record_skipped("m3u", skipped);

        let playlist = match playlists::find_by_url(&self.pool, &playlist_url).await? {
            Some(existing) => Playlist {
                title: title.to_string(),
                ..existing
            },
            None => Playlist::new(title, playlist_url.clone(), DataSource::M3u),
        };
        let mut conn = self.pool.acquire().await?;
        playlists::upsert(&mut conn, &playlist).await?;
        drop(conn);

        let outcome = compare_and_update(&self.pool, &playlist_url, self.config.playlist_strategy, fresh).await?;

        metrics::STREAMS_TOTAL.with_label_values(&["inserted"]).inc_by(outcome.inserted);
        metrics::STREAMS_TOTAL.with_label_values(&["updated"]).inc_by(outcome.updated);
        metrics::STREAMS_TOTAL.with_label_values(&["deleted"]).inc_by(outcome.deleted);
        metrics::record_run("m3u", true);
        self.events.notify(&playlist_url);

        info!(
            playlist = %playlist_url,
            skipped,
            duplicates,
            "M3U subscription finished"
        );

        Ok(M3uSummary {
            playlist_url,
            outcome,
            skipped,
            duplicates,
        })
    }

    /// Resolve the location to bytes and the url the playlist is stored under.
    /// Nothing is written to the store on failure.
    async fn acquire_m3u(&self, url: &str) -> Result<(String, Vec<u8>), IngestError> {
        match SourceLocation::classify(url)? {
            SourceLocation::Network(network_url) => {
                let user_agent = playlists::find_by_url(&self.pool, &network_url)
                    .await?
                    .and_then(|p| p.user_agent);
                let bytes = self.fetcher.get(&network_url, user_agent.as_deref()).await?;
                Ok((network_url, bytes))
            }
            SourceLocation::LocalFile(path) => {
                let bytes = tokio::fs::read(&path)
                    .await
                    .map_err(|e| IngestError::SourceUnreachable(format!("{}: {}", path.display(), e)))?;
                let playlist_url = if url.trim().to_lowercase().starts_with("file://") {
                    url.trim().to_string()
                } else {
                    file_url(&path)?
                };
                Ok((playlist_url, bytes))
            }
            SourceLocation::ContentHandle(uri) => {
                let bytes = self
                    .content
                    .read(&uri)
                    .await
                    .map_err(|e| IngestError::SourceUnreachable(format!("{}: {}", uri, e)))?;

                let playlist_url = self.copy_to_local(&self.content.display_name(&uri), &bytes).await?;
                if playlists::exists(&self.pool, &uri).await?
                    && !playlists::exists(&self.pool, &playlist_url).await?
                {
                    playlists::update_url(&self.pool, &uri, &playlist_url).await?;
                    self.events.notify(&uri);
                }

                Ok((playlist_url, bytes))
            }
        }
    }

    /// Keep a copy of handle content so the playlist outlives the handle
    async fn copy_to_local(&self, file_name: &str, bytes: &[u8]) -> Result<String, IngestError> {
        let dir = &self.config.local_storage_dir;
        tokio::fs::create_dir_all(dir).await?;
        let dir = tokio::fs::canonicalize(dir).await?;

        let path = dir.join(Path::new(file_name));
        tokio::fs::write(&path, bytes).await?;

        info!(path = %path.display(), bytes = bytes.len(), "Copied content to local storage");

        file_url(&path)
    }

    /// Handshake once, then stream every required kind into its own playlist.
    ///
    /// Items are written in batches as they arrive. A listing failure ends
    /// the run early with `partial` set; flushed batches are kept.
    pub async fn subscribe_xtream(
        &self,
        title: &str,
        input: XtreamInput,
        progress: impl Fn(Progress) + Send,
    ) -> Result<XtreamSummary, IngestError> {
        progress(Progress::unknown_total(0));

        let parser = XtreamParser::new(self.fetcher.clone());
        let output = parser.output(&input).await.map_err(|e| {
            metrics::record_run("xtream", false);
            e
        })?;

        let kinds: Vec<XtreamKind> = XtreamKind::ALL
            .into_iter()
            .filter(|k| k.is_required_by(input.kind))
            .collect();

        let mut targets: Vec<(XtreamKind, KindTarget)> = Vec::with_capacity(kinds.len());
        for &kind in &kinds {
            let playlist_url =
                XtreamPlaylistUrl::new(input.with_kind(kind), &output.server_protocol, output.port).encode()?;

            // User settings survive a re-subscribe; streams are rebuilt
            let playlist = match playlists::find_by_url(&self.pool, &playlist_url).await? {
                Some(existing) if existing.source == DataSource::Xtream => Playlist {
                    title: title.to_string(),
                    ..existing
                },
                _ => Playlist::new(title, playlist_url.clone(), DataSource::Xtream),
            };

            self.unsubscribe(&playlist_url).await?;
            let mut conn = self.pool.acquire().await?;
            playlists::upsert(&mut conn, &playlist).await?;
            drop(conn);

            targets.push((
                kind,
                KindTarget {
                    ctx: MapContext {
                        basic_url: input.basic_url.clone(),
                        username: input.username.clone(),
                        password: input.password.clone(),
                        playlist_url,
                        container_extension: output.allowed_output_formats.first().cloned(),
                    },
                    categories: category_names(output.categories(kind)),
                },
            ));
        }

        let buffer = BatchBuffer::new(self.pool.clone(), self.config.xtream_batch_size);
        let mut count = 0usize;
        {
            let entities = parser.entities(&input, &kinds);
            futures::pin_mut!(entities);

            while let Some(entity) = entities.next().await {
                let Some((_, target)) = targets.iter().find(|(k, _)| *k == entity.kind()) else {
                    continue;
                };
                let stream = match &entity {
                    XtreamEntity::Live(live) => mapper::live_stream(live, &target.ctx, &target.categories),
                    XtreamEntity::Vod(vod) => mapper::vod_stream(vod, &target.ctx, &target.categories),
                    XtreamEntity::Series(series) => mapper::series_stream(series, &target.ctx, &target.categories),
                };

                buffer.push(stream).await?;
                count += 1;
                if count % self.config.xtream_batch_size == 0 {
                    progress(Progress::unknown_total(count));
                }
            }
        }
        let stats = buffer.finish().await?;
        progress(Progress::unknown_total(count));

        let report = parser.report();
        if let Some(failure) = &report.failure {
            warn!(written = stats.written, "Xtream enumeration ended early: {}", failure);
        }
        metrics::record_skipped("xtream", report.skipped);
        metrics::record_run("xtream", !report.partial());

        let playlists: Vec<String> = targets.into_iter().map(|(_, t)| t.ctx.playlist_url).collect();
        for url in &playlists {
            self.events.notify(url);
        }

        info!(
            items = count,
            written = stats.written,
            flushes = stats.flushes,
            skipped = report.skipped,
            "Xtream subscription finished"
        );

        Ok(XtreamSummary {
            playlists,
            written: stats.written,
            flushes: stats.flushes,
            skipped: report.skipped,
            partial: report.partial(),
        })
    }

    /// Re-run ingestion for a stored playlist based on its source kind
    pub async fn refresh(
        &self,
        url: &str,
        progress: impl Fn(Progress) + Send,
    ) -> Result<RefreshSummary, IngestError> {
        let playlist = self.get(url).await?;

        if playlist.from_local() {
            return Err(IngestError::RefreshNotSupported(url.to_string()));
        }

        match playlist.source {
            DataSource::M3u => Ok(RefreshSummary::M3u(
                self.subscribe_m3u(&playlist.title, &playlist.url, progress).await?,
            )),
            DataSource::Xtream => {
                let decoded = XtreamPlaylistUrl::decode(&playlist.url)?;
                Ok(RefreshSummary::Xtream(
                    self.subscribe_xtream(&playlist.title, decoded.input, progress).await?,
                ))
            }
            DataSource::Epg | DataSource::Other => Err(IngestError::RefreshNotSupported(url.to_string())),
        }
    }

    /// Episodes of a stored Xtream series stream, fetched on demand
    pub async fn read_episodes(&self, stream_id: i64) -> Result<Vec<Stream>, IngestError> {
        let series = streams::find_by_id(&self.pool, stream_id)
            .await?
            .ok_or(IngestError::StreamNotFound(stream_id))?;
        let playlist = self.get(&series.playlist_url).await?;

        if playlist.xtream_kind() != Some(XtreamKind::Series) {
            return Err(IngestError::NotASeries(stream_id));
        }
        let series_id = series.trailing_id().ok_or(IngestError::NotASeries(stream_id))?;

        let decoded = XtreamPlaylistUrl::decode(&playlist.url)?;
        let episodes = XtreamParser::new(self.fetcher.clone())
            .series_info(&decoded.input, series_id)
            .await
            .map_err(|e| IngestError::SourceUnreachable(e.to_string()))?;

        let ctx = MapContext {
            basic_url: decoded.input.basic_url,
            username: decoded.input.username,
            password: decoded.input.password,
            playlist_url: playlist.url,
            container_extension: None,
        };

        Ok(episodes.iter().map(|e| mapper::episode_stream(e, &ctx)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::fetch::testing::StaticFetcher;
    use crate::services::playlist_service::testing::service;
    use std::sync::{Arc, Mutex};

    const BASIC: &str = "http://example.com:8080";
    const API: &str = "http://example.com:8080/player_api.php?username=u&password=p";

    fn action(name: &str) -> String {
        format!("{}&action={}", API, name)
    }

    fn m3u_body() -> &'static str {
        "#EXTM3U\n\
         #EXTINF:-1 group-title=\"News\" tvg-logo=\"http://logo/1.png\",One\n\
         http://streams/1.ts\n\
         http://streams/orphan.ts\n\
         #EXTINF:-1 group-title=\"Sports\",Two\n\
         http://streams/2.ts\n"
    }

    fn xtream_fetcher(live_items: usize) -> StaticFetcher {
        let live: Vec<serde_json::Value> = (0..live_items)
            .map(|i| serde_json::json!({"name": format!("Ch {}", i), "stream_id": i + 1, "category_id": "1"}))
            .collect();

        StaticFetcher::new()
            .with(
                API,
                r#"{"user_info": {"auth": 1, "allowed_output_formats": ["m3u8"]},
                    "server_info": {"port": "8080", "server_protocol": "http"}}"#,
            )
            .with(action("get_live_categories"), r#"[{"category_id": "1", "category_name": "News"}]"#)
            .with(action("get_vod_categories"), "[]")
            .with(action("get_series_categories"), r#"[{"category_id": "9", "category_name": "Drama"}]"#)
            .with(action("get_live_streams"), serde_json::to_string(&live).unwrap())
            .with(action("get_vod_streams"), r#"[{"name": "Movie", "stream_id": 5, "container_extension": "mkv"}]"#)
            .with(action("get_series"), r#"[{"series_id": 77, "name": "Show", "category_id": "9"}]"#)
            .with(
                action("get_series_info&series_id=77"),
                r#"{"episodes": {"1": [{"id": "701", "episode_num": 1, "title": "Pilot", "container_extension": "mp4"}]}}"#,
            )
    }

    fn recorder() -> (Arc<Mutex<Vec<Progress>>>, impl Fn(Progress) + Send) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        (seen, move |p| sink.lock().unwrap().push(p))
    }

    #[tokio::test]
    async fn test_subscribe_m3u_network() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = StaticFetcher::new().with("http://example.com/list.m3u", m3u_body());
        let service = service(Arc::new(fetcher), dir.path()).await;
        let (progress, callback) = recorder();

        let summary = service
            .subscribe_m3u("My list", "http://example.com/list.m3u", callback)
            .await
            .unwrap();

        assert_eq!(summary.outcome.inserted, 2);
        assert_eq!(summary.skipped, 1);
        assert_eq!(
            *progress.lock().unwrap(),
            vec![Progress::unknown_total(0), Progress::unknown_total(2)]
        );

        let stored = service.get_with_streams("http://example.com/list.m3u").await.unwrap();
        assert_eq!(stored.playlist.title, "My list");
        assert_eq!(stored.streams.len(), 2);
        assert_eq!(stored.streams[0].group, "News");
        assert_eq!(stored.streams[0].cover.as_deref(), Some("http://logo/1.png"));
    }

    #[tokio::test]
    async fn test_resubscribe_m3u_keeps_url_and_favourites() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = StaticFetcher::new().with("http://example.com/list.m3u", m3u_body());
        let service = service(Arc::new(fetcher), dir.path()).await;

        service.subscribe_m3u("First", "http://example.com/list.m3u", |_| {}).await.unwrap();
        let id = service.get_with_streams("http://example.com/list.m3u").await.unwrap().streams[0].id;
        streams::set_favourite(&service.pool, id, true).await.unwrap();

        let summary = service
            .subscribe_m3u("Second", "http://example.com/list.m3u", |_| {})
            .await
            .unwrap();

        assert_eq!(summary.outcome, ReconcileOutcome::default());
        let stored = service.get_with_streams("http://example.com/list.m3u").await.unwrap();
        assert_eq!(stored.playlist.title, "Second");
        assert!(stored.streams.iter().find(|s| s.id == id).unwrap().favourite);
    }

    #[tokio::test]
    async fn test_subscribe_m3u_unreachable_leaves_store_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(Arc::new(StaticFetcher::new()), dir.path()).await;

        let result = service.subscribe_m3u("Gone", "http://example.com/missing.m3u", |_| {}).await;

        assert!(matches!(result, Err(IngestError::SourceUnreachable(_))));
        assert!(service.list_with_counts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_subscribe_m3u_unsupported_scheme() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(Arc::new(StaticFetcher::new()), dir.path()).await;

        let result = service.subscribe_m3u("Ftp", "ftp://example.com/list.m3u", |_| {}).await;

        assert!(matches!(result, Err(IngestError::UnsupportedLocation(_))));
    }

    #[tokio::test]
    async fn test_subscribe_m3u_local_file_and_content_handle() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(Arc::new(StaticFetcher::new()), dir.path()).await;

        let local = dir.path().join("local.m3u");
        std::fs::write(&local, m3u_body()).unwrap();
        let summary = service
            .subscribe_m3u("Local", local.to_str().unwrap(), |_| {})
            .await
            .unwrap();
        assert!(summary.playlist_url.starts_with("file://"));
        assert!(service.get(&summary.playlist_url).await.unwrap().from_local());

        std::fs::create_dir_all(dir.path().join("content/media")).unwrap();
        std::fs::write(dir.path().join("content/media/tv.m3u"), m3u_body()).unwrap();
        let summary = service
            .subscribe_m3u("Handle", "content://media/tv.m3u", |_| {})
            .await
            .unwrap();
        assert!(summary.playlist_url.starts_with("file://"));
        assert!(summary.playlist_url.ends_with("/tv.m3u"));
        assert_eq!(summary.outcome.inserted, 2);

        assert!(matches!(
            service.refresh(&summary.playlist_url, |_| {}).await,
            Err(IngestError::RefreshNotSupported(_))
        ));
    }

    #[tokio::test]
    async fn test_subscribe_xtream_flushes_in_batches() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(Arc::new(xtream_fetcher(250)), dir.path()).await;
        let input = XtreamInput::new(BASIC, "u", "p", Some(XtreamKind::Live));

        let summary = service.subscribe_xtream("Account", input, |_| {}).await.unwrap();

        assert_eq!(summary.flushes, 3);
        assert_eq!(summary.written, 250);
        assert!(!summary.partial);
        assert_eq!(summary.playlists.len(), 1);

        let live_url = &summary.playlists[0];
        assert_eq!(streams::count_by_playlist(&service.pool, live_url).await.unwrap(), 250);

        let stored = service.get_with_streams(live_url).await.unwrap();
        assert_eq!(stored.playlist.xtream_kind(), Some(XtreamKind::Live));
        assert_eq!(stored.streams[0].group, "News");
        assert!(stored.streams[0].url.ends_with(".m3u8"));
    }

    #[tokio::test]
    async fn test_subscribe_xtream_all_kinds_and_refresh() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(Arc::new(xtream_fetcher(3)), dir.path()).await;
        let input = XtreamInput::new(BASIC, "u", "p", None);

        let summary = service.subscribe_xtream("Account", input, |_| {}).await.unwrap();

        assert_eq!(summary.playlists.len(), 3);
        assert_eq!(summary.written, 5);

        let vod_url = summary.playlists[1].clone();
        let refreshed = service.refresh(&vod_url, |_| {}).await.unwrap();
        match refreshed {
            RefreshSummary::Xtream(s) => {
                assert_eq!(s.playlists, vec![vod_url.clone()]);
                assert_eq!(s.written, 1);
            }
            other => panic!("unexpected refresh result {:?}", other),
        }
        assert_eq!(streams::count_by_playlist(&service.pool, &vod_url).await.unwrap(), 1);
        assert_eq!(service.list_with_counts().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_refresh_xtream_keeps_playlist_settings() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(Arc::new(xtream_fetcher(2)), dir.path()).await;
        let input = XtreamInput::new(BASIC, "u", "p", Some(XtreamKind::Live));

        let summary = service.subscribe_xtream("Account", input, |_| {}).await.unwrap();
        let live_url = summary.playlists[0].clone();
        service.toggle_pinned_category(&live_url, "News").await.unwrap();
        service.toggle_hidden_category(&live_url, "Adult").await.unwrap();
        service.update_user_agent(&live_url, Some("Kodi")).await.unwrap();

        service.refresh(&live_url, |_| {}).await.unwrap();

        let stored = service.get(&live_url).await.unwrap();
        assert_eq!(stored.title, "Account");
        assert_eq!(stored.pinned_categories, vec!["News".to_string()]);
        assert_eq!(stored.hidden_categories, vec!["Adult".to_string()]);
        assert_eq!(stored.user_agent.as_deref(), Some("Kodi"));
        assert_eq!(streams::count_by_playlist(&service.pool, &live_url).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_subscribe_xtream_listing_failure_keeps_flushed_rows() {
        let dir = tempfile::tempdir().unwrap();
        let fetcher = xtream_fetcher(150).without(&action("get_vod_streams"));
        let service = service(Arc::new(fetcher), dir.path()).await;
        let input = XtreamInput::new(BASIC, "u", "p", None);

        let summary = service.subscribe_xtream("Account", input, |_| {}).await.unwrap();

        assert!(summary.partial);
        assert_eq!(summary.written, 150);
        assert_eq!(summary.flushes, 2);

        let live_url = &summary.playlists[0];
        assert_eq!(streams::count_by_playlist(&service.pool, live_url).await.unwrap(), 150);
        let series_url = &summary.playlists[2];
        assert_eq!(streams::count_by_playlist(&service.pool, series_url).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_subscribe_content_handle_rekeys_stored_playlist() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(Arc::new(StaticFetcher::new()), dir.path()).await;
        let handle = "content://media/tv.m3u";
        {
            let mut conn = service.pool.acquire().await.unwrap();
            playlists::upsert(&mut conn, &Playlist::new("Handle", handle, DataSource::M3u))
                .await
                .unwrap();
            streams::insert_or_replace_all(&mut conn, &[Stream::new("One", "http://streams/1.ts", "News", handle)])
                .await
                .unwrap();
        }
        let id = service.get_with_streams(handle).await.unwrap().streams[0].id;
        streams::set_favourite(&service.pool, id, true).await.unwrap();

        std::fs::create_dir_all(dir.path().join("content/media")).unwrap();
        std::fs::write(dir.path().join("content/media/tv.m3u"), m3u_body()).unwrap();
        let summary = service.subscribe_m3u("Handle", handle, |_| {}).await.unwrap();

        assert!(summary.playlist_url.starts_with("file://"));
        assert_eq!(summary.outcome.inserted, 1);
        assert!(!playlists::exists(&service.pool, handle).await.unwrap());
        assert_eq!(streams::count_by_playlist(&service.pool, handle).await.unwrap(), 0);

        let stored = service.get_with_streams(&summary.playlist_url).await.unwrap();
        assert_eq!(stored.streams.len(), 2);
        assert!(stored.streams.iter().find(|s| s.id == id).unwrap().favourite);
    }

    #[tokio::test]
    async fn test_subscribe_xtream_handshake_failure_creates_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(Arc::new(StaticFetcher::new()), dir.path()).await;
        let input = XtreamInput::new(BASIC, "u", "p", None);

        let result = service.subscribe_xtream("Account", input, |_| {}).await;

        assert!(matches!(result, Err(IngestError::HandshakeFailure(_))));
        assert!(service.list_with_counts().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_read_episodes() {
        let dir = tempfile::tempdir().unwrap();
        let service = service(Arc::new(xtream_fetcher(1)), dir.path()).await;
        let input = XtreamInput::new(BASIC, "u", "p", Some(XtreamKind::Series));
        let summary = service.subscribe_xtream("Account", input, |_| {}).await.unwrap();

        let series = service.get_with_streams(&summary.playlists[0]).await.unwrap().streams;
        assert_eq!(series[0].url, "http://example.com:8080/series/u/p/77");

        let episodes = service.read_episodes(series[0].id).await.unwrap();
        assert_eq!(episodes.len(), 1);
        assert_eq!(episodes[0].title, "Pilot");
        assert_eq!(episodes[0].url, "http://example.com:8080/series/u/p/701.mp4");
        assert_eq!(episodes[0].group, "Season 1");
    }
}
