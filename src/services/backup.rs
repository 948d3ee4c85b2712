//! Line-oriented backup of playlists and their streams
//!
//! Each playlist is written as `playlist:<json>` followed by one
//! `stream:<json>` line per stream. Restore reads the same lines back;
//! lines that do not decode are skipped and counted.

use serde::Serialize;
use sqlx::SqlitePool;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

use crate::db::repository::{playlists, streams};
use crate::models::playlist::{Playlist, Stream};
use crate::services::batch::BatchBuffer;
use crate::services::error::IngestError;
use crate::services::metrics;

const PLAYLIST_PREFIX: &str = "playlist:";
const STREAM_PREFIX: &str = "stream:";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BackupSummary {
    pub playlists: usize,
    pub streams: usize,
    /// Local playlists left out of the backup
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RestoreSummary {
    pub playlists: usize,
    pub streams: u64,
    /// Lines that failed to decode
    pub skipped: usize,
}

enum BackupLine {
    Playlist(Playlist),
    Stream(Stream),
}

fn decode_line(line: &str) -> Result<BackupLine, String> {
    if let Some(json) = line.strip_prefix(PLAYLIST_PREFIX) {
        serde_json::from_str(json)
            .map(BackupLine::Playlist)
            .map_err(|e| e.to_string())
    } else if let Some(json) = line.strip_prefix(STREAM_PREFIX) {
        serde_json::from_str(json)
            .map(BackupLine::Stream)
            .map_err(|e| e.to_string())
    } else {
        Err("unknown record prefix".to_string())
    }
}

/// Write every non-local playlist and its streams to `writer`
pub async fn export<W>(pool: &SqlitePool, writer: &mut W) -> Result<BackupSummary, IngestError>
where
    W: AsyncWrite + Unpin,
{
    let mut summary = BackupSummary::default();
    let all = playlists::list_all(pool).await?;
    let mut conn = pool.acquire().await?;

    for playlist in all {
        if playlist.from_local() {
            summary.skipped += 1;
            continue;
        }

        let mut out = format!("{}{}\n", PLAYLIST_PREFIX, to_json(&playlist)?);
        let rows = streams::find_by_playlist(&mut conn, &playlist.url).await?;
        for stream in &rows {
            out.push_str(STREAM_PREFIX);
            out.push_str(&to_json(stream)?);
            out.push('\n');
        }
        writer.write_all(out.as_bytes()).await?;

        summary.playlists += 1;
        summary.streams += rows.len();
    }

    writer.flush().await?;

    info!(
        playlists = summary.playlists,
        streams = summary.streams,
        local = summary.skipped,
        "Backup exported"
    );

    Ok(summary)
}

fn to_json<T: Serialize>(value: &T) -> Result<String, IngestError> {
    serde_json::to_string(value).map_err(|e| IngestError::Io(e.into()))
}

/// Read a backup from `reader`.
///
/// Playlists are upserted as they are read; streams are written through a
/// [`BatchBuffer`] of `batch_size` and get fresh ids.
pub async fn import<R>(
    pool: &SqlitePool,
    mut reader: R,
    batch_size: usize,
) -> Result<RestoreSummary, IngestError>
where
    R: AsyncBufRead + Unpin,
{
    let mut summary = RestoreSummary::default();
    let buffer = BatchBuffer::new(pool.clone(), batch_size);
    let mut raw = Vec::new();
    let mut line_no = 0usize;

    loop {
        raw.clear();
        if reader.read_until(b'\n', &mut raw).await? == 0 {
            break;
        }
        line_no += 1;

        // Undecodable bytes only cost the line they are on
        let line = match std::str::from_utf8(&raw) {
            Ok(line) => line.trim(),
            Err(e) => {
                warn!(line = line_no, "Skipping backup line with invalid UTF-8: {}", e);
                summary.skipped += 1;
                continue;
            }
        };
        if line.is_empty() {
            continue;
        }

        match decode_line(line) {
            Ok(BackupLine::Playlist(playlist)) => {
                let mut conn = pool.acquire().await?;
                playlists::upsert(&mut conn, &playlist).await?;
                summary.playlists += 1;
            }
            Ok(BackupLine::Stream(stream)) => {
                buffer.push(Stream { id: 0, ..stream }).await?;
            }
            Err(e) => {
                warn!(line = line_no, "Skipping undecodable backup line: {}", e);
                summary.skipped += 1;
            }
        }
    }

    let stats = buffer.finish().await?;
    summary.streams = stats.written;
    metrics::record_skipped("backup", summary.skipped);

    info!(
        playlists = summary.playlists,
        streams = summary.streams,
        skipped = summary.skipped,
        flushes = stats.flushes,
        "Backup restored"
    );

    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::pool::test_pool;
    use crate::models::playlist::DataSource;

    async fn seed(pool: &SqlitePool) {
        let mut conn = pool.acquire().await.unwrap();
        let mut remote = Playlist::new("Remote", "http://example.com/a.m3u", DataSource::M3u);
        remote.pinned_categories = vec!["News".to_string()];
        playlists::upsert(&mut conn, &remote).await.unwrap();
        playlists::upsert(
            &mut conn,
            &Playlist::new("Local", "file:///tmp/local.m3u", DataSource::M3u),
        )
        .await
        .unwrap();

        let mut fav = Stream::new("One", "http://s/1", "News", "http://example.com/a.m3u");
        fav.favourite = true;
        streams::insert_or_replace_all(
            &mut conn,
            &[
                fav,
                Stream::new("Two", "http://s/2", "Sports", "http://example.com/a.m3u"),
                Stream::new("Mine", "http://s/3", "", "file:///tmp/local.m3u"),
            ],
        )
        .await
        .unwrap();
    }

    fn key_fields(rows: &[Stream]) -> Vec<(String, String, String, bool)> {
        rows.iter()
            .map(|s| (s.title.clone(), s.url.clone(), s.group.clone(), s.favourite))
            .collect()
    }

    #[tokio::test]
    async fn test_round_trip_excludes_local_playlists() {
        let source = test_pool().await;
        seed(&source).await;

        let mut out = Vec::new();
        let backup = export(&source, &mut out).await.unwrap();
        assert_eq!(backup, BackupSummary { playlists: 1, streams: 2, skipped: 1 });

        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("playlist:"));
        assert!(!text.contains("local.m3u"));

        let target = test_pool().await;
        let restored = import(&target, text.as_bytes(), 400).await.unwrap();
        assert_eq!(restored, RestoreSummary { playlists: 1, streams: 2, skipped: 0 });

        let playlist = playlists::find_by_url(&target, "http://example.com/a.m3u")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(playlist.pinned_categories, vec!["News"]);
        assert!(!playlists::exists(&target, "file:///tmp/local.m3u").await.unwrap());

        let mut source_conn = source.acquire().await.unwrap();
        let mut target_conn = target.acquire().await.unwrap();
        assert_eq!(
            key_fields(&streams::find_by_playlist(&mut target_conn, &playlist.url).await.unwrap()),
            key_fields(&streams::find_by_playlist(&mut source_conn, &playlist.url).await.unwrap())
        );
    }

    #[tokio::test]
    async fn test_import_skips_bad_lines_and_batches() {
        let pool = test_pool().await;
        let mut text = String::from("playlist:{\"title\":\"P\",\"url\":\"http://p\"}\n\n");
        for i in 0..5 {
            text.push_str(&format!(
                "stream:{{\"title\":\"S{i}\",\"url\":\"http://s/{i}\",\"group\":\"\",\"playlistUrl\":\"http://p\"}}\n"
            ));
        }
        text.push_str("stream:{not json}\nsomething else\n");

        let restored = import(&pool, text.as_bytes(), 2).await.unwrap();

        assert_eq!(restored.playlists, 1);
        assert_eq!(restored.streams, 5);
        assert_eq!(restored.skipped, 2);
        assert_eq!(streams::count_by_playlist(&pool, "http://p").await.unwrap(), 5);
    }

    #[tokio::test]
    async fn test_import_skips_invalid_utf8_line() {
        let pool = test_pool().await;
        let mut bytes = b"playlist:{\"title\":\"P\",\"url\":\"http://p\"}\n".to_vec();
        bytes.extend_from_slice(b"stream:{\"title\":\"A\",\"url\":\"http://s/a\",\"group\":\"\",\"playlistUrl\":\"http://p\"}\n");
        bytes.extend_from_slice(b"stream:{\"title\":\"Caf\xe9\",\"url\":\"http://s/c\",\"group\":\"\",\"playlistUrl\":\"http://p\"}\n");
        bytes.extend_from_slice(b"stream:{\"title\":\"B\",\"url\":\"http://s/b\",\"group\":\"\",\"playlistUrl\":\"http://p\"}\r\n");

        let restored = import(&pool, &bytes[..], 400).await.unwrap();

        assert_eq!(restored, RestoreSummary { playlists: 1, streams: 2, skipped: 1 });
        assert_eq!(streams::count_by_playlist(&pool, "http://p").await.unwrap(), 2);
    }
}
