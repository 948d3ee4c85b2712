//! Playlist repository for database operations

use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};

use crate::db::models::{encode_categories, toggle_category, PlaylistCountRow, PlaylistRow};
use crate::models::playlist::{Playlist, PlaylistWithCount};

const PLAYLIST_COLUMNS: &str = r#"
    url, title, source, user_agent, pinned_categories, hidden_categories, created_at, updated_at
"#;

/// Create or update a playlist keyed by url
pub async fn upsert(
    conn: &mut SqliteConnection,
    playlist: &Playlist,
) -> Result<(), sqlx::Error> {
    let now = Utc::now().timestamp_millis();

    sqlx::query(
        r#"
        INSERT INTO playlists (url, title, source, user_agent, pinned_categories, hidden_categories, created_at, updated_at)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
        ON CONFLICT (url) DO UPDATE SET
            title = excluded.title,
            source = excluded.source,
            user_agent = excluded.user_agent,
            pinned_categories = excluded.pinned_categories,
            hidden_categories = excluded.hidden_categories,
            updated_at = excluded.updated_at
        "#,
    )
    .bind(&playlist.url)
    .bind(&playlist.title)
    .bind(playlist.source.as_str())
    .bind(&playlist.user_agent)
    .bind(encode_categories(&playlist.pinned_categories))
    .bind(encode_categories(&playlist.hidden_categories))
    .bind(now)
    .execute(conn)
    .await?;

    Ok(())
}

/// Find playlist by url
pub async fn find_by_url(
    pool: &SqlitePool,
    url: &str,
) -> Result<Option<Playlist>, sqlx::Error> {
    let row = sqlx::query_as::<_, PlaylistRow>(&format!(
        "SELECT {} FROM playlists WHERE url = ?1",
        PLAYLIST_COLUMNS
    ))
    .bind(url)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(Into::into))
}

/// Check if a playlist exists
pub async fn exists(pool: &SqlitePool, url: &str) -> Result<bool, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM playlists WHERE url = ?1")
        .bind(url)
        .fetch_optional(pool)
        .await?;

    Ok(row.is_some())
}

/// List all playlists, oldest first
pub async fn list_all(pool: &SqlitePool) -> Result<Vec<Playlist>, sqlx::Error> {
    let rows = sqlx::query_as::<_, PlaylistRow>(&format!(
        "SELECT {} FROM playlists ORDER BY created_at, url",
        PLAYLIST_COLUMNS
    ))
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

/// List all playlists with their stream counts
pub async fn list_with_counts(pool: &SqlitePool) -> Result<Vec<PlaylistWithCount>, sqlx::Error> {
    let rows = sqlx::query_as::<_, PlaylistCountRow>(
        r#"
        SELECT p.url, p.title, p.source, p.user_agent, p.pinned_categories, p.hidden_categories,
               p.created_at, p.updated_at, COUNT(s.id) AS count
        FROM playlists p
        LEFT JOIN streams s ON s.playlist_url = p.url
        GROUP BY p.url
        ORDER BY p.created_at, p.url
        "#,
    )
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

/// Delete a playlist row (streams are removed by the caller in the same transaction)
pub async fn delete_by_url(
    conn: &mut SqliteConnection,
    url: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM playlists WHERE url = ?1")
        .bind(url)
        .execute(conn)
        .await?;

    Ok(result.rows_affected())
}

/// Rename a playlist
pub async fn rename(pool: &SqlitePool, url: &str, title: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE playlists SET title = ?2, updated_at = ?3 WHERE url = ?1")
        .bind(url)
        .bind(title)
        .bind(Utc::now().timestamp_millis())
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Set or clear the user agent override
pub async fn update_user_agent(
    pool: &SqlitePool,
    url: &str,
    user_agent: Option<&str>,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE playlists SET user_agent = ?2, updated_at = ?3 WHERE url = ?1")
        .bind(url)
        .bind(user_agent.filter(|ua| !ua.trim().is_empty()))
        .bind(Utc::now().timestamp_millis())
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Re-key a playlist and its streams to a new url
pub async fn update_url(pool: &SqlitePool, from: &str, to: &str) -> Result<(), sqlx::Error> {
    let mut tx = pool.begin().await?;

    sqlx::query("UPDATE playlists SET url = ?2, updated_at = ?3 WHERE url = ?1")
        .bind(from)
        .bind(to)
        .bind(Utc::now().timestamp_millis())
        .execute(&mut *tx)
        .await?;

    sqlx::query("UPDATE OR REPLACE streams SET playlist_url = ?2 WHERE playlist_url = ?1")
        .bind(from)
        .bind(to)
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    Ok(())
}

/// Which category set to edit
#[derive(Debug, Clone, Copy)]
pub enum CategorySet {
    Pinned,
    Hidden,
}

impl CategorySet {
    fn column(&self) -> &'static str {
        match self {
            CategorySet::Pinned => "pinned_categories",
            CategorySet::Hidden => "hidden_categories",
        }
    }
}

/// Toggle one category in the pinned or hidden set.
/// Returns the updated set, or None when the playlist does not exist.
pub async fn toggle_category_in(
    pool: &SqlitePool,
    url: &str,
    set: CategorySet,
    category: &str,
) -> Result<Option<Vec<String>>, sqlx::Error> {
    let mut tx = pool.begin().await?;

    let row: Option<(String,)> = sqlx::query_as(&format!(
        "SELECT {} FROM playlists WHERE url = ?1",
        set.column()
    ))
    .bind(url)
    .fetch_optional(&mut *tx)
    .await?;

    let Some((raw,)) = row else {
        return Ok(None);
    };

    let mut categories: Vec<String> = serde_json::from_str(&raw).unwrap_or_default();
    toggle_category(&mut categories, category);

    sqlx::query(&format!(
        "UPDATE playlists SET {} = ?2, updated_at = ?3 WHERE url = ?1",
        set.column()
    ))
    .bind(url)
    .bind(encode_categories(&categories))
    .bind(Utc::now().timestamp_millis())
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(Some(categories))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::pool::test_pool;
    use crate::models::playlist::DataSource;

    #[tokio::test]
    async fn test_upsert_keeps_url_and_updates_title() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();

        let playlist = Playlist::new("First", "http://example.com/a.m3u", DataSource::M3u);
        upsert(&mut conn, &playlist).await.unwrap();

        let renamed = Playlist { title: "Second".to_string(), ..playlist.clone() };
        upsert(&mut conn, &renamed).await.unwrap();
        drop(conn);

        let all = list_all(&pool).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].title, "Second");
        assert_eq!(all[0].url, playlist.url);
    }

    #[tokio::test]
    async fn test_toggle_pinned_category() {
        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        upsert(&mut conn, &Playlist::new("P", "http://example.com/p.m3u", DataSource::M3u))
            .await
            .unwrap();
        drop(conn);

        let pinned = toggle_category_in(&pool, "http://example.com/p.m3u", CategorySet::Pinned, "News")
            .await
            .unwrap();
        assert_eq!(pinned, Some(vec!["News".to_string()]));

        let pinned = toggle_category_in(&pool, "http://example.com/p.m3u", CategorySet::Pinned, "News")
            .await
            .unwrap();
        assert_eq!(pinned, Some(vec![]));

        let missing = toggle_category_in(&pool, "http://missing", CategorySet::Hidden, "News")
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_update_url_moves_playlist_and_streams() {
        use crate::db::repository::streams;
        use crate::models::playlist::Stream;

        let pool = test_pool().await;
        let mut conn = pool.acquire().await.unwrap();
        upsert(&mut conn, &Playlist::new("Handle", "content://media/tv.m3u", DataSource::M3u))
            .await
            .unwrap();
        streams::insert_or_replace_all(
            &mut conn,
            &[
                Stream::new("A", "http://a", "", "content://media/tv.m3u"),
                Stream::new("B", "http://b", "", "content://media/tv.m3u"),
            ],
        )
        .await
        .unwrap();
        drop(conn);

        update_url(&pool, "content://media/tv.m3u", "file:///data/tv.m3u").await.unwrap();

        assert!(!exists(&pool, "content://media/tv.m3u").await.unwrap());
        assert_eq!(find_by_url(&pool, "file:///data/tv.m3u").await.unwrap().unwrap().title, "Handle");
        assert_eq!(streams::count_by_playlist(&pool, "file:///data/tv.m3u").await.unwrap(), 2);
        assert_eq!(streams::count_by_playlist(&pool, "content://media/tv.m3u").await.unwrap(), 0);
    }
}
