//! Stream repository with batched writes

use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

use crate::db::models::StreamRow;
use crate::models::playlist::Stream;

const STREAM_COLUMNS: &str = r#"
    id, playlist_url, url, title, group_name, cover, favourite, banned, seen
"#;

/// Rows per INSERT statement; keeps bound parameters well below SQLite's limit
const INSERT_CHUNK: usize = 500;

/// Insert or replace a batch of streams.
///
/// Streams with `id == 0` get a fresh id; streams carrying an id replace the
/// row with that id. A conflicting `(playlist_url, url)` row is replaced.
pub async fn insert_or_replace_all(
    conn: &mut SqliteConnection,
    streams: &[Stream],
) -> Result<u64, sqlx::Error> {
    let mut written = 0;

    for chunk in streams.chunks(INSERT_CHUNK) {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new(
            "INSERT OR REPLACE INTO streams (id, playlist_url, url, title, group_name, cover, favourite, banned, seen) ",
        );

        builder.push_values(chunk, |mut row, stream| {
            row.push_bind(if stream.id > 0 { Some(stream.id) } else { None })
                .push_bind(&stream.playlist_url)
                .push_bind(&stream.url)
                .push_bind(&stream.title)
                .push_bind(&stream.group)
                .push_bind(&stream.cover)
                .push_bind(stream.favourite)
                .push_bind(stream.banned)
                .push_bind(stream.seen);
        });

        let result = builder.build().execute(&mut *conn).await?;
        written += result.rows_affected();
    }

    Ok(written)
}

/// Update the fetched and user fields of existing rows by id
pub async fn update_all(
    conn: &mut SqliteConnection,
    streams: &[Stream],
) -> Result<u64, sqlx::Error> {
    let mut updated = 0;

    for stream in streams {
        let result = sqlx::query(
            r#"
            UPDATE streams SET
                title = ?2,
                group_name = ?3,
                cover = ?4,
                favourite = ?5,
                banned = ?6,
                seen = ?7
            WHERE id = ?1
            "#,
        )
        .bind(stream.id)
        .bind(&stream.title)
        .bind(&stream.group)
        .bind(&stream.cover)
        .bind(stream.favourite)
        .bind(stream.banned)
        .bind(stream.seen)
        .execute(&mut *conn)
        .await?;

        updated += result.rows_affected();
    }

    Ok(updated)
}

/// Delete streams by id
pub async fn delete_by_ids(
    conn: &mut SqliteConnection,
    ids: &[i64],
) -> Result<u64, sqlx::Error> {
    let mut deleted = 0;

    for chunk in ids.chunks(INSERT_CHUNK) {
        let mut builder: QueryBuilder<Sqlite> = QueryBuilder::new("DELETE FROM streams WHERE id IN (");
        let mut separated = builder.separated(", ");
        for id in chunk {
            separated.push_bind(*id);
        }
        separated.push_unseparated(")");

        let result = builder.build().execute(&mut *conn).await?;
        deleted += result.rows_affected();
    }

    Ok(deleted)
}

/// Delete all streams for a playlist
pub async fn delete_by_playlist(
    conn: &mut SqliteConnection,
    playlist_url: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("DELETE FROM streams WHERE playlist_url = ?1")
        .bind(playlist_url)
        .execute(conn)
        .await?;

    Ok(result.rows_affected())
}

/// All streams of a playlist in insertion order
pub async fn find_by_playlist(
    conn: &mut SqliteConnection,
    playlist_url: &str,
) -> Result<Vec<Stream>, sqlx::Error> {
    let rows = sqlx::query_as::<_, StreamRow>(&format!(
        "SELECT {} FROM streams WHERE playlist_url = ?1 ORDER BY id",
        STREAM_COLUMNS
    ))
    .bind(playlist_url)
    .fetch_all(conn)
    .await?;

    Ok(rows.into_iter().map(Into::into).collect())
}

/// Get a single stream by id
pub async fn find_by_id(pool: &SqlitePool, id: i64) -> Result<Option<Stream>, sqlx::Error> {
    let row = sqlx::query_as::<_, StreamRow>(&format!(
        "SELECT {} FROM streams WHERE id = ?1",
        STREAM_COLUMNS
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(Into::into))
}

/// Count all streams for a playlist
#[cfg(test)]
pub async fn count_by_playlist(pool: &SqlitePool, playlist_url: &str) -> Result<i64, sqlx::Error> {
    let count: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM streams WHERE playlist_url = ?1")
        .bind(playlist_url)
        .fetch_one(pool)
        .await?;

    Ok(count.0)
}

/// Set the favourite flag
pub async fn set_favourite(pool: &SqlitePool, id: i64, favourite: bool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE streams SET favourite = ?2 WHERE id = ?1")
        .bind(id)
        .bind(favourite)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Set the banned flag
pub async fn set_banned(pool: &SqlitePool, id: i64, banned: bool) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE streams SET banned = ?2 WHERE id = ?1")
        .bind(id)
        .bind(banned)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}

/// Record the last-played timestamp
pub async fn mark_seen(pool: &SqlitePool, id: i64, seen: i64) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE streams SET seen = ?2 WHERE id = ?1")
        .bind(id)
        .bind(seen)
        .execute(pool)
        .await?;

    Ok(result.rows_affected())
}
