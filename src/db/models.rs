//! Database row types for SQLite
//!
//! These types map directly to database rows and convert into the
//! domain types in models/playlist.rs

use sqlx::FromRow;

use crate::models::playlist::{DataSource, Playlist, PlaylistWithCount, Stream};

/// Playlist row from database
#[derive(Debug, Clone, FromRow)]
pub struct PlaylistRow {
    pub url: String,
    pub title: String,
    pub source: String,
    pub user_agent: Option<String>,
    pub pinned_categories: String,
    pub hidden_categories: String,
    pub created_at: i64,
    pub updated_at: i64,
}

impl From<PlaylistRow> for Playlist {
    fn from(row: PlaylistRow) -> Self {
        Playlist {
            title: row.title,
            url: row.url,
            source: DataSource::parse(&row.source),
            user_agent: row.user_agent,
            pinned_categories: decode_categories(&row.pinned_categories),
            hidden_categories: decode_categories(&row.hidden_categories),
        }
    }
}

/// Playlist row joined with its stream count
#[derive(Debug, Clone, FromRow)]
pub struct PlaylistCountRow {
    #[sqlx(flatten)]
    pub playlist: PlaylistRow,
    pub count: i64,
}

impl From<PlaylistCountRow> for PlaylistWithCount {
    fn from(row: PlaylistCountRow) -> Self {
        PlaylistWithCount {
            playlist: row.playlist.into(),
            count: row.count,
        }
    }
}

/// Stream row from database
#[derive(Debug, Clone, FromRow)]
pub struct StreamRow {
    pub id: i64,
    pub playlist_url: String,
    pub url: String,
    pub title: String,
    pub group_name: String,
    pub cover: Option<String>,
    pub favourite: bool,
    pub banned: bool,
    pub seen: i64,
}

impl From<StreamRow> for Stream {
    fn from(row: StreamRow) -> Self {
        Stream {
            id: row.id,
            title: row.title,
            url: row.url,
            group: row.group_name,
            playlist_url: row.playlist_url,
            cover: row.cover,
            favourite: row.favourite,
            banned: row.banned,
            seen: row.seen,
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Category sets are stored as JSON arrays
pub fn encode_categories(categories: &[String]) -> String {
    serde_json::to_string(categories).unwrap_or_else(|_| "[]".to_string())
}

fn decode_categories(raw: &str) -> Vec<String> {
    serde_json::from_str(raw).unwrap_or_else(|e| {
        tracing::warn!("Discarding malformed category set {:?}: {}", raw, e);
        Vec::new()
    })
}

/// Add the category if absent, remove it if present
pub fn toggle_category(categories: &mut Vec<String>, category: &str) {
    if let Some(pos) = categories.iter().position(|c| c == category) {
        categories.remove(pos);
    } else {
        categories.push(category.to_string());
    }
}
