use thiserror::Error;

use crate::services::fetch::FetchError;
use crate::services::xtream::XtreamError;

/// Failures that end an ingestion run or a playlist operation.
///
/// Malformed M3U entries, undecodable Xtream items and backup lines are not
/// errors; they are skipped and counted.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Source unreachable: {0}")]
    SourceUnreachable(String),

    #[error("Unsupported playlist location: {0}")]
    UnsupportedLocation(String),

    #[error("Xtream handshake failed: {0}")]
    HandshakeFailure(#[from] XtreamError),

    #[error("Playlist not found: {0}")]
    PlaylistNotFound(String),

    #[error("Refresh not supported for {0}")]
    RefreshNotSupported(String),

    #[error("Stream not found: {0}")]
    StreamNotFound(i64),

    #[error("Stream {0} is not an Xtream series")]
    NotASeries(i64),

    #[error("Database error: {0}")]
    Store(#[from] sqlx::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<FetchError> for IngestError {
    fn from(err: FetchError) -> Self {
        IngestError::SourceUnreachable(err.to_string())
    }
}
