//! Playlist locations and access to platform content handles

use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use url::Url;

use crate::services::error::IngestError;

/// Where an M3U subscription is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceLocation {
    Network(String),
    LocalFile(PathBuf),
    ContentHandle(String),
}

impl SourceLocation {
    pub fn classify(url: &str) -> Result<Self, IngestError> {
        let trimmed = url.trim();
        let lower = trimmed.to_lowercase();

        if lower.starts_with("http://") || lower.starts_with("https://") {
            return Ok(SourceLocation::Network(trimmed.to_string()));
        }

        if lower.starts_with("file://") {
            let path = Url::parse(trimmed)
                .ok()
                .and_then(|u| u.to_file_path().ok())
                .ok_or_else(|| IngestError::UnsupportedLocation(url.to_string()))?;
            return Ok(SourceLocation::LocalFile(path));
        }

        if lower.starts_with("content://") {
            return Ok(SourceLocation::ContentHandle(trimmed.to_string()));
        }

        if Path::new(trimmed).is_absolute() {
            return Ok(SourceLocation::LocalFile(PathBuf::from(trimmed)));
        }

        Err(IngestError::UnsupportedLocation(url.to_string()))
    }
}

/// `file://` url of a local path
pub fn file_url(path: &Path) -> Result<String, IngestError> {
    Url::from_file_path(path)
        .map(|u| u.to_string())
        .map_err(|_| IngestError::UnsupportedLocation(path.display().to_string()))
}

/// Resolves content handles (`content://...`) to bytes
#[async_trait]
pub trait ContentAccess: Send + Sync {
    async fn read(&self, uri: &str) -> std::io::Result<Vec<u8>>;

    /// File name to keep when the content is copied locally
    fn display_name(&self, uri: &str) -> String {
        uri.rsplit('/')
            .find(|s| !s.is_empty())
            .map(sanitize_file_name)
            .unwrap_or_else(|| "playlist.m3u".to_string())
    }
}

/// Serves `content://authority/path` from `<root>/authority/path`
pub struct DirectoryContent {
    root: PathBuf,
}

impl DirectoryContent {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, uri: &str) -> std::io::Result<PathBuf> {
        let not_found = || std::io::Error::new(std::io::ErrorKind::NotFound, uri.to_string());

        let relative = uri.strip_prefix("content://").ok_or_else(not_found)?;
        let relative = urlencoding::decode(relative).map_err(|_| not_found())?;
        let relative = Path::new(relative.as_ref());

        if relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_)))
        {
            return Err(not_found());
        }

        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ContentAccess for DirectoryContent {
    async fn read(&self, uri: &str) -> std::io::Result<Vec<u8>> {
        tokio::fs::read(self.resolve(uri)?).await
    }
}

fn sanitize_file_name(name: &str) -> String {
    let decoded = urlencoding::decode(name)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| name.to_string());
    let cleaned: String = decoded
        .chars()
        .map(|c| if c.is_alphanumeric() || matches!(c, '.' | '-' | '_') { c } else { '_' })
        .collect();
    let cleaned = cleaned.trim_matches('.').to_string();
    if cleaned.is_empty() {
        "playlist.m3u".to_string()
    } else {
        cleaned
    }
}
