use serde::{Deserialize, Serialize};

/// Where a playlist's content comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataSource {
    M3u,
    Xtream,
    Epg,
    Other,
}

impl Default for DataSource {
    fn default() -> Self {
        Self::M3u
    }
}

impl DataSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            DataSource::M3u => "m3u",
            DataSource::Xtream => "xtream",
            DataSource::Epg => "epg",
            DataSource::Other => "other",
        }
    }

    /// Parse the stored column value; unknown values map to `Other`
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "m3u" => DataSource::M3u,
            "xtream" => DataSource::Xtream,
            "epg" => DataSource::Epg,
            _ => DataSource::Other,
        }
    }
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Xtream content kind. Each kind of one account is its own playlist row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum XtreamKind {
    Live,
    Vod,
    Series,
}

impl XtreamKind {
    pub const ALL: [XtreamKind; 3] = [XtreamKind::Live, XtreamKind::Vod, XtreamKind::Series];

    pub fn as_str(&self) -> &'static str {
        match self {
            XtreamKind::Live => "live",
            XtreamKind::Vod => "vod",
            XtreamKind::Series => "series",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "live" => Some(XtreamKind::Live),
            "vod" => Some(XtreamKind::Vod),
            "series" => Some(XtreamKind::Series),
            _ => None,
        }
    }

    /// Whether this kind is required by an optional kind filter
    pub fn is_required_by(&self, filter: Option<XtreamKind>) -> bool {
        filter.map(|k| k == *self).unwrap_or(true)
    }
}

impl std::fmt::Display for XtreamKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One subscription source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Playlist {
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub source: DataSource,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default)]
    pub pinned_categories: Vec<String>,
    #[serde(default)]
    pub hidden_categories: Vec<String>,
}

impl Playlist {
    pub fn new(title: impl Into<String>, url: impl Into<String>, source: DataSource) -> Self {
        Self {
            title: title.into(),
            url: url.into(),
            source,
            user_agent: None,
            pinned_categories: Vec::new(),
            hidden_categories: Vec::new(),
        }
    }

    /// M3U playlists imported from a file are not refreshable and not exported
    pub fn from_local(&self) -> bool {
        self.source == DataSource::M3u && self.url.to_lowercase().starts_with("file://")
    }

    /// Content kind encoded in an Xtream playlist url
    pub fn xtream_kind(&self) -> Option<XtreamKind> {
        if self.source != DataSource::Xtream {
            return None;
        }
        url::Url::parse(&self.url).ok().and_then(|u| {
            u.query_pairs()
                .find(|(k, _)| k == "type")
                .and_then(|(_, v)| XtreamKind::parse(&v))
        })
    }
}

/// One playable channel, movie, series or episode
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stream {
    /// Store-assigned id, 0 before the first insert
    #[serde(default)]
    pub id: i64,
    pub title: String,
    pub url: String,
    #[serde(default)]
    pub group: String,
    pub playlist_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    #[serde(default)]
    pub favourite: bool,
    #[serde(default)]
    pub banned: bool,
    /// Last played, epoch millis (0 = never)
    #[serde(default)]
    pub seen: i64,
}

impl Stream {
    pub fn new(
        title: impl Into<String>,
        url: impl Into<String>,
        group: impl Into<String>,
        playlist_url: impl Into<String>,
    ) -> Self {
        Self {
            id: 0,
            title: title.into(),
            url: url.into(),
            group: group.into(),
            playlist_url: playlist_url.into(),
            cover: None,
            favourite: false,
            banned: false,
            seen: 0,
        }
    }

    pub fn with_cover(mut self, cover: Option<String>) -> Self {
        self.cover = cover.filter(|c| !c.trim().is_empty());
        self
    }

    /// Numeric id in the last path segment (Xtream series streams)
    pub fn trailing_id(&self) -> Option<i64> {
        let parsed = url::Url::parse(&self.url).ok()?;
        let last = parsed.path_segments()?.filter(|s| !s.is_empty()).last()?;
        let stem = last.split('.').next().unwrap_or(last);
        stem.parse().ok()
    }
}

/// Playlist with its stream count
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistWithCount {
    #[serde(flatten)]
    pub playlist: Playlist,
    pub count: i64,
}

/// Playlist with all of its streams
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaylistWithStreams {
    pub playlist: Playlist,
    pub streams: Vec<Stream>,
}

/// Progress of one ingestion run. `total` is None while unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Progress {
    pub count: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,
}

impl Progress {
    pub fn unknown_total(count: usize) -> Self {
        Self { count, total: None }
    }
}

// ============================================================================
// Request / Response types
// ============================================================================

/// Request to subscribe an M3U playlist
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeM3uRequest {
    pub title: String,
    pub url: String,
}

/// Request to subscribe an Xtream account
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribeXtreamRequest {
    pub title: String,
    pub basic_url: String,
    pub username: String,
    pub password: String,
    #[serde(default, rename = "type")]
    pub kind: Option<XtreamKind>,
}

/// Request carrying a playlist url
#[derive(Debug, Deserialize)]
pub struct PlaylistUrlQuery {
    pub url: String,
}

/// Request to edit playlist metadata
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditPlaylistRequest {
    pub url: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub user_agent: Option<String>,
}

/// Request to pin/hide one category of a playlist
#[derive(Debug, Deserialize)]
pub struct CategoryRequest {
    pub url: String,
    pub category: String,
}

/// Request to update user-owned stream fields
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditStreamRequest {
    #[serde(default)]
    pub favourite: Option<bool>,
    #[serde(default)]
    pub banned: Option<bool>,
    #[serde(default)]
    pub seen: Option<i64>,
}

/// Response for a spawned ingestion job
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    pub job_id: String,
    pub status: String,
}
