//! Xtream Codes API Types
//!
//! Type definitions for Xtream Codes Player API v2 responses.
//! Panels disagree on whether ids and ports are strings or numbers, so those
//! fields accept both.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

// ============================================================================
// Lenient field decoding
// ============================================================================

fn value_to_string(value: Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// String or number, required
fn de_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    value_to_string(Value::deserialize(d)?)
        .ok_or_else(|| serde::de::Error::custom("expected string or number"))
}

/// String or number, null/absent/blank is None
fn de_opt_string<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Ok(Option::<Value>::deserialize(d)?
        .and_then(value_to_string)
        .filter(|s| !s.trim().is_empty()))
}

/// Number or numeric string
fn de_i64<'de, D: Deserializer<'de>>(d: D) -> Result<i64, D::Error> {
    match Value::deserialize(d)? {
        Value::Number(n) => n
            .as_i64()
            .ok_or_else(|| serde::de::Error::custom("expected integer")),
        Value::String(s) => s
            .trim()
            .parse()
            .map_err(|_| serde::de::Error::custom(format!("expected integer, got {:?}", s))),
        other => Err(serde::de::Error::custom(format!("expected integer, got {}", other))),
    }
}

/// Array of strings, null/absent is empty
fn de_string_list<'de, D: Deserializer<'de>>(d: D) -> Result<Vec<String>, D::Error> {
    Ok(Option::<Vec<Value>>::deserialize(d)?
        .unwrap_or_default()
        .into_iter()
        .filter_map(value_to_string)
        .collect())
}

// ============================================================================
// Authentication Response Types
// ============================================================================

/// Main authentication response from player_api.php (no action)
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct XtreamAuthResponse {
    pub user_info: XtreamUserInfo,
    #[serde(default)]
    pub server_info: XtreamServerInfo,
}

/// User account information
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct XtreamUserInfo {
    #[serde(default, deserialize_with = "de_opt_string")]
    pub username: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub status: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub auth: Option<String>,
    #[serde(default, deserialize_with = "de_string_list")]
    pub allowed_output_formats: Vec<String>,
}

impl XtreamUserInfo {
    /// Panels answer bad credentials with `auth: 0` instead of an HTTP error
    pub fn is_authenticated(&self) -> bool {
        self.auth.as_deref() != Some("0")
    }
}

/// Server information
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct XtreamServerInfo {
    #[serde(default, deserialize_with = "de_opt_string")]
    pub url: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub port: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub https_port: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub server_protocol: Option<String>,
}

// ============================================================================
// Category Types
// ============================================================================

/// Category for live, VOD, or series
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct XtreamCategory {
    #[serde(deserialize_with = "de_string")]
    pub category_id: String,
    pub category_name: String,
}

// ============================================================================
// Listing Types
// ============================================================================

/// Live stream (channel) information
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct XtreamLiveStream {
    pub name: String,
    #[serde(deserialize_with = "de_i64")]
    pub stream_id: i64,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub stream_icon: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub epg_channel_id: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub category_id: Option<String>,
}

/// VOD (movie) stream information
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct XtreamVodStream {
    pub name: String,
    #[serde(deserialize_with = "de_i64")]
    pub stream_id: i64,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub stream_icon: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub category_id: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub container_extension: Option<String>,
}

/// Series information from get_series
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct XtreamSeries {
    #[serde(deserialize_with = "de_i64")]
    pub series_id: i64,
    pub name: String,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub cover: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub category_id: Option<String>,
}

// ============================================================================
// Series detail types
// ============================================================================

/// Detailed series information (from get_series_info)
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct XtreamSeriesInfo {
    #[serde(default)]
    pub info: Option<XtreamSeriesDetails>,
    /// Episodes grouped by season number (key is season number as string)
    #[serde(default)]
    pub episodes: HashMap<String, Vec<XtreamEpisode>>,
}

impl XtreamSeriesInfo {
    /// All episodes ordered by season, then episode number
    pub fn into_episodes(self) -> Vec<XtreamEpisode> {
        let mut seasons: Vec<(String, Vec<XtreamEpisode>)> = self.episodes.into_iter().collect();
        seasons.sort_by_key(|(season, _)| season.parse::<i64>().unwrap_or(i64::MAX));

        seasons
            .into_iter()
            .flat_map(|(season, mut episodes)| {
                for episode in episodes.iter_mut().filter(|e| e.season.is_none()) {
                    episode.season = Some(season.clone());
                }
                episodes.sort_by_key(|e| e.episode_num);
                episodes
            })
            .collect()
    }
}

/// Series metadata details
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct XtreamSeriesDetails {
    #[serde(default, deserialize_with = "de_opt_string")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub cover: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub plot: Option<String>,
}

/// Episode information
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct XtreamEpisode {
    #[serde(deserialize_with = "de_string")]
    pub id: String,
    #[serde(default, deserialize_with = "de_i64")]
    pub episode_num: i64,
    pub title: String,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub container_extension: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub season: Option<String>,
    #[serde(default)]
    pub info: Option<XtreamEpisodeInfo>,
}

/// Episode metadata
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct XtreamEpisodeInfo {
    #[serde(default, deserialize_with = "de_opt_string")]
    pub movie_image: Option<String>,
    #[serde(default, deserialize_with = "de_opt_string")]
    pub plot: Option<String>,
}
