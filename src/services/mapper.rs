//! Projection of parser records into [`Stream`]s
//!
//! Pure, total functions: no network or store access.

use std::collections::HashMap;

use crate::models::playlist::Stream;
use crate::services::m3u_parser::M3uEntry;
use crate::services::xtream::{
    XtreamCategory, XtreamEpisode, XtreamLiveStream, XtreamSeries, XtreamVodStream,
};

const DEFAULT_EXTENSION: &str = "ts";

/// Category id -> name
pub type CategoryNames = HashMap<String, String>;

pub fn category_names(categories: &[XtreamCategory]) -> CategoryNames {
    categories
        .iter()
        .map(|c| (c.category_id.clone(), c.category_name.trim().to_string()))
        .collect()
}

fn resolve_category(categories: &CategoryNames, id: Option<&str>) -> String {
    id.and_then(|id| categories.get(id))
        .cloned()
        .unwrap_or_default()
}

/// Account and playlist facts shared by every stream of one Xtream playlist
#[derive(Debug, Clone)]
pub struct MapContext {
    pub basic_url: String,
    pub username: String,
    pub password: String,
    pub playlist_url: String,
    /// First allowed output format, if the server advertised any
    pub container_extension: Option<String>,
}

impl MapContext {
    fn server(&self) -> &str {
        self.basic_url.trim_end_matches('/')
    }

    fn extension(&self) -> &str {
        self.container_extension
            .as_deref()
            .filter(|e| !e.is_empty())
            .unwrap_or(DEFAULT_EXTENSION)
    }

    fn path_url(&self, section: &str, id: impl std::fmt::Display) -> String {
        format!(
            "{}/{}/{}/{}/{}",
            self.server(),
            section,
            self.username,
            self.password,
            id
        )
    }
}

pub fn m3u_stream(entry: &M3uEntry, playlist_url: &str, seen: i64) -> Stream {
    let title = if entry.title.is_empty() {
        entry.tvg_name().unwrap_or_default().to_string()
    } else {
        entry.title.clone()
    };

    let mut stream = Stream::new(
        title,
        entry.url.clone(),
        entry.group_title().unwrap_or_default(),
        playlist_url,
    )
    .with_cover(entry.tvg_logo().map(str::to_string));
    stream.seen = seen;
    stream
}

pub fn live_stream(live: &XtreamLiveStream, ctx: &MapContext, categories: &CategoryNames) -> Stream {
    Stream::new(
        live.name.trim(),
        ctx.path_url("live", format!("{}.{}", live.stream_id, ctx.extension())),
        resolve_category(categories, live.category_id.as_deref()),
        ctx.playlist_url.clone(),
    )
    .with_cover(live.stream_icon.clone())
}

pub fn vod_stream(vod: &XtreamVodStream, ctx: &MapContext, categories: &CategoryNames) -> Stream {
    let extension = vod
        .container_extension
        .as_deref()
        .unwrap_or_else(|| ctx.extension());

    Stream::new(
        vod.name.trim(),
        ctx.path_url("movie", format!("{}.{}", vod.stream_id, extension)),
        resolve_category(categories, vod.category_id.as_deref()),
        ctx.playlist_url.clone(),
    )
    .with_cover(vod.stream_icon.clone())
}

/// The url ends with the bare series id, which episode lookup reads back
pub fn series_stream(series: &XtreamSeries, ctx: &MapContext, categories: &CategoryNames) -> Stream {
    Stream::new(
        series.name.trim(),
        ctx.path_url("series", series.series_id),
        resolve_category(categories, series.category_id.as_deref()),
        ctx.playlist_url.clone(),
    )
    .with_cover(series.cover.clone())
}

pub fn episode_stream(episode: &XtreamEpisode, ctx: &MapContext) -> Stream {
    let extension = episode
        .container_extension
        .as_deref()
        .unwrap_or_else(|| ctx.extension());
    let group = episode
        .season
        .as_deref()
        .map(|s| format!("Season {}", s))
        .unwrap_or_default();

    Stream::new(
        episode.title.trim(),
        ctx.path_url("series", format!("{}.{}", episode.id, extension)),
        group,
        ctx.playlist_url.clone(),
    )
    .with_cover(episode.info.as_ref().and_then(|i| i.movie_image.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn ctx(extension: Option<&str>) -> MapContext {
        MapContext {
            basic_url: "http://example.com:8080/".to_string(),
            username: "u".to_string(),
            password: "p".to_string(),
            playlist_url: "xtream-playlist".to_string(),
            container_extension: extension.map(str::to_string),
        }
    }

    fn news() -> CategoryNames {
        category_names(&[XtreamCategory {
            category_id: "1".to_string(),
            category_name: " News ".to_string(),
        }])
    }

    #[test]
    fn test_m3u_stream() {
        let mut attributes = HashMap::new();
        attributes.insert("group-title".to_string(), "Sports".to_string());
        attributes.insert("tvg-logo".to_string(), "http://logo/x.png".to_string());
        let entry = M3uEntry {
            url: "http://example.com/x.ts".to_string(),
            title: "X".to_string(),
            duration: -1,
            attributes,
        };

        let stream = m3u_stream(&entry, "http://example.com/list.m3u", 0);

        assert_eq!(stream.title, "X");
        assert_eq!(stream.group, "Sports");
        assert_eq!(stream.cover.as_deref(), Some("http://logo/x.png"));
        assert_eq!(stream.playlist_url, "http://example.com/list.m3u");
        assert_eq!(stream.seen, 0);
        assert_eq!(stream.id, 0);
    }

    #[test]
    fn test_live_stream_uses_first_allowed_format() {
        let live = XtreamLiveStream {
            name: "Channel".to_string(),
            stream_id: 7,
            stream_icon: Some("http://icon".to_string()),
            epg_channel_id: None,
            category_id: Some("1".to_string()),
        };

        let stream = live_stream(&live, &ctx(Some("m3u8")), &news());
        assert_eq!(stream.url, "http://example.com:8080/live/u/p/7.m3u8");
        assert_eq!(stream.group, "News");

        let stream = live_stream(&live, &ctx(None), &CategoryNames::new());
        assert_eq!(stream.url, "http://example.com:8080/live/u/p/7.ts");
        assert_eq!(stream.group, "");
    }

    #[test]
    fn test_vod_stream_prefers_own_container() {
        let mut vod = XtreamVodStream {
            name: "Movie".to_string(),
            stream_id: 9,
            stream_icon: None,
            category_id: Some("404".to_string()),
            container_extension: Some("mkv".to_string()),
        };

        assert_eq!(
            vod_stream(&vod, &ctx(Some("ts")), &news()).url,
            "http://example.com:8080/movie/u/p/9.mkv"
        );

        vod.container_extension = None;
        let stream = vod_stream(&vod, &ctx(Some("m3u8")), &news());
        assert_eq!(stream.url, "http://example.com:8080/movie/u/p/9.m3u8");
        assert_eq!(stream.group, "");
    }

    #[test]
    fn test_series_stream_ends_with_series_id() {
        let series = XtreamSeries {
            series_id: 4242,
            name: "Show".to_string(),
            cover: Some("".to_string()),
            category_id: Some("1".to_string()),
        };

        let stream = series_stream(&series, &ctx(None), &news());

        assert_eq!(stream.url, "http://example.com:8080/series/u/p/4242");
        assert_eq!(stream.trailing_id(), Some(4242));
        assert_eq!(stream.cover, None);
    }
}
