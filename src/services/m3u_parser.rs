//! Extended M3U parser
//!
//! Turns an already-open reader into a lazy sequence of [`M3uEntry`].
//! Malformed entries are skipped and counted, never fatal.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::io::BufRead;

/// Lines longer than this are skipped
const MAX_LINE_BYTES: usize = 32 * 1024;

lazy_static! {
    /// Regex to normalize multiple whitespaces into single space
    static ref MULTI_SPACE_REGEX: Regex = Regex::new(r"\s{2,}").unwrap();
    /// Regex to parse EXTINF attributes (tvg-id="...", group-title="...", etc)
    static ref ATTR_REGEX: Regex = Regex::new(r#"([\w.]+(?:-[\w.]+)*)="([^"]*)""#).unwrap();
    /// Regex to extract duration from EXTINF line
    static ref DURATION_REGEX: Regex = Regex::new(r"^-?\d+").unwrap();
}

/// One parsed playlist entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct M3uEntry {
    pub url: String,
    pub title: String,
    pub duration: i64,
    pub attributes: HashMap<String, String>,
}

impl M3uEntry {
    fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes
            .get(key)
            .map(|v| v.as_str())
            .filter(|v| !v.trim().is_empty())
    }

    pub fn tvg_name(&self) -> Option<&str> {
        self.attribute("tvg-name")
    }

    pub fn tvg_logo(&self) -> Option<&str> {
        self.attribute("tvg-logo")
    }

    pub fn group_title(&self) -> Option<&str> {
        self.attribute("group-title")
    }
}

/// Parsed EXTINF line data
#[derive(Debug)]
struct ExtinfData {
    duration: i64,
    attributes: HashMap<String, String>,
    title: String,
}

/// Parse an EXTINF line
/// Format: #EXTINF:duration tvg-id="..." tvg-name="..." tvg-logo="..." group-title="...",Title
fn parse_extinf(line: &str) -> Option<ExtinfData> {
    let content = line.strip_prefix("#EXTINF:")?;

    // The title separator is the first comma outside a quoted attribute value
    let mut in_quotes = false;
    let separator = content.char_indices().find_map(|(i, c)| match c {
        '"' => {
            in_quotes = !in_quotes;
            None
        }
        ',' if !in_quotes => Some(i),
        _ => None,
    })?;

    let header = &content[..separator];
    let title = normalize_text(&content[separator + 1..]);

    let duration = DURATION_REGEX
        .find(header.trim_start())
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(-1);

    let attributes = ATTR_REGEX
        .captures_iter(header)
        .map(|caps| (caps[1].to_string(), normalize_text(&caps[2])))
        .collect();

    Some(ExtinfData {
        duration,
        attributes,
        title,
    })
}

/// Normalize text: trim and collapse multiple spaces into single space
fn normalize_text(text: &str) -> String {
    MULTI_SPACE_REGEX.replace_all(text.trim(), " ").to_string()
}

/// Stateless entry point
pub struct M3uParser;

impl M3uParser {
    /// Lazily parse entries from a reader
    pub fn entries<R: BufRead>(reader: R) -> M3uEntries<R> {
        M3uEntries {
            reader,
            buf: Vec::new(),
            pending: Pending::None,
            seen_urls: HashSet::new(),
            skipped: 0,
            duplicates: 0,
            done: false,
        }
    }
}

enum Pending {
    None,
    Header(ExtinfData),
    /// A malformed EXTINF was seen; its URL line is dropped with it
    Broken,
}

/// Lazy, finite, non-restartable iterator of parsed entries
pub struct M3uEntries<R> {
    reader: R,
    buf: Vec<u8>,
    pending: Pending,
    seen_urls: HashSet<String>,
    skipped: usize,
    duplicates: usize,
    done: bool,
}

impl<R> M3uEntries<R> {
    /// Malformed entries skipped so far
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// Duplicate urls dropped so far
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    fn skip(&mut self, reason: &str, line: &str) {
        self.skipped += 1;
        tracing::debug!(reason, line = %truncate(line, 120), "Skipping malformed M3U entry");
    }

    fn drop_pending(&mut self) {
        if let Pending::Header(ref extinf) = self.pending {
            let title = extinf.title.clone();
            self.skip("extinf without url", &title);
        }
        self.pending = Pending::None;
    }
}

impl<R: BufRead> M3uEntries<R> {
    /// Read one raw line; None at EOF or on read error
    fn next_line(&mut self) -> Option<String> {
        self.buf.clear();
        match self.reader.read_until(b'\n', &mut self.buf) {
            Ok(0) => None,
            Ok(_) => Some(String::from_utf8_lossy(&self.buf).into_owned()),
            Err(e) => {
                tracing::warn!("M3U read failed, ending parse early: {}", e);
                None
            }
        }
    }
}

impl<R: BufRead> Iterator for M3uEntries<R> {
    type Item = M3uEntry;

    fn next(&mut self) -> Option<M3uEntry> {
        if self.done {
            return None;
        }

        loop {
            let Some(raw) = self.next_line() else {
                self.drop_pending();
                self.done = true;
                return None;
            };

            if raw.len() > MAX_LINE_BYTES {
                self.drop_pending();
                self.skip("line too long", &raw);
                continue;
            }

            let line = raw.trim().trim_start_matches('\u{feff}');

            if line.is_empty() {
                continue;
            }

            if line.starts_with("#EXTINF:") {
                self.drop_pending();
                self.pending = match parse_extinf(line) {
                    Some(extinf) => Pending::Header(extinf),
                    None => {
                        self.skip("extinf without title", line);
                        Pending::Broken
                    }
                };
                continue;
            }

            // #EXTM3U header and other directives
            if line.starts_with('#') {
                continue;
            }

            let extinf = match std::mem::replace(&mut self.pending, Pending::None) {
                Pending::Header(extinf) => extinf,
                Pending::Broken => continue,
                Pending::None => {
                    self.skip("url without extinf", line);
                    continue;
                }
            };

            if !self.seen_urls.insert(line.to_string()) {
                self.duplicates += 1;
                continue;
            }

            return Some(M3uEntry {
                url: line.to_string(),
                title: extinf.title,
                duration: extinf.duration,
                attributes: extinf.attributes,
            });
        }
    }
}

fn truncate(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}
