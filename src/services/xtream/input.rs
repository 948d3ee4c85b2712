//! Xtream ingestion input and its playlist-url encoding
//!
//! Each content kind of one account is stored as its own playlist whose url
//! encodes the account, the kind and the server's canonical protocol/port:
//!
//! ```text
//! http://host:8080/player_api.php?basic_url=...&username=...&password=...&type=live
//! ```

use url::Url;

use super::client::XtreamError;
use crate::models::playlist::XtreamKind;

const API_PATH: &str = "player_api.php";

/// One Xtream fetch request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XtreamInput {
    pub basic_url: String,
    pub username: String,
    pub password: String,
    pub kind: Option<XtreamKind>,
}

impl XtreamInput {
    pub fn new(
        basic_url: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
        kind: Option<XtreamKind>,
    ) -> Self {
        Self {
            basic_url: basic_url.into(),
            username: username.into(),
            password: password.into(),
            kind,
        }
    }

    /// Basic url without trailing slash, for building API and playback urls
    pub fn server(&self) -> &str {
        self.basic_url.trim_end_matches('/')
    }

    fn parsed_basic_url(&self) -> Result<Url, XtreamError> {
        Url::parse(&self.basic_url)
            .ok()
            .filter(|u| u.host_str().is_some())
            .ok_or_else(|| XtreamError::InvalidUrl(self.basic_url.clone()))
    }

    /// Protocol and port of the basic url, used when the server does not report its own
    pub fn default_endpoint(&self) -> Result<(String, u16), XtreamError> {
        let url = self.parsed_basic_url()?;
        let port = url
            .port_or_known_default()
            .ok_or_else(|| XtreamError::InvalidUrl(self.basic_url.clone()))?;
        Ok((url.scheme().to_string(), port))
    }

    /// Same account, different content kind
    pub fn with_kind(&self, kind: XtreamKind) -> Self {
        Self {
            kind: Some(kind),
            ..self.clone()
        }
    }
}

/// Lossless playlist-url form of an [`XtreamInput`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct XtreamPlaylistUrl {
    pub input: XtreamInput,
    pub server_protocol: String,
    pub port: u16,
}

impl XtreamPlaylistUrl {
    pub fn new(input: XtreamInput, server_protocol: &str, port: u16) -> Self {
        Self {
            input,
            server_protocol: server_protocol.to_lowercase(),
            port,
        }
    }

    pub fn encode(&self) -> Result<String, XtreamError> {
        let basic = self.input.parsed_basic_url()?;
        let host = basic
            .host_str()
            .ok_or_else(|| XtreamError::InvalidUrl(self.input.basic_url.clone()))?;

        // Default ports are dropped by the parser and restored by port_or_known_default
        let mut url = Url::parse(&format!(
            "{}://{}:{}/{}",
            self.server_protocol, host, self.port, API_PATH
        ))
        .map_err(|e| XtreamError::InvalidUrl(format!("{}: {}", self.input.basic_url, e)))?;

        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("basic_url", &self.input.basic_url)
                .append_pair("username", &self.input.username)
                .append_pair("password", &self.input.password);
            if let Some(kind) = self.input.kind {
                query.append_pair("type", kind.as_str());
            }
        }

        Ok(url.to_string())
    }

    pub fn decode(playlist_url: &str) -> Result<Self, XtreamError> {
        let invalid = || XtreamError::InvalidUrl(playlist_url.to_string());

        let url = Url::parse(playlist_url).map_err(|_| invalid())?;
        let port = url.port_or_known_default().ok_or_else(invalid)?;

        let mut basic_url = None;
        let mut username = None;
        let mut password = None;
        let mut kind = None;

        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "basic_url" => basic_url = Some(value.into_owned()),
                "username" => username = Some(value.into_owned()),
                "password" => password = Some(value.into_owned()),
                "type" => kind = Some(XtreamKind::parse(&value).ok_or_else(invalid)?),
                _ => {}
            }
        }

        Ok(Self {
            input: XtreamInput {
                basic_url: basic_url.ok_or_else(invalid)?,
                username: username.ok_or_else(invalid)?,
                password: password.ok_or_else(invalid)?,
                kind,
            },
            server_protocol: url.scheme().to_string(),
            port,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(encoded: &XtreamPlaylistUrl) {
        let url = encoded.encode().unwrap();
        let decoded = XtreamPlaylistUrl::decode(&url).unwrap();
        assert_eq!(&decoded, encoded, "round trip through {}", url);
    }

    #[test]
    fn test_encode_decode_roundtrip() {
        let inputs = [
            XtreamInput::new("http://example.com:8080", "user", "pass", Some(XtreamKind::Live)),
            XtreamInput::new("http://example.com/", "u", "p", Some(XtreamKind::Vod)),
            XtreamInput::new("https://tv.example.org/panel", "john doe", "p@ss&w=rd/?#%", Some(XtreamKind::Series)),
            XtreamInput::new("http://10.0.0.1:25461", "ünï", "çødé", None),
        ];

        for input in inputs {
            roundtrip(&XtreamPlaylistUrl::new(input.clone(), "http", 80));
            roundtrip(&XtreamPlaylistUrl::new(input.clone(), "https", 443));
            roundtrip(&XtreamPlaylistUrl::new(input, "http", 8080));
        }
    }

    #[test]
    fn test_kinds_produce_distinct_urls() {
        let input = XtreamInput::new("http://example.com:8080", "user", "pass", None);
        let urls: Vec<String> = XtreamKind::ALL
            .iter()
            .map(|k| XtreamPlaylistUrl::new(input.with_kind(*k), "http", 8080).encode().unwrap())
            .collect();

        assert_ne!(urls[0], urls[1]);
        assert_ne!(urls[1], urls[2]);
        assert!(urls[0].starts_with("http://example.com:8080/player_api.php?"));
    }

    #[test]
    fn test_default_endpoint() {
        let input = XtreamInput::new("https://example.com/", "u", "p", None);
        assert_eq!(input.default_endpoint().unwrap(), ("https".to_string(), 443));

        let bad = XtreamInput::new("not a url", "u", "p", None);
        assert!(bad.default_endpoint().is_err());
    }

    #[test]
    fn test_decode_rejects_incomplete_url() {
        assert!(XtreamPlaylistUrl::decode("http://example.com/player_api.php?username=u").is_err());
        assert!(XtreamPlaylistUrl::decode("http://example.com/list.m3u").is_err());
        assert!(XtreamPlaylistUrl::decode(
            "http://example.com/player_api.php?basic_url=http%3A%2F%2Fx&username=u&password=p&type=radio"
        )
        .is_err());
    }
}
