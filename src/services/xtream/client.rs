//! Xtream Codes API Client
//!
//! Requests to the Xtream Codes Player API v2 over the [`Fetcher`] capability.

use serde::de::DeserializeOwned;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, error};

use super::input::XtreamInput;
use super::types::*;
use crate::services::fetch::{FetchError, Fetcher};

/// Xtream API Error types
#[derive(Debug, Error)]
pub enum XtreamError {
    /// Network/connection error
    #[error("Network error: {0}")]
    Network(String),
    /// HTTP error (non-2xx status)
    #[error("HTTP error: {0}")]
    Http(u16),
    /// JSON parsing error
    #[error("Parse error: {0}")]
    Parse(String),
    /// Empty response from server
    #[error("Empty response")]
    EmptyResponse,
    /// Credentials rejected by the panel
    #[error("Authentication rejected")]
    Unauthorized,
    /// Basic url or playlist url cannot be used
    #[error("Invalid Xtream url: {0}")]
    InvalidUrl(String),
}

impl From<FetchError> for XtreamError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::Status { status, .. } => XtreamError::Http(status),
            other => XtreamError::Network(other.to_string()),
        }
    }
}

/// Xtream API Client
pub struct XtreamClient {
    fetcher: Arc<dyn Fetcher>,
    base_url: String,
}

impl XtreamClient {
    pub fn new(fetcher: Arc<dyn Fetcher>, input: &XtreamInput) -> Self {
        let base_url = format!(
            "{}/player_api.php?username={}&password={}",
            input.server(),
            urlencoding::encode(&input.username),
            urlencoding::encode(&input.password)
        );

        Self { fetcher, base_url }
    }

    fn action_url(&self, action: &str) -> String {
        if action.is_empty() {
            self.base_url.clone()
        } else {
            format!("{}&action={}", self.base_url, action)
        }
    }

    /// Fetch the raw response body for an action
    async fn get_text(&self, action: &str) -> Result<String, XtreamError> {
        debug!("Xtream API request: {}", if action.is_empty() { "auth" } else { action });

        let body = self.fetcher.get(&self.action_url(action), None).await?;
        Ok(String::from_utf8_lossy(&body).into_owned())
    }

    /// Make a GET request and decode the whole body
    async fn get<T: DeserializeOwned>(&self, action: &str) -> Result<T, XtreamError> {
        let text = self.get_text(action).await?;

        if text.trim().is_empty() || text.trim() == "null" {
            return Err(XtreamError::EmptyResponse);
        }

        serde_json::from_str(&text).map_err(|e| {
            error!("Failed to parse Xtream response for action '{}': {}", action, e);
            debug!("Response text: {}", text.chars().take(500).collect::<String>());
            XtreamError::Parse(e.to_string())
        })
    }

    /// Make a GET request for a listing, leaving items undecoded.
    ///
    /// Empty bodies are an empty listing; some panels answer with an object
    /// keyed by id instead of an array.
    async fn get_list(&self, action: &str) -> Result<Vec<Value>, XtreamError> {
        let text = self.get_text(action).await?;

        if text.trim().is_empty() || text.trim() == "null" {
            return Ok(Vec::new());
        }

        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Array(items)) => Ok(items),
            Ok(Value::Object(map)) => Ok(map.into_iter().map(|(_, v)| v).collect()),
            Ok(other) => Err(XtreamError::Parse(format!(
                "expected a list for '{}', got {}",
                action,
                other.to_string().chars().take(100).collect::<String>()
            ))),
            Err(e) => Err(XtreamError::Parse(e.to_string())),
        }
    }

    /// Decode a whole listing, skipping items that do not decode
    async fn get_typed_list<T: DeserializeOwned>(&self, action: &str) -> Result<Vec<T>, XtreamError> {
        Ok(self
            .get_list(action)
            .await?
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect())
    }

    // ========================================================================
    // Authentication
    // ========================================================================

    /// Get authentication info (user_info + server_info)
    pub async fn get_auth(&self) -> Result<XtreamAuthResponse, XtreamError> {
        let auth: XtreamAuthResponse = self.get("").await?;
        if !auth.user_info.is_authenticated() {
            return Err(XtreamError::Unauthorized);
        }
        Ok(auth)
    }

    // ========================================================================
    // Categories
    // ========================================================================

    pub async fn get_live_categories(&self) -> Result<Vec<XtreamCategory>, XtreamError> {
        self.get_typed_list("get_live_categories").await
    }

    pub async fn get_vod_categories(&self) -> Result<Vec<XtreamCategory>, XtreamError> {
        self.get_typed_list("get_vod_categories").await
    }

    pub async fn get_series_categories(&self) -> Result<Vec<XtreamCategory>, XtreamError> {
        self.get_typed_list("get_series_categories").await
    }

    // ========================================================================
    // Listings (undecoded, items are decoded one by one by the parser)
    // ========================================================================

    pub async fn get_live_streams(&self) -> Result<Vec<Value>, XtreamError> {
        self.get_list("get_live_streams").await
    }

    pub async fn get_vod_streams(&self) -> Result<Vec<Value>, XtreamError> {
        self.get_list("get_vod_streams").await
    }

    pub async fn get_series(&self) -> Result<Vec<Value>, XtreamError> {
        self.get_list("get_series").await
    }

    // ========================================================================
    // Series
    // ========================================================================

    /// Get detailed series info with episodes
    pub async fn get_series_info(&self, series_id: i64) -> Result<XtreamSeriesInfo, XtreamError> {
        self.get(&format!("get_series_info&series_id={}", series_id))
            .await
    }
}
