//! Network fetch capability
//!
//! Ingestion depends on [`Fetcher`] rather than on reqwest directly so that
//! runs can be driven by canned bodies in tests.

use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("{message}")]
    Status { status: u16, message: String },

    #[error("Response too large: {size_mb:.1}MB (limit {limit_mb}MB)")]
    TooLarge { size_mb: f64, limit_mb: u64 },
}

/// Issues an HTTP GET and returns the whole body on success
#[async_trait]
pub trait Fetcher: Send + Sync {
    async fn get(&self, url: &str, user_agent: Option<&str>) -> Result<Vec<u8>, FetchError>;
}

/// reqwest-backed fetcher
pub struct HttpFetcher {
    client: Client,
    max_bytes: u64,
}

impl HttpFetcher {
    pub fn new(user_agent: &str, timeout_ms: u64, max_bytes: u64) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_millis(timeout_ms))
            .gzip(true)
            .build()?;

        Ok(Self { client, max_bytes })
    }

    fn check_size(&self, len: u64) -> Result<(), FetchError> {
        if len > self.max_bytes {
            return Err(FetchError::TooLarge {
                size_mb: len as f64 / 1024f64 / 1024f64,
                limit_mb: self.max_bytes / 1024 / 1024,
            });
        }
        Ok(())
    }
}

#[async_trait]
impl Fetcher for HttpFetcher {
    async fn get(&self, url: &str, user_agent: Option<&str>) -> Result<Vec<u8>, FetchError> {
        let mut request = self.client.get(url);
        if let Some(ua) = user_agent.filter(|ua| !ua.trim().is_empty()) {
            request = request.header(reqwest::header::USER_AGENT, ua);
        }

        let response = request
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                status: status.as_u16(),
                message: friendly_status(status),
            });
        }

        if let Some(len) = response.content_length() {
            self.check_size(len)?;
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;
        self.check_size(body.len() as u64)?;

        tracing::debug!(url, bytes = body.len(), "Fetched");

        Ok(body.to_vec())
    }
}

fn friendly_status(status: reqwest::StatusCode) -> String {
    match status {
        reqwest::StatusCode::NOT_FOUND => "Not found (404). Check the URL.".to_string(),
        reqwest::StatusCode::FORBIDDEN => "Access denied (403). The source may require authentication.".to_string(),
        reqwest::StatusCode::TOO_MANY_REQUESTS => "Too many requests (429). The server is rate limiting.".to_string(),
        _ => {
            let reason = status.canonical_reason().unwrap_or("Error");
            format!("HTTP {}: {}", status.as_u16(), reason)
        }
    }
}

#[cfg(test)]
pub mod testing {
    //! In-memory fetcher serving canned bodies

    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    pub struct StaticFetcher {
        bodies: Mutex<HashMap<String, Vec<u8>>>,
        requests: Mutex<Vec<String>>,
    }

    impl StaticFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn with(self, url: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
            self.bodies.lock().unwrap().insert(url.into(), body.into());
            self
        }

        pub fn without(self, url: &str) -> Self {
            self.bodies.lock().unwrap().remove(url);
            self
        }

        pub fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Fetcher for StaticFetcher {
        async fn get(&self, url: &str, _user_agent: Option<&str>) -> Result<Vec<u8>, FetchError> {
            self.requests.lock().unwrap().push(url.to_string());
            self.bodies
                .lock()
                .unwrap()
                .get(url)
                .cloned()
                .ok_or_else(|| FetchError::Status {
                    status: 404,
                    message: friendly_status(reqwest::StatusCode::NOT_FOUND),
                })
        }
    }
}
