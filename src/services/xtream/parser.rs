//! Xtream handshake and lazy per-kind enumeration

use async_stream::stream;
use futures::Stream;
use serde_json::Value;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use super::client::{XtreamClient, XtreamError};
use super::input::XtreamInput;
use super::types::*;
use crate::models::playlist::XtreamKind;
use crate::services::fetch::Fetcher;

/// Account facts learned during the handshake
#[derive(Debug, Clone, Default)]
pub struct XtreamOutput {
    pub server_protocol: String,
    pub port: u16,
    pub allowed_output_formats: Vec<String>,
    pub live_categories: Vec<XtreamCategory>,
    pub vod_categories: Vec<XtreamCategory>,
    pub series_categories: Vec<XtreamCategory>,
}

impl XtreamOutput {
    pub fn categories(&self, kind: XtreamKind) -> &[XtreamCategory] {
        match kind {
            XtreamKind::Live => &self.live_categories,
            XtreamKind::Vod => &self.vod_categories,
            XtreamKind::Series => &self.series_categories,
        }
    }
}

/// One listing item of any kind
#[derive(Debug, Clone)]
pub enum XtreamEntity {
    Live(XtreamLiveStream),
    Vod(XtreamVodStream),
    Series(XtreamSeries),
}

impl XtreamEntity {
    pub fn kind(&self) -> XtreamKind {
        match self {
            XtreamEntity::Live(_) => XtreamKind::Live,
            XtreamEntity::Vod(_) => XtreamKind::Vod,
            XtreamEntity::Series(_) => XtreamKind::Series,
        }
    }

    fn decode(kind: XtreamKind, item: Value) -> Result<Self, serde_json::Error> {
        Ok(match kind {
            XtreamKind::Live => XtreamEntity::Live(serde_json::from_value(item)?),
            XtreamKind::Vod => XtreamEntity::Vod(serde_json::from_value(item)?),
            XtreamKind::Series => XtreamEntity::Series(serde_json::from_value(item)?),
        })
    }
}

/// What happened while enumerating entities
#[derive(Debug, Clone, Default)]
pub struct EntityStreamReport {
    pub emitted: usize,
    pub skipped: usize,
    /// Set when a listing fetch failed and the enumeration ended early
    pub failure: Option<String>,
}

impl EntityStreamReport {
    pub fn partial(&self) -> bool {
        self.failure.is_some()
    }
}

pub struct XtreamParser {
    fetcher: Arc<dyn Fetcher>,
    report: Mutex<EntityStreamReport>,
}

impl XtreamParser {
    pub fn new(fetcher: Arc<dyn Fetcher>) -> Self {
        Self {
            fetcher,
            report: Mutex::new(EntityStreamReport::default()),
        }
    }

    fn client(&self, input: &XtreamInput) -> XtreamClient {
        XtreamClient::new(self.fetcher.clone(), input)
    }

    /// Account/server info plus the category listings of every required kind.
    /// Any failure here fails the whole subscribe.
    pub async fn output(&self, input: &XtreamInput) -> Result<XtreamOutput, XtreamError> {
        let client = self.client(input);
        let auth = client.get_auth().await?;

        let (default_protocol, default_port) = input.default_endpoint()?;
        let server_protocol = auth
            .server_info
            .server_protocol
            .as_deref()
            .map(str::to_lowercase)
            .filter(|p| p == "http" || p == "https")
            .unwrap_or(default_protocol);

        let reported_port = if server_protocol == "https" {
            auth.server_info.https_port.as_deref()
        } else {
            auth.server_info.port.as_deref()
        };
        let port = reported_port
            .and_then(|p| p.trim().parse::<u16>().ok())
            .filter(|p| *p > 0)
            .unwrap_or(default_port);

        let mut output = XtreamOutput {
            server_protocol,
            port,
            allowed_output_formats: auth.user_info.allowed_output_formats,
            ..Default::default()
        };

        if XtreamKind::Live.is_required_by(input.kind) {
            output.live_categories = client.get_live_categories().await?;
        }
        if XtreamKind::Vod.is_required_by(input.kind) {
            output.vod_categories = client.get_vod_categories().await?;
        }
        if XtreamKind::Series.is_required_by(input.kind) {
            output.series_categories = client.get_series_categories().await?;
        }

        info!(
            protocol = %output.server_protocol,
            port = output.port,
            formats = ?output.allowed_output_formats,
            "Xtream handshake completed"
        );

        Ok(output)
    }

    /// Lazily yield listing items of each kind in order.
    ///
    /// Items that fail to decode are skipped. A failed listing fetch ends the
    /// sequence; the failure is kept in [`XtreamParser::report`].
    pub fn entities<'a>(
        &'a self,
        input: &'a XtreamInput,
        kinds: &'a [XtreamKind],
    ) -> impl Stream<Item = XtreamEntity> + Send + 'a {
        self.reset_report();

        stream! {
            let client = self.client(input);

            for &kind in kinds {
                let listing = match kind {
                    XtreamKind::Live => client.get_live_streams().await,
                    XtreamKind::Vod => client.get_vod_streams().await,
                    XtreamKind::Series => client.get_series().await,
                };

                let items = match listing {
                    Ok(items) => items,
                    Err(e) => {
                        warn!(kind = %kind, "Xtream listing failed, ending enumeration: {}", e);
                        self.update_report(|r| r.failure = Some(format!("{}: {}", kind, e)));
                        break;
                    }
                };

                debug!(kind = %kind, items = items.len(), "Xtream listing fetched");

                for item in items {
                    match XtreamEntity::decode(kind, item) {
                        Ok(entity) => {
                            self.update_report(|r| r.emitted += 1);
                            yield entity;
                        }
                        Err(e) => {
                            debug!(kind = %kind, "Skipping undecodable Xtream item: {}", e);
                            self.update_report(|r| r.skipped += 1);
                        }
                    }
                }
            }
        }
    }

    /// Report of the last enumeration
    pub fn report(&self) -> EntityStreamReport {
        self.report
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    fn reset_report(&self) {
        self.update_report(|r| *r = EntityStreamReport::default());
    }

    fn update_report(&self, f: impl FnOnce(&mut EntityStreamReport)) {
        if let Ok(mut report) = self.report.lock() {
            f(&mut report);
        }
    }

    /// Deferred episode enumeration for one series
    pub async fn series_info(
        &self,
        input: &XtreamInput,
        series_id: i64,
    ) -> Result<Vec<XtreamEpisode>, XtreamError> {
        let info = self.client(input).get_series_info(series_id).await?;
        Ok(info.into_episodes())
    }
}
