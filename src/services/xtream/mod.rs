//! Xtream Codes Integration
//!
//! Player API v2 access for subscription ingestion:
//!
//! - **Client**: typed requests to `player_api.php` over the fetch capability
//! - **Input**: account description and its lossless playlist-url encoding
//! - **Parser**: handshake (account info + categories) and lazy enumeration
//!   of live, VOD and series listings
//!
//! # Usage
//!
//! ```rust,ignore
//! let parser = XtreamParser::new(fetcher);
//! let output = parser.output(&input).await?;
//! let mut entities = std::pin::pin!(parser.entities(&input, &[XtreamKind::Live]));
//! while let Some(entity) = entities.next().await {
//!     // map and buffer
//! }
//! ```

pub mod client;
pub mod input;
pub mod parser;
pub mod types;

// Re-exports for convenience
pub use client::XtreamError;
pub use input::{XtreamInput, XtreamPlaylistUrl};
pub use parser::{XtreamEntity, XtreamParser};
pub use types::{XtreamCategory, XtreamEpisode, XtreamLiveStream, XtreamSeries, XtreamVodStream};
