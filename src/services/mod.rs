pub mod backup;
pub mod batch;
pub mod content;
pub mod error;
pub mod fetch;
pub mod ingest;
pub mod jobs;
pub mod m3u_parser;
pub mod mapper;
pub mod metrics;
pub mod playlist_service;
pub mod reconcile;
pub mod xtream;

pub use error::IngestError;
pub use jobs::JobTracker;
pub use playlist_service::PlaylistService;
