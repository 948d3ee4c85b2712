//! Database repositories
//!
//! Free functions over a pool or a single connection, so the same calls
//! work inside and outside a transaction.

pub mod playlists;
pub mod streams;
