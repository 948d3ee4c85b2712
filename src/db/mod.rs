//! Database module
//!
//! SQLite integration using sqlx with:
//! - Connection pool management and embedded migrations
//! - Row types with FromRow
//! - Repository functions for data access
//! - Change notifications for observers

pub mod events;
pub mod models;
pub mod pool;
pub mod repository;

// Re-export commonly used items
pub use events::StoreEvents;
pub use pool::{create_pool, health_check, run_migrations};
