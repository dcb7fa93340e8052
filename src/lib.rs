//! Kiosk Cache - response caching for the newspaper distribution backend
//!
//! Read-through caching of resource lists, details and reports, with
//! invalidation driven by committed writes.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod resources;
pub mod tasks;

pub use api::AppState;
pub use config::Config;
pub use error::{CacheError, Result};
pub use tasks::spawn_cleanup_task;
