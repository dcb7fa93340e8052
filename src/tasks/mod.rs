//! Background Tasks Module
//!
//! - TTL sweeper: evicts expired entries from the in-memory backend

mod cleanup;

pub use cleanup::spawn_cleanup_task;
