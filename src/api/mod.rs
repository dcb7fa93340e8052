//! API Module
//!
//! HTTP surface of the cache service: the hosted store, which application
//! processes reach through `RemoteBackend`, and the operator endpoints.
//!
//! # Endpoints
//! - `GET|PUT|DELETE /store/keys/:key` - Raw store access by key
//! - `GET|DELETE /store/keys?pattern=` - List or delete keys by glob pattern
//! - `GET /store/stats` - Hosted store counters
//! - `GET /health` - Health check
//! - `GET /stats` - Adapter and backend counters
//! - `DELETE /cache/keys/:key` - Evict one key
//! - `DELETE /cache/prefixes/:prefix` - Evict every key under a prefix
//! - `POST /cache/notify` - Invalidate after a write committed elsewhere

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
