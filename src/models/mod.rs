//! Request and Response models for the operator API
//!
//! DTOs used for serializing/deserializing HTTP request and response bodies.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{NotifyRequest, PatternQuery, SetRequest};
pub use responses::{
    ErrorResponse, GetResponse, HealthResponse, KeysResponse, NotifyResponse, RemovedResponse,
    SetResponse, StatsResponse,
};
