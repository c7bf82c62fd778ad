//! Tracker API integration.
//!
//! Split into three layers:
//! - `client`: raw HTTP transport (auth, endpoints, JSON in/out)
//! - `api_types`: serde types matching the wire format, converted to
//!   domain types at the boundary
//! - `cached`: the client the rest of the app talks to; routes every read
//!   through the response cache and the rate limiter

pub mod api_types;
mod cached;
mod client;
pub mod types;

pub use cached::CachedTrackerClient;
