//! Request acceleration between the app and the tracker API.
//!
//! Two independent pieces, both consumed by the cached client:
//! - An in-process TTL cache keyed by request URL + query parameters,
//!   with substring invalidation for evicting resource subtrees after writes
//! - A shared token bucket that throttles outbound calls while allowing
//!   short bursts up to a configured ceiling

mod cache;
mod key;
mod limiter;

pub use cache::ResponseCache;
pub use key::cache_key;
pub use limiter::RateLimiter;
