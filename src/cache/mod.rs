//! In-memory response cache for the API client.
//!
//! This module provides:
//! - A TTL-based store with lazy eviction and a periodic sweep
//! - Deterministic cache keys from request path + query parameters
//! - A route policy deciding which requests may be cached at all

mod key;
mod layer;
mod policy;
mod storage;

pub use key::make_key;
pub use layer::{CacheLayer, Outbound, SweepHandle, DEFAULT_TTL_MINUTES, SWEEP_INTERVAL};
pub use policy::RoutePolicy;
pub use storage::{CacheEntry, CacheStorage, MemoryStorage, NoopStorage};
