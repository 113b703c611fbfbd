//! Client for the fleet management API with a transparent response cache.
//!
//! [`api::CachedApiClient`] behaves like a plain HTTP client. GET requests to
//! read-heavy resources are answered from an in-memory [`cache::CacheLayer`]
//! for five minutes after the first successful response.

pub mod api;
pub mod cache;
pub mod config;
pub mod logging;
pub mod resources;
