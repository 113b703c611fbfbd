//! Cache layer that decides between cached payloads and network fetching.

use chrono::Duration;
use reqwest::Method;
use serde_json::Value;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tracing::{debug, info};

use super::key::make_key;
use super::policy::RoutePolicy;
use super::storage::{CacheStorage, NoopStorage};

/// How long a cached response stays valid, in minutes.
pub const DEFAULT_TTL_MINUTES: i64 = 5;

/// How often expired entries are swept in the background.
pub const SWEEP_INTERVAL: std::time::Duration = std::time::Duration::from_secs(5 * 60);

/// What to do with an outgoing request.
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
  /// A valid cached payload exists; the network must not be touched
  CacheHit(Value),
  /// Go to the network. `cache_key` is set when a successful response
  /// should be stored afterwards.
  Network { cache_key: Option<String> },
}

/// Cache layer that manages caching decisions for an API client.
///
/// Cloning is cheap and every clone shares the same storage.
pub struct CacheLayer {
  storage: Arc<dyn CacheStorage>,
  policy: RoutePolicy,
  /// How long before cached data is considered stale
  ttl: Duration,
}

impl CacheLayer {
  /// Create a new cache layer with the given storage backend.
  pub fn new(storage: impl CacheStorage + 'static) -> Self {
    Self {
      storage: Arc::new(storage),
      policy: RoutePolicy::default(),
      ttl: Duration::minutes(DEFAULT_TTL_MINUTES),
    }
  }

  /// A cache layer that never stores anything.
  pub fn disabled() -> Self {
    Self::new(NoopStorage)
  }

  /// Set the time-to-live for newly stored entries.
  pub fn with_ttl(mut self, ttl: Duration) -> Self {
    self.ttl = ttl;
    self
  }

  /// Classify a request and look it up.
  pub fn outbound(&self, method: &Method, path: &str, params: Option<&Value>) -> Outbound {
    if !self.policy.is_cacheable(path, method) {
      return Outbound::Network { cache_key: None };
    }

    let key = make_key(path, params);
    match self.storage.get(&key) {
      Some(payload) => {
        debug!(key = %key, "cache hit");
        Outbound::CacheHit(payload)
      }
      None => {
        debug!(key = %key, "cache miss");
        Outbound::Network {
          cache_key: Some(key),
        }
      }
    }
  }

  /// Store a successful response payload under `key`.
  pub fn store(&self, key: &str, payload: Value) {
    self.storage.set(key, payload, self.ttl);
  }

  /// Remove every entry, or only those whose key contains `pattern`.
  pub fn invalidate(&self, pattern: Option<&str>) -> usize {
    let removed = match pattern {
      Some(pattern) => self.storage.delete_matching(pattern),
      None => self.storage.clear(),
    };
    info!(pattern = pattern.unwrap_or("*"), removed, "cache invalidated");
    removed
  }

  /// Remove expired entries now.
  pub fn sweep(&self) -> usize {
    self.storage.sweep()
  }

  /// Number of entries currently held.
  pub fn len(&self) -> usize {
    self.storage.len()
  }

  pub fn is_empty(&self) -> bool {
    self.storage.is_empty()
  }

  /// Start sweeping expired entries every `period`.
  ///
  /// The task runs until the returned handle is dropped.
  pub fn spawn_sweeper(&self, period: std::time::Duration) -> SweepHandle {
    let cache = self.clone();
    let task = tokio::spawn(async move {
      let mut ticker = interval_at(Instant::now() + period, period);
      loop {
        ticker.tick().await;
        let removed = cache.sweep();
        if removed > 0 {
          debug!(removed, remaining = cache.len(), "swept expired cache entries");
        }
      }
    });

    SweepHandle { task }
  }
}

impl Clone for CacheLayer {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
      policy: self.policy.clone(),
      ttl: self.ttl,
    }
  }
}

/// Owns the background sweep task and stops it when dropped.
pub struct SweepHandle {
  task: JoinHandle<()>,
}

impl Drop for SweepHandle {
  fn drop(&mut self) {
    self.task.abort();
  }
}
