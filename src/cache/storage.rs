//! Cache storage trait and in-memory implementation.

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// A cached response payload with its own time-to-live.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry {
  /// The response body as received from the network
  pub payload: Value,
  /// When the entry was written
  pub stored_at: DateTime<Utc>,
  /// How long the entry stays valid after `stored_at`
  pub ttl: Duration,
}

impl CacheEntry {
  /// Create an entry stored at the current time.
  pub fn new(payload: Value, ttl: Duration) -> Self {
    Self {
      payload,
      stored_at: Utc::now(),
      ttl,
    }
  }

  /// An entry is valid while its age does not exceed its TTL.
  pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
    now - self.stored_at <= self.ttl
  }
}

/// Trait for cache storage backends.
///
/// None of the operations can fail: a missing or expired entry is reported
/// as absent, never as an error.
pub trait CacheStorage: Send + Sync {
  /// Insert or replace the entry for `key`, stamped with the current time.
  fn set(&self, key: &str, payload: Value, ttl: Duration);

  /// Get the payload for `key` if present and unexpired.
  ///
  /// An expired entry found here is removed.
  fn get(&self, key: &str) -> Option<Value>;

  /// Whether `get(key)` would return a payload.
  fn has(&self, key: &str) -> bool {
    self.get(key).is_some()
  }

  /// Remove a single entry. Returns whether an entry was present.
  fn delete(&self, key: &str) -> bool;

  /// Remove every entry whose key contains `pattern`.
  fn delete_matching(&self, pattern: &str) -> usize;

  /// Remove all entries.
  fn clear(&self) -> usize;

  /// Remove every expired entry.
  fn sweep(&self) -> usize;

  /// Number of stored entries, expired ones included until swept.
  fn len(&self) -> usize;

  fn is_empty(&self) -> bool {
    self.len() == 0
  }
}

/// Storage implementation that doesn't cache anything.
/// Used when caching is disabled - all operations are no-ops.
pub struct NoopStorage;

impl CacheStorage for NoopStorage {
  fn set(&self, _key: &str, _payload: Value, _ttl: Duration) {
    // Discard
  }

  fn get(&self, _key: &str) -> Option<Value> {
    None // Always miss
  }

  fn delete(&self, _key: &str) -> bool {
    false
  }

  fn delete_matching(&self, _pattern: &str) -> usize {
    0
  }

  fn clear(&self) -> usize {
    0
  }

  fn sweep(&self) -> usize {
    0
  }

  fn len(&self) -> usize {
    0
  }
}

/// In-memory cache storage.
///
/// Every operation takes the lock for its own duration only, so each one is
/// atomic with respect to the others.
#[derive(Default)]
pub struct MemoryStorage {
  entries: Mutex<HashMap<String, CacheEntry>>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }

  /// Insert a prepared entry, replacing any previous one.
  pub fn insert_entry(&self, key: &str, entry: CacheEntry) {
    self.entries().insert(key.to_string(), entry);
  }

  fn entries(&self) -> MutexGuard<'_, HashMap<String, CacheEntry>> {
    // A panic while holding the lock cannot leave a map half-written.
    self.entries.lock().unwrap_or_else(PoisonError::into_inner)
  }
}

impl CacheStorage for MemoryStorage {
  fn set(&self, key: &str, payload: Value, ttl: Duration) {
    self.insert_entry(key, CacheEntry::new(payload, ttl));
  }

  fn get(&self, key: &str) -> Option<Value> {
    let mut entries = self.entries();

    match entries.get(key) {
      Some(entry) if entry.is_valid_at(Utc::now()) => Some(entry.payload.clone()),
      Some(_) => {
        // Lazy eviction
        entries.remove(key);
        None
      }
      None => None,
    }
  }

  fn delete(&self, key: &str) -> bool {
    self.entries().remove(key).is_some()
  }

  fn delete_matching(&self, pattern: &str) -> usize {
    let mut entries = self.entries();
    let before = entries.len();
    entries.retain(|key, _| !key.contains(pattern));
    before - entries.len()
  }

  fn clear(&self) -> usize {
    let mut entries = self.entries();
    let removed = entries.len();
    entries.clear();
    removed
  }

  fn sweep(&self) -> usize {
    let now = Utc::now();
    let mut entries = self.entries();
    let before = entries.len();
    entries.retain(|_, entry| entry.is_valid_at(now));
    before - entries.len()
  }

  fn len(&self) -> usize {
    self.entries().len()
  }
}
