//! In-process TTL cache for tracker API responses.
//!
//! Entries expire lazily: an expired entry is removed the next time it is
//! read, not by a background sweeper. Keys embed resource paths, so a
//! substring match is enough to evict every cached read under a resource
//! subtree after a mutation.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use serde_json::Value;

struct CacheEntry {
  value: Value,
  expires_at: Instant,
}

/// Process-wide response cache. Shared across tasks via `Arc`.
pub struct ResponseCache {
  entries: DashMap<String, CacheEntry>,
}

impl ResponseCache {
  pub fn new() -> Self {
    Self {
      entries: DashMap::new(),
    }
  }

  /// Returns the cached value for `key` if it has not expired.
  ///
  /// Reading an expired entry removes it as a side effect.
  pub fn get(&self, key: &str) -> Option<Value> {
    let entry = self.entries.get(key)?;
    if Instant::now() >= entry.expires_at {
      drop(entry);
      self.entries.remove(key);
      return None;
    }
    Some(entry.value.clone())
  }

  /// Stores `value` under `key` for `ttl`, replacing any prior entry.
  ///
  /// A zero `ttl` means "do not cache": nothing is stored and any
  /// existing entry is left untouched.
  pub fn set(&self, key: impl Into<String>, value: Value, ttl: Duration) {
    if ttl.is_zero() {
      return;
    }
    self.entries.insert(
      key.into(),
      CacheEntry {
        value,
        expires_at: Instant::now() + ttl,
      },
    );
  }

  /// Removes every entry whose key contains `pattern` as a substring and
  /// returns how many were removed.
  pub fn invalidate(&self, pattern: &str) -> usize {
    // Collect first: removing while holding shard iterators can deadlock.
    let matching: Vec<String> = self
      .entries
      .iter()
      .filter(|entry| entry.key().contains(pattern))
      .map(|entry| entry.key().clone())
      .collect();

    let mut removed = 0;
    for key in matching {
      if self.entries.remove(&key).is_some() {
        removed += 1;
      }
    }
    removed
  }

  /// Removes all entries unconditionally.
  pub fn clear(&self) {
    self.entries.clear();
  }

  /// Number of physically stored entries, expired-but-unread included.
  pub fn len(&self) -> usize {
    self.entries.len()
  }

  pub fn is_empty(&self) -> bool {
    self.entries.is_empty()
  }
}

impl Default for ResponseCache {
  fn default() -> Self {
    Self::new()
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use serde_json::json;

  #[test]
  fn test_set_then_get_returns_value() {
    let cache = ResponseCache::new();
    cache.set("/releases", json!({"id": 1}), Duration::from_secs(60));
    assert_eq!(cache.get("/releases"), Some(json!({"id": 1})));
  }

  #[test]
  fn test_get_missing_key_returns_none() {
    let cache = ResponseCache::new();
    assert_eq!(cache.get("/nope"), None);
  }

  #[test]
  fn test_expired_entry_is_removed_on_read() {
    let cache = ResponseCache::new();
    cache.set("/releases", json!([1, 2]), Duration::from_millis(10));
    std::thread::sleep(Duration::from_millis(30));
    assert_eq!(cache.get("/releases"), None);
    // The read itself evicts the entry.
    assert_eq!(cache.len(), 0);
  }

  #[test]
  fn test_zero_ttl_is_not_stored() {
    let cache = ResponseCache::new();
    cache.set("/releases", json!(1), Duration::ZERO);
    assert_eq!(cache.get("/releases"), None);
    assert!(cache.is_empty());
  }

  #[test]
  fn test_zero_ttl_leaves_existing_entry_alone() {
    let cache = ResponseCache::new();
    cache.set("/releases", json!("old"), Duration::from_secs(60));
    cache.set("/releases", json!("new"), Duration::ZERO);
    assert_eq!(cache.get("/releases"), Some(json!("old")));
  }

  #[test]
  fn test_set_overwrites_prior_entry() {
    let cache = ResponseCache::new();
    cache.set("/releases", json!("old"), Duration::from_secs(60));
    cache.set("/releases", json!("new"), Duration::from_secs(60));
    assert_eq!(cache.get("/releases"), Some(json!("new")));
    assert_eq!(cache.len(), 1);
  }

  #[test]
  fn test_invalidate_removes_only_matching_keys() {
    let cache = ResponseCache::new();
    for i in 0..100 {
      let key = format!("/releases/rel-{}/features", i);
      cache.set(key, json!(i), Duration::from_secs(60));
    }

    let removed = cache.invalidate("rel-50");

    assert_eq!(removed, 1);
    assert_eq!(cache.len(), 99);
    assert_eq!(cache.get("/releases/rel-50/features"), None);
    assert_eq!(cache.get("/releases/rel-5/features"), Some(json!(5)));
    assert_eq!(cache.get("/releases/rel-99/features"), Some(json!(99)));
  }

  #[test]
  fn test_invalidate_with_no_match_removes_nothing() {
    let cache = ResponseCache::new();
    cache.set("/iterations/7", json!(7), Duration::from_secs(60));
    assert_eq!(cache.invalidate("/releases"), 0);
    assert_eq!(cache.len(), 1);
  }

  #[test]
  fn test_invalidate_sweeps_expired_entries_too() {
    let cache = ResponseCache::new();
    cache.set("/releases/rel-1/features", json!(1), Duration::from_millis(5));
    std::thread::sleep(Duration::from_millis(20));
    // Expired but never read, so still physically present.
    assert_eq!(cache.len(), 1);
    assert_eq!(cache.invalidate("rel-1"), 1);
    assert!(cache.is_empty());
  }

  #[test]
  fn test_clear_empties_cache() {
    let cache = ResponseCache::new();
    for i in 0..1000 {
      cache.set(format!("/features/{}", i), json!(i), Duration::from_secs(60));
    }
    assert_eq!(cache.len(), 1000);
    cache.clear();
    assert!(cache.is_empty());
    assert_eq!(cache.get("/features/0"), None);
  }
}
