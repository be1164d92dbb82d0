//! Cache storage trait and the in-memory implementation.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// A cached query result.
#[derive(Debug, Clone)]
pub struct CachedQueryResult<T> {
  pub data: T,
  /// When the result was stored
  pub cached_at: DateTime<Utc>,
  /// An invalidation happened after the fetch that produced this result started
  pub invalidated: bool,
}

/// Trait for cache storage backends.
///
/// Every key carries an invalidation generation. A result is stored together
/// with the generation observed when its fetch started, so a response that
/// lands after a newer invalidation is kept but already marked invalid.
pub trait CacheStorage: Send + Sync {
  /// Get the cached result for a key.
  fn get_query_result<T: DeserializeOwned>(&self, key: &str)
    -> Result<Option<CachedQueryResult<T>>>;

  /// Store a result fetched while the key was at `generation`.
  fn store_query_result<T: Serialize>(&self, key: &str, data: &T, generation: u64) -> Result<()>;

  /// Current invalidation generation of a key (0 if never invalidated).
  fn generation(&self, key: &str) -> Result<u64>;

  /// Mark whatever is cached under `key` as stale.
  fn invalidate(&self, key: &str) -> Result<()>;
}

#[derive(Debug)]
struct Entry {
  value: Value,
  cached_at: DateTime<Utc>,
  generation: u64,
}

#[derive(Debug, Default)]
struct Slot {
  entry: Option<Entry>,
  generation: u64,
}

/// Process-lifetime cache holding serialized results per key.
#[derive(Debug, Default)]
pub struct MemoryStorage {
  slots: Mutex<HashMap<String, Slot>>,
}

impl MemoryStorage {
  pub fn new() -> Self {
    Self::default()
  }

  fn lock(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, Slot>>> {
    self.slots.lock().map_err(|e| eyre!("Lock poisoned: {}", e))
  }
}

impl CacheStorage for MemoryStorage {
  fn get_query_result<T: DeserializeOwned>(
    &self,
    key: &str,
  ) -> Result<Option<CachedQueryResult<T>>> {
    let slots = self.lock()?;

    let Some(slot) = slots.get(key) else {
      return Ok(None);
    };
    let Some(entry) = &slot.entry else {
      return Ok(None);
    };

    let data = serde_json::from_value(entry.value.clone())
      .map_err(|e| eyre!("Failed to deserialize cached {}: {}", key, e))?;

    Ok(Some(CachedQueryResult {
      data,
      cached_at: entry.cached_at,
      invalidated: entry.generation != slot.generation,
    }))
  }

  fn store_query_result<T: Serialize>(&self, key: &str, data: &T, generation: u64) -> Result<()> {
    let value =
      serde_json::to_value(data).map_err(|e| eyre!("Failed to serialize {}: {}", key, e))?;

    let mut slots = self.lock()?;
    let slot = slots.entry(key.to_string()).or_default();
    slot.entry = Some(Entry {
      value,
      cached_at: Utc::now(),
      generation,
    });

    Ok(())
  }

  fn generation(&self, key: &str) -> Result<u64> {
    let slots = self.lock()?;
    Ok(slots.get(key).map(|slot| slot.generation).unwrap_or(0))
  }

  fn invalidate(&self, key: &str) -> Result<()> {
    let mut slots = self.lock()?;
    let slot = slots.entry(key.to_string()).or_default();
    slot.generation += 1;
    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_missing_key() {
    let storage = MemoryStorage::new();
    let result: Option<CachedQueryResult<Vec<i32>>> = storage.get_query_result("tags").unwrap();
    assert!(result.is_none());
    assert_eq!(storage.generation("tags").unwrap(), 0);
  }

  #[test]
  fn test_store_then_invalidate() {
    let storage = MemoryStorage::new();
    storage.store_query_result("tags", &vec![1, 2], 0).unwrap();

    let cached: CachedQueryResult<Vec<i32>> = storage.get_query_result("tags").unwrap().unwrap();
    assert_eq!(cached.data, vec![1, 2]);
    assert!(!cached.invalidated);

    storage.invalidate("tags").unwrap();
    let cached: CachedQueryResult<Vec<i32>> = storage.get_query_result("tags").unwrap().unwrap();
    assert!(cached.invalidated);
  }

  #[test]
  fn test_result_from_older_generation_is_stored_invalid() {
    let storage = MemoryStorage::new();
    let started_at = storage.generation("tags").unwrap();

    // Invalidation lands while the fetch is in flight
    storage.invalidate("tags").unwrap();
    storage
      .store_query_result("tags", &vec![1], started_at)
      .unwrap();

    let cached: CachedQueryResult<Vec<i32>> = storage.get_query_result("tags").unwrap().unwrap();
    assert!(cached.invalidated);
  }
}
