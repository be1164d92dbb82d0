//! Cache layer that orchestrates caching logic with network fetching.

use chrono::Utc;
use color_eyre::Result;
use serde::{de::DeserializeOwned, Serialize};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use super::storage::CacheStorage;
use super::traits::{CacheResult, QueryKey};

/// Default time a cached result is served without refetching.
pub const DEFAULT_STALE_TIME: Duration = Duration::from_secs(5 * 60);

/// Cache layer that manages caching logic and network fetching.
///
/// Sits between the views and the remote client. Clones share one storage.
pub struct CacheLayer<S: CacheStorage> {
  storage: Arc<S>,
  /// How long before cached data is considered stale
  stale_time: Duration,
}

impl<S: CacheStorage> CacheLayer<S> {
  pub fn new(storage: S) -> Self {
    Self {
      storage: Arc::new(storage),
      stale_time: DEFAULT_STALE_TIME,
    }
  }

  pub fn with_stale_time(mut self, stale_time: Duration) -> Self {
    self.stale_time = stale_time;
    self
  }

  fn is_stale(&self, cached_at: chrono::DateTime<Utc>) -> bool {
    match (Utc::now() - cached_at).to_std() {
      Ok(age) => age > self.stale_time,
      // Clock went backwards
      Err(_) => false,
    }
  }

  /// Fetch with cache-first strategy.
  ///
  /// 1. Fresh, non-invalidated entry: return it
  /// 2. Otherwise fetch from network and store under the generation seen
  ///    before the fetch started
  /// 3. Network errors are returned as-is; nothing stale is served
  pub async fn fetch<T, K, F, Fut>(&self, key: &K, fetcher: F) -> Result<CacheResult<T>>
  where
    T: Serialize + DeserializeOwned,
    K: QueryKey + ?Sized,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
  {
    let cache_key = key.cache_key();

    if let Some(cached) = self.storage.get_query_result::<T>(&cache_key)? {
      if !cached.invalidated && !self.is_stale(cached.cached_at) {
        tracing::trace!(query = %key.description(), "cache hit");
        return Ok(CacheResult::from_cache(cached.data, cached.cached_at));
      }
    }

    let generation = self.storage.generation(&cache_key)?;
    tracing::trace!(query = %key.description(), generation, "cache miss, fetching");

    let data = fetcher().await?;
    self
      .storage
      .store_query_result(&cache_key, &data, generation)?;
    Ok(CacheResult::from_network(data))
  }

  /// Mark a query result stale so the next fetch goes to the network.
  ///
  /// Repeated calls before the next fetch still cause a single refetch.
  pub fn invalidate<K: QueryKey + ?Sized>(&self, key: &K) -> Result<()> {
    tracing::debug!(query = %key.description(), "invalidate");
    self.storage.invalidate(&key.cache_key())
  }
}

impl<S: CacheStorage> Clone for CacheLayer<S> {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
      stale_time: self.stale_time,
    }
  }
}
