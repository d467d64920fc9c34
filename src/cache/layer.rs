//! Cache layer that orchestrates caching logic with network fetching.

use chrono::{DateTime, Duration, Utc};
use std::future::Future;
use std::sync::Arc;
use tracing::{debug, warn};

use super::storage::CacheStorage;
use super::traits::{CacheResult, Cacheable, QueryKey};

/// Cache layer that manages caching logic and network fetching.
///
/// This layer sits between the gateway and the network client. It never
/// fails on its own: storage errors are logged and treated as a miss, so the
/// only error a caller sees is the one the fetcher produced.
pub struct CacheLayer {
  storage: Arc<dyn CacheStorage>,
  /// How long before cached data is considered expired (`None` = never)
  max_age: Option<Duration>,
}

impl CacheLayer {
  /// Create a new cache layer with the given storage backend.
  pub fn new(storage: impl CacheStorage + 'static) -> Self {
    Self {
      storage: Arc::new(storage),
      max_age: None,
    }
  }

  /// Expire entries older than `max_age`.
  pub fn with_max_age(mut self, max_age: Option<Duration>) -> Self {
    self.max_age = max_age;
    self
  }

  fn is_expired(&self, cached_at: DateTime<Utc>) -> bool {
    match self.max_age {
      Some(max_age) => Utc::now() - cached_at > max_age,
      None => false,
    }
  }

  /// Fetch with a cache-first strategy.
  ///
  /// 1. Exact key hit that has not expired: return it, no network
  /// 2. Miss: fetch from network, store, return
  /// 3. Expired hit: fetch from network; on failure serve the expired entry
  pub async fn fetch<T, K, E, F, Fut>(&self, key: &K, fetcher: F) -> Result<CacheResult<T>, E>
  where
    T: Cacheable,
    K: QueryKey,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, E>>,
  {
    let hash = key.cache_hash();

    match self.lookup::<T>(&hash) {
      Some((data, cached_at)) if !self.is_expired(cached_at) => {
        debug!(request = %key.description(), "cache hit");
        Ok(CacheResult::from_cache(data, cached_at))
      }
      Some((stale, cached_at)) => {
        debug!(request = %key.description(), "cache entry expired, refetching");
        match fetcher().await {
          Ok(data) => {
            self.store(&hash, key, &data);
            Ok(CacheResult::from_network(data))
          }
          Err(_) => {
            // Network failed, return expired cache (offline mode)
            Ok(CacheResult::offline(stale, cached_at))
          }
        }
      }
      None => {
        debug!(request = %key.description(), "cache miss");
        let data = fetcher().await?;
        self.store(&hash, key, &data);
        Ok(CacheResult::from_network(data))
      }
    }
  }

  fn lookup<T: Cacheable>(&self, hash: &str) -> Option<(T, DateTime<Utc>)> {
    let entry = match self.storage.get(T::entity_type(), hash) {
      Ok(entry) => entry?,
      Err(e) => {
        warn!(error = %e, "cache read failed");
        return None;
      }
    };

    match serde_json::from_slice(&entry.data) {
      Ok(data) => Some((data, entry.cached_at)),
      Err(e) => {
        warn!(error = %e, "discarding undecodable cache entry");
        None
      }
    }
  }

  fn store<T: Cacheable, K: QueryKey>(&self, hash: &str, key: &K, data: &T) {
    let bytes = match serde_json::to_vec(data) {
      Ok(bytes) => bytes,
      Err(e) => {
        warn!(error = %e, "failed to serialize cache entry");
        return;
      }
    };

    if let Err(e) = self
      .storage
      .put(T::entity_type(), hash, &key.description(), &bytes)
    {
      warn!(error = %e, "cache write failed");
    }
  }
}

impl Clone for CacheLayer {
  fn clone(&self) -> Self {
    Self {
      storage: Arc::clone(&self.storage),
      max_age: self.max_age,
    }
  }
}
