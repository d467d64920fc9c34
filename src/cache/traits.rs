//! Core traits and types for the caching system.

use chrono::{DateTime, Utc};
use serde::{de::DeserializeOwned, Serialize};

/// Trait for payloads that can be cached as one serialized blob per request.
pub trait Cacheable: Clone + Send + Sync + Serialize + DeserializeOwned {
  /// Payload type name for storage organization (e.g., "image_batch")
  fn entity_type() -> &'static str;
}

/// Identity of a cacheable request.
///
/// Two requests that would hit the same endpoint with the same query
/// parameters must produce the same hash.
pub trait QueryKey {
  /// Stable, fixed-length key used for storage lookups
  fn cache_hash(&self) -> String;

  /// Human-readable form of the request, stored alongside the payload
  fn description(&self) -> String;
}

/// Result from a cache operation, including data and metadata about the source.
#[derive(Debug, Clone)]
pub struct CacheResult<T> {
  /// The actual data
  pub data: T,
  /// Where the data came from
  pub source: CacheSource,
  /// When the data was cached (if from cache)
  pub cached_at: Option<DateTime<Utc>>,
}

impl<T> CacheResult<T> {
  /// Create a new cache result from fresh network data.
  pub fn from_network(data: T) -> Self {
    Self {
      data,
      source: CacheSource::Network,
      cached_at: None,
    }
  }

  /// Create a new cache result from cached data.
  pub fn from_cache(data: T, cached_at: DateTime<Utc>) -> Self {
    Self {
      data,
      source: CacheSource::Cache,
      cached_at: Some(cached_at),
    }
  }

  /// Create a new cache result for offline mode.
  pub fn offline(data: T, cached_at: DateTime<Utc>) -> Self {
    Self {
      data,
      source: CacheSource::Offline,
      cached_at: Some(cached_at),
    }
  }
}

/// Indicates where cached data came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
  /// Fresh data from network
  Network,
  /// Served from cache without touching the network
  Cache,
  /// Entry had expired but the network failed, so the expired entry was served
  Offline,
}
