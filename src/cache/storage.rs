//! Cache storage trait and SQLite implementation.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, OptionalExtension};

use crate::db::Database;

/// A serialized payload read back from storage.
#[derive(Debug, Clone)]
pub struct CachedPayload {
  /// Serialized payload bytes (JSON)
  pub data: Vec<u8>,
  /// When the payload was written
  pub cached_at: DateTime<Utc>,
}

/// Trait for cache storage backends.
///
/// Entries are addressed by `(entity_type, request_hash)` and are
/// overwritten whole on every `put`.
pub trait CacheStorage: Send + Sync {
  /// Look up the payload stored for a request.
  fn get(&self, entity_type: &str, request_hash: &str) -> Result<Option<CachedPayload>>;

  /// Store (or replace) the payload for a request.
  fn put(&self, entity_type: &str, request_hash: &str, request: &str, data: &[u8]) -> Result<()>;
}

/// Storage implementation that doesn't cache anything.
/// Used when caching is disabled - all operations are no-ops.
pub struct NoopStorage;

impl CacheStorage for NoopStorage {
  fn get(&self, _entity_type: &str, _request_hash: &str) -> Result<Option<CachedPayload>> {
    Ok(None) // Always miss
  }

  fn put(
    &self,
    _entity_type: &str,
    _request_hash: &str,
    _request: &str,
    _data: &[u8],
  ) -> Result<()> {
    Ok(()) // Discard
  }
}

/// SQLite-based cache storage implementation.
pub struct SqliteStorage {
  db: Database,
}

impl SqliteStorage {
  pub fn new(db: Database) -> Self {
    Self { db }
  }
}

impl CacheStorage for SqliteStorage {
  fn get(&self, entity_type: &str, request_hash: &str) -> Result<Option<CachedPayload>> {
    let conn = self.db.conn()?;

    let row: Option<(Vec<u8>, String)> = conn
      .query_row(
        "SELECT data, cached_at FROM response_cache
         WHERE request_hash = ? AND entity_type = ?",
        params![request_hash, entity_type],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read cache entry: {}", e))?;

    match row {
      Some((data, cached_at)) => Ok(Some(CachedPayload {
        data,
        cached_at: parse_datetime(&cached_at)?,
      })),
      None => Ok(None),
    }
  }

  fn put(&self, entity_type: &str, request_hash: &str, request: &str, data: &[u8]) -> Result<()> {
    let conn = self.db.conn()?;

    conn
      .execute(
        "INSERT OR REPLACE INTO response_cache (request_hash, entity_type, request, data, cached_at)
         VALUES (?, ?, ?, ?, ?)",
        params![
          request_hash,
          entity_type,
          request,
          data,
          Utc::now().to_rfc3339()
        ],
      )
      .map_err(|e| eyre!("Failed to store cache entry: {}", e))?;

    Ok(())
  }
}

/// Parse a stored RFC 3339 timestamp.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| eyre!("Failed to parse datetime '{}': {}", s, e))
}

#[cfg(test)]
mod tests {
  use super::*;

  fn storage() -> SqliteStorage {
    SqliteStorage::new(Database::open_in_memory().unwrap())
  }

  #[test]
  fn test_get_missing_entry() {
    let storage = storage();
    assert!(storage.get("image_batch", "nope").unwrap().is_none());
  }

  #[test]
  fn test_put_then_get() {
    let storage = storage();
    storage
      .put("image_batch", "abc", "/photos?page=1", b"[1,2,3]")
      .unwrap();

    let entry = storage.get("image_batch", "abc").unwrap().unwrap();
    assert_eq!(entry.data, b"[1,2,3]");
    assert!(Utc::now() >= entry.cached_at);
  }

  #[test]
  fn test_put_overwrites_same_key() {
    let storage = storage();
    storage.put("image_batch", "abc", "req", b"old").unwrap();
    storage.put("image_batch", "abc", "req", b"new").unwrap();

    let entry = storage.get("image_batch", "abc").unwrap().unwrap();
    assert_eq!(entry.data, b"new");
  }

  #[test]
  fn test_entity_type_namespaces_keys() {
    let storage = storage();
    storage.put("image_batch", "abc", "req", b"batch").unwrap();

    assert!(storage.get("other", "abc").unwrap().is_none());
  }

  #[test]
  fn test_noop_storage_always_misses() {
    let storage = NoopStorage;
    storage.put("image_batch", "abc", "req", b"data").unwrap();
    assert!(storage.get("image_batch", "abc").unwrap().is_none());
  }
}
