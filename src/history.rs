//! Search history: a durable, duplicate-free list of past search terms,
//! most recent first.

use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, OptionalExtension};
use std::sync::Mutex;
use tracing::warn;

use crate::db::Database;

/// Key under which the serialized history list is stored.
const HISTORY_KEY: &str = "search_history";

/// Durable backend for the history list.
pub trait HistoryStore: Send + Sync {
  /// Read the persisted list (empty if nothing was ever saved).
  fn load(&self) -> Result<Vec<String>>;

  /// Replace the persisted list.
  fn save(&self, entries: &[String]) -> Result<()>;
}

/// History persisted as a JSON list in the `kv_store` table.
pub struct SqliteHistory {
  db: Database,
}

impl SqliteHistory {
  pub fn new(db: Database) -> Self {
    Self { db }
  }
}

impl HistoryStore for SqliteHistory {
  fn load(&self) -> Result<Vec<String>> {
    let conn = self.db.conn()?;

    let raw: Option<String> = conn
      .query_row(
        "SELECT value FROM kv_store WHERE key = ?",
        params![HISTORY_KEY],
        |row| row.get(0),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read search history: {}", e))?;

    match raw {
      Some(raw) => {
        serde_json::from_str(&raw).map_err(|e| eyre!("Failed to parse search history: {}", e))
      }
      None => Ok(Vec::new()),
    }
  }

  fn save(&self, entries: &[String]) -> Result<()> {
    let raw = serde_json::to_string(entries)
      .map_err(|e| eyre!("Failed to serialize search history: {}", e))?;

    self
      .db
      .conn()?
      .execute(
        "INSERT OR REPLACE INTO kv_store (key, value, updated_at) VALUES (?, ?, datetime('now'))",
        params![HISTORY_KEY, raw],
      )
      .map_err(|e| eyre!("Failed to save search history: {}", e))?;

    Ok(())
  }
}

/// History kept only for the lifetime of the process.
#[derive(Default)]
pub struct MemoryHistory {
  entries: Mutex<Vec<String>>,
}

impl HistoryStore for MemoryHistory {
  fn load(&self) -> Result<Vec<String>> {
    let entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    Ok(entries.clone())
  }

  fn save(&self, new_entries: &[String]) -> Result<()> {
    let mut entries = self
      .entries
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;
    *entries = new_entries.to_vec();
    Ok(())
  }
}

/// In-memory view of the history, written through to its store.
pub struct History {
  entries: Vec<String>,
  store: Box<dyn HistoryStore>,
}

impl History {
  /// Load the persisted list once. A corrupt or unreadable store starts
  /// an empty history rather than failing startup.
  pub fn load(store: Box<dyn HistoryStore>) -> Self {
    let entries = store.load().unwrap_or_else(|e| {
      warn!(error = %e, "could not load search history");
      Vec::new()
    });

    Self { entries, store }
  }

  pub fn entries(&self) -> &[String] {
    &self.entries
  }

  pub fn contains(&self, term: &str) -> bool {
    self.entries.iter().any(|t| t == term)
  }

  /// Put `term` at the front unless it is already present (exact match).
  ///
  /// Returns whether the list changed. A failed write keeps the in-memory
  /// update so reads stay consistent for this session.
  pub fn prepend(&mut self, term: &str) -> bool {
    if self.contains(term) {
      return false;
    }

    self.entries.insert(0, term.to_string());
    if let Err(e) = self.store.save(&self.entries) {
      warn!(error = %e, "could not persist search history");
    }
    true
  }
}

impl std::fmt::Debug for History {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("History")
      .field("entries", &self.entries)
      .finish_non_exhaustive()
  }
}
