//! Pagination engine: owns the accumulated result list and is the single
//! place fetch outcomes are recorded.
//!
//! Network work runs on spawned tasks; their results come back over a
//! channel and are committed by [`Engine::poll`] (from the UI tick) or
//! [`Engine::settle`]. All state mutation therefore happens on the task
//! that owns the engine.
//!
//! Every dispatch takes a new sequence number and a reset advances it too,
//! so a completion that is no longer the latest request is dropped instead
//! of overwriting newer state.

mod state;

pub use state::EngineState;

use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::history::History;
use crate::unsplash::{FetchError, FetchGateway, ImageBatch};

/// The mutation surface exposed to views
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
  /// Request `page` of results for `term` (`None` = browse)
  FetchPage { term: Option<String>, page: u32 },
  /// Drop all results and start over
  ResetImages,
}

/// A finished fetch waiting to be committed
#[derive(Debug)]
struct Completion {
  seq: u64,
  term: Option<String>,
  page: u32,
  result: Result<ImageBatch, FetchError>,
}

pub struct Engine {
  state: EngineState,
  history: History,
  gateway: FetchGateway,
  /// Sequence number of the latest dispatch (or reset)
  seq: u64,
  /// Number of resets so far; views compare it to notice a new result set
  resets: u64,
  /// Term and page of the latest dispatch, replayed by [`Engine::retry`]
  last_request: Option<(Option<String>, u32)>,
  tx: mpsc::UnboundedSender<Completion>,
  rx: mpsc::UnboundedReceiver<Completion>,
}

impl Engine {
  pub fn new(gateway: FetchGateway, history: History) -> Self {
    let (tx, rx) = mpsc::unbounded_channel();
    Self {
      state: EngineState::default(),
      history,
      gateway,
      seq: 0,
      resets: 0,
      last_request: None,
      tx,
      rx,
    }
  }

  pub fn state(&self) -> &EngineState {
    &self.state
  }

  /// How many times the result set has been reset
  pub fn resets(&self) -> u64 {
    self.resets
  }

  /// Past search terms, most recent first
  pub fn history(&self) -> &[String] {
    self.history.entries()
  }

  pub fn dispatch(&mut self, command: Command) {
    match command {
      Command::FetchPage { term, page } => {
        self.fetch_page(term.as_deref(), page);
      }
      Command::ResetImages => self.reset_images(),
    }
  }

  /// Start fetching `page` for `term`. A blank term means browse.
  ///
  /// Returns false without doing anything while rate limited. Callers are
  /// expected not to dispatch while `loading`; if they do, only the newest
  /// request is committed.
  pub fn fetch_page(&mut self, term: Option<&str>, page: u32) -> bool {
    if self.state.rate_limited {
      debug!(page, "rate limited, ignoring fetch");
      return false;
    }

    let term = normalize_term(term);
    self.seq += 1;
    self.state.loading = true;
    self.last_request = Some((term.clone(), page));

    info!(seq = self.seq, term = ?term, page, "fetching page");

    let seq = self.seq;
    let gateway = self.gateway.clone();
    let tx = self.tx.clone();
    tokio::spawn(async move {
      let result = gateway.fetch(term.as_deref(), page).await;
      // Ignore send errors - the engine may have been dropped
      let _ = tx.send(Completion {
        seq,
        term,
        page,
        result,
      });
    });

    true
  }

  /// Request the next page of the active result set, if allowed.
  pub fn fetch_more(&mut self) -> bool {
    if !self.state.can_fetch_more() {
      return false;
    }
    let term = self.state.active_search_term.clone();
    let page = self.state.current_page;
    self.fetch_page(term.as_deref(), page)
  }

  /// Clear results, errors and the rate-limit latch. History is untouched.
  pub fn reset_images(&mut self) {
    // Anything still in flight now belongs to a discarded result set
    self.seq += 1;
    self.resets += 1;
    self.state = EngineState::default();
    self.last_request = None;
    debug!(seq = self.seq, "images reset");
  }

  /// Re-send the request that last failed. Does nothing unless the latest
  /// request ended in an error other than quota exhaustion.
  pub fn retry(&mut self) -> bool {
    if self.state.loading || self.state.rate_limited || self.state.error.is_none() {
      return false;
    }
    let Some((term, page)) = self.last_request.clone() else {
      return false;
    };
    self.fetch_page(term.as_deref(), page)
  }

  /// Commit every completion that has arrived. Returns whether state changed.
  pub fn poll(&mut self) -> bool {
    let mut changed = false;
    while let Ok(done) = self.rx.try_recv() {
      changed |= self.commit(done);
    }
    changed
  }

  /// Wait until the latest request has been committed.
  pub async fn settle(&mut self) {
    while self.state.loading {
      match self.rx.recv().await {
        Some(done) => {
          self.commit(done);
        }
        None => break,
      }
    }
  }

  fn commit(&mut self, done: Completion) -> bool {
    if done.seq != self.seq {
      debug!(
        seq = done.seq,
        latest = self.seq,
        page = done.page,
        "discarding superseded response"
      );
      return false;
    }

    self.state.loading = false;

    match done.result {
      Ok(batch) => {
        let count = batch.len();
        if done.page <= 1 {
          self.state.items = batch.images;
        } else {
          self.state.items.extend(batch.images);
        }
        self.state.current_page = done.page + 1;
        self.state.error = None;
        self.state.rate_limited = false;
        self.state.exhausted = count == 0;

        // History is written in the same step as the state commit
        if let Some(term) = &done.term {
          self.history.prepend(term);
        }
        self.state.active_search_term = done.term;

        debug!(page = done.page, count, total = self.state.items.len(), "page committed");
      }
      Err(FetchError::QuotaExhausted) => {
        warn!(page = done.page, "API quota exhausted, pausing fetches until reset");
        self.state.rate_limited = true;
        self.state.error = Some(FetchError::QuotaExhausted.user_message());
      }
      Err(err) => {
        warn!(page = done.page, error = %err, "page fetch failed");
        self.state.error = Some(err.user_message());
      }
    }

    true
  }
}

/// Trim the term; a blank term selects browse mode.
fn normalize_term(term: Option<&str>) -> Option<String> {
  term
    .map(str::trim)
    .filter(|t| !t.is_empty())
    .map(String::from)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::cache::{CacheLayer, NoopStorage, SqliteStorage};
  use crate::config::Config;
  use crate::db::Database;
  use crate::history::MemoryHistory;
  use crate::unsplash::{Image, PhotoRequest, PhotoSource};
  use futures::future::BoxFuture;
  use std::collections::HashMap;
  use std::sync::{Arc, Mutex};
  use std::time::Duration;
  use tokio::sync::Notify;

  type Key = (Option<String>, u32);

  /// Answers from a script; unscripted requests get a full page of images.
  #[derive(Default)]
  struct ScriptedSource {
    responses: Mutex<HashMap<Key, Result<ImageBatch, FetchError>>>,
    gates: Mutex<HashMap<Key, Arc<Notify>>>,
    calls: Mutex<Vec<Key>>,
  }

  impl ScriptedSource {
    fn respond(&self, term: Option<&str>, page: u32, result: Result<ImageBatch, FetchError>) {
      self
        .responses
        .lock()
        .unwrap()
        .insert((term.map(String::from), page), result);
    }

    /// Hold the response for `(term, page)` until the returned handle is notified
    fn hold(&self, term: Option<&str>, page: u32) -> Arc<Notify> {
      let gate = Arc::new(Notify::new());
      self
        .gates
        .lock()
        .unwrap()
        .insert((term.map(String::from), page), gate.clone());
      gate
    }

    fn calls(&self) -> Vec<Key> {
      self.calls.lock().unwrap().clone()
    }
  }

  impl PhotoSource for ScriptedSource {
    fn fetch_page(
      &self,
      request: &PhotoRequest,
    ) -> BoxFuture<'static, Result<ImageBatch, FetchError>> {
      let key = (request.term.clone(), request.page);
      self.calls.lock().unwrap().push(key.clone());

      let prefix = format!("{}-p{}", key.0.as_deref().unwrap_or("all"), key.1);
      let result = self
        .responses
        .lock()
        .unwrap()
        .get(&key)
        .cloned()
        .unwrap_or_else(|| Ok(batch(&prefix, 20)));
      let gate = self.gates.lock().unwrap().get(&key).cloned();

      Box::pin(async move {
        if let Some(gate) = gate {
          gate.notified().await;
        }
        result
      })
    }
  }

  fn batch(prefix: &str, n: usize) -> ImageBatch {
    ImageBatch::new(
      (0..n)
        .map(|i| Image {
          id: format!("{}-{}", prefix, i),
          thumb_url: format!("https://img/{}-{}/small", prefix, i),
          full_url: format!("https://img/{}-{}/full", prefix, i),
          description: "Unsplash Image".to_string(),
          likes: i as u64,
        })
        .collect(),
    )
  }

  fn engine_with(source: Arc<ScriptedSource>, cache: CacheLayer) -> Engine {
    let gateway = FetchGateway::new(source, cache, &Config::default());
    Engine::new(gateway, History::load(Box::new(MemoryHistory::default())))
  }

  fn engine(source: Arc<ScriptedSource>) -> Engine {
    engine_with(source, CacheLayer::new(NoopStorage))
  }

  fn ids(engine: &Engine) -> Vec<String> {
    engine.state().items.iter().map(|i| i.id.clone()).collect()
  }

  #[tokio::test]
  async fn test_browse_first_page() {
    let source = Arc::new(ScriptedSource::default());
    let mut engine = engine(source.clone());

    assert!(engine.fetch_page(None, 1));
    assert!(engine.state().loading);

    engine.settle().await;

    let state = engine.state();
    assert_eq!(state.items.len(), 20);
    assert_eq!(state.current_page, 2);
    assert!(!state.loading);
    assert_eq!(state.error, None);
    assert_eq!(state.active_search_term, None);
    assert_eq!(source.calls(), vec![(None, 1)]);
  }

  #[tokio::test]
  async fn test_pages_accumulate_in_request_order() {
    let source = Arc::new(ScriptedSource::default());
    source.respond(Some("cat"), 1, Ok(batch("a", 2)));
    source.respond(Some("cat"), 2, Ok(batch("b", 3)));
    source.respond(Some("cat"), 3, Ok(batch("c", 1)));
    let mut engine = engine(source);

    for page in 1..=3 {
      engine.fetch_page(Some("cat"), page);
      engine.settle().await;
    }

    assert_eq!(
      ids(&engine),
      vec!["a-0", "a-1", "b-0", "b-1", "b-2", "c-0"]
    );
    assert_eq!(engine.state().current_page, 4);
    assert_eq!(engine.state().active_search_term.as_deref(), Some("cat"));
  }

  #[tokio::test]
  async fn test_page_one_replaces_items() {
    let source = Arc::new(ScriptedSource::default());
    source.respond(None, 1, Ok(batch("first", 2)));
    source.respond(Some("dog"), 1, Ok(batch("dog", 1)));
    let mut engine = engine(source);

    engine.fetch_page(None, 1);
    engine.settle().await;
    engine.fetch_page(Some("dog"), 1);
    engine.settle().await;

    assert_eq!(ids(&engine), vec!["dog-0"]);
    assert_eq!(engine.state().current_page, 2);
  }

  #[tokio::test]
  async fn test_fetch_more_requests_next_page_of_active_term() {
    let source = Arc::new(ScriptedSource::default());
    let mut engine = engine(source.clone());

    engine.fetch_page(None, 1);
    engine.settle().await;

    assert!(engine.fetch_more());
    // Second request while loading is refused
    assert!(!engine.fetch_more());
    engine.settle().await;

    assert_eq!(source.calls(), vec![(None, 1), (None, 2)]);
    assert_eq!(engine.state().items.len(), 40);
    assert_eq!(engine.state().current_page, 3);
  }

  #[tokio::test]
  async fn test_reset_clears_everything_but_history() {
    let source = Arc::new(ScriptedSource::default());
    source.respond(Some("cat"), 2, Err(FetchError::other("boom")));
    let mut engine = engine(source);

    engine.fetch_page(Some("cat"), 1);
    engine.settle().await;
    engine.fetch_page(Some("cat"), 2);
    engine.settle().await;
    assert_eq!(engine.state().error.as_deref(), Some("boom"));

    engine.reset_images();

    assert_eq!(engine.state(), &EngineState::default());
    assert_eq!(engine.resets(), 1);
    assert_eq!(engine.history(), ["cat"]);
  }

  #[tokio::test]
  async fn test_reset_while_loading_discards_late_response() {
    let source = Arc::new(ScriptedSource::default());
    let gate = source.hold(Some("cat"), 1);
    let mut engine = engine(source);

    engine.fetch_page(Some("cat"), 1);
    engine.reset_images();
    assert!(!engine.state().loading);

    gate.notify_one();
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert!(!engine.poll());
    assert!(engine.state().items.is_empty());
    assert!(engine.history().is_empty());
  }

  #[tokio::test]
  async fn test_out_of_order_completion_is_discarded() {
    let source = Arc::new(ScriptedSource::default());
    source.respond(None, 1, Ok(batch("old", 5)));
    source.respond(Some("dog"), 1, Ok(batch("dog", 2)));
    let slow = source.hold(None, 1);
    let mut engine = engine(source);

    // Misbehaving caller: overlapping dispatches
    engine.fetch_page(None, 1);
    engine.fetch_page(Some("dog"), 1);
    engine.settle().await;
    assert_eq!(ids(&engine), vec!["dog-0", "dog-1"]);

    slow.notify_one();
    tokio::time::sleep(Duration::from_millis(20)).await;
    engine.poll();

    assert_eq!(ids(&engine), vec!["dog-0", "dog-1"]);
    assert_eq!(engine.state().active_search_term.as_deref(), Some("dog"));
  }

  #[tokio::test]
  async fn test_history_prepends_new_terms_only() {
    let source = Arc::new(ScriptedSource::default());
    let mut engine = engine(source);

    for term in ["a", "b", "a", "c"] {
      engine.reset_images();
      engine.fetch_page(Some(term), 1);
      engine.settle().await;
    }

    assert_eq!(engine.history(), ["c", "b", "a"]);
  }

  #[tokio::test]
  async fn test_browse_and_failures_do_not_touch_history() {
    let source = Arc::new(ScriptedSource::default());
    source.respond(Some("cat"), 1, Err(FetchError::other("boom")));
    let mut engine = engine(source);

    engine.fetch_page(None, 1);
    engine.settle().await;
    engine.fetch_page(Some("cat"), 1);
    engine.settle().await;

    assert!(engine.history().is_empty());
  }

  #[tokio::test]
  async fn test_cache_hit_skips_second_network_call() {
    let source = Arc::new(ScriptedSource::default());
    let cache = CacheLayer::new(SqliteStorage::new(Database::open_in_memory().unwrap()));
    let mut engine = engine_with(source.clone(), cache);

    engine.fetch_page(Some("cat"), 1);
    engine.settle().await;
    let first = engine.state().items.clone();

    engine.reset_images();
    engine.fetch_page(Some("cat"), 1);
    engine.settle().await;

    assert_eq!(engine.state().items, first);
    assert_eq!(source.calls().len(), 1);
  }

  #[tokio::test]
  async fn test_quota_exhaustion_is_sticky_until_reset() {
    let source = Arc::new(ScriptedSource::default());
    source.respond(None, 2, Err(FetchError::QuotaExhausted));
    let mut engine = engine(source.clone());

    engine.fetch_page(None, 1);
    engine.settle().await;
    engine.fetch_page(None, 2);
    engine.settle().await;

    assert!(engine.state().rate_limited);
    assert_eq!(engine.state().error.as_deref(), Some("API Limit Reached"));
    let before = engine.state().clone();

    assert!(!engine.fetch_page(None, 2));
    assert!(!engine.fetch_more());
    assert_eq!(engine.state(), &before);
    assert!(!engine.state().loading);
    assert_eq!(source.calls().len(), 2);

    engine.reset_images();
    assert!(!engine.state().rate_limited);
    assert!(engine.fetch_page(None, 1));
  }

  #[tokio::test]
  async fn test_other_errors_are_retryable() {
    let source = Arc::new(ScriptedSource::default());
    source.respond(None, 1, Err(FetchError::other("")));
    let mut engine = engine(source.clone());

    engine.fetch_page(None, 1);
    engine.settle().await;
    assert_eq!(
      engine.state().error.as_deref(),
      Some("Failed to fetch images")
    );
    assert!(!engine.state().rate_limited);
    assert_eq!(engine.state().current_page, 1);

    source.respond(None, 1, Ok(batch("ok", 1)));
    engine.fetch_page(None, 1);
    engine.settle().await;
    assert_eq!(engine.state().error, None);
    assert_eq!(ids(&engine), vec!["ok-0"]);
  }

  #[tokio::test]
  async fn test_failed_page_keeps_loaded_items() {
    let source = Arc::new(ScriptedSource::default());
    source.respond(None, 1, Ok(batch("p1", 3)));
    source.respond(None, 2, Err(FetchError::other("timeout")));
    let mut engine = engine(source);

    engine.fetch_page(None, 1);
    engine.settle().await;
    engine.fetch_more();
    engine.settle().await;

    assert_eq!(engine.state().items.len(), 3);
    assert_eq!(engine.state().current_page, 2);
    assert_eq!(engine.state().error.as_deref(), Some("timeout"));
  }

  #[tokio::test]
  async fn test_empty_first_page_latches_exhausted() {
    let source = Arc::new(ScriptedSource::default());
    source.respond(Some("mountain"), 1, Ok(ImageBatch::default()));
    let mut engine = engine(source.clone());

    engine.fetch_page(Some("mountain"), 1);
    engine.settle().await;

    let state = engine.state();
    assert!(state.items.is_empty());
    assert_eq!(state.error, None);
    assert!(!state.loading);
    assert!(state.exhausted);

    assert!(!engine.fetch_more());
    assert_eq!(source.calls().len(), 1);
  }

  #[tokio::test]
  async fn test_blank_term_is_browse() {
    let source = Arc::new(ScriptedSource::default());
    let mut engine = engine(source.clone());

    engine.dispatch(Command::FetchPage {
      term: Some("   ".to_string()),
      page: 1,
    });
    engine.settle().await;

    assert_eq!(source.calls(), vec![(None, 1)]);
    assert!(engine.history().is_empty());
  }

  #[tokio::test]
  async fn test_dispatch_reset_command() {
    let source = Arc::new(ScriptedSource::default());
    let mut engine = engine(source);

    engine.dispatch(Command::FetchPage {
      term: None,
      page: 1,
    });
    engine.settle().await;
    engine.dispatch(Command::ResetImages);

    assert!(engine.state().items.is_empty());
    assert_eq!(engine.state().current_page, 1);
  }

  #[tokio::test]
  async fn test_retry_replays_failed_request() {
    let source = Arc::new(ScriptedSource::default());
    source.respond(Some("fox"), 1, Err(FetchError::other("boom")));
    let mut engine = engine(source.clone());

    // Nothing failed yet
    assert!(!engine.retry());

    engine.fetch_page(Some("fox"), 1);
    engine.settle().await;
    assert_eq!(engine.state().active_search_term, None);

    source.respond(Some("fox"), 1, Ok(batch("fox", 3)));
    assert!(engine.retry());
    engine.settle().await;

    assert_eq!(source.calls(), vec![(Some("fox".to_string()), 1); 2]);
    assert_eq!(engine.state().items.len(), 3);
    assert_eq!(engine.state().error, None);
    assert!(!engine.retry());
  }

  #[tokio::test]
  async fn test_retry_refused_when_rate_limited() {
    let source = Arc::new(ScriptedSource::default());
    source.respond(None, 1, Err(FetchError::QuotaExhausted));
    let mut engine = engine(source.clone());

    engine.fetch_page(None, 1);
    engine.settle().await;

    assert!(!engine.retry());
    assert_eq!(source.calls().len(), 1);
  }
}
