use crate::unsplash::Image;

/// Everything the views render from. Only the engine mutates it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineState {
  /// Accumulated photos: page 1 replaces, later pages append
  pub items: Vec<Image>,
  /// Next page to request
  pub current_page: u32,
  /// Term the current `items` belong to (`None` = browse)
  pub active_search_term: Option<String>,
  /// True strictly between dispatch and resolution
  pub loading: bool,
  /// Last failure, cleared by the next success or a reset
  pub error: Option<String>,
  /// Sticky until reset: the upstream quota is spent
  pub rate_limited: bool,
  /// The last successful page was empty
  pub exhausted: bool,
}

impl Default for EngineState {
  fn default() -> Self {
    Self {
      items: Vec::new(),
      current_page: 1,
      active_search_term: None,
      loading: false,
      error: None,
      rate_limited: false,
      exhausted: false,
    }
  }
}

impl EngineState {
  /// Whether an automatic "load more" is allowed right now
  pub fn can_fetch_more(&self) -> bool {
    !self.loading && !self.rate_limited && !self.exhausted
  }

  /// Position and id of the last item, the scroll sentinel.
  ///
  /// The position is part of the key because the same photo can end two
  /// different pages.
  pub fn last_row(&self) -> Option<(usize, String)> {
    let last = self.items.last()?;
    Some((self.items.len() - 1, last.id.clone()))
  }

  /// Label for the result set, e.g. `browse` or `"mountain"`
  pub fn label(&self) -> String {
    match &self.active_search_term {
      Some(term) => format!("\"{}\"", term),
      None => "browse".to_string(),
    }
  }
}
