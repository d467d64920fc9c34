//! Scroll trigger: asks for the next page when the sentinel (the last
//! rendered item) becomes visible.
//!
//! Two states: idle, or armed on exactly one sentinel. Arming is a
//! subscription to that sentinel's visibility; it is dropped after it fires
//! or when a different sentinel replaces it. A sentinel that already fired
//! is not re-armed, so a failed page is retried by the user, not by a loop.

/// Trigger state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TriggerState<S> {
  Idle,
  Armed(S),
}

#[derive(Debug, Clone)]
pub struct ScrollTrigger<S> {
  state: TriggerState<S>,
  /// Sentinel that most recently fired
  fired: Option<S>,
}

impl<S> Default for ScrollTrigger<S> {
  fn default() -> Self {
    Self {
      state: TriggerState::Idle,
      fired: None,
    }
  }
}

impl<S: Clone + PartialEq> ScrollTrigger<S> {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn state(&self) -> &TriggerState<S> {
    &self.state
  }

  pub fn is_armed(&self) -> bool {
    matches!(self.state, TriggerState::Armed(_))
  }

  /// Reconcile with the current last item and the engine's readiness.
  ///
  /// `eligible` must be false while a page is loading, after the quota is
  /// exhausted, or once the result set has run dry.
  pub fn observe(&mut self, sentinel: Option<&S>, eligible: bool) {
    let Some(sentinel) = sentinel else {
      // Nothing rendered: any earlier sentinel is gone for good
      self.reset();
      return;
    };

    if !eligible {
      self.state = TriggerState::Idle;
      return;
    }

    if self.fired.as_ref() == Some(sentinel) {
      return;
    }

    if !self.is_armed_on(sentinel) {
      self.state = TriggerState::Armed(sentinel.clone());
    }
  }

  /// Deliver a visibility change for `sentinel`.
  ///
  /// Calls `fetch_more` and disarms if `sentinel` is the armed one and just
  /// became visible. Returns whether it fired.
  pub fn visibility_changed<F: FnOnce()>(
    &mut self,
    sentinel: &S,
    visible: bool,
    fetch_more: F,
  ) -> bool {
    if !visible {
      return false;
    }

    if !self.is_armed_on(sentinel) {
      return false;
    }

    self.fired = Some(sentinel.clone());
    self.state = TriggerState::Idle;
    fetch_more();
    true
  }

  fn is_armed_on(&self, sentinel: &S) -> bool {
    matches!(&self.state, TriggerState::Armed(armed) if armed == sentinel)
  }

  /// Forget everything, e.g. when a new search starts.
  pub fn reset(&mut self) {
    self.state = TriggerState::Idle;
    self.fired = None;
  }
}
