//! Cancellable single-shot timer for debounced input.
//!
//! Each new value re-arms the timer and replaces the previous one; the
//! value is released once, after the quiet period has passed with no newer
//! value. Driven by polling from the UI tick.

use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
pub struct Debouncer<T> {
  delay: Duration,
  pending: Option<(T, Instant)>,
}

impl<T> Debouncer<T> {
  pub fn new(delay: Duration) -> Self {
    Self {
      delay,
      pending: None,
    }
  }

  pub fn is_pending(&self) -> bool {
    self.pending.is_some()
  }

  /// Arm (or re-arm) the timer with the latest value
  pub fn push(&mut self, value: T) {
    self.push_at(value, Instant::now());
  }

  pub fn push_at(&mut self, value: T, now: Instant) {
    self.pending = Some((value, now + self.delay));
  }

  /// Drop the pending value without firing
  pub fn cancel(&mut self) {
    self.pending = None;
  }

  /// Fire now, regardless of the deadline
  pub fn flush(&mut self) -> Option<T> {
    self.pending.take().map(|(value, _)| value)
  }

  /// Take the value if its quiet period has elapsed
  pub fn poll(&mut self) -> Option<T> {
    self.poll_at(Instant::now())
  }

  pub fn poll_at(&mut self, now: Instant) -> Option<T> {
    let due = matches!(&self.pending, Some((_, deadline)) if now >= *deadline);
    if due {
      self.flush()
    } else {
      None
    }
  }
}
