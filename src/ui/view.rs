use crossterm::event::KeyEvent;
use ratatui::prelude::*;

use crate::engine::Engine;

/// A keyboard shortcut hint for display in the header
#[derive(Debug, Clone)]
pub struct ShortcutInfo {
  pub key: &'static str,
  pub label: &'static str,
  pub priority: u8, // Lower = shown first
}

impl ShortcutInfo {
  pub const fn new(key: &'static str, label: &'static str) -> Self {
    Self {
      key,
      label,
      priority: 100,
    }
  }

  pub const fn with_priority(mut self, priority: u8) -> Self {
    self.priority = priority;
    self
  }
}

/// Actions that a view can request in response to user input
pub enum ViewAction {
  /// No action needed
  None,
  /// Push a new view onto the stack
  Push(Box<dyn View>),
  /// Pop current view from stack (go back)
  Pop,
  /// Leave the application
  Quit,
}

/// Trait for view behavior
///
/// Views never own the engine. The App lends it for each call, so every
/// view reads the same state and mutates it only through its dispatch
/// methods.
pub trait View {
  /// Handle a key event, returning an action for App to execute
  fn handle_key(&mut self, key: KeyEvent, engine: &mut Engine) -> ViewAction;

  /// Mouse wheel movement, positive = down
  fn scroll(&mut self, _delta: i32) {}

  /// Render the view to the frame
  fn render(&mut self, frame: &mut Frame, area: Rect, engine: &Engine);

  /// Get the breadcrumb label for this view
  fn breadcrumb_label(&self) -> String;

  /// Called on each tick, after the engine has committed finished fetches
  fn tick(&mut self, _engine: &mut Engine) {}

  /// Get keyboard shortcuts to display in the header
  /// Override this to provide view-specific shortcuts
  fn shortcuts(&self) -> Vec<ShortcutInfo> {
    vec![ShortcutInfo::new("q", "back").with_priority(90)]
  }
}
